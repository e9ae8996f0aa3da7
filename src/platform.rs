use embassy_time::Instant;
use embedded_hal::delay::DelayNs;
use esp_hal::delay::Delay;
use pulse_lotus::hal::Platform;

pub struct EspPlatform {
    delay: Delay,
}

impl EspPlatform {
    pub fn new() -> Self {
        Self { delay: Delay::new() }
    }
}

impl DelayNs for EspPlatform {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }
}

impl Platform for EspPlatform {
    fn now_millis(&self) -> u64 {
        Instant::now().as_millis()
    }

    fn restart(&mut self) {
        esp_hal::system::software_reset()
    }
}

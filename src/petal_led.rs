//! The petal LED on an LEDC PWM channel

use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::ledc::channel::{self, ChannelHW, ChannelIFace};
use esp_hal::ledc::timer::{self, TimerIFace};
use esp_hal::ledc::{Ledc, LowSpeed};
use esp_hal::time::Rate;
use pulse_lotus::hal::PetalChannel;

/// PWM frequency, well above anything that flickers
const PWM_FREQUENCY_KHZ: u32 = 24;

pub type PetalTimer = timer::Timer<'static, LowSpeed>;

pub struct PetalLed {
    channel: channel::Channel<'static, LowSpeed>,
}

impl PetalLed {
    /// Set `timer` up for 8 bit duty and drive `pin` from LEDC channel 0. The timer has to
    /// outlive the channel, hence the `'static`.
    pub fn new(ledc: &Ledc<'static>, timer: &'static mut PetalTimer, pin: impl PeripheralOutput<'static>) -> Self {
        timer
            .configure(timer::config::Config {
                duty: timer::config::Duty::Duty8Bit,
                clock_source: timer::LSClockSource::APBClk,
                frequency: Rate::from_khz(PWM_FREQUENCY_KHZ),
            })
            .expect("Failed to configure the petal PWM timer");
        let timer: &'static PetalTimer = timer;

        let mut channel = ledc.channel(channel::Number::Channel0, pin);
        channel
            .configure(channel::config::Config {
                timer,
                duty_pct: 0,
                pin_config: channel::config::PinConfig::PushPull,
            })
            .expect("Failed to configure the petal PWM channel");
        Self { channel }
    }
}

impl PetalChannel for PetalLed {
    fn set_brightness(&mut self, brightness: u8) {
        // 8 bit duty, so brightness is the duty cycle
        self.channel.set_duty_hw(brightness as u32);
    }
}

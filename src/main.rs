#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

#[cfg(target_os = "none")]
mod led_driver;
#[cfg(target_os = "none")]
mod petal_led;
#[cfg(target_os = "none")]
mod platform;

#[cfg(target_os = "none")]
use {
    crate::led_driver::LedDriver0,
    crate::petal_led::PetalTimer,
    static_cell::StaticCell,
    // Global logger + panicking-behavior + memory layout
    defmt_rtt as _,
    esp_backtrace as _,
};

/// The stem driver holds a pulse buffer for every pixel, far too big for the stack
#[cfg(target_os = "none")]
static LED_DRIVER: StaticCell<LedDriver0> = StaticCell::new();

/// The petal PWM channel borrows its timer for as long as it lives
#[cfg(target_os = "none")]
static PETAL_TIMER: StaticCell<PetalTimer> = StaticCell::new();

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
#[cfg(target_os = "none")]
esp_bootloader_esp_idf::esp_app_desc!();

/// A single loop drives everything. It never blocks apart from the sensor burst read and
/// yields to the executor after every tick.
#[cfg(target_os = "none")]
#[esp_hal_embassy::main]
async fn main(_spawner: embassy_executor::Spawner) {
    use crate::led_driver::LedDriver;
    use crate::petal_led::PetalLed;
    use crate::platform::EspPlatform;
    use defmt::{error, info};
    use esp_hal::clock::CpuClock;
    use esp_hal::i2c::master::{Config as I2cConfig, I2c};
    use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed, timer};
    use esp_hal::time::Rate;
    use esp_hal::timer::systimer::SystemTimer;
    use pulse_lotus::installation::INSTALLATION_NAME;
    use pulse_lotus::orchestrator::Orchestrator;
    use pulse_lotus::si1143::Si1143;

    esp_println::logger::init_logger_from_env();
    info!("MAIN: Starting up {}", INSTALLATION_NAME);

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timer0 = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(timer0.alarm0);

    info!("MAIN: Setting up the pulse sensor");
    let i2c = I2c::new(peripherals.I2C0, I2cConfig::default().with_frequency(Rate::from_khz(400)))
        .expect("Failed to initialize I2C0")
        .with_sda(peripherals.GPIO22)
        .with_scl(peripherals.GPIO23);
    let mut sensor = Si1143::new(i2c);
    sensor.configure().expect("Failed to configure the Si1143");

    info!("MAIN: Setting up the stem LED driver");
    let stem: &'static mut LedDriver0 = LED_DRIVER.init(LedDriver::new(peripherals.RMT, peripherals.GPIO6));

    info!("MAIN: Setting up the petal PWM");
    let mut ledc = Ledc::new(peripherals.LEDC);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
    let petal_timer = PETAL_TIMER.init(ledc.timer::<LowSpeed>(timer::Number::Timer0));
    let petal = PetalLed::new(&ledc, petal_timer, peripherals.GPIO7);

    let mut orchestrator = Orchestrator::new(sensor, stem, petal, EspPlatform::new());
    orchestrator.start();

    info!("MAIN: Starting main loop");
    loop {
        // A sensor fault restarts the chip from inside the tick
        if orchestrator.tick().is_err() {
            error!("MAIN: Still running after a sensor fault restart");
        }
        embassy_futures::yield_now().await;
    }
}

#[cfg(not(target_os = "none"))]
fn main() {
    println!(
        "{} is firmware for the ESP32-C6. Build it with --target riscv32imac-unknown-none-elf, \
         or run `cargo test` to exercise the detector and animations on this machine.",
        pulse_lotus::installation::INSTALLATION_NAME
    );
}

use esp_hal::Blocking;
use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::peripherals::RMT;
use esp_hal::rmt::{Channel, Rmt, TxChannel};
use esp_hal::time::Rate;
use esp_hal_smartled::{SmartLedsAdapter, smart_led_buffer};
use log::warn;
use pulse_lotus::hal::LightStrip;
use pulse_lotus::installation::STEM_LED_COUNT;
use smart_leds::{RGB8, SmartLedsWrite};

/// The size of the RMT pulse buffer for the stem strip
const LED_INTERNAL_BUF_LEN: usize = STEM_LED_COUNT * 24 + 1;

pub type LedDriver0 = LedDriver<0>;

/// One colour per stem pixel
pub type LedBuffer = [RGB8; STEM_LED_COUNT];

/// Holds the state needed to drive the stem strip. It is big, so keep it in a StaticCell.
pub struct LedDriver<const C: u8>
where
    Channel<Blocking, C>: TxChannel,
{
    /// Driver for the led array. We have to size it here to exactly what we will get back from
    /// the `SmartLedsAdapter::new()` function when we set up the driver below
    led: SmartLedsAdapter<Channel<Blocking, C>, LED_INTERNAL_BUF_LEN>,
    buffer: LedBuffer,
}

impl LedDriver<0> {
    /// Create a new driver for the stem. It requires an RMT peripheral device and a GPIO pin.
    /// It is hardwired to use channel 0 for the RMT device
    ///
    /// # Parameters
    /// * `rmt` - The RMT peripheral device to use for driving the LED strip
    /// * `pin` - The GPIO pin to which the LED strip is connected
    pub fn new<'a>(rmt: RMT, pin: impl PeripheralOutput<'a>) -> Self {
        let frequency = Rate::from_mhz(80);
        let rmt_dev = Rmt::new(rmt, frequency).expect("Failed to initialize RMT0");
        let led = SmartLedsAdapter::new(rmt_dev.channel0, pin, smart_led_buffer!(STEM_LED_COUNT));
        Self {
            led,
            buffer: [RGB8::default(); STEM_LED_COUNT],
        }
    }
}

impl<const C: u8> LightStrip for LedDriver<C>
where
    Channel<Blocking, C>: TxChannel,
{
    fn len(&self) -> usize {
        STEM_LED_COUNT
    }

    fn set_pixel(&mut self, index: usize, colour: RGB8) {
        if let Some(pixel) = self.buffer.get_mut(index) {
            *pixel = colour;
        }
    }

    fn clear(&mut self) {
        self.buffer.fill(RGB8::default());
    }

    /// Note that the update is a blocking operation, but at 300 pixels it is about 9ms. It only
    /// happens when the pulse moves.
    fn push(&mut self) {
        if let Err(e) = self.led.write(self.buffer.iter().cloned()) {
            warn!("LED_DRIVER: Failed to update the stem: {:?}", e);
        }
    }
}

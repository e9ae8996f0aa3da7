//! The hardware the core talks to. The firmware provides esp-hal backed implementations,
//! tests provide fakes.

use crate::heartbeat::Sample;
use embedded_hal::delay::DelayNs;
use smart_leds::RGB8;

/// The optical pulse sensor. One call is one raw three channel read.
pub trait PulseSensor {
    fn is_present(&mut self) -> bool;

    /// A read that fails on the bus must come back as all zero so it is treated as a
    /// sensor fault.
    fn fetch_sample(&mut self) -> Sample;
}

/// An addressable LED strip with a local frame buffer
pub trait LightStrip {
    fn len(&self) -> usize;

    /// Write one pixel into the buffer. Out of range indices are ignored.
    fn set_pixel(&mut self, index: usize, colour: RGB8);

    /// Blank the buffer. Nothing changes on the strip until [LightStrip::push].
    fn clear(&mut self);

    /// Send the buffer to the LEDs
    fn push(&mut self);
}

/// A single dimmable light
pub trait PetalChannel {
    fn set_brightness(&mut self, brightness: u8);
}

/// Services from the board itself
pub trait Platform: DelayNs {
    /// Monotonic milliseconds since boot
    fn now_millis(&self) -> u64;

    /// Reboot the device. On hardware this never returns.
    fn restart(&mut self);
}

impl<T: LightStrip + ?Sized> LightStrip for &mut T {
    fn len(&self) -> usize {
        T::len(self)
    }

    fn set_pixel(&mut self, index: usize, colour: RGB8) {
        T::set_pixel(self, index, colour)
    }

    fn clear(&mut self) {
        T::clear(self)
    }

    fn push(&mut self) {
        T::push(self)
    }
}

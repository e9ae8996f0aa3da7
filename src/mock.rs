//! Fakes for the hardware traits

use crate::hal::{LightStrip, PetalChannel, Platform, PulseSensor};
use crate::heartbeat::Sample;
use embedded_hal::delay::DelayNs;
use smart_leds::RGB8;
use std::collections::VecDeque;

/// Milliseconds between ticks in the scripted tests
pub const TICK_MS: u64 = 10;

/// Finger on the sensor, between pulses
pub const PULSE_HIGH: Sample = Sample::new(10_000, 70_000, 70_000);

/// Finger on the sensor, blood pulse absorbing IR
pub const PULSE_LOW: Sample = Sample::new(10_000, 30_000, 30_000);

/// A square pulse that spends `half_period` ticks high then `half_period` ticks low
pub fn pulse_wave(tick: usize, half_period: usize) -> Sample {
    if (tick / half_period) % 2 == 0 { PULSE_HIGH } else { PULSE_LOW }
}

/// Hands out the script first, then `level` forever
pub struct ScriptedSensor {
    pub level: Sample,
    pub script: VecDeque<Sample>,
    pub fetches: usize,
    pub present: bool,
}

impl ScriptedSensor {
    pub fn new(level: Sample) -> Self {
        Self {
            level,
            script: VecDeque::new(),
            fetches: 0,
            present: true,
        }
    }

    pub fn with_script(script: &[Sample]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            ..Self::new(Sample::default())
        }
    }
}

impl PulseSensor for ScriptedSensor {
    fn is_present(&mut self) -> bool {
        self.present
    }

    fn fetch_sample(&mut self) -> Sample {
        self.fetches += 1;
        self.script.pop_front().unwrap_or(self.level)
    }
}

pub struct RecordingStrip {
    pub pixels: Vec<RGB8>,
    pub pushes: usize,
}

impl RecordingStrip {
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![RGB8::default(); len],
            pushes: 0,
        }
    }

    /// A strip with every pixel on
    pub fn lit(len: usize) -> Self {
        Self {
            pixels: vec![RGB8::new(1, 2, 3); len],
            pushes: 0,
        }
    }

    pub fn is_dark(&self) -> bool {
        self.pixels.iter().all(|p| *p == RGB8::default())
    }
}

impl LightStrip for RecordingStrip {
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set_pixel(&mut self, index: usize, colour: RGB8) {
        if let Some(p) = self.pixels.get_mut(index) {
            *p = colour;
        }
    }

    fn clear(&mut self) {
        self.pixels.fill(RGB8::default());
    }

    fn push(&mut self) {
        self.pushes += 1;
    }
}

#[derive(Default)]
pub struct RecordingPetal {
    pub levels: Vec<u8>,
}

impl PetalChannel for RecordingPetal {
    fn set_brightness(&mut self, brightness: u8) {
        self.levels.push(brightness);
    }
}

#[derive(Default)]
pub struct FakePlatform {
    pub now: u64,
    pub delayed_ns: u64,
    pub restarts: u32,
}

impl DelayNs for FakePlatform {
    fn delay_ns(&mut self, ns: u32) {
        self.delayed_ns += ns as u64;
    }
}

impl Platform for FakePlatform {
    fn now_millis(&self) -> u64 {
        self.now
    }

    fn restart(&mut self) {
        self.restarts += 1;
    }
}

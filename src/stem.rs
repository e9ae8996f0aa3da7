//! The stem: a pulse of light that runs up the strip after every beat.
//!
//! The pulse runs the full length of the strip in half a beat period, then the strip goes
//! dark. A new beat restarts it from the bottom.

use crate::colour::pulse_pixel;
use crate::configuration::{MILLIS_PER_MINUTE, STEM_PERIOD_FRACTION};
use crate::hal::LightStrip;
use crate::heartbeat::BeatTiming;
use crate::installation::{STEM_COLOUR, STEM_PULSE_WIDTH};
use crate::utils::{clamp_bpm, window_progress};
use log::debug;
use smart_leds::RGB8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StemPhase {
    Idle,
    Active,
}

pub struct StemAnimator {
    phase: StemPhase,
    /// LED at the centre of the pulse
    current_led: usize,
    /// Pixels either side of the centre that are lit
    pulse_width: usize,
    colour: RGB8,
}

impl Default for StemAnimator {
    fn default() -> Self {
        Self::new(STEM_PULSE_WIDTH, STEM_COLOUR)
    }
}

impl StemAnimator {
    pub fn new(pulse_width: usize, colour: RGB8) -> Self {
        Self {
            phase: StemPhase::Idle,
            current_led: 0,
            pulse_width,
            colour,
        }
    }

    pub fn phase(&self) -> StemPhase {
        self.phase
    }

    pub fn current_led(&self) -> usize {
        self.current_led
    }

    /// A new beat arrived. Blank the strip and start the pulse from the bottom.
    pub fn begin_active<L: LightStrip>(&mut self, strip: &mut L) {
        strip.clear();
        strip.push();
        self.current_led = 0;
        self.phase = StemPhase::Active;
    }

    /// Move the pulse along for the time `now`. The strip is only repainted when the pulse
    /// moves to a different LED.
    ///
    /// Returns true once the pulse has reached the end of the strip. The strip is dark
    /// again at that point and the animator is idle.
    pub fn update<L: LightStrip>(&mut self, now: u64, timing: BeatTiming, strip: &mut L) -> bool {
        let bpm = clamp_bpm(timing.bpm);
        let run_time = MILLIS_PER_MINUTE as f32 / (bpm as f32 / STEM_PERIOD_FRACTION);
        let next_beat = timing.last_beat + run_time as u64;
        let progress = window_progress(timing.last_beat, next_beat, now);

        let len = strip.len();
        let led = (progress * len as f32) as usize;
        if led != self.current_led {
            self.paint_window(strip, RGB8::default());
            self.current_led = led;
            self.paint_window(strip, self.colour);
            strip.push();
        }

        if self.current_led >= len || progress >= 1.0 {
            debug!("STEM: Reached the top at {} ms", now);
            self.current_led = 0;
            strip.clear();
            strip.push();
            self.phase = StemPhase::Idle;
            return true;
        }
        false
    }

    /// Paint the pulse window around the current LED. Black erases it. Indices past the
    /// end of the strip pile up on the last LED.
    fn paint_window<L: LightStrip>(&self, strip: &mut L, colour: RGB8) {
        let len = strip.len() as isize;
        let width = self.pulse_width as isize;
        let centre = self.current_led as isize;
        for offset in -width..width {
            let index = centre + offset;
            if index < 0 || index > len {
                continue;
            }
            let pixel = pulse_pixel(offset.unsigned_abs(), colour);
            strip.set_pixel(index.min(len - 1) as usize, pixel);
        }
    }
}

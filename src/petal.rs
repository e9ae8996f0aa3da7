//! "Throb" the brightness of the petal once per beat: a quick rise then a slower fall.

use crate::configuration::{MILLIS_PER_MINUTE, PETAL_FALL_MS, PETAL_MIN_BRIGHTNESS, PETAL_RISE_MS};
use crate::hal::PetalChannel;
use crate::heartbeat::BeatTiming;
use crate::utils::{clamp_bpm, clip_min, window_progress};
use log::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PetalPhase {
    Idle,
    Rising,
    Falling,
}

#[derive(Clone, Debug)]
pub struct PetalAnimator {
    phase: PetalPhase,
    rise_start: u64,
    rise_end: u64,
    fall_start: u64,
    fall_end: u64,
    brightness: u8,
}

impl Default for PetalAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl PetalAnimator {
    pub fn new() -> Self {
        Self {
            phase: PetalPhase::Idle,
            rise_start: 0,
            rise_end: 0,
            fall_start: 0,
            fall_end: 0,
            brightness: 0,
        }
    }

    pub fn phase(&self) -> PetalPhase {
        self.phase
    }

    /// Last brightness written to the petal
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Start a rise. A rise that is still running keeps its start time. If the previous
    /// fall has not finished, the start is moved back so the rise carries on from the
    /// brightness the fall got to.
    pub fn begin_rising(&mut self, now: u64, timing: BeatTiming) {
        let next_beat = timing.last_beat + (MILLIS_PER_MINUTE / clamp_bpm(timing.bpm) as u32) as u64;
        debug!("PETAL: Rising at {} ms, next beat due at {} ms", now, next_beat);

        if now > self.rise_end {
            self.rise_start = now;
        }
        if now < self.fall_end {
            let left = (self.fall_end - now) as f32 / PETAL_FALL_MS as f32;
            self.rise_start = now.saturating_sub((left * PETAL_RISE_MS as f32) as u64);
        }
        self.rise_end = self.rise_start + PETAL_RISE_MS;
        self.phase = PetalPhase::Rising;
    }

    /// Returns true when the petal has reached full brightness
    pub fn update_rising<P: PetalChannel>(&mut self, now: u64, petal: &mut P) -> bool {
        let progress = window_progress(self.rise_start, self.rise_end, now);
        self.write(clip_min((255.0 * progress) as i16, PETAL_MIN_BRIGHTNESS), petal);
        progress >= 1.0
    }

    pub fn begin_falling(&mut self, now: u64) {
        debug!("PETAL: Falling at {} ms", now);
        self.fall_start = now;
        self.fall_end = now + PETAL_FALL_MS;
        self.phase = PetalPhase::Falling;
    }

    /// Returns true when the petal is back down at its floor
    pub fn update_falling<P: PetalChannel>(&mut self, now: u64, petal: &mut P) -> bool {
        let progress = window_progress(self.fall_start, self.fall_end, now);
        self.write(clip_min(255 - (255.0 * progress) as i16, PETAL_MIN_BRIGHTNESS), petal);
        let done = progress >= 1.0;
        if done {
            self.phase = PetalPhase::Idle;
        }
        done
    }

    fn write<P: PetalChannel>(&mut self, brightness: u8, petal: &mut P) {
        self.brightness = brightness;
        petal.set_brightness(brightness);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::RecordingPetal;

    const TIMING: BeatTiming = BeatTiming {
        last_beat: 1_000,
        bpm: 75,
    };

    #[test]
    pub fn if_it_rises_then_falls() {
        let mut petal = PetalAnimator::new();
        let mut channel = RecordingPetal::default();
        let mut now = 1_000;

        petal.begin_rising(now, TIMING);
        assert_eq!(petal.phase(), PetalPhase::Rising);
        while !petal.update_rising(now, &mut channel) {
            now += 30;
        }
        let rise_steps = channel.levels.len();
        assert_eq!(now, 1_300);
        assert_eq!(petal.brightness(), 255);

        petal.begin_falling(now);
        assert_eq!(petal.phase(), PetalPhase::Falling);
        while !petal.update_falling(now, &mut channel) {
            now += 60;
        }
        assert_eq!(now, 1_900);
        assert_eq!(petal.phase(), PetalPhase::Idle);
        assert_eq!(petal.brightness(), PETAL_MIN_BRIGHTNESS);

        let (rise, fall) = channel.levels.split_at(rise_steps);
        assert!(channel.levels.iter().all(|b| (PETAL_MIN_BRIGHTNESS..=255).contains(b)));
        assert!(rise.windows(2).all(|w| w[0] < w[1]), "rise {rise:?}");
        assert!(fall.windows(2).all(|w| w[0] > w[1]), "fall {fall:?}");
    }

    #[test]
    pub fn if_the_floor_holds() {
        let mut petal = PetalAnimator::new();
        let mut channel = RecordingPetal::default();
        petal.begin_rising(500, TIMING);
        petal.update_rising(500, &mut channel);
        petal.update_rising(501, &mut channel);
        assert_eq!(channel.levels, vec![8, 8]);
    }

    #[test]
    pub fn if_a_running_rise_keeps_its_start() {
        let mut petal = PetalAnimator::new();
        let mut channel = RecordingPetal::default();
        petal.begin_rising(1_000, TIMING);
        petal.begin_rising(1_150, TIMING);
        assert!(!petal.update_rising(1_150, &mut channel));
        assert_eq!(petal.brightness(), 127);
        assert!(petal.update_rising(1_300, &mut channel));
    }

    #[test]
    pub fn if_a_rise_picks_up_from_a_fall() {
        let mut petal = PetalAnimator::new();
        let mut channel = RecordingPetal::default();
        petal.begin_rising(1_000, TIMING);
        petal.update_rising(1_300, &mut channel);
        petal.begin_falling(1_300);

        // Half way down the fall
        petal.update_falling(1_600, &mut channel);
        let falling = petal.brightness();
        assert_eq!(falling, 128);

        petal.begin_rising(1_600, TIMING);
        petal.update_rising(1_600, &mut channel);
        assert!(petal.brightness().abs_diff(falling) <= 1);
        // and it gets to the top in the remaining half of the rise
        assert!(petal.update_rising(1_750, &mut channel));
    }
}

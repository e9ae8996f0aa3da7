//! Heart beat detection from the raw photodiode channels.
//!
//! The IR channels carry the pulse. We keep track of a high frequency signal (the fast
//! residual from the baseline) and a low frequency signal. The low frequency signal is shifted
//! downwards slightly as heart beats are negative peaks, and the high frequency signal has
//! some hysteresis added. When the high frequency signal crosses below the shifted low
//! frequency signal we are in a beat. The red channel is tracked alongside for the
//! oxygenation ratio that is logged with each beat.

use crate::configuration::{
    BASELINE_PRIME_OFFSET, EXTREMUM_RESET_MS, HYSTERESIS_DIVISOR, HYSTERESIS_MAX, HYSTERESIS_MIN, LOW_FREQ_ALPHA,
    MILLIS_PER_MINUTE, SAMPLES_TO_AVERAGE, THRESHOLD_SHIFT,
};
use crate::hal::PulseSensor;
use crate::presence::{FingerPresence, Presence};
use crate::tracker::ChannelTracker;
use crate::utils::smooth;
use core::fmt;
use log::{debug, info};

/// One reading of the three photodiode channels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sample {
    pub red: u32,
    pub ir1: u32,
    pub ir2: u32,
}

impl Sample {
    pub const fn new(red: u32, ir1: u32, ir2: u32) -> Self {
        Self { red, ir1, ir2 }
    }

    pub fn total(&self) -> u32 {
        self.red.saturating_add(self.ir1).saturating_add(self.ir2)
    }

    pub fn ir_total(&self) -> u32 {
        self.ir1.saturating_add(self.ir2)
    }

    /// Every channel reads zero. The sensor has locked up or dropped off the bus.
    pub fn is_blank(&self) -> bool {
        self.red == 0 && self.ir1 == 0 && self.ir2 == 0
    }

    /// Read a burst of [SAMPLES_TO_AVERAGE] samples and average them. This blocks for the
    /// duration of the burst.
    pub fn acquire<S: PulseSensor>(sensor: &mut S) -> Result<Sample, SensorFault> {
        let mut sum = Sample::default();
        for _ in 0..SAMPLES_TO_AVERAGE {
            let s = sensor.fetch_sample();
            sum.red = sum.red.saturating_add(s.red);
            sum.ir1 = sum.ir1.saturating_add(s.ir1);
            sum.ir2 = sum.ir2.saturating_add(s.ir2);
        }
        let average = Sample::new(
            sum.red / SAMPLES_TO_AVERAGE,
            sum.ir1 / SAMPLES_TO_AVERAGE,
            sum.ir2 / SAMPLES_TO_AVERAGE,
        );
        if average.is_blank() { Err(SensorFault) } else { Ok(average) }
    }
}

/// All channels of the pulse sensor read zero. Only a restart recovers from this.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorFault;

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("all pulse sensor channels read zero")
    }
}

impl core::error::Error for SensorFault {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeatEvent {
    /// No change in the beat classification
    None,
    /// The signal just dropped into a beat
    BeatStart,
    /// The signal just came back out of a beat
    BeatEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetectionResult {
    pub event: BeatEvent,
    /// On a [BeatEvent::BeatStart] this is the rate measured from that beat, and is `None` when
    /// there was no usable previous beat. Otherwise it is the latest known rate.
    pub bpm: Option<u16>,
}

/// What the animations need to know to pace themselves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeatTiming {
    /// Time of the last beat start in milliseconds
    pub last_beat: u64,
    /// Unclamped beats per minute
    pub bpm: u16,
}

#[derive(Clone, Debug, Default)]
pub struct BeatDetector {
    ir: ChannelTracker,
    red: ChannelTracker,
    /// Decision baseline, a faster smoothing of the IR residual
    low_freq: f32,
    /// Added to the IR output before thresholding. Negative while in a beat.
    hysteresis: f32,
    /// Set from the first sample we see
    last_peak_time: Option<u64>,
    last_valley_time: Option<u64>,
    in_beat: bool,
    presence: FingerPresence,
    last_beat: Option<u64>,
    previous_beat: Option<u64>,
    latest_bpm: Option<u16>,
}

impl BeatDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one averaged sample through the detector. `now` is the time of the sample in
    /// milliseconds.
    pub fn process(&mut self, sample: Sample, now: u64) -> DetectionResult {
        let total = sample.total();
        let last_peak = *self.last_peak_time.get_or_insert(now);
        let last_valley = *self.last_valley_time.get_or_insert(now);

        let presence = self.presence.observe(total);
        if presence == Presence::NewFinger {
            info!("DETECTOR: Found new finger");
        }
        if presence.is_priming() {
            self.ir.prime_baseline(total as f32 - BASELINE_PRIME_OFFSET);
            return self.quiet();
        }
        if presence == Presence::Absent {
            return self.quiet();
        }

        let residual = self.ir.update(sample.ir_total() as f32);
        self.red.update(sample.red as f32);

        let ir_output = self.ir.high_freq + self.hysteresis;
        self.low_freq = smooth(residual, LOW_FREQ_ALPHA, self.low_freq);
        let threshold = self.low_freq - self.ir.amplitude() as f32 * THRESHOLD_SHIFT;

        self.ir.track_peak();
        self.red.track_peak();
        if now.saturating_sub(last_peak) > EXTREMUM_RESET_MS {
            self.ir.decay_peak();
            self.red.decay_peak();
            self.last_peak_time = Some(now);
        }

        self.ir.track_valley();
        self.red.track_valley();
        if now.saturating_sub(last_valley) > EXTREMUM_RESET_MS {
            self.ir.decay_valley();
            self.red.decay_valley();
            self.last_valley_time = Some(now);
        }

        let hysteresis = (self.ir.amplitude() / HYSTERESIS_DIVISOR).clamp(HYSTERESIS_MIN, HYSTERESIS_MAX) as f32;

        let was_in_beat = self.in_beat;
        if ir_output < threshold {
            self.in_beat = true;
            self.hysteresis = -hysteresis;
            self.ir.settle_valley();
            self.red.settle_valley();
            self.last_valley_time = Some(now);
        } else {
            self.in_beat = false;
            self.hysteresis = hysteresis;
            self.ir.settle_peak();
            self.red.settle_peak();
            self.last_peak_time = Some(now);
        }

        match (was_in_beat, self.in_beat) {
            (true, false) => {
                debug!("DETECTOR: Beat end at {} ms", now);
                DetectionResult {
                    event: BeatEvent::BeatEnd,
                    bpm: self.latest_bpm,
                }
            }
            (false, true) => {
                let bpm = self.record_beat(now);
                info!(
                    "DETECTOR: Beat at {} ms, BPM {:?}, IR signal {}, SpO2 ratio {:.3}",
                    now,
                    bpm,
                    self.ir.signal_size,
                    self.oxygen_ratio()
                );
                DetectionResult {
                    event: BeatEvent::BeatStart,
                    bpm,
                }
            }
            _ => self.quiet(),
        }
    }

    /// Timing of the latest beat, once a rate is known
    pub fn timing(&self) -> Option<BeatTiming> {
        Some(BeatTiming {
            last_beat: self.last_beat?,
            bpm: self.latest_bpm?,
        })
    }

    #[cfg(test)]
    pub fn latest_bpm(&self) -> Option<u16> {
        self.latest_bpm
    }

    #[cfg(test)]
    pub fn in_beat(&self) -> bool {
        self.in_beat
    }

    /// Ratio of the red to the IR baseline. Rises with blood oxygenation but it is not
    /// calibrated, so it is only good for the log.
    pub fn oxygen_ratio(&self) -> f32 {
        let ir = self.ir.baseline / 2.0;
        if ir == 0.0 { 0.0 } else { self.red.baseline / ir }
    }

    /// Remember a beat start and work out the rate from the one before it. A rate needs a
    /// previous beat and a non zero interval.
    fn record_beat(&mut self, now: u64) -> Option<u16> {
        self.previous_beat = self.last_beat;
        self.last_beat = Some(now);
        let interval = now.checked_sub(self.previous_beat?).filter(|i| *i > 0)?;
        let bpm = (MILLIS_PER_MINUTE as u64 / interval).min(u16::MAX as u64) as u16;
        self.latest_bpm = Some(bpm);
        Some(bpm)
    }

    fn quiet(&self) -> DetectionResult {
        DetectionResult {
            event: BeatEvent::None,
            bpm: self.latest_bpm,
        }
    }
}

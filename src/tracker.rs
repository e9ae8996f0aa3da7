//! Track one photodiode channel.
//! Keeps a slow baseline, a fast high frequency residual and the peaks and valleys of that
//! residual. The smoothed peak to valley distance is the signal size used to scale the
//! beat threshold.
//!
//! Peaks, valleys and the signal size are integers and every update truncates towards zero.
//! The detector thresholds were tuned against exactly that behaviour.

use crate::configuration::{
    BASELINE_ALPHA, EXTREMUM_DECAY_ALPHA, EXTREMUM_SETTLE_ALPHA, HIGH_FREQ_ALPHA, VALLEY_SENTINEL,
};
use crate::utils::smooth;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelTracker {
    /// Slow moving average of the channel, the middle of the waveform
    pub baseline: f32,
    /// Fast moving average of the distance from the baseline
    pub high_freq: f32,
    /// Highest high frequency output since the last peak reset
    pub peak: i32,
    /// Lowest high frequency output since the last valley reset
    pub valley: i32,
    pub smoothed_peak: i32,
    pub smoothed_valley: i32,
    /// `smoothed_peak - smoothed_valley` as of the last beat
    pub signal_size: i32,
}

impl ChannelTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a guess at the baseline so the filters settle quickly
    pub fn prime_baseline(&mut self, guess: f32) {
        self.baseline = guess;
    }

    /// Feed one reading. Returns the residual (reading minus the updated baseline).
    pub fn update(&mut self, raw: f32) -> f32 {
        self.baseline = smooth(raw, BASELINE_ALPHA, self.baseline);
        let residual = raw - self.baseline;
        self.high_freq = smooth(residual, HIGH_FREQ_ALPHA, self.high_freq);
        residual
    }

    pub fn track_peak(&mut self) {
        if self.high_freq > self.peak as f32 {
            self.peak = self.high_freq as i32;
        }
    }

    pub fn track_valley(&mut self) {
        if self.high_freq < self.valley as f32 {
            self.valley = self.high_freq as i32;
        }
    }

    /// Nothing has reset the peak for too long. Fold it slowly into the smoothed peak.
    pub fn decay_peak(&mut self) {
        self.smoothed_peak = smooth_extremum(self.peak, EXTREMUM_DECAY_ALPHA, self.smoothed_peak);
        self.peak = 0;
    }

    pub fn decay_valley(&mut self) {
        self.smoothed_valley = smooth_extremum(self.valley, EXTREMUM_DECAY_ALPHA, self.smoothed_valley);
        self.valley = 0;
    }

    /// Called while outside a beat: the peak is current, take it and start over
    pub fn settle_peak(&mut self) {
        self.smoothed_peak = smooth_extremum(self.peak, EXTREMUM_SETTLE_ALPHA, self.smoothed_peak);
        self.peak = 0;
    }

    /// Called while inside a beat: take the valley, re-measure the signal and arm the
    /// valley tracker with the sentinel
    pub fn settle_valley(&mut self) {
        self.smoothed_valley = smooth_extremum(self.valley, EXTREMUM_SETTLE_ALPHA, self.smoothed_valley);
        self.signal_size = self.smoothed_peak - self.smoothed_valley;
        self.valley = VALLEY_SENTINEL;
    }

    /// Signal size usable as a beat amplitude. A negative size only shows up transiently
    /// after a reset and does not count.
    pub fn amplitude(&self) -> i32 {
        self.signal_size.max(0)
    }
}

fn smooth_extremum(raw: i32, alpha: f32, prior: i32) -> i32 {
    smooth(raw as f32, alpha, prior as f32) as i32
}

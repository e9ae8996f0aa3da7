//! Arb things I did not know where else to put

use crate::configuration::{BPM_MAX, BPM_MIN};

/// Exponential moving average. Smaller `alpha` responds more slowly.
pub fn smooth(raw: f32, alpha: f32, prior: f32) -> f32 {
    prior * (1.0 - alpha) + raw * alpha
}

/// Clip to a minimum value
pub fn clip_min(v: i16, min: u8) -> u8 {
    if v < min as i16 {
        min
    } else if v > 255 {
        255
    } else {
        v as u8
    }
}

/// Limit a measured heart rate to something we can animate. Noise regularly produces
/// absurd rates so this never rejects, it only clamps.
pub fn clamp_bpm(bpm: u16) -> u16 {
    bpm.clamp(BPM_MIN, BPM_MAX)
}

/// How far `now` is through the window `start..end`, from 0.0 to 1.0.
///
/// Once `now` passes `end` the remaining time is zero and the result is exactly 1.0.
pub fn window_progress(start: u64, end: u64, now: u64) -> f32 {
    let elapsed = now.saturating_sub(start);
    let remaining = end.saturating_sub(now);
    let span = elapsed + remaining;
    if span == 0 {
        return 1.0;
    }
    elapsed as f32 / span as f32
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn if_it_limits() {
        assert_eq!(clip_min(128, 10), 128);
        assert_eq!(clip_min(5, 10), 10);
        assert_eq!(clip_min(256, 10), 255);
        assert_eq!(clip_min(255, 10), 255);
    }

    #[test]
    pub fn if_smoothing_is_a_fixed_point() {
        for x in [-1234.5_f32, 0.0, 1.0, 20_000.0, 98_765.25] {
            for alpha in [0.2_f32, 0.6, 0.95, 0.99, 1.0] {
                assert_eq!(smooth(x, alpha, x), x);
            }
        }
    }

    #[test]
    pub fn if_smoothing_weights_the_new_value_by_alpha() {
        assert_eq!(smooth(100.0, 1.0, 0.0), 100.0);
        assert!((smooth(100.0, 0.2, 0.0) - 20.0).abs() < 1e-4);
        assert!((smooth(0.0, 0.6, 50.0) - 20.0).abs() < 1e-4);
    }

    #[test]
    pub fn if_bpm_is_always_clamped() {
        for bpm in [0_u16, 1, 44, 45, 46, 75, 99, 100, 101, 600, u16::MAX] {
            let clamped = clamp_bpm(bpm);
            assert!((BPM_MIN..=BPM_MAX).contains(&clamped), "{bpm} -> {clamped}");
        }
        assert_eq!(clamp_bpm(75), 75);
        assert_eq!(clamp_bpm(10), 45);
        assert_eq!(clamp_bpm(180), 100);
    }

    #[test]
    pub fn if_window_progress_spans_the_window() {
        assert_eq!(window_progress(1000, 1300, 1000), 0.0);
        assert!((window_progress(1000, 1300, 1150) - 0.5).abs() < 1e-6);
        assert_eq!(window_progress(1000, 1300, 1300), 1.0);
        assert_eq!(window_progress(1000, 1300, 5000), 1.0);
        assert_eq!(window_progress(1000, 1000, 1000), 1.0);
    }
}

//! Tuning constants for beat detection and the light animations. These were found
//! empirically on the installation, so change them with care.

/// Raw reads averaged into one sample on every loop
pub const SAMPLES_TO_AVERAGE: u32 = 5;

/// Sum of all three channels above which we consider a finger to be on the sensor
pub const PRESENCE_THRESHOLD: u32 = 20_000;

/// The IR baseline is primed this far below the channel total while a new finger settles
pub const BASELINE_PRIME_OFFSET: f32 = 200.0;

/// Number of ticks after a new finger during which no beats are reported
pub const PRIMING_TICKS: u8 = 20;

/// The presence counter saturates here so it never rolls over
pub const PRESENCE_COUNTER_CAP: u8 = 25;

/// Smoothing of the slow channel baseline
pub const BASELINE_ALPHA: f32 = 0.99;

/// Smoothing of the high frequency residual
pub const HIGH_FREQ_ALPHA: f32 = 0.2;

/// Smoothing of the low frequency decision baseline
pub const LOW_FREQ_ALPHA: f32 = 0.95;

/// Smoothing applied to peaks and valleys when their timers expire
pub const EXTREMUM_DECAY_ALPHA: f32 = 0.6;

/// Smoothing applied to peaks and valleys on every classification
pub const EXTREMUM_SETTLE_ALPHA: f32 = 0.99;

/// Peak and valley trackers are reset if nothing reset them for this long. Slower than
/// the lowest human heart rate.
pub const EXTREMUM_RESET_MS: u64 = 1800;

/// Signal size is divided by this to get the hysteresis
pub const HYSTERESIS_DIVISOR: i32 = 15;

/// Hysteresis lower bound
pub const HYSTERESIS_MIN: i32 = 35;

/// Hysteresis upper bound
pub const HYSTERESIS_MAX: i32 = 120;

/// Fraction of the signal size the decision threshold is shifted down by. Heart beats
/// show up as negative peaks.
pub const THRESHOLD_SHIFT: f32 = 0.05;

/// A valley tracker is reset to this after a beat so the next sample always replaces it
pub const VALLEY_SENTINEL: i32 = 0x7FFF;

pub const MILLIS_PER_MINUTE: u32 = 60_000;

/// BPM is clamped to this range before it is used for any timing
pub const BPM_MIN: u16 = 45;
pub const BPM_MAX: u16 = 100;

/// The stem pulse travels the whole strip in this fraction of a beat period
pub const STEM_PERIOD_FRACTION: f32 = 0.5;

/// How long the petal takes to reach full brightness
pub const PETAL_RISE_MS: u64 = 300;

/// How long the petal takes to fade back down
pub const PETAL_FALL_MS: u64 = 600;

/// The petal never goes fully dark
pub const PETAL_MIN_BRIGHTNESS: u8 = 8;

/// Pause before restarting on a sensor fault so the log line gets out
pub const FAULT_RESTART_DELAY_MS: u32 = 500;

/// Interval between loop status lines
pub const STATUS_INTERVAL_MS: u64 = 1000;

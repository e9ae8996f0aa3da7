//! Finger presence.
//! A finger on the sensor pushes the channel total over a threshold. When that happens the
//! filters need a few samples to settle before their output means anything.

use crate::configuration::{PRESENCE_COUNTER_CAP, PRESENCE_THRESHOLD, PRIMING_TICKS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    /// The total just crossed the threshold from below. Priming starts now.
    NewFinger,
    /// Filters are still settling. Nothing should be reported.
    Priming,
    /// Primed and the signal is strong enough to look for beats
    Present,
    /// Primed but nothing is on the sensor
    Absent,
}

impl Presence {
    pub fn is_priming(self) -> bool {
        matches!(self, Presence::NewFinger | Presence::Priming)
    }
}

#[derive(Clone, Debug, Default)]
pub struct FingerPresence {
    last_total: u32,
    /// Ticks since the last new finger, saturating at the cap. Starts at zero so the
    /// filters are also primed after boot.
    counter: u8,
}

impl FingerPresence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one tick given the sum of all three channels
    pub fn observe(&mut self, total: u32) -> Presence {
        let new_finger = self.last_total < PRESENCE_THRESHOLD && total >= PRESENCE_THRESHOLD;
        self.last_total = total;
        if new_finger {
            self.counter = 0;
        }

        let presence = if self.counter < PRIMING_TICKS {
            if new_finger { Presence::NewFinger } else { Presence::Priming }
        } else if total >= PRESENCE_THRESHOLD {
            Presence::Present
        } else {
            Presence::Absent
        };

        self.counter = (self.counter + 1).min(PRESENCE_COUNTER_CAP);
        presence
    }
}

//! The control loop. Every tick polls the beat detector, then moves the stem and the petal
//! animations along.
//!
//! The loop keeps two states. `app_state` follows the sequence stem, petal rise, petal fall.
//! `petal_state` only remembers that the petal is falling, so a fall keeps running after a
//! new beat has moved `app_state` back to the stem.

use crate::configuration::{FAULT_RESTART_DELAY_MS, STATUS_INTERVAL_MS};
use crate::hal::{LightStrip, PetalChannel, Platform, PulseSensor};
use crate::heartbeat::{BeatDetector, BeatEvent, DetectionResult, Sample, SensorFault};
use crate::petal::PetalAnimator;
use crate::stem::StemAnimator;
use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppState {
    Resting,
    StemRising,
    PetalRising,
    PetalFalling,
}

pub struct Orchestrator<S, L, P, H> {
    sensor: S,
    strip: L,
    petal_channel: P,
    platform: H,
    detector: BeatDetector,
    stem: StemAnimator,
    petal: PetalAnimator,
    app_state: AppState,
    petal_state: AppState,
    /// Status lines written so far
    loops: u32,
    last_status: u64,
}

impl<S, L, P, H> Orchestrator<S, L, P, H>
where
    S: PulseSensor,
    L: LightStrip,
    P: PetalChannel,
    H: Platform,
{
    pub fn new(sensor: S, strip: L, petal_channel: P, platform: H) -> Self {
        Self {
            sensor,
            strip,
            petal_channel,
            platform,
            detector: BeatDetector::new(),
            stem: StemAnimator::default(),
            petal: PetalAnimator::new(),
            app_state: AppState::Resting,
            petal_state: AppState::Resting,
            loops: 0,
            last_status: 0,
        }
    }

    /// Check the sensor is there and switch all the lights off
    pub fn start(&mut self) {
        if self.sensor.is_present() {
            info!("ORCHESTRATOR: Pulse sensor found");
        } else {
            warn!("ORCHESTRATOR: No pulse sensor found");
        }
        self.strip.clear();
        self.strip.push();
        self.petal_channel.set_brightness(0);
        self.last_status = self.platform.now_millis();
    }

    /// One pass of the control loop. A sensor fault restarts the device. The fault is only
    /// returned on platforms where a restart comes back.
    pub fn tick(&mut self) -> Result<DetectionResult, SensorFault> {
        let sample = match Sample::acquire(&mut self.sensor) {
            Ok(sample) => sample,
            Err(fault) => {
                error!("ORCHESTRATOR: {}. Restarting to fix the pulse sensor", fault);
                DelayNs::delay_ms(&mut self.platform, FAULT_RESTART_DELAY_MS);
                self.platform.restart();
                return Err(fault);
            }
        };
        let now = self.platform.now_millis();
        self.report_status(now);

        let result = self.detector.process(sample, now);
        let sensor_on = result.event == BeatEvent::BeatStart && result.bpm.is_some();

        if sensor_on {
            self.stem.begin_active(&mut self.strip);
            self.app_state = AppState::StemRising;
        } else if self.app_state == AppState::StemRising {
            if let Some(timing) = self.detector.timing() {
                if self.stem.update(now, timing, &mut self.strip) {
                    self.app_state = AppState::PetalRising;
                    self.petal.begin_rising(now, timing);
                }
            }
        }

        if self.app_state == AppState::PetalRising || self.petal_state == AppState::PetalRising {
            if self.petal.update_rising(now, &mut self.petal_channel) {
                if self.app_state == AppState::PetalRising {
                    self.app_state = AppState::PetalFalling;
                }
                self.petal_state = AppState::PetalFalling;
                self.petal.begin_falling(now);
            }
        } else if (self.app_state == AppState::PetalFalling || self.petal_state == AppState::PetalFalling)
            && self.petal.update_falling(now, &mut self.petal_channel)
        {
            if self.app_state == AppState::PetalFalling {
                self.app_state = AppState::Resting;
            }
            self.petal_state = AppState::Resting;
        }

        Ok(result)
    }

    pub fn app_state(&self) -> AppState {
        self.app_state
    }

    pub fn petal_state(&self) -> AppState {
        self.petal_state
    }

    pub fn detector(&self) -> &BeatDetector {
        &self.detector
    }

    fn report_status(&mut self, now: u64) {
        if now.saturating_sub(self.last_status) > STATUS_INTERVAL_MS {
            info!(
                "ORCHESTRATOR: ------------------ {} ------------------ {:?}/{:?}",
                self.loops, self.app_state, self.petal_state
            );
            self.last_status = now;
            self.loops += 1;
        }
    }
}

//! The per-cycle transmission orchestrator.
//!
//! Once per telemetry period: snapshot the sensors, run the snapshot
//! through the pipeline, submit the frame. Every failure mode drops the
//! cycle — no retry, no queueing — and the next cycle starts from clean
//! buffers.

use std::sync::atomic::{fence, Ordering};

use thiserror::Error;

use stint_core::cipher::CipherKey;
use stint_core::entropy::EntropySource;
use stint_core::pipeline::{build_frame, CycleBuffers, PipelineError};
use stint_core::snapshot::{Accelerometers, Pedals, SensorSnapshot, Suspensions, Wheels};

use crate::link::Link;
use crate::sensors::{Corner, SensorBank};

pub struct Orchestrator<S, L, E> {
    sensors: S,
    link: L,
    key: CipherKey,
    entropy: E,
    buffers: CycleBuffers,
    sent: u64,
    dropped: u64,
}

impl<S: SensorBank, L: Link, E: EntropySource> Orchestrator<S, L, E> {
    pub fn new(sensors: S, link: L, key: CipherKey, entropy: E) -> Self {
        Self {
            sensors,
            link,
            key,
            entropy,
            buffers: CycleBuffers::new(),
            sent: 0,
            dropped: 0,
        }
    }

    /// Run one full telemetry cycle.
    pub fn run_cycle(&mut self) -> Result<(), CycleError> {
        let snapshot = self.capture();

        let outcome = (|| {
            let frame = build_frame(&snapshot, &self.key, &mut self.entropy, &mut self.buffers)?;
            if self.link.write(frame.as_bytes()) {
                Ok(())
            } else {
                Err(CycleError::LinkWrite)
            }
        })();

        match outcome {
            Ok(()) => self.sent += 1,
            Err(_) => self.dropped += 1,
        }
        outcome
    }

    /// Frames accepted by the link so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Cycles dropped so far, for any reason.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Assemble one snapshot from the sensor bank.
    ///
    /// The wheel-speed registers are updated pairwise from the
    /// speed-capture interrupt; the fence before each read orders it
    /// after the previous one, so the snapshot never mixes a stale and a
    /// fresh half of a paired update.
    fn capture(&self) -> SensorSnapshot {
        let s = &self.sensors;

        let pedals = Pedals {
            tps1: s.tps1(),
            tps2: s.tps2(),
            brake: s.brake(),
            apps_plaus: s.apps_plaus(),
            brake_plaus: s.brake_plaus(),
        };

        let suspensions = Suspensions {
            front_sx: s.suspension(Corner::FrontSx),
            front_dx: s.suspension(Corner::FrontDx),
            retro_sx: s.suspension(Corner::RetroSx),
            retro_dx: s.suspension(Corner::RetroDx),
        };

        fence(Ordering::SeqCst);
        let front_sx = s.wheel_rpm(Corner::FrontSx);
        fence(Ordering::SeqCst);
        let front_dx = s.wheel_rpm(Corner::FrontDx);
        fence(Ordering::SeqCst);
        let retro_sx = s.wheel_rpm(Corner::RetroSx);
        fence(Ordering::SeqCst);
        let retro_dx = s.wheel_rpm(Corner::RetroDx);

        let wheels = Wheels {
            front_sx,
            front_dx,
            retro_sx,
            retro_dx,
        };

        let accelerometers = Accelerometers {
            acc_x: s.acc_x(),
            acc_z: s.acc_z(),
        };

        SensorSnapshot {
            pedals,
            suspensions,
            wheels,
            accelerometers,
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The transport did not accept the frame. The cycle's telemetry is
    /// dropped; the next cycle sends fresh values.
    #[error("link did not accept the frame")]
    LinkWrite,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

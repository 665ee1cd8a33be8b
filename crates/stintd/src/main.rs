//! stintd — onboard telemetry node.
//!
//! Gathers a sensor snapshot once per telemetry period, encrypts and
//! frames it, and hands the frame to the point-to-point link. Dropped
//! cycles are logged and forgotten; health reporting belongs to the
//! outer system.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use stint_core::cipher::CipherKey;
use stint_core::entropy::OsEntropy;
use stint_core::frame::FRAME_LEN;

mod config;
mod cycle;
mod link;
mod sensors;

use config::StintConfig;
use cycle::Orchestrator;
use link::UdpLink;
use sensors::SimSensors;

/// Log a cycle summary this often.
const STATS_EVERY: u64 = 100;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = StintConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = StintConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        StintConfig::default()
    });

    let key = CipherKey::from_hex(&config.key.hex)
        .context("no usable cipher key provisioned (set key.hex in the config or STINT_KEY__HEX)")?;

    let link = UdpLink::open(&config.link.bind, &config.link.peer, config.link.channel)
        .context("failed to open the telemetry link")?;

    let mut orchestrator = Orchestrator::new(SimSensors::new(), link, key, OsEntropy::new());

    let period = Duration::from_millis(config.telemetry.period_ms);
    tracing::info!(
        period_ms = config.telemetry.period_ms,
        frame_len = FRAME_LEN,
        "stintd running"
    );

    // Transmit gate: the outer system (or a future operator surface)
    // clears it to stop the loop between cycles.
    let transmit = Arc::new(AtomicBool::new(true));

    let mut cycles: u64 = 0;
    while transmit.load(Ordering::Relaxed) {
        let started = Instant::now();

        if let Err(e) = orchestrator.run_cycle() {
            tracing::warn!(error = %e, "cycle dropped");
        }

        cycles += 1;
        if cycles % STATS_EVERY == 0 {
            tracing::info!(
                sent = orchestrator.sent(),
                dropped = orchestrator.dropped(),
                "telemetry cycles"
            );
        }

        if let Some(rest) = period.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    tracing::info!(
        sent = orchestrator.sent(),
        dropped = orchestrator.dropped(),
        "transmit gate cleared; stintd exiting"
    );
    Ok(())
}

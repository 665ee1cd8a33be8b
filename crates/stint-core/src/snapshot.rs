//! The telemetry snapshot — the wire schema.
//!
//! Field set, names, and order are a compile-time contract shared with
//! every deployed receiver; serde serializes struct fields in declaration
//! order, so the declarations below ARE the schema. There is no version
//! field — this is fixed instrumentation data, not user data, and a
//! schema change is a breaking change for the whole receiver population.
//!
//! The serialized form is compact JSON (no whitespace):
//!
//! ```text
//! {"pedals":{"tps1":..},"suspensions":{..},"wheels":{..},"accelerometers":{..}}
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use thiserror::Error;

use crate::cipher::CIPHERTEXT_LEN;

/// Worst-case serialized size in bytes: every numeric field at its
/// maximum printed width, both plausibility fields `false`.
pub const MAX_SERIALIZED_LEN: usize = 297;

// The fixed padded length must be able to absorb the worst-case snapshot
// plus at least one padding byte.
const_assert!(MAX_SERIALIZED_LEN < CIPHERTEXT_LEN);

// ── Schema ────────────────────────────────────────────────────────────────────

/// Pedal-box readings: both accelerator position sensors, brake pressure,
/// and the plausibility verdicts computed by the pedal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pedals {
    pub tps1: u8,
    pub tps2: u8,
    pub brake: u8,
    pub apps_plaus: bool,
    pub brake_plaus: bool,
}

/// Suspension travel per corner, raw sensor counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspensions {
    pub front_sx: u16,
    pub front_dx: u16,
    pub retro_sx: u16,
    pub retro_dx: u16,
}

/// Wheel rotational speed per corner, rpm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wheels {
    pub front_sx: u16,
    pub front_dx: u16,
    pub retro_sx: u16,
    pub retro_dx: u16,
}

/// Chassis acceleration, longitudinal and vertical axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accelerometers {
    pub acc_x: i16,
    pub acc_z: i16,
}

/// One immutable capture of the full sensor schema, taken once per
/// telemetry cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub pedals: Pedals,
    pub suspensions: Suspensions,
    pub wheels: Wheels,
    pub accelerometers: Accelerometers,
}

// ── Serialization ─────────────────────────────────────────────────────────────

/// Serialize `snapshot` as compact JSON into `out`, returning the exact
/// number of bytes written.
///
/// Deterministic: the same snapshot always yields byte-identical output.
/// Output that would exceed `out` fails with [`SerializeError::Overflow`]
/// instead of truncating — the buffer is sized against the worst-case
/// schema at compile time, so this is asserted, never assumed.
pub fn serialize_into(
    snapshot: &SensorSnapshot,
    out: &mut [u8],
) -> Result<usize, SerializeError> {
    let capacity = out.len();
    let mut writer = SliceWriter {
        buf: out,
        written: 0,
    };
    serde_json::to_writer(&mut writer, snapshot).map_err(|e| {
        if e.classify() == serde_json::error::Category::Io {
            SerializeError::Overflow { capacity }
        } else {
            SerializeError::Json(e)
        }
    })?;
    Ok(writer.written)
}

/// `io::Write` over a fixed slice that refuses to truncate.
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    written: usize,
}

impl io::Write for SliceWriter<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let end = self.written + data.len();
        if end > self.buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "plaintext buffer full",
            ));
        }
        self.buf[self.written..end].copy_from_slice(data);
        self.written = end;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SerializeError {
    /// The serialized snapshot would not fit the plaintext buffer.
    /// Schema and buffer sizes are both compile-time constants, so this
    /// occurring at runtime is a programming error.
    #[error("serialized snapshot exceeds the {capacity}-byte plaintext buffer")]
    Overflow { capacity: usize },

    #[error("snapshot serialization failed: {0}")]
    Json(#[source] serde_json::Error),
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample() -> SensorSnapshot {
        SensorSnapshot {
            pedals: Pedals {
                tps1: 23,
                tps2: 23,
                brake: 0,
                apps_plaus: true,
                brake_plaus: true,
            },
            suspensions: Suspensions {
                front_sx: 23,
                front_dx: 23,
                retro_sx: 23,
                retro_dx: 23,
            },
            wheels: Wheels {
                front_sx: 100,
                front_dx: 100,
                retro_sx: 100,
                retro_dx: 100,
            },
            accelerometers: Accelerometers { acc_x: 5, acc_z: -3 },
        }
    }

    fn serialize_to_string(snapshot: &SensorSnapshot) -> String {
        let mut buf = [0u8; CIPHERTEXT_LEN];
        let len = serialize_into(snapshot, &mut buf).unwrap();
        String::from_utf8(buf[..len].to_vec()).unwrap()
    }

    #[test]
    fn serialization_is_deterministic() {
        let snapshot = sample();
        assert_eq!(
            serialize_to_string(&snapshot),
            serialize_to_string(&snapshot)
        );
    }

    #[test]
    fn groups_appear_in_wire_order() {
        let json = serialize_to_string(&sample());
        let pedals = json.find("\"pedals\"").unwrap();
        let suspensions = json.find("\"suspensions\"").unwrap();
        let wheels = json.find("\"wheels\"").unwrap();
        let accelerometers = json.find("\"accelerometers\"").unwrap();
        assert!(pedals < suspensions && suspensions < wheels && wheels < accelerometers);
    }

    #[test]
    fn serialized_form_matches_the_receiver_contract() {
        let json = serialize_to_string(&sample());
        assert_eq!(
            json,
            "{\"pedals\":{\"tps1\":23,\"tps2\":23,\"brake\":0,\
             \"apps_plaus\":true,\"brake_plaus\":true},\
             \"suspensions\":{\"front_sx\":23,\"front_dx\":23,\
             \"retro_sx\":23,\"retro_dx\":23},\
             \"wheels\":{\"front_sx\":100,\"front_dx\":100,\
             \"retro_sx\":100,\"retro_dx\":100},\
             \"accelerometers\":{\"acc_x\":5,\"acc_z\":-3}}"
        );
    }

    #[test]
    fn round_trip_parse_recovers_the_snapshot() {
        let snapshot = sample();
        let json = serialize_to_string(&snapshot);
        let parsed: SensorSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn worst_case_snapshot_matches_the_declared_bound() {
        let widest = SensorSnapshot {
            pedals: Pedals {
                tps1: 100,
                tps2: 100,
                brake: 100,
                apps_plaus: false,
                brake_plaus: false,
            },
            suspensions: Suspensions {
                front_sx: u16::MAX,
                front_dx: u16::MAX,
                retro_sx: u16::MAX,
                retro_dx: u16::MAX,
            },
            wheels: Wheels {
                front_sx: u16::MAX,
                front_dx: u16::MAX,
                retro_sx: u16::MAX,
                retro_dx: u16::MAX,
            },
            accelerometers: Accelerometers {
                acc_x: i16::MIN,
                acc_z: i16::MIN,
            },
        };
        let mut buf = [0u8; CIPHERTEXT_LEN];
        let len = serialize_into(&widest, &mut buf).unwrap();
        assert_eq!(len, MAX_SERIALIZED_LEN);
    }

    #[test]
    fn overflow_fails_loudly_instead_of_truncating() {
        let mut tiny = [0u8; 16];
        match serialize_into(&sample(), &mut tiny) {
            Err(SerializeError::Overflow { capacity: 16 }) => {}
            other => panic!("expected Overflow, got {other:?}"),
        }
    }
}

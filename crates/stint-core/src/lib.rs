//! stint-core — snapshot schema, wire framing, and the cryptographic
//! telemetry pipeline. The node binary (`stintd`) composes these once per
//! telemetry cycle; everything here is pure apart from entropy
//! acquisition.

pub mod cipher;
pub mod entropy;
pub mod frame;
pub mod padding;
pub mod pipeline;
pub mod snapshot;

pub use pipeline::{build_frame, CycleBuffers, PipelineError};
pub use snapshot::SensorSnapshot;

//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that sessions expect from infrastructure.
//! They contain no implementation details and use only domain types.

pub mod device_bridge;
pub mod event_sink;

pub use device_bridge::{CommandOutput, DeviceBridgePort};
pub use event_sink::{EventSink, RecordingSink, SinkClosed};

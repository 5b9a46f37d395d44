//! Channel-facing layer: inbound event shapes, routing, reply rendering and
//! the CSV script reader used by the command-line channel.

pub mod channel;
pub mod csv;
pub mod render;
pub mod router;

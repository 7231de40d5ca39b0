/// Messages translated from error codes.
pub mod message;

/// CSV dialect and cell encoders.
pub mod preference;

/// Record abstraction filled by readers and consumed by writers.
pub mod row;

/// Expected headers, field bindings and per-column transforms.
pub mod schema;

/// Per-cell transforms.
pub mod transform;

//! Runtime type ids: small dense integers standing in for Rust types.
//!
//! Dispatch tables (views, operations, per-type object handlers) are plain
//! vectors indexed by these ids.

mod runtime_type;

pub use runtime_type::{RuntimeTypeId, TypeIdContext, global_type_id, MAX_RUNTIME_TYPES};

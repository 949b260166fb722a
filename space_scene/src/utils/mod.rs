//! Small containers shared across the crate.

mod slot_allocator;

pub use slot_allocator::SlotAllocator;

// # Zone Store Implementations
//
// This module provides implementations of the ZoneStore trait that do not
// depend on a remote provider.

pub mod memory;

pub use memory::MemoryZoneStore;

// # Device Storage Implementations
//
// This module provides implementations of the DeviceStorage trait for
// different persistence strategies.

pub mod file;
pub mod memory;

pub use file::{FileDeviceStorage, FileDeviceStorageFactory};
pub use memory::{MemoryDeviceStorage, MemoryDeviceStorageFactory};

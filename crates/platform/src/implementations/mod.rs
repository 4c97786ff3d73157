//! Platform-specific implementations

pub mod linux;

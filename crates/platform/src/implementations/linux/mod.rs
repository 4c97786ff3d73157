//! Linux host implementations

pub mod process;

pub use process::LinuxProcessOperations;

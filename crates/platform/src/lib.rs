#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform abstraction layer for Linux provisioning operations.
//!
//! This crate provides a unified interface for host interaction:
//! - Process execution, optionally escalated through a privilege command
//! - Privileged filesystem changes expressed as host commands
//! - Operating system detection from `os-release`
//!
//! All command execution goes through [`ProcessOperations`], so tests can
//! substitute a recording implementation without touching the host.

pub mod context;
pub mod detect;
pub mod filesystem;
pub mod implementations;
pub mod process;

pub use context::{Platform, PlatformContext};
pub use detect::OsRelease;
pub use implementations::linux::LinuxProcessOperations;
pub use process::{CommandOutput, PlatformCommand, ProcessOperations};

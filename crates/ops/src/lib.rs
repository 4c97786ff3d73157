#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Provisioning operations for a single Couchbase Server node
//!
//! This crate is the orchestration layer between the CLI and the host-facing
//! crates. [`provision`] runs the whole pass; the individual steps are public
//! so they can be driven and tested on their own.

mod context;
pub mod install;
pub mod pipeline;
pub mod preflight;
pub mod profiles;
pub mod request;
pub mod staging;
pub mod textpatch;
pub mod tuning;

pub use context::{OpsContextBuilder, OpsCtx};
pub use pipeline::provision;
pub use profiles::{AmazonLinuxProfile, PlatformProfile, ProfileRegistry, UbuntuProfile};
pub use request::{resolve_request, RequestArgs};

//! Helper library for the admin scripts that query and annotate
//! virtual machines on a vCenter-style management platform.
//!
//! - **logging**: console + file sink setup, configured once
//! - **types**: power state, custom fields, snapshots, object refs
//! - **vim**: narrow trait contracts over the platform services
//! - **vm**: per-VM facade (attributes, summary, age check)
//! - **view**: container-view enumeration
//! - **search**: lookups by guest IP and DNS name
//! - **client**: REST transport implementing the `vim` contracts
//! - **config** / **error**: connection settings and the error type

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod search;
pub mod types;
pub mod view;
pub mod vim;
pub mod vm;

pub use client::VcClient;
pub use config::VcConfig;
pub use error::{Error, Result};
pub use logging::LogConfig;
pub use types::{ObjectRef, PowerState, VmInfo, VmSnapshot};
pub use vm::Vm;

//! [`ScopeDirectory`](visor_core::ScopeDirectory) implementations: an HTTP
//! client against the external scope service, and an in-memory directory for
//! tests and air-gapped deployments.

mod fixed;
mod http;

pub use fixed::StaticScopeDirectory;
pub use http::{FailureMode, HttpScopeDirectory, ScopeRecord};

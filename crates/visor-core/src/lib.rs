pub mod access;
pub mod directory;
pub mod error;
pub mod id;
pub mod intent;
pub mod relationship;
pub mod repository;
pub mod uniqueness;
pub mod validate;

pub use directory::ScopeDirectory;
pub use error::{DomainError, ErrorKind};
pub use id::{IntentId, ScopeId};
pub use intent::{Intent, IntentPatch, IntentStatus};
pub use repository::IntentRepository;

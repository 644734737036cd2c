// src/lib.rs
//! Step-by-step resume builder backed by a remote parsing/summarizing service.

pub mod cli;
pub mod console;
pub mod core;
pub mod error;
pub mod logging;
pub mod preview;
pub mod store;
pub mod types;
pub mod utils;
pub mod wizard;

pub use crate::core::{ConfigManager, ResumeBackend, ServiceClient};
pub use error::{BackendError, NetworkError, StoreError, ValidationError};
pub use store::{ResumeSession, ResumeStore, StoreState};
pub use types::ResumeDocument;
pub use wizard::{Wizard, WizardStep};

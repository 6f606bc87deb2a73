//! Restore module - Style tables, validation, response unwrapping and the
//! per-style orchestration loop

pub mod classify;
pub mod orchestrator;
pub mod style;
pub mod unwrap;
pub mod validation;

pub use orchestrator::{RestorationOutcome, RestorationResult, Restorer};
pub use style::RestorationStyle;
pub use validation::{RestorationRequest, RestoreForm, UploadedImage};

//! Domain types shared across the promptpix workspace.
//!
//! - [`job`] — the generation job record, its status enum, and the
//!   create/patch DTOs exchanged with the job store.
//! - [`error`] — the controller-level error taxonomy.
//! - [`types`] — id and timestamp aliases.

pub mod error;
pub mod job;
pub mod types;

pub use error::ControllerError;
pub use job::{Job, JobPatch, JobStatus, NewJob};
pub use types::{JobId, Timestamp};

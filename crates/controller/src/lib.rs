//! The promptpix job controller.
//!
//! Drives a single image-generation job from submission through
//! completion, failure, or timeout:
//!
//! - [`JobController`] — submits the job, runs the poll loop to a
//!   terminal outcome, and exposes clear/delete/history operations.
//! - [`GenerationState`] — the local state presentation layers render,
//!   published on a `tokio::sync::watch` channel.
//! - [`poll`] — the bounded fixed-interval polling state machine.
//!
//! All collaborator calls go through the traits in
//! [`promptpix_backend`], so the whole controller runs against mocks in
//! tests.

pub mod controller;
pub mod poll;
pub mod state;

pub use controller::{Generated, JobController};
pub use poll::{PollConfig, PollOutcome};
pub use state::GenerationState;

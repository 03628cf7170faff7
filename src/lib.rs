//! Rental/contract lifecycle workflow core.
//!
//! A state machine over agreements, a gap-free serial allocator, per-agreement
//! audit threads and a notification outbox, all persisted in one shared
//! JSON document behind [`store::Persistence`].

pub mod config;
pub mod error;
pub mod outbox;
pub mod portal;
pub mod serial;
pub mod store;
pub mod thread;
pub mod workflow;

pub use error::{Result, StoreError, WorkflowError};
pub use portal::Portal;

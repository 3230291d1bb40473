//! Trash state machine for the `trash` command
//!
//! This crate provides:
//! - Trash records and the persisted original-path -> trash-path store
//! - The delete transition (Mover)
//! - The restore transition (Restorer)
//! - Age-based garbage collection of the trash area
//! - Read-only listing of trashed items

pub mod config;
pub mod error;
pub mod gc;
pub mod list;
pub mod mover;
pub mod paths;
pub mod record;
pub mod restorer;
pub mod store;

// Re-exports
pub use config::{Layout, TrashConfig};
pub use error::{Result, TrashError};
pub use gc::{GarbageCollector, GcReport, RetentionPolicy};
pub use list::Lister;
pub use mover::{Mover, TrashOutcome};
pub use record::TrashRecord;
pub use restorer::{RestoreOutcome, Restorer};
pub use store::TrashStore;

//! Formflow Store
//!
//! Storage for workflow definitions and run records.
//!
//! Everything is kept as JSON documents in a namespaced blob store, mirroring
//! a key/value layout:
//! - definitions: namespace `workflow-configs`, key `{tenant}:{workflowId}`
//! - runs: namespace `workflow-runs:{tenant}:{workflowId}`, key `{runId}`
//!
//! The [`BlobStore`] trait is the raw document layer, implemented by
//! [`SqliteBlobStore`] and [`InMemoryBlobStore`]. [`BlobRepository`] maps the
//! typed [`WorkflowRepository`] and [`RunStore`] traits onto it. Writes are
//! whole-document replaces; there is no partial update and no
//! compare-and-swap.

mod blob;
mod error;
mod memory;
mod repository;
mod sqlite;

pub use blob::BlobStore;
pub use error::StoreError;
pub use memory::InMemoryBlobStore;
pub use repository::{BlobRepository, RunStore, WorkflowRepository};
pub use sqlite::SqliteBlobStore;

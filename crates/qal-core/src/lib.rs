//! # qal-core
//!
//! Core types and error types for QAlytics.
//!
//! This crate provides the foundational types shared across all QAlytics
//! crates:
//! - Entity structs for PnLs, Sub-PnLs, and their metrics records
//! - The metrics history entry and its draft/constructor type
//! - Change-type and entity-type enums with stable string forms
//! - Snapshot encoding for the opaque JSON blobs stored on history rows
//! - Composite response types for read endpoints
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod responses;
pub mod snapshot;

pub use errors::CoreError;
pub use snapshot::{Snapshot, SnapshotError};

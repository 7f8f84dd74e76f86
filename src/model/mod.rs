//! Model layer - centralized state management
//!
//! This module contains all state-related types:
//! - `metadata_type` - Static classification of metadata types
//! - `manifest` - Tree selections and the type → members mapping
//! - `metadata` - Records returned by the sfdx CLI
//! - `tree` - Selection tree behind the chooser panel
//! - `DomainState` - Workspace settings and last build
//! - `ModalStack` - Modal overlay management

pub mod domain;
pub mod manifest;
pub mod metadata;
pub mod metadata_type;
pub mod modal;
pub mod tree;
pub mod ui;

// Re-export commonly used types
pub use domain::{BuildRecord, DomainState};
pub use manifest::{Manifest, SelectionNode};
pub use tree::SelectionTree;

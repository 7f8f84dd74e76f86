//! External service interactions
//!
//! This module contains services for interacting with external systems:
//! - Selection reduction
//! - package.xml rendering and loading
//! - Metadata enumeration over a `MetadataSource`
//! - sfdx CLI invocation
//! - Background job execution

pub mod enumerate;
pub mod job_runner;
pub mod package_xml;
pub mod selection;
pub mod sfdx;

pub use enumerate::{ChildRequest, MetadataSource};
pub use job_runner::{JobMessage, JobRunner};
pub use sfdx::SfdxCli;

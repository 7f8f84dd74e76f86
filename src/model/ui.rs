//! UI state - presentation state separate from domain data
//!
//! Most presentation state lives in the chooser panel itself.

/// Main application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Splash,
    Running,
}

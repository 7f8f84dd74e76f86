//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod chooser;
pub mod error_dialog;
pub mod help_dialog;
pub mod layout;
pub mod progress_dialog;
pub mod quit_dialog;
pub mod splash;

pub use chooser::{draw_chooser_screen, ChooserPanel, ChooserRenderContext};
pub use error_dialog::ErrorDialog;
pub use help_dialog::HelpDialog;
pub use layout::{calculate_main_layout, centered_popup};
pub use progress_dialog::ProgressDialog;
pub use quit_dialog::QuitDialog;
pub use splash::SplashComponent;

//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that delegates event handling and rendering to child components. It owns
//! the single chooser panel and turns background job messages into tree
//! updates and dialogs.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    draw_chooser_screen, ChooserPanel, ChooserRenderContext, ErrorDialog, HelpDialog,
    ProgressDialog, QuitDialog, SplashComponent,
};
use crate::error::PackageResult;
use crate::model::{BuildRecord, DomainState};
use crate::model::modal::{Modal, ModalStack};
use crate::model::ui::AppMode;
use crate::services::enumerate::Progress;
use crate::services::package_xml::{render, write_manifest};
use crate::services::selection::reduce_for_build;
use crate::services::{JobMessage, JobRunner};
use anyhow::Result;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::path::PathBuf;
use tracing::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Current application mode
    pub mode: AppMode,

    /// Workspace settings and last build
    pub domain: DomainState,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Background sfdx runner
    pub job_runner: JobRunner,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: Option<String>,

    /// Pending external editor file (set by OpenEditor, handled by main loop)
    pub pending_editor_file: Option<PathBuf>,

    /// Progress was hidden with Esc; stays hidden until the request resolves
    pub progress_dismissed: bool,

    /// Checks changed since the last build
    pub dirty: bool,

    /// The chooser, created on first open
    pub chooser: Option<ChooserPanel>,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub splash: SplashComponent,
    pub quit_dialog: QuitDialog,
    pub help_dialog: HelpDialog,
    pub progress_dialog: ProgressDialog,
    pub error_dialog: ErrorDialog,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    pub fn new(domain: DomainState, job_runner: JobRunner) -> App {
        App {
            mode: AppMode::Splash,
            domain,
            modals: ModalStack::new(),
            job_runner,
            should_quit: false,
            status_message: None,
            pending_editor_file: None,
            progress_dismissed: false,
            dirty: false,
            chooser: None,
            splash: SplashComponent::new(),
            quit_dialog: QuitDialog::default(),
            help_dialog: HelpDialog::default(),
            progress_dialog: ProgressDialog::default(),
            error_dialog: ErrorDialog::default(),
        }
    }

    fn show_error(&mut self, message: impl Into<String>) {
        self.modals.push(Modal::Error {
            message: message.into(),
        });
    }

    fn hide_progress(&mut self) {
        self.modals
            .remove_where(|m| matches!(m, Modal::Progress { .. }));
    }

    /// Show the chooser, creating it only if none exists yet
    fn open_chooser(&mut self) -> Option<Action> {
        if self.chooser.is_some() {
            debug!("chooser already open; revealing it");
            self.mode = AppMode::Running;
            return None;
        }
        self.chooser = Some(ChooserPanel::new());
        Some(Action::GetMetadataTypes)
    }

    /// Reduce the checked nodes, render and write package.xml
    fn build_package_xml(&mut self) -> PackageResult<BuildRecord> {
        let nodes = self
            .chooser
            .as_ref()
            .map(|c| c.tree.selected_nodes())
            .unwrap_or_default();

        let manifest = reduce_for_build(&nodes)?;
        let xml = render(&manifest, &self.domain.api_version);
        write_manifest(&self.domain.manifest_path, &xml)?;

        let types = manifest
            .iter()
            .filter(|(_, members)| !members.is_empty())
            .count();
        info!(path = %self.domain.manifest_path.display(), types, "wrote package.xml");

        Ok(BuildRecord {
            path: self.domain.manifest_path.clone(),
            types,
            timestamp: Local::now(),
        })
    }

    /// Apply one message from the background runner
    fn handle_job_message(&mut self, message: JobMessage) {
        match message {
            JobMessage::Progress(Progress::Begin(title)) => {
                self.progress_dialog.set_title(&title);
                match self.modals.top_mut() {
                    Some(Modal::Progress { title: current }) => *current = title,
                    // An open error keeps the focus until it is closed
                    Some(Modal::Error { .. }) => {}
                    _ if self.progress_dismissed => {}
                    _ => self.modals.push(Modal::Progress { title }),
                }
            }
            JobMessage::Progress(Progress::End) => self.hide_progress(),
            JobMessage::MetadataObjects { objects, existing } => {
                self.progress_dismissed = false;
                if let Some(chooser) = self.chooser.as_mut() {
                    chooser.load_types(&objects, &existing);
                }
                self.dirty = false;
                self.status_message = Some(format!(
                    "Loaded {} metadata types ({} saved in package.xml)",
                    objects.len(),
                    existing.len()
                ));
            }
            JobMessage::ListMetadata {
                metadata_type,
                results,
            } => {
                self.progress_dismissed = false;
                if let Some(chooser) = self.chooser.as_mut() {
                    chooser.tree.apply_listing(&metadata_type, &results);
                    chooser.clamp_selection();
                }
                self.status_message = Some(format!("{}: {} members", metadata_type, results.len()));
            }
            JobMessage::Failed {
                metadata_type,
                error,
            } => {
                self.progress_dismissed = false;
                self.hide_progress();
                if let Some(chooser) = self.chooser.as_mut() {
                    match &metadata_type {
                        Some(ty) => chooser.tree.fetch_failed(ty),
                        None => chooser.loading_types = false,
                    }
                    chooser.clamp_selection();
                }
                let mut message = match metadata_type {
                    Some(ty) => format!("Could not list {}:\n{}", ty, error),
                    None => format!("Could not load metadata types:\n{}", error),
                };
                if error.is_transport() {
                    message.push_str("\n\nCheck that sfdx is installed and a default org is set.");
                }
                self.show_error(message);
            }
        }
    }

    fn unsaved_checks(&self) -> usize {
        match (&self.chooser, self.dirty) {
            (Some(chooser), true) => chooser.tree.checked_count(),
            _ => 0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn init(&mut self) -> Result<()> {
        self.splash.init()?;
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match self.mode {
            AppMode::Splash => self.splash.handle_key_event(key),
            AppMode::Running => {
                if let Some(modal) = self.modals.top().cloned() {
                    return self.handle_modal_key_event(&modal, key);
                }
                match self.chooser.as_mut() {
                    Some(chooser) if chooser.search_mode => Ok(handle_search_key_event(key)),
                    Some(chooser) => chooser.handle_key_event(key),
                    None => Ok(match key.code {
                        KeyCode::Char('q') => Some(Action::ForceQuit),
                        _ => Some(Action::OpenChooser),
                    }),
                }
            }
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {
                if self.mode == AppMode::Splash {
                    return self.splash.update(Action::Tick);
                }
                for message in self.job_runner.poll() {
                    self.handle_job_message(message);
                }
                self.progress_dialog.update(Action::Tick)?;
            }
            Action::SplashComplete => {
                self.mode = AppMode::Running;
                return Ok(Some(Action::OpenChooser));
            }
            Action::ForceQuit => {
                self.should_quit = true;
            }
            Action::Resize(_, _) => {}

            // ─────────────────────────────────────────────────────────────────
            // Navigation (delegate to ChooserPanel)
            // ─────────────────────────────────────────────────────────────────
            Action::NextItem => self.chooser.iter_mut().for_each(|c| c.next()),
            Action::PrevItem => self.chooser.iter_mut().for_each(|c| c.previous()),
            Action::FirstItem => self.chooser.iter_mut().for_each(|c| c.select_first()),
            Action::LastItem => self.chooser.iter_mut().for_each(|c| c.select_last()),

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => {
                self.quit_dialog.unsaved_checks = self.unsaved_checks();
                self.modals.push(Modal::QuitConfirm);
            }
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.push(Modal::Help { scroll_offset: 0 });
            }
            Action::CloseModal => {
                self.modals.pop();
            }
            Action::ConfirmModal => {
                if self.modals.top() == Some(&Modal::QuitConfirm) {
                    self.should_quit = true;
                }
            }
            Action::DismissProgress => {
                // The sfdx process is not killed; its result still lands in the tree
                self.hide_progress();
                self.progress_dismissed = true;
                self.status_message = Some("Progress hidden; sfdx is still running".to_string());
            }

            // ─────────────────────────────────────────────────────────────────
            // Search (delegate to ChooserPanel)
            // ─────────────────────────────────────────────────────────────────
            Action::EnterSearchMode => self.chooser.iter_mut().for_each(|c| c.enter_search_mode()),
            Action::ExitSearchMode => self.chooser.iter_mut().for_each(|c| c.exit_search_mode()),
            Action::SearchInput(ch) => self.chooser.iter_mut().for_each(|c| c.search_input(ch)),
            Action::SearchBackspace => self.chooser.iter_mut().for_each(|c| c.search_backspace()),

            // ─────────────────────────────────────────────────────────────────
            // Chooser
            // ─────────────────────────────────────────────────────────────────
            Action::OpenChooser => return Ok(self.open_chooser()),
            Action::GetMetadataTypes => {
                if let Some(chooser) = self.chooser.as_mut() {
                    chooser.loading_types = true;
                    self.job_runner
                        .spawn_describe(self.domain.manifest_path.clone());
                }
            }
            Action::FetchChildren(metadata_type) => {
                if let Some(chooser) = self.chooser.as_mut() {
                    if let Some(request) = chooser.tree.begin_fetch(&metadata_type) {
                        debug!(metadata_type = %request.metadata_type, in_folder = request.in_folder, "fetching children");
                        self.job_runner.spawn_fetch(request);
                    }
                }
            }
            Action::Collapse => self.chooser.iter_mut().for_each(|c| c.collapse()),
            Action::ToggleCheck => {
                if let Some(chooser) = self.chooser.as_mut() {
                    chooser.toggle_check();
                    self.dirty = true;
                }
            }
            Action::ClearAll => {
                if let Some(chooser) = self.chooser.as_mut() {
                    chooser.tree.clear_all();
                    self.dirty = true;
                }
            }
            Action::BuildPackageXml => match self.build_package_xml() {
                Ok(record) => {
                    self.status_message = Some(format!("{}; press e to open it", record.summary()));
                    self.domain.last_build = Some(record);
                    self.dirty = false;
                }
                Err(e) => self.show_error(e.to_string()),
            },

            // ─────────────────────────────────────────────────────────────────
            // Editor Actions
            // ─────────────────────────────────────────────────────────────────
            Action::OpenEditor => {
                let path = &self.domain.manifest_path;
                if path.exists() {
                    self.pending_editor_file = Some(path.clone());
                } else {
                    let message = format!(
                        "package.xml not found at:\n  {}\n\nPress b to build it first.",
                        path.display()
                    );
                    self.show_error(message);
                }
            }
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        match self.mode {
            AppMode::Splash => self.splash.draw(frame, area)?,
            AppMode::Running => {
                match self.chooser.as_mut() {
                    Some(chooser) => {
                        let ctx = ChooserRenderContext {
                            manifest_path: &self.domain.manifest_path,
                            api_version: &self.domain.api_version,
                            status_message: self.status_message.as_deref(),
                            last_build: self.domain.last_build.as_ref(),
                        };
                        draw_chooser_screen(frame, area, chooser, &ctx)?;
                    }
                    None => {
                        let hint = Paragraph::new("Press any key to open the chooser, q to quit")
                            .style(Style::default().fg(Color::DarkGray))
                            .alignment(Alignment::Center);
                        frame.render_widget(hint, area);
                    }
                }

                // Draw modal overlay if active
                if let Some(modal) = self.modals.top().cloned() {
                    self.draw_modal(frame, area, &modal)?;
                }
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helper Methods
// ═══════════════════════════════════════════════════════════════════════════════

fn handle_search_key_event(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => Some(Action::ExitSearchMode),
        KeyCode::Backspace => Some(Action::SearchBackspace),
        KeyCode::Char(c) => Some(Action::SearchInput(c)),
        _ => None,
    }
}

impl App {
    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.handle_key_event(key),
            Modal::Help { .. } => self.help_dialog.handle_key_event(key),
            Modal::Progress { .. } => self.progress_dialog.handle_key_event(key),
            Modal::Error { .. } => self.error_dialog.handle_key_event(key),
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area)?,
            Modal::Help { .. } => self.help_dialog.draw(frame, area)?,
            Modal::Progress { title } => {
                self.progress_dialog.set_title(title);
                self.progress_dialog.draw(frame, area)?;
            }
            Modal::Error { message } => {
                self.error_dialog.message = message.clone();
                self.error_dialog.draw(frame, area)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PackageError;
    use crate::model::manifest::LOADING;
    use crate::model::metadata::MetadataObject;
    use crate::model::tree::ChildState;
    use crate::services::enumerate::fake::FakeSource;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::runtime::Handle;

    fn app_with(source: FakeSource, dir: &std::path::Path) -> App {
        let domain = DomainState::new(
            dir.to_path_buf(),
            dir.join("manifest").join("package.xml"),
            "45.0".to_string(),
        );
        let mut app = App::new(domain, JobRunner::new(Handle::current(), Arc::new(source)));
        app.mode = AppMode::Running;
        app
    }

    fn catalog() -> FakeSource {
        FakeSource::default().with_objects(vec![
            MetadataObject::new("ApexClass", false),
            MetadataObject::new("CustomObject", false),
            MetadataObject::new("Report", true),
        ])
    }

    /// Run an action and everything it chains, like the main loop does
    fn dispatch(app: &mut App, action: Action) {
        let mut next = Some(action);
        while let Some(a) = next {
            next = app.update(a).unwrap();
        }
    }

    async fn tick_until<F: Fn(&App) -> bool>(app: &mut App, done: F) {
        for _ in 0..400 {
            dispatch(app, Action::Tick);
            if done(app) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    fn types_loaded(app: &App) -> bool {
        app.chooser.as_ref().is_some_and(|c| !c.tree.is_empty())
    }

    #[tokio::test]
    async fn test_second_open_reveals_existing_chooser() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(catalog(), dir.path());

        assert_eq!(app.update(Action::OpenChooser).unwrap(), Some(Action::GetMetadataTypes));
        dispatch(&mut app, Action::GetMetadataTypes);
        tick_until(&mut app, types_loaded).await;

        dispatch(&mut app, Action::ToggleCheck);
        assert_eq!(app.update(Action::OpenChooser).unwrap(), None);
        let chooser = app.chooser.as_ref().unwrap();
        assert_eq!(chooser.tree.checked_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_selection_blocks_build() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(catalog(), dir.path());
        dispatch(&mut app, Action::OpenChooser);
        tick_until(&mut app, types_loaded).await;

        dispatch(&mut app, Action::BuildPackageXml);
        assert_eq!(
            app.modals.top(),
            Some(&Modal::Error {
                message: "Please select components for package.xml".to_string()
            })
        );
        assert!(!app.domain.manifest_path.exists());
    }

    #[tokio::test]
    async fn test_build_writes_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(catalog(), dir.path());
        dispatch(&mut app, Action::OpenChooser);
        tick_until(&mut app, types_loaded).await;

        // ApexClass is the first row
        dispatch(&mut app, Action::ToggleCheck);
        dispatch(&mut app, Action::BuildPackageXml);

        let written = std::fs::read_to_string(&app.domain.manifest_path).unwrap();
        assert!(written.contains("\t\t<members>*</members>\n\t\t<name>ApexClass</name>"));
        assert!(written.ends_with("\t<version>45.0</version>\n</Package>"));
        assert_eq!(app.domain.last_build.as_ref().map(|b| b.types), Some(1));
        assert!(app.status_message.as_deref().unwrap().contains("press e"));
        assert!(!app.dirty);
    }

    #[tokio::test]
    async fn test_build_without_members_keeps_saved_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest").join("package.xml");
        let saved = "<Package><types><members>*</members><name>ApexClass</name></types></Package>";
        write_manifest(&path, saved).unwrap();
        let mut app = app_with(catalog(), dir.path());
        dispatch(&mut app, Action::OpenChooser);
        tick_until(&mut app, types_loaded).await;

        // Uncheck the saved ApexClass, then check the unloaded Report root
        dispatch(&mut app, Action::ToggleCheck);
        dispatch(&mut app, Action::LastItem);
        dispatch(&mut app, Action::ToggleCheck);
        dispatch(&mut app, Action::BuildPackageXml);

        assert_eq!(
            app.modals.top(),
            Some(&Modal::Error {
                message: "Please select components for package.xml".to_string()
            })
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), saved);
        assert!(app.domain.last_build.is_none());
    }

    #[tokio::test]
    async fn test_saved_type_outside_catalog_survives_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest").join("package.xml");
        write_manifest(
            &path,
            "<Package><types><members>Account.Foo__c</members><name>CustomField</name></types></Package>",
        )
        .unwrap();
        let source = FakeSource::default().with_objects(vec![MetadataObject::new("ApexClass", false)]);
        let mut app = app_with(source, dir.path());
        dispatch(&mut app, Action::OpenChooser);
        tick_until(&mut app, types_loaded).await;

        dispatch(&mut app, Action::ToggleCheck);
        dispatch(&mut app, Action::BuildPackageXml);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\t\t<members>*</members>\n\t\t<name>ApexClass</name>"));
        assert!(written.contains("\t\t<members>Account.Foo__c</members>\n\t\t<name>CustomField</name>"));
    }

    #[tokio::test]
    async fn test_progress_does_not_cover_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(catalog(), dir.path());
        app.modals.push(Modal::Error {
            message: "earlier failure".into(),
        });

        app.handle_job_message(JobMessage::Progress(Progress::Begin("Processing Metadata".into())));
        assert_eq!(
            app.modals.top(),
            Some(&Modal::Error {
                message: "earlier failure".into()
            })
        );

        dispatch(&mut app, Action::CloseModal);
        app.handle_job_message(JobMessage::Progress(Progress::Begin("Processing Metadata".into())));
        assert!(matches!(app.modals.top(), Some(Modal::Progress { .. })));
    }

    #[tokio::test]
    async fn test_saved_manifest_round_trips_through_chooser() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest").join("package.xml");
        write_manifest(
            &path,
            "<Package><types><members>Account</members><name>CustomObject</name></types></Package>",
        )
        .unwrap();
        let mut app = app_with(catalog(), dir.path());
        assert_eq!(
            crate::services::package_xml::load_existing(&path).get("CustomObject"),
            Some(&vec!["Account".to_string(), LOADING.to_string()])
        );

        dispatch(&mut app, Action::OpenChooser);
        tick_until(&mut app, types_loaded).await;
        dispatch(&mut app, Action::BuildPackageXml);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<members>Account</members>"));
        assert!(!written.contains(LOADING));
    }

    #[tokio::test]
    async fn test_fetch_failure_shows_error_and_resets_node() {
        let dir = tempfile::tempdir().unwrap();
        let error = PackageError::Transport {
            command: "sfdx".into(),
            stderr: "No default org".into(),
        };
        let source = catalog().with_failure("CustomObject", None, error);
        let mut app = app_with(source, dir.path());
        dispatch(&mut app, Action::OpenChooser);
        tick_until(&mut app, types_loaded).await;

        dispatch(&mut app, Action::FetchChildren("CustomObject".into()));
        tick_until(&mut app, |a| matches!(a.modals.top(), Some(Modal::Error { .. }))).await;

        let node = app.chooser.as_ref().unwrap().tree.get("CustomObject").unwrap();
        assert_eq!(node.state, ChildState::NotLoaded);
        match app.modals.top() {
            Some(Modal::Error { message }) => assert!(message.contains("No default org")),
            other => panic!("unexpected modal: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dismissed_progress_still_applies_results() {
        let dir = tempfile::tempdir().unwrap();
        let source = catalog()
            .with_listing("ReportFolder", None, &["Sales"])
            .with_listing("Report", Some("Sales"), &["Sales/Pipeline"]);
        let mut app = app_with(source, dir.path());
        dispatch(&mut app, Action::OpenChooser);
        tick_until(&mut app, types_loaded).await;

        dispatch(&mut app, Action::FetchChildren("Report".into()));
        dispatch(&mut app, Action::DismissProgress);
        tick_until(&mut app, |a| {
            a.chooser.as_ref().unwrap().tree.get("Report").unwrap().state == ChildState::Loaded
        })
        .await;

        let node = app.chooser.as_ref().unwrap().tree.get("Report").unwrap();
        assert_eq!(node.members[0].name, "Sales/Pipeline");
        assert!(!matches!(app.modals.top(), Some(Modal::Progress { .. })));
    }

    #[tokio::test]
    async fn test_open_editor_requires_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(catalog(), dir.path());
        dispatch(&mut app, Action::OpenEditor);
        assert!(app.pending_editor_file.is_none());
        assert!(matches!(app.modals.top(), Some(Modal::Error { .. })));
    }

    #[tokio::test]
    async fn test_quit_confirm() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(catalog(), dir.path());
        dispatch(&mut app, Action::OpenQuitDialog);
        dispatch(&mut app, Action::ConfirmModal);
        assert!(app.should_quit);
    }
}

//! package-xml-tui - A terminal UI for building Salesforce package.xml manifests
//!
//! This is the main entry point for the package-xml-tui application.
//! It uses the Component Architecture pattern from ratatui; the `build`,
//! `list`, `show` and `config` subcommands run without a terminal UI.

mod action;
mod app;
mod cli;
mod component;
mod components;
mod config;
mod error;
mod logging;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::cli::{Cli, Commands};
use crate::component::Component;
use crate::config::Config;
use crate::logging::LogTarget;
use crate::model::{DomainState, Manifest, SelectionNode};
use crate::services::enumerate;
use crate::services::ChildRequest;
use crate::services::package_xml::{self, render, write_manifest};
use crate::services::selection::reduce_for_build;
use crate::services::{JobRunner, SfdxCli};
use crate::tui::Tui;
use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::event::Event;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{error, info};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default().with_overrides(&cli);
    let runtime = Runtime::new().context("failed to start the async runtime")?;

    match &cli.command {
        Some(command) => {
            logging::init(&LogTarget::Stderr, cli.verbose)?;
            runtime.block_on(run_command(command, &config))
        }
        None => {
            logging::init(&LogTarget::for_tui(cli.log_file.clone()), cli.verbose)?;
            run_tui(&runtime, &config)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Terminal UI
// ═══════════════════════════════════════════════════════════════════════════════

fn run_tui(runtime: &Runtime, config: &Config) -> Result<()> {
    let workspace = config.workspace();
    let source = SfdxCli::new(config.sfdx_binary_path.clone(), workspace.clone());
    let domain = DomainState::new(workspace, config.manifest_file(), config.api_version.clone());
    info!(workspace = %domain.workspace.display(), manifest = %domain.manifest_path.display(), "starting");

    // Setup terminal
    Tui::install_panic_hook();
    let mut tui = Tui::new()?.with_tick_rate(Duration::from_millis(100));
    tui.enter()?;

    // Create app state
    let mut app = App::new(domain, JobRunner::new(runtime.handle().clone(), Arc::new(source)));
    app.init()?;

    // Main event loop
    let result = run_app(&mut tui, &mut app);

    // Cleanup terminal
    tui.exit()?;

    // Handle any errors
    if let Err(err) = result {
        error!(error = ?err, "application loop failed");
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        // Draw the UI
        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                error!(error = %e, "draw failed");
            }
        })?;

        // Check for pending external editor
        if let Some(file_path) = app.pending_editor_file.take() {
            launch_external_editor(tui, app, &file_path)?;
            continue; // Redraw after editor closes
        }

        // Poll for events
        if let Some(event) = tui.next_event()? {
            // Convert event to action
            let action = match event {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                _ => None,
            };

            // Action might produce a follow-up action
            let mut current_action = action;
            while let Some(a) = current_action {
                current_action = app.update(a)?;
            }
        } else {
            // No event - send a tick for time-based updates
            let mut current_action = Some(Action::Tick);
            while let Some(a) = current_action {
                current_action = app.update(a)?;
            }
        }
    }

    Ok(())
}

/// Launch an external editor for the given file
fn launch_external_editor(tui: &mut Tui, app: &mut App, file_path: &Path) -> Result<()> {
    // Determine the editor to use: $VISUAL, $EDITOR, or fallback
    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vim".to_string());

    let status = tui.suspend_while(|| Command::new(&editor).arg(file_path).status())?;

    match status {
        Ok(exit_status) if exit_status.success() => {
            app.status_message = Some("package.xml edited; press R to reload it".to_string());
        }
        Ok(exit_status) => {
            app.status_message = Some(format!("Editor exited with status: {}", exit_status));
        }
        Err(e) => {
            app.status_message = Some(format!("Failed to launch editor '{}': {}", editor, e));
        }
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Headless Commands
// ═══════════════════════════════════════════════════════════════════════════════

async fn run_command(command: &Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Build { selectors, stdout } => {
            let manifest = manifest_from_selectors(selectors)?;
            let xml = render(&manifest, &config.api_version);
            if *stdout {
                println!("{}", xml);
            } else {
                let path = config.manifest_file();
                write_manifest(&path, &xml)?;
                info!(path = %path.display(), types = manifest.len(), "wrote package.xml");
                println!("Wrote {}", path.display());
            }
        }
        Commands::List { metadata_type } => {
            let source = SfdxCli::new(config.sfdx_binary_path.clone(), config.workspace());
            let request = ChildRequest::from_name(metadata_type);
            let progress = |p: enumerate::Progress| {
                if let enumerate::Progress::Begin(title) = p {
                    info!("{}", title);
                }
            };
            let mut names: Vec<String> = enumerate::fetch_children(&source, &request, &progress)
                .await?
                .into_iter()
                .map(|c| c.full_name)
                .collect();
            names.sort();
            for name in names {
                println!("{}", name);
            }
        }
        Commands::Show => {
            let path = config.manifest_file();
            let manifest = package_xml::load_existing(&path);
            if manifest.is_empty() {
                println!("No saved types in {}", path.display());
            }
            for (metadata_type, members) in manifest.iter() {
                println!("{}: {}", metadata_type, members.join(", "));
            }
        }
        Commands::Config { save } => {
            println!("{}", serde_json::to_string_pretty(config)?);
            if *save {
                config.save()?;
                info!("saved config");
            }
        }
    }
    Ok(())
}

/// Turn `Type` / `Type:Member` selectors into a reduced manifest
fn manifest_from_selectors(selectors: &[String]) -> Result<Manifest> {
    let mut nodes = Vec::with_capacity(selectors.len());
    for selector in selectors {
        match SelectionNode::parse_selector(selector) {
            Some(node) => nodes.push(node),
            None => bail!("invalid selector '{}': expected Type or Type:Member", selector),
        }
    }

    Ok(reduce_for_build(&nodes)?)
}

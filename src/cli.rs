//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// package-xml-tui - Build Salesforce package.xml manifests from org metadata
#[derive(Debug, Parser)]
#[command(name = "package-xml-tui")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// sfdx project root (defaults to the configured workspace, then the current directory)
    #[arg(short, long, global = true)]
    pub workspace: Option<PathBuf>,

    /// sfdx binary to run
    #[arg(long, global = true)]
    pub sfdx: Option<String>,

    /// API version written into package.xml
    #[arg(long, global = true)]
    pub api_version: Option<String>,

    /// Log file used while the TUI owns the terminal
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write package.xml from selectors without opening the TUI
    Build {
        /// `Type` selects a whole type, `Type:Member` a single member
        #[arg(required = true)]
        selectors: Vec<String>,

        /// Print the manifest instead of writing it
        #[arg(long)]
        stdout: bool,
    },

    /// List the members of one metadata type
    List {
        /// Metadata type, e.g. ApexClass or Report
        metadata_type: String,
    },

    /// Print the existing package.xml as it would seed the chooser
    Show,

    /// Print the effective settings
    Config {
        /// Store the effective settings (flags included) in the config file
        #[arg(long)]
        save: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_opens_tui() {
        let cli = Cli::parse_from(["package-xml-tui", "-v"]);
        assert!(cli.command.is_none());
        assert!(cli.verbose);
    }

    #[test]
    fn test_build_collects_selectors() {
        let cli = Cli::parse_from([
            "package-xml-tui",
            "build",
            "ApexClass",
            "Report:Sales/Pipeline",
            "--stdout",
        ]);
        match cli.command {
            Some(Commands::Build { selectors, stdout }) => {
                assert_eq!(selectors, vec!["ApexClass", "Report:Sales/Pipeline"]);
                assert!(stdout);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_build_requires_a_selector() {
        assert!(Cli::try_parse_from(["package-xml-tui", "build"]).is_err());
    }

    #[test]
    fn test_config_save_flag() {
        let cli = Cli::parse_from(["package-xml-tui", "config", "--save", "--api-version", "60.0"]);
        assert!(matches!(cli.command, Some(Commands::Config { save: true })));
        assert_eq!(cli.api_version.as_deref(), Some("60.0"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["package-xml-tui", "list", "Report", "--sfdx", "sf"]);
        assert_eq!(cli.sfdx.as_deref(), Some("sf"));
    }
}

//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Brokkr - portable developer tool vendoring
#[derive(Parser, Debug)]
#[command(name = "brokkr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install all enabled vendors, or a selection
    Install(InstallArgs),

    /// List catalog vendors
    List(ListArgs),

    /// Lock file management
    #[command(subcommand)]
    Lock(LockCommands),

    /// Show version information
    Version(VersionArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Vendor ids to install (default: all enabled)
    pub vendors: Vec<String>,

    /// Reinstall vendors that are already installed
    #[arg(short, long)]
    pub force: bool,

    /// Skip the confirmation prompt for --force
    #[arg(short, long)]
    pub yes: bool,

    /// Path to the vendor catalog (default: vendors.yaml)
    #[arg(long)]
    pub catalog: Option<Utf8PathBuf>,

    /// Vendor root directory (default: ~/.brokkr)
    #[arg(long)]
    pub root: Option<Utf8PathBuf>,

    /// Download retry attempts per vendor
    #[arg(long, default_value = "3")]
    pub max_retries: u32,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Path to the vendor catalog (default: vendors.yaml)
    #[arg(long)]
    pub catalog: Option<Utf8PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum LockCommands {
    /// Export a lock file from the installed vendors
    Export(LockExportArgs),

    /// Validate a lock file against the installed vendors
    Validate(LockValidateArgs),
}

#[derive(Args, Debug)]
pub struct LockExportArgs {
    /// Output path (default: <root>/brokkr.lock.json)
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,

    /// Record SHA256 hashes of cached artifacts (re-reads large files)
    #[arg(long)]
    pub hash: bool,

    /// Path to the vendor catalog (default: vendors.yaml)
    #[arg(long)]
    pub catalog: Option<Utf8PathBuf>,

    /// Vendor root directory (default: ~/.brokkr)
    #[arg(long)]
    pub root: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct LockValidateArgs {
    /// Lock file to validate (default: <root>/brokkr.lock.json)
    #[arg(short, long)]
    pub file: Option<Utf8PathBuf>,

    /// Recompute and compare artifact hashes
    #[arg(long)]
    pub hash: bool,

    /// Path to the vendor catalog (default: vendors.yaml)
    #[arg(long)]
    pub catalog: Option<Utf8PathBuf>,

    /// Vendor root directory (default: ~/.brokkr)
    #[arg(long)]
    pub root: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_install_selection_parses() {
        let cli = Cli::parse_from(["brokkr", "install", "git", "node", "--force", "-y"]);
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.vendors, vec!["git", "node"]);
                assert!(args.force);
                assert!(args.yes);
                assert_eq!(args.max_retries, 3);
            }
            other => panic!("Expected install command, got: {:?}", other),
        }
    }

    #[test]
    fn test_lock_export_parses() {
        let cli = Cli::parse_from(["brokkr", "lock", "export", "--hash", "-o", "out.json"]);
        match cli.command {
            Commands::Lock(LockCommands::Export(args)) => {
                assert!(args.hash);
                assert_eq!(args.output.as_deref(), Some(camino::Utf8Path::new("out.json")));
            }
            other => panic!("Expected lock export command, got: {:?}", other),
        }
    }
}

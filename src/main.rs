use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "histmerge", version)]
#[command(about = "Merge zsh, oh-my-zsh and bash history into one deduplicated zsh history")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Home directory holding the history files (default: $HOME)
    #[arg(long, value_name = "DIR")]
    home: Option<PathBuf>,

    /// TOML file overriding which history files are merged
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print version
    #[allow(dead_code)]
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: (),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let home = histmerge::config::resolve_home(cli.home)?;
    let config = match &cli.config {
        Some(path) => histmerge::MergeConfig::load(path)?,
        None => histmerge::MergeConfig::default(),
    };

    let report = histmerge::merge(&config, &home)?;

    println!(
        "Parsed and merged {} files with {} commands",
        report.files_merged, report.commands_seen
    );
    println!(
        "Saved into {} with {} commands",
        report.primary.display(),
        report.commands_saved
    );
    println!("Backed up into {}", report.backup.display());

    Ok(())
}

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hopp_config::{AppConfig, TabsFile};
use hopp_session::Workspace;

mod logger;
mod replay;

/// Replay recorded dispatch calls against the saved tab session
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON lines file of `{"store", "dispatcher", "payload"}` calls
    calls: PathBuf,

    /// Apply the calls without saving the resulting tabs
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_file = logger::init()?;
    log::info!("Starting hopp-replay, logging to {:?}", log_file);

    hopp_config_migrate::run_migrations();
    let config = AppConfig::load();

    let mut workspace = Workspace::with_default_request(config.default_request())?;
    if config.restore_tabs {
        let saved = TabsFile::load(workspace.default_request());
        workspace.restore_tabs(saved.tabs)?;
    }

    let input = File::open(&args.calls)
        .with_context(|| format!("Failed to open {:?}", args.calls))?;
    let applied = replay::replay(&mut workspace, BufReader::new(input))?;

    let tabs = workspace.tabs();
    println!(
        "Replayed {} call(s); {} tab(s) open, active: {}",
        applied,
        tabs.tab_size(),
        tabs.active_tab()
            .map(|tab| tab.id)
            .unwrap_or_else(|| "none".to_string())
    );

    if args.dry_run {
        log::info!("Dry run, tabs not saved");
    } else {
        TabsFile::new(workspace.tabs_snapshot()).save()?;
    }

    log::info!("Exiting hopp-replay");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("hopp-replay").chain(args.iter().copied()))
    }

    #[test]
    fn test_args() {
        let args = parse(&["calls.jsonl", "--dry-run"]).unwrap();
        assert_eq!(args.calls, PathBuf::from("calls.jsonl"));
        assert!(args.dry_run);

        assert!(!parse(&["calls.jsonl"]).unwrap().dry_run);
        assert!(parse(&[]).is_err());
        assert!(parse(&["a", "b"]).is_err());
        assert!(parse(&["calls.jsonl", "--dry"]).is_err());
    }

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }
}

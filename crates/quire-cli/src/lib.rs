//! Command-line editor for Quire pages.
//!
//! Each invocation loads the session file, runs one command against the
//! in-memory page store and writes the file back if anything changed.
//!
//! Usage:
//!   quire new-page "Journal"
//!   quire add Journal todo
//!   quire text Journal 0191 "water the plants"
//!   quire format Journal 0191 bold 0 5
//!   quire show Journal --markup

pub mod commands;
pub mod config;
pub mod session;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

pub use commands::{Command, execute, render_block};
pub use config::Config;
pub use session::Session;

/// Block editor for Quire pages.
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(about = "Edit Quire pages from the command line")]
pub struct Args {
    /// Config file (RON). Defaults to $XDG_CONFIG_HOME/quire/config.ron
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Session file, overriding the config's store_path
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Load, execute, save.
pub fn run(args: Args, config: &Config, out: &mut dyn Write) -> Result<()> {
    let path = args.store.unwrap_or_else(|| config.store_path.clone());
    let mut session = Session::load(&path)?;
    let mutates = args.command.mutates();

    execute(args.command, &mut session, config, out)?;

    if mutates {
        session.save(&path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoke(store: &std::path::Path, argv: &[&str]) -> String {
        let mut full = vec!["quire", "--store", store.to_str().unwrap()];
        full.extend_from_slice(argv);
        let args = Args::try_parse_from(full).unwrap();
        let mut out = Vec::new();
        run(args, &Config::default(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_session_persists_between_invocations() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store.json");

        invoke(&store, &["new-page", "Journal"]);
        let block = invoke(&store, &["add", "Journal", "todo"]);
        let block = block.trim();
        invoke(&store, &["text", "Journal", &block[..8], "water the plants"]);
        invoke(&store, &["check", "Journal", block]);

        let shown = invoke(&store, &["show", "Journal"]);
        assert!(shown.contains("[x] water the plants"), "{shown}");

        let pages = invoke(&store, &["pages"]);
        assert!(pages.contains("Journal  (1 blocks)"), "{pages}");
    }

    #[test]
    fn test_read_only_commands_do_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store.json");
        invoke(&store, &["types"]);
        assert!(!store.exists());
    }

    #[test]
    fn test_parse_rejects_missing_move_targets() {
        assert!(Args::try_parse_from(["quire", "move", "Journal"]).is_err());
    }
}

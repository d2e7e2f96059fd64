// src/bin/roomkey.rs
//! Recover a room's media key from a saved `room_joined` snapshot or from
//! share strings copied out of one. Prints the hex key on stdout; logs go to
//! stderr (`RUST_LOG=debug` shows per-share details).

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use roomkey::keying::{self, Share};
use roomkey::{KeyRecovery, RecoveryConfig, RoomJoined};

#[derive(Parser)]
#[command(version, about = "Recover a group-call media key from Shamir shares")]
struct Cli {
    /// JSON file with recovery settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recover the key from a room_joined snapshot ("-" reads stdin)
    Room {
        message: PathBuf,
        /// Expected key length in bytes, 0 accepts any length
        #[arg(long)]
        key_len: Option<usize>,
        /// Fail when the room carries fewer shares than its announced threshold
        #[arg(long)]
        enforce_threshold: bool,
    },

    /// Recover a key from URL-safe base64 share strings
    Shares {
        #[arg(required = true)]
        shares: Vec<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.cmd {
        Commands::Room {
            message,
            key_len,
            enforce_threshold,
        } => {
            if let Some(len) = key_len {
                config.expected_key_len = (len > 0).then_some(len);
            }
            if enforce_threshold {
                config.enforce_threshold = true;
            }

            let snapshot = read_snapshot(&message)?;
            let recovered = KeyRecovery::new(config)
                .recover(&snapshot)
                .with_context(|| format!("key recovery failed for room {}", snapshot.room.id))?;

            println!("{}", recovered.key.as_hex());
        }

        Commands::Shares { shares } => {
            let decoded = shares
                .iter()
                .enumerate()
                .map(|(position, text)| Share::decode(None, text).map_err(|e| e.at(position)))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let key = keying::reconstruct(&decoded).context("key recovery failed")?;

            println!("{}", key.as_hex());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RecoveryConfig> {
    let Some(path) = path else {
        return Ok(RecoveryConfig::default());
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

fn read_snapshot(path: &Path) -> Result<RoomJoined> {
    if path.as_os_str() == "-" {
        return RoomJoined::from_reader(io::stdin().lock()).context("reading snapshot from stdin");
    }

    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    RoomJoined::from_reader(BufReader::new(file))
        .with_context(|| format!("reading snapshot {}", path.display()))
}

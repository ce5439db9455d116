use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use gatecfg::channels::advanced::{
    extract_advanced_with, ACCOUNT_KNOWN_KEYS, CHANNEL_KNOWN_KEYS,
};
use gatecfg::channels::identity::normalize_channel_key;
use gatecfg::config::ConsoleConfig;
use gatecfg::{
    build_patches_with, channels_from_snapshot, InMemoryStore, Patch, PatchSink, SecretPolicy,
};

/// Offline driver for the Gateway channel config patch engine.
#[derive(Parser, Debug)]
#[command(name = "gatecfg", version, about)]
struct Cli {
    /// Console config file (defaults to ~/.gatecfg/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the patches that turn one config snapshot into another (secrets excluded)
    Diff { before: PathBuf, after: PathBuf },
    /// Replay a patch list onto a snapshot and print the result
    Apply { base: PathBuf, patches: PathBuf },
    /// Print a snapshot with every secret field masked
    Mask { snapshot: PathBuf },
    /// Print the advanced (non-schema, non-secret) fields of a channel or account
    Advanced {
        snapshot: PathBuf,
        channel: String,
        #[arg(long)]
        account: Option<String>,
    },
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing(config: &ConsoleConfig, verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        config.logging.max_level()
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ConsoleConfig::load(cli.config.as_deref())?;
    init_tracing(&config, cli.verbose);
    let policy = SecretPolicy::from_config(&config.secrets);

    match cli.command {
        Commands::Diff { before, after } => {
            let before = channels_from_snapshot(&read_json(&before)?);
            let after = channels_from_snapshot(&read_json(&after)?);
            let patches = build_patches_with(&before, &after, &policy);
            tracing::info!("Diff produced {} patches", patches.len());
            print_json(&patches)
        }
        Commands::Apply { base, patches } => {
            let patches: Vec<Patch> = serde_json::from_value(read_json(&patches)?)
                .context("patch file must be a list of {path, value} objects")?;
            let mut store = InMemoryStore::new(read_json(&base)?);
            let applied = store.apply(&patches)?;
            tracing::info!("Applied {applied} patches");
            print_json(store.root())
        }
        Commands::Mask { snapshot } => {
            let mut root = read_json(&snapshot)?;
            let channels = channels_from_snapshot(&root);
            for path in policy.collect_secret_paths(&channels, "channels") {
                tracing::info!("Configured secret: {path}");
            }
            policy.mask_secret_fields(&mut root);
            print_json(&root)
        }
        Commands::Advanced {
            snapshot,
            channel,
            account,
        } => {
            let channels = channels_from_snapshot(&read_json(&snapshot)?);
            let key = normalize_channel_key(&channel);
            let Some(node) = channels.get(&key).and_then(Value::as_object) else {
                anyhow::bail!("no channel '{key}' in snapshot");
            };
            let advanced = match account {
                Some(id) => {
                    let Some(acct) = node
                        .get("accounts")
                        .and_then(|a| a.get(&id))
                        .and_then(Value::as_object)
                    else {
                        anyhow::bail!("no account '{id}' under channel '{key}'");
                    };
                    extract_advanced_with(acct, ACCOUNT_KNOWN_KEYS, &policy)
                }
                None => extract_advanced_with(node, CHANNEL_KNOWN_KEYS, &policy),
            };
            print_json(&advanced)
        }
    }
}

//! VaultChat CLI
//!
//! Operator and demo commands for the VaultChat relay.

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::{style, Emoji};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vaultchat_client::TransportClient;
use vaultchat_relay::{IdentityLookup, MemoryIdentityDirectory, MessageRelay};

mod config;

use config::CliConfig;

static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR] ");
static SEND: Emoji<'_, '_> = Emoji("📤 ", "[SEND] ");
static RECV: Emoji<'_, '_> = Emoji("📥 ", "[RECV] ");

/// VaultChat CLI - anonymous store-and-forward relay
#[derive(Parser)]
#[command(name = "vaultchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange messages between two local clients through the relay
    Demo {
        /// Message content
        #[arg(short, long, default_value = "hello from alice")]
        message: String,

        /// Number of messages to send
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Purge expired messages from the relay store
    Reap,

    /// Show relay storage statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let config_path = cli.config.unwrap_or_else(CliConfig::default_path);
    let config = CliConfig::load_or_default(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let relay = Arc::new(MessageRelay::open(config.relay.clone())?);

    match cli.command {
        Commands::Demo { message, count } => run_demo(&config, relay, &message, count).await?,
        Commands::Reap => {
            let purged = relay.purge_expired()?;
            println!("{} Purged {} expired messages", CHECK, purged);
        }
        Commands::Stats => {
            let stats = relay.stats()?;
            println!("Messages:    {}", style(stats.message_count).cyan());
            println!("Recipients:  {}", style(stats.recipient_count).cyan());
            println!("Bytes:       {}", style(stats.total_bytes).cyan());
            println!("Expired:     {}", style(stats.expired_count).yellow());
        }
    }

    Ok(())
}

async fn run_demo(
    config: &CliConfig,
    relay: Arc<MessageRelay>,
    message: &str,
    count: usize,
) -> anyhow::Result<()> {
    let mut anonymity = config.anonymity.clone();
    if anonymity.proxy.enabled {
        warn!("In-process relay does not use the proxy; disabling it for the demo");
        anonymity.proxy.enabled = false;
    }

    let alice = TransportClient::new(anonymity.clone(), relay.clone())?;
    let bob = TransportClient::new(anonymity, relay.clone())?;

    let directory = MemoryIdentityDirectory::new();
    directory.register("alice", alice.public_key_bytes().to_vec());
    directory.register("bob", bob.public_key_bytes().to_vec());

    let bob_key = directory
        .lookup_public_key("bob")?
        .context("bob is not registered")?;
    let alice_key = directory
        .lookup_public_key("alice")?
        .context("alice is not registered")?;

    info!("Sending {} messages from alice to bob", count);
    for i in 0..count {
        let text = if count == 1 {
            message.to_string()
        } else {
            format!("{} #{}", message, i + 1)
        };
        let id = alice.send("bob", &bob_key, text.as_bytes()).await?;
        println!("{} alice -> bob  [{}] {}", SEND, id, text);
    }

    for received in bob.receive("alice", &alice_key).await? {
        match received.plaintext {
            Ok(plaintext) => println!(
                "{} bob <- alice  [{}] {}",
                RECV,
                received.id,
                style(String::from_utf8_lossy(&plaintext)).green()
            ),
            Err(e) => println!("{} [{}] {}", CROSS, received.id, style(e).red()),
        }
    }

    let remaining = bob.receive("alice", &alice_key).await?;
    println!(
        "{} Second fetch returned {} messages",
        CHECK,
        style(remaining.len()).cyan()
    );

    Ok(())
}

//! slotvisor command line.
//!
//! ```bash
//! # Ask for the slot count, then supervise `./miner <wallet path>` workers
//! slotvisor run --worker ./miner
//!
//! # Four slots, extra worker arguments before the wallet path
//! slotvisor --wallet-dir /var/lib/pool run --slots 4 --worker ./miner -- --headless
//!
//! # Sign a message with wallet 3 and store the signature in wallet_3.json
//! slotvisor sign --wallet 3 --save "I agree to the terms"
//!
//! slotvisor show --wallet 3
//! ```

use std::ffi::OsString;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use slotvisor::{
    Config, DEFAULT_WALLET_DIR, Ed25519Factory, Ed25519Signer, LogWriter, ProcessLauncher,
    Signer, SupervisorBuilder, WalletId, WalletRepository, ask_slot_count, derive_from_seed,
};

#[derive(Parser, Debug)]
#[command(name = "slotvisor", version, about = "Keeps N wallet-bound workers alive")]
struct Cli {
    /// Directory holding wallet_<id>.json files (created if absent).
    #[arg(long, global = true, default_value = DEFAULT_WALLET_DIR)]
    wallet_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Supervise worker slots until interrupted.
    Run {
        /// Total number of slots; asked interactively when omitted.
        #[arg(long)]
        slots: Option<NonZeroUsize>,

        /// Worker program, started with its arguments followed by the wallet path.
        #[arg(long)]
        worker: PathBuf,

        /// Arguments passed to the worker before the wallet path.
        #[arg(last = true)]
        worker_args: Vec<OsString>,
    },

    /// Sign a message with a wallet's payment key.
    Sign {
        /// Wallet id to load from the wallet directory.
        #[arg(long, conflicts_with = "seed", required_unless_present = "seed")]
        wallet: Option<u64>,

        /// Hex seed to derive the keys from instead of a stored wallet.
        #[arg(long)]
        seed: Option<String>,

        /// Store the signature in the wallet file.
        #[arg(long, requires = "wallet")]
        save: bool,

        /// Message to sign.
        message: String,
    },

    /// Print a wallet's address and public key.
    Show {
        /// Wallet id.
        #[arg(long)]
        wallet: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing();

    match cli.command {
        Command::Run {
            slots,
            worker,
            worker_args,
        } => {
            let slots = match slots {
                Some(n) => n,
                None => ask_slot_count(io::stdin().lock(), io::stdout())?,
            };
            let cfg = Config::default().with_wallet_dir(cli.wallet_dir);
            let launcher = Arc::new(ProcessLauncher::new(worker).with_args(worker_args));

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("cannot start async runtime")?;
            runtime.block_on(run(cfg, launcher, slots))
        }
        Command::Sign {
            wallet,
            seed,
            save,
            message,
        } => sign(&cli.wallet_dir, wallet, seed, save, &message),
        Command::Show { wallet } => show(&cli.wallet_dir, wallet),
    }
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cfg: Config, launcher: Arc<ProcessLauncher>, slots: NonZeroUsize) -> Result<()> {
    info!(
        slots = slots.get(),
        worker = %launcher.program().display(),
        wallet_dir = %cfg.wallet_dir.display(),
        "starting slotvisor"
    );

    let sup = SupervisorBuilder::new(cfg, launcher)
        .with_subscribers(vec![Arc::new(LogWriter)])
        .build()?;
    sup.run(slots.get()).await?;

    info!("slotvisor stopped");
    Ok(())
}

fn open_repository(dir: &Path) -> Result<WalletRepository> {
    WalletRepository::open(dir, Arc::new(Ed25519Factory))
        .with_context(|| format!("cannot open wallet directory {}", dir.display()))
}

fn sign(
    dir: &Path,
    wallet: Option<u64>,
    seed: Option<String>,
    save: bool,
    message: &str,
) -> Result<()> {
    let record = match (wallet, seed) {
        (Some(id), _) => open_repository(dir)?.load(WalletId(id))?,
        (None, Some(seed)) => derive_from_seed(&seed)?,
        (None, None) => bail!("either --wallet or --seed is required"),
    };

    let signer = Ed25519Signer::from_record(&record)?;
    let signature = signer.sign(message);

    println!("address:    {}", record.address);
    println!("public key: {}", signer.public_key_hex());
    println!("signature:  {signature}");

    if let (true, Some(id)) = (save, wallet) {
        open_repository(dir)?.store_signature(WalletId(id), &signature)?;
        println!("signature stored in {}", WalletId(id).file_name());
    }
    Ok(())
}

fn show(dir: &Path, wallet: u64) -> Result<()> {
    let record = open_repository(dir)?.load(WalletId(wallet))?;
    println!("wallet:     {}", WalletId(wallet).file_name());
    println!("address:    {}", record.address);
    println!("public key: {}", record.public_key_hex);
    if let Some(sig) = &record.generated_signature {
        println!("signature:  {sig}");
    }
    Ok(())
}

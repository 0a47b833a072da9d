use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use wallet_risk_scorer::{
    chains::{ChainDataProvider, EtherscanProvider, SimulatedProvider},
    config::Settings,
    pipeline::{read_wallets, write_results, BatchPipeline, PipelineOptions, RunSummary},
    scoring::RiskEngine,
};

#[derive(Parser)]
#[clap(name = "wallet-risk-scorer")]
#[clap(about = "Deterministic risk scoring for wallet address lists", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every wallet in the input table and write the result table
    Batch {
        /// Input CSV with a wallet_id column
        #[clap(short, long)]
        input: PathBuf,

        /// Destination CSV for scored rows
        #[clap(short, long, default_value = "wallet_risk_scores.csv")]
        output: PathBuf,

        /// Pause between wallets, in milliseconds (overrides configuration)
        #[clap(long)]
        delay_ms: Option<u64>,

        /// Use the seeded data simulator instead of live APIs
        #[clap(long)]
        demo: bool,

        /// Seed for the simulator
        #[clap(long, default_value = "42")]
        seed: u64,
    },

    /// Score a single wallet and print the factor breakdown
    Score {
        /// Wallet address
        #[clap(short, long)]
        address: String,

        /// Use the seeded data simulator instead of live APIs
        #[clap(long)]
        demo: bool,

        /// Seed for the simulator
        #[clap(long, default_value = "42")]
        seed: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let settings = Settings::new().unwrap_or_else(|_| {
        info!("Using default settings");
        Settings::default()
    });

    if let Err(e) = settings.validate() {
        error!("Invalid settings: {}", e);
        return Err(anyhow::anyhow!(e));
    }

    match cli.command {
        Commands::Batch {
            input,
            output,
            delay_ms,
            demo,
            seed,
        } => {
            // Preflight: a missing or malformed input table fails the whole
            // run before any wallet is touched.
            let wallets = read_wallets(&input)?;
            info!("Found {} wallet addresses to process", wallets.len());

            let provider = build_provider(demo, seed, &settings)?;
            let engine = RiskEngine::new(settings.scoring.clone())?;
            let options = PipelineOptions {
                delay: Duration::from_millis(delay_ms.unwrap_or(settings.pipeline.delay_ms)),
                checkpoint_interval: settings.pipeline.checkpoint_interval,
                checkpoint_path: checkpoint_path(&output),
            };

            let pipeline = BatchPipeline::new(provider, engine, options);

            let cancel = pipeline.cancel_flag();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.store(true, Ordering::SeqCst);
                }
            });

            let results = pipeline.run(&wallets).await?;
            write_results(&output, &results)?;
            info!("Final results saved to {}", output.display());

            println!("{}", RunSummary::from_results(&results));
        }

        Commands::Score { address, demo, seed } => {
            let provider = build_provider(demo, seed, &settings)?;
            let engine = RiskEngine::new(settings.scoring.clone())?;
            let options = PipelineOptions {
                delay: Duration::ZERO,
                checkpoint_interval: settings.pipeline.checkpoint_interval,
                checkpoint_path: checkpoint_path(Path::new("wallet_risk_scores.csv")),
            };

            let pipeline = BatchPipeline::new(provider, engine, options);
            let assessment = pipeline.process_wallet(&address).await;

            match &assessment.error {
                None => println!("{}", pipeline.engine().explain(&assessment)),
                Some(e) => {
                    error!("Unable to assess {}: {}", address, e);
                    println!(
                        "Risk Score: {}/1000 ({})",
                        assessment.risk_score, assessment.risk_category
                    );
                }
            }
        }
    }

    Ok(())
}

fn build_provider(
    demo: bool,
    seed: u64,
    settings: &Settings,
) -> anyhow::Result<Arc<dyn ChainDataProvider>> {
    if demo {
        info!("Running in demo mode with simulated data (seed {})", seed);
        Ok(Arc::new(SimulatedProvider::new(seed)))
    } else {
        Ok(Arc::new(EtherscanProvider::new(&settings.provider)?))
    }
}

/// Checkpoint table written next to the final output.
fn checkpoint_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wallet_risk_scores.csv".to_string());
    output.with_file_name(format!("temp_{}", name))
}

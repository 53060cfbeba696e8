use clap::Parser;
use color_eyre::eyre::{
    Result,
    eyre,
};
use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};
use rollhouse::{
    chain::{
        Address,
        memory::MemoryChain,
    },
    coordinator::GameCoordinator,
    error::GameError,
    units::{
        Amount,
        format_units,
        parse_units,
    },
};
use std::{
    path::PathBuf,
    time::Duration,
};
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;

/// Plays a simulated dice session against the in-memory chain backend.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of rounds to play.
    #[arg(short, long, default_value_t = 5)]
    rounds: u32,

    /// Bet size per round, in human decimal units.
    #[arg(short, long, default_value = "25")]
    bet: String,

    /// Seed for the simulated oracle.
    #[arg(long)]
    seed: Option<u64>,

    /// Also write logs to rolling files in this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn init_tracing(
    log_dir: Option<&PathBuf>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_dir {
        Some(dir) => {
            let file = rolling::daily(dir, "rollhouse.log");
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let _guard = init_tracing(args.log_dir.as_ref());

    let player = Address([0xA1; 20]);
    let chain = MemoryChain::new().with_signer(player);
    let token = chain.create_token("DICE", "Rollhouse Dice", 9, Amount(10), 250);
    chain.fund(&token.address, &player, Amount(1_000_000_000_000));
    tracing::info!(token = %token.address, "demo token deployed");

    // Simulated oracle: fulfills pending requests shortly after submission.
    let oracle_chain = chain.clone();
    let oracle_token = token.address;
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "starting simulated oracle");
    tokio::spawn(async move {
        let mut rng = StdRng::seed_from_u64(seed);
        loop {
            tokio::time::sleep(Duration::from_millis(400)).await;
            for request_id in oracle_chain.pending_requests(&oracle_token) {
                let random_number: u64 = rng.random_range(0..1_000_000);
                if let Err(error) =
                    oracle_chain.resolve(&oracle_token, &request_id, random_number)
                {
                    tracing::warn!(%request_id, %error, "oracle fulfillment failed");
                }
            }
        }
    });

    let amount =
        parse_units(&args.bet, token.decimals).map_err(|e| eyre!("--bet: {e}"))?;
    let mut coordinator = GameCoordinator::new(chain.clone(), player);
    coordinator.initialize(token.clone()).await?;

    for round in 1..=args.rounds {
        let request_id = coordinator.place_bet(amount).await?;
        match coordinator.await_result(request_id).await {
            Ok(bet) => {
                tracing::info!(
                    round,
                    tier = bet.tier().map(|t| t.label).unwrap_or(""),
                    payout = %format_units(bet.payout.unwrap_or(Amount::ZERO), token.decimals),
                    won = bet.won(),
                    "round settled"
                );
            }
            Err(GameError::ResolutionTimeout { request_id, .. }) => {
                tracing::warn!(round, %request_id, "still waiting on the oracle");
            }
            Err(error) => return Err(error.into()),
        }
    }

    if let Some(stats) = coordinator.stats() {
        tracing::info!(
            total_bets = stats.total_bets,
            winnings = %format_units(stats.total_winnings, token.decimals),
            losses = %format_units(stats.total_losses, token.decimals),
            win_rate = stats.win_rate,
            "session finished"
        );
    }
    coordinator.cleanup();
    Ok(())
}

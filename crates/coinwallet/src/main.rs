//! coinwallet: command-line client for the wallet and price services.
//!
//! Usage:
//!   coinwallet balance [--user Alice|Bob] [--watch | --unary-watch] [--route R]
//!   coinwallet price   [--user Alice|Bob] [--watch] [--route R]

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use coinwallet_core::protocol::{metadata, BalanceRequest, BalanceResponse, Envelope, Metadata, PriceRequest};
use coinwallet_core::Tier;
use coinwallet_server::context::CallContext;
use coinwallet_server::obs::log_upstream_host;
use coinwallet_server::services::{PriceApi, WalletApi};
use coinwallet_server::transport::client::{RemotePriceClient, RemoteWalletClient};

const DIAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Query balances and prices from a coinwallet deployment
#[derive(Parser)]
#[command(name = "coinwallet", version, about = "Query balances and prices from a coinwallet deployment")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the wallet balance
    Balance(QueryArgs),
    /// Print the coin price
    Price(QueryArgs),
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Account to act as
    #[arg(long, value_enum, default_value = "alice")]
    user: User,

    /// Stream updates instead of querying once
    #[arg(long)]
    watch: bool,

    /// Repeat the one-shot query every second (balance only)
    #[arg(long, conflicts_with = "watch")]
    unary_watch: bool,

    /// Value for the `route` header
    #[arg(long)]
    route: Option<String>,

    /// Wallet service base URL
    #[arg(long, default_value = "http://localhost:18881")]
    wallet_server: String,

    /// Price service base URL
    #[arg(long, default_value = "http://localhost:18882")]
    price_server: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum User {
    #[value(name = "alice", alias = "Alice")]
    Alice,
    #[value(name = "bob", alias = "Bob")]
    Bob,
}

impl User {
    fn name(self) -> &'static str {
        match self {
            User::Alice => "Alice",
            User::Bob => "Bob",
        }
    }

    /// Token and membership each demo user sends.
    fn credentials(self) -> (&'static str, Tier) {
        match self {
            User::Alice => ("2bd806c9", Tier::Premium),
            User::Bob => ("81b637d8", Tier::Normal),
        }
    }
}

fn outbound_metadata(user: User, route: Option<&str>) -> Metadata {
    let (token, tier) = user.credentials();
    let md = Metadata::credentials(token, tier);
    match route {
        Some(r) if !r.is_empty() => md.with(metadata::ROUTE, r),
        _ => md,
    }
}

fn print_balance(user: User, r: &BalanceResponse) {
    tracing::info!("user: {}, total coin balance: {}.", user.name(), r.balance);
    for a in &r.addresses {
        tracing::info!(" - address: {}, balance: {}.", a.address, a.balance);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    match Cli::parse().command {
        Commands::Balance(args) => cmd_balance(&args).await,
        Commands::Price(args) => {
            if args.unary_watch {
                bail!("--unary-watch is incompatible with the price subcommand");
            }
            cmd_price(&args).await
        }
    }
}

async fn cmd_balance(args: &QueryArgs) -> Result<()> {
    let md = outbound_metadata(args.user, args.route.as_deref());
    let client = RemoteWalletClient::new(&args.wallet_server, DIAL_TIMEOUT)?;
    let (ctx, _call) = CallContext::new();
    let req = || {
        Envelope::with_metadata(
            BalanceRequest {
                include_balance_per_address: true,
            },
            md.clone(),
        )
    };

    if !args.watch {
        loop {
            match client.fetch_balance(&ctx, req()).await {
                Ok(resp) => {
                    log_upstream_host("wallet", resp.hostname());
                    print_balance(args.user, &resp.payload);
                }
                Err(e) => tracing::warn!("failed to fetch balance: {e}"),
            }
            if !args.unary_watch {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    let opened = client.watch_balance(&ctx, req()).await?;
    log_upstream_host("wallet", opened.hostname());
    let mut stream = opened.into_inner();
    while let Some(item) = stream.recv().await {
        print_balance(args.user, &item?);
    }
    Ok(())
}

async fn cmd_price(args: &QueryArgs) -> Result<()> {
    let md = outbound_metadata(args.user, args.route.as_deref());
    let client = RemotePriceClient::new(&args.price_server, DIAL_TIMEOUT)?;
    let (ctx, _call) = CallContext::new();

    if !args.watch {
        let resp = client
            .fetch_price(&ctx, Envelope::with_metadata(PriceRequest {}, md))
            .await?;
        log_upstream_host("price", resp.hostname());
        tracing::info!("coin price: {}.", resp.payload.price);
        return Ok(());
    }

    let opened = client
        .watch_price(&ctx, Envelope::with_metadata(PriceRequest {}, md))
        .await?;
    log_upstream_host("price", opened.hostname());
    let mut stream = opened.into_inner();
    while let Some(item) = stream.recv().await {
        tracing::info!("coin price: {}.", item?.price);
    }
    Ok(())
}

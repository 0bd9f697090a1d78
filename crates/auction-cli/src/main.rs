//! Auction Services CLI
//!
//! Resolves gated bid signatures and lists featured auctions using the
//! platform's off-chain services.

use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};
use auction_core::api::AdditionalServicesClient;
use auction_core::chains;
use auction_core::config::Config;
use auction_core::types::AuctionIdentifier;
use bid_access::auth_sig::SignInSite;
use bid_access::gateway::HttpDecryptionGateway;
use bid_access::wallet::BidderWallet;
use clap::{Parser, Subcommand};
use signature_resolver::{ResolveRequest, SignatureResolver};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "auction-cli",
    about = "Client for the batch-auction off-chain services"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the bid signature for one auction.
    Resolve {
        #[arg(long)]
        chain_id: u64,
        #[arg(long)]
        auction_id: u64,
        /// Account to resolve for; defaults to the bidder wallet address.
        #[arg(long)]
        account: Option<String>,
        /// Overrides DECRYPTION_GATEWAY_URL.
        #[arg(long)]
        gateway_url: Option<String>,
    },
    /// List the most interesting auctions across configured networks.
    Featured {
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "auction_cli=info,auction_core=info,bid_access=info,signature_resolver=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Resolve {
            chain_id,
            auction_id,
            account,
            gateway_url,
        } => resolve(config, chain_id, auction_id, account, gateway_url).await,
        Commands::Featured { count } => featured(config, count).await,
    }
}

async fn resolve(
    config: Config,
    chain_id: u64,
    auction_id: u64,
    account: Option<String>,
    gateway_url: Option<String>,
) -> Result<()> {
    let client =
        AdditionalServicesClient::new(config.services.endpoints, config.services.environment)?;

    let gateway_url = gateway_url.or(config.gateway.url).ok_or_else(|| {
        anyhow!("No decryption gateway configured - set DECRYPTION_GATEWAY_URL or pass --gateway-url")
    })?;
    let gateway = HttpDecryptionGateway::new(&gateway_url)?;

    let wallet = Arc::new(BidderWallet::from_env()?);
    let account = match account {
        Some(raw) => Address::from_str(&raw).context("Invalid account address")?,
        None => wallet.address(),
    };

    let mut site = SignInSite::default();
    if let Some(domain) = config.sign_in.domain {
        site.domain = domain;
    }
    if let Some(origin) = config.sign_in.origin {
        site.origin = origin;
    }

    let resolver = SignatureResolver::new(Arc::new(client), Arc::new(gateway), site);
    let identifier = AuctionIdentifier::new(auction_id, chain_id);
    info!(%identifier, %account, "Resolving bid signature");

    resolver
        .resolve(ResolveRequest::for_auction(identifier, account, wallet))
        .await?;

    match resolver.signature() {
        Some(signature) => println!("{}", signature),
        None => println!("No signature available for {}", identifier),
    }

    Ok(())
}

async fn featured(config: Config, count: usize) -> Result<()> {
    let client =
        AdditionalServicesClient::new(config.services.endpoints, config.services.environment)?;

    let auctions = client.all_interesting_auctions(count).await?;
    if auctions.is_empty() {
        println!("No auctions available");
        return Ok(());
    }

    for auction in auctions {
        let end = auction
            .end_time()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "#{} [{}] {}/{}  clearing price {}  ends {}",
            auction.auction_id,
            chains::chain_name(auction.chain_id),
            auction.symbol_auctioning_token,
            auction.symbol_bidding_token,
            auction.current_clearing_price,
            end,
        );
    }

    Ok(())
}

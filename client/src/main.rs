use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use subscription_client::clock::SystemClock;
use subscription_client::notify::TracingNotifier;
use subscription_client::subscription::TierUnit;
use subscription_client::wallet::{MemoryWallet, Operation};
use subscription_client::{Outcome, SubscriptionConfig, SubscriptionViewModel};

/// Walk through sign in, subscribe and revoke against an in-memory wallet.
#[derive(Debug, Parser)]
#[command(name = "subscription-client", version)]
struct Args {
    /// Tier to subscribe to: week, month or year.
    #[arg(long, default_value = "month")]
    tier: TierUnit,

    /// Decline the grant prompt, as a user would in the wallet dialog.
    #[arg(long)]
    reject: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = SubscriptionConfig::from_env().context("Failed to load configuration")?;
    println!("✅ Loaded config for chain {}", config.chain_id);
    println!("   Subscription token: {}", config.token);

    let wallet = MemoryWallet::new(Address::repeat_byte(0x11), config.chain_id);
    let model = SubscriptionViewModel::new(wallet.clone(), TracingNotifier, SystemClock, config);
    print!("\n{}", model.view());

    // 1. Sign in
    println!("\n🔑 Signing in...");
    if model.sign_in().await != Outcome::Completed {
        anyhow::bail!("Sign in failed");
    }
    if let Some(account) = model.account() {
        println!("   Account: {}", account);
    }
    print!("\n{}", model.view());

    // 2. Subscribe
    model.select_tier(args.tier);
    if args.reject {
        wallet.reject_next(Operation::Grant);
    }
    println!("\n📤 Subscribing to the {} tier...", model.selected_tier());
    match model.submit().await {
        Outcome::Completed => println!("✅ Subscribed"),
        Outcome::Rejected => println!("⚠️  Request declined in wallet"),
        Outcome::Failed(message) => println!("❌ Subscribe failed: {}", message),
        Outcome::Busy => println!("⚠️  A grant is already pending"),
    }
    print!("\n{}", model.view());

    // 3. Revoke
    if let Some(active) = model.active_tier() {
        println!("\n🗑️  Revoking {}...", active.grant_id);
        match model.revoke(&active.grant_id).await {
            Outcome::Completed => println!("✅ Revoked"),
            other => println!("❌ Revoke did not complete: {:?}", other),
        }
        print!("\n{}", model.view());
    }

    Ok(())
}

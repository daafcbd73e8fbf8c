//! Clementine CLI - cart and checkout from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the active cart (creates one locally if none exists)
//! clementine cart show
//!
//! # Add two of a product to the cart
//! clementine cart add --id 1 --name "Angular Speedster Board 2000" --price 10.99 --quantity 2
//!
//! # List delivery methods
//! clementine delivery list
//!
//! # Check out the cart to a placed order
//! clementine checkout --email jordan@example.com --name "Jordan Blake" \
//!     --line1 "1 Harbor Way" --city Portsmouth --state NH \
//!     --postal-code 03801 --country USA --delivery 2
//!
//! # Review order history
//! clementine orders list
//! clementine orders show --id 7
//! ```
//!
//! # Environment Variables
//!
//! - `CLEMENTINE_API_URL` - Base URL of the store API (required)
//! - `CLEMENTINE_DATA_DIR` - Durable cache directory (default `.clementine`)
//! - `SENTRY_DSN` - Error reporting DSN (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use clementine_client::{ClientConfig, ClientState};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "clementine")]
#[command(author, version, about = "Clementine storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and edit the active cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Delivery method catalog
    Delivery {
        #[command(subcommand)]
        action: DeliveryAction,
    },
    /// Walk the active cart through checkout to a placed order
    Checkout(commands::checkout::CheckoutArgs),
    /// Look up placed orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the active cart, syncing it from the store first
    Show,
    /// Add a product to the cart
    Add(commands::cart::AddArgs),
    /// Remove a product line from the cart
    Remove {
        /// Product id of the line to remove
        #[arg(long)]
        id: i32,
    },
    /// Set a line's quantity directly
    Update {
        /// Product id of the line to update
        #[arg(long)]
        id: i32,

        /// New quantity; 0 removes the line
        #[arg(long)]
        quantity: u32,
    },
    /// Delete the cart locally and remotely
    Clear,
}

#[derive(Subcommand)]
enum DeliveryAction {
    /// List available delivery methods
    List,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List placed orders
    List,
    /// Show a single order
    Show {
        /// Order id
        #[arg(long)]
        id: i32,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Parse first so `--help` works without any environment set up.
    let cli = Cli::parse();

    let config = ClientConfig::from_env().expect("Failed to load configuration");

    // Sentry must be initialized before the tracing subscriber.
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "clementine=info,clementine_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = ClientState::new(config)?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&state).await,
            CartAction::Add(args) => commands::cart::add(&state, args).await?,
            CartAction::Remove { id } => commands::cart::remove(&state, id).await?,
            CartAction::Update { id, quantity } => {
                commands::cart::update(&state, id, quantity).await?;
            }
            CartAction::Clear => commands::cart::clear(&state).await?,
        },
        Commands::Delivery { action } => match action {
            DeliveryAction::List => commands::delivery::list(),
        },
        Commands::Checkout(args) => commands::checkout::run(&state, args).await?,
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(&state).await?,
            OrdersAction::Show { id } => commands::orders::show(&state, id).await?,
        },
    }
    Ok(())
}

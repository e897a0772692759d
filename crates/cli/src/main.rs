//! Chloe's Boutique CLI - drive the persistent cart from a terminal.
//!
//! Every invocation is one browsing context over the directory-backed origin
//! at `BOUTIQUE_DATA_DIR`. Running `watch` in one terminal and mutating
//! commands in another shows cross-context synchronization.
//!
//! # Usage
//!
//! ```bash
//! # Add a product
//! boutique add --id 42 --name "Silk Scarf" --price 249.99 --image img/scarf.jpg
//!
//! # Change a quantity, remove a line
//! boutique qty 42 3
//! boutique remove 42
//!
//! # Show items and totals, or render the cart page
//! boutique show
//! boutique render > cart.html
//!
//! # Follow changes made by other invocations
//! boutique watch
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use chloes_boutique_storefront::config::BoutiqueConfig;
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "boutique")]
#[command(author, version, about = "Chloe's Boutique cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one unit of a product to the cart
    Add {
        /// Product id
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long, default_value = "")]
        name: String,

        /// Unit price, e.g. 249.99 or R1,299.00
        #[arg(long)]
        price: String,

        /// Image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Set a line's quantity
    Qty {
        /// Product id
        id: String,

        /// New quantity, as typed into the quantity input
        qty: String,
    },
    /// Remove a line
    Remove {
        /// Product id
        id: String,
    },
    /// Empty the cart
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Print items and totals
    Show,
    /// Print the cart badge text
    Badge,
    /// Print the cart page HTML
    Render,
    /// Place a simulated order
    Checkout,
    /// Validate and send the contact form
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        message: String,
    },
    /// Print every cart change made by other invocations until Ctrl+C
    Watch,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &BoutiqueConfig) -> Option<sentry::ClientInitGuard> {
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

fn init_tracing(config: &BoutiqueConfig) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "chloes_boutique_storefront=info,chloes_boutique_cli=info".into());

    // Logs go to stderr; stdout carries command output
    let json = config.log_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let pretty = (!config.log_json)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(pretty)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match BoutiqueConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(&config);

    if let Err(e) = run(cli, &config).await {
        e.capture();
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &BoutiqueConfig) -> chloes_boutique_storefront::Result<()> {
    let session = commands::Session::open(config)?;

    match cli.command {
        Commands::Add {
            id,
            name,
            price,
            image,
        } => commands::cart::add(&session, id, name, &price, image)?,
        Commands::Qty { id, qty } => commands::cart::set_qty(&session, id, &qty)?,
        Commands::Remove { id } => commands::cart::remove(&session, id)?,
        Commands::Clear { yes } => commands::cart::clear(&session, yes)?,
        Commands::Show => commands::cart::show(&session)?,
        Commands::Badge => commands::cart::badge(&session)?,
        Commands::Render => commands::cart::render(&session)?,
        Commands::Checkout => commands::checkout::run(&session, config.checkout_delay).await?,
        Commands::Contact {
            name,
            email,
            message,
        } => commands::contact::send(name, email, message)?,
        Commands::Watch => commands::watch::run(&session, config.poll_interval).await?,
    }
    Ok(())
}

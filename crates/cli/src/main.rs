//! Bazaar CLI - browse the catalog and manage a cart from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! bazaar products --category electronics --sort price-desc
//! bazaar products --search jacket --page 2
//! bazaar products --url 'http://localhost:3000/?search=jacket'
//! bazaar product 7
//!
//! # Cart and wishlist
//! bazaar cart add 7 --quantity 2
//! bazaar cart show
//! bazaar wishlist toggle 3
//!
//! # Account
//! bazaar login -u jo
//! bazaar checkout
//! bazaar logout
//! ```
//!
//! Configuration is read from `BAZAAR_*` environment variables (and `.env`);
//! see `bazaar_storefront::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use bazaar_core::ProductId;
use bazaar_storefront::config::{LogFormat, StorefrontConfig, normalize_base_url};
use bazaar_storefront::error::AppError;
use bazaar_storefront::state::AppState;

mod commands;
mod output;

/// Errors that end a command with a non-zero exit status.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    /// A catalog fetch failed; the message was recorded on the product state.
    #[error("{0}")]
    Fetch(String),

    #[error("Invalid --catalog-url: {0}")]
    CatalogUrl(String),
}

impl CliError {
    fn report(&self) {
        match self {
            Self::App(err) => err.report(),
            Self::Fetch(message) => tracing::warn!(error = %message, "Catalog unavailable"),
            Self::CatalogUrl(_) => {}
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::App(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar storefront CLI")]
struct Cli {
    /// Directory holding the cart, wishlist and session (overrides `BAZAAR_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Catalog API base URL (overrides `BAZAAR_CATALOG_URL`)
    #[arg(long, global = true)]
    catalog_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products with filters, sorting and pagination
    Products {
        /// Only show this category (exact match)
        #[arg(short, long)]
        category: Option<String>,

        /// Minimum price
        #[arg(long)]
        min: Option<Decimal>,

        /// Maximum price
        #[arg(long)]
        max: Option<Decimal>,

        /// Sort order (`price-asc`, `price-desc`, `rating`)
        #[arg(short, long)]
        sort: Option<String>,

        /// Case-insensitive title search
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Take the search from a storefront listing link
        #[arg(long, conflicts_with = "search")]
        url: Option<Url>,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show one product
    Product {
        /// Product ID
        id: ProductId,
    },
    /// List catalog categories
    Categories,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Sign in
    Login {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long, default_value = "")]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Validate a registration
    Register {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Password confirmation
        #[arg(short = 'c', long)]
        confirm_password: String,
    },
    /// Review the cart before paying (requires sign-in)
    Checkout,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add a product
    Add {
        /// Product ID
        id: ProductId,

        /// Units to add
        #[arg(short, long, default_value = "1")]
        quantity: NonZeroU32,
    },
    /// Remove a product's line
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Set a line's quantity
    Set {
        /// Product ID
        id: ProductId,

        /// New quantity
        quantity: NonZeroU32,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show saved products (requires sign-in)
    Show,
    /// Save a product
    Add {
        /// Product ID
        id: ProductId,
    },
    /// Unsave a product
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Save or unsave a product
    Toggle {
        /// Product ID
        id: ProductId,
    },
    /// Remove every saved product
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
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

/// Logs go to stderr so command output stays clean on stdout.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_storefront=info,bazaar_cli=info".into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter));

    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn load_config(cli: &Cli) -> Result<StorefrontConfig, CliError> {
    let mut config = StorefrontConfig::from_env().map_err(AppError::from)?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir.clone_from(dir);
    }
    if let Some(raw) = &cli.catalog_url {
        config.catalog_url = normalize_base_url(raw).map_err(CliError::CatalogUrl)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => output::fail(&e.user_message()),
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    if let Err(e) = run(cli, config).await {
        e.report();
        output::fail(&e.user_message());
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let state = AppState::new(config)?;
    let outcome = dispatch(&state, cli.command).await;
    state.close();
    outcome
}

async fn dispatch(state: &AppState, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Products {
            category,
            min,
            max,
            sort,
            search,
            url,
            page,
        } => {
            let query = commands::catalog::ListingQuery {
                category,
                min,
                max,
                sort,
                search,
                url,
                page,
            };
            commands::catalog::products(state, query).await?;
        }
        Commands::Product { id } => commands::catalog::product(state, id).await?,
        Commands::Categories => commands::catalog::categories(state).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(state),
            CartAction::Add { id, quantity } => commands::cart::add(state, id, quantity).await?,
            CartAction::Remove { id } => commands::cart::remove(state, id)?,
            CartAction::Set { id, quantity } => commands::cart::set(state, id, quantity)?,
            CartAction::Clear => commands::cart::clear(state)?,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::wishlist::show(state)?,
            WishlistAction::Add { id } => commands::wishlist::add(state, id).await?,
            WishlistAction::Remove { id } => commands::wishlist::remove(state, id)?,
            WishlistAction::Toggle { id } => commands::wishlist::toggle(state, id).await?,
            WishlistAction::Clear => commands::wishlist::clear(state)?,
        },
        Commands::Login { username, password } => {
            commands::account::login(state, username, password).await?;
        }
        Commands::Logout => commands::account::logout(state)?,
        Commands::Whoami => commands::account::whoami(state),
        Commands::Register {
            username,
            email,
            password,
            confirm_password,
        } => commands::account::register(state, username, email, password, confirm_password)?,
        Commands::Checkout => commands::account::checkout(state)?,
    }
    Ok(())
}

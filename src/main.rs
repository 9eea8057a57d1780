//! `canteen`: terminal front-end over the session and favorites stores.
//!
//! Persisted state lives in the JSON file named by `CANTEEN_STORAGE_PATH`,
//! so a login survives across invocations the way a browser session
//! survives reloads.

use std::path::PathBuf;
use std::sync::Arc;

use canteen::config::{self, ClientConfig, ConfigError};
use canteen::state::nav::TracingNavigator;
use canteen::{ApiError, FavoritesStore, FileStore, HttpApi, KeyValueStore, Product, Scope, SessionError, SessionStore};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("registration payload must be a JSON object")]
    NotAnObject,
    #[error("not signed in")]
    NotSignedIn,
}

#[derive(Parser, Debug)]
#[command(name = "canteen", about = "School canteen session and favorites client")]
struct Cli {
    /// Overrides `CANTEEN_API_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides `CANTEEN_STORAGE_PATH`.
    #[arg(long)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CANTEEN_PASSWORD")]
        password: String,
    },
    /// Create an account from a JSON object of fields, then sign in.
    Register { payload: String },
    /// Forget the session.
    Logout,
    /// Confirm the stored session and print the signed-in user.
    Whoami,
    Favorites(FavoritesCommand),
}

#[derive(Args, Debug)]
struct FavoritesCommand {
    #[command(subcommand)]
    command: FavoritesSubcommand,
}

#[derive(Subcommand, Debug)]
enum FavoritesSubcommand {
    List,
    Count,
    /// Add a product given as JSON.
    Add { product: String },
    Remove { id: String },
    /// Add or remove a product given as JSON.
    Toggle { product: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config.api_base_url = config::parse_base_url(base_url)?;
    }
    if let Some(storage) = cli.storage {
        config.storage_path = storage;
    }

    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.storage_path));
    match cli.command {
        Command::Favorites(cmd) => run_favorites(storage, cmd.command),
        Command::Login { email, password } => {
            let user = open_session(&config, storage)?.login(&email, &password).await?;
            print_json(&user)
        }
        Command::Register { payload } => {
            let Value::Object(fields) = serde_json::from_str::<Value>(&payload)? else {
                return Err(CliError::NotAnObject);
            };
            let user = open_session(&config, storage)?.register(fields).await?;
            print_json(&user)
        }
        Command::Logout => {
            open_session(&config, storage)?.logout().await;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            let session = open_session(&config, storage)?;
            session.initialize(&Scope::new()).await;
            let user = session.user().ok_or(CliError::NotSignedIn)?;
            print_json(&user)
        }
    }
}

fn open_session(config: &ClientConfig, storage: Arc<dyn KeyValueStore>) -> Result<SessionStore, CliError> {
    let api = Arc::new(HttpApi::from_config(config)?);
    Ok(SessionStore::new(api, storage, Arc::new(TracingNavigator), config))
}

fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_favorites(storage: Arc<dyn KeyValueStore>, command: FavoritesSubcommand) -> Result<(), CliError> {
    let favorites = FavoritesStore::load(storage);
    match command {
        FavoritesSubcommand::List => print_json(&favorites.favorites())?,
        FavoritesSubcommand::Count => println!("{}", favorites.favorites_count()),
        FavoritesSubcommand::Add { product } => {
            let product: Product = serde_json::from_str(&product)?;
            let id = product.id.clone();
            if favorites.add_favorite(product) {
                println!("added {id}");
            } else {
                println!("{id} already a favorite");
            }
        }
        FavoritesSubcommand::Remove { id } => {
            if favorites.remove_favorite(&id) {
                println!("removed {id}");
            } else {
                println!("{id} was not a favorite");
            }
        }
        FavoritesSubcommand::Toggle { product } => {
            let product: Product = serde_json::from_str(&product)?;
            let id = product.id.clone();
            let state = if favorites.toggle_favorite(product) { "added" } else { "removed" };
            println!("{state} {id}");
        }
    }
    Ok(())
}

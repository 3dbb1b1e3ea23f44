mod local_state;
mod render;


use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use cakeshop::auth::{
    AuthError, AuthStore, Credentials, ProfilePatch, Registration, SessionClient, ValidationErrors,
};
use cakeshop::catalog::{catalog, category_from_query, filter_catalog};
use cakeshop::config::{ConfigError, StorefrontConfig};
use cakeshop::shop::ShopError;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use local_state::{LocalState, StateFileError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{}", remote_message(.0))]
    Auth(#[from] AuthError),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Shop(#[from] ShopError),
    #[error(transparent)]
    State(#[from] StateFileError),
    #[error("nothing to update; pass --display-name or --phone")]
    EmptyPatch,
    #[error("not signed in")]
    NotSignedIn,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

fn remote_message(error: &AuthError) -> String {
    error.user_message()
}

#[derive(Parser, Debug)]
#[command(name = "cakeshop", about = "Custom-cake storefront CLI")]
struct Cli {
    /// Where the session, cart and wishlist are kept between runs.
    #[arg(long, env = "CAKESHOP_STATE_FILE", default_value = ".cakeshop-state.json")]
    state_file: PathBuf,

    /// Log storefront debug output to stderr.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse the cake gallery.
    Gallery(GalleryArgs),
    /// List gallery category filters.
    Categories,
    Auth(AuthCommand),
    Profile(ProfileCommand),
    Cart(CartCommand),
    Wishlist(WishlistCommand),
}

#[derive(Args, Debug)]
struct GalleryArgs {
    #[arg(long, default_value = "")]
    search: String,

    /// Category id; omit for all cakes.
    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
enum AuthSubcommand {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CAKESHOP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CAKESHOP_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        full_name: String,
    },
    Logout,
    Whoami,
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Show,
    Update {
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

#[derive(Args, Debug)]
struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Subcommand, Debug)]
enum CartSubcommand {
    Add {
        item_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    Remove {
        item_id: String,
    },
    /// Replace a line's quantity; 0 removes it.
    Set {
        item_id: String,
        quantity: u32,
    },
    Clear,
    Show,
}

#[derive(Args, Debug)]
struct WishlistCommand {
    #[command(subcommand)]
    command: WishlistSubcommand,
}

#[derive(Subcommand, Debug)]
enum WishlistSubcommand {
    Add { item_id: String },
    Remove { item_id: String },
    Toggle { item_id: String },
    Show,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Validation(errors)) => {
            eprintln!("invalid input:\n{}", render::field_errors(&errors));
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins when set; otherwise warnings everywhere, plus debug for
/// the storefront crates under `--verbose`.
fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_directives(verbose)))
}

fn default_log_directives(verbose: bool) -> &'static str {
    if verbose { "warn,cakeshop=debug,cakeshop_cli=debug" } else { "warn" }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut state = LocalState::load(&cli.state_file)?;

    match cli.command {
        Command::Gallery(args) => run_gallery(&state, &args),
        Command::Categories => {
            println!("{}", render::categories());
            Ok(())
        }
        Command::Auth(auth) => run_auth(&cli.state_file, &mut state, auth.command).await,
        Command::Profile(profile) => run_profile(&cli.state_file, &mut state, profile.command).await,
        Command::Cart(cart) => {
            run_cart(&mut state, cart.command)?;
            state.save(&cli.state_file)?;
            Ok(())
        }
        Command::Wishlist(wishlist) => {
            run_wishlist(&mut state, wishlist.command)?;
            state.save(&cli.state_file)?;
            Ok(())
        }
    }
}

// =============================================================================
// Gallery
// =============================================================================

fn run_gallery(state: &LocalState, args: &GalleryArgs) -> Result<(), CliError> {
    let category = category_from_query(args.category.as_deref());
    let items = filter_catalog(catalog(), &args.search, category);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        println!("{}", render::gallery(&items, &state.wishlist));
    }
    Ok(())
}

// =============================================================================
// Auth and profile
// =============================================================================

/// Store wired to the configured backend, with the persisted session restored.
struct AuthContext {
    client: Arc<SessionClient>,
    store: AuthStore,
}

impl AuthContext {
    fn open(state: &LocalState) -> Result<Self, CliError> {
        let config = StorefrontConfig::from_env()?;
        let client = Arc::new(SessionClient::from_config(&config)?);
        if client.is_fake() {
            eprintln!("(offline mode: identity service not configured)");
        }
        client.restore_session(state.session.clone());
        let store = AuthStore::new(client.clone());
        Ok(Self { client, store })
    }

    /// Persist whatever session the client ends up holding.
    fn save(&self, path: &Path, state: &mut LocalState) -> Result<(), CliError> {
        state.session = self.client.session();
        state.save(path)?;
        Ok(())
    }
}

async fn run_auth(path: &Path, state: &mut LocalState, command: AuthSubcommand) -> Result<(), CliError> {
    let ctx = AuthContext::open(state)?;
    let result = match command {
        AuthSubcommand::Login { email, password } => {
            let credentials = Credentials::new(&email, &password)?;
            let profile = ctx.store.login(&credentials).await;
            profile.map(|p| println!("Signed in as {} <{}>", p.display_name, p.email))
        }
        AuthSubcommand::Register { email, password, full_name } => {
            let registration = Registration::new(&email, &password, &full_name)?;
            match ctx.store.register(&registration).await {
                Ok(profile) => {
                    println!("Welcome, {}!", profile.display_name);
                    Ok(())
                }
                Err(e @ AuthError::ConfirmationRequired) => {
                    println!("{}", e.user_message());
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        AuthSubcommand::Logout => ctx.store.logout().await.map(|()| println!("Signed out")),
        AuthSubcommand::Whoami => ctx.store.fetch_current_user().await.map(|profile| match profile {
            Some(p) => println!("{}", render::profile(&p)),
            None => println!("Not signed in"),
        }),
    };
    // Refreshes and sign-outs change the session even when the command fails.
    ctx.save(path, state)?;
    result.map_err(CliError::from)
}

async fn run_profile(path: &Path, state: &mut LocalState, command: ProfileSubcommand) -> Result<(), CliError> {
    let ctx = AuthContext::open(state)?;
    let result = run_profile_command(&ctx.store, command).await;
    ctx.save(path, state)?;
    result
}

async fn run_profile_command(store: &AuthStore, command: ProfileSubcommand) -> Result<(), CliError> {
    let Some(current) = store.fetch_current_user().await? else {
        return Err(CliError::NotSignedIn);
    };
    match command {
        ProfileSubcommand::Show => println!("{}", render::profile(&current)),
        ProfileSubcommand::Update { display_name, phone } => {
            let patch = ProfilePatch { display_name, phone };
            if patch.is_empty() {
                return Err(CliError::EmptyPatch);
            }
            let updated = store.update_profile(patch).await?;
            println!("{}", render::profile(&updated));
        }
    }
    Ok(())
}

// =============================================================================
// Cart and wishlist
// =============================================================================

fn run_cart(state: &mut LocalState, command: CartSubcommand) -> Result<(), CliError> {
    let cart = &mut state.cart;
    match command {
        CartSubcommand::Add { item_id, quantity } => {
            let total = cart.add(catalog(), &item_id, quantity)?;
            println!("{item_id}: {total} in cart");
        }
        CartSubcommand::Remove { item_id } => {
            cart.remove(&item_id)?;
            println!("Removed {item_id}");
        }
        CartSubcommand::Set { item_id, quantity } => {
            cart.set_quantity(&item_id, quantity)?;
            println!("{item_id}: {quantity} in cart");
        }
        CartSubcommand::Clear => {
            cart.clear();
            println!("{}", render::EMPTY_CART);
        }
        CartSubcommand::Show => println!("{}", render::cart(cart, catalog())),
    }
    Ok(())
}

fn run_wishlist(state: &mut LocalState, command: WishlistSubcommand) -> Result<(), CliError> {
    let wishlist = &mut state.wishlist;
    match command {
        WishlistSubcommand::Add { item_id } => {
            if wishlist.add(catalog(), &item_id)? {
                println!("Saved {item_id}");
            } else {
                println!("{item_id} is already saved");
            }
        }
        WishlistSubcommand::Remove { item_id } => {
            if wishlist.remove(&item_id) {
                println!("Removed {item_id}");
            } else {
                println!("{item_id} was not saved");
            }
        }
        WishlistSubcommand::Toggle { item_id } => {
            let saved = wishlist.toggle(catalog(), &item_id)?;
            println!("{item_id} {}", if saved { "saved" } else { "removed" });
        }
        WishlistSubcommand::Show => println!("{}", render::wishlist(wishlist, catalog())),
    }
    Ok(())
}

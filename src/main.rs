use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tabled::Table;

use spotsample::{
    config::{self, Settings},
    error, info,
    management::CredentialStore,
    server::{self, AppState},
    spotify::{auth::SpotifyAuth, client::HttpTransport},
    success,
    types::CredentialTableRow,
    warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the web front end
    Serve(ServeOptions),

    /// List users with stored credentials
    Users,

    /// Delete the stored credentials of a user
    Forget(ForgetOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Listen address, overrides SERVER_ADDRESS
    #[clap(long)]
    pub addr: Option<String>,

    /// Open the start page in the browser
    #[clap(long)]
    pub open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ForgetOptions {
    user_id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

async fn open_store(settings: &Settings) -> CredentialStore {
    match CredentialStore::open(&settings.database_path).await {
        Ok(store) => store,
        Err(e) => error!(
            "Cannot open credential store {}. Err: {}",
            settings.database_path.display(),
            e
        ),
    }
}

async fn serve(settings: Settings, opt: ServeOptions) {
    let store = open_store(&settings).await;
    let client = reqwest::Client::new();
    let transport = Arc::new(HttpTransport::new(client.clone()));
    let auth = Arc::new(SpotifyAuth::new(client, &settings));
    let addr = opt.addr.unwrap_or_else(|| settings.server_addr.clone());

    if opt.open {
        let url = format!("http://{}/", addr);
        match webbrowser::open(&url) {
            Ok(_) => info!("Opened {} in the browser", url),
            Err(e) => warning!("Failed to open browser: {}. Visit {} manually", e, url),
        }
    }

    let state = AppState::new(settings, transport, auth, store);
    if let Err(e) = server::start_server(state, &addr).await {
        error!("Server stopped. Err: {}", e);
    }
}

async fn list_users(settings: Settings) {
    let store = open_store(&settings).await;
    let stored = match store.list().await {
        Ok(stored) => stored,
        Err(e) => error!("Cannot read credential store. Err: {}", e),
    };

    if stored.is_empty() {
        info!("No stored credentials in {}", store.path().display());
        return;
    }

    let rows: Vec<CredentialTableRow> = stored.into_iter().map(CredentialTableRow::from).collect();
    println!("{}", Table::new(rows));
}

async fn forget_user(settings: Settings, user_id: &str) {
    let store = open_store(&settings).await;
    match store.remove(user_id).await {
        Ok(true) => success!("Removed stored credentials of {}", user_id),
        Ok(false) => warning!("No stored credentials for {}", user_id),
        Err(e) => error!("Cannot update credential store. Err: {}", e),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command_for_update();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };

    match cli.command {
        Command::Serve(opt) => serve(settings, opt).await,
        Command::Users => list_users(settings).await,
        Command::Forget(opt) => forget_user(settings, &opt.user_id).await,
        Command::Completions(_) => {}
    }
}

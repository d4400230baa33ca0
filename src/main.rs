use std::path::PathBuf;

use ai_chat_client::config::{self, AppConfig};
use ai_chat_client::network::{ChatApi, SimulatedApi};
use ai_chat_client::storage::{
    KeyValueStore, MemoryStore, Persistence, PersistentStore, SqliteStore, ensure_parent_dir,
};
use ai_chat_client::ui::components::sidebar;
use ai_chat_client::ui::ChatApp;
use ai_chat_client::{AppError, StorageError};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

type App = ChatApp<Box<dyn KeyValueStore>, SimulatedApi>;

#[derive(Parser)]
#[command(
    name = "ai_chat_client",
    version,
    about = "Chat with a simulated AI assistant from the terminal"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// SQLite file holding the persisted stores
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,
    /// Keep everything in memory for this run
    #[arg(long)]
    ephemeral: bool,
    /// Messages revealed per page of history
    #[arg(long)]
    page_size: Option<usize>,
    /// Write the effective settings back to the config file
    #[arg(long)]
    save_config: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with a phone number and one-time code
    Login {
        #[arg(long, default_value = "+1")]
        country_code: String,
        #[arg(long)]
        phone: String,
        /// Skip the prompt and use this code
        #[arg(long)]
        code: Option<String>,
    },
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List country dialing codes
    Countries,
    /// Create a chatroom
    New { title: String },
    /// List chatrooms, optionally filtered by title
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Delete a chatroom and its messages
    Delete { chat_id: String },
    /// Send one message and wait for the reply
    Send {
        chat_id: String,
        text: Option<String>,
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
    },
    /// Print a chatroom's history, newest pages first
    History {
        chat_id: String,
        /// How many pages of history to reveal
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Open an interactive chatroom session
    Chat { chat_id: String },
    /// Toggle dark mode
    Theme,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    if let Some(database) = cli.database.clone() {
        app_config.database_path = database;
    }
    if let Some(page_size) = cli.page_size {
        app_config.page_size = page_size;
    }
    if cli.save_config {
        config::persist_config(&cli.config, &app_config);
    }

    let mut app = build_app(&app_config, cli.ephemeral)?;
    let result = run_command(&mut app, cli.command).await;
    app.print_notices();
    app.shutdown();
    result
}

fn build_app(config: &AppConfig, ephemeral: bool) -> Result<App, StorageError> {
    let backend: Box<dyn KeyValueStore> = if ephemeral {
        log::info!("Running with in-memory storage");
        Box::new(MemoryStore::new())
    } else {
        ensure_parent_dir(&config.database_path)?;
        log::info!("Opening store at {}", config.database_path.display());
        Box::new(SqliteStore::with_path(&config.database_path)?)
    };

    let persistence = Persistence::new(
        PersistentStore::new(backend, config.namespace.clone()),
        config.flush_policy,
    );
    let api = SimulatedApi::new(config.api.clone());
    Ok(ChatApp::new(persistence, api, config.page_size))
}

async fn prompt(label: &str) -> Result<String, AppError> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim().to_string())
}

async fn run_command(app: &mut App, command: Command) -> Result<(), AppError> {
    match command {
        Command::Login {
            country_code,
            phone,
            code,
        } => {
            println!("Sending OTP...");
            let phone = app.request_code(&country_code, &phone).await?;
            app.print_notices();
            let code = match code {
                Some(code) => code,
                None => prompt(&format!("Enter the 6-digit code sent to {phone}: ")).await?,
            };
            let user = app.verify_code(&phone, &code).await?;
            println!("Welcome, {}!", user.name);
        }
        Command::Logout => app.logout(),
        Command::Whoami => {
            let user = app.current_user()?;
            println!(
                "{} ({}), member since {}",
                user.name,
                user.phone_number,
                user.created_at.format("%Y-%m-%d")
            );
        }
        Command::Countries => {
            for country in app.api().fetch_country_dialing_codes().await {
                println!("{:<6} {} {}", country.dial_code, country.name, country.flag);
            }
        }
        Command::New { title } => {
            let chatroom = app.create_chatroom(&title)?;
            println!("{}  {}", chatroom.id, chatroom.title);
        }
        Command::List { search } => {
            app.current_user()?;
            let query = search.as_deref();
            println!("{}", sidebar::render(&app.search(query), query));
        }
        Command::Delete { chat_id } => {
            let chatroom = app.delete_chatroom(&chat_id)?;
            println!("Deleted \"{}\"", chatroom.title);
        }
        Command::Send {
            chat_id,
            text,
            image,
        } => {
            app.open_chat(&chat_id)?;
            let draft = app.compose(text.as_deref(), image.as_deref()).await?;
            app.send(&chat_id, draft)?;
            println!("{}", app.render_chat());
            app.wait_for_replies().await;
            println!("{}", app.render_chat());
        }
        Command::History { chat_id, pages } => {
            let title = app.open_chat(&chat_id)?.title.clone();
            for _ in 1..pages {
                if !app.load_older() {
                    break;
                }
            }
            println!("== {title} ({} messages) ==", app.chats().message_count(&chat_id));
            println!("{}", app.render_chat());
        }
        Command::Chat { chat_id } => app.run_session(&chat_id).await?,
        Command::Theme => {
            let dark = app.toggle_dark_mode();
            println!("Dark mode {}", if dark { "on" } else { "off" });
        }
    }
    Ok(())
}

//! gmail-functions - run the Gmail mail functions from the command line
//!
//! Prints function results on stdout so a harness can pipe them back to a
//! model; logs and auth prompts go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gmail_tools::{GmailAuth, GmailClient, GmailCredentials, MailFunctions, NotifyConfig};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "gmail-functions", version, about = "Gmail tools for function-calling models")]
struct Cli {
    /// Mailbox to operate on; "me" is the authenticated user
    #[arg(long, default_value = "me", global = true)]
    user_id: String,

    /// Google Cloud Console credentials file (overrides the config directory)
    #[arg(long, env = "GMAIL_CREDENTIALS_FILE", global = true)]
    credentials: Option<PathBuf>,

    /// Where OAuth tokens are stored (defaults to the config directory)
    #[arg(long, env = "GMAIL_TOKEN_FILE", global = true)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Call a function by name with JSON arguments
    Call {
        function: String,
        #[arg(default_value = "{}")]
        arguments: String,
    },
    /// Print the tool definitions as JSON
    Tools,
    /// List messages received since the start of today
    Today {
        #[arg(long, default_value_t = gmail_tools::functions::DEFAULT_MAX_RESULTS)]
        max_results: usize,
    },
    /// Remove stored OAuth tokens
    Logout,
}

fn main() {
    // .env may set SENDER/RECIPIENT and the client credentials
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = run(Cli::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Tools => {
            let tools = gmail_tools::tool_definitions();
            println!("{}", serde_json::to_string_pretty(&tools)?);
            Ok(())
        }
        Command::Logout => {
            build_auth(cli.credentials.as_deref(), cli.token_file.as_deref())?.logout()
        }
        Command::Today { max_results } => {
            let auth = build_auth(cli.credentials.as_deref(), cli.token_file.as_deref())?;
            let functions = build_functions(auth, &cli.user_id)?;
            let query = format!("after:{}", chrono::Local::now().format("%Y/%m/%d"));
            println!("{}", functions.list_messages(max_results, Some(&query))?);
            Ok(())
        }
        Command::Call {
            function,
            arguments,
        } => {
            let auth = build_auth(cli.credentials.as_deref(), cli.token_file.as_deref())?;
            let functions = build_functions(auth, &cli.user_id)?;
            println!("{}", functions.dispatch(&function, &arguments)?);
            Ok(())
        }
    }
}

fn build_auth(credentials: Option<&Path>, token_file: Option<&Path>) -> Result<GmailAuth> {
    if let Err(e) = config::init() {
        warn!("Failed to initialize config directory: {:#}", e);
    }

    let credentials = match credentials {
        Some(path) => GmailCredentials::from_file(path)?,
        None => GmailCredentials::load().map_err(|e| {
            if let Some(path) = GmailCredentials::default_credentials_path() {
                warn!(
                    "To configure Gmail access, either:\n\
                     1. Place your Google OAuth credentials at: {}\n\
                     2. Or set environment variables: GMAIL_CLIENT_ID and GMAIL_CLIENT_SECRET",
                    path.display()
                );
            }
            e.context("Gmail credentials not found")
        })?,
    };

    match token_file {
        Some(path) => Ok(GmailAuth::new(credentials, path)),
        None => GmailAuth::with_default_token_path(credentials),
    }
}

fn build_functions(auth: GmailAuth, user_id: &str) -> Result<MailFunctions> {
    let client = GmailClient::new(auth);
    client.authenticate().context("Gmail authentication failed")?;
    info!("Gmail client initialized for {}", user_id);

    let functions = MailFunctions::new(Arc::new(client), user_id);
    Ok(match NotifyConfig::load() {
        Ok(notify) => functions.with_notify(notify),
        Err(e) => {
            warn!("Notifications disabled: {:#}", e);
            functions
        }
    })
}

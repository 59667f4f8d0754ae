//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use socialapp_core::core::interrupt;
use socialapp_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "socialapp")]
#[command(version)]
#[command(about = "Command-line client for the socialapp backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL (overrides SOCIALAPP_BASE_URL and config)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long, env = "SOCIALAPP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account and store the session token
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        handle: String,
        /// Read from stdin when omitted
        #[arg(long, env = "SOCIALAPP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Defaults to the password
        #[arg(long)]
        confirm_password: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Edit profile details
    Edit {
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },

    /// Upload a new profile image (JPEG or PNG)
    UploadImage {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Manage notifications
    Notifications {
        #[command(subcommand)]
        command: NotificationCommands,
    },

    /// Like a scream
    Like {
        #[arg(value_name = "SCREAM_ID")]
        scream_id: String,
    },

    /// Remove a like from a scream
    Unlike {
        #[arg(value_name = "SCREAM_ID")]
        scream_id: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum NotificationCommands {
    /// List notifications
    List,
    /// Mark notifications read (all unread when no IDs are given)
    Read {
        #[arg(value_name = "NOTIFICATION_ID")]
        ids: Vec<String>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Save the backend base URL to the config file
    SetUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(&config.log).context("init logging")?;

    interrupt::init()?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli, config).await })
}

async fn dispatch(cli: Cli, config: config::Config) -> Result<()> {
    let Cli { command, base_url } = cli;

    // Config commands never touch the network, so the gateway is built per arm.
    let gateway = || commands::build_gateway(&config, base_url.as_deref());

    match command {
        Commands::Login { email, password } => {
            commands::auth::login(&gateway()?, email, password).await
        }
        Commands::Signup {
            email,
            handle,
            password,
            confirm_password,
        } => {
            commands::auth::signup(&gateway()?, email, handle, password, confirm_password).await
        }
        Commands::Logout => commands::auth::logout(&gateway()?),
        Commands::Whoami => commands::user::whoami(&gateway()?).await,
        Commands::Edit {
            bio,
            website,
            location,
        } => commands::user::edit(&gateway()?, bio, website, location).await,
        Commands::UploadImage { path } => commands::user::upload_image(&gateway()?, &path).await,
        Commands::Notifications { command } => match command {
            NotificationCommands::List => commands::notifications::list(&gateway()?).await,
            NotificationCommands::Read { ids } => {
                commands::notifications::read(&gateway()?, ids).await
            }
        },
        Commands::Like { scream_id } => commands::user::like(&gateway()?, &scream_id).await,
        Commands::Unlike { scream_id } => commands::user::unlike(&gateway()?, &scream_id).await,
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetUrl { url } => commands::config::set_url(&url),
        },
    }
}

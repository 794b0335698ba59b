use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use tracing::info;
use tracing_subscriber::EnvFilter;

use storekeep::auth::{generate_password, hash_password, issue_token};
use storekeep::cli::{
    AdminCommands, AuthCommands, run_admin_page_preference, run_admin_purge, run_admin_seed,
    run_auth_login, run_auth_logout,
};
use storekeep::config::ServerConfig;
use storekeep::server::validation::{validate_password, validate_user_name};
use storekeep::server::{AppState, create_router};
use storekeep::store::{DataStore, SqliteStore};
use storekeep::types::{AccessLevel, User, UserProfile};

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "storekeep")]
#[command(about = "Store and employee management server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Log in to or out of a server
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Start the server
    Serve {
        /// TOML config file; flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

fn prompt_password(name: &str) -> anyhow::Result<String> {
    let password = Password::new(&format!("Password for '{name}':"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_validator(|input: &str| {
            if validate_password(input).is_err() {
                Ok(inquire::validator::Validation::Invalid(
                    "Password must be at least 8 characters".into(),
                ))
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;
    Ok(password)
}

fn run_init(
    data_dir: PathBuf,
    name: String,
    password: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    validate_user_name(&name).map_err(|e| anyhow::anyhow!(e.message))?;
    if let Some(password) = &password {
        validate_password(password).map_err(|e| anyhow::anyhow!(e.message))?;
    }

    fs::create_dir_all(&data_dir)?;

    let config = ServerConfig {
        data_dir,
        ..ServerConfig::default()
    };
    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    let token_file = config.admin_token_path();

    if store.has_admin_user()? {
        bail!(
            "Server already initialized. Admin token exists at: {}",
            token_file.display()
        );
    }

    let (password, generated) = match password {
        Some(p) => (p, false),
        None if non_interactive => (generate_password(), true),
        None => (prompt_password(&name)?, false),
    };

    let admin = User {
        id: 0,
        name: Some(name.clone()),
        password: Some(hash_password(&password)?),
        access_level: AccessLevel::Admin,
    };
    let admin_id = store.create_user(&admin, &UserProfile::new(0))?;

    let (_, raw_token) = issue_token(&store, admin_id, None)?;
    fs::write(&token_file, &raw_token)?;

    #[cfg(unix)]
    set_restrictive_permissions(&token_file);

    println!();
    println!("========================================");
    println!("Created administrator '{name}'");
    if generated {
        println!("Generated password: {password}");
    }
    println!();
    println!("Admin token (save this, it won't be shown again):");
    println!();
    println!("  {raw_token}");
    println!();
    println!("Token also written to: {}", token_file.display());
    println!("========================================");
    println!();

    Ok(())
}

async fn run_serve(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = match &config_path {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(data_dir) = data_dir {
        config.data_dir = data_dir;
    }

    let token_file = config.admin_token_path();
    if !token_file.exists() || !config.db_path().exists() {
        bail!(
            "Server not initialized. Run 'storekeep admin init' first to create the database and admin account."
        );
    }

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;
    if !store.has_admin_user()? {
        bail!(
            "Server not initialized. Run 'storekeep admin init' first to create the database and admin account."
        );
    }

    info!("Admin token available at {}", token_file.display());

    let addr = config.socket_addr()?;
    let state = Arc::new(AppState::new(Arc::new(store), config));
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("storekeep=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                name,
                password,
                non_interactive,
            } => run_init(data_dir, name, password, non_interactive)?,
            AdminCommands::Seed { target, count } => run_admin_seed(&target, count)?,
            AdminCommands::Purge { target, count } => run_admin_purge(&target, count)?,
            AdminCommands::PagePreference { value } => run_admin_page_preference(value)?,
        },
        Commands::Auth { command } => match command {
            AuthCommands::Login {
                server,
                name,
                password,
                non_interactive,
            } => run_auth_login(server, name, password, non_interactive)?,
            AuthCommands::Logout => run_auth_logout()?,
        },
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
        } => {
            // The blocking HTTP client used by the other commands must not run inside a runtime
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(run_serve(config, host, port, data_dir))?;
        }
    }

    Ok(())
}

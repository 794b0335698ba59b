use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Initialize the server (create database, admin user and token)
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Name of the administrator account
        #[arg(long, default_value = "admin")]
        name: String,

        /// Administrator password (prompted or generated when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Generate synthetic rows on the server
    Seed {
        /// Target table (users, stores, storeemployeeroles, storeemployees, storeshifts, chatmessages)
        target: String,

        /// Number of rows to generate
        #[arg(allow_negative_numbers = true)]
        count: i64,
    },

    /// Delete the first rows of a table on the server
    Purge {
        /// Target table (users, stores, storeemployeeroles, storeemployees, storeshifts, chatmessages)
        target: String,

        /// Number of rows to delete
        #[arg(allow_negative_numbers = true)]
        count: i64,
    },

    /// Set the page preference of every user profile
    PagePreference {
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Log in and save credentials
    Login {
        /// Server URL (e.g., http://localhost:8080)
        #[arg(long)]
        server: Option<String>,

        /// Account name
        #[arg(long)]
        name: Option<String>,

        /// Account password
        #[arg(long)]
        password: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Revoke the saved token and remove credentials
    Logout,
}

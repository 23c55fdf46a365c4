// src/cli/mod.rs — CLI definition (clap derive)

pub mod call;
pub mod dashboard;
pub mod env;
pub mod login;
pub mod status;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "selfcare", about = "Mobile subscriber selfcare portal", version)]
pub struct Cli {
    /// Host identifier used to pick the API environment (overrides SELFCARE_HOST and config)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with a mobile number and password
    Login {
        /// Mobile number, e.g. "77 123 4567" (prompted when omitted)
        #[arg(short, long)]
        phone: Option<String>,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Keep the session flagged as remembered
        #[arg(short, long)]
        remember: bool,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show session and environment status (default)
    Status,
    /// Plan, balance, data usage and recent transactions
    Dashboard,
    /// Inspect or pin the API environment
    Env {
        #[command(subcommand)]
        action: Option<EnvAction>,
    },
    /// Call any endpoint by its logical name and print the JSON envelope
    Call {
        /// Logical endpoint name (login, recharge, dataPack, sendOTP, ...)
        endpoint: String,
        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },
}

#[derive(Subcommand, Clone)]
pub enum EnvAction {
    /// Show the active environment and any pinned override
    Show,
    /// Pin PRODUCTION, DEVELOPMENT or MOCK for subsequent runs
    Set {
        /// Profile name
        name: String,
    },
    /// Remove the pinned override
    Clear,
}

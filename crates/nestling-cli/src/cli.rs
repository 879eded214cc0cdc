//! Command-line definition.

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "nestling",
    about = "Terminal client for the Nestling caregiving assistant",
    version
)]
pub struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = "NESTLING_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Signup,
    /// Sign in and store the session
    Login,
    /// Drop the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Chat with the assistant
    Chat(ChatArgs),
    /// List chat sessions
    Sessions(SessionsArgs),
    /// List baby profiles
    Babies,
}

#[derive(Args)]
pub struct ChatArgs {
    /// Baby profile the conversation is about
    #[arg(long)]
    pub baby_id: String,

    /// Continue an existing session
    #[arg(long)]
    pub session_id: Option<String>,
}

#[derive(Args)]
pub struct SessionsArgs {
    /// Only sessions for this baby profile
    #[arg(long)]
    pub baby_id: Option<String>,
}

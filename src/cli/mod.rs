pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "scm")]
#[command(about = "School console - permission-aware navigation and entity lists for the school management API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show the sidebar menu visible to the current role")]
    Menu(commands::nav::MenuArgs),

    #[command(about = "List registered routes or resolve a path")]
    Routes(commands::nav::RoutesArgs),

    #[command(about = "List entity screens available to the current role")]
    Screens(commands::nav::PermissionArgs),

    #[command(about = "Fetch one page of a screen's records")]
    List(commands::records::ListArgs),

    #[command(about = "Show a single record")]
    Show(commands::records::ShowArgs),

    #[command(about = "Delete a record after confirmation")]
    Delete(commands::records::DeleteArgs),

    #[command(about = "Create or update a record from JSON")]
    Save(commands::records::SaveArgs),

    #[command(about = "Record totals for every visible screen")]
    Dashboard,

    #[command(about = "Session storage")]
    Session {
        #[command(subcommand)]
        cmd: commands::session::SessionCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Menu(args) => commands::nav::handle_menu(args, output_format).await,
        Commands::Routes(args) => commands::nav::handle_routes(args, output_format).await,
        Commands::Screens(args) => commands::nav::handle_screens(args, output_format).await,
        Commands::List(args) => commands::records::handle_list(args, output_format).await,
        Commands::Show(args) => commands::records::handle_show(args, output_format).await,
        Commands::Delete(args) => commands::records::handle_delete(args, output_format).await,
        Commands::Save(args) => commands::records::handle_save(args, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(output_format).await,
        Commands::Session { cmd } => commands::session::handle(cmd, output_format).await,
    }
}

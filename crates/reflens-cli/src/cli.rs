use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "reflens",
    about = "reflens: list a repository's references by object",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Repository to list (defaults to the current directory)
    #[arg(long, global = true)]
    pub git_dir: Option<PathBuf>,

    /// Remote name whose own HEAD entry is highlighted
    #[arg(long, global = true)]
    pub remote: Option<String>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List all references in display order
    List(ListArgs),
    /// Show the checked-out branch or detached HEAD
    Head,
    /// Show the references pointing at an object id
    At(AtArgs),
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct AtArgs {
    pub id: String,
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ldpod",
    about = "Linked-data pod storage",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the store, overriding the configuration
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Store resources in this directory instead of memory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a pod for an agent from the template folder
    CreatePod(CreatePodArgs),
    /// Print a resource
    Get(GetArgs),
    /// Write a file to a resource
    Put(PutArgs),
    /// Delete a resource
    Delete(DeleteArgs),
    /// Apply a SPARQL update to a resource
    Patch(PatchArgs),
}

#[derive(Args)]
pub struct CreatePodArgs {
    pub login: String,
    /// WebID of the agent; defaults to the profile card inside the new pod
    #[arg(long)]
    pub web_id: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Args)]
pub struct GetArgs {
    /// Path relative to the base URL, or an absolute URL
    pub path: String,
    /// Accept header value, e.g. `text/turtle`
    #[arg(long)]
    pub accept: Option<String>,
}

#[derive(Args)]
pub struct PutArgs {
    pub path: String,
    pub file: PathBuf,
    /// Content type of the file; guessed from its extension when absent
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub path: String,
}

#[derive(Args)]
pub struct PatchArgs {
    pub path: String,
    pub sparql_file: PathBuf,
}

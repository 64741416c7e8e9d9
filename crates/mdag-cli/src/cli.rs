use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "mdag",
    about = "mdag: patch and inspect a content-addressed Merkle-DAG",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Repository directory
    #[arg(long, global = true, env = "MDAG_REPO", default_value = ".mdag")]
    pub repo: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create, read and patch DAG nodes
    Object(ObjectArgs),
    /// Publish and resolve mutable names
    Name(NameArgs),
}

#[derive(Args)]
pub struct ObjectArgs {
    #[command(subcommand)]
    pub action: ObjectAction,
}

#[derive(Subcommand)]
pub enum ObjectAction {
    /// Store a new node from a template
    New {
        #[arg(value_enum, default_value = "empty")]
        template: TemplateArg,
    },
    /// Show a node's links and data
    Get { reference: String },
    /// Write a node's raw data segment
    Data { reference: String },
    /// List a node's links
    Links { reference: String },
    /// Show a node's sizes
    Stat { reference: String },
    /// Derive a new node from an existing one
    Patch(PatchArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TemplateArg {
    Empty,
    Dir,
}

#[derive(Args)]
pub struct PatchArgs {
    #[command(subcommand)]
    pub action: PatchAction,
}

#[derive(Subcommand)]
pub enum PatchAction {
    /// Append data to the root's data segment
    AppendData {
        root: String,
        /// File to read; stdin when absent or `-`
        data: Option<PathBuf>,
    },
    /// Replace the root's data segment
    SetData {
        root: String,
        /// File to read; stdin when absent or `-`
        data: Option<PathBuf>,
    },
    /// Remove a link from the root
    RmLink { root: String, name: String },
    /// Add a link to the root
    AddLink {
        root: String,
        name: String,
        reference: String,
        /// Create missing intermediate nodes
        #[arg(short = 'p', long)]
        create: bool,
    },
}

#[derive(Args)]
pub struct NameArgs {
    #[command(subcommand)]
    pub action: NameAction,
}

#[derive(Subcommand)]
pub enum NameAction {
    /// Point a key's name at a reference
    Publish {
        reference: String,
        #[arg(short, long, default_value = "self")]
        key: String,
    },
    /// Show what a name points at
    Resolve { name: String },
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "picket")]
#[command(about = "Palisade - guardrail gateway for agent actions", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new config file and starter policy
    Init {
        /// Path for new config file
        #[arg(default_value = "palisade.toml")]
        path: PathBuf,
    },
    /// Evaluate a single action against the policy and exit non-zero on deny
    Check {
        /// Policy file to load (defaults to the configured path)
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Full action as JSON, e.g. '{"tool":"file_reader","parameters":{"path":"/data/public/a.txt"}}'
        #[arg(long, conflicts_with_all = ["tool", "param"])]
        action: Option<String>,

        /// Tool name for the action
        #[arg(long)]
        tool: Option<String>,

        /// Action parameter as key=value (repeatable)
        #[arg(long = "param")]
        param: Vec<String>,
    },
    /// Start the HTTP gateway server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}

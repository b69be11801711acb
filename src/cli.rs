use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "college-directory-mcp")]
#[command(about = "College directory MCP server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve MCP over stdio (the default)
    Serve,
    /// Upload the static dataset to the record store
    Seed {
        /// Rows per insert request
        #[arg(long, default_value_t = crate::source::dataset::SEED_BATCH_SIZE)]
        batch_size: usize,
        /// Pause between batches, in milliseconds (default 500)
        #[arg(long)]
        pause_ms: Option<u64>,
    },
}

// fsgraph/src/config.rs

use clap::Parser;
use std::{path::PathBuf, time::Duration};

use crate::sparql::{DEFAULT_ENDPOINT, DEFAULT_GRAPH};

/// Optional `.env` in the working directory, read before flags/env are resolved.
pub const ENV_FILE: &str = ".env";

/// Render the filesystem graph held in a SPARQL store as a directory tree.
#[derive(Debug, Clone, Parser)]
#[command(name = "fsgraph", version, about)]
pub struct Cli {
    /// SPARQL server base URL (the query goes to `<endpoint>/query`)
    #[arg(long, env = "OXIGRAPH_URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Named graph holding the filesystem triples
    #[arg(long, env = "FSGRAPH_GRAPH", default_value = DEFAULT_GRAPH)]
    pub graph: String,

    /// Access token, sent as `X-Access-Token`
    #[arg(long, env = "ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// HTTP timeout in seconds (0 waits forever)
    #[arg(long, env = "FSGRAPH_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Render a saved SPARQL JSON results document instead of querying
    #[arg(long, value_name = "PATH")]
    pub from_json: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Debug logging (RUST_LOG still wins)
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Load `.env` (best-effort), then parse process args.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(ENV_FILE);
        Self::parse()
    }

    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            s => Some(Duration::from_secs(s)),
        }
    }
}

/* ================================== Tests ================================== */

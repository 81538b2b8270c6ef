//! CLI arguments

use clap::Parser;
use std::path::PathBuf;

/// Send one HTTP request through the apimate pipeline and print the body
#[derive(Parser, Debug)]
#[command(name = "apimate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client profile (YAML or JSON); URL is then relative to its base URL
    #[arg(short, long)]
    pub profile: Option<PathBuf>,

    /// HTTP method
    pub method: String,

    /// Request URL, or endpoint path when a profile is given
    pub url: String,

    /// Extra header as `name:value` (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Raw request body
    #[arg(short, long, conflicts_with = "json")]
    pub data: Option<String>,

    /// JSON request body
    #[arg(long)]
    pub json: Option<String>,

    /// Fetch every page, as `PARAM:HEADER` (e.g. `page:X-Total-Pages`)
    #[arg(long)]
    pub all_pages: Option<String>,

    /// Error status to accept as success (repeatable)
    #[arg(long = "accept")]
    pub accepted: Vec<u16>,

    /// Bearer token
    #[arg(long)]
    pub bearer: Option<String>,

    /// Attempts made on 400 (0 disables retrying)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Do not back off on 429
    #[arg(long)]
    pub no_throttle: bool,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

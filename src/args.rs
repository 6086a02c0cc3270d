use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "site-clone")]
#[command(about = "Clone a website into a rebranded Next.js project")]
#[command(version)]
pub struct Args {
    /// Website to clone (http or https)
    pub url: String,

    /// Brand configuration JSON
    #[arg(short, long)]
    pub brand: PathBuf,

    /// Directory the project is written to
    #[arg(short, long, default_value = "site-clone-output")]
    pub output: PathBuf,

    /// Crawl configuration JSON; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Link depth below the target page
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Maximum pages scraped
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Assets larger than this many bytes are skipped
    #[arg(long)]
    pub max_asset_size: Option<u64>,

    /// Per-navigation timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// WebDriver server URL (WEBDRIVER_URL also works)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Where to look for assets missing from the crawl's asset directory
    #[arg(long)]
    pub asset_fallback_dir: Option<PathBuf>,
}

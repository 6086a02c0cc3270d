use clap::Parser;
use site_clone::{BrandConfig, CloneError, CrawlConfig, SiteClone};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    ::log::info!("Cloning {} into {}", args.url, args.output.display());
    println!("Note: cloning requires a WebDriver server (e.g., ChromeDriver).");
    println!("Set WEBDRIVER_URL if not using the default http://localhost:4444");

    let start_time = std::time::Instant::now();
    match run(args).await {
        Ok(project) => {
            ::log::info!(
                "Wrote {} files to {} in {:.2} seconds",
                project.files.len(),
                project.root.display(),
                start_time.elapsed().as_secs_f64()
            );
        }
        Err(e) => {
            ::log::error!("Clone failed: {}", e);
            eprintln!("{}", e.category().message());
            std::process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<site_clone::GeneratedProject, CloneError> {
    let brand = BrandConfig::from_file(&args.brand)?;
    let mut config = match &args.config {
        Some(path) => CrawlConfig::from_file(path)?,
        None => CrawlConfig::new(&args.url),
    };
    config.target_url = args.url.clone();

    let mut clone = SiteClone::new(&args.url, brand, &args.output).with_config(config);
    if let Some(depth) = args.max_depth {
        clone = clone.with_max_depth(depth);
    }
    if let Some(pages) = args.max_pages {
        clone = clone.with_max_pages(pages);
    }
    if let Some(bytes) = args.max_asset_size {
        clone = clone.with_max_asset_size(bytes);
    }
    if let Some(timeout) = args.timeout_ms {
        clone = clone.with_timeout_ms(timeout);
    }
    if let Some(url) = &args.webdriver_url {
        clone = clone.with_webdriver_url(url);
    }
    if let Some(dir) = &args.asset_fallback_dir {
        clone = clone.with_asset_fallback_dir(dir);
    }

    clone.run().await
}

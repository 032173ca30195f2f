mod cli;
mod utils;
mod progress;

use market_csv_ingest::{Category, CoercionPolicy, ExecutionMode, LoadError, LoadOptions};

/// Main entry point of the application.
///
/// This function orchestrates the entire workflow:
/// 1. Parses command-line arguments.
/// 2. Validates the supplied input paths.
/// 3. Determines the thread pool to use.
/// 4. Loads and normalizes all five CSV files.
/// 5. Prints a summary, or the full dataset as JSON.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Success or an error if any step fails.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("market_csv_ingest=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let total_start = std::time::Instant::now();
    let args = cli::Args::parse();
    if !args.json {
        println!("Start loading...");
    }

    let files = utils::input_files([
        (Category::Stock, args.stock.as_ref()),
        (Category::Sector, args.sector.as_ref()),
        (Category::Peer, args.peer.as_ref()),
        (Category::Index, args.index.as_ref()),
        (Category::SectorIndex, args.sector_index.as_ref()),
    ])?;

    let options = LoadOptions {
        policy: if args.strict { CoercionPolicy::Strict } else { CoercionPolicy::FallbackToZero },
        mode: if args.sequential { ExecutionMode::Sequential } else { ExecutionMode::Parallel },
    };

    let result = if let Some(n) = args.threads {
        let local_pool = utils::configure_thread_pool(n)?;
        if !args.json {
            println!("🚀 Using {} thread(s)", local_pool.current_num_threads());
        }
        local_pool.install(|| progress::load_files(&files, options))
    } else {
        progress::load_files(&files, options)
    };

    let dataset = match result {
        Ok(dataset) => dataset,
        Err(LoadError::MissingInput { categories }) => {
            for category in &categories {
                eprintln!("❌ {}: File required", category);
            }
            return Err(anyhow::anyhow!("{} required file(s) missing", categories.len()));
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&dataset)?);
    } else {
        utils::print_summary(&dataset);
        println!(
            "✅ Loading completed in {:?} seconds",
            total_start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}

use market_csv_ingest::{AggregateDataset, Category, InputFiles};

/// Configures a custom Rayon thread pool with specified size.
///
/// The requested size is clamped to the number of available CPUs.
///
/// # Arguments
/// * `num_threads` - Desired number of threads for the pool.
///
/// # Returns
/// * `Result<ThreadPool>` - Created thread pool or an error if creation fails.
pub fn configure_thread_pool(num_threads: usize) -> anyhow::Result<rayon::ThreadPool> {
    if num_threads == 0 {
        return Err(anyhow::anyhow!("Number of threads must be a positive integer"));
    }
    let max_threads = num_cpus::get();
    let effective = if num_threads > max_threads {
        println!("⚠️ Warning: Limiting thread count to {} (max available)", max_threads);
        max_threads
    } else {
        num_threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(effective)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))
}

/// Checks that a supplied input path points to an existing file.
///
/// # Arguments
/// * `path` - Path given on the command line.
///
/// # Returns
/// * `anyhow::Result<()>` - Success, or an error naming the bad path.
pub fn check_path<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(anyhow::anyhow!("Input path does not exist: {}", path.display()));
    }
    if !path.is_file() {
        return Err(anyhow::anyhow!("Input path is not a file: {}", path.display()));
    }
    anyhow::Ok(())
}

/// Builds the input slots from the optional command-line paths.
///
/// Absent paths leave their slot empty; the load reports them.
pub fn input_files(
    pairs: [(Category, Option<&std::path::PathBuf>); 5],
) -> anyhow::Result<InputFiles> {
    let mut files = InputFiles::new();
    for (category, path) in pairs {
        if let Some(path) = path {
            check_path(path)?;
            files.set(category, path.clone());
        }
    }
    anyhow::Ok(files)
}

/// Prints a short human-readable view of a loaded dataset.
///
/// # Example Output
/// ```text
/// 📊 stock: 20, sector: 1, peers: 60, index: 20, sector index: 20
/// 🏢 ICICI Bank Ltd. (ICICIBANK, EQ) - Banks, ISIN INE090A01021
///  - latest: 14-May-2025, close: 1426.20, prev: 1430.60, vol: 8026837, delivery: 71.28%
/// ```
pub fn print_summary(dataset: &AggregateDataset) {
    println!("📊 {}", dataset.summary());

    match &dataset.sector_info {
        Some(info) => println!(
            "🏢 {} ({}, {}) - {}, ISIN {}",
            info.company_name, info.symbol, info.series, info.industry, info.isin_code
        ),
        None => println!("🏢 No sector mapping rows"),
    }

    if let Some(latest) = dataset.latest_stock() {
        println!(
            " - latest: {}, close: {:.2}, prev: {:.2}, vol: {}, delivery: {:.2}%",
            latest.date,
            latest.close_price,
            latest.prev_close,
            latest.total_traded_quantity,
            latest.delivery_pct,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("stock.csv");
        std::fs::write(&file, "Symbol\n").unwrap();

        assert!(check_path(&file).is_ok());
        assert!(check_path(dir.path()).is_err());
        assert!(check_path(dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn test_input_files_leaves_absent_slots_empty() {
        let dir = tempfile::tempdir().unwrap();
        let stock = dir.path().join("stock.csv");
        std::fs::write(&stock, "Symbol\n").unwrap();

        let files = input_files([
            (Category::Stock, Some(&stock)),
            (Category::Sector, None),
            (Category::Peer, None),
            (Category::Index, None),
            (Category::SectorIndex, None),
        ])
        .unwrap();
        assert_eq!(files.missing().len(), 4);
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(configure_thread_pool(0).is_err());
        assert!(configure_thread_pool(1).is_ok());
    }
}

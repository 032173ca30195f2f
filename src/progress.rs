use market_csv_ingest::{AggregateDataset, InputFiles, LoadError, LoadOptions};

/// Runs a load with a progress bar that advances once per finished category.
///
/// # Arguments
/// * `files` - The five input slots.
/// * `options` - Coercion policy and execution mode.
///
/// # Returns
/// * `Result<AggregateDataset, LoadError>` - The loaded dataset or the load failure.
pub fn load_files(files: &InputFiles, options: LoadOptions) -> Result<AggregateDataset, LoadError> {
    let pb = indicatif::ProgressBar::new(market_csv_ingest::Category::ALL.len() as u64);
    if let Ok(style) = indicatif::ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }

    let result = market_csv_ingest::load_with_progress(files, options, &|category| {
        pb.set_message(category.label());
        pb.inc(1);
    });

    match &result {
        Ok(_) => pb.finish_with_message("done"),
        Err(_) => pb.abandon_with_message("failed"),
    }
    result
}

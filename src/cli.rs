/// Structure representing command-line arguments.
#[derive(Debug)]
pub struct Args {
    pub stock: Option<std::path::PathBuf>,
    pub sector: Option<std::path::PathBuf>,
    pub peer: Option<std::path::PathBuf>,
    pub index: Option<std::path::PathBuf>,
    pub sector_index: Option<std::path::PathBuf>,
    pub threads: Option<usize>,
    pub strict: bool,
    pub sequential: bool,
    pub json: bool,
}

/// Command-line arguments parser using Clap.
///
/// The five file arguments are optional at the parser level so that a load
/// with missing files reports every absent category at once.
impl Args {
    /// Parses command-line arguments using `clap`.
    ///
    /// # Returns
    /// * `Args` - Struct containing parsed arguments.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        let path = |id: &str| matches.get_one::<String>(id).map(std::path::PathBuf::from);
        Args {
            stock: path("stock"),
            sector: path("sector"),
            peer: path("peer"),
            index: path("index"),
            sector_index: path("sector-index"),
            threads: matches.get_one::<usize>("threads").cloned(),
            strict: matches.get_flag("strict"),
            sequential: matches.get_flag("sequential"),
            json: matches.get_flag("json"),
        }
    }
}

fn file_arg(id: &'static str, short: char, help: &'static str) -> clap::Arg {
    clap::Arg::new(id)
        .short(short)
        .long(id)
        .help(help)
        .num_args(1)
}

fn command() -> clap::Command {
    clap::Command::new("market-csv-ingest")
        .version("0.1.0")
        .about("Load and normalize the five stock analysis CSV exports")
        .arg(file_arg("stock", 's', "Stock history CSV"))
        .arg(file_arg("sector", 'm', "Sector mapping CSV"))
        .arg(file_arg("peer", 'p', "Peer stocks CSV"))
        .arg(file_arg("index", 'i', "Market index CSV"))
        .arg(file_arg("sector-index", 'x', "Sector index CSV"))
        .arg(
            clap::Arg::new("threads")
            .short('t')
            .long("threads")
            .help("Number of threads to use (default: all available)")
            .num_args(1)
            .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
        )
        .arg(
            clap::Arg::new("strict")
            .long("strict")
            .help("Fail on numeric cells that are absent or not a number instead of using 0")
            .action(clap::ArgAction::SetTrue)
        )
        .arg(
            clap::Arg::new("sequential")
            .long("sequential")
            .help("Process the files one after another instead of in parallel")
            .action(clap::ArgAction::SetTrue)
        )
        .arg(
            clap::Arg::new("json")
            .long("json")
            .help("Print the loaded dataset as JSON")
            .action(clap::ArgAction::SetTrue)
        )
}

/// Validates that the number of threads is a positive integer.
///
/// # Arguments
/// * `s` - String representation of the number of threads.
///
/// # Returns
/// * `Result<usize>` - Validated number of threads.
fn parse_usize_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}

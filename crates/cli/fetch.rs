use chrono::NaiveDate;
use clap::Parser;
use env_logger::{Env, Target};
use fetch::credentials;
use fetch::query::parse_day;
use fetch::{BigQuery, DateRange, FetchRequest};
use std::{error::Error, path::PathBuf};

use log::{error, info};

/// Download PyPI statistics for the tracked packages from BigQuery
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(
        short = 'c',
        long = "credentials",
        value_parser = existing_file,
        help = "path to your google API key, json file"
    )]
    credentials: Option<PathBuf>,

    #[arg(
        short = 'o',
        long = "output",
        help = "output file (defaults to scikit-hep-FROM-TO.csv)"
    )]
    output: Option<PathBuf>,

    #[arg(short = 'f', long = "from", value_parser = parse_day, default_value = "20190531", help = "from date, YYYYMMDD")]
    from: NaiveDate,

    #[arg(short = 't', long = "to", value_parser = parse_day, default_value = "20250101", help = "to date, YYYYMMDD")]
    to: NaiveDate,

    #[arg(long = "project", help = "billing project for the query job")]
    project: Option<String>,

    #[arg(long = "config", default_value = config::DEFAULT_FILENAME, help = "config file")]
    config: PathBuf,
}

fn existing_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("file {} does not exist", s))
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let range = DateRange::new(args.from, args.to)?;
    let conf = config::Config::load(&args.config)?;

    if let Some(path) = &args.credentials {
        credentials::install(path);
    }
    let client = BigQuery::connect(args.project.or(conf.bigquery.project))?;

    let request = FetchRequest {
        table: conf.bigquery.table,
        range,
        packages: conf.packages,
        output: args.output,
    };
    let output = fetch::fetch(&client, &request)?;
    info!("wrote {}", output.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stdout)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

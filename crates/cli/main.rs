use chart::report;
use chart::Settings;
use frame::load::csv_files;
use frame::{Bucket, FilteredTable, LoadOptions};

use clap::{ArgAction, Parser, Subcommand};
use env_logger::{Env, Target};
use std::{error::Error, path::PathBuf};

use log::{error, info};

/// Plot PyPI download statistics
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(
        short = 'f',
        long = "filename",
        help = "files to read in (defaults to all CSVs)"
    )]
    files: Vec<PathBuf>,

    #[arg(short = 'n', long = "name", default_value = "", help = "add prefix to all plots")]
    name: String,

    #[arg(short = 'm', long = "minor", action = ArgAction::SetTrue, help = "use minor version too")]
    minor: bool,

    #[arg(short = 'p', long = "package", help = "select only these packages instead of all")]
    packages: Vec<String>,

    #[arg(
        short = 'x',
        long = "filter-package",
        help = "remove package(s) from package list"
    )]
    filter_packages: Vec<String>,

    #[arg(long = "unique", action = ArgAction::SetTrue, help = "filter based on OS \"uniqueness\"")]
    unique: bool,

    #[arg(
        long = "filter",
        num_args = 2,
        value_names = ["KEY", "VALUE"],
        action = ArgAction::Append,
        help = "keep only rows where KEY equals VALUE"
    )]
    filter: Vec<String>,

    #[arg(long = "config", default_value = config::DEFAULT_FILENAME, help = "config file")]
    config: PathBuf,

    #[command(subcommand)]
    command: PlotCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum PlotCommand {
    /// One stacked chart per package
    Main {
        #[arg(long = "daily", action = ArgAction::SetTrue, help = "plot daily instead of weekly")]
        daily: bool,

        #[arg(short = 'k', long = "key", default_value = "file_version", help = "column to stack over")]
        key: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
        then: Vec<String>,
    },
    /// One stacked chart over all packages
    All {
        #[arg(long = "daily", action = ArgAction::SetTrue, help = "plot daily instead of weekly")]
        daily: bool,

        #[arg(short = 'k', long = "key", default_value = "file_project", help = "column to stack over")]
        key: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
        then: Vec<String>,
    },
    /// Horizontal bar chart of counts per value, one per package
    Freq {
        #[arg(short = 'k', long = "key", default_value = "country_code", help = "column to count")]
        key: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
        then: Vec<String>,
    },
}

/// Parses the commands that follow another one on the command line.
#[derive(Parser, Debug)]
#[command(name = "pypi-plot", no_binary_name = true)]
struct Chained {
    #[command(subcommand)]
    command: PlotCommand,
}

impl PlotCommand {
    fn take_rest(&mut self) -> Vec<String> {
        match self {
            PlotCommand::Main { then, .. }
            | PlotCommand::All { then, .. }
            | PlotCommand::Freq { then, .. } => std::mem::take(then),
        }
    }

    fn run(&self, table: &FilteredTable, settings: &Settings) -> chart::Result<Vec<PathBuf>> {
        match self {
            PlotCommand::Main { daily, key, .. } => {
                report::per_package(table, settings, key, Bucket::from_daily(*daily))
            }
            PlotCommand::All { daily, key, .. } => {
                Ok(report::comparison(table, settings, key, Bucket::from_daily(*daily))?
                    .into_iter()
                    .collect())
            }
            PlotCommand::Freq { key, .. } => report::frequency(table, settings, key),
        }
    }
}

/// Unrolls a command and everything chained after it.
fn chain(first: PlotCommand) -> Result<Vec<PlotCommand>, clap::Error> {
    let mut commands = vec![];
    let mut next = Some(first);
    while let Some(mut command) = next.take() {
        let rest = command.take_rest();
        if !rest.is_empty() {
            next = Some(Chained::try_parse_from(rest)?.command);
        }
        commands.push(command);
    }
    Ok(commands)
}

fn filters(values: &[String]) -> Vec<(String, String)> {
    values
        .chunks_exact(2)
        .map(|kv| (kv[0].clone(), kv[1].clone()))
        .collect()
}

fn run(args: Args, commands: Vec<PlotCommand>) -> Result<(), Box<dyn Error>> {
    let conf = config::Config::load(&args.config)?;
    let settings = Settings::from_config(&args.name, &conf)?;

    let files = if args.files.is_empty() {
        csv_files(".")?
    } else {
        args.files
    };
    info!(
        "Reading: {}",
        files
            .iter()
            .map(|f| f.display().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let options = LoadOptions {
        minor: args.minor,
        packages: args.packages,
        filter_packages: args.filter_packages,
        unique: args.unique,
        filters: filters(&args.filter),
    };
    let table = FilteredTable::load(&files, &options)?;

    for command in &commands {
        let saved = command.run(&table, &settings)?;
        info!("{} figure(s) written", saved.len());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stdout)
        .init();

    let args = Args::parse();
    let commands = match chain(args.command.clone()) {
        Ok(commands) => commands,
        Err(e) => e.exit(),
    };

    if let Err(e) = run(args, commands) {
        error!("{}", e);
        std::process::exit(1);
    }
}

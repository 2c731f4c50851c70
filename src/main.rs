use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use macropanel::{pipeline, PipelineConfig, Result};

#[derive(Parser, Debug)]
#[command(name = "macropanel", version)]
#[command(about = "Monthly macroeconomic panel builder and forecaster selection", long_about = None)]
struct Args {
    /// Pipeline configuration file
    #[arg(short, long, global = true, default_value = "config/dev.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the combined monthly panel and write it to the processed path
    Process,

    /// Build and persist the panel, difference it and print the first rows
    Features {
        /// Rows to print
        #[arg(short = 'n', long, default_value = "5")]
        rows: usize,
    },

    /// Build and persist the panel, then train and record the selected model
    Train,
}

fn run(args: Args) -> Result<()> {
    let config = PipelineConfig::load(&args.config)?;
    match args.command {
        Command::Process => {
            let combined = pipeline::process(&config)?;
            println!("{}", combined.path.display());
        }
        Command::Features { rows } => {
            let (_, stationary) = pipeline::features(&config)?;
            print!("{}", stationary.head(rows));
        }
        Command::Train => {
            let (combined, run) = pipeline::train(&config)?;
            println!("Panel: {}", combined.path.display());
            println!("Selected model: {}", run.selected_model());
            for (name, value) in run.metrics() {
                println!("{}: {}", name, value);
            }
            println!("Model URI: {}", run.artifact_uri());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            // the direct source is already part of the message
            let mut cause = e.source().and_then(|s| s.source());
            while let Some(err) = cause {
                log::error!("  caused by: {}", err);
                cause = err.source();
            }
            ExitCode::FAILURE
        }
    }
}

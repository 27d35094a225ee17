mod config;
mod console;

use clap::Parser;
use config::ConsoleConfig;
use console::Console;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the config file; created with defaults if missing.
    #[arg(long, default_value = "Config.toml")]
    config: PathBuf,
    /// Execute a single command line and exit.
    #[arg(short, long, value_name = "LINE")]
    execute: Option<String>,
    /// Print completions for a partial command line and exit.
    #[arg(long, value_name = "LINE", conflicts_with = "execute")]
    complete: Option<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let config = ConsoleConfig::load(&args.config)?;

    // Setup logging
    let logfile = tracing_appender::rolling::daily(&config.log_directory, &config.log_file);
    let default_level = if config.trace_dispatch {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var("ONECONFIG_LOG")
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_writer(logfile.and(std::io::stderr))
        .with_env_filter(env_filter)
        .init();

    let console = Console::new(console::build_registry(&config)?, config.prompt.clone());

    if let Some(line) = args.complete {
        for suggestion in console.complete(&line) {
            println!("{}", suggestion);
        }
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(line) = args.execute {
        return Ok(match console.run_line(&line) {
            Ok(reply) => {
                if let Some(reply) = reply {
                    println!("{}", reply);
                }
                ExitCode::SUCCESS
            }
            Err(lines) => {
                for message in lines {
                    eprintln!("{}", message);
                }
                ExitCode::FAILURE
            }
        });
    }

    console.run(std::io::stdin().lock(), std::io::stdout())?;
    Ok(ExitCode::SUCCESS)
}

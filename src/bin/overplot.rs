use std::path::Path;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};

use overplot::io::{build_plotter, load_config, save_series_table};

#[derive(Parser)]
#[command(name = "overplot")]
#[command(
    about = "Overlay plotting front end",
    long_about = "Renders plot session configs (histograms, error-bar graphs) to SVG with \
                  automatic axis ranging, style cycling and legend placement."
)]
struct Cli {
    /// Log verbosity level
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,
    /// Write log output to a file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<String>,
    /// Append to log file instead of truncating
    #[arg(long, global = true)]
    append_log: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render a plot config to SVG
    Render {
        /// Path to a plot config JSON file.
        #[arg(long, required = true)]
        input: String,
        /// Override the output base name from the config. The file is named `<out>.svg`.
        #[arg(long)]
        out: Option<String>,
        /// Draw the y axis in logarithmic scale, overriding the config.
        #[arg(long)]
        log_y: bool,
        /// Append the render date to the legend notes.
        #[arg(long)]
        date_note: bool,
        /// Force overwrite of existing output files.
        #[arg(short, long)]
        force: bool,
    },
    /// Dump every series of a plot config as tab separated tables
    Table {
        /// Path to a plot config JSON file.
        #[arg(long, required = true)]
        input: String,
        /// Prefix for output files, named `<prefix>.<series>.tsv`.
        #[arg(long, required = true)]
        out_prefix: String,
        /// Force overwrite of existing output files.
        #[arg(short, long)]
        force: bool,
    },
}

// Helper to check output paths and create directories
fn check_output_paths(
    prefix: &str,
    suffixes: &[&str],
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(prefix);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating output directory: {:?}", parent);
            std::fs::create_dir_all(parent)?;
        }
    }

    if !force {
        for suffix in suffixes {
            let p = format!("{}{}", prefix, suffix);
            if Path::new(&p).exists() {
                return Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("Output file {} already exists. Use --force to overwrite.", p),
                )));
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let mut log_builder = env_logger::Builder::from_default_env();
    log_builder
        .filter_level(cli.log_level.to_level_filter())
        .format_module_path(false);
    if let Some(ref path) = cli.log_file {
        let file = if cli.append_log {
            std::fs::File::options().create(true).append(true).open(path)
        } else {
            std::fs::File::create(path)
        }
        .unwrap_or_else(|e| panic!("Could not open log file '{}': {}", path, e));
        log_builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    log_builder.init();

    match &cli.command {
        Commands::Render {
            input,
            out,
            log_y,
            date_note,
            force,
        } => {
            let config = match load_config(input) {
                Ok(c) => c,
                Err(e) => {
                    error!("{}", e);
                    return;
                }
            };

            let mut plotter = match build_plotter(&config) {
                Ok(p) => p,
                Err(e) => {
                    error!("{}", e);
                    return;
                }
            };
            if let Some(name) = out {
                plotter.set_out_name(name.as_str());
            }
            if *log_y {
                plotter.set_log_y(true);
            }
            if *date_note {
                plotter.add_date_note();
            }

            if let Err(e) = check_output_paths(plotter.out_name(), &[".svg"], *force) {
                error!("{}", e);
                return;
            }

            match plotter.save() {
                Ok(path) => info!(
                    "Rendered {} series to {}",
                    plotter.overlay().len(),
                    path.display()
                ),
                Err(e) => error!("Error rendering plot: {}", e),
            }
        }
        Commands::Table {
            input,
            out_prefix,
            force,
        } => {
            let config = match load_config(input) {
                Ok(c) => c,
                Err(e) => {
                    error!("{}", e);
                    return;
                }
            };
            let plotter = match build_plotter(&config) {
                Ok(p) => p,
                Err(e) => {
                    error!("{}", e);
                    return;
                }
            };

            let suffixes: Vec<String> = config
                .series
                .iter()
                .map(|s| format!(".{}.tsv", s.name))
                .collect();
            let suffix_refs: Vec<&str> = suffixes.iter().map(|s| s.as_str()).collect();
            if let Err(e) = check_output_paths(out_prefix, &suffix_refs, *force) {
                error!("{}", e);
                return;
            }

            for (i, series_config) in config.series.iter().enumerate() {
                let Some(entry) = plotter.overlay().get(i) else {
                    continue;
                };
                let path = format!("{}.{}.tsv", out_prefix, series_config.name);
                if let Err(e) = save_series_table(entry.series(), &path) {
                    error!("Error writing table {}: {}", path, e);
                    return;
                }
            }
            info!("Wrote {} series tables", config.series.len());
        }
    }
}

//! `mdfetch`: fetch a page through a local browser and print it as Markdown,
//! or serve the same pipeline over HTTP.

mod commands;

use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use mdfetch_engine::{CleaningOptions, EngineConfig};
use mdfetch_logging::LogDestination;

#[derive(Debug, Parser)]
#[command(
    name = "mdfetch",
    about = "Fetch web pages through a local browser and convert them to Markdown",
    version
)]
struct Cli {
    /// RON configuration file
    #[arg(long, global = true, env = "MDFETCH_CONFIG")]
    config: Option<PathBuf>,

    /// Log engine activity to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Also write the log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch one URL and print the rendered content
    Fetch(FetchArgs),
    /// Run the HTTP API
    Serve(ServeArgs),
    /// List known backends and whether they are installed
    Backends,
}

#[derive(Debug, Args)]
struct FetchArgs {
    /// URL to fetch; https:// is assumed when no scheme is given
    url: String,

    /// Backend to use (chrome, firefox, links, lynx, w3m, curl, http)
    #[arg(long)]
    browser: Option<String>,

    /// Also save the document, with front matter, into this directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[command(flatten)]
    keep: KeepFlags,
}

/// Page zones to keep instead of stripping. Only ever widens the config.
#[derive(Debug, Clone, Copy, Default, Args)]
struct KeepFlags {
    #[arg(long)]
    keep_header: bool,
    #[arg(long)]
    keep_footer: bool,
    #[arg(long)]
    keep_nav: bool,
    #[arg(long)]
    keep_styles: bool,
    #[arg(long)]
    keep_comments: bool,
}

impl KeepFlags {
    fn apply(self, cleaning: &mut CleaningOptions) {
        cleaning.keep_header |= self.keep_header;
        cleaning.keep_footer |= self.keep_footer;
        cleaning.keep_nav |= self.keep_nav;
        cleaning.keep_styles |= self.keep_styles;
        cleaning.keep_comments |= self.keep_comments;
    }
}

#[derive(Debug, Args)]
struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    #[arg(long, default_value_t = 8080)]
    port: u16,

    #[command(flatten)]
    keep: KeepFlags,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.clone());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = EngineConfig::load_or_default(cli.config.as_deref())?;
    match cli.command {
        Command::Fetch(args) => {
            args.keep.apply(&mut config.cleaning);
            commands::fetch(&config, &args.url, args.browser.as_deref(), args.output_dir)
        }
        Command::Serve(args) => {
            args.keep.apply(&mut config.cleaning);
            commands::serve(&config, (args.host, args.port).into())
        }
        Command::Backends => commands::backends(&config),
    }
}

fn init_logging(verbose: bool, log_file: Option<PathBuf>) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let destination = match log_file {
        Some(path) if verbose => LogDestination::Both(path),
        Some(path) => LogDestination::File(path),
        None => LogDestination::Terminal,
    };
    mdfetch_logging::initialize(destination, level);
}

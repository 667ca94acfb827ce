//! packmux CLI - one interface over every package format

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use packmux::core::ProjectError;
use packmux::ops::OpsError;
use packmux::packmanager::PackManagerError;
use packmux::util::diagnostic::{emit, Diagnostic};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let default_filter = if cli.verbose {
        "packmux=trace"
    } else {
        "packmux=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    let session = commands::Session::new(&cli)?;

    // Execute command
    match cli.command {
        Commands::Update(args) => commands::update::execute(&session, args),
        Commands::Source(args) => commands::source::execute(&session, args),
        Commands::Catalog(args) => commands::catalog::execute(&session, args),
        Commands::Pack(args) => commands::pack::execute(&session, args),
        Commands::Unpack(args) => commands::unpack::execute(&session, args),
        Commands::Detect(args) => commands::detect::execute(&session, args),
        Commands::Formats => commands::formats::execute(&session),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print `err`, as a diagnostic when it carries a known error type.
fn report(err: &anyhow::Error, color: bool) {
    let mut outer = Vec::new();
    let mut diagnostic: Option<Diagnostic> = None;

    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<PackManagerError>() {
            diagnostic = Some(e.to_diagnostic());
            break;
        }
        if let Some(e) = cause.downcast_ref::<OpsError>() {
            diagnostic = Some(e.to_diagnostic());
            break;
        }
        if let Some(e) = cause.downcast_ref::<ProjectError>() {
            diagnostic = Some(e.to_diagnostic());
            break;
        }
        outer.push(cause.to_string());
    }

    match diagnostic {
        Some(diag) => {
            let diag = outer.into_iter().fold(diag, |d, c| d.with_context(c));
            emit(&diag, color);
        }
        None => eprintln!("error: {:#}", err),
    }
}

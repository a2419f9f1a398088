//! podlink CLI

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use miette::GraphicalReportHandler;
use tracing_subscriber::EnvFilter;

use podlink::ops::IntegrateError;
use podlink::util::diagnostic::{Diagnostic, ManifestParseError};
use podlink::util::shell::ColorChoice;
use podlink::util::{GlobalContext, Shell};

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("podlink=debug")
    } else if cli.quiet || cli.message_format == MessageFormat::Json {
        EnvFilter::new("podlink=warn")
    } else {
        EnvFilter::new("podlink=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = Arc::new(make_shell(&cli));
    if let Err(e) = run(cli, &shell) {
        report_error(&e, &shell);
        std::process::exit(1);
    }
}

fn make_shell(cli: &Cli) -> Shell {
    let color = if cli.no_color {
        ColorChoice::Never
    } else {
        GlobalContext::new()
            .ok()
            .and_then(|ctx| ctx.load_config(cli.manifest.as_deref()).color())
            .unwrap_or(ColorChoice::Auto)
    };
    Shell::from_flags(
        cli.quiet,
        cli.verbose,
        color,
        cli.message_format == MessageFormat::Json,
    )
}

fn run(cli: Cli, shell: &Arc<Shell>) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let manifest = ctx.manifest_path(cli.manifest.as_deref())?;
    let config = ctx.load_config(Some(&manifest));

    match cli.command {
        Commands::Integrate(args) => commands::integrate::execute(args, &manifest, &config, shell),
        Commands::Check(args) => commands::check::execute(args, &manifest, &config, shell),
    }
}

fn report_error(err: &anyhow::Error, shell: &Shell) {
    let mut diagnostic = Diagnostic::error(format!("{:#}", err));
    if let Some(integrate) = err.downcast_ref::<IntegrateError>() {
        for suggestion in integrate.to_diagnostic().suggestions {
            diagnostic = diagnostic.with_suggestion(suggestion);
        }
    }
    shell.diagnostic(&diagnostic);

    if shell.is_json() {
        return;
    }
    if let Some(parse) = err.downcast_ref::<ManifestParseError>() {
        let mut rendered = String::new();
        if GraphicalReportHandler::new()
            .render_report(&mut rendered, parse)
            .is_ok()
        {
            eprintln!("{}", rendered);
        }
    }
}

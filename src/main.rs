//! themecheck CLI binary entry point.
//! Resolves options, runs the checker and prints the report.

use clap::Parser;
use std::io;
use themecheck::checker::{self, Scanner};
use themecheck::cli::Cli;
use themecheck::config;
use themecheck::format::CatalogFormatter;
use themecheck::output::Palette;
use themecheck::{report, utils};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().unwrap_or_else(|_| ".".into());
    let eff = match config::resolve_effective(&cli.switches(), &cwd) {
        Ok(eff) => eff,
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            std::process::exit(2);
        }
    };
    if let Some(p) = eff.config_path.as_ref() {
        tracing::debug!(config = %p.display(), "loaded config file");
    }

    let scanner = match Scanner::builtin() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            std::process::exit(2);
        }
    };

    let result = match checker::invoke(&scanner, &cli.path, cli.zip, &eff.check).await {
        Ok(r) => r,
        Err(e) => {
            if let checker::InvokeError::ZipHint { path } = &e {
                tracing::debug!(path = %path.display(), "directory mode given a non-directory");
            }
            println!("{e}");
            std::process::exit(2);
        }
    };

    let palette = Palette::detect(eff.output);
    let code = report::render(
        &CatalogFormatter,
        result,
        &eff.check,
        eff.output,
        &palette,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    );
    match code {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} failed to write report: {}", utils::error_prefix(), e);
            std::process::exit(2);
        }
    }
}

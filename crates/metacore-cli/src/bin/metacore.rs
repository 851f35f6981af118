#![allow(clippy::print_stderr)]

use anyhow::Result;
use clap::Parser;
use std::io::Write;

use metacore_cli::args::CliArgs;
use metacore_cli::driver::{self, Outcome};
use metacore_cli::tracing_config;

const EXIT_TRANSLATION_FAILED: i32 = 1;

fn main() -> Result<()> {
    // Only active with METACORE_LOG or RUST_LOG set
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    if args.no_color {
        colored::control::set_override(false);
    }

    match driver::run(&args)? {
        Outcome::Translated { dump } => {
            if let Some(dump) = dump {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{dump}")?;
            }
            Ok(())
        }
        Outcome::Failed(diagnostic) => {
            eprintln!("{}", driver::report(&args, &diagnostic)?);
            std::process::exit(EXIT_TRANSLATION_FAILED);
        }
    }
}

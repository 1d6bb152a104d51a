use std::io::{self, BufRead};
use std::process::ExitCode;

use bindexpr::cli;
use bindexpr::config;
use bindexpr::{Cache, Context, ParseError};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("bindexpr: {e}");
            eprintln!("Usage: bindexpr [-f[<file>]] [-v<name>=<value>]... [-td] [--] [<source>...]");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(args.debug);

    let ctx = match config::build_context(&args) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("bindexpr: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut cache = Cache::new();
    let mut failed = false;

    if args.sources.is_empty() {
        // Batch mode: one source per line.
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("bindexpr: stdin: {e}");
                    return ExitCode::FAILURE;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            failed |= !run_source(&mut cache, &line, args.template, &ctx);
        }
    } else {
        for source in &args.sources {
            failed |= !run_source(&mut cache, source, args.template, &ctx);
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Evaluate one source and print the result. Returns `false` on a parse error.
fn run_source(cache: &mut Cache, source: &str, template: bool, ctx: &Context) -> bool {
    match render(cache, source, template, ctx) {
        Ok(out) => {
            println!("{out}");
            true
        }
        Err(e) => {
            eprintln!("bindexpr: {e}");
            false
        }
    }
}

fn render(
    cache: &mut Cache,
    source: &str,
    template: bool,
    ctx: &Context,
) -> Result<String, ParseError> {
    if template {
        Ok(cache.template(source)?.render(ctx))
    } else {
        Ok(cache.expression(source)?.eval(ctx).to_string())
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise `-d` enables this crate's
/// debug events and everything else stays at `warn`.
fn init_tracing(debug: bool) {
    let default = if debug { "warn,bindexpr=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

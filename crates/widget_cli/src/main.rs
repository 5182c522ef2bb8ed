use clap::Parser;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use time::PrimitiveDateTime;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use widget_cli::cli::{Cli, Command, UPDATE_METHOD, collect_overrides, parse_now};
use widget_core::config::{self, Config};
use widget_core::error::AppError;
use widget_core::refresh::{self, RefreshOutcome};
use widget_core::render::{FileRenderer, NoopRenderer, Renderer, TerminalRenderer};
use widget_core::summary::Summary;

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

fn load_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        tracing::warn!(error = %err, "using default configuration");
    }
    let overrides = collect_overrides(raw_overrides)?;
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn resolve_now(raw: Option<&str>) -> Result<PrimitiveDateTime, AppError> {
    match raw {
        Some(value) => parse_now(value),
        None => Ok(refresh::local_now()),
    }
}

fn build_renderer(config: &Config, out_dir: Option<&Path>, json: bool) -> Box<dyn Renderer> {
    match out_dir {
        Some(dir) => Box::new(FileRenderer::new(dir)),
        None if json => Box::new(NoopRenderer),
        None => Box::new(TerminalRenderer::new(config::palette_for_theme(
            config.theme.as_deref(),
        ))),
    }
}

fn print_summary_plain(summary: &Summary) {
    let lines = summary.lines();
    println!("{}", lines.pending_count);
    println!("{}", lines.task_title);
    println!("{}", lines.task_time);
}

fn print_summary_json(summary: &Summary) {
    let json = serde_json::json!({
        "state": summary.state,
        "pending_count": summary.pending_count,
        "next_task": summary.next_task,
        "lines": summary.lines(),
    });
    println!("{}", json);
}

fn print_refresh_json(outcome: &RefreshOutcome) {
    let failures: Vec<_> = outcome
        .failures
        .iter()
        .map(|failure| {
            serde_json::json!({
                "surface": failure.surface,
                "error": failure.error.to_string(),
            })
        })
        .collect();
    let json = serde_json::json!({
        "state": outcome.summary.state,
        "lines": outcome.summary.lines(),
        "rendered": outcome.rendered,
        "failures": failures,
    });
    println!("{}", json);
}

fn refresh_once(
    config: &Config,
    surfaces: &[String],
    renderer: &dyn Renderer,
    now: PrimitiveDateTime,
) -> RefreshOutcome {
    let outcome = refresh::refresh_surfaces(&config.store_key, surfaces, renderer, now);
    for failure in &outcome.failures {
        eprintln!("ERROR: {}: {}", failure.surface, failure.error);
    }
    outcome
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli.config_override)?;

    match cli.command {
        Command::Summary { now } => {
            let now = resolve_now(now.as_deref())?;
            let summary = refresh::current_summary(&config.store_key, now);
            if cli.json {
                print_summary_json(&summary);
            } else {
                print_summary_plain(&summary);
            }
        }
        Command::Refresh {
            surfaces,
            out_dir,
            now,
        } => {
            let now = resolve_now(now.as_deref())?;
            let surfaces = if surfaces.is_empty() {
                config.surfaces.clone()
            } else {
                surfaces
            };
            // JSON on stdout replaces terminal painting, so nothing is rendered.
            let targets: &[String] = if cli.json && out_dir.is_none() {
                &[]
            } else {
                &surfaces
            };
            let renderer = build_renderer(&config, out_dir.as_deref(), cli.json);
            let outcome = refresh_once(&config, targets, renderer.as_ref(), now);
            if cli.json {
                print_refresh_json(&outcome);
            }
            if !outcome.failures.is_empty() {
                return Err(AppError::io(format!(
                    "{} surface(s) failed to render",
                    outcome.failures.len()
                )));
            }
        }
        Command::Listen { out_dir } => {
            run_listen(&config, out_dir)?;
        }
    }

    Ok(())
}

fn run_listen(config: &Config, out_dir: Option<PathBuf>) -> Result<(), AppError> {
    let renderer = build_renderer(config, out_dir.as_deref(), false);
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let method = input.trim();
        if method.is_empty() {
            continue;
        }

        if method.eq_ignore_ascii_case("exit") || method.eq_ignore_ascii_case("quit") {
            break;
        }

        if method != UPDATE_METHOD {
            println!("not_implemented: {method}");
            continue;
        }

        let outcome = refresh_once(
            config,
            &config.surfaces,
            renderer.as_ref(),
            refresh::local_now(),
        );
        if outcome.failures.is_empty() {
            println!("ok");
        } else {
            println!("error: {} surface(s) failed to render", outcome.failures.len());
        }
    }

    Ok(())
}

fn main() {
    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        init_tracing(false);
        let result = load_config(&[]).and_then(|config| run_listen(&config, None));
        if let Err(err) = result {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };
    init_tracing(cli.verbose);

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}

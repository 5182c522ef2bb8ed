use clap::{Parser, Subcommand};
use std::path::PathBuf;
use time::PrimitiveDateTime;
use time::macros::format_description;
use widget_core::config::{ConfigOverrides, canonical_key};
use widget_core::error::AppError;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compute and render the to-do widget summary", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the summary of the stored tasks
    ///
    /// Example: widget_cli summary
    /// Example: widget_cli summary --now "2030-01-01 09:00"
    Summary {
        /// Evaluate against this time instead of the local clock
        #[arg(long, value_name = "DATETIME")]
        now: Option<String>,
    },
    /// Recompute the summary and render it on display surfaces
    ///
    /// Example: widget_cli refresh
    /// Example: widget_cli refresh home lock --out-dir ./surfaces
    Refresh {
        /// Surfaces to render (defaults to the configured surfaces)
        surfaces: Vec<String>,
        /// Write one JSON file per surface into this directory
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
        /// Evaluate against this time instead of the local clock
        #[arg(long, value_name = "DATETIME")]
        now: Option<String>,
    },
    /// Serve refresh requests read line by line from stdin
    ///
    /// Example: echo updateWidget | widget_cli listen
    Listen {
        /// Write one JSON file per surface into this directory
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
}

/// Method name that triggers a refresh on the listen channel.
pub const UPDATE_METHOD: &str = "updateWidget";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    StoreKey,
    Surfaces,
    Theme,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let field =
        canonical_key(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;
    let target = match field.as_str() {
        "store_key" | "key" => ConfigOverrideTarget::StoreKey,
        "surfaces" | "surface" => ConfigOverrideTarget::Surfaces,
        "theme" => ConfigOverrideTarget::Theme,
        other => return Err(format!("unknown config field '{other}'")),
    };

    let value = value_raw.trim().to_string();
    if value.is_empty() && target == ConfigOverrideTarget::StoreKey {
        return Err("store_key override cannot be empty".to_string());
    }

    Ok(ParsedConfigOverride { target, value })
}

pub fn collect_overrides(raw_overrides: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();

    for raw in raw_overrides {
        let parsed = parse_config_override(raw).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::StoreKey => overrides.store_key = Some(parsed.value),
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Surfaces => {
                let surfaces = parsed
                    .value
                    .split(',')
                    .map(str::trim)
                    .filter(|surface| !surface.is_empty())
                    .map(str::to_string)
                    .collect();
                overrides.surfaces = Some(surfaces);
            }
        }
    }

    Ok(overrides)
}

/// Accepts `YYYY-MM-DDTHH:mm:ss` or `YYYY-MM-DD HH:mm`.
pub fn parse_now(raw: &str) -> Result<PrimitiveDateTime, AppError> {
    let trimmed = raw.trim();
    PrimitiveDateTime::parse(
        trimmed,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            trimmed,
            format_description!("[year]-[month]-[day] [hour]:[minute]"),
        )
    })
    .map_err(|_| AppError::invalid_input(format!("invalid datetime '{trimmed}'")))
}

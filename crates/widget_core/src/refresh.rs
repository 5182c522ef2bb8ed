use crate::error::AppError;
use crate::render::Renderer;
use crate::storage::prefs_store;
use crate::summary::{Summary, summarize_blob};
use std::path::Path;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

#[derive(Debug)]
pub struct RefreshOutcome {
    pub summary: Summary,
    pub rendered: Vec<String>,
    pub failures: Vec<RefreshFailure>,
}

#[derive(Debug)]
pub struct RefreshFailure {
    pub surface: String,
    pub error: AppError,
}

/// Local wall-clock time, or UTC when the local offset cannot be determined.
pub fn local_now() -> PrimitiveDateTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let now = OffsetDateTime::now_utc().to_offset(offset);
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Summary of whatever is currently stored under `store_key`.
pub fn current_summary(store_key: &str, now: PrimitiveDateTime) -> Summary {
    match prefs_store::prefs_path() {
        Ok(path) => summary_with_path(&path, store_key, now),
        Err(err) => {
            tracing::warn!(error = %err, "preferences path could not be resolved");
            Summary::error()
        }
    }
}

/// Recompute once and render the same lines onto every surface.
pub fn refresh_surfaces(
    store_key: &str,
    surfaces: &[String],
    renderer: &dyn Renderer,
    now: PrimitiveDateTime,
) -> RefreshOutcome {
    match prefs_store::prefs_path() {
        Ok(path) => refresh_surfaces_with_path(&path, store_key, surfaces, renderer, now),
        Err(err) => {
            tracing::warn!(error = %err, "preferences path could not be resolved");
            render_all(Summary::error(), surfaces, renderer)
        }
    }
}

fn summary_with_path(path: &Path, store_key: &str, now: PrimitiveDateTime) -> Summary {
    match prefs_store::load_blob(path, store_key) {
        Ok(blob) => summarize_blob(blob.as_deref(), now),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "task blob could not be loaded");
            Summary::error()
        }
    }
}

fn refresh_surfaces_with_path(
    path: &Path,
    store_key: &str,
    surfaces: &[String],
    renderer: &dyn Renderer,
    now: PrimitiveDateTime,
) -> RefreshOutcome {
    let summary = summary_with_path(path, store_key, now);
    render_all(summary, surfaces, renderer)
}

fn render_all(summary: Summary, surfaces: &[String], renderer: &dyn Renderer) -> RefreshOutcome {
    let lines = summary.lines();
    let mut rendered = Vec::new();
    let mut failures = Vec::new();

    for surface in surfaces {
        match renderer.render(surface, &lines) {
            Ok(()) => {
                tracing::debug!(surface = %surface, state = ?summary.state, "surface rendered");
                rendered.push(surface.clone());
            }
            Err(error) => failures.push(RefreshFailure {
                surface: surface.clone(),
                error,
            }),
        }
    }

    RefreshOutcome {
        summary,
        rendered,
        failures,
    }
}

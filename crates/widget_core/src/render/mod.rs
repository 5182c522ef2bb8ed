use crate::error::AppError;
use crate::summary::DisplayLines;

mod file;
mod terminal;

pub use file::FileRenderer;
pub use terminal::TerminalRenderer;

/// Paints the three display strings onto one display-surface instance.
pub trait Renderer {
    fn render(&self, surface: &str, lines: &DisplayLines) -> Result<(), AppError>;
}

pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn render(&self, _surface: &str, _lines: &DisplayLines) -> Result<(), AppError> {
        Ok(())
    }
}

/// Surface ids double as file names, so they must be plain, non-empty names.
pub fn validate_surface_id(surface: &str) -> Result<(), AppError> {
    let trimmed = surface.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("surface id is required"));
    }

    let plain = trimmed
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
        && trimmed != "."
        && trimmed != "..";
    if !plain || trimmed != surface {
        return Err(AppError::invalid_input(format!(
            "invalid surface id '{surface}'"
        )));
    }

    Ok(())
}

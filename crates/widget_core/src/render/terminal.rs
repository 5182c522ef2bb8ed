use crate::config::Palette;
use crate::error::AppError;
use crate::render::Renderer;
use crate::summary::DisplayLines;

pub struct TerminalRenderer {
    palette: Palette,
}

impl TerminalRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn format(&self, surface: &str, lines: &DisplayLines) -> String {
        format!(
            "[{}]\n{}\n{}\n{}",
            surface,
            lines.pending_count,
            self.palette.accentize(&lines.task_title),
            self.palette.mutedize(&lines.task_time)
        )
    }
}

impl Renderer for TerminalRenderer {
    fn render(&self, surface: &str, lines: &DisplayLines) -> Result<(), AppError> {
        println!("{}", self.format(surface, lines));
        Ok(())
    }
}

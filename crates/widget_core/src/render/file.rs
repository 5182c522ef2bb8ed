use crate::error::AppError;
use crate::render::{Renderer, validate_surface_id};
use crate::summary::DisplayLines;
use std::path::{Path, PathBuf};

/// Writes each surface's lines to `<dir>/<surface>.json`.
pub struct FileRenderer {
    dir: PathBuf,
}

impl FileRenderer {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn surface_path(&self, surface: &str) -> Result<PathBuf, AppError> {
        validate_surface_id(surface)?;
        Ok(self.dir.join(format!("{surface}.json")))
    }
}

impl Renderer for FileRenderer {
    fn render(&self, surface: &str, lines: &DisplayLines) -> Result<(), AppError> {
        let path = self.surface_path(surface)?;
        std::fs::create_dir_all(&self.dir).map_err(|err| AppError::io(err.to_string()))?;

        let content = serde_json::to_string_pretty(lines)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        std::fs::write(&path, content).map_err(|err| AppError::io(err.to_string()))?;
        restrict_permissions(&path)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), AppError> {
    use std::os::unix::fs::PermissionsExt;
    let permissions = std::fs::Permissions::from_mode(0o600);
    std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), AppError> {
    Ok(())
}

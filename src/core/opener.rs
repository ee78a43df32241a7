use std::io;
use std::path::Path;

use super::CoreError;

/// Hands a path to the operating system's default application.
pub fn open_path(path: &Path) -> Result<(), CoreError> {
    if !path.exists() {
        return Err(CoreError::Io(
            io::Error::new(io::ErrorKind::NotFound, "path does not exist"),
            path.to_path_buf(),
        ));
    }

    tracing::info!("Opening {} with the default application", path.display());
    open::that(path).map_err(|e| CoreError::Io(e, path.to_path_buf()))
}

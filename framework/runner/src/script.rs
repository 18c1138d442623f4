use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};

use crate::error::{RunError, RunResult};

/// File name the helper script is saved under, the engine loads it as its processor.
pub const PROCESSOR_FILE_NAME: &str = "processor_file.js";

/// Decode a base64 encoded helper script and save it in `dir`.
///
/// Returns the absolute path of the saved script.
pub fn write_processor_file(dir: &Path, encoded_content: &str) -> RunResult<PathBuf> {
    if encoded_content.trim().is_empty() {
        return Err(RunError::InvalidScript {
            reason: "the control service returned no content".to_string(),
        });
    }

    let content =
        BASE64_STANDARD
            .decode(encoded_content.trim())
            .map_err(|e| RunError::InvalidScript {
                reason: e.to_string(),
            })?;

    let path = std::path::absolute(dir.join(PROCESSOR_FILE_NAME))
        .map_err(|source| RunError::PersistScript {
            path: dir.join(PROCESSOR_FILE_NAME),
            source,
        })?;
    std::fs::write(&path, content).map_err(|source| RunError::PersistScript {
        path: path.clone(),
        source,
    })?;

    log::info!("Saved helper script to {}", path.display());
    Ok(path)
}

//! Optional check of generated files with an installed `protoc`.

use crate::error::{ConvertError, Result};
use std::path::Path;
use std::process::Command;

#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

/// Compile a schema file with `protoc`, discarding the output.
///
/// # Errors
///
/// Returns `Protoc` when the compiler is not installed or rejects the file.
pub fn check_with_protoc(proto_path: &Path) -> Result<()> {
    let dir = proto_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file = proto_path
        .file_name()
        .ok_or_else(|| ConvertError::Protoc(format!("not a file: {}", proto_path.display())))?;

    let output = Command::new("protoc")
        .arg(format!("--proto_path={}", dir.display()))
        .arg(format!("--descriptor_set_out={NULL_DEVICE}"))
        .arg(file)
        .output()
        .map_err(|e| ConvertError::Protoc(format!("could not run protoc: {e}")))?;

    if output.status.success() {
        tracing::debug!(path = %proto_path.display(), "protoc accepted file");
        Ok(())
    } else {
        Err(ConvertError::Protoc(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_path_is_rejected() {
        let err = check_with_protoc(Path::new("/")).unwrap_err();
        assert!(matches!(err, ConvertError::Protoc(msg) if msg.starts_with("not a file")));
    }
}

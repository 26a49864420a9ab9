use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between different
/// types of failures and successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - the SBOM was produced
    Success = 0,
    /// The input matched no known lockfile grammar
    UnsupportedLockfile = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (file I/O error, malformed document, usage error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Picks the exit code for an error that reached `main`.
    ///
    /// A detection failure anywhere in the error chain maps to
    /// `UnsupportedLockfile`; everything else is an application error.
    pub fn for_error(error: &anyhow::Error) -> Self {
        let is_detection = error.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<LockfileError>(),
                Some(LockfileError::Detection { .. })
            )
        });

        if is_detection {
            ExitCode::UnsupportedLockfile
        } else {
            ExitCode::ApplicationError
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::UnsupportedLockfile => write!(f, "Unsupported Lockfile (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Errors raised by the lockfile core (detection, parsing, set queries).
///
/// Detection and document-level parse failures always propagate. A single
/// malformed package entry inside an otherwise valid document never becomes
/// one of these; it is skipped.
#[derive(Debug, Error)]
pub enum LockfileError {
    /// The content matched none of the supported lockfile grammars.
    #[error("Unable to detect lockfile type{}: {reason}", display_path(.path))]
    Detection {
        path: Option<PathBuf>,
        reason: String,
    },

    /// The document is not structurally valid for its format.
    #[error("Failed to parse {format} lockfile: {details}")]
    Parse { format: String, details: String },

    /// An operation was invoked with inputs it cannot accept.
    #[error("Invalid usage: {message}")]
    Usage { message: String },
}

impl LockfileError {
    pub fn detection(path: Option<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Detection {
            path,
            reason: reason.into(),
        }
    }

    pub fn parse(format: impl fmt::Display, details: impl Into<String>) -> Self {
        Self::Parse {
            format: format.to_string(),
            details: details.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" for {}", path.display()),
        None => String::new(),
    }
}

/// Application-specific errors for SBOM generation.
///
/// Uses thiserror to derive Display and Error traits automatically,
/// reducing boilerplate while maintaining user-friendly error messages.
#[derive(Debug, Error)]
pub enum SbomError {
    #[error("Lockfile not found: {path}\n\n💡 Hint: {suggestion}")]
    LockfileNotFound { path: PathBuf, suggestion: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    /// Validation error for configuration and request values
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    // ExitCode tests
    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::UnsupportedLockfile.as_i32(), 1);
        assert_eq!(ExitCode::InvalidArguments.as_i32(), 2);
        assert_eq!(ExitCode::ApplicationError.as_i32(), 3);
    }

    #[test]
    fn test_exit_code_display() {
        assert_eq!(format!("{}", ExitCode::Success), "Success (0)");
        assert_eq!(
            format!("{}", ExitCode::UnsupportedLockfile),
            "Unsupported Lockfile (1)"
        );
        assert_eq!(
            format!("{}", ExitCode::InvalidArguments),
            "Invalid Arguments (2)"
        );
        assert_eq!(
            format!("{}", ExitCode::ApplicationError),
            "Application Error (3)"
        );
    }

    #[test]
    fn test_exit_code_for_detection_error() {
        let error: anyhow::Error = LockfileError::detection(None, "no grammar matched").into();
        assert_eq!(ExitCode::for_error(&error), ExitCode::UnsupportedLockfile);
    }

    #[test]
    fn test_exit_code_for_wrapped_detection_error() {
        let error = anyhow::Error::from(LockfileError::detection(None, "no grammar matched"))
            .context("while loading lockfile");
        assert_eq!(ExitCode::for_error(&error), ExitCode::UnsupportedLockfile);
    }

    #[test]
    fn test_exit_code_for_other_errors() {
        let error: anyhow::Error = LockfileError::usage("not traversable").into();
        assert_eq!(ExitCode::for_error(&error), ExitCode::ApplicationError);

        let error = anyhow::anyhow!("disk on fire");
        assert_eq!(ExitCode::for_error(&error), ExitCode::ApplicationError);
    }

    // LockfileError tests
    #[test]
    fn test_detection_error_display_with_path() {
        let error = LockfileError::detection(
            Some(PathBuf::from("/repo/yarn.lock")),
            "content matched no known grammar",
        );
        let display = format!("{}", error);
        assert!(display.contains("Unable to detect lockfile type for /repo/yarn.lock"));
        assert!(display.contains("content matched no known grammar"));
    }

    #[test]
    fn test_detection_error_display_without_path() {
        let error = LockfileError::detection(None, "empty input");
        assert_eq!(
            format!("{}", error),
            "Unable to detect lockfile type: empty input"
        );
    }

    #[test]
    fn test_parse_error_display() {
        let error = LockfileError::parse("pnpm", "missing lockfileVersion");
        assert_eq!(
            format!("{}", error),
            "Failed to parse pnpm lockfile: missing lockfileVersion"
        );
    }

    #[test]
    fn test_usage_error_display() {
        let error = LockfileError::usage("set is not traversable");
        assert_eq!(format!("{}", error), "Invalid usage: set is not traversable");
    }

    // SbomError tests
    #[test]
    fn test_lockfile_not_found_display() {
        let error = SbomError::LockfileNotFound {
            path: PathBuf::from("/test/path/package-lock.json"),
            suggestion: "Test suggestion".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Lockfile not found"));
        assert!(display.contains("/test/path/package-lock.json"));
        assert!(display.contains("💡 Hint:"));
        assert!(display.contains("Test suggestion"));
    }

    #[test]
    fn test_file_write_error_display() {
        let error = SbomError::FileWriteError {
            path: PathBuf::from("/test/output.json"),
            details: "Permission denied".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Failed to write to file"));
        assert!(display.contains("/test/output.json"));
        assert!(display.contains("Permission denied"));
        assert!(display.contains("💡 Hint:"));
    }

    #[test]
    fn test_file_read_error_display() {
        let error = SbomError::FileReadError {
            path: PathBuf::from("/test/file.txt"),
            details: "File not found".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Failed to read file"));
        assert!(display.contains("/test/file.txt"));
        assert!(display.contains("File not found"));
        assert!(display.contains("💡 Hint:"));
    }

    #[test]
    fn test_security_error_display() {
        let error = SbomError::SecurityError {
            path: PathBuf::from("/test/symlink"),
            reason: "Symbolic links are not allowed".to_string(),
            hint: "Use a regular file instead".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Security violation"));
        assert!(display.contains("/test/symlink"));
        assert!(display.contains("Symbolic links are not allowed"));
        assert!(display.contains("Use a regular file instead"));
    }
}

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for navigation operations.
pub type NavResult<T> = Result<T, NavError>;

/// The error type for template loading, capture and input operations.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("Template '{name}' not found in the template store")]
    TemplateNotFound { name: String },

    #[error("Frame capture failed: {description}")]
    Capture { description: String },

    #[error("Failed to load template image {path:?}: {source}")]
    TemplateLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to read template directory {path:?}: {source}")]
    TemplateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Pointer input failed: {description}")]
    Input { description: String },

    #[error("Failed to write debug snapshot {path:?}: {source}")]
    Snapshot {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Background task failed: {0}")]
    Background(#[from] tokio::task::JoinError),
}

/// Coarse classification of a [`NavError`], carried in run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    TemplateNotFound,
    CaptureError,
    TemplateLoadError,
    InputError,
    SnapshotError,
    InternalError,
}

impl NavError {
    pub fn kind(&self) -> FailureKind {
        match self {
            NavError::TemplateNotFound { .. } => FailureKind::TemplateNotFound,
            NavError::Capture { .. } => FailureKind::CaptureError,
            NavError::TemplateLoad { .. } | NavError::TemplateDirectory { .. } => {
                FailureKind::TemplateLoadError
            }
            NavError::Input { .. } => FailureKind::InputError,
            NavError::Snapshot { .. } => FailureKind::SnapshotError,
            NavError::Background(_) => FailureKind::InternalError,
        }
    }

    pub fn capture(description: impl Into<String>) -> Self {
        NavError::Capture {
            description: description.into(),
        }
    }

    pub fn input(description: impl Into<String>) -> Self {
        NavError::Input {
            description: description.into(),
        }
    }

    /// Configuration errors are the caller's fault and are never worth retrying.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            NavError::TemplateNotFound { .. }
                | NavError::TemplateLoad { .. }
                | NavError::TemplateDirectory { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = NavError::TemplateNotFound {
            name: "Classic Arena".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::TemplateNotFound);
        assert!(err.is_configuration_error());

        let err = NavError::capture("window minimized");
        assert_eq!(err.kind(), FailureKind::CaptureError);
        assert!(!err.is_configuration_error());
        assert_eq!(err.to_string(), "Frame capture failed: window minimized");
    }

    #[tokio::test]
    async fn test_panicked_task_is_internal_error() {
        let join_error = tokio::task::spawn_blocking(|| -> u32 { panic!("matcher bug") })
            .await
            .unwrap_err();
        let err = NavError::from(join_error);
        assert_eq!(err.kind(), FailureKind::InternalError);
        assert!(!err.is_configuration_error());
    }
}

use posterize::{PixelFormat, PosterizeError};
use serde::Serialize;
use thiserror::Error;

/// Failures surfaced at the session boundary.
///
/// None of these leave the session with a released buffer referenced or
/// with bitmap and palette out of sync.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Could not read image: {0}")]
    Decode(String),

    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(PixelFormat),

    #[error("Invalid color count: {0}")]
    InvalidParameter(u16),

    #[error("No image loaded")]
    UseBeforeReady,

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Session closed")]
    Closed,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Decode(_) => ErrorKind::Decode,
            SessionError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            SessionError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            SessionError::UseBeforeReady => ErrorKind::UseBeforeReady,
            SessionError::Export(_) => ErrorKind::Export,
            SessionError::Closed => ErrorKind::Closed,
        }
    }
}

impl From<PosterizeError> for SessionError {
    fn from(e: PosterizeError) -> Self {
        match e {
            PosterizeError::InvalidParameter { color_count } => {
                SessionError::InvalidParameter(color_count)
            }
            PosterizeError::UnsupportedFormat(format) => SessionError::UnsupportedFormat(format),
            // The decoder handed over a malformed or empty image
            PosterizeError::BufferSize { .. } | PosterizeError::Palette(_) => {
                SessionError::Decode(e.to_string())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export task failed: {0}")]
    Task(String),
}

/// User-facing category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Decode,
    UnsupportedFormat,
    InvalidParameter,
    UseBeforeReady,
    Export,
    Closed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Decode => "decode",
            ErrorKind::UnsupportedFormat => "unsupported-format",
            ErrorKind::InvalidParameter => "invalid-parameter",
            ErrorKind::UseBeforeReady => "not-ready",
            ErrorKind::Export => "export",
            ErrorKind::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posterize::PaletteError;

    #[test]
    fn test_session_error_decode() {
        let error = SessionError::Decode("missing.png: not found".to_string());
        assert_eq!(error.to_string(), "Could not read image: missing.png: not found");
        assert_eq!(error.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_session_error_use_before_ready() {
        let error = SessionError::UseBeforeReady;
        assert_eq!(error.to_string(), "No image loaded");
        assert_eq!(error.kind(), ErrorKind::UseBeforeReady);
    }

    #[test]
    fn test_session_error_unsupported_format() {
        let error = SessionError::UnsupportedFormat(PixelFormat::Rgba16);
        assert_eq!(error.to_string(), "Unsupported pixel format: rgba16");
    }

    #[test]
    fn test_export_error_png_encode() {
        let error = ExportError::PngEncode("Encoding failed".to_string());
        assert_eq!(error.to_string(), "PNG encode error: Encoding failed");
    }

    #[test]
    fn test_export_error_task_is_not_an_encode_error() {
        let error: SessionError = ExportError::Task("task panicked".to_string()).into();
        assert_eq!(error.kind(), ErrorKind::Export);
        assert_eq!(error.to_string(), "Export error: Export task failed: task panicked");
        assert!(!error.to_string().contains("PNG"));
    }

    #[test]
    fn test_session_error_from_export_error() {
        let error: SessionError = ExportError::PngEncode("x".to_string()).into();
        match error {
            SessionError::Export(_) => {}
            _ => panic!("Expected Export variant"),
        }
    }

    #[test]
    fn test_session_error_from_engine_error() {
        let error: SessionError = PosterizeError::InvalidParameter { color_count: 300 }.into();
        assert_eq!(error.kind(), ErrorKind::InvalidParameter);
        assert_eq!(error.to_string(), "Invalid color count: 300");

        let error: SessionError = PosterizeError::UnsupportedFormat(PixelFormat::Rgba16).into();
        assert_eq!(error.kind(), ErrorKind::UnsupportedFormat);

        let error: SessionError = PosterizeError::Palette(PaletteError::EmptyPalette).into();
        assert_eq!(error.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::UseBeforeReady.to_string(), "not-ready");
        assert_eq!(ErrorKind::Decode.to_string(), "decode");
    }
}

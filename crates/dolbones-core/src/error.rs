use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Guest RAM region not found in target process")]
    RegionNotFound,

    #[error("Address {address:#x} (+{size} bytes) is outside guest RAM")]
    OutOfRange { address: u64, size: usize },

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    ReadFailed { address: u64, message: String },

    #[error("Decode mismatch: expected {expected}, got {actual}")]
    DecodeMismatch { expected: String, actual: String },

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Cycle detected at joint {address:#010x}")]
    CycleDetected { address: u32 },

    #[error("Skeleton walk exceeded limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("Unknown replay command id: {0:#04x}")]
    UnknownCommand(u8),

    #[error("Bone log error: {0}")]
    PoseLog(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Errors raised while attaching; nothing can be inspected after these.
    pub fn is_attach_error(&self) -> bool {
        matches!(
            self,
            Error::ProcessNotFound(_) | Error::ProcessOpenFailed(_) | Error::RegionNotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.is_not_found());

        let other_io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err2 = Error::Io(other_io_err);
        assert!(!err2.is_not_found());
    }

    #[test]
    fn test_attach_errors() {
        assert!(Error::RegionNotFound.is_attach_error());
        assert!(Error::ProcessNotFound("x".into()).is_attach_error());
        assert!(!Error::OutOfRange { address: 0, size: 4 }.is_attach_error());
    }

    #[test]
    fn test_out_of_range_display() {
        let err = Error::OutOfRange {
            address: 0x7FFF_FFFC,
            size: 4,
        };
        assert_eq!(
            err.to_string(),
            "Address 0x7ffffffc (+4 bytes) is outside guest RAM"
        );
    }
}

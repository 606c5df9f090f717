//! Error types for the chat relay
//!
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Fatal at startup (bind, configuration); per-connection I/O errors
/// only end that connection's worker.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (bind/accept/read/write)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid command-line configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Protocol errors reported back to the offending client
///
/// The display text is what follows `[SERVER] ` in the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Well-formed `[tag]` prefix with an unknown tag
    #[error("Unrecognized prefix.")]
    UnrecognizedPrefix,

    /// No `[tag]` prefix at all
    #[error("Invalid message format.")]
    InvalidFormat,
}

/// Outbound queue errors
///
/// Occurs when enqueueing a notification for a client fails.
#[derive(Debug, Error)]
pub enum SendError {
    /// The client's writer task has ended
    #[error("Channel closed")]
    ChannelClosed,

    /// The client is not draining its queue fast enough
    #[error("Channel full")]
    ChannelFull,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_text() {
        assert_eq!(
            ProtocolError::UnrecognizedPrefix.to_string(),
            "Unrecognized prefix."
        );
        assert_eq!(
            ProtocolError::InvalidFormat.to_string(),
            "Invalid message format."
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}

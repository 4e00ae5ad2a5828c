//! Shared primitives used across Livepatch crates.

use core::fmt;

/// Result alias used across the workspace.
pub type LpResult<T> = Result<T, LivepatchError>;

/// Coded error shared by the host and embedded sides of the preview bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivepatchError {
    pub code: &'static str,
    pub message: String,
}

impl LivepatchError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for LivepatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for LivepatchError {}

#[cfg(test)]
mod tests {
    use super::LivepatchError;

    #[test]
    fn displays_code_and_message() {
        let error = LivepatchError::new("ipc.frame_too_short", "frame is empty");
        assert_eq!(error.to_string(), "ipc.frame_too_short: frame is empty");
    }
}

use thiserror::Error;

/// Fatal errors for a station dump.
///
/// Each variant names the step that failed so the diagnostic printed by the
/// binary is actionable without a debugger.
#[derive(Error, Debug)]
pub enum NetlinkError {
    #[error("Failed to connect netlink socket: {0}")]
    ConnectionFailed(String),

    #[error("Failed to resolve generic netlink family '{family}': {reason}")]
    FamilyResolution { family: String, reason: String },

    #[error("Failed to set socket option {option}: {source}")]
    SocketOption {
        option: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to get interface index for '{interface}': {reason}")]
    InterfaceIndexError { interface: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to build {what} attribute: {reason}")]
    AttributeError { what: String, reason: String },

    #[error("Failed to send {operation} request: {reason}")]
    SendFailed { operation: String, reason: String },

    #[error("Failed to receive {operation} reply: {reason}")]
    ReceiveFailed { operation: String, reason: String },

    #[error("Netlink socket closed before {operation} completed")]
    ConnectionClosed { operation: String },

    #[error("Kernel rejected {operation}: {} (errno {errno})", describe_errno(.errno))]
    Kernel { operation: String, errno: i32 },

    #[error("Operation timed out after {timeout_ms}ms: {operation}")]
    Timeout { operation: String, timeout_ms: u64 },
}

pub type Result<T> = std::result::Result<T, NetlinkError>;

fn describe_errno(errno: &i32) -> std::io::Error {
    std::io::Error::from_raw_os_error(*errno)
}

impl NetlinkError {
    /// Build a kernel error from the signed code carried in an `NLMSG_ERROR`.
    pub fn kernel(operation: impl Into<String>, code: i32) -> Self {
        Self::Kernel {
            operation: operation.into(),
            errno: code.saturating_abs(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Reasons a single station record is skipped.
///
/// These never abort a dump; the pump logs them and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("station info attribute missing")]
    MissingStationInfo,

    #[error("MAC address attribute missing")]
    MissingMac,

    #[error("MAC address attribute has {len} bytes, expected 6")]
    InvalidMac { len: usize },

    #[error("attribute {attr} has {len} bytes, policy requires at least {min}")]
    AttributeTooShort { attr: u16, len: usize, min: usize },

    #[error("nested attribute header at offset {offset} overruns its buffer")]
    Truncated { offset: usize },

    #[error("generic netlink message could not be parsed: {reason}")]
    MalformedMessage { reason: String },
}

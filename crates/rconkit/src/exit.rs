use std::fmt;
use std::io;

use rconkit_client::ClientError;
use rconkit_frame::FrameError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const AUTH_FAILED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::PermissionDenied => AUTH_FAILED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused => FAILURE,
        _ => INTERNAL,
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    let code = match &err {
        FrameError::Io(source) => io_code(source),
        FrameError::InvalidLength { .. } | FrameError::BodyTooLarge { .. } => DATA_INVALID,
        FrameError::ConnectionClosed => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Connect { ref source, .. } => {
            CliError::new(io_code(source), format!("{context}: {err}"))
        }
        ClientError::Io(ref source) => CliError::new(io_code(source), format!("{context}: {err}")),
        ClientError::Frame(inner) => frame_error(context, inner),
        ClientError::Auth(_) => CliError::new(AUTH_FAILED, format!("{context}: {err}")),
        ClientError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        other => CliError::new(FAILURE, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn auth_maps_to_auth_exit_code() {
        let err = client_error("connect failed", ClientError::Auth("bad password".into()));
        assert_eq!(err.code, AUTH_FAILED);
        assert!(err.message.contains("bad password"));
    }

    #[test]
    fn timeout_maps_to_timeout_exit_code() {
        let err = client_error(
            "command failed",
            ClientError::Timeout(Duration::from_secs(10)),
        );
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn refused_connect_maps_to_failure() {
        let err = client_error(
            "connect failed",
            ClientError::Connect {
                addr: "127.0.0.1:27210".into(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            },
        );
        assert_eq!(err.code, FAILURE);
        assert!(err.message.contains("127.0.0.1:27210"));
    }

    #[test]
    fn garbage_frames_map_to_data_invalid() {
        let err = frame_error("read failed", FrameError::InvalidLength { declared: -3 });
        assert_eq!(err.code, DATA_INVALID);
    }
}

use std::fmt;
use std::io;

use lsrsim_frame::FrameError;
use lsrsim_router::{HostError, NetworkError, RouterError};

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const NO_INPUT: i32 = 66;
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

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => NO_INPUT,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn router_error(context: &str, err: RouterError) -> CliError {
    match err {
        RouterError::Frame(err) => frame_error(context, err),
        RouterError::NoRoute(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        RouterError::InterfaceOutOfRange { .. } | RouterError::NoInterfaces(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn host_error(context: &str, err: HostError) -> CliError {
    match err {
        HostError::Frame(err) => frame_error(context, err),
        other => CliError::new(FAILURE, format!("{context}: {other}")),
    }
}

pub fn network_error(context: &str, err: NetworkError) -> CliError {
    match err {
        NetworkError::Router { name, source } => {
            router_error(&format!("{context}: router {name}"), source)
        }
        NetworkError::Host { name, source } => host_error(&format!("{context}: host {name}"), source),
        NetworkError::Io(source) => io_error(context, source),
        NetworkError::ThreadPanicked(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

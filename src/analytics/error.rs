use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GtagErrorCode {
    InvalidArgument,
    ContextUnavailable,
    HostUnavailable,
    Internal,
}

impl GtagErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GtagErrorCode::InvalidArgument => "gtag/invalid-argument",
            GtagErrorCode::ContextUnavailable => "gtag/context-unavailable",
            GtagErrorCode::HostUnavailable => "gtag/host-unavailable",
            GtagErrorCode::Internal => "gtag/internal",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GtagError {
    pub code: GtagErrorCode,
    message: String,
}

impl GtagError {
    pub fn new(code: GtagErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for GtagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for GtagError {}

pub type GtagResult<T> = Result<T, GtagError>;

pub fn invalid_argument(message: impl Into<String>) -> GtagError {
    GtagError::new(GtagErrorCode::InvalidArgument, message)
}

pub fn context_unavailable(message: impl Into<String>) -> GtagError {
    GtagError::new(GtagErrorCode::ContextUnavailable, message)
}

pub fn host_unavailable(message: impl Into<String>) -> GtagError {
    GtagError::new(GtagErrorCode::HostUnavailable, message)
}

pub fn internal_error(message: impl Into<String>) -> GtagError {
    GtagError::new(GtagErrorCode::Internal, message)
}

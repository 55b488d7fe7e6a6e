//! Handler outcomes

use modbot_service::{ServiceError, ServiceResult};

/// The update was claimed by a module
#[derive(Debug)]
pub enum Handled {
    /// Answer with HTML text
    Html(String),
    /// Answer with plain text
    Plain(String),
    /// The module already sent whatever it needed
    Done,
    /// The operation failed; rendered through [`ServiceError::user_message`]
    Failed(ServiceError),
}

impl Handled {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Reply text, if the outcome carries one
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Html(text) | Self::Plain(text) => Some(text),
            Self::Done | Self::Failed(_) => None,
        }
    }
}

impl From<ServiceResult<String>> for Handled {
    fn from(result: ServiceResult<String>) -> Self {
        match result {
            Ok(text) => Self::Html(text),
            Err(e) => Self::Failed(e),
        }
    }
}

impl From<ServiceResult<()>> for Handled {
    fn from(result: ServiceResult<()>) -> Self {
        match result {
            Ok(()) => Self::Done,
            Err(e) => Self::Failed(e),
        }
    }
}

/// No module wanted the update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotApplicable;

/// What every module hook returns
pub type HandlerResult = Result<Handled, NotApplicable>;

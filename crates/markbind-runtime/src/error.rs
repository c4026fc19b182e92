#![forbid(unsafe_code)]

use std::fmt;

use markbind_dom::DomError;

/// Errors surfaced by the binder.
///
/// Malformed markup never produces one of these: unknown classes,
/// unresolvable actions and missing target slots are skipped. Only
/// programmer errors reach the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinderError {
    /// A constructor is already registered under this class name.
    AlreadyRegistered(String),
    /// The attribute schema failed validation.
    InvalidConfig(Vec<String>),
    /// The observed root could not be registered.
    Dom(DomError),
}

impl fmt::Display for BinderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRegistered(class) => write!(f, "{class} is already registered."),
            Self::InvalidConfig(problems) => {
                write!(f, "invalid binder config: {}", problems.join("; "))
            }
            Self::Dom(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for BinderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dom(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DomError> for BinderError {
    fn from(err: DomError) -> Self {
        Self::Dom(err)
    }
}

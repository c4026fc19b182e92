#![forbid(unsafe_code)]

//! markbind public facade crate.
//!
//! Re-exports the element tree from `markbind-dom` and the binder from
//! `markbind-runtime`, plus a prelude for controller authors.

use std::fmt;

// --- Tree re-exports -------------------------------------------------------

pub use markbind_dom::markup::{inner_markup, outer_markup};
pub use markbind_dom::{
    Document, DomError, Event, Listener, MutationRecord, NodeId, NodeKind, ObserverId, listener,
};

// --- Binder re-exports -----------------------------------------------------

pub use markbind_runtime::{
    ActionDescriptor, ActionFn, Binder, BinderConfig, BinderError, ConfigError, Controller,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for markbind hosts.
#[derive(Debug)]
pub enum Error {
    /// Tree operation or markup parse failure.
    Dom(DomError),
    /// Registration or binder setup failure.
    Binder(BinderError),
    /// Attribute schema could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dom(err) => write!(f, "{err}"),
            Self::Binder(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dom(err) => Some(err),
            Self::Binder(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<DomError> for Error {
    fn from(err: DomError) -> Self {
        Self::Dom(err)
    }
}

impl From<BinderError> for Error {
    fn from(err: BinderError) -> Self {
        Self::Binder(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for markbind hosts.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ActionFn, Binder, BinderConfig, Controller, Document, Error, Event, NodeId, Result,
    };

    pub use crate::{dom, runtime};
}

pub use markbind_dom as dom;
pub use markbind_runtime as runtime;

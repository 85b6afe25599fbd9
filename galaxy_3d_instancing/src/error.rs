//! Error types for the Galaxy3D instancing crate
//!
//! Only configuration and construction boundaries return errors.
//! Instance mutations never fail from the caller's point of view:
//! contract violations panic, recoverable oddities are logged and skipped.

use std::fmt;

/// Result type for Galaxy3D instancing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D instancing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Host-side failure (template host, batch backend, etc.)
    BackendError(String),

    /// Invalid configuration value (grid cell size, etc.)
    InvalidConfig(String),

    /// Invalid resource (template class, mesh, etc.)
    InvalidResource(String),

    /// Initialization failed (foliage adapter, subsystems)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an ERROR and build an `Error::BackendError` from the same message
///
/// # Example
///
/// ```ignore
/// let actor = host.spawn(class)
///     .ok_or_else(|| engine_err!("galaxy3d::FoliageIsmActor", "Cannot spawn {}", class))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::BackendError(message)
    }};
}

/// Log an ERROR and return early with an `Error::BackendError`
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

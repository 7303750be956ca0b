//! Error types for the Mycelium protocol layer.

mod callback;
mod deploy;
mod kernel;
mod registry;

pub use callback::*;
pub use deploy::*;
pub use kernel::*;
pub use registry::*;

/// Boxed error returned by external collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

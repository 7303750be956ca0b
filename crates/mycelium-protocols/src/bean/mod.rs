//! Bean protocol definitions.
//!
//! Beans are the named objects deployment units expose through the kernel.

mod capability;
mod status;
mod traits;

pub use capability::*;
pub use status::*;
pub use traits::*;

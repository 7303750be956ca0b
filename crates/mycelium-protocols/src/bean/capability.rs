//! Capability tags used to match callbacks against beans.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A tag a bean declares to say "I can be treated as this".
///
/// Callbacks are registered against a capability and fire for every bean
/// that lists it in [`Bean::capabilities`](super::Bean::capabilities).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(Cow<'static, str>);

impl Capability {
    /// Create a capability from any string.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    /// Create a capability usable in `const` position.
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Capability {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Capability {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

/// Which side of a bean's lifetime a callback observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackDirection {
    OnAdd,
    OnRemove,
}

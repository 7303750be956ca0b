//! Bean registry.

mod bean;

pub use bean::BeanRegistry;

use std::sync::Arc;

use mycelium_protocols::Bean;

/// Identity of a registered instance: the address of its `Arc` allocation.
pub(crate) fn instance_key(bean: &Arc<dyn Bean>) -> usize {
    Arc::as_ptr(bean) as *const () as usize
}

//! Deployment protocol definitions.
//!
//! A deployment unit is identified by a [`Locator`] and activated by a
//! [`Deployer`] working through a [`DeployContext`].

mod locator;
mod report;
mod traits;

pub use locator::*;
pub use report::*;
pub use traits::*;

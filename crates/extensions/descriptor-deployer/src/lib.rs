//! TOML unit descriptor deployer for Mycelium.
//!
//! Activates units described by a TOML file listing beans:
//!
//! ```toml
//! [[bean]]
//! name = "DataSource"
//! capabilities = ["Pool"]
//! depends = ["TransactionManager"]
//! phased = true
//!
//! [bean.properties]
//! url = "jdbc:h2:mem:test"
//! ```
//!
//! Every bean becomes a [`DescriptorBean`] registered with status `Started`.
//! `depends` entries are recorded as dependency edges, and `phased` beans
//! receive the pre/post deploy notifications of their wave.

mod bean;
mod deployer;
mod descriptor;
mod error;

pub use bean::DescriptorBean;
pub use deployer::DescriptorDeployer;
pub use descriptor::{BeanDefinition, UnitDescriptor};
pub use error::DescriptorError;

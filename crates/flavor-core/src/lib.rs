//! Resolution, lock and deployment engine for vim-flavor
//!
//! This crate turns a flavorfile into a lock and a deployed vimfiles tree:
//!
//! - **Version matching**: `>=`, `~>` and `==` constraints over multi-segment versions
//! - **Repository cache**: bare clones listing published versions and extracting them
//! - **Resolver**: locked or newest versions per dependency
//! - **Deployer**: the managed `flavors` directory and its bootstrap script
//! - **Facade**: load, resolve, save and deploy for `install` and `upgrade`
//!
//! # Architecture
//!
//! `flavor-core` sits above the Layer 0 crates and below the CLI:
//!
//! ```text
//!          flavor-cli
//!              |
//!         flavor-core
//!              |
//!      +-------+-------+
//!      |               |
//!  flavor-fs      flavor-git
//! ```
//!
//! # Example
//!
//! ```no_run
//! use flavor_core::{Facade, FlavorConfig, config};
//!
//! fn example() -> flavor_core::Result<()> {
//!     let mut facade = Facade::new(FlavorConfig::from_env()?);
//!     let report = facade.install(&config::default_vimfiles_path()?)?;
//!     for flavor in &report.flavors {
//!         println!("{} {}", flavor.name, flavor.version);
//!     }
//!     Ok(())
//! }
//! ```

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod deployer;
pub mod error;
pub mod facade;
pub mod flavorfile;
pub mod lock;
pub mod lockfile;
pub mod report;
pub mod resolver;
pub mod spec;
pub mod version;

pub use bootstrap::{BootstrapScript, runtimepath_order};
pub use cache::{GitRepositoryCache, RepositoryCache};
pub use config::FlavorConfig;
pub use deployer::{DeployedFlavor, Deployer};
pub use error::{Error, Result};
pub use facade::Facade;
pub use lock::{LockEntry, LockSet};
pub use report::{ChangeKind, FlavorChange, InstallReport};
pub use resolver::{ResolutionPolicy, Resolver};
pub use spec::{DependencySpec, SpecSet};
pub use version::{ConstraintOp, Version, VersionConstraint};

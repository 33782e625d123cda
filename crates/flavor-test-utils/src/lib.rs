//! Shared test utilities for the vim-flavor workspace.
//!
//! Fixtures used by more than one crate's test suite live here. This is a
//! dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`git`]: plugin repositories with version tags
//! - [`project`]: [`project::TestProject`] builder for a VimFlavor project,
//!   a cache root and a vimfiles directory inside one temporary directory

pub mod git;
pub mod project;

//! Git primitives for the vim-flavor repository cache
//!
//! Every cached repository is a bare clone. The cache only ever needs four
//! things from it: clone, fetch tags, list tag names, and extract the file
//! tree of one tag into a directory.

pub mod error;
mod extract;
pub mod repository;

pub use error::{Error, Result};
pub use repository::CachedRepository;

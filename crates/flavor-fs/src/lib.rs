//! Filesystem primitives for vim-flavor
//!
//! Provides forward-slash normalized paths, atomic writes, advisory
//! directory locks and the naming rules that map dependency names and
//! repository locations onto directory names.

pub mod constants;
pub mod digest;
pub mod error;
pub mod io;
pub mod lock;
pub mod path;

pub use constants::FlavorPath;
pub use digest::location_digest;
pub use error::{Error, Result};
pub use lock::DirLock;
pub use path::{NormalizedPath, zap, zap_dir_name};

//! Infrastructure layer: I/O implementations
//!
//! Filesystem access, module import and logging live here.

pub mod error;
pub mod logger;
pub mod modules;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use logger::Logger;
pub use modules::{FileModuleLoader, ModuleLoader};
pub use traits::{DirEntry, FileSystem, RealFileSystem};

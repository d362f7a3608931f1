//! Domain layer: naming rules, option declarations and program metadata
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod metadata;
pub mod naming;
pub mod options;
pub mod ordering;

pub use error::DomainError;
pub use metadata::{ProgramMetadata, ProgramType};
pub use naming::{capitalize_first, parse_command, validate_name, PositionalSpec, DEFAULT_COMMAND};
pub use options::{OptionKind, OptionSpec};
pub use ordering::natural_cmp;

//! Application layer: the command-tree engine
//!
//! Discovery turns a directory of modules into registered programs; the
//! pipeline drives argv through them.

pub mod configuration;
pub mod context;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod program;

pub use configuration::{
    Builder, Callables, Configuration, ConfigurationSource, Description, RawConfiguration,
};
pub use context::{
    Arguments, ExecutionContext, ExecutionResult, ExecutionState, PackageInfo, RegisteredProgram,
};
pub use discovery::TreeDiscoverer;
pub use error::{ApplicationError, ApplicationResult};
pub use loader::{ConfigurationLoader, LoadKind, LoadPhase, LoadedConfiguration};
pub use pipeline::{
    configure, run_program, ConfigurationHooks, ErrorReport, PreparedProgram, ProgramOptions,
};
pub use program::{
    HelpMode, ParseOutcome, ProgramAdapter, ProgramNode, ProxyCommand, ShadowProgram,
    Strictness, StrictnessControl,
};

//! cmdtree: command trees discovered from a directory of modules.
//!
//! Each directory's `index` module is a parent program, every other module a
//! leaf command. Parents hand the rest of argv to the child named next on the
//! command line; the deepest command's result is the result of the run.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{
    configure, run_program, ApplicationError, ApplicationResult, Arguments, Callables,
    ConfigurationHooks, ExecutionContext, ExecutionResult, PackageInfo, ProgramOptions,
    RawConfiguration,
};

//! CLI layer: the `cmdtree` binary

pub mod args;
pub mod error;
pub mod handlers;
pub mod output;

use std::sync::Arc;

use tracing::debug;

pub use args::Cli;
pub use error::{CliError, CliResult};

use crate::application::pipeline::DEFAULT_TERMINAL_WIDTH;
use crate::application::{configure, ConfigurationHooks, ProgramOptions, RawConfiguration};
use crate::config::Settings;
use crate::exitcode;
use crate::infrastructure::FileModuleLoader;

/// Terminal width at startup, for wrapping help text.
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(columns, _)| usize::from(columns))
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}

/// Load settings, discover the command tree and execute `cli.args`.
///
/// Returns the process exit code. Errors before execution starts are
/// returned; execution errors are rendered by the error epilogue and mapped
/// to their exit code.
pub fn run(cli: &Cli) -> CliResult<i32> {
    let working_dir = std::env::current_dir().ok();
    let settings = Settings::load(working_dir.as_deref())?;
    debug!("settings: {:?}", settings);

    let package = settings.package(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    let modules = Arc::new(FileModuleLoader::with_callables(handlers::builtin_callables()));
    let hooks = ConfigurationHooks::new()
        .with_error_handling_epilogue(|report, _, _, _| output::error_report(report));

    let mut options = ProgramOptions::new(package, modules)
        .root(
            RawConfiguration::new()
                .description("show the discovered command tree")
                .handler(handlers::tree),
        )
        .hooks(hooks)
        .terminal_width(terminal_width());
    if let Some(dir) = cli.commands_dir.clone().or(settings.commands_dir) {
        options = options.commands_dir(dir);
    }

    let program = configure(options)?;
    match program.execute(cli.args.clone()) {
        Ok(_) => Ok(exitcode::OK),
        Err(e) => Ok(e.suggested_exit_code()),
    }
}

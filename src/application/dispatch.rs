//! Hand-off from a parent program to the child command it was invoked with.

use crate::application::context::{ExecutionContext, ExecutionResult};
use crate::application::program::{ProgramNode, ProxyCommand};
use crate::application::{ApplicationError, ApplicationResult};

/// Forward execution from `parent` to the child behind `proxy`.
///
/// The shared argv cursor must sit on the child's name: every command-name
/// token precedes all flags (`root sub leaf --flag`, never
/// `root --flag sub leaf`). The child's result is recorded as the deepest
/// result if no deeper program got there first; the parent itself reports a
/// delegated result.
pub fn forward(
    parent: &ProgramNode,
    proxy: &ProxyCommand,
    context: &ExecutionContext,
) -> ApplicationResult<ExecutionResult> {
    let log = context.debug.extend("dispatch");

    match context.state.next_argv_token() {
        Some(token) if proxy.answers_to(&token) => {
            log.message(format_args!(
                "{} -> {} (invoked as \"{}\")",
                parent.full_name(),
                proxy.target,
                context.state.consumed_argv().join(" ")
            ));
        }
        other => {
            return Err(ApplicationError::assertion(format!(
                "{}: expected command \"{}\" before any option, found {}",
                parent.full_name(),
                proxy.name,
                other.map_or_else(|| "end of arguments".to_string(), |t| format!("\"{}\"", t))
            )));
        }
    }

    let child = context.program(&proxy.target).ok_or_else(|| {
        ApplicationError::assertion(format!(
            "{}: command \"{}\" is registered but program \"{}\" is not",
            parent.full_name(),
            proxy.name,
            proxy.target
        ))
    })?;

    let result = child.program.parse(context)?;
    if context.state.record_deepest(&result) {
        log.message(format_args!("deepest result from {}", result.command));
    }
    Ok(ExecutionResult::delegated(parent.full_name()))
}

//! Built-in handlers available to command modules of the `cmdtree` binary.

use serde_json::Value;
use termtree::Tree;

use crate::application::{
    ApplicationError, ApplicationResult, Arguments, Callables, ExecutionContext,
};
use crate::cli::output;

/// Handlers registered by the binary, by the name modules refer to them with.
pub fn builtin_callables() -> Callables {
    Callables::new()
        .with_handler("echo", echo)
        .with_handler("tree", tree)
}

/// Print the parsed arguments as JSON and return them.
pub fn echo(args: &Arguments<'_>) -> ApplicationResult<Value> {
    let values = Value::Object(args.values().clone());
    let rendered =
        serde_json::to_string_pretty(&values).map_err(|e| ApplicationError::OperationFailed {
            context: "rendering arguments".into(),
            source: Box::new(e),
        })?;
    output::info(&rendered);
    Ok(values)
}

/// Print the discovered command tree.
pub fn tree(args: &Arguments<'_>) -> ApplicationResult<Value> {
    let context = args.context();
    let rendered = command_tree(context).to_string();
    output::info(rendered.trim_end());
    Ok(Value::String(rendered))
}

/// The registered programs as a tree, children in their help order.
pub fn command_tree(context: &ExecutionContext) -> Tree<String> {
    match context.root() {
        Some(root) => subtree(context, root.program.full_name()),
        None => Tree::new(context.package.name.clone()),
    }
}

fn subtree(context: &ExecutionContext, key: &str) -> Tree<String> {
    let Some(registered) = context.program(key) else {
        return Tree::new(format!("{} (unregistered)", key));
    };
    let configuration = registered.program.configuration();

    let mut label = configuration.name.clone();
    if !configuration.aliases.is_empty() {
        label.push_str(&format!(" ({})", configuration.aliases.join(", ")));
    }
    if !configuration.description.is_empty() {
        label.push_str(&format!(" - {}", configuration.description));
    }
    if configuration.hidden {
        label.push_str(" [hidden]");
    }

    Tree::new(label).with_leaves(
        registered
            .program
            .adapter()
            .commands()
            .iter()
            .map(|proxy| subtree(context, &proxy.target)),
    )
}

//! Execution context: the registry of discovered programs plus the mutable
//! per-invocation state every program in the dispatch chain shares.

use std::cell::RefCell;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::application::program::ProgramNode;
use crate::domain::ProgramMetadata;
use crate::infrastructure::logger::Logger;

/// Name and version of the host package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub version: Option<String>,
}

impl PackageInfo {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

/// Raw argv with a single forward-moving consumer position.
///
/// Every program in the dispatch chain reads from the same cursor; a proxy
/// advances it past the command name it matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgvCursor {
    tokens: Vec<String>,
    position: usize,
}

impl ArgvCursor {
    pub fn new(tokens: Vec<String>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Take the next unconsumed token.
    pub fn next_token(&mut self) -> Option<String> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    pub fn remaining(&self) -> &[String] {
        self.tokens.get(self.position..).unwrap_or(&[])
    }

    pub fn consumed(&self) -> &[String] {
        self.tokens.get(..self.position).unwrap_or(&[])
    }

    pub fn consume_all(&mut self) {
        self.position = self.tokens.len();
    }
}

/// What one program produced: its parsed arguments and its handler's output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// Fully-qualified command name (space-joined lineage)
    pub command: String,
    pub arguments: Map<String, Value>,
    pub output: Value,
}

impl ExecutionResult {
    /// Result of an ancestor that handed execution to a child.
    pub fn delegated(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            arguments: Map::new(),
            output: Value::Null,
        }
    }
}

/// Mutable per-invocation state. Interior mutability lets every program in
/// the (single-threaded) dispatch chain share it through `&ExecutionContext`.
#[derive(Debug)]
pub struct ExecutionState {
    raw_argv: RefCell<ArgvCursor>,
    deepest_result: RefCell<Option<ExecutionResult>>,
    /// Terminal width captured at startup, used to wrap help text
    pub terminal_width: usize,
}

impl ExecutionState {
    pub fn new(terminal_width: usize) -> Self {
        Self {
            raw_argv: RefCell::new(ArgvCursor::default()),
            deepest_result: RefCell::new(None),
            terminal_width,
        }
    }

    /// Start a fresh invocation over `argv`.
    pub fn reset(&self, argv: Vec<String>) {
        *self.raw_argv.borrow_mut() = ArgvCursor::new(argv);
        *self.deepest_result.borrow_mut() = None;
    }

    pub fn remaining_argv(&self) -> Vec<String> {
        self.raw_argv.borrow().remaining().to_vec()
    }

    pub fn consumed_argv(&self) -> Vec<String> {
        self.raw_argv.borrow().consumed().to_vec()
    }

    pub fn next_argv_token(&self) -> Option<String> {
        self.raw_argv.borrow_mut().next_token()
    }

    pub fn consume_argv(&self) {
        self.raw_argv.borrow_mut().consume_all();
    }

    /// Store `result` unless a deeper program already stored one.
    /// Returns whether the slot was written.
    pub fn record_deepest(&self, result: &ExecutionResult) -> bool {
        let mut slot = self.deepest_result.borrow_mut();
        if slot.is_some() {
            return false;
        }
        *slot = Some(result.clone());
        true
    }

    pub fn deepest_result(&self) -> Option<ExecutionResult> {
        self.deepest_result.borrow().clone()
    }
}

/// A program together with where it came from.
#[derive(Debug)]
pub struct RegisteredProgram {
    pub program: ProgramNode,
    pub metadata: ProgramMetadata,
}

/// Process-wide state threaded through discovery and every handler.
#[derive(Debug)]
pub struct ExecutionContext {
    /// Programs keyed by fully-qualified name, in discovery order; the root
    /// (if any) is always first
    pub commands: IndexMap<String, RegisteredProgram>,
    pub debug: Logger,
    pub state: ExecutionState,
    pub package: PackageInfo,
}

impl ExecutionContext {
    pub fn new(package: PackageInfo, terminal_width: usize) -> Self {
        Self {
            commands: IndexMap::new(),
            debug: Logger::new(package.name.clone()),
            state: ExecutionState::new(terminal_width),
            package,
        }
    }

    pub fn root(&self) -> Option<&RegisteredProgram> {
        self.commands.first().map(|(_, registered)| registered)
    }

    pub fn program(&self, name: &str) -> Option<&RegisteredProgram> {
        self.commands.get(name)
    }
}

/// Parsed arguments handed to a handler.
///
/// The execution context rides along but is not one of the values: it is
/// reachable only through [`Arguments::context`].
pub struct Arguments<'a> {
    command: String,
    values: Map<String, Value>,
    context: &'a ExecutionContext,
}

impl<'a> Arguments<'a> {
    pub fn new(
        command: impl Into<String>,
        values: Map<String, Value>,
        context: &'a ExecutionContext,
    ) -> Self {
        Self {
            command: command.into(),
            values,
            context,
        }
    }

    /// Fully-qualified name of the running command.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.values
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    /// Positionals no declaration claimed (`_`).
    pub fn rest(&self) -> Vec<&str> {
        self.values
            .get("_")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn context(&self) -> &'a ExecutionContext {
        self.context
    }

    pub fn into_values(self) -> Map<String, Value> {
        self.values
    }
}

impl fmt::Debug for Arguments<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("command", &self.command)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

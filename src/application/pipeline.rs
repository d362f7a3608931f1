//! The outer driver: hooks, discovery, execution and error reporting.

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::configuration::{Configuration, RawConfiguration};
use crate::application::context::{ExecutionContext, ExecutionResult, PackageInfo};
use crate::application::discovery::TreeDiscoverer;
use crate::application::program::ProgramNode;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::ProgramType;
use crate::exitcode;
use crate::infrastructure::modules::ModuleLoader;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Causes printed below an error message.
pub const MAX_CAUSE_DEPTH: usize = 10;

/// Width assumed when the terminal size is unknown.
pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

pub type ArgumentsHook = Box<dyn Fn(Vec<String>, &ExecutionContext) -> Option<Vec<String>>>;
pub type ExecutionContextHook = Box<dyn Fn(ExecutionContext) -> Option<ExecutionContext>>;
pub type PrologueHook = Box<dyn Fn(&ExecutionContext)>;
pub type EpilogueHook =
    Box<dyn Fn(ExecutionResult, &ExecutionContext) -> Option<ExecutionResult>>;
pub type ErrorEpilogueHook =
    Box<dyn Fn(&ErrorReport, &ApplicationError, Option<&ExecutionResult>, &ExecutionContext)>;

/// Caller-overridable steps of the pipeline.
///
/// Hooks returning `Option` must return `Some`; `None` aborts the run with an
/// assertion failure.
pub struct ConfigurationHooks {
    pub configure_arguments: ArgumentsHook,
    pub configure_execution_context: ExecutionContextHook,
    pub configure_execution_prologue: PrologueHook,
    pub configure_execution_epilogue: EpilogueHook,
    pub configure_error_handling_epilogue: ErrorEpilogueHook,
}

impl Default for ConfigurationHooks {
    fn default() -> Self {
        Self {
            configure_arguments: Box::new(|argv, _| Some(argv)),
            configure_execution_context: Box::new(|context| Some(context)),
            configure_execution_prologue: Box::new(|_| {}),
            configure_execution_epilogue: Box::new(|result, _| Some(result)),
            configure_error_handling_epilogue: Box::new(|report, _, _, _| {
                eprintln!("{}", report);
            }),
        }
    }
}

impl ConfigurationHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arguments<F>(mut self, hook: F) -> Self
    where
        F: Fn(Vec<String>, &ExecutionContext) -> Option<Vec<String>> + 'static,
    {
        self.configure_arguments = Box::new(hook);
        self
    }

    pub fn with_execution_context<F>(mut self, hook: F) -> Self
    where
        F: Fn(ExecutionContext) -> Option<ExecutionContext> + 'static,
    {
        self.configure_execution_context = Box::new(hook);
        self
    }

    pub fn with_execution_prologue<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ExecutionContext) + 'static,
    {
        self.configure_execution_prologue = Box::new(hook);
        self
    }

    pub fn with_execution_epilogue<F>(mut self, hook: F) -> Self
    where
        F: Fn(ExecutionResult, &ExecutionContext) -> Option<ExecutionResult> + 'static,
    {
        self.configure_execution_epilogue = Box::new(hook);
        self
    }

    pub fn with_error_handling_epilogue<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ErrorReport, &ApplicationError, Option<&ExecutionResult>, &ExecutionContext) + 'static,
    {
        self.configure_error_handling_epilogue = Box::new(hook);
        self
    }
}

impl fmt::Debug for ConfigurationHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfigurationHooks { .. }")
    }
}

/// A failed run, as handed to the error-handling epilogue alongside the
/// error itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    pub suggested_exit_code: i32,
    /// Messages of the error's causes, outermost first
    pub chain: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(error: &ApplicationError) -> Self {
        let mut chain = Vec::new();
        let mut cause = error.source();
        while let Some(e) = cause {
            if chain.len() == MAX_CAUSE_DEPTH {
                break;
            }
            chain.push(e.to_string());
            cause = e.source();
        }
        Self {
            message: error.to_string(),
            suggested_exit_code: error.suggested_exit_code(),
            chain,
        }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for cause in &self.chain {
            write!(f, "\n  caused by: {}", cause)?;
        }
        Ok(())
    }
}

/// Everything needed to configure a program.
pub struct ProgramOptions {
    pub package: PackageInfo,
    /// Directory to discover commands from; `None` skips discovery
    pub commands_dir: Option<PathBuf>,
    /// Root configuration used when discovery registers no root
    pub root: Option<RawConfiguration>,
    pub hooks: ConfigurationHooks,
    pub modules: Arc<dyn ModuleLoader>,
    pub fs: Arc<dyn FileSystem>,
    pub terminal_width: usize,
}

impl ProgramOptions {
    pub fn new(package: PackageInfo, modules: Arc<dyn ModuleLoader>) -> Self {
        Self {
            package,
            commands_dir: None,
            root: None,
            hooks: ConfigurationHooks::default(),
            modules,
            fs: Arc::new(RealFileSystem),
            terminal_width: DEFAULT_TERMINAL_WIDTH,
        }
    }

    pub fn commands_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.commands_dir = Some(dir.into());
        self
    }

    pub fn root(mut self, root: RawConfiguration) -> Self {
        self.root = Some(root);
        self
    }

    pub fn hooks(mut self, hooks: ConfigurationHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn terminal_width(mut self, width: usize) -> Self {
        self.terminal_width = width;
        self
    }
}

/// A configured program, ready to execute argument vectors.
#[derive(Debug)]
pub struct PreparedProgram {
    context: ExecutionContext,
    hooks: ConfigurationHooks,
    fallback_root: Option<ProgramNode>,
}

/// Build the execution context, discover commands and flush deferred
/// registrations.
pub fn configure(options: ProgramOptions) -> ApplicationResult<PreparedProgram> {
    let ProgramOptions {
        package,
        commands_dir,
        root,
        hooks,
        modules,
        fs,
        terminal_width,
    } = options;

    let context = ExecutionContext::new(package, terminal_width);
    let mut context = (hooks.configure_execution_context)(context).ok_or_else(|| {
        ApplicationError::assertion("configure_execution_context hook returned no context")
    })?;
    let log = context.debug.extend("configure");

    match &commands_dir {
        Some(dir) => {
            log.message(format_args!("discovering commands in {}", dir.display()));
            TreeDiscoverer::new(fs, modules).discover(dir, &mut context)?;
        }
        None => log.message(format_args!("no commands directory, skipping discovery")),
    }

    (hooks.configure_execution_prologue)(&context);

    for registered in context.commands.values_mut() {
        registered.program.adapter_mut().finalize_deferred_commands()?;
    }

    let fallback_root = if context.commands.is_empty() {
        let root_configuration =
            Configuration::normalize(root.unwrap_or_default(), &context.package.name)?;
        let name = root_configuration.name.clone();
        let mut node = ProgramNode::build(name, root_configuration, ProgramType::Root, &context)?;
        node.adapter_mut().force_strict(true);
        Some(node)
    } else {
        None
    };

    log.message(format_args!("{} command(s) registered", context.commands.len()));
    Ok(PreparedProgram {
        context,
        hooks,
        fallback_root,
    })
}

impl PreparedProgram {
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    fn root(&self) -> ApplicationResult<&ProgramNode> {
        self.context
            .root()
            .map(|registered| &registered.program)
            .or(self.fallback_root.as_ref())
            .ok_or_else(|| ApplicationError::assertion("no root program"))
    }

    /// Run `argv` (without the binary name) through the command tree.
    ///
    /// Errors other than a graceful exit are reported to the error-handling
    /// epilogue, together with any result a deeper command produced, and then
    /// returned.
    pub fn execute(&self, argv: Vec<String>) -> ApplicationResult<ExecutionResult> {
        let log = self.context.debug.extend("execute");
        match self.run(argv) {
            Ok(result) => Ok(result),
            Err(e) if e.is_graceful_exit() => {
                log.message(format_args!("graceful early exit"));
                Err(e)
            }
            Err(e) => {
                let report = ErrorReport::from_error(&e);
                log.error(format_args!("{}", report.message));
                let partial = self.context.state.deepest_result();
                (self.hooks.configure_error_handling_epilogue)(
                    &report,
                    &e,
                    partial.as_ref(),
                    &self.context,
                );
                Err(e)
            }
        }
    }

    fn run(&self, argv: Vec<String>) -> ApplicationResult<ExecutionResult> {
        let argv = (self.hooks.configure_arguments)(argv, &self.context).ok_or_else(|| {
            ApplicationError::assertion("configure_arguments hook returned no arguments")
        })?;
        self.context.state.reset(argv);

        let own = self.root()?.parse(&self.context)?;
        let result = self.context.state.deepest_result().unwrap_or(own);

        (self.hooks.configure_execution_epilogue)(result, &self.context).ok_or_else(|| {
            ApplicationError::assertion("configure_execution_epilogue hook returned no result")
        })
    }
}

/// Configure and execute, mapping the outcome to a process exit code.
pub fn run_program(options: ProgramOptions, argv: Vec<String>) -> i32 {
    let prepared = match configure(options) {
        Ok(prepared) => prepared,
        Err(e) => {
            eprintln!("{}", ErrorReport::from_error(&e));
            return e.suggested_exit_code();
        }
    };
    match prepared.execute(argv) {
        Ok(_) => exitcode::OK,
        Err(e) => e.suggested_exit_code(),
    }
}

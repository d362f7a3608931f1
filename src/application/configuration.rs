//! Command configuration: the raw shape a module exports and the normalized,
//! validated record a program is built from.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::application::context::{Arguments, ExecutionContext};
use crate::application::program::ProgramAdapter;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    capitalize_first, parse_command, validate_name, OptionSpec, PositionalSpec, DEFAULT_COMMAND,
};

/// Usage template. `$000` expands to the command's full usage line,
/// `$1` to its description.
pub const DEFAULT_USAGE: &str = "Usage: $000\n\n$1";

pub const DEFAULT_DESCRIPTION: &str = "";

/// Runs a command once its arguments have been parsed.
pub type Handler = Arc<dyn Fn(&Arguments<'_>) -> ApplicationResult<Value> + Send + Sync>;

/// Declares a command's flags programmatically.
pub type BuilderFn =
    Arc<dyn Fn(&mut ProgramAdapter, &ExecutionContext) -> ApplicationResult<()> + Send + Sync>;

/// Produces a raw configuration from the live execution context.
pub type FactoryFn =
    Arc<dyn Fn(&ExecutionContext) -> ApplicationResult<RawConfiguration> + Send + Sync>;

/// How a command declares its flags.
#[derive(Clone)]
pub enum Builder {
    Options(IndexMap<String, OptionSpec>),
    Function(BuilderFn),
}

impl Default for Builder {
    fn default() -> Self {
        Builder::Options(IndexMap::new())
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Builder::Options(options) => f.debug_tuple("Options").field(options).finish(),
            Builder::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Description as written in a module: text, or `false` to hide the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description {
    Text(String),
    Hidden,
}

/// What a module exports before defaults are applied.
#[derive(Clone, Default)]
pub struct RawConfiguration {
    pub name: Option<String>,
    pub aliases: Vec<String>,
    pub command: Option<String>,
    pub description: Option<Description>,
    pub usage: Option<String>,
    pub deprecated: bool,
    pub builder: Option<Builder>,
    pub handler: Option<Handler>,
}

impl RawConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Description::Text(description.into()));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.description = Some(Description::Hidden);
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    /// Add a flag; switches the builder to the options form if needed.
    pub fn option(mut self, name: impl Into<String>, spec: OptionSpec) -> Self {
        match &mut self.builder {
            Some(Builder::Options(options)) => {
                options.insert(name.into(), spec);
            }
            _ => {
                let mut options = IndexMap::new();
                options.insert(name.into(), spec);
                self.builder = Some(Builder::Options(options));
            }
        }
        self
    }

    pub fn builder<F>(mut self, builder: F) -> Self
    where
        F: Fn(&mut ProgramAdapter, &ExecutionContext) -> ApplicationResult<()>
            + Send
            + Sync
            + 'static,
    {
        self.builder = Some(Builder::Function(Arc::new(builder)));
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Arguments<'_>) -> ApplicationResult<Value> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }
}

impl fmt::Debug for RawConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawConfiguration")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("command", &self.command)
            .field("description", &self.description)
            .field("deprecated", &self.deprecated)
            .field("handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

/// What loading a module yields: either the configuration itself or a
/// function producing it from the execution context.
#[derive(Clone)]
pub enum ConfigurationSource {
    Static(RawConfiguration),
    Factory(FactoryFn),
}

impl ConfigurationSource {
    /// Resolve to a raw configuration. Factory failures are fatal.
    pub fn resolve(self, context: &ExecutionContext) -> ApplicationResult<RawConfiguration> {
        match self {
            ConfigurationSource::Static(raw) => Ok(raw),
            ConfigurationSource::Factory(factory) => factory(context),
        }
    }
}

impl fmt::Debug for ConfigurationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationSource::Static(raw) => f.debug_tuple("Static").field(raw).finish(),
            ConfigurationSource::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Normalized, validated description of one command node. Never mutated after
/// construction.
#[derive(Clone)]
pub struct Configuration {
    pub name: String,
    pub aliases: Vec<String>,
    pub command: String,
    pub positionals: Vec<PositionalSpec>,
    pub description: String,
    /// Hidden commands are omitted from their parent's command listing
    pub hidden: bool,
    pub usage: String,
    pub deprecated: bool,
    pub builder: Builder,
    pub handler: Handler,
}

impl Configuration {
    /// Apply defaults and enforce the naming rules.
    pub fn normalize(raw: RawConfiguration, default_name: &str) -> ApplicationResult<Self> {
        let name = raw.name.unwrap_or_else(|| default_name.to_string());
        validate_name(&name)?;
        for alias in &raw.aliases {
            validate_name(alias)?;
        }

        let command = raw.command.unwrap_or_else(|| DEFAULT_COMMAND.to_string());
        let positionals = parse_command(&command)?;

        let (description, hidden) = match raw.description {
            Some(Description::Text(text)) => (capitalize_first(&text), false),
            Some(Description::Hidden) => (DEFAULT_DESCRIPTION.to_string(), true),
            None => (DEFAULT_DESCRIPTION.to_string(), false),
        };
        let usage = capitalize_first(raw.usage.as_deref().unwrap_or(DEFAULT_USAGE));

        Ok(Self {
            name,
            aliases: raw.aliases,
            command,
            positionals,
            description,
            hidden,
            usage,
            deprecated: raw.deprecated,
            builder: raw.builder.unwrap_or_default(),
            handler: raw.handler.unwrap_or_else(not_implemented_handler),
        })
    }

    /// Whether `token` is this command's name or one of its aliases.
    pub fn answers_to(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|a| a == token)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("command", &self.command)
            .field("description", &self.description)
            .field("hidden", &self.hidden)
            .field("deprecated", &self.deprecated)
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

/// Installed when a configuration omits its handler.
pub fn not_implemented_handler() -> Handler {
    Arc::new(not_implemented)
}

fn not_implemented(_: &Arguments<'_>) -> ApplicationResult<Value> {
    Err(ApplicationError::NotImplemented)
}

/// Named callables that declarative modules refer to.
#[derive(Clone, Default)]
pub struct Callables {
    handlers: HashMap<String, Handler>,
    builders: HashMap<String, BuilderFn>,
    factories: HashMap<String, FactoryFn>,
}

impl Callables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Arguments<'_>) -> ApplicationResult<Value> + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn with_builder<F>(mut self, name: impl Into<String>, builder: F) -> Self
    where
        F: Fn(&mut ProgramAdapter, &ExecutionContext) -> ApplicationResult<()>
            + Send
            + Sync
            + 'static,
    {
        self.builders.insert(name.into(), Arc::new(builder));
        self
    }

    pub fn with_factory<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ExecutionContext) -> ApplicationResult<RawConfiguration> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn handler(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).cloned()
    }

    pub fn builder(&self, name: &str) -> Option<BuilderFn> {
        self.builders.get(name).cloned()
    }

    pub fn factory(&self, name: &str) -> Option<FactoryFn> {
        self.factories.get(name).cloned()
    }
}

impl fmt::Debug for Callables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<_> = self.handlers.keys().collect();
        handlers.sort();
        f.debug_struct("Callables")
            .field("handlers", &handlers)
            .field("builders", &self.builders.len())
            .field("factories", &self.factories.len())
            .finish()
    }
}

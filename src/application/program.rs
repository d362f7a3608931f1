//! Programs: one argument parser per discovered command.
//!
//! A program is driven through two instance kinds:
//! - [`ProgramAdapter`], the delegating instance every node owns. It collects
//!   option declarations and proxy commands, and matches child commands.
//!   It refuses the strictness setters.
//! - [`ShadowProgram`], a direct instance cloned from the adapter right before
//!   a node runs its own handler. Only the shadow accepts strictness setters,
//!   and only the shadow parses arguments.

use clap::builder::PossibleValuesParser;
use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use tracing::{debug, trace};

use crate::application::configuration::{Builder, Configuration};
use crate::application::context::{Arguments, ExecutionContext, ExecutionResult};
use crate::application::dispatch;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{natural_cmp, OptionKind, OptionSpec, PositionalSpec, ProgramType, DEFAULT_COMMAND};

/// Key under which surplus positionals are collected.
pub const REST_KEY: &str = "_";
/// Key under which the running command's name is reported.
pub const SCRIPT_KEY: &str = "$0";

const REST_ID: &str = "__rest";
const HELP_ID: &str = "help";

/// Strict-mode policy: `strict` implies both of the narrower settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Strictness {
    pub strict: bool,
    pub commands: bool,
    pub options: bool,
}

impl Strictness {
    pub fn all(enabled: bool) -> Self {
        Self {
            strict: enabled,
            commands: enabled,
            options: enabled,
        }
    }

    pub fn rejects_unknown_options(&self) -> bool {
        self.strict || self.options
    }

    pub fn rejects_unknown_commands(&self) -> bool {
        self.strict || self.commands
    }

    pub fn is_lax(&self) -> bool {
        !self.rejects_unknown_options() && !self.rejects_unknown_commands()
    }
}

/// Strictness setters. Only permitted on a shadow instance.
pub trait StrictnessControl {
    fn strict(&mut self, enabled: bool) -> ApplicationResult<()>;
    fn strict_commands(&mut self, enabled: bool) -> ApplicationResult<()>;
    fn strict_options(&mut self, enabled: bool) -> ApplicationResult<()>;
}

/// Who renders `--help`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HelpMode {
    /// clap's own help flag (leaf commands)
    #[default]
    BuiltIn,
    /// A `--help` option rendered by the program, listing its child commands
    Custom,
}

/// A child command registered on its parent. Invoking it hands the rest of
/// argv to the program named by `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCommand {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub hidden: bool,
    pub deprecated: bool,
    /// Fully-qualified name of the child program
    pub target: String,
}

impl ProxyCommand {
    pub fn for_child(configuration: &Configuration, target: impl Into<String>) -> Self {
        Self {
            name: configuration.name.clone(),
            aliases: configuration.aliases.clone(),
            description: configuration.description.clone(),
            hidden: configuration.hidden,
            deprecated: configuration.deprecated,
            target: target.into(),
        }
    }

    pub fn answers_to(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|a| a == token)
    }

    fn help_line(&self) -> String {
        let mut line = self.description.clone();
        if !self.aliases.is_empty() {
            line.push_str(&format!(" [aliases: {}]", self.aliases.join(", ")));
        }
        if self.deprecated {
            line.push_str(" [deprecated]");
        }
        line.trim().to_string()
    }
}

/// What a parse produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(Map<String, Value>),
    Help(String),
    Version(String),
}

/// Parser declarations shared by both instance kinds.
#[derive(Debug, Clone, Default)]
struct ParserSpec {
    script_name: String,
    usage: String,
    description: String,
    options: IndexMap<String, OptionSpec>,
    positionals: Vec<PositionalSpec>,
    help: HelpMode,
    version: Option<String>,
    wrap: Option<usize>,
}

impl ParserSpec {
    /// `$000` replacement: the command line this program accepts.
    fn usage_line(&self) -> String {
        let mut line = self.script_name.clone();
        for positional in &self.positionals {
            line.push(' ');
            line.push_str(&positional.syntax());
        }
        line
    }

    fn rendered_usage(&self) -> String {
        self.usage
            .replace("$000", &self.usage_line())
            .replace("$1", &self.description)
            .trim_end()
            .to_string()
    }

    fn build_command(&self, strictness: Strictness) -> Command {
        let mut cmd = Command::new(self.script_name.clone())
            .no_binary_name(true)
            .disable_help_subcommand(true)
            .help_template(format!("{}\n\n{{all-args}}", self.rendered_usage()));

        if let Some(width) = self.wrap {
            cmd = cmd.term_width(width);
        }
        cmd = match &self.version {
            Some(version) => cmd.version(version.clone()),
            None => cmd.disable_version_flag(true),
        };
        if self.help == HelpMode::Custom {
            cmd = cmd.disable_help_flag(true).arg(
                Arg::new(HELP_ID)
                    .long("help")
                    .short('h')
                    .action(ArgAction::SetTrue)
                    .help("Show help text"),
            );
        }

        for (name, spec) in &self.options {
            cmd = cmd.arg(option_arg(name, spec));
        }
        for (index, positional) in self.positionals.iter().enumerate() {
            let mut arg = Arg::new(positional.name.clone())
                .index(index + 1)
                .value_name(positional.name.clone())
                .required(positional.required);
            if positional.variadic {
                arg = arg.num_args(1..).action(ArgAction::Append);
            }
            cmd = cmd.arg(arg);
        }

        let ends_variadic = self.positionals.last().is_some_and(|p| p.variadic);
        if !strictness.rejects_unknown_commands() && !ends_variadic {
            cmd = cmd.arg(
                Arg::new(REST_ID)
                    .index(self.positionals.len() + 1)
                    .num_args(1..)
                    .action(ArgAction::Append)
                    .required(false)
                    .hide(true),
            );
        }
        cmd
    }

    fn is_builtin_short(&self, short: char) -> bool {
        short == 'h' || (short == 'V' && self.version.is_some())
    }

    /// The declared part of an option token, and whether it takes the next
    /// token as its value. `None` when the token declares nothing.
    ///
    /// In a short cluster (`-vz`) undeclared letters are dropped; a
    /// value-taking letter ends the cluster and the rest is its value.
    fn declared_option(&self, token: &str) -> Option<(String, bool)> {
        if let Some(long) = token.strip_prefix("--") {
            let (flag, inline_value) = match long.split_once('=') {
                Some((flag, _)) => (flag, true),
                None => (long, false),
            };
            if flag == "help" || (flag == "version" && self.version.is_some()) {
                return Some((token.to_string(), false));
            }
            let (_, spec) = self
                .options
                .iter()
                .find(|(name, spec)| spec.matches_long(name, flag))?;
            return Some((token.to_string(), spec.takes_value() && !inline_value));
        }

        let cluster = token.strip_prefix('-')?;
        let mut kept = String::from("-");
        for (index, short) in cluster.char_indices() {
            if self.is_builtin_short(short) {
                kept.push(short);
                continue;
            }
            let Some(spec) = self.options.values().find(|s| s.shorts().any(|c| c == short)) else {
                continue;
            };
            kept.push(short);
            if spec.takes_value() {
                let value = &cluster[index + short.len_utf8()..];
                kept.push_str(value);
                return Some((kept, value.is_empty()));
            }
        }
        (kept.len() > 1).then_some((kept, false))
    }

    /// Drop option tokens this program does not declare. `--` and everything
    /// after it is kept as-is, as is the value of a declared option.
    fn retain_known_options(&self, tokens: &[String]) -> Vec<String> {
        let mut kept = Vec::with_capacity(tokens.len());
        let mut tokens = tokens.iter();
        while let Some(token) = tokens.next() {
            if token == "--" {
                kept.push(token.clone());
                kept.extend(tokens.cloned());
                break;
            }
            if !is_option_token(token) {
                kept.push(token.clone());
                continue;
            }
            match self.declared_option(token) {
                Some((declared, takes_value)) => {
                    if &declared != token {
                        trace!("{}: narrowed {} to {}", self.script_name, token, declared);
                    }
                    kept.push(declared);
                    if takes_value {
                        kept.extend(tokens.next().cloned());
                    }
                }
                None => trace!("{}: ignoring unknown option {}", self.script_name, token),
            }
        }
        kept
    }

    fn collect_values(&self, matches: &ArgMatches) -> Map<String, Value> {
        let mut values = Map::new();

        for (name, spec) in &self.options {
            let id = name.as_str();
            let value = match spec.kind {
                OptionKind::Boolean => {
                    let default = spec.default.as_ref().and_then(Value::as_bool).unwrap_or(false);
                    Some(Value::Bool(matches.get_flag(id) || default))
                }
                OptionKind::Count => Some(Value::from(matches.get_count(id))),
                OptionKind::Number => matches
                    .get_one::<f64>(id)
                    .copied()
                    .and_then(Number::from_f64)
                    .map(Value::Number),
                OptionKind::Array => matches
                    .get_many::<String>(id)
                    .map(|items| Value::Array(items.cloned().map(Value::String).collect())),
                OptionKind::String => matches.get_one::<String>(id).cloned().map(Value::String),
            };
            if let Some(value) = value {
                values.insert(name.clone(), value);
            }
        }

        for positional in &self.positionals {
            let id = positional.name.as_str();
            let value = if positional.variadic {
                matches
                    .get_many::<String>(id)
                    .map(|items| Value::Array(items.cloned().map(Value::String).collect()))
            } else {
                matches.get_one::<String>(id).cloned().map(Value::String)
            };
            if let Some(value) = value {
                values.insert(positional.name.clone(), value);
            }
        }

        let rest: Vec<Value> = matches
            .try_get_many::<String>(REST_ID)
            .ok()
            .flatten()
            .map(|items| items.cloned().map(Value::String).collect())
            .unwrap_or_default();
        values.insert(REST_KEY.to_string(), Value::Array(rest));
        values.insert(
            SCRIPT_KEY.to_string(),
            Value::String(self.script_name.clone()),
        );
        values
    }
}

fn option_arg(name: &str, spec: &OptionSpec) -> Arg {
    let mut arg = Arg::new(name.to_string()).long(name.to_string());

    let mut shorts = spec.shorts();
    if let Some(short) = shorts.next() {
        arg = arg.short(short);
    }
    for short in shorts {
        arg = arg.short_alias(short);
    }
    for alias in spec.alias.iter().filter(|a| a.chars().count() > 1) {
        arg = arg.visible_alias(alias.clone());
    }
    if let Some(description) = &spec.description {
        arg = arg.help(description.clone());
    }
    arg = arg.required(spec.required).hide(spec.hidden);

    arg = match spec.kind {
        OptionKind::Boolean => arg.action(ArgAction::SetTrue),
        OptionKind::Count => arg.action(ArgAction::Count),
        OptionKind::Number => arg.action(ArgAction::Set).value_parser(value_parser!(f64)),
        OptionKind::Array => arg.action(ArgAction::Append),
        OptionKind::String => arg.action(ArgAction::Set),
    };
    if spec.kind == OptionKind::String && !spec.choices.is_empty() {
        arg = arg.value_parser(PossibleValuesParser::new(spec.choices.clone()));
    }

    match (&spec.default, spec.kind) {
        (None, _) | (Some(_), OptionKind::Boolean | OptionKind::Count) => arg,
        (Some(Value::Array(items)), OptionKind::Array) => {
            arg.default_values(items.iter().map(value_to_string))
        }
        (Some(value), _) => arg.default_value(value_to_string(value)),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `-x`, `--long`, `--long=value`; not `-`, and not negative numbers.
fn is_option_token(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && token.parse::<f64>().is_err()
}

fn wants_help(tokens: &[String]) -> bool {
    tokens
        .iter()
        .take_while(|t| t.as_str() != "--")
        .any(|t| t == "--help" || t == "-h")
}

/// The delegating instance a node owns for its whole lifetime.
#[derive(Debug, Clone)]
pub struct ProgramAdapter {
    spec: ParserSpec,
    strictness: Strictness,
    deferred: Vec<ProxyCommand>,
    commands: Vec<ProxyCommand>,
}

impl ProgramAdapter {
    pub fn new(script_name: impl Into<String>) -> Self {
        Self {
            spec: ParserSpec {
                script_name: script_name.into(),
                ..ParserSpec::default()
            },
            strictness: Strictness::default(),
            deferred: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn script_name(&self) -> &str {
        &self.spec.script_name
    }

    pub fn option(&mut self, name: impl Into<String>, spec: OptionSpec) -> &mut Self {
        self.spec.options.insert(name.into(), spec);
        self
    }

    pub fn positional(&mut self, positional: PositionalSpec) -> &mut Self {
        self.spec.positionals.push(positional);
        self
    }

    pub fn usage(&mut self, usage: impl Into<String>) -> &mut Self {
        self.spec.usage = usage.into();
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.spec.description = description.into();
        self
    }

    pub fn wrap(&mut self, width: Option<usize>) -> &mut Self {
        self.spec.wrap = width;
        self
    }

    pub fn version(&mut self, version: Option<String>) -> &mut Self {
        self.spec.version = version;
        self
    }

    pub fn help_mode(&mut self, mode: HelpMode) -> &mut Self {
        self.spec.help = mode;
        self
    }

    pub fn current_help_mode(&self) -> HelpMode {
        self.spec.help
    }

    pub fn options(&self) -> &IndexMap<String, OptionSpec> {
        &self.spec.options
    }

    /// Queue a child command; registered by [`Self::finalize_deferred_commands`].
    pub fn add_deferred_command(&mut self, command: ProxyCommand) {
        self.deferred.push(command);
    }

    pub fn deferred_commands(&self) -> &[ProxyCommand] {
        &self.deferred
    }

    /// Register queued child commands in natural order of their names, so
    /// help output does not depend on directory enumeration order.
    pub fn finalize_deferred_commands(&mut self) -> ApplicationResult<()> {
        let mut pending = std::mem::take(&mut self.deferred);
        pending.sort_by(|a, b| natural_cmp(&a.name, &b.name));

        if let Some(default) = pending.iter().find(|c| c.name == DEFAULT_COMMAND) {
            return Err(ApplicationError::assertion(format!(
                "{}: the default command cannot be registered as a child command (target {})",
                self.spec.script_name, default.target
            )));
        }

        debug!(
            "{}: registering {} child command(s)",
            self.spec.script_name,
            pending.len()
        );
        self.commands.extend(pending);
        Ok(())
    }

    /// Registered child commands, in registration order.
    pub fn commands(&self) -> &[ProxyCommand] {
        &self.commands
    }

    /// Select the child command named by the first non-option token that is
    /// not the value of a declared option.
    pub fn match_command(&self, tokens: &[String]) -> Option<&ProxyCommand> {
        let mut tokens = tokens.iter().take_while(|t| t.as_str() != "--");
        while let Some(token) = tokens.next() {
            if !is_option_token(token) {
                return self.commands.iter().find(|c| c.answers_to(token));
            }
            if let Some((_, true)) = self.spec.declared_option(token) {
                tokens.next();
            }
        }
        None
    }

    /// Set strict, strict-commands and strict-options together.
    pub fn force_strict(&mut self, enabled: bool) {
        self.strictness = Strictness::all(enabled);
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// A direct instance with the same declarations and relaxed strictness.
    pub fn shadow_clone(&self) -> ShadowProgram {
        ShadowProgram {
            spec: self.spec.clone(),
            strictness: Strictness::default(),
        }
    }

    /// Help text with a listing of visible child commands.
    pub fn render_help(&self) -> String {
        let mut help = self
            .spec
            .build_command(self.strictness)
            .render_help()
            .to_string();

        let visible: Vec<&ProxyCommand> = self.commands.iter().filter(|c| !c.hidden).collect();
        if !visible.is_empty() {
            let width = visible.iter().map(|c| c.name.len()).max().unwrap_or(0);
            help.push_str("\nCommands:\n");
            for command in visible {
                let line = format!("  {:<width$}  {}", command.name, command.help_line());
                help.push_str(line.trim_end());
                help.push('\n');
            }
        }
        help
    }
}

impl StrictnessControl for ProgramAdapter {
    fn strict(&mut self, _enabled: bool) -> ApplicationResult<()> {
        Err(shadow_only(&self.spec.script_name, "strict"))
    }

    fn strict_commands(&mut self, _enabled: bool) -> ApplicationResult<()> {
        Err(shadow_only(&self.spec.script_name, "strict_commands"))
    }

    fn strict_options(&mut self, _enabled: bool) -> ApplicationResult<()> {
        Err(shadow_only(&self.spec.script_name, "strict_options"))
    }
}

fn shadow_only(script_name: &str, method: &str) -> ApplicationError {
    ApplicationError::assertion(format!(
        "{}: {}() may only be called on a shadow instance; use force_strict() to set the policy",
        script_name, method
    ))
}

/// The direct instance that parses arguments for a node's own handler.
#[derive(Debug, Clone)]
pub struct ShadowProgram {
    spec: ParserSpec,
    strictness: Strictness,
}

impl ShadowProgram {
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Parse `tokens` according to the current strictness.
    pub fn parse(&self, tokens: &[String]) -> ApplicationResult<ParseOutcome> {
        let tokens = if self.strictness.rejects_unknown_options() {
            tokens.to_vec()
        } else {
            self.spec.retain_known_options(tokens)
        };

        let command = self.spec.build_command(self.strictness);
        match command.try_get_matches_from(tokens) {
            Ok(matches) => Ok(ParseOutcome::Parsed(self.spec.collect_values(&matches))),
            Err(e) => match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                    Ok(ParseOutcome::Help(e.render().to_string()))
                }
                ErrorKind::DisplayVersion => Ok(ParseOutcome::Version(e.render().to_string())),
                _ => Err(ApplicationError::command(e.render().to_string().trim_end())),
            },
        }
    }
}

impl StrictnessControl for ShadowProgram {
    fn strict(&mut self, enabled: bool) -> ApplicationResult<()> {
        self.strictness.strict = enabled;
        Ok(())
    }

    fn strict_commands(&mut self, enabled: bool) -> ApplicationResult<()> {
        self.strictness.commands = enabled;
        Ok(())
    }

    fn strict_options(&mut self, enabled: bool) -> ApplicationResult<()> {
        self.strictness.options = enabled;
        Ok(())
    }
}

/// A discovered command: its configuration and its delegating instance.
#[derive(Debug)]
pub struct ProgramNode {
    full_name: String,
    role: ProgramType,
    configuration: Configuration,
    adapter: ProgramAdapter,
}

impl ProgramNode {
    /// Configure a node for its role.
    ///
    /// - root: like parent-child, plus `--version` from the host package
    /// - parent-child: custom help listing children, lax parsing
    /// - child: built-in help, strict parsing
    pub fn build(
        full_name: impl Into<String>,
        configuration: Configuration,
        role: ProgramType,
        context: &ExecutionContext,
    ) -> ApplicationResult<Self> {
        let full_name = full_name.into();
        let mut adapter = ProgramAdapter::new(full_name.clone());
        adapter
            .usage(configuration.usage.clone())
            .description(configuration.description.clone())
            .wrap(Some(context.state.terminal_width));
        for positional in &configuration.positionals {
            adapter.positional(positional.clone());
        }

        match role {
            ProgramType::Root => {
                adapter
                    .help_mode(HelpMode::Custom)
                    .version(context.package.version.clone());
            }
            ProgramType::ParentChild => {
                adapter.help_mode(HelpMode::Custom).version(None);
            }
            ProgramType::Child => {
                adapter.help_mode(HelpMode::BuiltIn).version(None);
            }
        }
        adapter.force_strict(role == ProgramType::Child);

        match &configuration.builder {
            Builder::Options(options) => {
                for (name, spec) in options {
                    adapter.option(name.clone(), spec.clone());
                }
            }
            Builder::Function(builder) => {
                builder(&mut adapter, context)?;
            }
        }

        Ok(Self {
            full_name,
            role,
            configuration,
            adapter,
        })
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn role(&self) -> ProgramType {
        self.role
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn adapter(&self) -> &ProgramAdapter {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut ProgramAdapter {
        &mut self.adapter
    }

    /// Parse the unconsumed argv: hand off to a matching child command, or
    /// run this program's own handler.
    pub fn parse(&self, context: &ExecutionContext) -> ApplicationResult<ExecutionResult> {
        let tokens = context.state.remaining_argv();
        if let Some(proxy) = self.adapter.match_command(&tokens) {
            return dispatch::forward(self, proxy, context);
        }
        self.run_default_command(&tokens, context)
    }

    fn run_default_command(
        &self,
        tokens: &[String],
        context: &ExecutionContext,
    ) -> ApplicationResult<ExecutionResult> {
        let log = context.debug.extend("execute");

        if self.adapter.current_help_mode() == HelpMode::Custom && wants_help(tokens) {
            context.state.consume_argv();
            print!("{}", self.adapter.render_help());
            return Err(ApplicationError::GracefulEarlyExit);
        }

        let policy = self.adapter.strictness();
        let mut shadow = self.adapter.shadow_clone();
        shadow.strict(policy.strict)?;
        shadow.strict_commands(policy.commands)?;
        shadow.strict_options(policy.options)?;

        log.message(format_args!(
            "{}: parsing {:?} (strict: {})",
            self.full_name,
            tokens,
            !shadow.strictness().is_lax()
        ));
        let outcome = shadow.parse(tokens)?;
        context.state.consume_argv();

        match outcome {
            ParseOutcome::Help(text) | ParseOutcome::Version(text) => {
                print!("{}", text);
                Err(ApplicationError::GracefulEarlyExit)
            }
            ParseOutcome::Parsed(values) => {
                if self.configuration.deprecated {
                    log.warn(format_args!("command \"{}\" is deprecated", self.full_name));
                }
                let arguments = Arguments::new(self.full_name.clone(), values, context);
                let output = (self.configuration.handler)(&arguments)?;
                Ok(ExecutionResult {
                    command: self.full_name.clone(),
                    arguments: arguments.into_values(),
                    output,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn proxy(name: &str) -> ProxyCommand {
        ProxyCommand {
            name: name.into(),
            aliases: vec![],
            description: String::new(),
            hidden: false,
            deprecated: false,
            target: format!("root {}", name),
        }
    }

    #[test]
    fn test_finalize_sorts_naturally() {
        let mut adapter = ProgramAdapter::new("root");
        for name in ["zone10", "zone2", "alpha", "Zone1"] {
            adapter.add_deferred_command(proxy(name));
        }
        adapter.finalize_deferred_commands().unwrap();

        let names: Vec<&str> = adapter.commands().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Zone1", "zone2", "zone10"]);
        assert!(adapter.deferred_commands().is_empty());
    }

    #[test]
    fn test_finalize_rejects_default_command() {
        let mut adapter = ProgramAdapter::new("root");
        adapter.add_deferred_command(proxy("$0"));
        assert!(matches!(
            adapter.finalize_deferred_commands(),
            Err(ApplicationError::AssertionFailed(_))
        ));
    }

    #[test]
    fn test_strictness_setters_only_on_shadow() {
        let mut adapter = ProgramAdapter::new("root");
        assert!(adapter.strict(true).is_err());
        assert!(adapter.strict_commands(true).is_err());
        assert!(adapter.strict_options(true).is_err());

        let mut shadow = adapter.shadow_clone();
        shadow.strict(true).unwrap();
        assert!(shadow.strictness().rejects_unknown_options());
    }

    #[test]
    fn test_match_command_uses_first_non_option_token() {
        let mut adapter = ProgramAdapter::new("root");
        adapter.add_deferred_command(proxy("sub"));
        adapter.finalize_deferred_commands().unwrap();

        assert!(adapter.match_command(&tokens(&["sub", "--flag"])).is_some());
        assert!(adapter.match_command(&tokens(&["--flag", "sub"])).is_some());
        assert!(adapter.match_command(&tokens(&["other", "sub"])).is_none());
        assert!(adapter.match_command(&tokens(&["--", "sub"])).is_none());
    }

    #[test]
    fn test_match_command_skips_values_of_declared_options() {
        let mut adapter = ProgramAdapter::new("root");
        adapter
            .option("zone", OptionSpec::new(OptionKind::String).alias("z"))
            .option("verbose", OptionSpec::new(OptionKind::Boolean).alias("v"));
        adapter.add_deferred_command(proxy("sub"));
        adapter.finalize_deferred_commands().unwrap();

        assert!(adapter.match_command(&tokens(&["--zone", "sub"])).is_none());
        assert!(adapter.match_command(&tokens(&["-vz", "sub"])).is_none());
        assert!(adapter.match_command(&tokens(&["--zone=x", "sub"])).is_some());
        assert!(adapter.match_command(&tokens(&["-zx", "sub"])).is_some());
        assert!(adapter.match_command(&tokens(&["--verbose", "sub"])).is_some());
    }

    #[test]
    fn test_lax_shadow_passes_tokens_after_double_dash() {
        let adapter = ProgramAdapter::new("root");
        let shadow = adapter.shadow_clone();

        let ParseOutcome::Parsed(values) = shadow
            .parse(&tokens(&["--bogus", "--", "--literal", "-x"]))
            .unwrap()
        else {
            panic!("expected parsed values");
        };
        assert_eq!(values[REST_KEY], serde_json::json!(["--literal", "-x"]));
    }

    #[test]
    fn test_lax_shadow_keeps_declared_letters_of_short_cluster() {
        let mut adapter = ProgramAdapter::new("root");
        adapter
            .option("verbose", OptionSpec::new(OptionKind::Boolean).alias("v"))
            .option("zone", OptionSpec::new(OptionKind::String).alias("z"));
        let shadow = adapter.shadow_clone();

        let ParseOutcome::Parsed(values) = shadow
            .parse(&tokens(&["-vx", "-xz", "example.com"]))
            .unwrap()
        else {
            panic!("expected parsed values");
        };
        assert_eq!(values["verbose"], Value::Bool(true));
        assert_eq!(values["zone"], Value::String("example.com".into()));
        assert_eq!(values[REST_KEY], serde_json::json!([]));
    }

    #[test]
    fn test_lax_shadow_ignores_unknown_input() {
        let mut adapter = ProgramAdapter::new("root");
        adapter.option("zone", OptionSpec::new(OptionKind::String).alias("z"));
        let shadow = adapter.shadow_clone();

        let outcome = shadow
            .parse(&tokens(&["--bogus", "-z", "example.com", "extra"]))
            .unwrap();
        let ParseOutcome::Parsed(values) = outcome else {
            panic!("expected parsed values");
        };
        assert_eq!(values["zone"], Value::String("example.com".into()));
        assert_eq!(values[REST_KEY], serde_json::json!(["extra"]));
        assert_eq!(values[SCRIPT_KEY], Value::String("root".into()));
    }

    #[test]
    fn test_strict_shadow_rejects_unknown_option() {
        let adapter = ProgramAdapter::new("root leaf");
        let mut shadow = adapter.shadow_clone();
        shadow.strict(true).unwrap();

        let err = shadow.parse(&tokens(&["--bogus"])).unwrap_err();
        assert!(matches!(err, ApplicationError::Command { .. }));
    }

    #[test]
    fn test_parse_typed_options_and_positionals() {
        let mut adapter = ProgramAdapter::new("root add");
        adapter
            .option("ttl", OptionSpec::new(OptionKind::Number).default_value(300))
            .option("proxied", OptionSpec::new(OptionKind::Boolean))
            .option("tag", OptionSpec::new(OptionKind::Array))
            .positional(PositionalSpec {
                name: "zone".into(),
                required: true,
                variadic: false,
            });
        let mut shadow = adapter.shadow_clone();
        shadow.strict(true).unwrap();

        let ParseOutcome::Parsed(values) = shadow
            .parse(&tokens(&["example.com", "--proxied", "--tag", "a", "--tag", "b"]))
            .unwrap()
        else {
            panic!("expected parsed values");
        };
        assert_eq!(values["zone"], serde_json::json!("example.com"));
        assert_eq!(values["ttl"].as_f64(), Some(300.0));
        assert_eq!(values["proxied"], Value::Bool(true));
        assert_eq!(values["tag"], serde_json::json!(["a", "b"]));
        assert_eq!(values[REST_KEY], serde_json::json!([]));
    }

    #[test]
    fn test_render_help_lists_visible_children() {
        let mut adapter = ProgramAdapter::new("root");
        adapter.usage("Usage: $000").help_mode(HelpMode::Custom);
        let mut hidden = proxy("secret");
        hidden.hidden = true;
        let mut listed = proxy("dns");
        listed.aliases = vec!["d".into()];
        adapter.add_deferred_command(hidden);
        adapter.add_deferred_command(listed);
        adapter.finalize_deferred_commands().unwrap();

        let help = adapter.render_help();
        assert!(help.contains("Usage: root"));
        assert!(help.contains("dns"));
        assert!(help.contains("[aliases: d]"));
        assert!(!help.contains("secret"));
    }
}

//! Tests for the execution pipeline: hooks, early exits and exit codes

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

use cmdtree::application::{
    configure, run_program, ApplicationError, Callables, ConfigurationHooks, ErrorReport,
    ExecutionResult, PackageInfo, ProgramOptions, RawConfiguration,
};
use cmdtree::domain::{OptionKind, OptionSpec};
use cmdtree::infrastructure::FileModuleLoader;
use cmdtree::util::testing::{init_test_setup, write_module};

/// What the error-handling epilogue saw.
type Reports = Rc<RefCell<Vec<(ErrorReport, Option<ExecutionResult>)>>>;

fn callables() -> Callables {
    Callables::new()
        .with_handler("ok", |args| Ok(json!({ "ran": args.command() })))
        .with_handler("fail", |_| {
            let cause = ApplicationError::command("connection refused");
            Err(ApplicationError::command_with_cause("cannot list zones", cause).with_exit_code(42))
        })
}

fn tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_module(temp.path(), "index.toml", "handler = \"ok\"\n");
    write_module(temp.path(), "list.toml", "handler = \"ok\"\ndescription = \"list zones\"\n");
    write_module(temp.path(), "todo.toml", "description = \"not there yet\"\n");
    write_module(temp.path(), "fail.toml", "handler = \"fail\"\n");
    temp
}

fn options(dir: &Path, hooks: ConfigurationHooks) -> ProgramOptions {
    init_test_setup();
    ProgramOptions::new(
        PackageInfo::new("root", Some("1.2.3".into())),
        Arc::new(FileModuleLoader::with_callables(callables())),
    )
    .commands_dir(dir)
    .hooks(hooks)
}

fn recording_hooks(reports: &Reports) -> ConfigurationHooks {
    let reports = reports.clone();
    ConfigurationHooks::new().with_error_handling_epilogue(move |report, _, partial, _| {
        reports
            .borrow_mut()
            .push((report.clone(), partial.cloned()));
    })
}

fn argv(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

#[test]
fn given_help_flag_when_running_then_exits_zero_without_error_epilogue() {
    // Arrange
    let temp = tree();
    let reports = Reports::default();

    // Act
    let root_help = run_program(options(temp.path(), recording_hooks(&reports)), argv(&["--help"]));
    let leaf_help = run_program(
        options(temp.path(), recording_hooks(&reports)),
        argv(&["list", "--help"]),
    );
    let version = run_program(
        options(temp.path(), recording_hooks(&reports)),
        argv(&["--version"]),
    );

    // Assert
    assert_eq!(root_help, 0);
    assert_eq!(leaf_help, 0);
    assert_eq!(version, 0);
    assert!(reports.borrow().is_empty());
}

#[test]
fn given_help_flag_when_executing_then_graceful_exit_is_returned() {
    // Arrange
    let temp = tree();
    let program = configure(options(temp.path(), ConfigurationHooks::new())).unwrap();

    // Act
    let err = program.execute(argv(&["-h"])).unwrap_err();

    // Assert
    assert!(err.is_graceful_exit());
}

#[test]
fn given_command_without_handler_when_running_then_exits_not_implemented() {
    // Arrange
    let temp = tree();
    let reports = Reports::default();

    // Act
    let code = run_program(options(temp.path(), recording_hooks(&reports)), argv(&["todo"]));

    // Assert
    assert_eq!(code, 2);
    let reports = reports.borrow();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0.suggested_exit_code, 2);
}

#[test]
fn given_failing_handler_when_running_then_report_carries_chain_and_exit_code() {
    // Arrange
    let temp = tree();
    let reports = Reports::default();

    // Act
    let code = run_program(options(temp.path(), recording_hooks(&reports)), argv(&["fail"]));

    // Assert
    assert_eq!(code, 42);
    let reports = reports.borrow();
    let (report, partial) = &reports[0];
    assert_eq!(report.message, "cannot list zones");
    assert_eq!(report.chain, vec!["connection refused"]);
    assert!(partial.is_none());
}

#[rstest]
#[case(&["todo"], "not-implemented")]
#[case(&["fail"], "command")]
#[case(&["list", "--bogus"], "command")]
fn given_failing_run_when_reporting_then_epilogue_sees_error_variant(
    #[case] tokens: &[&str],
    #[case] expected: &str,
) {
    // Arrange
    let temp = tree();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let recorded = seen.clone();
    let hooks = ConfigurationHooks::new().with_error_handling_epilogue(move |_, error, _, _| {
        let kind = match error {
            ApplicationError::NotImplemented => "not-implemented",
            ApplicationError::AssertionFailed(_) => "assertion",
            ApplicationError::Command { .. } => "command",
            _ => "other",
        };
        recorded.borrow_mut().push(kind);
    });

    // Act
    run_program(options(temp.path(), hooks), argv(tokens));

    // Assert
    assert_eq!(*seen.borrow(), vec![expected]);
}

#[test]
fn given_arguments_hook_returning_none_when_reporting_then_epilogue_sees_assertion() {
    // Arrange
    let temp = tree();
    let seen = Rc::new(RefCell::new(false));
    let recorded = seen.clone();
    let hooks = ConfigurationHooks::new()
        .with_arguments(|_, _| None)
        .with_error_handling_epilogue(move |_, error, _, _| {
            *recorded.borrow_mut() = matches!(error, ApplicationError::AssertionFailed(_));
        });

    // Act
    run_program(options(temp.path(), hooks), argv(&["list"]));

    // Assert
    assert!(*seen.borrow());
}

#[test]
fn given_arguments_hook_returning_none_when_running_then_assertion_exit_code() {
    // Arrange
    let temp = tree();
    let hooks = ConfigurationHooks::new()
        .with_arguments(|_, _| None)
        .with_error_handling_epilogue(|_, _, _, _| {});

    // Act
    let code = run_program(options(temp.path(), hooks), argv(&["list"]));

    // Assert
    assert_eq!(code, 3);
}

#[test]
fn given_context_hook_returning_none_when_configuring_then_fails() {
    // Arrange
    let temp = tree();
    let hooks = ConfigurationHooks::new().with_execution_context(|_| None);

    // Act
    let err = configure(options(temp.path(), hooks)).unwrap_err();

    // Assert
    assert!(matches!(err, ApplicationError::AssertionFailed(_)));
}

#[test]
fn given_epilogue_returning_none_when_running_then_partial_result_is_reported() {
    // Arrange
    let temp = tree();
    let reports = Reports::default();
    let hooks = recording_hooks(&reports).with_execution_epilogue(|_, _| None);

    // Act
    let code = run_program(options(temp.path(), hooks), argv(&["list"]));

    // Assert
    assert_eq!(code, 3);
    let reports = reports.borrow();
    let partial = reports[0].1.as_ref().unwrap();
    assert_eq!(partial.command, "root list");
}

#[test]
fn given_arguments_hook_when_executing_then_rewritten_argv_is_parsed() {
    // Arrange
    let temp = tree();
    let hooks = ConfigurationHooks::new().with_arguments(|mut argv, _| {
        argv.insert(0, "list".to_string());
        Some(argv)
    });
    let program = configure(options(temp.path(), hooks)).unwrap();

    // Act
    let result = program.execute(vec![]).unwrap();

    // Assert
    assert_eq!(result.output, json!({ "ran": "root list" }));
}

#[test]
fn given_prologue_and_epilogue_hooks_when_executing_then_both_run() {
    // Arrange
    let temp = tree();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let (prologue_seen, epilogue_seen) = (seen.clone(), seen.clone());
    let hooks = ConfigurationHooks::new()
        .with_execution_prologue(move |ctx| {
            prologue_seen
                .borrow_mut()
                .push(format!("prologue:{}", ctx.commands.len()));
        })
        .with_execution_epilogue(move |result, _| {
            epilogue_seen
                .borrow_mut()
                .push(format!("epilogue:{}", result.command));
            Some(result)
        });
    let program = configure(options(temp.path(), hooks)).unwrap();

    // Act
    program.execute(argv(&["list"])).unwrap();

    // Assert
    assert_eq!(
        *seen.borrow(),
        vec!["prologue:4".to_string(), "epilogue:root list".to_string()]
    );
}

#[test]
fn given_no_commands_dir_when_executing_then_root_configuration_runs() {
    // Arrange
    init_test_setup();
    let root = RawConfiguration::new()
        .name("solo")
        .option("loud", OptionSpec::new(OptionKind::Boolean).alias("l"))
        .handler(|args| Ok(json!({ "loud": args.get_bool("loud") })));
    let options = ProgramOptions::new(
        PackageInfo::new("solo", None),
        Arc::new(FileModuleLoader::with_callables(Callables::new())),
    )
    .root(root);
    let program = configure(options).unwrap();

    // Act
    let result = program.execute(argv(&["-l"])).unwrap();

    // Assert
    assert!(program.context().commands.is_empty());
    assert_eq!(result.command, "solo");
    assert_eq!(result.output, json!({ "loud": true }));
}

#[test]
fn given_invalid_root_configuration_when_discovery_finds_root_then_it_is_unused() {
    // Arrange
    let temp = tree();
    let options = options(temp.path(), ConfigurationHooks::new())
        .root(RawConfiguration::new().name("two words"));

    // Act
    let program = configure(options).unwrap();

    // Assert
    assert_eq!(program.context().root().unwrap().program.full_name(), "root");
}

#[test]
fn given_invalid_root_configuration_without_commands_dir_when_configuring_then_fails() {
    // Arrange
    init_test_setup();
    let options = ProgramOptions::new(
        PackageInfo::new("solo", None),
        Arc::new(FileModuleLoader::with_callables(Callables::new())),
    )
    .root(RawConfiguration::new().name("two words"));

    // Act
    let err = configure(options).unwrap_err();

    // Assert
    assert!(matches!(err, ApplicationError::Domain(_)), "got {:?}", err);
}

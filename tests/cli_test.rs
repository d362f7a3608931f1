//! End-to-end tests for the `cmdtree` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use cmdtree::util::testing::write_module;

fn tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_module(temp.path(), "index.toml", "description = \"manage dns\"\n");
    write_module(temp.path(), "tree.toml", "handler = \"tree\"\n");
    write_module(temp.path(), "dns/index.toml", "description = \"dns records\"\n");
    write_module(
        temp.path(),
        "dns/list.yaml",
        r#"
aliases: [ls]
description: list records
handler: echo
options:
  zone:
    type: string
    alias: [z]
    required: true
"#,
    );
    write_module(temp.path(), "secret.json", r#"{ "description": false }"#);
    temp
}

fn cmdtree(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cmdtree").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("CMDTREE_COMMANDS_DIR")
        .env_remove("CMDTREE_NAME")
        .env_remove("CMDTREE_VERSION")
        .current_dir(config_home.path());
    cmd
}

#[test]
fn given_leaf_with_echo_handler_when_invoked_then_prints_arguments() {
    let commands = tree();
    let home = TempDir::new().unwrap();

    cmdtree(&home)
        .args(["-C"])
        .arg(commands.path())
        .args(["dns", "ls", "-z", "example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"zone\": \"example.com\""));
}

#[test]
fn given_root_help_when_invoked_then_lists_visible_commands() {
    let commands = tree();
    let home = TempDir::new().unwrap();

    cmdtree(&home)
        .arg("-C")
        .arg(commands.path())
        .args(["--", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("dns"))
        .stdout(predicate::str::contains("Manage dns"))
        .stdout(predicate::str::contains("secret").not());
}

#[test]
fn given_tree_handler_when_invoked_then_prints_discovered_tree() {
    let commands = tree();
    let home = TempDir::new().unwrap();

    cmdtree(&home)
        .arg("-C")
        .arg(commands.path())
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("list (ls) - List records"))
        .stdout(predicate::str::contains("secret [hidden]"));
}

#[test]
fn given_missing_required_option_when_invoked_then_exits_one() {
    let commands = tree();
    let home = TempDir::new().unwrap();

    cmdtree(&home)
        .arg("-C")
        .arg(commands.path())
        .args(["dns", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--zone"));
}

#[test]
fn given_command_without_handler_when_invoked_then_exits_two() {
    let commands = tree();
    let home = TempDir::new().unwrap();

    cmdtree(&home)
        .arg("-C")
        .arg(commands.path())
        .arg("secret")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not been implemented"));
}

#[test]
fn given_flag_before_command_when_invoked_then_exits_three() {
    let commands = tree();
    let home = TempDir::new().unwrap();

    cmdtree(&home)
        .arg("-C")
        .arg(commands.path())
        .args(["--", "--verbose", "dns", "list"])
        .assert()
        .code(3);
}

#[test]
fn given_commands_dir_in_local_settings_when_invoked_then_it_is_used() {
    let commands = tree();
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join(".cmdtree.toml"),
        format!("commands_dir = {:?}\n", commands.path().display().to_string()),
    )
    .unwrap();

    cmdtree(&home)
        .args(["dns", "ls", "--zone", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"zone\": \"x\""));
}

#[test]
fn given_no_commands_dir_when_invoked_then_prints_package_name() {
    let home = TempDir::new().unwrap();

    cmdtree(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("cmdtree"));
}

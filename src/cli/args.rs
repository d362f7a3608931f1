//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

/// Run a command tree discovered from a directory of command modules
///
/// Arguments after the outer flags are handed to the discovered program;
/// use `--` to pass flags to the root program itself (`cmdtree -- --help`).
#[derive(Parser, Debug)]
#[command(name = "cmdtree")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,

    /// Directory to discover commands from (overrides settings)
    #[arg(short = 'C', long, value_hint = ValueHint::DirPath)]
    pub commands_dir: Option<PathBuf>,

    /// Arguments for the discovered program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_trailing_flags_when_parsing_then_passed_through() {
        let cli = Cli::try_parse_from(["cmdtree", "-dd", "-C", "/tmp/cmds", "dns", "list", "--zone", "x"])
            .unwrap();
        assert_eq!(cli.debug, 2);
        assert_eq!(cli.commands_dir, Some(PathBuf::from("/tmp/cmds")));
        assert_eq!(cli.args, vec!["dns", "list", "--zone", "x"]);
    }
}

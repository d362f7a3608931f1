//! Provenance of a discovered program.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Role of a program within the discovered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgramType {
    /// The first index module loaded in a discovery run
    Root,
    /// An index module of a subdirectory
    ParentChild,
    /// A non-index module file
    Child,
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProgramType::Root => "root",
            ProgramType::ParentChild => "parent-child",
            ProgramType::Child => "child",
        };
        f.write_str(s)
    }
}

/// Where a program's configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramMetadata {
    /// Absolute path of the module file
    pub filepath: PathBuf,
    /// Basename, e.g. `list.toml`
    pub filename: String,
    /// Basename without extension, e.g. `list`
    pub filename_without_extension: String,
    /// Basename of the directory containing the module
    pub parent_dir_name: String,
    #[serde(rename = "type")]
    pub kind: ProgramType,
}

impl ProgramMetadata {
    pub fn from_path(filepath: &Path, kind: ProgramType) -> Self {
        let file_name = |p: Option<&std::ffi::OsStr>| {
            p.map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        Self {
            filepath: filepath.to_path_buf(),
            filename: file_name(filepath.file_name()),
            filename_without_extension: file_name(filepath.file_stem()),
            parent_dir_name: file_name(filepath.parent().and_then(Path::file_name)),
            kind,
        }
    }
}

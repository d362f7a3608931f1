//! Loading one command's configuration from its module file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::configuration::Configuration;
use crate::application::context::ExecutionContext;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{ProgramMetadata, ProgramType};
use crate::infrastructure::modules::{ModuleLoader, MODULE_EXTENSIONS};
use crate::infrastructure::traits::FileSystem;

/// Whether the root program of a discovery run has been loaded yet.
///
/// Starts at `Root`; the first successful index load moves it to `NonRoot`
/// and it never moves back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Root,
    NonRoot,
}

/// Which kind of module is being loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    /// A directory's own `index.<ext>` module
    Index,
    /// Any other module file
    Leaf,
}

impl LoadKind {
    fn role(self, phase: LoadPhase) -> ProgramType {
        match (self, phase) {
            (LoadKind::Index, LoadPhase::Root) => ProgramType::Root,
            (LoadKind::Index, LoadPhase::NonRoot) => ProgramType::ParentChild,
            (LoadKind::Leaf, _) => ProgramType::Child,
        }
    }
}

#[derive(Debug)]
pub struct LoadedConfiguration {
    pub configuration: Configuration,
    pub metadata: ProgramMetadata,
}

pub struct ConfigurationLoader {
    fs: Arc<dyn FileSystem>,
    modules: Arc<dyn ModuleLoader>,
}

impl ConfigurationLoader {
    pub fn new(fs: Arc<dyn FileSystem>, modules: Arc<dyn ModuleLoader>) -> Self {
        Self { fs, modules }
    }

    /// Candidate paths for a path stem, in precedence order:
    /// `index` -> `index.toml`, `index.yaml`, `index.json`.
    pub fn candidates(stem: &Path) -> Vec<PathBuf> {
        MODULE_EXTENSIONS
            .iter()
            .map(|ext| {
                let mut path = OsString::from(stem.as_os_str());
                path.push(".");
                path.push(ext);
                PathBuf::from(path)
            })
            .collect()
    }

    /// Load the first candidate that imports cleanly.
    ///
    /// Absent and unparseable candidates are skipped; `Ok(None)` means none
    /// was usable. Failures after import (unknown callables, a failing
    /// factory, naming violations) are returned as errors.
    pub fn load(
        &self,
        candidates: &[PathBuf],
        kind: LoadKind,
        phase: &mut LoadPhase,
        context: &ExecutionContext,
    ) -> ApplicationResult<Option<LoadedConfiguration>> {
        let log = context.debug.extend("load");

        for candidate in candidates {
            if !self.fs.is_file(candidate) {
                continue;
            }
            let source = match self.modules.load(candidate) {
                Ok(source) => source,
                Err(e) if e.is_recoverable() => {
                    log.message(format_args!("skipping {}: {}", candidate.display(), e));
                    continue;
                }
                Err(e) => return Err(ApplicationError::assertion(e.to_string())),
            };

            let role = kind.role(*phase);
            let filepath = self
                .fs
                .canonicalize(candidate)
                .unwrap_or_else(|_| candidate.clone());
            let metadata = ProgramMetadata::from_path(&filepath, role);

            let raw = source.resolve(context)?;
            let default_name = match role {
                ProgramType::Root => context.package.name.clone(),
                ProgramType::ParentChild => metadata.parent_dir_name.clone(),
                ProgramType::Child => metadata.filename_without_extension.clone(),
            };
            let configuration = Configuration::normalize(raw, &default_name)?;

            if role == ProgramType::Root {
                *phase = LoadPhase::NonRoot;
            }
            log.message(format_args!(
                "loaded {} \"{}\" from {}",
                role,
                configuration.name,
                filepath.display()
            ));
            return Ok(Some(LoadedConfiguration {
                configuration,
                metadata,
            }));
        }
        Ok(None)
    }
}

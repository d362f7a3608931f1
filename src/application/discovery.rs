//! Recursive discovery of the command tree from a directory of modules.
//!
//! Layout:
//! ```text
//! commands/
//!   index.toml        root program
//!   status.toml       root status
//!   dns/
//!     index.toml      root dns
//!     list.yaml       root dns list
//! ```

use std::path::Path;
use std::sync::Arc;

use crate::application::context::{ExecutionContext, RegisteredProgram};
use crate::application::loader::{ConfigurationLoader, LoadKind, LoadPhase, LoadedConfiguration};
use crate::application::program::{ProgramNode, ProxyCommand};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::ProgramType;
use crate::infrastructure::modules::{ModuleLoader, INDEX_STEM, MODULE_EXTENSIONS};
use crate::infrastructure::traits::FileSystem;

pub struct TreeDiscoverer {
    fs: Arc<dyn FileSystem>,
    loader: ConfigurationLoader,
}

impl TreeDiscoverer {
    pub fn new(fs: Arc<dyn FileSystem>, modules: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader: ConfigurationLoader::new(fs.clone(), modules),
            fs,
        }
    }

    /// Register every program found under `base` in `context.commands`.
    ///
    /// The first program registered is the root. Child commands are queued
    /// on their parents and become visible once deferred commands are
    /// flushed.
    pub fn discover(&self, base: &Path, context: &mut ExecutionContext) -> ApplicationResult<()> {
        let mut phase = LoadPhase::Root;
        self.discover_dir(base, &[], None, &mut phase, context)
    }

    fn discover_dir(
        &self,
        dir: &Path,
        lineage: &[String],
        parent: Option<&str>,
        phase: &mut LoadPhase,
        context: &mut ExecutionContext,
    ) -> ApplicationResult<()> {
        let log = context.debug.extend("discover");

        let candidates = ConfigurationLoader::candidates(&dir.join(INDEX_STEM));
        let Some(loaded) = self
            .loader
            .load(&candidates, LoadKind::Index, phase, context)?
        else {
            log.message(format_args!("no index module in {}, skipping", dir.display()));
            return Ok(());
        };

        let mut lineage = lineage.to_vec();
        lineage.push(loaded.configuration.name.clone());
        let key = lineage.join(" ");
        register(&key, loaded, parent, context)?;
        let registered = context.commands.len();

        let entries = self.fs.read_dir(dir).map_err(|e| ApplicationError::OperationFailed {
            context: format!("reading command directory {}", dir.display()),
            source: Box::new(e),
        })?;

        for entry in entries {
            if entry.file_name().starts_with('.') {
                continue;
            }
            if entry.is_dir {
                self.discover_dir(&entry.path, &lineage, Some(&key), phase, context)?;
                continue;
            }
            if !entry.is_file || !is_leaf_module(&entry.path) {
                continue;
            }

            let loaded = self
                .loader
                .load(
                    std::slice::from_ref(&entry.path),
                    LoadKind::Leaf,
                    phase,
                    context,
                )?
                .ok_or_else(|| {
                    ApplicationError::assertion(format!(
                        "failed to load command module {}",
                        entry.path.display()
                    ))
                })?;
            let child_key = format!("{} {}", key, loaded.configuration.name);
            register(&child_key, loaded, Some(&key), context)?;
        }

        if context.commands.len() == registered {
            log.message(format_args!("{} has no child commands, enforcing strict mode", key));
            if let Some(node) = context.commands.get_mut(&key) {
                node.program.adapter_mut().force_strict(true);
            }
        }
        Ok(())
    }
}

fn is_leaf_module(path: &Path) -> bool {
    let has_module_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| MODULE_EXTENSIONS.contains(&e));
    let is_index = path.file_stem().and_then(|s| s.to_str()) == Some(INDEX_STEM);
    has_module_extension && !is_index
}

/// Build the program for `loaded`, queue its proxy on `parent`, and add it to
/// the registry under `key`.
fn register(
    key: &str,
    loaded: LoadedConfiguration,
    parent: Option<&str>,
    context: &mut ExecutionContext,
) -> ApplicationResult<()> {
    let LoadedConfiguration {
        configuration,
        metadata,
    } = loaded;

    if context.commands.contains_key(key) {
        return Err(ApplicationError::assertion(format!(
            "command \"{}\" is defined twice (second definition in {})",
            key,
            metadata.filepath.display()
        )));
    }
    let is_root = metadata.kind == ProgramType::Root;
    if is_root != context.commands.is_empty() {
        return Err(ApplicationError::assertion(format!(
            "the root program must be registered first (got {} \"{}\")",
            metadata.kind, key
        )));
    }

    let program = ProgramNode::build(key, configuration, metadata.kind, context)?;

    if let Some(parent_key) = parent {
        let proxy = ProxyCommand::for_child(program.configuration(), key);
        let parent = context.commands.get_mut(parent_key).ok_or_else(|| {
            ApplicationError::assertion(format!(
                "parent \"{}\" of \"{}\" is not registered",
                parent_key, key
            ))
        })?;
        parent.program.adapter_mut().add_deferred_command(proxy);
    }

    context
        .debug
        .extend("discover")
        .message(format_args!("registered {} \"{}\"", metadata.kind, key));
    context
        .commands
        .insert(key.to_string(), RegisteredProgram { program, metadata });
    Ok(())
}

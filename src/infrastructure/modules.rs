//! Configuration modules on disk.
//!
//! A module is a TOML, YAML or JSON document describing one command. Code is
//! referenced by name (`handler = "dns.list"`) and resolved against the
//! [`Callables`] registered by the host program.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::trace;

use crate::application::configuration::{
    Builder, Callables, ConfigurationSource, Description, RawConfiguration,
};
use crate::domain::OptionSpec;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Module file extensions, in resolution precedence order.
pub const MODULE_EXTENSIONS: [&str; 3] = ["toml", "yaml", "json"];

/// Base name (without extension) of a directory's own module.
pub const INDEX_STEM: &str = "index";

/// Imports a module file.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, path: &Path) -> InfraResult<ConfigurationSource>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DescriptionField {
    Text(String),
    Flag(bool),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ModuleDocument {
    name: Option<String>,
    aliases: Vec<String>,
    command: Option<String>,
    description: Option<DescriptionField>,
    usage: Option<String>,
    deprecated: bool,
    options: IndexMap<String, OptionSpec>,
    builder: Option<String>,
    handler: Option<String>,
    factory: Option<String>,
}

impl ModuleDocument {
    fn parse(path: &Path, content: &str) -> InfraResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let parse_error = |message: String| InfraError::Parse {
            path: path.to_path_buf(),
            message,
        };
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
            Some("yaml") => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string())),
            Some("json") => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
            _ => Err(InfraError::UnsupportedExtension(path.to_path_buf())),
        }
    }

    fn is_bare_factory(&self) -> bool {
        self.name.is_none()
            && self.aliases.is_empty()
            && self.command.is_none()
            && self.description.is_none()
            && self.usage.is_none()
            && !self.deprecated
            && self.options.is_empty()
            && self.builder.is_none()
            && self.handler.is_none()
    }
}

/// Reads modules through a [`FileSystem`] and resolves their references.
pub struct FileModuleLoader {
    fs: Arc<dyn FileSystem>,
    callables: Callables,
}

impl FileModuleLoader {
    pub fn new(fs: Arc<dyn FileSystem>, callables: Callables) -> Self {
        Self { fs, callables }
    }

    /// Loader over the real filesystem.
    pub fn with_callables(callables: Callables) -> Self {
        Self::new(Arc::new(RealFileSystem), callables)
    }

    fn unknown(path: &Path, kind: &'static str, name: &str) -> InfraError {
        InfraError::UnknownReference {
            path: path.to_path_buf(),
            kind,
            name: name.to_string(),
        }
    }

    fn resolve_document(&self, path: &Path, doc: ModuleDocument) -> InfraResult<ConfigurationSource> {
        if let Some(factory) = &doc.factory {
            if !doc.is_bare_factory() {
                return Err(InfraError::Parse {
                    path: path.to_path_buf(),
                    message: "`factory` cannot be combined with other fields".into(),
                });
            }
            let factory = self
                .callables
                .factory(factory)
                .ok_or_else(|| Self::unknown(path, "factory", factory))?;
            return Ok(ConfigurationSource::Factory(factory));
        }

        let builder = match (&doc.builder, doc.options.is_empty()) {
            (Some(_), false) => {
                return Err(InfraError::Parse {
                    path: path.to_path_buf(),
                    message: "`builder` and `options` are mutually exclusive".into(),
                });
            }
            (Some(name), true) => Some(Builder::Function(
                self.callables
                    .builder(name)
                    .ok_or_else(|| Self::unknown(path, "builder", name))?,
            )),
            (None, false) => Some(Builder::Options(doc.options)),
            (None, true) => None,
        };

        let handler = match &doc.handler {
            Some(name) => Some(
                self.callables
                    .handler(name)
                    .ok_or_else(|| Self::unknown(path, "handler", name))?,
            ),
            None => None,
        };

        let description = match doc.description {
            Some(DescriptionField::Text(text)) => Some(Description::Text(text)),
            Some(DescriptionField::Flag(false)) => Some(Description::Hidden),
            Some(DescriptionField::Flag(true)) | None => None,
        };

        Ok(ConfigurationSource::Static(RawConfiguration {
            name: doc.name,
            aliases: doc.aliases,
            command: doc.command,
            description,
            usage: doc.usage,
            deprecated: doc.deprecated,
            builder,
            handler,
        }))
    }
}

impl ModuleLoader for FileModuleLoader {
    fn load(&self, path: &Path) -> InfraResult<ConfigurationSource> {
        trace!("importing module {}", path.display());
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| InfraError::io(format!("reading {}", path.display()), e))?;
        let doc = ModuleDocument::parse(path, &content)?;
        self.resolve_document(path, doc)
    }
}

//! Schema registry: document type -> compiled schema
//!
//! The table of schema locations is fixed at construction. Compiled schemas live
//! in a `moka` cache so that each one is compiled at most once per process, even
//! when several threads ask for the same type at the same time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use moka::sync::Cache;
use tracing::{debug, info};

use crate::classifier::DocumentType;
use crate::config::SchemaConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::libxml2::{LibXml2Wrapper, XmlSchemaPtr};

/// Source of compiled schemas for the pipeline
#[cfg_attr(test, mockall::automock)]
pub trait SchemaProvider: Send + Sync {
    /// Compiled schema for `document_type`, or `RegistryError::NotConfigured`
    fn schema_for(&self, document_type: DocumentType) -> RegistryResult<XmlSchemaPtr>;
}

pub struct SchemaRegistry {
    base_dir: PathBuf,
    locations: HashMap<DocumentType, PathBuf>,
    engine: Arc<LibXml2Wrapper>,
    compiled: Cache<DocumentType, XmlSchemaPtr>,
    compilations: AtomicUsize,
}

impl SchemaRegistry {
    pub fn new(config: &SchemaConfig, engine: Arc<LibXml2Wrapper>) -> Self {
        let locations: HashMap<DocumentType, PathBuf> = config
            .entries
            .iter()
            .map(|entry| (entry.document_type, entry.path.clone()))
            .collect();

        // Never evict below the number of configured schemas
        let capacity = config.cache_capacity.max(locations.len() as u64);
        let compiled = Cache::builder().max_capacity(capacity).build();

        Self {
            base_dir: config.base_dir.clone(),
            locations,
            engine,
            compiled,
            compilations: AtomicUsize::new(0),
        }
    }

    /// Compile every configured schema now
    ///
    /// Returns the number of schemas ready. A missing or broken schema is a
    /// startup failure, so callers should treat an error here as fatal.
    pub fn preload(&self) -> RegistryResult<usize> {
        let mut types: Vec<DocumentType> = self.document_types().collect();
        types.sort();

        for document_type in &types {
            self.schema_for(*document_type)?;
        }
        Ok(types.len())
    }

    /// Resolved schema file for a type, if one is configured
    pub fn schema_path(&self, document_type: DocumentType) -> Option<PathBuf> {
        self.locations
            .get(&document_type)
            .map(|relative| self.base_dir.join(relative))
    }

    /// Every type with a configured schema
    pub fn document_types(&self) -> impl Iterator<Item = DocumentType> + '_ {
        self.locations.keys().copied()
    }

    /// How many schema compilations have run so far
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::SeqCst)
    }

    fn compile(&self, document_type: DocumentType, path: &Path) -> RegistryResult<XmlSchemaPtr> {
        if !path.is_file() {
            return Err(RegistryError::SchemaNotFound {
                document_type,
                path: path.to_path_buf(),
            });
        }

        self.compilations.fetch_add(1, Ordering::SeqCst);
        let schema = self.engine.parse_schema_from_file(path).map_err(|e| {
            RegistryError::SchemaCompilation {
                document_type,
                path: path.to_path_buf(),
                details: e.to_string(),
            }
        })?;

        info!(%document_type, path = %path.display(), "compiled schema");
        Ok(schema)
    }
}

impl SchemaProvider for SchemaRegistry {
    fn schema_for(&self, document_type: DocumentType) -> RegistryResult<XmlSchemaPtr> {
        let path = self
            .schema_path(document_type)
            .ok_or(RegistryError::NotConfigured { document_type })?;

        if let Some(schema) = self.compiled.get(&document_type) {
            debug!(%document_type, "schema cache hit");
            return Ok(schema);
        }

        self.compiled
            .try_get_with(document_type, || self.compile(document_type, &path))
            .map_err(|e| (*e).clone())
    }
}

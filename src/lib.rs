//! # fiscal-xml-validator Library
//!
//! Classifies CT-e and NF-e documents by root namespace, validates them against
//! the matching XSD through libxml2 and turns every schema violation into a
//! diagnostic naming the offending field and its value.
//!
//! ```no_run
//! use fiscal_xml_validator::{Config, Pipeline};
//!
//! let pipeline = Pipeline::from_config(&Config::default());
//! let result = pipeline.validate(b"<CTe xmlns=\"http://www.portalfiscal.inf.br/cte\"/>");
//! ```

pub mod classifier;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod error_reporter;
pub mod libxml2;
pub mod output;
pub mod pipeline;
pub mod registry;
pub mod validator;

pub use classifier::{CTE_NAMESPACE, DocumentType, NFE_NAMESPACE, TypeClassifier};
pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use config::{Config, ConfigError, ConfigManager, NamespaceMapping, SchemaConfig, SchemaEntry};
pub use document::{QualifiedName, XmlDocument};
pub use error::{DocumentError, LibXml2Error, RegistryError};
pub use error_reporter::{ErrorReporter, MessageLanguage, ValidationError};
pub use libxml2::{LibXml2Wrapper, RawViolation, SchemaCheck, XmlSchemaPtr};
pub use output::{FileOutcome, FileReport, Output, Summary};
pub use pipeline::{Pipeline, ValidationResult};
pub use registry::{SchemaProvider, SchemaRegistry};
pub use validator::Validator;

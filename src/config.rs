use crate::classifier::{CTE_NAMESPACE, DocumentType, NFE_NAMESPACE};
use crate::cli::{Cli, OutputFormat};
use crate::error_reporter::MessageLanguage;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

const CONFIG_FILE_NAMES: [&str; 4] = [
    "fiscal-xml.toml",
    "fiscal-xml.json",
    ".fiscal-xml.toml",
    ".fiscal-xml.json",
];

/// Main application configuration
///
/// Built once at startup and passed by reference to the pipeline components.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub schemas: SchemaConfig,
    /// Root namespace URI -> document type, tested in order
    pub namespaces: Vec<NamespaceMapping>,
    pub reporting: ReportingConfig,
    pub output: OutputConfig,
}

/// Where compiled schemas come from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchemaConfig {
    /// Directory holding one subdirectory per standard
    pub base_dir: PathBuf,
    /// Schema file per document type, relative to `base_dir`
    pub entries: Vec<SchemaEntry>,
    /// Maximum number of compiled schemas kept in memory
    pub cache_capacity: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaEntry {
    pub document_type: DocumentType,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamespaceMapping {
    pub uri: String,
    pub document_type: DocumentType,
}

impl NamespaceMapping {
    /// The CT-e and NF-e namespaces, in that order
    pub fn defaults() -> Vec<NamespaceMapping> {
        vec![
            NamespaceMapping {
                uri: CTE_NAMESPACE.to_string(),
                document_type: DocumentType::Cte,
            },
            NamespaceMapping {
                uri: NFE_NAMESPACE.to_string(),
                document_type: DocumentType::Nfe,
            },
        ]
    }
}

/// Diagnostic formatting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ReportingConfig {
    pub language: MessageLanguage,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormatConfig,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (errors only)
    pub quiet: bool,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    Human,
    Json,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Human => OutputFormat::Human,
            OutputFormatConfig::Json => OutputFormat::Json,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schemas: SchemaConfig::default(),
            namespaces: NamespaceMapping::defaults(),
            reporting: ReportingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("validadores"),
            entries: vec![
                SchemaEntry {
                    document_type: DocumentType::Cte,
                    path: PathBuf::from("CT-e/cte_v4.00.xsd"),
                },
                SchemaEntry {
                    document_type: DocumentType::Nfe,
                    path: PathBuf::from("NF-e/nfe_v4.00.xsd"),
                },
            ],
            cache_capacity: 16,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormatConfig::Human,
            verbose: false,
            quiet: false,
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        // Sections missing from a file keep their defaults
        let mut config = if let Some(config_path) = &cli.config {
            Self::load_from_file(config_path).await?
        } else {
            Self::find_config_file().await?.unwrap_or_default()
        };

        config = Self::apply_environment_overrides(config)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        let mut search_dirs = vec![PathBuf::from(".")];
        if let Some(config_dir) = dirs::config_dir() {
            search_dirs.push(config_dir.join("fiscal-xml-validator"));
        }

        Self::find_config_file_in(&search_dirs).await
    }

    /// First known config file name found in `search_dirs`, directories in order
    pub async fn find_config_file_in(search_dirs: &[PathBuf]) -> Result<Option<Config>> {
        for dir in search_dirs {
            for name in &CONFIG_FILE_NAMES {
                let path = dir.join(name);
                if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        // Schema settings
        if let Some(schema_dir) = env.get("FISCAL_XML_SCHEMA_DIR") {
            config.schemas.base_dir = PathBuf::from(schema_dir);
        }

        if let Some(capacity) = env.get("FISCAL_XML_CACHE_CAPACITY") {
            config.schemas.cache_capacity = capacity.parse().map_err(|_| {
                ConfigError::Environment(format!(
                    "Invalid FISCAL_XML_CACHE_CAPACITY value: {}",
                    capacity
                ))
            })?;
        }

        // Reporting settings
        if let Some(language) = env.get("FISCAL_XML_LANGUAGE") {
            config.reporting.language = language.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid FISCAL_XML_LANGUAGE value: {}", language))
            })?;
        }

        // Output settings
        if let Some(verbose) = env.get("FISCAL_XML_VERBOSE") {
            config.output.verbose = verbose.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid FISCAL_XML_VERBOSE value: {}", verbose))
            })?;
        }

        if let Some(quiet) = env.get("FISCAL_XML_QUIET") {
            config.output.quiet = quiet.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid FISCAL_XML_QUIET value: {}", quiet))
            })?;
        }

        if let Some(format) = env.get("FISCAL_XML_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid FISCAL_XML_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    ///
    /// Only options given on the command line override.
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(schema_dir) = &cli.schema_dir {
            config.schemas.base_dir = schema_dir.clone();
        }

        if let Some(language) = cli.language {
            config.reporting.language = language;
        }

        if let Some(format) = cli.format {
            config.output.format = format.into();
        }

        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
        }

        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        // Namespace -> type must stay a function
        let mut seen_uris = HashSet::new();
        for mapping in &config.namespaces {
            if mapping.uri.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "Namespace URI cannot be empty".to_string(),
                ));
            }
            if !mapping.document_type.is_known() {
                return Err(ConfigError::Validation(format!(
                    "Namespace {} cannot map to the unknown document type",
                    mapping.uri
                )));
            }
            if !seen_uris.insert(mapping.uri.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Namespace {} is mapped more than once",
                    mapping.uri
                )));
            }
        }

        // Validate schema settings
        let mut seen_types = HashSet::new();
        for entry in &config.schemas.entries {
            if !entry.document_type.is_known() {
                return Err(ConfigError::Validation(
                    "No schema can be registered for the unknown document type".to_string(),
                ));
            }
            if entry.path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Schema path for {} cannot be empty",
                    entry.document_type
                )));
            }
            if !seen_types.insert(entry.document_type) {
                return Err(ConfigError::Validation(format!(
                    "More than one schema registered for {}",
                    entry.document_type
                )));
            }
        }

        if config.schemas.cache_capacity == 0 {
            return Err(ConfigError::Validation(
                "Schema cache capacity must be greater than 0".to_string(),
            ));
        }

        // Validate output settings
        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        Ok(())
    }
}

use autoform_core::{FieldOption, FormSchema};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub mod validator;

use crate::cli::Cli;
use crate::demo;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub mock_api: MockApiSettings,
    #[serde(default)]
    pub form: FormSettings,
    #[serde(default)]
    pub client: ClientSettings,
    /// Form schema, loaded from `form.schema_file` or the built-in demo
    #[serde(skip)]
    pub schema: FormSchema,
    /// Option catalogs served under `/api/<name>`
    #[serde(skip)]
    pub catalogs: Vec<CatalogConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Behavior of the mocked option API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MockApiSettings {
    /// Artificial delay before each option response
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
}

impl Default for MockApiSettings {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
        }
    }
}

fn default_latency_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FormSettings {
    /// JSON or YAML list of field descriptors
    #[serde(default)]
    pub schema_file: Option<PathBuf>,
    /// Directory of JSON/YAML catalog files
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: PathBuf,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            schema_file: None,
            catalog_dir: default_catalog_dir(),
        }
    }
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("config/catalogs")
}

/// Settings for the native option client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientSettings {
    #[serde(default = "default_client_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_client_timeout(),
        }
    }
}

fn default_client_timeout() -> u64 {
    10
}

/// A named option list served by the mock option API.
///
/// Flat catalogs answer with `options`. Keyed catalogs answer with the list
/// registered for the `parent` query parameter.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CatalogConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_parent: BTreeMap<String, Vec<FieldOption>>,
}

impl CatalogConfig {
    pub fn is_keyed(&self) -> bool {
        !self.by_parent.is_empty()
    }

    /// Options for a request; unknown or missing parents yield an empty list
    pub fn lookup(&self, parent: Option<&str>) -> Vec<FieldOption> {
        if !self.is_keyed() {
            return self.options.clone();
        }
        parent
            .and_then(|p| self.by_parent.get(p))
            .cloned()
            .unwrap_or_default()
    }
}

/// A catalog file holds either one catalog or a list of them
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    One(CatalogConfig),
    Many(Vec<CatalogConfig>),
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Load `autoform.{toml,yaml,json}` and external files relative to `root`
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let root = root.as_ref();
        let mut settings = Self::build(File::from(root.join("autoform")).required(false))?;
        settings.load_external_configs(root)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let root = cli
            .config
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut settings = Self::build(File::from(cli.config.clone()).required(false))?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);
        settings.load_external_configs(&root)?;
        settings.validate()?;
        Ok(settings)
    }

    fn build<S>(source: S) -> Result<Self, anyhow::Error>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder()
            .add_source(source)
            .add_source(
                Environment::with_prefix("AUTOFORM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .build()?;

        Ok(s.try_deserialize()?)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(latency_ms) = cli.latency_ms {
            self.mock_api.latency_ms = latency_ms;
        }
        if let Some(schema) = &cli.schema {
            self.form.schema_file = Some(schema.clone());
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    fn load_external_configs(&mut self, root: &Path) -> Result<(), anyhow::Error> {
        self.schema = match &self.form.schema_file {
            Some(path) => load_schema_file(&root.join(path))?,
            None => demo::schema()?,
        };

        self.catalogs = load_catalogs_from_dir(&root.join(&self.form.catalog_dir))?;
        if self.catalogs.is_empty() {
            tracing::info!("No catalog files found, serving the built-in demo catalogs");
            self.catalogs = demo::catalogs()?;
        }
        Ok(())
    }

    pub fn catalog(&self, name: &str) -> Option<&CatalogConfig> {
        self.catalogs.iter().find(|c| c.name == name)
    }
}

fn is_data_file(path: &Path) -> Option<&str> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|ext| matches!(*ext, "json" | "yaml" | "yml"))
}

fn load_schema_file(path: &Path) -> Result<FormSchema, anyhow::Error> {
    let ext = is_data_file(path)
        .ok_or_else(|| anyhow::anyhow!("Unsupported schema file type: {}", path.display()))?;
    let content = std::fs::read_to_string(path)?;
    let schema: FormSchema = if ext == "json" {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    tracing::info!("Loaded {} fields from {}", schema.len(), path.display());
    Ok(schema)
}

fn load_catalogs_from_dir(dir: &Path) -> Result<Vec<CatalogConfig>, anyhow::Error> {
    let mut catalogs = Vec::new();
    let pattern = format!("{}/*", dir.display());
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) => {
                if let Some(ext) = is_data_file(&path) {
                    let content = std::fs::read_to_string(&path)?;
                    let file: CatalogFile = if ext == "json" {
                        serde_json::from_str(&content)?
                    } else {
                        serde_yaml::from_str(&content)?
                    };
                    match file {
                        CatalogFile::One(catalog) => catalogs.push(catalog),
                        CatalogFile::Many(list) => catalogs.extend(list),
                    }
                }
            }
            Err(e) => tracing::warn!("Failed to read glob entry: {}", e),
        }
    }
    Ok(catalogs)
}

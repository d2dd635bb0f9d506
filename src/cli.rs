use clap::Parser;
use std::path::PathBuf;

/// AutoForm - schema-driven forms with dependent option lists
#[derive(Parser, Debug, Clone)]
#[command(name = "autoform", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "AUTOFORM_CONFIG", default_value = "autoform.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "AUTOFORM_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "AUTOFORM_PORT")]
    pub port: Option<u16>,

    /// Artificial delay applied to option responses, in milliseconds
    #[arg(long, env = "AUTOFORM_LATENCY_MS")]
    pub latency_ms: Option<u64>,

    /// Form schema file (JSON or YAML), replacing the built-in demo form
    #[arg(long, env = "AUTOFORM_SCHEMA")]
    pub schema: Option<PathBuf>,
}

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    /// Where the theme preference is stored
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Directory that receives invoice.pdf
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Program that turns the rendered invoice into a PDF
    #[serde(default = "default_pdf_engine")]
    pub pdf_engine: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Initial contents of the tax rate field
    #[serde(default)]
    pub tax_rate: Option<String>,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_database_url() -> String {
    "sqlite://invoice_builder.db".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_pdf_engine() -> String {
    "pandoc".to_string()
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("invoice_builder.log")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            output_dir: default_output_dir(),
            pdf_engine: default_pdf_engine(),
            currency: default_currency(),
            tax_rate: None,
            log_file: default_log_file(),
        }
    }
}

/// Command line overrides. Anything left out keeps the environment value.
#[derive(Debug, Default, Parser)]
#[command(name = "invoice_builder", version, about = "Build an invoice and export it as a PDF")]
pub struct Cli {
    #[arg(long)]
    pub database_url: Option<String>,
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    #[arg(long)]
    pub pdf_engine: Option<String>,
    #[arg(long)]
    pub currency: Option<String>,
    #[arg(long)]
    pub tax_rate: Option<String>,
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `INVOICE_*` environment variables
    pub fn load() -> Result<Self> {
        let config = envy::prefixed("INVOICE_").from_env::<Config>()?;

        Ok(config)
    }

    /// Apply command line overrides on top of the environment
    pub fn merge_cli(mut self, cli: Cli) -> Self {
        if let Some(url) = cli.database_url {
            self.database_url = url;
        }
        if let Some(dir) = cli.output_dir {
            self.output_dir = dir;
        }
        if let Some(engine) = cli.pdf_engine {
            self.pdf_engine = engine;
        }
        if let Some(currency) = cli.currency {
            self.currency = currency;
        }
        if cli.tax_rate.is_some() {
            self.tax_rate = cli.tax_rate;
        }
        if let Some(log_file) = cli.log_file {
            self.log_file = log_file;
        }
        self
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    // Ensure .env file is loaded
    dotenv().ok();

    let config = Config::load()?.merge_cli(Cli::parse());

    Ok(config)
}

pub mod cli;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "soql-etl")]
#[command(about = "Run SoQL queries against open data portals and export flat CSV tables")]
pub struct CliConfig {
    #[arg(short, long, help = "Path to a SoQL query file; reads stdin when omitted")]
    pub infile: Option<String>,

    #[arg(
        short,
        long,
        default_value = "query_results",
        help = "Base name for the output .csv files"
    )]
    pub outfile: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(
        long,
        help = "Application token; falls back to the APPTOKEN environment variable"
    )]
    pub app_token: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn app_token(&self) -> Option<&str> {
        self.app_token.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_name(&self) -> &str {
        &self.outfile
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("outfile", &self.outfile)?;
        validate_path("output_path", &self.output_path)?;
        if let Some(infile) = &self.infile {
            validate_path("infile", infile)?;
        }
        Ok(())
    }
}

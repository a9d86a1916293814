use clap::Parser;
use soql_etl::utils::{logger, validation::Validate};
use soql_etl::{CliConfig, EtlEngine, LocalStorage, SoqlPipeline, SoqlQuery};
use std::io::Read;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::info!("Starting soql-etl");

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    if config.app_token.is_none() {
        config.app_token = std::env::var("APPTOKEN").ok();
    }

    let raw_query = match &config.infile {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let query = match SoqlQuery::parse(&raw_query) {
        Ok(query) => query,
        Err(e) => {
            tracing::error!("Unknown endpoint: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Connected to {} ({})", query.base_url, query.endpoint);
    println!("\n{}\n", query.query);

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = SoqlPipeline::new(storage, config, query);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("Query run completed");
            println!("✅ Results saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!("Query run failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

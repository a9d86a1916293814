use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Fetching dataset");
        let raw = self.pipeline.extract().await?;
        tracing::info!("Fetched {} rows", raw.records.len());

        tracing::info!("Parsing results");
        let output = self.pipeline.transform(raw).await?;
        tracing::info!(
            "Flattened {} rows into {} columns",
            output.table.rows.len(),
            output.table.columns.len()
        );

        tracing::info!("Saving output");
        let output_path = self.pipeline.load(output).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}

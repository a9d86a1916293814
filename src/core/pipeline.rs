use crate::core::soql::SoqlQuery;
use crate::core::{
    flatten_results, normalize_metadata, ColumnMeta, ConfigProvider, DatasetMetadata, FlatTable,
    Pipeline, QueryOutput, RawDataset, Record, Storage,
};
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use serde_json::Value;

pub const APP_TOKEN_HEADER: &str = "X-App-Token";

pub struct SoqlPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    query: SoqlQuery,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> SoqlPipeline<S, C> {
    pub fn new(storage: S, config: C, query: SoqlQuery) -> Self {
        Self {
            storage,
            config,
            query,
            client: Client::new(),
        }
    }

    async fn request(&self, url: &str, params: &[(&str, &str)]) -> Result<reqwest::Response> {
        let mut request = self.client.get(url);
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(token) = self.config.app_token() {
            request = request.header(APP_TOKEN_HEADER, token);
        }

        let response = request.send().await?;
        tracing::debug!("{} -> {}", url, response.status());
        Ok(response.error_for_status()?)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SoqlPipeline<S, C> {
    async fn extract(&self) -> Result<RawDataset> {
        let metadata_url = self.query.metadata_url();
        tracing::info!("Fetching metadata from {}", metadata_url);
        let metadata: DatasetMetadata = self.request(&metadata_url, &[]).await?.json().await?;

        let results_url = self.query.results_url();
        tracing::info!("Running query against {}", results_url);
        let body: Value = self
            .request(&results_url, &[("$query", self.query.query.as_str())])
            .await?
            .json()
            .await?;

        let Value::Array(items) = body else {
            return Err(EtlError::ProcessingError {
                message: "expected a JSON array of result rows".to_string(),
            });
        };

        let mut records = Vec::with_capacity(items.len());
        for item in items {
            if let Value::Object(fields) = item {
                records.push(Record {
                    data: fields.into_iter().collect(),
                });
            } else {
                tracing::warn!("Skipping non-object result row: {}", item);
            }
        }

        Ok(RawDataset { metadata, records })
    }

    async fn transform(&self, data: RawDataset) -> Result<QueryOutput> {
        let (dtypes, metadata) = normalize_metadata(&data.metadata);
        tracing::debug!("Parsed {} columns from metadata", metadata.len());

        let table = flatten_results(data.records, &dtypes);
        let results_csv = render_results_csv(&table)?;
        let metadata_csv = render_metadata_csv(&metadata)?;

        Ok(QueryOutput {
            metadata,
            table,
            results_csv,
            metadata_csv,
        })
    }

    async fn load(&self, result: QueryOutput) -> Result<String> {
        let name = self.config.output_name();

        self.storage
            .write_file(&format!("{}.csv", name), result.results_csv.as_bytes())
            .await?;
        self.storage
            .write_file(
                &format!("{}_metadata.csv", name),
                result.metadata_csv.as_bytes(),
            )
            .await?;

        Ok(format!("{}/{}.csv", self.config.output_path(), name))
    }
}

fn render_results_csv(table: &FlatTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(table.columns.iter().map(|column| display_value(row.data.get(column))))?;
    }
    finish_csv(writer)
}

fn render_metadata_csv(metadata: &[ColumnMeta]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["field_name", "column_name", "description", "data_type"])?;
    for column in metadata {
        writer.write_record([
            column.field_name.as_str(),
            column.column_name.as_str(),
            column.description.as_deref().unwrap_or(""),
            column.data_type.as_str(),
        ])?;
    }
    finish_csv(writer)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: e.to_string(),
    })
}

// Nulls and absent keys render as empty fields; bare strings render without
// the JSON quoting.
fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

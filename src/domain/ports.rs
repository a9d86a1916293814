use crate::domain::model::{QueryOutput, RawDataset};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn app_token(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn output_name(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RawDataset>;
    async fn transform(&self, data: RawDataset) -> Result<QueryOutput>;
    async fn load(&self, result: QueryOutput) -> Result<String>;
}

use crate::utils::error::Result;
use async_trait::async_trait;

/// One natural-language request to the area code oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    pub system: String,
    pub user: String,
}

/// Fallible free-text oracle. Implementations report transport problems and
/// missing credentials as `Err`; the caller decides how to degrade.
#[async_trait]
pub trait AreaCodeOracle: Send + Sync {
    async fn complete(&self, request: &OracleRequest) -> Result<String>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn oracle_endpoint(&self) -> &str;
    fn oracle_model(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
    fn temperature(&self) -> f32;
    fn output_path(&self) -> &str;
}

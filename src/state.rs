use crate::client::RemoteDataClient;
use crate::config::AppConfig;
use crate::errors::ClientError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub client: Arc<RemoteDataClient>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, ClientError> {
        let client = RemoteDataClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            client: Arc::new(client),
        })
    }
}

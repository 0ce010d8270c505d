//! Provider construction for pipeline runs.
//!
//! Providers are built lazily, once per run, so a run that skips extraction
//! never reads credentials or opens a client.

use std::path::PathBuf;

use macrolab_core::data::{EconomicProvider, FredProvider, MarketProvider, YahooProvider};

use crate::credentials::Credentials;
use crate::pipeline::PipelineError;

/// Source of the providers a run extracts from.
pub trait ProviderSource {
    fn economic(&self) -> Result<Box<dyn EconomicProvider>, PipelineError>;
    fn market(&self) -> Result<Box<dyn MarketProvider>, PipelineError>;
}

/// FRED (key from the credentials file) and Yahoo Finance.
#[derive(Debug, Clone)]
pub struct LiveProviders {
    credentials_path: PathBuf,
}

impl LiveProviders {
    pub fn new(credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
        }
    }
}

impl ProviderSource for LiveProviders {
    fn economic(&self) -> Result<Box<dyn EconomicProvider>, PipelineError> {
        let creds = Credentials::from_file(&self.credentials_path)?;
        Ok(Box::new(FredProvider::new(creds.fred_api_key)?))
    }

    fn market(&self) -> Result<Box<dyn MarketProvider>, PipelineError> {
        Ok(Box::new(YahooProvider::new()?))
    }
}

use crate::settings::ApiConfig;
use crate::submit::response::{parse_response, ResponseEntry};
use crate::submit::vars::VariableDictionary;
use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculateRequest {
    pub image: String,
    pub dict_of_vars: VariableDictionary,
}

/// The external recognition service.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, request: &CalculateRequest) -> Result<Vec<ResponseEntry>>;
}

pub struct CalculateClient {
    client: Client,
    endpoint: url::Url,
}

impl CalculateClient {
    pub fn new(config: &ApiConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sketch_calc/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build calculate http client")?;
        Ok(Self {
            client,
            endpoint: config.calculate_url()?,
        })
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }
}

impl Evaluator for CalculateClient {
    fn evaluate(&self, request: &CalculateRequest) -> Result<Vec<ResponseEntry>> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .with_context(|| format!("POST {}", self.endpoint))?;
        let status = resp.status();
        let body = resp.bytes().context("read calculate response body")?;
        if !status.is_success() {
            bail!(
                "calculate endpoint returned {}: {}",
                status,
                String::from_utf8_lossy(&body)
            );
        }
        parse_response(&body)
    }
}

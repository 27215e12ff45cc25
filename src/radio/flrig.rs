// flrig client
// flrig exposes its rig over XML-RPC; `rig.get_vfo` returns the active
// VFO frequency in Hz.

use reqwest::Client;
use std::time::Duration;

use crate::error::Result;
use crate::xmlrpc;

pub const TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct Flrig {
    http: Client,
    url: String,
}

impl Flrig {
    pub fn new(host: &str, port: &str) -> Self {
        Self::with_url(&format!("http://{}:{}/", host, port))
    }

    pub fn with_url(url: &str) -> Self {
        Self {
            http: Client::new(),
            url: url.to_string(),
        }
    }

    pub async fn frequency(&self) -> Result<String> {
        let vfo = xmlrpc::call(&self.http, &self.url, "rig.get_vfo", &[], TIMEOUT).await?;
        Ok(vfo.trim().to_string())
    }
}

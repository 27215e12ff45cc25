// HamDB lookup
// Free US/Canada callsign database, no login required.

use reqwest::Client;
use std::time::Duration;

use super::{parse_lookup, LookupResult};
use crate::error::Result;

const HAMDB_URL: &str = "http://api.hamdb.org/v1";
const APP_NAME: &str = "sstlog";
const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct HamDb {
    http: Client,
    base_url: String,
}

impl Default for HamDb {
    fn default() -> Self {
        Self::new()
    }
}

impl HamDb {
    pub fn new() -> Self {
        Self::with_base_url(HAMDB_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn lookup(&self, callsign: &str) -> Result<LookupResult> {
        let url = format!("{}/{}/xml/{}", self.base_url, callsign, APP_NAME);
        let doc = self
            .http
            .get(&url)
            .timeout(TIMEOUT)
            .send()
            .await?
            .text()
            .await?;
        parse_lookup(&doc)
    }
}

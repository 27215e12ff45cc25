// QRZ XML data service
// Session based: log in once for a key, pass the key on every lookup, and
// log in again when a reply comes back without one (expired session).

use reqwest::Client;
use std::time::Duration;

use super::{field, parse_reply, LookupResult};
use crate::error::{Error, Result};

const AUTH_TIMEOUT: Duration = Duration::from_secs(1);
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct Qrz {
    http: Client,
    url: String,
    username: String,
    password: String,
    key: Option<String>,
}

impl Qrz {
    pub fn new(url: &str, username: &str, password: &str) -> Self {
        Self {
            http: Client::new(),
            url: url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            key: None,
        }
    }

    /// Obtain a fresh session key
    pub async fn authenticate(&mut self) -> Result<()> {
        log::info!("QRZ: requesting session for {}", self.username);
        let doc = self
            .http
            .get(&self.url)
            .query(&[("username", &self.username), ("password", &self.password)])
            .timeout(AUTH_TIMEOUT)
            .send()
            .await?
            .text()
            .await?;

        let reply = parse_reply(&doc)?;
        self.key = field(&reply, "Key");
        match (&self.key, field(&reply, "Error")) {
            (Some(_), _) => Ok(()),
            (None, Some(error)) => Err(Error::Lookup(format!("QRZ login failed: {}", error))),
            (None, None) => Err(Error::Lookup("QRZ login returned no session key".to_string())),
        }
    }

    pub async fn lookup(&mut self, callsign: &str) -> Result<LookupResult> {
        if self.key.is_none() {
            self.authenticate().await?;
        }

        let reply = parse_reply(&self.query(callsign).await?)?;
        if field(&reply, "Key").is_some() {
            return Ok(LookupResult::from_elements(&reply));
        }

        log::info!("QRZ: session expired, logging in again");
        self.authenticate().await?;
        let reply = parse_reply(&self.query(callsign).await?)?;
        Ok(LookupResult::from_elements(&reply))
    }

    async fn query(&self, callsign: &str) -> Result<String> {
        let key = self.key.as_deref().unwrap_or_default();
        let doc = self
            .http
            .get(&self.url)
            .query(&[("s", key), ("callsign", callsign)])
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await?
            .text()
            .await?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_http;

    fn session(key: &str) -> String {
        format!("<QRZDatabase><Session><Key>{}</Key></Session></QRZDatabase>", key)
    }

    fn record(key: &str) -> String {
        format!(
            "<QRZDatabase><Callsign><call>K1USN</call><fname>Tom</fname><name>Smith</name>\
             <grid>FN42</grid></Callsign><Session><Key>{}</Key></Session></QRZDatabase>",
            key
        )
    }

    #[tokio::test]
    async fn test_login_then_lookup() {
        let (url, server) = serve_http(vec![session("k1"), record("k1")]).await;
        let mut qrz = Qrz::new(&url, "w1aw", "secret");

        let result = qrz.lookup("K1USN").await.unwrap();
        assert_eq!(result.grid.as_deref(), Some("FN42"));
        assert_eq!(result.name.as_deref(), Some("Tom Smith"));

        let requests = server.await.unwrap();
        assert!(requests[0].contains("username=w1aw"));
        assert!(requests[0].contains("password=secret"));
        assert!(requests[1].contains("s=k1"));
        assert!(requests[1].contains("callsign=K1USN"));
    }

    #[tokio::test]
    async fn test_expired_session_retried_once() {
        let expired =
            "<QRZDatabase><Session><Error>Session Timeout</Error></Session></QRZDatabase>".to_string();
        let (url, server) =
            serve_http(vec![session("old"), expired, session("new"), record("new")]).await;
        let mut qrz = Qrz::new(&url, "w1aw", "secret");

        let result = qrz.lookup("K1USN").await.unwrap();
        assert_eq!(result.grid.as_deref(), Some("FN42"));

        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 4);
        assert!(requests[3].contains("s=new"));
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let denied =
            "<QRZDatabase><Session><Error>Username/password incorrect</Error></Session></QRZDatabase>"
                .to_string();
        let (url, _server) = serve_http(vec![denied]).await;
        let mut qrz = Qrz::new(&url, "w1aw", "wrong");

        match qrz.lookup("K1USN").await {
            Err(Error::Lookup(msg)) => assert!(msg.contains("incorrect")),
            other => panic!("expected lookup error, got {:?}", other),
        }
    }
}

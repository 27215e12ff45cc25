//! Callsign lookup services
//!
//! Optional enrichment of a logged contact with the other operator's grid
//! square and name. Both services answer with a small XML document; only a
//! handful of tags are read.

pub mod hamdb;
pub mod qrz;

use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::xmlrpc::{parse_elements, Element};

pub use hamdb::HamDb;
pub use qrz::Qrz;

/// Placeholder the services use for missing fields
const NOT_FOUND: &str = "NOT_FOUND";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupResult {
    pub grid: Option<String>,
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum LookupClient {
    Qrz(Qrz),
    HamDb(HamDb),
}

impl LookupClient {
    /// QRZ wins when both services are enabled
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        if settings.useqrz != 0 {
            Some(LookupClient::Qrz(Qrz::new(
                &settings.qrzurl,
                &settings.qrzusername,
                &settings.qrzpassword,
            )))
        } else if settings.usehamdb != 0 {
            Some(LookupClient::HamDb(HamDb::new()))
        } else {
            None
        }
    }

    pub async fn lookup(&mut self, callsign: &str) -> Result<LookupResult> {
        match self {
            LookupClient::Qrz(qrz) => qrz.lookup(callsign).await,
            LookupClient::HamDb(hamdb) => hamdb.lookup(callsign).await,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LookupClient::Qrz(_) => "QRZ",
            LookupClient::HamDb(_) => "HamDB",
        }
    }
}

/// Elements of a lookup reply
pub(crate) fn parse_reply(doc: &str) -> Result<Vec<Element>> {
    parse_elements(doc).map_err(|e| Error::Lookup(format!("malformed reply: {}", e)))
}

/// First value of `tag`, treating empty text and `NOT_FOUND` as absent
pub(crate) fn field(elements: &[Element], tag: &str) -> Option<String> {
    elements
        .iter()
        .find(|e| e.name == tag)
        .map(|e| e.text.trim())
        .filter(|v| !v.is_empty() && *v != NOT_FOUND)
        .map(str::to_string)
}

impl LookupResult {
    fn from_elements(elements: &[Element]) -> Self {
        let name = match (field(elements, "fname"), field(elements, "name")) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        };

        LookupResult {
            grid: field(elements, "grid"),
            name,
            nickname: field(elements, "nickname"),
            error: field(elements, "Error"),
        }
    }

    /// Name to log: the full name, or the nickname when there is none
    pub fn operator_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.nickname.as_deref())
    }
}

/// Read grid, name and nickname out of a lookup reply
pub fn parse_lookup(doc: &str) -> Result<LookupResult> {
    Ok(LookupResult::from_elements(&parse_reply(doc)?))
}

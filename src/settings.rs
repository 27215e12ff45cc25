//! Persistent settings and the past-contacts cache
//!
//! Both live as JSON documents in the operator's home directory. Missing
//! keys fall back to defaults so files written by older versions still load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const SETTINGS_FILE: &str = ".sstlog.json";
pub const PAST_CONTACTS_FILE: &str = "pastcontacts.json";

/// Rig control backend (`userigcontrol`)
pub const RIG_NONE: u8 = 0;
pub const RIG_RIGCTLD: u8 = 1;
pub const RIG_FLRIG: u8 = 2;

/// Keyer backend (`cwtype`)
pub const CW_NONE: u8 = 0;
pub const CW_DAEMON: u8 = 1;
pub const CW_PYWINKEYER: u8 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mycallsign: String,
    pub myexchange: String,
    pub qrzusername: String,
    pub qrzpassword: String,
    pub qrzurl: String,
    pub useqrz: u8,
    pub usehamdb: u8,
    pub userigcontrol: u8,
    pub rigcontrolip: String,
    pub rigcontrolport: String,
    pub cwtype: u8,
    pub cwip: String,
    pub cwport: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mycallsign: String::new(),
            myexchange: String::new(),
            qrzusername: "w1aw".to_string(),
            qrzpassword: "secret".to_string(),
            qrzurl: "https://xmldata.qrz.com/xml/134".to_string(),
            useqrz: 0,
            usehamdb: 0,
            userigcontrol: RIG_NONE,
            rigcontrolip: "localhost".to_string(),
            rigcontrolport: "12345".to_string(),
            cwtype: CW_NONE,
            cwip: "localhost".to_string(),
            cwport: 6789,
        }
    }
}

impl Settings {
    /// Read settings, writing the defaults out first if the file is absent
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No settings at {}, writing defaults", path.display());
            let settings = Settings::default();
            settings.save(path)?;
            return Ok(settings);
        }
        let text = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&text)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        log::info!(
            "Saved settings: call={} exchange={} qrz={} ({}:***) rig={} cw={}",
            self.mycallsign,
            self.myexchange,
            self.useqrz,
            self.qrzusername,
            self.userigcontrol,
            self.cwtype
        );
        Ok(())
    }

    pub fn rig_address(&self) -> String {
        format!("{}:{}", self.rigcontrolip, self.rigcontrolport)
    }

    pub fn cw_address(&self) -> String {
        format!("{}:{}", self.cwip, self.cwport)
    }
}

/// Exchanges copied from earlier contacts, keyed by callsign
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PastContacts(BTreeMap<String, String>);

impl PastContacts {
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let past = PastContacts::default();
            past.save(path)?;
            return Ok(past);
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    pub fn get(&self, callsign: &str) -> Option<&str> {
        self.0.get(callsign).map(String::as_str)
    }

    pub fn insert(&mut self, callsign: &str, exchange: &str) {
        self.0.insert(callsign.to_string(), exchange.to_string());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `$HOME/<file>`, or the working directory when no home is known
pub fn home_file(file: &str) -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);

        let settings = Settings::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.rig_address(), "localhost:12345");
        assert_eq!(settings.cw_address(), "localhost:6789");
    }

    #[test]
    fn test_old_settings_file_without_cw_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(
            &path,
            r#"{"mycallsign":"K6GTE","myexchange":"MIKE CA","useqrz":0,"userigcontrol":1,
               "rigcontrolip":"127.0.0.1","rigcontrolport":"4532","usehamdb":1}"#,
        )
        .unwrap();

        let settings = Settings::load_or_create(&path).unwrap();
        assert_eq!(settings.mycallsign, "K6GTE");
        assert_eq!(settings.userigcontrol, RIG_RIGCTLD);
        assert_eq!(settings.cwtype, CW_NONE);
        assert_eq!(settings.cwport, 6789);
    }

    #[test]
    fn test_past_contacts_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PAST_CONTACTS_FILE);

        let mut past = PastContacts::load_or_create(&path).unwrap();
        assert!(past.is_empty());
        past.insert("K1USN", "TOM MA");
        past.save(&path).unwrap();

        let reloaded = PastContacts::load_or_create(&path).unwrap();
        assert_eq!(reloaded.get("K1USN"), Some("TOM MA"));
        assert_eq!(reloaded.len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"K1USN":"TOM MA"}"#);
    }
}

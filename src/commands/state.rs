//! Application State
//!
//! The session context: database pool, station profile, current band and
//! the optional external collaborators. Owned by the coordinating loop and
//! passed by reference to every command handler.

use sqlx::{Pool, Sqlite};
use std::path::{Path, PathBuf};

use crate::adif::bands::{classify, default_freq, parse_hz};
use crate::cw::{Keyer, Macros, MACRO_FILE};
use crate::db;
use crate::error::{Error, Result};
use crate::lookup::LookupClient;
use crate::radio::{RadioClient, RadioPoller, RadioStatus};
use crate::settings::{home_file, PastContacts, Settings, PAST_CONTACTS_FILE, SETTINGS_FILE};

pub const DEFAULT_DB_FILE: &str = "SST.db";
pub const ADIF_FILE: &str = "SST.adi";
pub const STATS_FILE: &str = "SST_Statistics.txt";

/// Band selected when the session starts
const START_BAND: &str = "40";

/// Where the session keeps its files
#[derive(Debug, Clone)]
pub struct StatePaths {
    pub db: PathBuf,
    pub settings: PathBuf,
    pub past_contacts: PathBuf,
    pub macros: PathBuf,
    /// Directory receiving the export and score report
    pub output_dir: PathBuf,
}

impl StatePaths {
    /// Settings and past contacts in the home directory, everything else
    /// relative to the working directory
    pub fn standard(db: Option<PathBuf>, settings: Option<PathBuf>) -> Self {
        Self {
            db: db.unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE)),
            settings: settings.unwrap_or_else(|| home_file(SETTINGS_FILE)),
            past_contacts: home_file(PAST_CONTACTS_FILE),
            macros: PathBuf::from(MACRO_FILE),
            output_dir: PathBuf::from("."),
        }
    }

    /// Everything under one directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            db: dir.join(DEFAULT_DB_FILE),
            settings: dir.join(SETTINGS_FILE),
            past_contacts: dir.join(PAST_CONTACTS_FILE),
            macros: dir.join(MACRO_FILE),
            output_dir: dir.to_path_buf(),
        }
    }

    pub fn adif_file(&self) -> PathBuf {
        self.output_dir.join(ADIF_FILE)
    }

    pub fn stats_file(&self) -> PathBuf {
        self.output_dir.join(STATS_FILE)
    }
}

/// Currently selected band and the frequency logged with new contacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandState {
    band: String,
    frequency: String,
    radio_online: bool,
}

impl Default for BandState {
    fn default() -> Self {
        Self {
            band: START_BAND.to_string(),
            frequency: default_freq(START_BAND).unwrap_or_default().to_string(),
            radio_online: false,
        }
    }
}

impl BandState {
    pub fn band(&self) -> &str {
        &self.band
    }

    pub fn frequency(&self) -> &str {
        &self.frequency
    }

    pub fn radio_online(&self) -> bool {
        self.radio_online
    }

    /// Manual band selection. Without a live radio the band's default
    /// frequency becomes the logged frequency.
    pub fn change_band(&mut self, band: &str) -> Result<()> {
        let freq = default_freq(band)
            .ok_or_else(|| Error::Validation(format!("unknown band '{}'", band)))?;
        self.band = band.to_string();
        if !self.radio_online {
            self.frequency = freq.to_string();
        }
        log::info!("Band set to {} ({} Hz)", self.band, self.frequency);
        Ok(())
    }

    /// Apply a radio reading, stored as whole Hz. Returns true when the
    /// frequency changed. A reading that is not a number leaves the state
    /// untouched.
    pub fn apply_reading(&mut self, reading: &str) -> Result<bool> {
        let hz = parse_hz(reading).ok_or_else(|| {
            Error::Validation(format!("radio reading '{}' is not a frequency", reading.trim()))
        })?;
        self.radio_online = true;

        let frequency = hz.to_string();
        if frequency == self.frequency {
            return Ok(false);
        }
        self.band = classify(&frequency).to_string();
        self.frequency = frequency;
        log::debug!("Radio at {} Hz, band {}", self.frequency, self.band);
        Ok(true)
    }

    /// A failed poll. The last reading stays until the band is changed by hand.
    pub fn radio_lost(&mut self) {
        if self.radio_online {
            log::warn!("Radio went offline on band {}", self.band);
        }
        self.radio_online = false;
    }
}

pub struct AppState {
    pub db: Pool<Sqlite>,
    pub settings: Settings,
    pub past_contacts: PastContacts,
    pub band: BandState,
    pub radio: Option<RadioClient>,
    pub radio_status: RadioStatus,
    pub poller: RadioPoller,
    pub lookup: Option<LookupClient>,
    pub keyer: Option<Keyer>,
    pub macros: Macros,
    pub paths: StatePaths,
}

impl AppState {
    /// Open the log and load every persisted document, creating defaults
    /// for anything missing
    pub async fn open(paths: StatePaths) -> Result<Self> {
        let db = db::init_db(&paths.db).await?;
        let settings = Settings::load_or_create(&paths.settings)?;
        let past_contacts = PastContacts::load_or_create(&paths.past_contacts)?;
        let macros = Macros::load_or_create(&paths.macros)?;

        let mut state = Self {
            db,
            settings,
            past_contacts,
            band: BandState::default(),
            radio: None,
            radio_status: RadioStatus::Disabled,
            poller: RadioPoller::new(),
            lookup: None,
            keyer: None,
            macros,
            paths,
        };
        state.connect_collaborators();
        Ok(state)
    }

    /// Rebuild radio, lookup and keyer clients from the current settings
    pub fn connect_collaborators(&mut self) {
        self.radio = RadioClient::from_settings(&self.settings);
        self.radio_status = match &self.radio {
            Some(radio) => {
                log::info!("Rig control via {} at {}", radio.name(), self.settings.rig_address());
                RadioStatus::Offline
            }
            None => RadioStatus::Disabled,
        };
        if self.radio.is_none() {
            self.band.radio_lost();
        }

        self.lookup = LookupClient::from_settings(&self.settings);
        if let Some(lookup) = &self.lookup {
            log::info!("Callsign lookup via {}", lookup.name());
        }

        self.keyer = Keyer::from_settings(&self.settings);
        if self.keyer.is_some() {
            log::info!("CW keyer at {}", self.settings.cw_address());
        }
    }

    /// Record the outcome of a radio poll issued under `generation`.
    /// Results older than the newest applied one are dropped.
    pub fn apply_poll(&mut self, generation: u64, reading: Result<String>) -> bool {
        if !self.poller.accept(generation) {
            return false;
        }
        match reading.and_then(|freq| self.band.apply_reading(&freq)) {
            Ok(changed) => {
                self.radio_status = RadioStatus::Online;
                changed
            }
            Err(e) => {
                if self.radio_status != RadioStatus::Offline {
                    log::warn!("Radio poll failed: {}", e);
                }
                self.radio_status = RadioStatus::Offline;
                self.band.radio_lost();
                false
            }
        }
    }
}

#[cfg(test)]
impl AppState {
    /// Session on an in-memory log with every file in `dir`
    pub async fn for_test(dir: &Path) -> Self {
        let paths = StatePaths::in_dir(dir);
        Self {
            db: db::test_pool().await,
            settings: Settings::default(),
            past_contacts: PastContacts::default(),
            band: BandState::default(),
            radio: None,
            radio_status: RadioStatus::Disabled,
            poller: RadioPoller::new(),
            lookup: None,
            keyer: None,
            macros: Macros::default(),
            paths,
        }
    }
}

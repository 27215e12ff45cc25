//! Settings commands
//!
//! This module handles:
//! - change_my_call / change_my_exchange: station profile edits
//! - get_setting / set_setting: single keys of the settings document
//! - db_stats: contact and band counts logged when a log is opened
//!
//! Every change is written to disk immediately.

use serde_json::Value;

use super::qso::{clean_callsign, clean_exchange};
use super::state::AppState;
use crate::db::DbStats;
use crate::error::{Error, Result};
use crate::settings::Settings;

// ============================================================================
// Station Profile
// ============================================================================

pub fn change_my_call(state: &mut AppState, callsign: &str) -> Result<String> {
    let callsign = clean_callsign(callsign);
    state.settings.mycallsign = callsign.clone();
    state.settings.save(&state.paths.settings)?;
    Ok(callsign)
}

pub fn change_my_exchange(state: &mut AppState, exchange: &str) -> Result<String> {
    let exchange = clean_exchange(exchange);
    state.settings.myexchange = exchange.clone();
    state.settings.save(&state.paths.settings)?;
    Ok(exchange)
}

// ============================================================================
// Settings Document
// ============================================================================

pub fn get_setting(state: &AppState, key: &str) -> Result<Option<String>> {
    let doc = serde_json::to_value(&state.settings)?;
    Ok(doc.get(key).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }))
}

/// Set one key, keeping the type of the existing value. Collaborator
/// clients are rebuilt so rig, lookup and keyer changes apply at once.
pub fn set_setting(state: &mut AppState, key: &str, value: &str) -> Result<()> {
    log::info!(
        "Setting {} = {}",
        key,
        if key.contains("password") { "***" } else { value }
    );

    let mut doc = serde_json::to_value(&state.settings)?;
    let slot = doc
        .get_mut(key)
        .ok_or_else(|| Error::Validation(format!("unknown setting '{}'", key)))?;
    *slot = if slot.is_number() {
        let n: u64 = value.trim().parse().map_err(|_| {
            Error::Validation(format!("setting '{}' needs a number, got '{}'", key, value))
        })?;
        Value::from(n)
    } else {
        Value::from(value)
    };

    let settings: Settings = serde_json::from_value(doc)
        .map_err(|e| Error::Validation(format!("setting '{}': {}", key, e)))?;
    settings.save(&state.paths.settings)?;
    state.settings = settings;
    state.connect_collaborators();
    Ok(())
}

// ============================================================================
// Database
// ============================================================================

/// Contact and band counts, reported when a log is opened
pub async fn db_stats(state: &AppState) -> Result<DbStats> {
    crate::db::get_db_stats(&state.db).await
}

//! Duplicate check for a callsign being entered
//!
//! Advisory only: the result never blocks logging.

use serde::Serialize;

use super::qso::clean_callsign;
use super::state::AppState;
use crate::db::qso;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DupeCheck {
    /// Callsign already worked on the current band
    pub is_dupe: bool,
    /// Bands this callsign has been worked on, newest first
    pub worked_bands: Vec<String>,
    /// Exchange to prefill, only offered while the exchange field is empty
    pub suggested_exchange: Option<String>,
}

/// Check `callsign` against the log for the current band.
///
/// A database failure is logged and reported as "not a dupe, no suggestion".
pub async fn check_dupe(state: &AppState, callsign: &str, entered_exchange: &str) -> DupeCheck {
    let callsign = clean_callsign(callsign);
    if callsign.is_empty() {
        return DupeCheck::default();
    }

    let matches = match qso::by_callsign(&state.db, &callsign).await {
        Ok(matches) => matches,
        Err(e) => {
            log::error!("Dupe check for {} failed: {}", callsign, e);
            return DupeCheck::default();
        }
    };

    let band = state.band.band();
    let is_dupe = matches.iter().any(|c| c.band == band);
    if is_dupe {
        log::info!("{} is a dupe on {}", callsign, band);
    }

    let mut worked_bands: Vec<String> = Vec::new();
    for contact in &matches {
        if !worked_bands.contains(&contact.band) {
            worked_bands.push(contact.band.clone());
        }
    }

    let suggested_exchange = if entered_exchange.trim().is_empty() {
        matches
            .first()
            .map(|c| c.exchange())
            .or_else(|| state.past_contacts.get(&callsign).map(str::to_string))
    } else {
        None
    };

    DupeCheck {
        is_dupe,
        worked_bands,
        suggested_exchange,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::qso::log_contact;

    #[tokio::test]
    async fn test_same_band_is_dupe_other_band_is_not() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::for_test(dir.path()).await;
        log_contact(&mut state, "K1USN", "TOM MA").await.unwrap();

        let check = check_dupe(&state, "K1USN", "").await;
        assert!(check.is_dupe);
        assert_eq!(check.worked_bands, vec!["40"]);
        assert_eq!(check.suggested_exchange.as_deref(), Some("TOM MA"));

        state.band.change_band("20").unwrap();
        let check = check_dupe(&state, "k1usn", "").await;
        assert!(!check.is_dupe);
        assert_eq!(check.suggested_exchange.as_deref(), Some("TOM MA"));
    }

    #[tokio::test]
    async fn test_match_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::for_test(dir.path()).await;
        log_contact(&mut state, "K1USN", "TOM MA").await.unwrap();

        assert!(!check_dupe(&state, "K1US", "").await.is_dupe);
        assert!(!check_dupe(&state, "K1USN/P", "").await.is_dupe);
    }

    #[tokio::test]
    async fn test_suggestion_rules() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::for_test(dir.path()).await;
        log_contact(&mut state, "K1USN", "TOM MA").await.unwrap();
        log_contact(&mut state, "K1USN", "THOMAS NH").await.unwrap();

        // Most recent match wins
        let check = check_dupe(&state, "K1USN", "").await;
        assert_eq!(check.suggested_exchange.as_deref(), Some("THOMAS NH"));

        // Never overrides typing in progress
        let check = check_dupe(&state, "K1USN", "T").await;
        assert_eq!(check.suggested_exchange, None);
        assert!(check.is_dupe);

        // Falls back to earlier sessions
        state.past_contacts.insert("W1AW", "HIRAM CT");
        let check = check_dupe(&state, "W1AW", "").await;
        assert!(!check.is_dupe);
        assert_eq!(check.suggested_exchange.as_deref(), Some("HIRAM CT"));

        assert_eq!(check_dupe(&state, "N0CALL", "").await, DupeCheck::default());
    }

    #[tokio::test]
    async fn test_database_failure_is_not_a_dupe() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::for_test(dir.path()).await;
        log_contact(&mut state, "K1USN", "TOM MA").await.unwrap();
        state.past_contacts.insert("K1USN", "TOM MA");

        state.db.close().await;
        assert_eq!(check_dupe(&state, "K1USN", "").await, DupeCheck::default());
    }
}

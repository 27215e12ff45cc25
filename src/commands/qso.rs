//! Contact commands
//!
//! - log_contact: clean operator input, enrich via lookup, insert
//! - edit_contact / delete_contact: corrections from the edit flow
//! - log_lines: the on-screen contact list, newest first

use super::state::AppState;
use crate::adif::bands::is_band_label;
use crate::commands::time_utils::normalize_timestamp;
use crate::db::{qso, Contact, ContactEdit, NewContact};
use crate::error::{Error, Result};

// ============================================================================
// Input Normalization
// ============================================================================

/// Uppercase alphanumerics and `/`; everything else is dropped
pub fn clean_callsign(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '/')
        .collect::<String>()
        .to_uppercase()
}

/// Uppercase letters and spaces; everything else is dropped
pub fn clean_exchange(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphabetic() || *c == ' ')
        .collect::<String>()
        .to_uppercase()
}

/// `(name, qualifier)` from the first two tokens, if there are two
pub fn parse_exchange(text: &str) -> Option<(String, String)> {
    let mut tokens = text.split_whitespace();
    let name = tokens.next()?;
    let qualifier = tokens.next()?;
    Some((name.to_string(), qualifier.to_string()))
}

// ============================================================================
// Commands
// ============================================================================

/// Log a contact on the current band.
///
/// Returns `Ok(None)` without touching the log when the callsign is empty
/// or the exchange has fewer than two tokens.
pub async fn log_contact(
    state: &mut AppState,
    callsign: &str,
    exchange: &str,
) -> Result<Option<i64>> {
    let callsign = clean_callsign(callsign);
    let exchange = clean_exchange(exchange);
    let Some((name, qualifier)) = parse_exchange(&exchange) else {
        log::debug!("Not logging: incomplete exchange '{}'", exchange);
        return Ok(None);
    };
    if callsign.is_empty() {
        log::debug!("Not logging: empty callsign");
        return Ok(None);
    }

    state
        .past_contacts
        .insert(&callsign, &format!("{} {}", name, qualifier));
    if let Err(e) = state.past_contacts.save(&state.paths.past_contacts) {
        log::warn!("Could not save past contacts: {}", e);
    }

    let mut contact = NewContact {
        callsign,
        name,
        qualifier,
        frequency: state.band.frequency().to_string(),
        band: state.band.band().to_string(),
        ..Default::default()
    };

    if let Some(lookup) = state.lookup.as_mut() {
        match lookup.lookup(&contact.callsign).await {
            Ok(found) => {
                if let Some(error) = &found.error {
                    log::info!("{} lookup of {}: {}", lookup.name(), contact.callsign, error);
                }
                contact.opname = found.operator_name().unwrap_or_default().to_string();
                contact.grid = found.grid.unwrap_or_default();
            }
            Err(e) => log::warn!("{} lookup of {} failed: {}", lookup.name(), contact.callsign, e),
        }
    }

    let id = qso::insert(&state.db, &contact).await?;
    Ok(Some(id))
}

/// Replace the correctable fields of a logged contact
pub async fn edit_contact(
    state: &AppState,
    id: i64,
    callsign: &str,
    exchange: &str,
    date_time: &str,
    band: &str,
) -> Result<()> {
    let callsign = clean_callsign(callsign);
    if callsign.is_empty() {
        return Err(Error::Validation("callsign is empty".to_string()));
    }
    let (name, qualifier) = parse_exchange(&clean_exchange(exchange))
        .ok_or_else(|| Error::Validation(format!("exchange '{}' needs a name and a qualifier", exchange)))?;
    if !is_band_label(band) {
        return Err(Error::Validation(format!("unknown band '{}'", band)));
    }

    let edit = ContactEdit {
        callsign,
        name,
        qualifier,
        date_time: normalize_timestamp(date_time)?,
        band: band.to_string(),
    };
    qso::update(&state.db, id, &edit).await
}

pub async fn delete_contact(state: &AppState, id: i64) -> Result<()> {
    qso::delete(&state.db, id).await
}

/// One list line: `ID CALL NAME QUALIFIER DATE TIME BAND`
pub fn format_contact(contact: &Contact) -> String {
    format!(
        "{:03} {:<11} {:<12} {} {} {:>3}",
        contact.id, contact.callsign, contact.name, contact.qualifier, contact.date_time, contact.band
    )
}

/// The contact list as shown on screen, newest first
pub async fn log_lines(state: &AppState) -> Result<Vec<String>> {
    let contacts = qso::all_newest_first(&state.db).await?;
    Ok(contacts.iter().map(format_contact).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_input() {
        assert_eq!(clean_callsign(" k6gte/p! "), "K6GTE/P");
        assert_eq!(clean_exchange("mike, ca 5"), "MIKE CA ");
        assert_eq!(
            parse_exchange("MIKE CA"),
            Some(("MIKE".to_string(), "CA".to_string()))
        );
        assert_eq!(parse_exchange("  MIKE  "), None);
        assert_eq!(parse_exchange(""), None);
    }

    #[tokio::test]
    async fn test_log_contact_adds_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::for_test(dir.path()).await;

        let id = log_contact(&mut state, "k1usn", "tom ma").await.unwrap().unwrap();
        let again = log_contact(&mut state, "w1aw", "hiram ct").await.unwrap().unwrap();
        assert_ne!(id, again);
        assert_eq!(qso::count(&state.db).await.unwrap(), 2);

        let stored = qso::get(&state.db, id).await.unwrap();
        assert_eq!(stored.callsign, "K1USN");
        assert_eq!(stored.name, "TOM");
        assert_eq!(stored.qualifier, "MA");
        assert_eq!(stored.band, "40");
        assert_eq!(stored.frequency, "7030000");
        assert_eq!(state.past_contacts.get("K1USN"), Some("TOM MA"));
        assert!(state.paths.past_contacts.exists());
    }

    #[tokio::test]
    async fn test_incomplete_input_is_not_logged() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::for_test(dir.path()).await;

        assert_eq!(log_contact(&mut state, "", "TOM MA").await.unwrap(), None);
        assert_eq!(log_contact(&mut state, "!!", "TOM MA").await.unwrap(), None);
        assert_eq!(log_contact(&mut state, "K1USN", "TOM").await.unwrap(), None);
        assert_eq!(log_contact(&mut state, "K1USN", "").await.unwrap(), None);
        assert_eq!(qso::count(&state.db).await.unwrap(), 0);
        assert!(state.past_contacts.is_empty());
    }

    #[tokio::test]
    async fn test_logged_with_current_band() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::for_test(dir.path()).await;
        state.band.apply_reading("14041500").unwrap();

        let id = log_contact(&mut state, "K1USN", "TOM MA").await.unwrap().unwrap();
        let stored = qso::get(&state.db, id).await.unwrap();
        assert_eq!(stored.band, "20");
        assert_eq!(stored.frequency, "14041500");
    }

    #[tokio::test]
    async fn test_lookup_fills_grid_and_nickname() {
        use crate::lookup::{HamDb, LookupClient};
        use crate::test_support::serve_http;

        let body = "<hamdb><callsign><call>K1USN</call><nickname>Tom</nickname>\
                    <grid>FN42</grid></callsign></hamdb>"
            .to_string();
        let (url, _server) = serve_http(vec![body]).await;
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::for_test(dir.path()).await;
        state.lookup = Some(LookupClient::HamDb(HamDb::with_base_url(&url)));

        let id = log_contact(&mut state, "K1USN", "TOM MA").await.unwrap().unwrap();
        let stored = qso::get(&state.db, id).await.unwrap();
        assert_eq!(stored.grid, "FN42");
        assert_eq!(stored.opname, "Tom");
    }

    #[tokio::test]
    async fn test_failed_lookup_still_logs() {
        use crate::lookup::{HamDb, LookupClient};
        use crate::test_support::serve_http;

        let (url, _server) = serve_http(vec!["<hamdb><callsign>".to_string()]).await;
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::for_test(dir.path()).await;
        state.lookup = Some(LookupClient::HamDb(HamDb::with_base_url(&url)));

        let id = log_contact(&mut state, "K1USN", "TOM MA").await.unwrap().unwrap();
        let stored = qso::get(&state.db, id).await.unwrap();
        assert_eq!(stored.grid, "");
        assert_eq!(stored.opname, "");
    }

    #[tokio::test]
    async fn test_edit_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::for_test(dir.path()).await;
        let id = log_contact(&mut state, "K1USN", "TOM MA").await.unwrap().unwrap();

        edit_contact(&state, id, "k1usn/m", "thomas nh", "2026-01-08T23:24:45", "20")
            .await
            .unwrap();
        let stored = qso::get(&state.db, id).await.unwrap();
        assert_eq!(stored.callsign, "K1USN/M");
        assert_eq!(stored.exchange(), "THOMAS NH");
        assert_eq!(stored.date_time, "2026-01-08 23:24:45");
        assert_eq!(stored.band, "20");

        assert!(matches!(
            edit_contact(&state, id, "K1USN", "TOM", "2026-01-08 23:24:45", "20").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            edit_contact(&state, id, "K1USN", "TOM MA", "2026-01-08 23:24:45", "11").await,
            Err(Error::Validation(_))
        ));

        delete_contact(&state, id).await.unwrap();
        assert!(log_lines(&state).await.unwrap().is_empty());
        assert!(matches!(delete_contact(&state, id).await, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_format_contact() {
        let contact = Contact {
            id: 7,
            callsign: "K1USN".to_string(),
            name: "TOM".to_string(),
            qualifier: "MA".to_string(),
            date_time: "2026-01-08 23:24:45".to_string(),
            frequency: "7030000".to_string(),
            band: "40".to_string(),
            grid: String::new(),
            opname: String::new(),
        };
        assert_eq!(
            format_contact(&contact),
            "007 K1USN       TOM          MA 2026-01-08 23:24:45  40"
        );
    }
}

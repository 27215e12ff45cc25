//! CW macro commands

use super::state::AppState;
use crate::cw::process_macro;
use crate::error::{Error, Result};

/// Expand the macro on `fkey` and hand it to the keyer.
/// Returns the text that was sent.
pub async fn send_macro(
    state: &AppState,
    fkey: &str,
    his_call: &str,
    his_exchange: &str,
) -> Result<String> {
    let template = state
        .macros
        .get(fkey)
        .ok_or_else(|| Error::Validation(format!("no macro on {}", fkey.to_uppercase())))?;
    let text = process_macro(
        &template.text,
        &state.settings.mycallsign,
        &state.settings.myexchange,
        his_call,
        his_exchange,
    );

    let keyer = state
        .keyer
        .as_ref()
        .ok_or_else(|| Error::Keyer("no keyer configured".to_string()))?;
    keyer.send(&text).await?;
    Ok(text)
}

/// `F1: CQ` style labels for the help screen
pub fn macro_labels(state: &AppState) -> Vec<String> {
    state
        .macros
        .iter()
        .map(|(fkey, m)| format!("{}: {}", fkey, m.label))
        .collect()
}

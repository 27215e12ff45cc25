//! ADIF export commands
//!
//! - export_adif: write the whole log to the submission file
//! - generate_logs: score report plus export, as one operator action

use std::fs;

use super::score;
use super::state::AppState;
use crate::adif::write_adif;
use crate::db::qso;
use crate::error::Result;

/// Overwrite the export file with every contact, oldest first.
/// The document is rendered completely before the file is touched.
pub async fn export_adif(state: &AppState) -> Result<usize> {
    let contacts = qso::all(&state.db).await?;
    let document = write_adif(&contacts, &state.settings.myexchange)?;

    let path = state.paths.adif_file();
    fs::write(&path, document)?;
    log::info!("Exported {} contacts to {}", contacts.len(), path.display());
    Ok(contacts.len())
}

/// Recompute the score report and write the export. Returns the status line.
pub async fn generate_logs(state: &AppState) -> Result<String> {
    score::write_report(state).await?;
    export_adif(state).await?;
    Ok("SST.adi saved.".to_string())
}

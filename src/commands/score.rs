//! Contest score
//!
//! Per band: QSOs, distinct state/province qualifiers, and DX contacts.
//! Every DX contact counts as a multiplier, not just distinct ones.
//! Score is total QSOs times total multipliers.

use serde::Serialize;
use std::fmt::Write as _;
use std::fs;

use super::state::AppState;
use crate::db::qso;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BandTally {
    pub band: String,
    pub qsos: i64,
    pub domestic_mults: i64,
    pub dx: i64,
}

impl BandTally {
    pub fn mults(&self) -> i64 {
        self.domestic_mults + self.dx
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub bands: Vec<BandTally>,
    pub total_qsos: i64,
    pub total_mults: i64,
    pub total_score: i64,
}

impl Score {
    pub fn from_tallies(bands: Vec<BandTally>) -> Self {
        let total_qsos: i64 = bands.iter().map(|b| b.qsos).sum();
        let total_mults: i64 = bands.iter().map(BandTally::mults).sum();
        Self {
            bands,
            total_qsos,
            total_mults,
            total_score: total_qsos * total_mults,
        }
    }

    /// Score report text, CRLF line endings
    pub fn report(&self) -> String {
        let mut out = String::new();
        for b in &self.bands {
            let _ = write!(
                out,
                "band:{} QSOs:{} state and province:{} dx:{} mult:{}\r\n",
                b.band,
                b.qsos,
                b.domestic_mults,
                b.dx,
                b.mults()
            );
        }
        let _ = write!(out, "Total QSO: {}\r\n", self.total_qsos);
        let _ = write!(out, "Total Mults: {}\r\n", self.total_mults);
        let _ = write!(out, "Total Score: {}\r\n", self.total_score);
        out
    }
}

/// Tally the whole log. A band whose query fails is logged and left out.
pub async fn recompute(state: &AppState) -> Result<Score> {
    let bands = qso::distinct_bands(&state.db).await?;

    let mut tallies = Vec::with_capacity(bands.len());
    for band in bands {
        match qso::band_counts(&state.db, &band).await {
            Ok((qsos, domestic_mults, dx)) => tallies.push(BandTally {
                band,
                qsos,
                domestic_mults,
                dx,
            }),
            Err(e) => log::error!("Score for band {} skipped: {}", band, e),
        }
    }

    let score = Score::from_tallies(tallies);
    log::debug!(
        "Score: {} QSOs x {} mults = {}",
        score.total_qsos,
        score.total_mults,
        score.total_score
    );
    Ok(score)
}

/// Recompute and overwrite the score report file
pub async fn write_report(state: &AppState) -> Result<Score> {
    let score = recompute(state).await?;
    let report = score.report();
    if !report.is_ascii() {
        return Err(Error::Export("score report is not ASCII".to_string()));
    }
    fs::write(state.paths.stats_file(), report)?;
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::qso::{delete_contact, log_contact};

    #[tokio::test]
    async fn test_single_band_example() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::for_test(dir.path()).await;
        log_contact(&mut state, "K1USN", "TOM MA").await.unwrap();
        log_contact(&mut state, "W1AW", "HIRAM MA").await.unwrap();
        log_contact(&mut state, "G4XYZ", "JOHN DX").await.unwrap();

        let score = recompute(&state).await.unwrap();
        assert_eq!(
            score.bands,
            vec![BandTally {
                band: "40".to_string(),
                qsos: 3,
                domestic_mults: 1,
                dx: 1,
            }]
        );
        assert_eq!(score.total_qsos, 3);
        assert_eq!(score.total_mults, 2);
        assert_eq!(score.total_score, 6);
    }

    #[tokio::test]
    async fn test_mults_are_per_band_and_dx_counts_every_contact() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::for_test(dir.path()).await;
        log_contact(&mut state, "K1USN", "TOM MA").await.unwrap();
        log_contact(&mut state, "G4XYZ", "JOHN DX").await.unwrap();
        log_contact(&mut state, "F5ABC", "JEAN DX").await.unwrap();
        state.band.change_band("20").unwrap();
        log_contact(&mut state, "K1USN", "TOM MA").await.unwrap();
        log_contact(&mut state, "N1MM", "RICK NH").await.unwrap();

        let score = recompute(&state).await.unwrap();
        assert_eq!(score.bands.len(), 2);
        assert_eq!(score.bands[0].band, "40");
        assert_eq!(score.bands[0].mults(), 3);
        assert_eq!(score.bands[1].band, "20");
        assert_eq!(score.bands[1].mults(), 2);
        assert_eq!(score.total_qsos, 5);
        assert_eq!(score.total_mults, 5);
        assert_eq!(score.total_score, 25);
    }

    #[tokio::test]
    async fn test_deleted_contact_leaves_score() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::for_test(dir.path()).await;
        log_contact(&mut state, "K1USN", "TOM MA").await.unwrap();
        let dx = log_contact(&mut state, "G4XYZ", "JOHN DX").await.unwrap().unwrap();

        delete_contact(&state, dx).await.unwrap();
        let score = recompute(&state).await.unwrap();
        assert_eq!(score.total_qsos, 1);
        assert_eq!(score.total_mults, 1);
        assert_eq!(score.total_score, 1);
    }

    #[tokio::test]
    async fn test_empty_log_and_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::for_test(dir.path()).await;

        let score = write_report(&state).await.unwrap();
        assert_eq!(score, Score::default());
        assert_eq!(
            fs::read_to_string(state.paths.stats_file()).unwrap(),
            "Total QSO: 0\r\nTotal Mults: 0\r\nTotal Score: 0\r\n"
        );

        log_contact(&mut state, "K1USN", "TOM MA").await.unwrap();
        write_report(&state).await.unwrap();
        assert_eq!(
            fs::read_to_string(state.paths.stats_file()).unwrap(),
            "band:40 QSOs:1 state and province:1 dx:0 mult:1\r\n\
             Total QSO: 1\r\nTotal Mults: 1\r\nTotal Score: 1\r\n"
        );
    }
}

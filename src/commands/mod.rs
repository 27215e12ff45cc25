//! Command Handlers
//!
//! Operations grouped by domain. Every handler takes the session
//! [`AppState`] explicitly; there is no global state.
//!
//! ## Module Organization
//! - `state` - Session context, band state and file locations
//! - `time_utils` - Timestamp parsing and formatting
//! - `qso` - Logging, correcting and listing contacts
//! - `dupe` - Duplicate check and exchange prefill
//! - `score` - Score aggregation and report
//! - `adif` - ADIF export
//! - `settings` - Station profile and settings document
//! - `cw` - CW macro sending
//! - `session` - Interactive loop

mod state;
pub mod time_utils;
pub mod qso;
pub mod dupe;
pub mod score;
pub mod adif;
pub mod settings;
pub mod cw;
pub mod session;

pub use state::{AppState, BandState, StatePaths, ADIF_FILE, DEFAULT_DB_FILE, STATS_FILE};

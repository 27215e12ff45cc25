// Contact ledger record types

use serde::{Deserialize, Serialize};

/// One logged QSO as stored in the `contacts` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub callsign: String,
    /// First exchange token (operator name)
    pub name: String,
    /// Second exchange token: state/province abbreviation or `DX`
    pub qualifier: String,
    /// `YYYY-MM-DD HH:MM:SS`, UTC
    pub date_time: String,
    /// Raw reading in Hz at logging time
    pub frequency: String,
    pub band: String,
    pub grid: String,
    /// Operator name from the lookup service
    pub opname: String,
}

impl Contact {
    /// Received exchange as the operator copied it
    pub fn exchange(&self) -> String {
        format!("{} {}", self.name, self.qualifier)
    }
}

/// A contact about to be inserted. The ledger assigns `id` and `date_time`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewContact {
    pub callsign: String,
    pub name: String,
    pub qualifier: String,
    pub frequency: String,
    pub band: String,
    pub grid: String,
    pub opname: String,
}

/// Correctable fields of a contact (full replace on update)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactEdit {
    pub callsign: String,
    pub name: String,
    pub qualifier: String,
    pub date_time: String,
    pub band: String,
}

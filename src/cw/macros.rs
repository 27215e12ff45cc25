// Function-key CW macros
//
// File format, one macro per line:
//   F1 | CQ | CQ SST {MYCALL}
// Reading stops at the first line that is not three `|`-separated fields.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::Result;

pub const MACRO_FILE: &str = "cwmacros_sst.txt";

const DEFAULT_MACROS: &str = "\
F1 | CQ | CQ SST {MYCALL}
F2 | Exchange | {HISNAME} {MYEXCHANGE}
F3 | TU | TU {HISNAME} {MYCALL} SST
F4 | MyCall | {MYCALL}
F5 | HisCall | {HISCALL}
F6 | Exch | {MYEXCHANGE}
F7 | AGN | AGN
F8 | ? | ?
F9 | Name? | NAME?
F10 | State? | STATE?
F11 | Call? | CALL?
F12 | QRZ | QRZ {MYCALL}
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Macros {
    keys: BTreeMap<String, Macro>,
}

impl Macros {
    pub fn parse(text: &str) -> Self {
        let mut keys = BTreeMap::new();
        for line in text.lines() {
            let fields: Vec<&str> = line.split('|').collect();
            let [fkey, label, body] = fields.as_slice() else {
                break;
            };
            keys.insert(
                fkey.trim().to_uppercase(),
                Macro {
                    label: label.trim().to_string(),
                    text: body.trim().to_string(),
                },
            );
        }
        Self { keys }
    }

    /// Read the macro file, writing the stock set first if there is none
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No macro file at {}, writing defaults", path.display());
            fs::write(path, DEFAULT_MACROS)?;
        }
        let text = fs::read_to_string(path)?;
        let macros = Self::parse(&text);
        log::info!("Loaded {} CW macros", macros.keys.len());
        Ok(macros)
    }

    pub fn get(&self, fkey: &str) -> Option<&Macro> {
        self.keys.get(&fkey.to_uppercase())
    }

    /// `(fkey, macro)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Macro)> {
        self.keys.iter().map(|(k, m)| (k.as_str(), m))
    }
}

fn split_pair(exchange: &str) -> (&str, &str) {
    let tokens: Vec<&str> = exchange.split_whitespace().collect();
    match tokens.as_slice() {
        &[name, state] => (name, state),
        _ => ("", ""),
    }
}

/// Fill in the placeholders of a macro template
pub fn process_macro(
    template: &str,
    my_call: &str,
    my_exchange: &str,
    his_call: &str,
    his_exchange: &str,
) -> String {
    let (my_name, my_state) = split_pair(my_exchange);
    let (his_name, his_state) = split_pair(his_exchange);

    template
        .to_uppercase()
        .replace("{MYEXCHANGE}", my_exchange)
        .replace("{MYCALL}", my_call)
        .replace("{MYNAME}", my_name)
        .replace("{MYSTATE}", my_state)
        .replace("{HISCALL}", his_call)
        .replace("{HISNAME}", his_name)
        .replace("{HISSTATE}", his_state)
}

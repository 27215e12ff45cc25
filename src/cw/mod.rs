//! Morse keyer output
//!
//! Text is handed to an external keyer and forgotten; the keyer does the
//! timing. Failures come back as [`Error::Keyer`] for the caller to log.

pub mod macros;

use reqwest::Client;
use std::time::Duration;
use tokio::net::UdpSocket;

use crate::error::{Error, Result};
use crate::settings::{Settings, CW_DAEMON, CW_PYWINKEYER};
use crate::xmlrpc;

pub use macros::{process_macro, Macro, Macros, MACRO_FILE};

const RPC_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub enum Keyer {
    /// cwdaemon: one UDP datagram per message
    CwDaemon { address: String },
    /// WinKeyer bridge speaking XML-RPC
    PyWinKeyer { http: Client, url: String },
}

impl Keyer {
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        match settings.cwtype {
            CW_DAEMON => Some(Keyer::CwDaemon {
                address: settings.cw_address(),
            }),
            CW_PYWINKEYER => Some(Keyer::PyWinKeyer {
                http: Client::new(),
                url: format!("http://{}/", settings.cw_address()),
            }),
            _ => None,
        }
    }

    pub async fn send(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        match self {
            Keyer::CwDaemon { address } => {
                let socket = UdpSocket::bind("0.0.0.0:0")
                    .await
                    .map_err(|e| Error::Keyer(format!("cwdaemon socket: {}", e)))?;
                socket
                    .send_to(text.as_bytes(), address.as_str())
                    .await
                    .map_err(|e| Error::Keyer(format!("cwdaemon at {}: {}", address, e)))?;
            }
            Keyer::PyWinKeyer { http, url } => {
                xmlrpc::call(http, url, "k1elsendstring", &[text], RPC_TIMEOUT)
                    .await
                    .map_err(|e| Error::Keyer(format!("winkeyer at {}: {}", url, e)))?;
            }
        }
        log::debug!("Sent CW: {}", text);
        Ok(())
    }
}

// rigctld client
// Hamlib's rig control daemon: send the `f` query, read back the frequency
// in Hz as a decimal string.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::{Error, Result};

pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(100);
pub const READ_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct Rigctld {
    address: String,
}

impl Rigctld {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
        }
    }

    pub async fn frequency(&self) -> Result<String> {
        let mut stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(&self.address))
            .await
            .map_err(|_| Error::Network(format!("rigctld at {} did not answer", self.address)))?
            .map_err(|e| Error::Network(format!("rigctld at {}: {}", self.address, e)))?;

        stream
            .write_all(b"f")
            .await
            .map_err(|e| Error::Network(format!("rigctld write: {}", e)))?;

        let reply = timeout(READ_TIMEOUT, read_reply(&mut stream))
            .await
            .map_err(|_| Error::Network("rigctld read timed out".to_string()))??;

        let freq = reply.trim().to_string();
        if freq.is_empty() {
            return Err(Error::Network("rigctld sent an empty reply".to_string()));
        }
        Ok(freq)
    }
}

/// Read until the daemon closes the socket or ends the line
async fn read_reply(stream: &mut TcpStream) -> Result<String> {
    let mut data = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|e| Error::Network(format!("rigctld read: {}", e)))?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
        if data.contains(&b'\n') {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&data).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_reads_frequency() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut query = [0u8; 1];
            socket.read_exact(&mut query).await.unwrap();
            socket.write_all(b"14030000\n").await.unwrap();
            query
        });

        let rig = Rigctld::new(&addr);
        assert_eq!(rig.frequency().await.unwrap(), "14030000");
        assert_eq!(&server.await.unwrap(), b"f");
    }

    #[tokio::test]
    async fn test_reply_terminated_by_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut query = [0u8; 1];
            socket.read_exact(&mut query).await.unwrap();
            socket.write_all(b"7030000").await.unwrap();
        });

        assert_eq!(Rigctld::new(&addr).frequency().await.unwrap(), "7030000");
    }

    #[tokio::test]
    async fn test_nothing_listening_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        assert!(matches!(
            Rigctld::new(&addr).frequency().await,
            Err(Error::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_silent_daemon_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
        });

        assert!(matches!(
            Rigctld::new(&addr).frequency().await,
            Err(Error::Network(_))
        ));
    }
}

//! [`Connector`] over real TCP sockets.

use std::io;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::debug;

use crate::application::ports::Connector;

/// Opens a fresh TCP connection per call.  Nothing is pooled.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        // Host names resolve through the system resolver.
        let stream = TcpStream::connect((host, port)).await?;
        // The request goes out in one write; do not hold it back.
        stream.set_nodelay(true)?;
        debug!(host, port, "probe connection open");
        Ok(stream)
    }
}

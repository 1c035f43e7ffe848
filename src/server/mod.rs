pub mod protocol;

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::session::SessionRegistry;
use protocol::{Request, REQUEST_CAPACITY};

/// How long a connected client may take to send its request
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Serve exactly one request on `stream`, then close it
///
/// The request is whatever arrives in the first read. A client that sends
/// nothing, fails or times out is dropped without a response. Only a
/// failure to deliver the response is returned.
pub async fn handle_connection<S>(mut stream: S, registry: &SessionRegistry) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; REQUEST_CAPACITY];
    let n = match tokio::time::timeout(READ_TIMEOUT, stream.read(&mut buf)).await {
        Ok(Ok(0)) => {
            debug!("client closed without a request");
            return Ok(());
        }
        Ok(Ok(n)) => n,
        Ok(Err(e)) => {
            debug!("failed to read request: {}", e);
            return Ok(());
        }
        Err(_) => {
            debug!("timed out waiting for request");
            return Ok(());
        }
    };

    let raw = String::from_utf8_lossy(&buf[..n]);
    let request = Request::parse(&raw);
    debug!(?request, "received request");

    let response = protocol::respond(&request, registry);
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

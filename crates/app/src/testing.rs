//! Stub HTTP backends for tests that must not reach the network.

use std::{io, net::SocketAddr};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::oneshot,
};

/// A one-shot HTTP/1.1 server on loopback that answers a canned response and hands back the
/// request it received, lower-cased.
#[derive(Debug)]
pub struct StubServer {
    address: SocketAddr,
    request: oneshot::Receiver<String>,
}

impl StubServer {
    /// Start a server answering `status` with a JSON `body`.
    ///
    /// # Errors
    ///
    /// Returns an error when no loopback port can be bound.
    pub async fn respond(status: u16, body: &'static str) -> io::Result<Self> {
        Self::respond_with_headers(status, &[], body).await
    }

    /// Start a server answering `status` with extra response `headers` and a JSON `body`.
    ///
    /// # Errors
    ///
    /// Returns an error when no loopback port can be bound.
    pub async fn respond_with_headers(
        status: u16,
        headers: &[(&str, &str)],
        body: &'static str,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let (sender, request) = oneshot::channel();

        let mut head = format!(
            "HTTP/1.1 {status} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n",
            if status == 200 { "OK" } else { "Stub" },
            body.len()
        );

        for (name, value) in headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }

        head.push_str("\r\n");

        tokio::spawn(async move {
            let Ok((mut socket, _peer)) = listener.accept().await else {
                return;
            };

            let received = read_request(&mut socket).await.unwrap_or_default();

            let _written = socket.write_all(head.as_bytes()).await;
            let _body = socket.write_all(body.as_bytes()).await;
            let _shutdown = socket.shutdown().await;
            let _sent = sender.send(received.to_lowercase());
        });

        Ok(Self { address, request })
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.address)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.address)
    }

    /// The request the server received, lower-cased.
    ///
    /// # Errors
    ///
    /// Returns an error when no request ever arrived.
    pub async fn received(self) -> Result<String, oneshot::error::RecvError> {
        self.request.await
    }
}

async fn read_request(socket: &mut TcpStream) -> io::Result<String> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];

    loop {
        let read = socket.read(&mut chunk).await?;

        if read == 0 {
            break;
        }

        buffer.extend(chunk.iter().take(read));

        let text = String::from_utf8_lossy(&buffer).to_string();

        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);

            if buffer.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }

    Ok(String::from_utf8_lossy(&buffer).to_string())
}

/// A loopback address nothing is listening on.
///
/// # Errors
///
/// Returns an error when no loopback port can be bound.
pub async fn unused_address() -> io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;

    listener.local_addr()
}

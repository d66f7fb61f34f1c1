//! RPC Client Module
//!
//! Connects to a server's socket and exposes an explicit `invoke` surface:
//! a call serializes the function name with its arguments, sends one
//! frame, and blocks on the single-value response. Typed wrappers over
//! `invoke` live with the services that define the remote functions.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncWriteExt, BufStream};
use tokio::net::UnixStream;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{receive, send, Message};

/// Default number of connect attempts against a refusing socket.
pub(crate) const DEFAULT_CONNECT_RETRIES: u32 = 200;

/// Default delay between connect attempts.
pub(crate) const DEFAULT_CONNECT_BACKOFF: Duration = Duration::from_millis(5);

// == IPC Client ==
/// Client side of one socket connection to an [`crate::rpc::IpcServer`].
///
/// Requests on one client are strictly sequential: each `invoke` waits
/// for its response before the next may be sent. Dropping a connected
/// client closes the socket; the server treats that as a silent
/// disconnect.
pub struct IpcClient {
    stream: Option<BufStream<UnixStream>>,
    path: PathBuf,
}

impl IpcClient {
    /// Connects to the server listening at `path` with default retry
    /// settings.
    ///
    /// # Errors
    /// `Error::Connection` if the socket path does not exist (no server
    /// was ever started there) or the connection keeps being refused past
    /// the retry budget.
    pub async fn connect(path: impl Into<PathBuf>) -> Result<Self> {
        Self::connect_with(path, DEFAULT_CONNECT_RETRIES, DEFAULT_CONNECT_BACKOFF).await
    }

    /// Connects with an explicit retry budget.
    ///
    /// A freshly spawned server may not be accepting yet when the first
    /// client arrives; refused connections are retried with a short fixed
    /// backoff to absorb that race.
    pub async fn connect_with(
        path: impl Into<PathBuf>,
        retries: u32,
        backoff: Duration,
    ) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(Error::Connection(format!(
                "Cannot connect: socket {} does not exist",
                path.display()
            )));
        }

        let mut attempts = 0;
        let stream = loop {
            match UnixStream::connect(&path).await {
                Ok(stream) => break stream,
                Err(e) if e.kind() == ErrorKind::ConnectionRefused && attempts < retries => {
                    attempts += 1;
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    return Err(Error::Connection(format!(
                        "Cannot connect to {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        };

        debug!("Connected to {}", path.display());
        Ok(Self {
            stream: Some(BufStream::new(stream)),
            path,
        })
    }

    /// True until `disconnect()` or `shutdown()` has been called.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Calls a remote function and returns its unwrapped value.
    ///
    /// # Errors
    /// - `Error::NotConnected` after a disconnect
    /// - `Error::Remote` if the server reports a fault for the call
    /// - `Error::Connection` if the server goes away mid-call
    pub async fn invoke(
        &mut self,
        function: &str,
        args: Vec<Value>,
        kwargs: HashMap<String, Value>,
    ) -> Result<Value> {
        match self.invoke_envelope(function, args, kwargs).await? {
            Message::Reply { value } => Ok(value),
            Message::Fault { message } => Err(Error::Remote(message)),
            other => Err(Error::Protocol(format!(
                "Unexpected response envelope: {:?}",
                other
            ))),
        }
    }

    /// Calls a remote function and returns the full response envelope.
    ///
    /// Diagnostic servers (echo variants) answer with arbitrary
    /// envelopes; this is the hook that lets their clients see them
    /// unparsed.
    pub async fn invoke_envelope(
        &mut self,
        function: &str,
        args: Vec<Value>,
        kwargs: HashMap<String, Value>,
    ) -> Result<Message> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
        let call = Message::Call {
            function: function.to_string(),
            args,
            kwargs,
        };
        send(stream, &call).await?;

        match receive::<_, Message>(stream).await? {
            Some(message) => Ok(message),
            None => {
                self.stream = None;
                Err(Error::Connection(
                    "Server closed the connection mid-call".to_string(),
                ))
            }
        }
    }

    /// Sends a goodbye, awaits the acknowledgement best-effort, and
    /// closes the socket. Safe to call on an already disconnected client.
    pub async fn disconnect(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };
        let _ = send(&mut stream, &Message::Goodbye).await;
        let _ = receive::<_, Message>(&mut stream).await;
        let _ = stream.shutdown().await;
        debug!("Disconnected from {}", self.path.display());
    }

    /// Requests the remote server to terminate itself (harakiri) and
    /// closes the local socket. No response is awaited.
    pub async fn shutdown(&mut self) -> Result<()> {
        let mut stream = self.stream.take().ok_or(Error::NotConnected)?;
        send(&mut stream, &Message::Shutdown).await?;
        let _ = stream.shutdown().await;
        debug!("Requested shutdown of server at {}", self.path.display());
        Ok(())
    }
}

//! RPC Server Module
//!
//! Binds a Unix socket, accepts connections on a background task, and
//! dispatches each connection to its own handler task. Shutdown is
//! signaled through a watch channel observed by the accept loop and by
//! every live connection, so both an external `shutdown()` and a
//! client-requested harakiri stop the server promptly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::BufStream;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::protocol::{receive, send, CallParams, Message};
use crate::rpc::registry::{FunctionRegistry, Handler};

// == IPC Server ==
/// Unix-socket RPC server.
///
/// The accept loop runs as a background task owned by this value; the
/// caller keeps doing unrelated work after `startup()` returns. Every
/// accepted connection gets a detached handler task that serves requests
/// strictly in arrival order until the client says goodbye, requests
/// shutdown, or closes the socket.
pub struct IpcServer {
    path: PathBuf,
    registry: Arc<FunctionRegistry>,
    shutdown: watch::Sender<bool>,
    accept_task: Option<JoinHandle<()>>,
}

impl IpcServer {
    /// Creates a server bound to nothing yet; call `startup()` to listen.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            path: path.into(),
            registry: Arc::new(FunctionRegistry::new()),
            shutdown,
            accept_task: None,
        }
    }

    /// The socket path this server serves on.
    pub fn socket_path(&self) -> &Path {
        &self.path
    }

    /// Shared handle to the function registry.
    pub fn registry(&self) -> Arc<FunctionRegistry> {
        self.registry.clone()
    }

    /// Registers a handler; see [`FunctionRegistry::register`].
    pub fn register<H: Handler>(&self, name: &str, handler: H) {
        self.registry.register(name, handler);
    }

    /// Registers a synchronous function; see [`FunctionRegistry::register_fn`].
    pub fn register_fn<F>(&self, name: &str, function: F)
    where
        F: Fn(CallParams) -> Result<serde_json::Value> + Send + Sync + 'static,
    {
        self.registry.register_fn(name, function);
    }

    /// True while the accept loop is running.
    pub fn is_running(&self) -> bool {
        self.accept_task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// A receiver that flips to `true` when the server begins shutting
    /// down, whether externally or via harakiri.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Binds the socket and spawns the accept loop.
    ///
    /// Removes a stale socket file left behind by an earlier process.
    /// Calling `startup()` on a running server has no additional effect.
    pub async fn startup(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        if self.path.exists() {
            debug!("Removing stale socket file {}", self.path.display());
            let _ = std::fs::remove_file(&self.path);
        }

        let listener = UnixListener::bind(&self.path)?;
        let _ = self.shutdown.send(false);

        info!("Listening on {}", self.path.display());
        self.accept_task = Some(tokio::spawn(accept_loop(
            listener,
            self.path.clone(),
            self.registry.clone(),
            self.shutdown.clone(),
        )));
        Ok(())
    }

    /// Stops the accept loop and removes the socket file.
    ///
    /// Live connection tasks are not joined; they observe the shutdown
    /// signal and finish on their own. Calling `shutdown()` twice is a
    /// no-op the second time.
    pub async fn shutdown(&mut self) {
        let Some(task) = self.accept_task.take() else {
            return;
        };
        let _ = self.shutdown.send(true);
        if let Err(e) = task.await {
            warn!("Accept task ended abnormally: {}", e);
        }
        info!("Server on {} stopped", self.path.display());
    }
}

// == Accept Loop ==
async fn accept_loop(
    listener: UnixListener,
    path: PathBuf,
    registry: Arc<FunctionRegistry>,
    shutdown: watch::Sender<bool>,
) {
    let mut shutdown_rx = shutdown.subscribe();

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow_and_update() {
                    break;
                }
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => {
                    let registry = registry.clone();
                    let shutdown = shutdown.clone();
                    tokio::spawn(handle_connection(stream, registry, shutdown));
                }
                Err(e) => warn!("Failed to accept connection: {}", e),
            },
        }
    }

    // The socket file is removed on every termination path, harakiri
    // included.
    drop(listener);
    let _ = std::fs::remove_file(&path);
    debug!("Accept loop on {} finished", path.display());
}

// == Connection Handler ==
/// Serves one connection: receive, dispatch, reply, until the client
/// leaves or the server shuts down.
async fn handle_connection(
    stream: UnixStream,
    registry: Arc<FunctionRegistry>,
    shutdown: watch::Sender<bool>,
) {
    let mut shutdown_rx = shutdown.subscribe();
    let mut stream = BufStream::new(stream);
    debug!("Client connected");

    loop {
        let received = tokio::select! {
            _ = shutdown_rx.changed() => break,
            received = receive::<_, Message>(&mut stream) => received,
        };

        match received {
            Ok(None) => {
                debug!("Client closed the connection");
                break;
            }
            Ok(Some(Message::Goodbye)) => {
                if let Err(e) = send(&mut stream, &Message::Bye).await {
                    debug!("Failed to acknowledge goodbye: {}", e);
                }
                debug!("Client said goodbye");
                break;
            }
            Ok(Some(Message::Shutdown)) => {
                info!("Client requested server shutdown (harakiri)");
                let _ = shutdown.send(true);
                break;
            }
            Ok(Some(Message::Call {
                function,
                args,
                kwargs,
            })) => {
                let Some(handler) = registry.get(&function) else {
                    // A miss here is a programming error on the caller's
                    // side; fail the connection with a diagnostic instead
                    // of leaving the client hanging.
                    error!("Unknown function '{}'; dropping connection", function);
                    let fault = Message::Fault {
                        message: format!("Unknown function '{}'", function),
                    };
                    let _ = send(&mut stream, &fault).await;
                    break;
                };

                let reply = match handler.call(CallParams::new(args, kwargs)).await {
                    Ok(value) => Message::Reply { value },
                    Err(e) => {
                        debug!("Handler '{}' failed: {}", function, e);
                        Message::Fault {
                            message: e.to_string(),
                        }
                    }
                };
                if let Err(e) = send(&mut stream, &reply).await {
                    warn!("Failed to send reply for '{}': {}", function, e);
                    break;
                }
            }
            Ok(Some(other)) => {
                warn!("Unexpected message from client: {:?}; dropping connection", other);
                break;
            }
            Err(e) => {
                // A bad frame poisons only this connection, never the
                // server process.
                warn!("Connection error: {}", e);
                break;
            }
        }
    }

    debug!("Connection handler finished");
}

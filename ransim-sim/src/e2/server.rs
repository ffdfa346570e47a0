//! E2 Server Task Implementation
//!
//! Accepts controller connections on TCP. The first frame on a connection is
//! a `SessionOpen` selecting the telemetry or the control session; each
//! connection then runs its session until the peer disconnects.
//!
//! ```text
//! Controller <--TCP--> E2 Server --spawn--> Telemetry | Control session
//! ```

use std::net::SocketAddr;

use ransim_common::Error;
use ransim_e2::{E2Pdu, SessionKind};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::control::run_control_session;
use super::session::{next_inbound, pdu_name, SessionError};
use super::telemetry::run_telemetry_session;
use crate::tasks::SimTaskBase;

/// E2 server accepting telemetry and control connections
pub struct E2Server {
    /// Task base shared with every session
    task_base: SimTaskBase,
    /// Bound listener
    listener: TcpListener,
}

impl E2Server {
    /// Binds the server to `addr`.
    pub async fn bind(task_base: SimTaskBase, addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        info!("E2 server bound to {}", listener.local_addr()?);
        Ok(Self {
            task_base,
            listener,
        })
    }

    /// Returns the bound address.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until shutdown.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<(), Error> {
        info!("E2 server task started");
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            info!("E2 connection from {}", peer);
                            let task_base = self.task_base.clone();
                            let shutdown = shutdown_rx.clone();
                            tokio::spawn(async move {
                                let result = handle_connection(task_base, stream, shutdown).await;
                                if let Err(e) = result {
                                    warn!("E2 connection from {} closed: {}", peer, e);
                                }
                            });
                        }
                        Err(e) => error!("E2 accept failed: {}", e),
                    }
                }
                _ = shutdown_rx.changed() => {
                    info!("E2 server received shutdown signal");
                    break;
                }
            }
        }
        info!("E2 server task stopped");
        Ok(())
    }
}

/// Runs the session selected by the connection's first frame.
pub async fn handle_connection<S>(
    task_base: SimTaskBase,
    stream: S,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (mut reader, writer) = tokio::io::split(stream);

    let first = tokio::select! {
        first = next_inbound(&mut reader, "new") => first?,
        _ = shutdown_rx.changed() => return Ok(()),
    };

    match first {
        Some(E2Pdu::SessionOpen(open)) => match open.kind {
            SessionKind::Telemetry => {
                run_telemetry_session(task_base, reader, writer, shutdown_rx).await
            }
            SessionKind::Control => {
                run_control_session(task_base, reader, writer, shutdown_rx).await
            }
        },
        Some(other) => Err(SessionError::Protocol(format!(
            "expected SessionOpen, got {}",
            pdu_name(&other)
        ))),
        None => Ok(()),
    }
}

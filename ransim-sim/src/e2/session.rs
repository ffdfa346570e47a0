//! Shared session plumbing
//!
//! Both sessions hand outbound PDUs to a send task over a bounded queue. The
//! send task owns the write half of the connection.

use ransim_common::{log_e2_message, Direction};
use ransim_e2::{encode_frame, read_frame, E2CodecError, E2Pdu};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::dispatcher::DispatcherError;

/// Errors that end an E2 session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Transport failure
    #[error("E2 transport error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame could not be encoded or decoded
    #[error("E2 codec error: {0}")]
    Codec(#[from] E2CodecError),

    /// Listener registration failed
    #[error("E2 session rejected: {0}")]
    Dispatcher(#[from] DispatcherError),

    /// Peer broke the session protocol
    #[error("E2 protocol violation: {0}")]
    Protocol(String),

    /// A session task ended abnormally
    #[error("E2 session task aborted")]
    Aborted,
}

/// Name used in logs for a PDU.
pub(crate) fn pdu_name(pdu: &E2Pdu) -> String {
    match pdu.message_type() {
        Some(message_type) => message_type.to_string(),
        None => match pdu {
            E2Pdu::Unknown(value) => format!("Unknown({value})"),
            _ => "Unknown".to_string(),
        },
    }
}

/// Writes queued PDUs until the queue closes or a write fails.
pub(crate) async fn send_loop<W>(
    mut writer: W,
    mut queue: mpsc::Receiver<E2Pdu>,
) -> Result<(), SessionError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(pdu) = queue.recv().await {
        let frame = encode_frame(&pdu)?;
        log_e2_message(Direction::Tx, &pdu_name(&pdu), &frame);
        writer.write_all(&frame).await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Reads the next inbound PDU, skipping malformed frames.
///
/// Returns `Ok(None)` when the peer closed the connection. Transport errors
/// and oversized frames end the session since framing is lost.
pub(crate) async fn next_inbound<R>(
    reader: &mut R,
    session: &str,
) -> Result<Option<E2Pdu>, SessionError>
where
    R: AsyncRead + Unpin,
{
    loop {
        match read_frame(reader).await {
            Ok(Some(pdu)) => {
                debug!("RX E2 message {} on {} session", pdu_name(&pdu), session);
                return Ok(Some(pdu));
            }
            Ok(None) => return Ok(None),
            Err(e @ (E2CodecError::Io(_) | E2CodecError::FrameTooLarge(_))) => {
                return Err(e.into())
            }
            Err(e) => warn!("Malformed frame on {} session: {}", session, e),
        }
    }
}

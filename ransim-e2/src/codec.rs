//! E2 message encoding/decoding
//!
//! Every frame on an E2 connection is a big-endian `u32` length followed by
//! that many payload bytes. The payload starts with the protocol version and
//! the message type. Strings are `u16`-length prefixed UTF-8, lists are
//! `u16`-count prefixed.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use ransim_common::Ecgi;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::{
    version, AdmEstCause, CellConfigReport, CellConfigRequest, ControlResponse, ControlUpdate,
    E2Pdu, HandoverRequest, MessageType, RadioMeasReportPerUe, RadioRepPerServCell, SessionKind,
    SessionOpen, TelemetryMessage, UeAdmissionRequest, UeAdmissionResponse,
};

/// Maximum frame payload length (64KB)
pub const MAX_FRAME_LENGTH: usize = 65536;

/// Version bytes plus message type
const HEADER_LENGTH: usize = 4;

/// Errors that can occur during E2 message encoding/decoding
#[derive(Debug, Error)]
pub enum E2CodecError {
    /// Version mismatch
    #[error("E2 version mismatch: expected {}.{}.{}, got {}.{}.{}",
            version::MAJOR, version::MINOR, version::PATCH, .0, .1, .2)]
    VersionMismatch(u8, u8, u8),

    /// Unknown enumerated value inside a known message
    #[error("unknown {field} value: {value}")]
    UnknownValue {
        /// Field being decoded
        field: &'static str,
        /// Offending value
        value: u8,
    },

    /// Frame too large
    #[error("frame length {0} exceeds maximum allowed {}", MAX_FRAME_LENGTH)]
    FrameTooLarge(usize),

    /// Buffer too short
    #[error("buffer too short: need {needed} bytes, have {available}")]
    BufferTooShort {
        /// Number of bytes needed
        needed: usize,
        /// Number of bytes available
        available: usize,
    },

    /// String field is not UTF-8
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,

    /// String or list too long for its `u16` length prefix
    #[error("{field} length {len} exceeds {}", u16::MAX)]
    FieldTooLong {
        /// Field being encoded
        field: &'static str,
        /// Offending length
        len: usize,
    },

    /// Trailing bytes after a complete message
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    /// Transport error while reading or writing a frame
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for E2 codec operations
pub type Result<T> = std::result::Result<T, E2CodecError>;

/// Encodes an E2 PDU payload (without the frame length prefix)
///
/// `E2Pdu::Unknown` is never sent; encoding it yields only the header.
pub fn encode(pdu: &E2Pdu) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(128);
    encode_into(pdu, &mut buf)?;
    Ok(buf.freeze())
}

/// Encodes an E2 PDU payload into an existing buffer
pub fn encode_into(pdu: &E2Pdu, buf: &mut BytesMut) -> Result<()> {
    buf.put_u8(version::MAJOR);
    buf.put_u8(version::MINOR);
    buf.put_u8(version::PATCH);

    let msg_type = match pdu {
        E2Pdu::Unknown(t) => *t,
        other => other.message_type().map(|t| t as u8).unwrap_or_default(),
    };
    buf.put_u8(msg_type);

    match pdu {
        E2Pdu::SessionOpen(m) => buf.put_u8(m.kind as u8),
        E2Pdu::Telemetry(TelemetryMessage::RadioMeasReportPerUe(m)) => {
            put_ecgi(buf, &m.ecgi)?;
            put_string(buf, "crnti", &m.crnti)?;
            put_count(buf, "radio report list", m.radio_report_serv_cells.len())?;
            for cell in &m.radio_report_serv_cells {
                put_ecgi(buf, &cell.ecgi)?;
                put_count(buf, "CQI history", cell.cqi_hist.len())?;
                for cqi in &cell.cqi_hist {
                    buf.put_u32(*cqi);
                }
            }
        }
        E2Pdu::ControlUpdate(ControlUpdate::CellConfigReport(m)) => {
            put_ecgi(buf, &m.ecgi)?;
            buf.put_u32(m.max_num_connected_ues);
            put_count(buf, "candidate cell list", m.cand_scells.len())?;
            for ecgi in &m.cand_scells {
                put_ecgi(buf, ecgi)?;
            }
        }
        E2Pdu::ControlUpdate(ControlUpdate::UeAdmissionRequest(m)) => {
            put_ecgi(buf, &m.ecgi)?;
            put_string(buf, "crnti", &m.crnti)?;
            buf.put_u8(m.adm_est_cause as u8);
        }
        E2Pdu::ControlResponse(ControlResponse::CellConfigRequest(_)) => {}
        E2Pdu::ControlResponse(ControlResponse::UeAdmissionResponse(m)) => {
            put_ecgi(buf, &m.ecgi)?;
            put_string(buf, "crnti", &m.crnti)?;
            buf.put_u8(u8::from(m.admitted));
        }
        E2Pdu::ControlResponse(ControlResponse::HandoverRequest(m)) => {
            put_string(buf, "crnti", &m.crnti)?;
            put_ecgi(buf, &m.src_station)?;
            put_ecgi(buf, &m.dst_station)?;
        }
        E2Pdu::Unknown(_) => {}
    }
    Ok(())
}

/// Decodes an E2 PDU payload
///
/// An unrecognised message type is not an error: it decodes to
/// `E2Pdu::Unknown` so the session can skip the frame.
pub fn decode(data: &[u8]) -> Result<E2Pdu> {
    let mut buf = data;
    ensure(&buf, HEADER_LENGTH)?;

    let major = buf.get_u8();
    let minor = buf.get_u8();
    let patch = buf.get_u8();
    if major != version::MAJOR {
        return Err(E2CodecError::VersionMismatch(major, minor, patch));
    }

    let raw_type = buf.get_u8();
    let Some(msg_type) = MessageType::from_u8(raw_type) else {
        return Ok(E2Pdu::Unknown(raw_type));
    };

    let pdu = match msg_type {
        MessageType::SessionOpen => {
            let raw = get_u8(&mut buf)?;
            let kind = SessionKind::from_u8(raw).ok_or(E2CodecError::UnknownValue {
                field: "session kind",
                value: raw,
            })?;
            E2Pdu::SessionOpen(SessionOpen { kind })
        }
        MessageType::RadioMeasReportPerUe => {
            let ecgi = get_ecgi(&mut buf)?;
            let crnti = get_string(&mut buf)?;
            let count = get_u16(&mut buf)? as usize;
            let mut cells = Vec::with_capacity(count);
            for _ in 0..count {
                let cell_ecgi = get_ecgi(&mut buf)?;
                let hist_len = get_u16(&mut buf)? as usize;
                ensure(&buf, hist_len * 4)?;
                let cqi_hist = (0..hist_len).map(|_| buf.get_u32()).collect();
                cells.push(RadioRepPerServCell {
                    ecgi: cell_ecgi,
                    cqi_hist,
                });
            }
            E2Pdu::Telemetry(TelemetryMessage::RadioMeasReportPerUe(RadioMeasReportPerUe {
                ecgi,
                crnti,
                radio_report_serv_cells: cells,
            }))
        }
        MessageType::CellConfigReport => {
            let ecgi = get_ecgi(&mut buf)?;
            let max_num_connected_ues = get_u32(&mut buf)?;
            let count = get_u16(&mut buf)? as usize;
            let mut cand_scells = Vec::with_capacity(count);
            for _ in 0..count {
                cand_scells.push(get_ecgi(&mut buf)?);
            }
            E2Pdu::ControlUpdate(ControlUpdate::CellConfigReport(CellConfigReport {
                ecgi,
                max_num_connected_ues,
                cand_scells,
            }))
        }
        MessageType::UeAdmissionRequest => {
            let ecgi = get_ecgi(&mut buf)?;
            let crnti = get_string(&mut buf)?;
            let raw = get_u8(&mut buf)?;
            let adm_est_cause = AdmEstCause::from_u8(raw).ok_or(E2CodecError::UnknownValue {
                field: "establishment cause",
                value: raw,
            })?;
            E2Pdu::ControlUpdate(ControlUpdate::UeAdmissionRequest(UeAdmissionRequest {
                ecgi,
                crnti,
                adm_est_cause,
            }))
        }
        MessageType::CellConfigRequest => {
            E2Pdu::ControlResponse(ControlResponse::CellConfigRequest(CellConfigRequest))
        }
        MessageType::UeAdmissionResponse => {
            let ecgi = get_ecgi(&mut buf)?;
            let crnti = get_string(&mut buf)?;
            let admitted = get_u8(&mut buf)? != 0;
            E2Pdu::ControlResponse(ControlResponse::UeAdmissionResponse(UeAdmissionResponse {
                ecgi,
                crnti,
                admitted,
            }))
        }
        MessageType::HandoverRequest => {
            let crnti = get_string(&mut buf)?;
            let src_station = get_ecgi(&mut buf)?;
            let dst_station = get_ecgi(&mut buf)?;
            E2Pdu::ControlResponse(ControlResponse::HandoverRequest(HandoverRequest {
                crnti,
                src_station,
                dst_station,
            }))
        }
    };

    if buf.has_remaining() {
        return Err(E2CodecError::TrailingBytes(buf.remaining()));
    }
    Ok(pdu)
}

/// Encodes a PDU as a complete length-prefixed frame
pub fn encode_frame(pdu: &E2Pdu) -> Result<Bytes> {
    let payload = encode(pdu)?;
    if payload.len() > MAX_FRAME_LENGTH {
        return Err(E2CodecError::FrameTooLarge(payload.len()));
    }
    let mut buf = BytesMut::with_capacity(4 + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.extend_from_slice(&payload);
    Ok(buf.freeze())
}

/// Writes one frame to the transport and flushes it
pub async fn write_frame<W>(writer: &mut W, pdu: &E2Pdu) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(pdu)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame from the transport
///
/// Returns `Ok(None)` when the peer closed the stream cleanly between frames.
/// A stream that ends inside the length prefix or the payload is an error.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<E2Pdu>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    if reader.read(&mut len_buf[..1]).await? == 0 {
        return Ok(None);
    }
    reader.read_exact(&mut len_buf[1..]).await?;

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_LENGTH {
        return Err(E2CodecError::FrameTooLarge(len));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    decode(&payload).map(Some)
}

fn ensure(buf: &&[u8], needed: usize) -> Result<()> {
    if buf.remaining() < needed {
        return Err(E2CodecError::BufferTooShort {
            needed,
            available: buf.remaining(),
        });
    }
    Ok(())
}

fn get_u8(buf: &mut &[u8]) -> Result<u8> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

fn get_u16(buf: &mut &[u8]) -> Result<u16> {
    ensure(buf, 2)?;
    Ok(buf.get_u16())
}

fn get_u32(buf: &mut &[u8]) -> Result<u32> {
    ensure(buf, 4)?;
    Ok(buf.get_u32())
}

fn put_count(buf: &mut BytesMut, field: &'static str, len: usize) -> Result<()> {
    let len = u16::try_from(len).map_err(|_| E2CodecError::FieldTooLong { field, len })?;
    buf.put_u16(len);
    Ok(())
}

fn put_string(buf: &mut BytesMut, field: &'static str, s: &str) -> Result<()> {
    put_count(buf, field, s.len())?;
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn get_string(buf: &mut &[u8]) -> Result<String> {
    let len = get_u16(buf)? as usize;
    ensure(buf, len)?;
    let s = std::str::from_utf8(&buf[..len])
        .map_err(|_| E2CodecError::InvalidUtf8)?
        .to_string();
    buf.advance(len);
    Ok(s)
}

fn put_ecgi(buf: &mut BytesMut, ecgi: &Ecgi) -> Result<()> {
    put_string(buf, "PLMN id", &ecgi.plmn_id)?;
    put_string(buf, "ECID", &ecgi.ecid)
}

fn get_ecgi(buf: &mut &[u8]) -> Result<Ecgi> {
    let plmn_id = get_string(buf)?;
    let ecid = get_string(buf)?;
    Ok(Ecgi { plmn_id, ecid })
}

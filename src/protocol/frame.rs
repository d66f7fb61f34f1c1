//! Frame Module
//!
//! Length-prefixed framing for arbitrary serializable values.
//!
//! Every message on the wire is a fixed-width header of `HEADER_SIZE`
//! lowercase hex digits holding the payload byte length, followed by the
//! MessagePack-encoded payload. An 8-digit hex header bounds payloads at
//! 4 GiB - 1.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};

// == Public Constants ==
/// Header width in hex digits (and bytes, the header is ASCII).
pub const HEADER_SIZE: usize = 8;

/// Largest payload the header can describe.
pub const MAX_PAYLOAD_SIZE: usize = 0xffff_ffff;

// == Encode ==
/// Serializes a value and prepends the fixed-width length header.
///
/// Structs are encoded as maps with field names (`to_vec_named`) so the
/// payload stays self-describing.
///
/// # Errors
/// Returns `Error::Protocol` if the encoded payload exceeds
/// `MAX_PAYLOAD_SIZE`.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let payload = rmp_serde::to_vec_named(value)?;

    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(Error::Protocol(format!(
            "Payload of {} bytes exceeds the {} byte frame limit",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    let mut frame = format!("{:0width$x}", payload.len(), width = HEADER_SIZE).into_bytes();
    frame.extend_from_slice(&payload);
    Ok(frame)
}

// == Send ==
/// Writes a complete frame for `value` to the stream.
pub async fn send<W, T>(writer: &mut W, value: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let frame = encode(value)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

// == Receive ==
/// Reads one frame from the stream and decodes its payload.
///
/// Returns `None` if the stream reaches end-of-file before a full header
/// arrives (the peer closed the connection between messages).
///
/// # Errors
/// - `Error::Protocol` if the header is not valid hex
/// - `Error::Connection` if the stream ends mid-payload
pub async fn receive<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut header = [0u8; HEADER_SIZE];
    if let Err(e) = reader.read_exact(&mut header).await {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            return Ok(None);
        }
        return Err(e.into());
    }

    let header = std::str::from_utf8(&header)
        .map_err(|_| Error::Protocol("Frame header is not ASCII hex".to_string()))?;
    let length = usize::from_str_radix(header, 16)
        .map_err(|_| Error::Protocol(format!("Malformed frame header: {:?}", header)))?;

    let mut payload = vec![0u8; length];
    if let Err(e) = reader.read_exact(&mut payload).await {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            return Err(Error::Connection(
                "Connection closed mid-frame".to_string(),
            ));
        }
        return Err(e.into());
    }

    Ok(Some(rmp_serde::from_slice(&payload)?))
}

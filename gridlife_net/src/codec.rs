//! Length-prefixed JSON framing.
//!
//! Every frame is a `u32` little-endian payload length followed by the JSON
//! payload, written as one buffer so a frame is never interleaved with
//! another writer on the same stream.

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::NetError;

/// Frames larger than this are rejected before allocation.
const MAX_FRAME_BYTES: u64 = 256 * 1024 * 1024;

/// Writes one length-prefixed frame.
pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<(), NetError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = serde_json::to_vec(value)?;
    if payload.len() as u64 > MAX_FRAME_BYTES {
        return Err(NetError::OversizedFrame(payload.len() as u64));
    }
    let mut buf = Vec::with_capacity(4 + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(&payload);
    writer.write_all(&buf).await?;
    Ok(())
}

/// Reads one length-prefixed frame.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<T, NetError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_le_bytes(len_buf);
    if len as u64 > MAX_FRAME_BYTES {
        return Err(NetError::OversizedFrame(len as u64));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(serde_json::from_slice(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Envelope, Request, Response};
    use gridlife_core::{Grid, Params};

    #[tokio::test]
    async fn test_frame_round_trip() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        let sent = Envelope {
            id: 7,
            body: Request::Pause,
        };
        write_frame(&mut a, &sent).await.unwrap();
        let received: Envelope<Request> = read_frame(&mut b).await.unwrap();
        assert_eq!(received, sent);
    }

    #[tokio::test]
    async fn test_frames_preserve_order() {
        let (mut a, mut b) = tokio::io::duplex(1 << 20);
        let params = Params {
            turns: 2,
            threads: 2,
            width: 4,
            height: 4,
        };
        let first = Envelope {
            id: 1,
            body: Request::ProcessGol {
                params,
                grid: Grid::dead(4, 4),
            },
        };
        let second = Envelope {
            id: 2,
            body: Request::CountAliveCells { params },
        };
        write_frame(&mut a, &first).await.unwrap();
        write_frame(&mut a, &second).await.unwrap();

        let got_first: Envelope<Request> = read_frame(&mut b).await.unwrap();
        let got_second: Envelope<Request> = read_frame(&mut b).await.unwrap();
        assert_eq!(got_first, first);
        assert_eq!(got_second, second);
    }

    #[tokio::test]
    async fn test_truncated_frame_is_an_error() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        a.write_all(&1000u32.to_le_bytes()).await.unwrap();
        a.write_all(b"not a thousand bytes").await.unwrap();
        drop(a);
        let result: Result<Envelope<Response>, _> = read_frame(&mut b).await;
        assert!(matches!(result, Err(NetError::Io(_))));
    }
}

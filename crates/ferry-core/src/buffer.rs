//! Download accumulation

use crate::transfer::ByteStream;
use crate::TransferError;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tracing::{debug, trace};

/// Collects downloaded chunks in arrival order
#[derive(Debug, Default)]
pub(crate) struct ReadBuffer {
    buffer: BytesMut,
    chunks: usize,
}

impl ReadBuffer {
    /// Append one chunk
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
        self.chunks += 1;
    }

    /// Bytes gathered so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Chunks gathered so far
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Take the contents as one contiguous buffer
    pub fn freeze(self) -> Bytes {
        self.buffer.freeze()
    }
}

/// Drain a download stream into one buffer
///
/// Completes at end of stream. The first error ends the fold and whatever
/// was gathered before it is dropped.
pub async fn accumulate(mut stream: ByteStream) -> Result<Bytes, TransferError> {
    let mut buffer = ReadBuffer::default();

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                trace!("Received chunk of {} bytes", chunk.len());
                buffer.push(&chunk);
            }
            Err(err) => {
                debug!(
                    "Discarding {} bytes after stream error: {}",
                    buffer.len(),
                    err
                );
                return Err(err);
            }
        }
    }

    debug!(
        "Stream finished with {} bytes in {} chunks",
        buffer.len(),
        buffer.chunks()
    );
    Ok(buffer.freeze())
}

//! Connect streaming envelopes.
//!
//! Each message on a streaming body is framed as one flags byte, a
//! big-endian `u32` length and the payload. The last frame carries
//! [`END_STREAM`] and a JSON trailer instead of a message.

use tether_core::{Error, Status};

/// Payload is compressed. No compression is negotiated, so a frame with
/// this flag is rejected.
pub(crate) const COMPRESSED: u8 = 0x01;
/// Frame is the end-of-stream trailer.
pub(crate) const END_STREAM: u8 = 0x02;

const HEADER_LEN: usize = 5;
/// Largest payload accepted in one frame.
pub(crate) const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// A decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Frame {
    pub(crate) flags: u8,
    pub(crate) payload: Vec<u8>,
}

impl Frame {
    pub(crate) fn is_end_stream(&self) -> bool {
        self.flags & END_STREAM != 0
    }
}

/// Frame `payload` with `flags`.
///
/// Payloads over [`MAX_FRAME_LEN`] are `resource_exhausted`, the same
/// limit the decoder enforces.
pub(crate) fn encode(flags: u8, payload: &[u8]) -> Result<Vec<u8>, Error> {
    let len = match u32::try_from(payload.len()) {
        Ok(len) if payload.len() <= MAX_FRAME_LEN => len,
        _ => return Err(oversized(payload.len())),
    };

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.push(flags);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

fn oversized(len: usize) -> Error {
    Status::new(
        tether_core::Code::ResourceExhausted,
        format!("frame of {len} bytes exceeds the {MAX_FRAME_LEN} byte limit"),
    )
    .into()
}

/// Incremental decoder fed with body chunks as they arrive.
#[derive(Debug, Default)]
pub(crate) struct Decoder {
    buf: Vec<u8>,
}

impl Decoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Take the next complete frame, if one is buffered.
    pub(crate) fn next_frame(&mut self) -> Result<Option<Frame>, Error> {
        if self.buf.len() < HEADER_LEN {
            return Ok(None);
        }

        let flags = self.buf[0];
        let len = u32::from_be_bytes([self.buf[1], self.buf[2], self.buf[3], self.buf[4]]) as usize;

        if flags & COMPRESSED != 0 {
            return Err(Status::internal("received a compressed frame, none was negotiated").into());
        }
        if len > MAX_FRAME_LEN {
            return Err(oversized(len));
        }
        if self.buf.len() < HEADER_LEN + len {
            return Ok(None);
        }

        let payload = self.buf[HEADER_LEN..HEADER_LEN + len].to_vec();
        self.buf.drain(..HEADER_LEN + len);
        Ok(Some(Frame { flags, payload }))
    }

    /// Bytes received but not yet framed.
    pub(crate) fn remaining(&self) -> usize {
        self.buf.len()
    }
}

//! Line codec: frames a TCP byte stream into client commands.
//!
//! Lines end at CR, LF or CRLF. Each complete line (terminator included)
//! is handed to [`decoder::decode`]; decode failures are yielded as items
//! so the connection can answer `ERROR` and keep reading. Outgoing
//! [`ServerMessage`]s are written with CRLF.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::command::Command;
use crate::decoder;
use crate::error::{CodecError, DecodeError};
use crate::message::ServerMessage;

/// Maximum line length, terminator included
pub const MAX_LINE_LENGTH: usize = 1024;

/// A tokio codec for the chat line protocol
#[derive(Debug)]
pub struct LineCodec {
    max_length: usize,
    /// Last frame ended with a CR at the end of the buffer; a leading LF
    /// on the next read belongs to it.
    skip_lf: bool,
}

impl LineCodec {
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            skip_lf: false,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = Result<Command, DecodeError>;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.skip_lf && !src.is_empty() {
            if src[0] == b'\n' {
                src.advance(1);
            }
            self.skip_lf = false;
        }

        let Some(end) = src.iter().position(|&b| b == b'\r' || b == b'\n') else {
            // No complete line yet
            if src.len() >= self.max_length {
                return Err(CodecError::LineTooLong(self.max_length));
            }
            return Ok(None);
        };

        let mut len = end + 1;
        if src[end] == b'\r' {
            match src.get(end + 1).copied() {
                Some(b'\n') => len += 1,
                Some(_) => {}
                None => self.skip_lf = true,
            }
        }

        if len > self.max_length {
            return Err(CodecError::LineTooLong(self.max_length));
        }

        let line = src.split_to(len);
        Ok(Some(decoder::decode(&line)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            // Leftover bytes never got a terminator
            None => {
                let rest = src.split();
                Ok(Some(decoder::decode(&rest)))
            }
        }
    }
}

impl Encoder<ServerMessage> for LineCodec {
    type Error = CodecError;

    fn encode(&mut self, item: ServerMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let wire = item.to_wire();
        dst.reserve(wire.len());
        dst.put_slice(&wire);
        Ok(())
    }
}

use crate::error::Error;
use bytes::{Buf, BytesMut};

/// Opcodes of the single-frame subset. Unlike the full RFC format, the tag is
/// the whole first byte of the frame (FIN bit already folded in), so Text is
/// 0x81 rather than 0x1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Text,
    Ping,
    Pong,
}

impl OpCode {
    pub fn from(byte: u8) -> Result<Self, Error> {
        match byte {
            0x81 => Ok(OpCode::Text),
            0x89 => Ok(OpCode::Ping),
            0x8A => Ok(OpCode::Pong),
            other => Err(Error::InvalidOpcode(other)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            OpCode::Text => 0x81,
            OpCode::Ping => 0x89,
            OpCode::Pong => 0x8A,
        }
    }

    pub fn is_control(&self) -> bool {
        matches!(self, OpCode::Ping | OpCode::Pong)
    }
}

/// A lone 0x0a byte some peers prepend to a frame; stripped before matching
/// the opcode.
pub const CONTINUATION_MARKER: u8 = 0x0a;

/// The subset carries the payload length in a single byte and never uses the
/// 126/127 extended-length escapes.
pub const MAX_PAYLOAD_SIZE: usize = 125;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub opcode: OpCode,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(opcode: OpCode, payload: Vec<u8>) -> Self {
        Self { opcode, payload }
    }

    pub fn text(payload: Vec<u8>) -> Self {
        Self::new(OpCode::Text, payload)
    }

    pub fn ping() -> Self {
        Self::new(OpCode::Ping, Vec::new())
    }

    pub fn pong() -> Self {
        Self::new(OpCode::Pong, Vec::new())
    }
}

/// Encodes a frame as `[opcode][length][payload]`. Payloads over 125 bytes are
/// a caller error in this subset and nothing is written for them.
pub fn encode_frame(frame: &Frame) -> Result<Vec<u8>, Error> {
    let length = frame.payload.len();
    if length > MAX_PAYLOAD_SIZE {
        return Err(Error::FrameTooLarge(length));
    }

    let mut wire = Vec::with_capacity(2 + length);
    wire.push(frame.opcode.as_u8());
    wire.push(length as u8);
    wire.extend_from_slice(&frame.payload);

    Ok(wire)
}

/// Decodes the next frame from an accumulating buffer, consuming exactly the
/// bytes of the frame it returns. `Ok(None)` means more bytes are needed, so
/// partial and coalesced socket reads are both handled by calling this in a
/// loop around `read_buf`.
///
/// A single leading continuation marker is skipped before the opcode is
/// matched. A length byte above 125 means the peer used masking or extended
/// lengths, which the subset rejects rather than misparses.
pub fn decode_frame(buffer: &mut BytesMut) -> Result<Option<Frame>, Error> {
    let offset = usize::from(buffer.first() == Some(&CONTINUATION_MARKER));

    if buffer.len() < offset + 2 {
        return Ok(None);
    }

    let opcode = OpCode::from(buffer[offset])?;
    let length = buffer[offset + 1] as usize;
    if length > MAX_PAYLOAD_SIZE {
        return Err(Error::FrameTooLarge(length));
    }

    if buffer.len() < offset + 2 + length {
        return Ok(None);
    }

    buffer.advance(offset + 2);
    let payload = buffer.split_to(length).to_vec();

    Ok(Some(Frame { opcode, payload }))
}

use httparse::Error as HttpParseError;
use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;
use tokio::time::error::Elapsed;

#[derive(Error, Debug)]
pub enum Error {
    // Framing Errors
    #[error("frame payload of {0} bytes exceeds the 125 byte single-frame limit")]
    FrameTooLarge(usize),

    #[error("unrecognized opcode byte: {0:#04x}")]
    InvalidOpcode(u8),

    // Handshake Errors
    #[error("couldn't find Sec-WebSocket-Key header in the request")]
    NoSecWebsocketKey,

    #[error("server didn't send a valid Sec-WebSocket-Accept key")]
    InvalidAcceptKey,

    #[error("incomplete HTTP upgrade exchange")]
    IncompleteHandshake,

    #[error("peer closed the socket before the handshake completed")]
    SocketClosedUnexpectedly,

    // Connection Errors
    #[error("connection is not open")]
    ConnectionClosed,

    #[error("channel communication error")]
    CommunicationError,

    // General Errors
    #[error("IO Error happened: {source}")]
    IOError {
        #[from]
        source: io::Error,
    },

    #[error("{source}")]
    FromUtf8Error {
        #[from]
        source: FromUtf8Error,
    },

    #[error("{source}")]
    HttpParseError {
        #[from]
        source: HttpParseError,
    },

    #[error("{source}")]
    Timeout {
        #[from]
        source: Elapsed,
    },
}

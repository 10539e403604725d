//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while decoding boundary payloads.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Invalid intent opcode: {0:#04x}")]
    InvalidOpcode(u8),

    #[error("Unexpected end of data")]
    UnexpectedEof,

    #[error("Malformed {opcode:?} payload: {len} bytes")]
    InvalidLength { opcode: crate::IntentOpcode, len: usize },
}

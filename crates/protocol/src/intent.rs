//! Client intents delivered by the transport layer.

use crate::{IntentReader, IntentWriter, ProtocolError};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Opcodes for client intents.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentOpcode {
    /// Join the arena with an optional username.
    Join = 0x00,
    /// Leave the arena.
    Leave = 0x01,
    /// Move toward a world point.
    Move = 0x10,
    /// Split every eligible cell.
    Split = 0x11,
    /// Eject mass toward the last move target.
    Eject = 0x15,
}

/// A player intent, applied by the simulation one at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    Join { username: Option<String> },
    Leave,
    Move { x: f32, y: f32 },
    Split,
    Eject,
}

impl Intent {
    /// Parse an intent from raw bytes.
    ///
    /// `Move` accepts either two `f32` (9 bytes) or two `i32` plus a
    /// trailing reserved word (13 bytes, the legacy mouse packet layout).
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        let mut reader = IntentReader::new(data.to_vec());
        let opcode = reader.get_u8()?;

        match opcode {
            0x00 => {
                let name = reader.get_string_utf8();
                let name = name.trim();
                Ok(Intent::Join {
                    username: (!name.is_empty()).then(|| name.to_string()),
                })
            }
            0x01 => Ok(Intent::Leave),
            0x10 => match data.len() {
                9 => {
                    let x = reader.get_f32()?;
                    let y = reader.get_f32()?;
                    Ok(Intent::Move { x, y })
                }
                13 => {
                    let x = reader.get_i32()? as f32;
                    let y = reader.get_i32()? as f32;
                    Ok(Intent::Move { x, y })
                }
                len => Err(ProtocolError::InvalidLength {
                    opcode: IntentOpcode::Move,
                    len,
                }),
            },
            0x11 => Ok(Intent::Split),
            0x15 => Ok(Intent::Eject),
            _ => Err(ProtocolError::InvalidOpcode(opcode)),
        }
    }

    /// Encode the intent in its compact form.
    pub fn encode(&self) -> Bytes {
        let mut w = IntentWriter::new();
        match self {
            Intent::Join { username } => {
                w.put_u8(IntentOpcode::Join as u8);
                w.put_string_utf8(username.as_deref().unwrap_or(""));
            }
            Intent::Leave => w.put_u8(IntentOpcode::Leave as u8),
            Intent::Move { x, y } => {
                w.put_u8(IntentOpcode::Move as u8);
                w.put_f32(*x);
                w.put_f32(*y);
            }
            Intent::Split => w.put_u8(IntentOpcode::Split as u8),
            Intent::Eject => w.put_u8(IntentOpcode::Eject as u8),
        }
        w.finish()
    }
}

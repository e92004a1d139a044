//! Binary save format for [`Position`].
//!
//! Layout: a 20-byte header (`PHUT`, version, stone count, CRC32 of the
//! payload, reserved zero; all u32 little-endian after the magic) followed by
//! the payload: width, height, ball x, ball y, then x, y per stone, each an
//! i32 little-endian.

use std::cmp::Ordering;

use crate::types::{Coord, Position, Shape};

const MAGIC: &[u8; 4] = b"PHUT";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 20;
const FIXED_PAYLOAD: usize = 4 * 4;

impl Position {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(FIXED_PAYLOAD + self.stones.len() * 8);
        for value in [
            self.shape.width,
            self.shape.height,
            self.ball.x,
            self.ball.y,
        ] {
            payload.extend_from_slice(&value.to_le_bytes());
        }
        for stone in &self.stones {
            payload.extend_from_slice(&stone.x.to_le_bytes());
            payload.extend_from_slice(&stone.y.to_le_bytes());
        }

        let crc = crc32fast::hash(&payload);
        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&(self.stones.len() as u32).to_le_bytes());
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&payload);
        out
    }

    /// Parses and validates a blob written by [`Position::to_bytes`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, String> {
        let (num_stones, payload) = split_blob(data)?;

        let mut words = payload.chunks_exact(4).map(|chunk| {
            let bytes: [u8; 4] = chunk.try_into().unwrap_or_default();
            i32::from_le_bytes(bytes)
        });
        let mut next = || words.next().ok_or_else(|| "payload ended early".to_string());

        let shape = Shape::new(next()?, next()?);
        let ball = Coord::new(next()?, next()?);
        let mut stones = Vec::with_capacity(num_stones);
        for _ in 0..num_stones {
            stones.push(Coord::new(next()?, next()?));
        }

        let position = Self {
            shape,
            ball,
            stones,
        };
        position.validate()?;
        Ok(position)
    }
}

/// Checks the header and returns the stone count with the payload, whose
/// length and CRC are already verified against it.
fn split_blob(data: &[u8]) -> Result<(usize, &[u8]), String> {
    let Some((header, payload)) = data.split_first_chunk::<HEADER_SIZE>() else {
        return Err(format!(
            "position data too short: need a {HEADER_SIZE}-byte header, got {} bytes",
            data.len()
        ));
    };
    let field = |i: usize| {
        let at = 4 + 4 * i;
        u32::from_le_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]])
    };

    if &header[..4] != MAGIC {
        return Err("invalid position magic (expected PHUT)".to_string());
    }
    let version = field(0);
    if version != VERSION {
        return Err(format!("unsupported position version {version}"));
    }

    let crc = crc32fast::hash(payload);
    if crc != field(2) {
        return Err(format!(
            "CRC32 mismatch: header says {:#010x}, payload hashes to {crc:#010x}",
            field(2)
        ));
    }

    let num_stones = usize::try_from(field(1)).map_err(|_| "stone count overflow".to_string())?;
    let expected = num_stones
        .checked_mul(8)
        .and_then(|n| n.checked_add(FIXED_PAYLOAD))
        .ok_or_else(|| "stone count overflow".to_string())?;
    match payload.len().cmp(&expected) {
        Ordering::Less => Err(format!(
            "unexpected EOF: {num_stones} stones need {expected} payload bytes, got {}",
            payload.len()
        )),
        Ordering::Greater => Err("position payload has trailing bytes".to_string()),
        Ordering::Equal => Ok((num_stones, payload)),
    }
}

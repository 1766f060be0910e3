/*!
 * Block Header
 * Packed in-band metadata stored at the start of every block
 */

use crate::core::limits::HEADER_SIZE;
use crate::core::types::Size;

/// Decoded block header
///
/// On disk the header is a little-endian `u16`: the low 15 bits hold the
/// payload size and the high bit is set while the block is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockHeader {
    size: Size,
    free: bool,
}

impl BlockHeader {
    const FREE_BIT: u16 = 1 << 15;
    const SIZE_MASK: u16 = !Self::FREE_BIT;

    /// Largest payload size the header can describe
    pub const MAX_SIZE: Size = Self::SIZE_MASK as Size;

    pub const fn free(size: Size) -> Self {
        Self { size, free: true }
    }

    pub const fn used(size: Size) -> Self {
        Self { size, free: false }
    }

    #[inline]
    pub const fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub const fn is_free(&self) -> bool {
        self.free
    }

    pub fn encode(self) -> [u8; HEADER_SIZE] {
        debug_assert!(self.size <= Self::MAX_SIZE, "block size {} overflows header", self.size);
        let mut raw = self.size as u16 & Self::SIZE_MASK;
        if self.free {
            raw |= Self::FREE_BIT;
        }
        raw.to_le_bytes()
    }

    pub fn decode(bytes: [u8; HEADER_SIZE]) -> Self {
        let raw = u16::from_le_bytes(bytes);
        Self {
            size: (raw & Self::SIZE_MASK) as Size,
            free: raw & Self::FREE_BIT != 0,
        }
    }
}

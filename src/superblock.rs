//! The volume header stored at block 0.

use crate::disk::BLOCK_SIZE;
use crate::error::Error;

/// Exact magic literal a mounted volume must carry at the start of block 0.
pub const MAGIC: [u8; 16] = [
    0xF0, 0x55, 0x4C, 0x49, 0x45, 0x47, 0x45, 0x49, 0x4E, 0x46, 0x4F, 0x30, 0x39, 0x34, 0x30, 0x0F,
];

/// The decoded volume header.
#[derive(Debug, Clone, Copy)]
pub struct SuperBlock {
    pub num_blocks: u32,
    pub num_inode_blocks: u32,
    pub block_size: u32,
}

impl SuperBlock {
    /// Builds the header for a freshly formatted volume.
    pub fn new(num_blocks: u32, num_inode_blocks: u32) -> Self {
        SuperBlock {
            num_blocks,
            num_inode_blocks,
            block_size: BLOCK_SIZE as u32,
        }
    }

    /// Serializes this header into a zeroed 1024-byte block-0 image.
    pub fn encode(&self) -> [u8; BLOCK_SIZE] {
        let mut buf = [0u8; BLOCK_SIZE];
        buf[0..16].copy_from_slice(&MAGIC);
        buf[16..20].copy_from_slice(&self.num_blocks.to_le_bytes());
        buf[20..24].copy_from_slice(&self.num_inode_blocks.to_le_bytes());
        buf[24..28].copy_from_slice(&self.block_size.to_le_bytes());
        buf
    }

    /// Decodes a block-0 image, validating the magic.
    pub fn decode(buf: &[u8; BLOCK_SIZE]) -> Result<Self, Error> {
        if buf[0..16] != MAGIC {
            return Err(Error::CorruptDisk);
        }
        let num_blocks = u32::from_le_bytes(buf[16..20].try_into().unwrap());
        let num_inode_blocks = u32::from_le_bytes(buf[20..24].try_into().unwrap());
        let block_size = u32::from_le_bytes(buf[24..28].try_into().unwrap());
        Ok(SuperBlock {
            num_blocks,
            num_inode_blocks,
            block_size,
        })
    }

    /// First block of the data region (just past the inode table).
    pub fn data_region_start(&self) -> u32 {
        1 + self.num_inode_blocks
    }

    /// Number of inode slots the inode table can hold.
    pub fn inode_count(&self) -> u32 {
        self.num_inode_blocks * crate::inode::INODES_PER_BLOCK as u32
    }
}

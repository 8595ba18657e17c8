//! The 32-byte on-disk inode record and the inode table built from it.
//!
//! ```text
//! offset  size  field
//!   0      1    valid
//!   1      3    padding
//!   4      4    size
//!   8     16    direct[0..4]
//!  24      4    indirect
//!  28      4    double_indirect
//! ```

use crate::disk::{Disk, BLOCK_SIZE};
use crate::error::Error;

/// Byte size of one packed inode record.
pub const INODE_SIZE: usize = 32;

/// How many inode records fit in one block.
pub const INODES_PER_BLOCK: usize = BLOCK_SIZE / INODE_SIZE;

/// Sentinel meaning "no block" in any pointer field.
pub const NULL_BLOCK: u32 = 0;

/// Number of direct block pointers carried inline in an inode.
pub const DIRECT_POINTERS: usize = 4;

/// In-memory view of one inode record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    pub valid: bool,
    pub size: u32,
    pub direct: [u32; DIRECT_POINTERS],
    pub indirect: u32,
    pub double_indirect: u32,
}

impl Inode {
    /// The all-zero, unallocated inode (satisfies invariant I3).
    pub fn free() -> Self {
        Inode {
            valid: false,
            size: 0,
            direct: [0; DIRECT_POINTERS],
            indirect: 0,
            double_indirect: 0,
        }
    }

    /// Decodes a 32-byte record.
    pub fn decode(buf: &[u8]) -> Self {
        debug_assert_eq!(buf.len(), INODE_SIZE);
        let valid = buf[0] != 0;
        let size = u32::from_le_bytes(buf[4..8].try_into().unwrap());
        let mut direct = [0u32; DIRECT_POINTERS];
        for (i, slot) in direct.iter_mut().enumerate() {
            let off = 8 + i * 4;
            *slot = u32::from_le_bytes(buf[off..off + 4].try_into().unwrap());
        }
        let indirect = u32::from_le_bytes(buf[24..28].try_into().unwrap());
        let double_indirect = u32::from_le_bytes(buf[28..32].try_into().unwrap());
        Inode {
            valid,
            size,
            direct,
            indirect,
            double_indirect,
        }
    }

    /// Encodes this record into a caller-supplied 32-byte window.
    pub fn encode_into(&self, buf: &mut [u8]) {
        debug_assert_eq!(buf.len(), INODE_SIZE);
        buf.fill(0);
        buf[0] = self.valid as u8;
        buf[4..8].copy_from_slice(&self.size.to_le_bytes());
        for (i, slot) in self.direct.iter().enumerate() {
            let off = 8 + i * 4;
            buf[off..off + 4].copy_from_slice(&slot.to_le_bytes());
        }
        buf[24..28].copy_from_slice(&self.indirect.to_le_bytes());
        buf[28..32].copy_from_slice(&self.double_indirect.to_le_bytes());
    }
}

/// Locates inode `index`'s containing block and in-block byte offset.
pub fn locate(index: u32) -> (u32, usize) {
    let block = 1 + index / INODES_PER_BLOCK as u32;
    let offset = (index as usize % INODES_PER_BLOCK) * INODE_SIZE;
    (block, offset)
}

/// Reads inode `index` from the inode table.
pub fn read_inode<D: Disk>(disk: &mut D, index: u32) -> Result<Inode, Error> {
    let (block, offset) = locate(index);
    let mut buf = [0u8; BLOCK_SIZE];
    disk.read(block, &mut buf)?;
    Ok(Inode::decode(&buf[offset..offset + INODE_SIZE]))
}

/// Writes inode `index` back, read-modify-write so sibling records in the
/// same block are left untouched.
pub fn write_inode<D: Disk>(disk: &mut D, index: u32, inode: &Inode) -> Result<(), Error> {
    let (block, offset) = locate(index);
    let mut buf = [0u8; BLOCK_SIZE];
    disk.read(block, &mut buf)?;
    inode.encode_into(&mut buf[offset..offset + INODE_SIZE]);
    disk.write(block, &buf)
}

//! Translates a file's logical byte offset into a physical block number,
//! walking (and, when asked, growing) the direct/indirect/double-indirect
//! pointer tree described in `SPEC_FULL.md` §4.3.

use crate::alloc::BlockAllocator;
use crate::disk::{Disk, BLOCK_SIZE};
use crate::error::Error;
use crate::inode::{Inode, DIRECT_POINTERS, NULL_BLOCK};

/// Entries per indirect block: 1024 bytes / 4-byte pointers.
pub const POINTERS_PER_BLOCK: usize = BLOCK_SIZE / 4;

const INDIRECT_SPAN: u32 = POINTERS_PER_BLOCK as u32;
const DOUBLE_INDIRECT_SPAN: u32 = INDIRECT_SPAN * INDIRECT_SPAN;

const DIRECT_LIMIT: u32 = DIRECT_POINTERS as u32;
const INDIRECT_LIMIT: u32 = DIRECT_LIMIT + INDIRECT_SPAN;
const DOUBLE_INDIRECT_LIMIT: u32 = INDIRECT_LIMIT + DOUBLE_INDIRECT_SPAN;

/// Largest byte offset one past the end of the file a volume of this shape
/// can address (65796 logical blocks * 1024 bytes).
pub const MAX_FILE_SIZE: u64 = DOUBLE_INDIRECT_LIMIT as u64 * BLOCK_SIZE as u64;

enum Location {
    Direct(usize),
    Indirect(usize),
    DoubleIndirect { group: usize, entry: usize },
}

fn locate(lbi: u32) -> Result<Location, Error> {
    if lbi < DIRECT_LIMIT {
        Ok(Location::Direct(lbi as usize))
    } else if lbi < INDIRECT_LIMIT {
        Ok(Location::Indirect((lbi - DIRECT_LIMIT) as usize))
    } else if lbi < DOUBLE_INDIRECT_LIMIT {
        let rel = lbi - INDIRECT_LIMIT;
        Ok(Location::DoubleIndirect {
            group: (rel / INDIRECT_SPAN) as usize,
            entry: (rel % INDIRECT_SPAN) as usize,
        })
    } else {
        Err(Error::InvalidOffset)
    }
}

fn decode_pointer_block(buf: &[u8; BLOCK_SIZE]) -> [u32; POINTERS_PER_BLOCK] {
    let mut table = [0u32; POINTERS_PER_BLOCK];
    for (i, slot) in table.iter_mut().enumerate() {
        let off = i * 4;
        *slot = u32::from_le_bytes(buf[off..off + 4].try_into().unwrap());
    }
    table
}

fn encode_pointer_block(table: &[u32; POINTERS_PER_BLOCK]) -> [u8; BLOCK_SIZE] {
    let mut buf = [0u8; BLOCK_SIZE];
    for (i, &ptr) in table.iter().enumerate() {
        let off = i * 4;
        buf[off..off + 4].copy_from_slice(&ptr.to_le_bytes());
    }
    buf
}

fn read_pointer_block<D: Disk>(disk: &mut D, block: u32) -> Result<[u32; POINTERS_PER_BLOCK], Error> {
    let mut buf = [0u8; BLOCK_SIZE];
    disk.read(block, &mut buf)?;
    Ok(decode_pointer_block(&buf))
}

fn write_pointer_block<D: Disk>(
    disk: &mut D,
    block: u32,
    table: &[u32; POINTERS_PER_BLOCK],
) -> Result<(), Error> {
    disk.write(block, &encode_pointer_block(table))
}

/// Allocates a fresh data block and zero-fills it, rolling the allocation
/// back if the zero-fill write fails.
fn alloc_zeroed<D: Disk>(disk: &mut D, alloc: &mut BlockAllocator) -> Result<u32, Error> {
    let block = alloc.find_free()?;
    let zero = [0u8; BLOCK_SIZE];
    if let Err(e) = disk.write(block, &zero) {
        alloc.free(block);
        return Err(e);
    }
    Ok(block)
}

/// Resolves the logical block index of `offset` to a physical block number.
///
/// With `allocate = false`, a missing (zero) slot anywhere along the path is
/// reported back as `Ok(NULL_BLOCK)` — a hole. With `allocate = true`,
/// missing intermediate and leaf blocks are allocated and zero-filled on
/// demand, top-down, and `inode`'s pointer fields are updated in memory;
/// the caller must persist `inode` afterwards.
pub fn resolve<D: Disk>(
    disk: &mut D,
    alloc: &mut BlockAllocator,
    inode: &mut Inode,
    offset: u32,
    allocate: bool,
) -> Result<u32, Error> {
    let lbi = offset / BLOCK_SIZE as u32;
    match locate(lbi)? {
        Location::Direct(i) => {
            let existing = inode.direct[i];
            if existing != NULL_BLOCK || !allocate {
                return Ok(existing);
            }
            let block = alloc_zeroed(disk, alloc)?;
            inode.direct[i] = block;
            Ok(block)
        }
        Location::Indirect(i) => {
            let existing = inode.indirect;
            let (ind, mut table) = if existing != NULL_BLOCK {
                (existing, read_pointer_block(disk, existing)?)
            } else if !allocate {
                return Ok(NULL_BLOCK);
            } else {
                let block = alloc_zeroed(disk, alloc)?;
                inode.indirect = block;
                (block, [0u32; POINTERS_PER_BLOCK])
            };

            let leaf = table[i];
            if leaf != NULL_BLOCK || !allocate {
                return Ok(leaf);
            }
            let new_leaf = alloc_zeroed(disk, alloc)?;
            table[i] = new_leaf;
            if let Err(e) = write_pointer_block(disk, ind, &table) {
                alloc.free(new_leaf);
                return Err(e);
            }
            Ok(new_leaf)
        }
        Location::DoubleIndirect { group, entry } => {
            let existing_di = inode.double_indirect;
            let (di, mut di_table) = if existing_di != NULL_BLOCK {
                (existing_di, read_pointer_block(disk, existing_di)?)
            } else if !allocate {
                return Ok(NULL_BLOCK);
            } else {
                let block = alloc_zeroed(disk, alloc)?;
                inode.double_indirect = block;
                (block, [0u32; POINTERS_PER_BLOCK])
            };

            let group_ptr = di_table[group];
            let ind = if group_ptr != NULL_BLOCK {
                group_ptr
            } else if !allocate {
                return Ok(NULL_BLOCK);
            } else {
                let new_ind = alloc_zeroed(disk, alloc)?;
                di_table[group] = new_ind;
                if let Err(e) = write_pointer_block(disk, di, &di_table) {
                    alloc.free(new_ind);
                    return Err(e);
                }
                new_ind
            };

            let mut ind_table = if group_ptr != NULL_BLOCK {
                read_pointer_block(disk, ind)?
            } else {
                [0u32; POINTERS_PER_BLOCK]
            };
            let leaf = ind_table[entry];
            if leaf != NULL_BLOCK || !allocate {
                return Ok(leaf);
            }
            let new_leaf = alloc_zeroed(disk, alloc)?;
            ind_table[entry] = new_leaf;
            if let Err(e) = write_pointer_block(disk, ind, &ind_table) {
                alloc.free(new_leaf);
                return Err(e);
            }
            Ok(new_leaf)
        }
    }
}

/// Frees every block reachable from `inode`: direct leaves, indirect leaves
/// and the indirect block itself, and the two-level double-indirect tree.
/// Used by `delete`.
pub fn free_all<D: Disk>(disk: &mut D, alloc: &mut BlockAllocator, inode: &Inode) -> Result<(), Error> {
    for &b in inode.direct.iter() {
        if b != NULL_BLOCK {
            alloc.free(b);
        }
    }
    if inode.indirect != NULL_BLOCK {
        let table = read_pointer_block(disk, inode.indirect)?;
        for &b in table.iter() {
            if b != NULL_BLOCK {
                alloc.free(b);
            }
        }
        alloc.free(inode.indirect);
    }
    if inode.double_indirect != NULL_BLOCK {
        let di_table = read_pointer_block(disk, inode.double_indirect)?;
        for &ind in di_table.iter() {
            if ind != NULL_BLOCK {
                let table = read_pointer_block(disk, ind)?;
                for &b in table.iter() {
                    if b != NULL_BLOCK {
                        alloc.free(b);
                    }
                }
                alloc.free(ind);
            }
        }
        alloc.free(inode.double_indirect);
    }
    Ok(())
}

/// Visits every block number reachable from `inode` (its own pointer fields,
/// plus every block referenced indirectly), without needing a live
/// allocator. Used by the mount-time scan to rebuild allocator state.
pub fn for_each_reachable<D: Disk>(
    disk: &mut D,
    inode: &Inode,
    mut visit: impl FnMut(u32),
) -> Result<(), Error> {
    for &b in inode.direct.iter() {
        if b != NULL_BLOCK {
            visit(b);
        }
    }
    if inode.indirect != NULL_BLOCK {
        visit(inode.indirect);
        let table = read_pointer_block(disk, inode.indirect)?;
        for &b in table.iter() {
            if b != NULL_BLOCK {
                visit(b);
            }
        }
    }
    if inode.double_indirect != NULL_BLOCK {
        visit(inode.double_indirect);
        let di_table = read_pointer_block(disk, inode.double_indirect)?;
        for &ind in di_table.iter() {
            if ind != NULL_BLOCK {
                visit(ind);
                let table = read_pointer_block(disk, ind)?;
                for &b in table.iter() {
                    if b != NULL_BLOCK {
                        visit(b);
                    }
                }
            }
        }
    }
    Ok(())
}

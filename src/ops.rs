//! File operations: create, delete, stat, read, write.

use crate::alloc::BlockAllocator;
use crate::block_map;
use crate::disk::{Disk, BLOCK_SIZE};
use crate::error::Error;
use crate::inode::{self, Inode, NULL_BLOCK};
use crate::volume::{MountedState, SimpleFs};

const BLOCK_SIZE32: u32 = BLOCK_SIZE as u32;

fn validate_index<D: Disk>(mounted: &MountedState<D>, index: u32) -> Result<(), Error> {
    if index < mounted.superblock.inode_count() {
        Ok(())
    } else {
        Err(Error::InvalidInode)
    }
}

/// Walks `len` bytes starting at `start`, allocating blocks as needed and
/// handing each destination span to `fill`. Returns the number of bytes
/// actually written and, if a failure cut the transfer short, the error
/// that caused it — mirrors the read/write partial-result contract.
fn write_segment<D: Disk>(
    disk: &mut D,
    alloc: &mut BlockAllocator,
    inode: &mut Inode,
    start: u32,
    len: u32,
    mut fill: impl FnMut(u32, &mut [u8]),
) -> (u32, Option<Error>) {
    let mut written = 0u32;
    while written < len {
        let cur = start + written;
        let block_off = cur % BLOCK_SIZE32;
        let span = (len - written).min(BLOCK_SIZE32 - block_off);
        let block = match block_map::resolve(disk, alloc, inode, cur, true) {
            Ok(b) => b,
            Err(e) => return (written, Some(e)),
        };
        let mut buf = [0u8; BLOCK_SIZE];
        let partial_block = block_off != 0 || span < BLOCK_SIZE32;
        if partial_block {
            if let Err(e) = disk.read(block, &mut buf) {
                return (written, Some(e));
            }
        }
        fill(written, &mut buf[block_off as usize..block_off as usize + span as usize]);
        if let Err(e) = disk.write(block, &buf) {
            return (written, Some(e));
        }
        written += span;
    }
    (written, None)
}

/// Walks `len` bytes starting at `start`, reading without allocating.
/// Treats an unexpected hole inside the declared file size as disk
/// corruption (see `SPEC_FULL.md` §9 resolved open questions).
fn read_segment<D: Disk>(
    disk: &mut D,
    alloc: &mut BlockAllocator,
    inode: &mut Inode,
    start: u32,
    len: u32,
    mut drain: impl FnMut(u32, &[u8]),
) -> (u32, Option<Error>) {
    let mut delivered = 0u32;
    while delivered < len {
        let cur = start + delivered;
        let block_off = cur % BLOCK_SIZE32;
        let span = (len - delivered).min(BLOCK_SIZE32 - block_off);
        let block = match block_map::resolve(disk, alloc, inode, cur, false) {
            Ok(b) => b,
            Err(e) => return (delivered, Some(e)),
        };
        if block == NULL_BLOCK {
            return (delivered, Some(Error::CorruptDisk));
        }
        let mut buf = [0u8; BLOCK_SIZE];
        if let Err(e) = disk.read(block, &mut buf) {
            return (delivered, Some(e));
        }
        drain(delivered, &buf[block_off as usize..block_off as usize + span as usize]);
        delivered += span;
    }
    (delivered, None)
}

impl<D: Disk> SimpleFs<D> {
    /// Allocates the lowest-numbered free inode and returns its index.
    pub fn create(&mut self) -> Result<u32, Error> {
        let mounted = self.mounted()?;
        for index in 0..mounted.superblock.inode_count() {
            let existing = inode::read_inode(&mut mounted.disk, index)?;
            if !existing.valid {
                let mut fresh = Inode::free();
                fresh.valid = true;
                inode::write_inode(&mut mounted.disk, index, &fresh)?;
                return Ok(index);
            }
        }
        Err(Error::OutOfInodes)
    }

    /// Frees every block owned by inode `index` and returns it to the pool.
    pub fn delete(&mut self, index: u32) -> Result<(), Error> {
        let mounted = self.mounted()?;
        validate_index(mounted, index)?;
        let inode = inode::read_inode(&mut mounted.disk, index)?;
        if !inode.valid {
            return Err(Error::InvalidInode);
        }
        block_map::free_all(&mut mounted.disk, &mut mounted.allocator, &inode)?;
        inode::write_inode(&mut mounted.disk, index, &Inode::free())?;
        Ok(())
    }

    /// Returns the current size in bytes of inode `index`.
    pub fn stat(&mut self, index: u32) -> Result<u32, Error> {
        let mounted = self.mounted()?;
        validate_index(mounted, index)?;
        let inode = inode::read_inode(&mut mounted.disk, index)?;
        if !inode.valid {
            return Err(Error::InvalidInode);
        }
        Ok(inode.size)
    }

    /// Reads up to `buf.len()` bytes starting at `offset` into `buf`,
    /// returning the number of bytes actually delivered. Once at least one
    /// byte has been delivered, a later device error is downgraded to the
    /// partial count instead of propagated.
    pub fn read(&mut self, index: u32, buf: &mut [u8], offset: u32) -> Result<usize, Error> {
        let mounted = self.mounted()?;
        validate_index(mounted, index)?;
        let mut inode = inode::read_inode(&mut mounted.disk, index)?;
        if !inode.valid {
            return Err(Error::InvalidInode);
        }
        if offset >= inode.size {
            return Ok(0);
        }
        let remaining = (inode.size - offset).min(buf.len() as u32);
        let (delivered, err) = read_segment(
            &mut mounted.disk,
            &mut mounted.allocator,
            &mut inode,
            offset,
            remaining,
            |rel, src| buf[rel as usize..rel as usize + src.len()].copy_from_slice(src),
        );
        match err {
            Some(e) if delivered == 0 => Err(e),
            Some(e) => {
                log::warn!(
                    "read on inode {index}: partial transfer {delivered}/{remaining} bytes ({e})"
                );
                Ok(delivered as usize)
            }
            None => Ok(delivered as usize),
        }
    }

    /// Writes `data` at `offset`, zero-filling any gap between the current
    /// size and `offset` first. Returns the number of bytes actually
    /// written; a device error after at least one byte has been transferred
    /// is downgraded to that partial count rather than propagated.
    pub fn write(&mut self, index: u32, data: &[u8], offset: u32) -> Result<usize, Error> {
        let mounted = self.mounted()?;
        validate_index(mounted, index)?;
        let mut inode = inode::read_inode(&mut mounted.disk, index)?;
        if !inode.valid {
            return Err(Error::InvalidInode);
        }
        if data.is_empty() {
            return Ok(0);
        }

        if offset > inode.size {
            let gap = offset - inode.size;
            let gap_start = inode.size;
            let (filled, err) = write_segment(
                &mut mounted.disk,
                &mut mounted.allocator,
                &mut inode,
                gap_start,
                gap,
                |_, dst| dst.fill(0),
            );
            inode.size = gap_start + filled;
            inode::write_inode(&mut mounted.disk, index, &inode)?;
            if let Some(e) = err {
                return Err(e);
            }
        }

        let (written, err) = write_segment(
            &mut mounted.disk,
            &mut mounted.allocator,
            &mut inode,
            offset,
            data.len() as u32,
            |rel, dst| dst.copy_from_slice(&data[rel as usize..rel as usize + dst.len()]),
        );
        inode.size = inode.size.max(offset + written);
        let persisted = inode::write_inode(&mut mounted.disk, index, &inode);

        match err {
            Some(e) if written == 0 => Err(e),
            Some(e) => {
                log::warn!(
                    "write on inode {index}: partial transfer {written}/{} bytes ({e})",
                    data.len()
                );
                Ok(written as usize)
            }
            None => {
                persisted?;
                Ok(written as usize)
            }
        }
    }
}

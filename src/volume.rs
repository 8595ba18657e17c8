//! Mount lifecycle: format, mount, unmount.
//!
//! `SimpleFs<D>` is the single value a caller holds for as long as a volume
//! should stay mounted. Its `state` field is `None` while unmounted and
//! `Some(MountedState)` while mounted — there is no reachable combination
//! where, say, the allocator exists but the cached superblock does not, the
//! way there would be with a handful of loose `Option` fields side by side.

use crate::alloc::BlockAllocator;
use crate::block_map;
use crate::disk::{Disk, BLOCK_SIZE};
use crate::error::Error;
use crate::inode::{self, INODES_PER_BLOCK};
use crate::superblock::SuperBlock;

pub(crate) struct MountedState<D: Disk> {
    pub(crate) disk: D,
    pub(crate) superblock: SuperBlock,
    pub(crate) allocator: BlockAllocator,
    #[allow(dead_code)]
    pub(crate) disk_name: String,
}

/// A file system volume. Generic over the block device implementation so
/// the core never depends on any particular storage backend.
pub struct SimpleFs<D: Disk> {
    pub(crate) state: Option<MountedState<D>>,
}

impl<D: Disk> Default for SimpleFs<D> {
    fn default() -> Self {
        SimpleFs { state: None }
    }
}

impl<D: Disk> SimpleFs<D> {
    /// Creates a handle with no volume mounted.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a volume is currently mounted on this handle.
    pub fn is_mounted(&self) -> bool {
        self.state.is_some()
    }

    pub(crate) fn mounted(&mut self) -> Result<&mut MountedState<D>, Error> {
        self.state.as_mut().ok_or(Error::NotMounted)
    }

    /// Initializes a fresh volume on `disk_name` with room for
    /// `inode_count` inodes (at least 1), then leaves it unmounted.
    pub fn format(&mut self, disk_name: &str, inode_count: u32) -> Result<(), Error> {
        if self.state.is_some() {
            return Err(Error::AlreadyMounted);
        }
        let inode_count = inode_count.max(1);
        let mut disk = D::open(disk_name)?;
        let num_blocks = disk.sector_count();
        let num_inode_blocks = inode_count.div_ceil(INODES_PER_BLOCK as u32).max(1);
        if num_inode_blocks + 1 >= num_blocks {
            return Err(Error::OutOfSpace);
        }

        let sb = SuperBlock::new(num_blocks, num_inode_blocks);
        disk.write(0, &sb.encode())?;
        let zero = [0u8; BLOCK_SIZE];
        for block in 1..=num_inode_blocks {
            disk.write(block, &zero)?;
        }
        disk.sync()?;
        disk.close()?;
        log::debug!(
            "formatted {disk_name}: {num_blocks} blocks, {num_inode_blocks} inode blocks"
        );
        Ok(())
    }

    /// Mounts the volume stored on `disk_name`, rebuilding the in-memory
    /// allocator by scanning every valid inode's reachable blocks.
    pub fn mount(&mut self, disk_name: &str) -> Result<(), Error> {
        if self.state.is_some() {
            return Err(Error::AlreadyMounted);
        }
        let mut disk = D::open(disk_name)?;
        let mut buf = [0u8; BLOCK_SIZE];
        disk.read(0, &mut buf)?;
        let superblock = SuperBlock::decode(&buf)?;

        let mut allocator = BlockAllocator::new(superblock.num_blocks, superblock.data_region_start());
        for index in 0..superblock.inode_count() {
            let inode = inode::read_inode(&mut disk, index)?;
            if inode.valid {
                block_map::for_each_reachable(&mut disk, &inode, |b| allocator.mark_used(b))?;
            }
        }

        log::debug!(
            "mounted {disk_name}: {} blocks, {} inodes",
            superblock.num_blocks,
            superblock.inode_count()
        );
        self.state = Some(MountedState {
            disk,
            superblock,
            allocator,
            disk_name: disk_name.to_string(),
        });
        Ok(())
    }

    /// Unmounts the volume: syncs the device, then releases all in-memory
    /// state regardless of whether the sync succeeded.
    pub fn unmount(&mut self) -> Result<(), Error> {
        let mut mounted = self.state.take().ok_or(Error::NotMounted)?;
        let result = mounted.disk.sync();
        let _ = mounted.disk.close();
        result
    }
}

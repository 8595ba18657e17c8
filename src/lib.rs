//! A single-volume, directory-less file system over a fixed-size-sector
//! block device.
//!
//! There are no directories, no filenames, no permissions, and no
//! timestamps. A file is just a numbered inode; callers address files by
//! the index `create` hands back. Everything below the sector level — the
//! actual host file, ramdisk, or network block device backing a volume —
//! is supplied by the caller through the [`Disk`] trait; this crate only
//! implements the layout and the indexing structure on top of it.
//!
//! ```text
//!  block 0        blocks 1..=S         blocks S+1..N-1
//! +----------+   +----------------+   +----------------------------+
//! |superblock|   | inode table    |   |        data region         |
//! | (header) |   | (32B records)  |   | (direct/indirect/leaf data)|
//! +----------+   +----------------+   +----------------------------+
//! ```
//!
//! Each inode carries four direct block pointers plus a single-indirect and
//! a double-indirect pointer, giving a maximum file size of 65796 logical
//! blocks (`block_map::MAX_FILE_SIZE`):
//!
//! ```text
//! inode --+-- direct[0..4]        -> data block
//!         |-- indirect            -> [256 x ptr] -> data block
//!         +-- double_indirect      -> [256 x ptr] -> [256 x ptr] -> data block
//! ```
//!
//! There is no on-disk free-block bitmap. [`SimpleFs::mount`] rebuilds the
//! allocator purely by scanning every valid inode's reachable blocks, so a
//! block that was allocated and then orphaned by a crash before its pointer
//! was persisted is simply indistinguishable from a free block on the next
//! mount — that scan is this file system's only form of garbage collection.
//!
//! # Example
//!
//! ```no_run
//! use simplefs::{Disk, SimpleFs};
//!
//! # fn run<D: Disk>() -> Result<(), simplefs::Error> {
//! let mut fs: SimpleFs<D> = SimpleFs::new();
//! fs.format("disk.img", 64)?;
//! fs.mount("disk.img")?;
//! let ino = fs.create()?;
//! fs.write(ino, b"hello", 0)?;
//! let mut buf = [0u8; 5];
//! fs.read(ino, &mut buf, 0)?;
//! fs.unmount()?;
//! # Ok(())
//! # }
//! ```

mod alloc;
mod block_map;
mod error;
mod inode;
mod ops;
mod superblock;
mod volume;

pub mod disk;

pub use disk::Disk;
pub use error::Error;
pub use volume::SimpleFs;

/// Maximum number of bytes a single file can hold.
pub use block_map::MAX_FILE_SIZE;

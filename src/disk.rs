//! The block device contract the core consumes.
//!
//! Everything below the sector level — how bytes actually reach a host file,
//! a ramdisk, or a network block device — is someone else's problem. This
//! module only states the contract (see `SPEC_FULL.md` §4.1/§6.2); a concrete
//! implementation lives with whoever embeds this crate, never here. Tests use
//! a file-backed implementation under `tests/common`.

use crate::error::Error;

/// Size in bytes of one sector/block. Fixed by the on-disk format.
pub const BLOCK_SIZE: usize = 1024;

/// A sector-addressable block device.
///
/// Implementors own whatever handle they need (an `fs::File`, a socket, an
/// in-memory `Vec`) and are responsible for translating `Error::Device`
/// codes from whatever their underlying failure mode is.
pub trait Disk: Sized {
    /// Opens (or attaches to) the device named `name`.
    fn open(name: &str) -> Result<Self, Error>;

    /// Total number of fixed-size sectors on the device.
    fn sector_count(&self) -> u32;

    /// Reads sector `sector` into `buf`, which is exactly [`BLOCK_SIZE`] bytes.
    fn read(&mut self, sector: u32, buf: &mut [u8; BLOCK_SIZE]) -> Result<(), Error>;

    /// Writes `buf` to sector `sector`.
    fn write(&mut self, sector: u32, buf: &[u8; BLOCK_SIZE]) -> Result<(), Error>;

    /// Forces any buffered writes to reach stable storage.
    fn sync(&mut self) -> Result<(), Error>;

    /// Releases the device. Implementors that need explicit teardown beyond
    /// `Drop` do it here; the default is a no-op.
    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

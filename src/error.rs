//! Stable error codes returned across the file system's public API.
//!
//! Every fallible operation returns [`Error`] instead of a bare negative
//! integer, but [`Error::code`] recovers the exact wire value a caller on
//! the other side of a narrower boundary (say, an FFI shim) would expect.

use std::fmt;

/// Failure modes of the file system core.
///
/// `Device` wraps a code reported unchanged by the block device adapter —
/// the core never interprets adapter-specific codes, it just passes them
/// through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An operation that requires a mounted volume was called before mount.
    NotMounted,
    /// `mount` or `format` was called while a volume was already mounted.
    AlreadyMounted,
    /// The inode index is out of range, or names a free (unallocated) inode.
    InvalidInode,
    /// No free data block was available to satisfy an allocation.
    OutOfSpace,
    /// No free inode was available to satisfy `create`.
    OutOfInodes,
    /// The superblock magic did not match on mount.
    CorruptDisk,
    /// The offset is beyond the maximum representable file size.
    InvalidOffset,
    /// A code reported by the block device adapter, passed through unchanged.
    Device(i32),
}

impl Error {
    /// The stable negative code for this error, per the on-disk/API contract.
    pub fn code(self) -> i32 {
        match self {
            Error::NotMounted => -100,
            Error::AlreadyMounted => -101,
            Error::InvalidInode => -102,
            Error::OutOfSpace => -103,
            Error::OutOfInodes => -104,
            Error::CorruptDisk => -105,
            Error::InvalidOffset => -106,
            Error::Device(code) => code,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotMounted => write!(f, "no volume is mounted"),
            Error::AlreadyMounted => write!(f, "a volume is already mounted"),
            Error::InvalidInode => write!(f, "invalid or unallocated inode"),
            Error::OutOfSpace => write!(f, "no free data blocks"),
            Error::OutOfInodes => write!(f, "no free inodes"),
            Error::CorruptDisk => write!(f, "corrupt disk: bad superblock magic"),
            Error::InvalidOffset => write!(f, "offset beyond maximum file size"),
            Error::Device(code) => write!(f, "device error (code {code})"),
        }
    }
}

impl std::error::Error for Error {}

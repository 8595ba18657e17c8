//! A host-file-backed [`Disk`] used only by the integration tests. The
//! crate itself never depends on `std::fs` beyond what the library already
//! pulls in — this harness is the "real" adapter an embedding application
//! would write, kept out of `src/` on purpose.

use simplefs::disk::BLOCK_SIZE;
use simplefs::{Disk, Error};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Once;
use tempfile::NamedTempFile;

static LOGGER: Once = Once::new();

/// Brings up `env_logger` from `RUST_LOG`, once per test binary. Safe to
/// call from every test; only the first call does anything.
pub fn init_logging() {
    LOGGER.call_once(|| {
        let _ = env_logger::try_init();
    });
}

pub struct FileDisk {
    file: File,
    sector_count: u32,
}

impl Disk for FileDisk {
    fn open(name: &str) -> Result<Self, Error> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(name)
            .map_err(|e| Error::Device(e.raw_os_error().unwrap_or(-1)))?;
        let len = file
            .metadata()
            .map_err(|e| Error::Device(e.raw_os_error().unwrap_or(-1)))?
            .len();
        Ok(FileDisk {
            file,
            sector_count: (len / BLOCK_SIZE as u64) as u32,
        })
    }

    fn sector_count(&self) -> u32 {
        self.sector_count
    }

    fn read(&mut self, sector: u32, buf: &mut [u8; BLOCK_SIZE]) -> Result<(), Error> {
        self.file
            .seek(SeekFrom::Start(sector as u64 * BLOCK_SIZE as u64))
            .map_err(|e| Error::Device(e.raw_os_error().unwrap_or(-1)))?;
        self.file
            .read_exact(buf)
            .map_err(|e| Error::Device(e.raw_os_error().unwrap_or(-1)))
    }

    fn write(&mut self, sector: u32, buf: &[u8; BLOCK_SIZE]) -> Result<(), Error> {
        self.file
            .seek(SeekFrom::Start(sector as u64 * BLOCK_SIZE as u64))
            .map_err(|e| Error::Device(e.raw_os_error().unwrap_or(-1)))?;
        self.file
            .write_all(buf)
            .map_err(|e| Error::Device(e.raw_os_error().unwrap_or(-1)))
    }

    fn sync(&mut self) -> Result<(), Error> {
        self.file
            .sync_all()
            .map_err(|e| Error::Device(e.raw_os_error().unwrap_or(-1)))
    }
}

/// Creates an auto-cleaned-up backing file of exactly `sectors` blocks.
///
/// The returned `NamedTempFile` must be kept alive (bound to a name, not
/// `_`) for as long as the volume is expected to exist on disk: `format`
/// and `mount` reopen it by path, and dropping the `NamedTempFile` deletes
/// it.
pub fn scratch_disk(sectors: u32) -> NamedTempFile {
    let file = NamedTempFile::new().expect("create backing temp file");
    file.as_file()
        .set_len(sectors as u64 * BLOCK_SIZE as u64)
        .expect("size backing file");
    file
}

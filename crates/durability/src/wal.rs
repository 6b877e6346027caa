//! WAL file writer
//!
//! The WAL is a single append-only file of CRC-framed records. A record is
//! durable once [`Wal::append`] returns under `Strict` mode, or once the
//! next sync happens under `Batched` mode.
//!
//! A failed write truncates the file back to the last good offset so a
//! partial frame never sits in front of later records. If that truncation
//! also fails the WAL refuses every later append: whatever is left past the
//! last good offset may be a complete frame that was never acknowledged.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::encoding::encode_record;
use crate::error::{DurabilityError, Result};
use crate::mode::DurabilityMode;
use crate::record::WalRecord;

/// File name of the WAL inside a ledger directory
pub const WAL_FILE_NAME: &str = "ledger.wal";

/// Append-only WAL file
pub struct Wal {
    file: File,
    path: PathBuf,
    mode: DurabilityMode,
    /// End of the last complete frame
    offset: u64,
    /// Records written since the last fsync
    pending: usize,
    last_sync: Instant,
    /// Set when a failed write could not be rolled back
    failed: bool,
}

impl Wal {
    /// Open (or create) the WAL at `path`
    ///
    /// Writes continue at the end of the existing file; run recovery first
    /// so a torn tail has already been cut off.
    pub fn open(path: impl AsRef<Path>, mode: DurabilityMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Self::from_file(file, path, mode)
    }

    /// Wrap a file that is already open, appending at its current end
    pub fn from_file(file: File, path: impl Into<PathBuf>, mode: DurabilityMode) -> Result<Self> {
        let offset = file.metadata()?.len();
        Ok(Self {
            file,
            path: path.into(),
            mode,
            offset,
            pending: 0,
            last_sync: Instant::now(),
            failed: false,
        })
    }

    /// Path of the WAL file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durability mode in effect
    pub fn mode(&self) -> DurabilityMode {
        self.mode
    }

    /// Current end of the log in bytes
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Records not yet fsynced
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Whether the WAL has stopped accepting appends
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Append one record, syncing according to the durability mode
    ///
    /// Returns the offset the record was written at.
    pub fn append(&mut self, record: &WalRecord) -> Result<u64> {
        if self.failed {
            return Err(DurabilityError::WalFailed {
                offset: self.offset,
            });
        }
        let frame = encode_record(record)?;
        let start = self.offset;

        if let Err(e) = self.file.write_all(&frame) {
            self.rollback_to(start);
            return Err(e.into());
        }
        self.offset = start + frame.len() as u64;
        self.pending += 1;

        if self.mode.should_sync(self.pending, self.last_sync.elapsed()) {
            if let Err(e) = self.sync() {
                // Not durable, so not acknowledged: drop the frame.
                self.pending -= 1;
                self.rollback_to(start);
                return Err(e);
            }
        }

        Ok(start)
    }

    /// Force all written records to disk
    pub fn flush(&mut self) -> Result<()> {
        if self.pending > 0 {
            self.sync()?;
        }
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        self.pending = 0;
        self.last_sync = Instant::now();
        Ok(())
    }

    fn rollback_to(&mut self, offset: u64) {
        match self.file.set_len(offset) {
            Ok(()) => self.offset = offset,
            Err(e) => {
                self.failed = true;
                tracing::error!(
                    path = %self.path.display(),
                    offset,
                    error = %e,
                    "failed to truncate WAL after write error; rejecting further appends"
                );
            }
        }
    }
}

impl Drop for Wal {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                "failed to flush WAL on drop"
            );
        }
    }
}

impl std::fmt::Debug for Wal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wal")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("offset", &self.offset)
            .field("pending", &self.pending)
            .field("failed", &self.failed)
            .finish()
    }
}

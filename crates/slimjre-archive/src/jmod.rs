//! `.jmod` container support: a 4-byte `JM<version>` magic header followed
//! by a standard ZIP central directory whose offsets are relative to the
//! start of that embedded zip payload, not the start of the file.
//!
//! Grounded on `nova-build/src/jpms.rs`'s `OffsetReader<R>`, which exists
//! there purely to *detect* jmod-shaped archives; this crate needs the same
//! wrapper to actually *read* them.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::ArchiveError;

const JMOD_HEADER_LEN: u64 = 4;
const JMOD_MAGIC: [u8; 2] = *b"JM";

pub(crate) struct JmodReader {
    inner: File,
    base: u64,
}

impl JmodReader {
    pub(crate) fn new(mut file: File, path: &Path) -> Result<Self, ArchiveError> {
        let mut header = [0u8; 2];
        let ok = file.read_exact(&mut header).is_ok() && header == JMOD_MAGIC;
        if !ok {
            return Err(ArchiveError::InvalidJmodMagic {
                path: path.to_path_buf(),
            });
        }

        file.seek(SeekFrom::Start(JMOD_HEADER_LEN))
            .map_err(|source| ArchiveError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            inner: file,
            base: JMOD_HEADER_LEN,
        })
    }
}

impl Read for JmodReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for JmodReader {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let base = self.base;
        let adjusted = match pos {
            SeekFrom::Start(offset) => {
                SeekFrom::Start(offset.checked_add(base).ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "seek overflow")
                })?)
            }
            SeekFrom::End(offset) => SeekFrom::End(offset),
            SeekFrom::Current(offset) => SeekFrom::Current(offset),
        };

        let absolute = self.inner.seek(adjusted)?;
        absolute.checked_sub(base).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "seek before archive start",
            )
        })
    }
}

//! Model archive detection and extraction.

use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZIP_MAGIC: [u8; 4] = [b'P', b'K', 0x03, 0x04];
const USTAR_OFFSET: usize = 257;
const USTAR_MAGIC: &[u8; 5] = b"ustar";

/// Supported model archive containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Gzip-compressed tarball.
    TarGz,
    /// Uncompressed tarball.
    Tar,
    /// Zip archive.
    Zip,
}

impl ArchiveFormat {
    /// Detect the container format from the file's magic bytes.
    pub fn detect(path: &Path) -> Result<Self> {
        let unreadable = |e: std::io::Error| Error::ArchiveExtract {
            path: path.to_path_buf(),
            source: Box::new(e),
        };
        let mut header = [0u8; 512];
        let mut file = File::open(path).map_err(unreadable)?;
        let read = read_up_to(&mut file, &mut header).map_err(unreadable)?;
        Self::from_header(&header[..read]).ok_or_else(|| Error::UnknownArchiveFormat {
            path: path.to_path_buf(),
        })
    }

    /// Detect the container format from leading bytes.
    pub fn from_header(header: &[u8]) -> Option<Self> {
        if header.starts_with(&GZIP_MAGIC) {
            Some(Self::TarGz)
        } else if header.starts_with(&ZIP_MAGIC) {
            Some(Self::Zip)
        } else if header.len() >= USTAR_OFFSET + USTAR_MAGIC.len()
            && &header[USTAR_OFFSET..USTAR_OFFSET + USTAR_MAGIC.len()] == USTAR_MAGIC
        {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Extract every entry of `archive` into `dest`.
///
/// Returns the number of entries written. Entries that would escape
/// `dest` are skipped.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<usize> {
    let format = ArchiveFormat::detect(archive)?;
    debug!("Extracting {:?} archive {}", format, archive.display());

    let extract_err = |e: Box<dyn std::error::Error + Send + Sync>| Error::ArchiveExtract {
        path: archive.to_path_buf(),
        source: e,
    };

    let file = File::open(archive).map_err(|e| extract_err(Box::new(e)))?;
    match format {
        ArchiveFormat::TarGz => unpack_tar(tar::Archive::new(GzDecoder::new(file)), dest)
            .map_err(|e| extract_err(Box::new(e))),
        ArchiveFormat::Tar => {
            unpack_tar(tar::Archive::new(file), dest).map_err(|e| extract_err(Box::new(e)))
        }
        ArchiveFormat::Zip => {
            let mut zip = zip::ZipArchive::new(file).map_err(|e| extract_err(Box::new(e)))?;
            let entries = zip.len();
            zip.extract(dest).map_err(|e| extract_err(Box::new(e)))?;
            Ok(entries)
        }
    }
}

fn unpack_tar<R: Read>(mut archive: tar::Archive<R>, dest: &Path) -> std::io::Result<usize> {
    let mut unpacked = 0;
    for entry in archive.entries()? {
        let mut entry = entry?;
        if entry.unpack_in(dest)? {
            unpacked += 1;
        } else {
            debug!("Skipped archive entry outside destination");
        }
    }
    Ok(unpacked)
}

//! Tagscan - embedded metadata extraction for ASF/WMA, MP4/M4A and FLAC
//!
//! Each scanner reads a bounded slice of the source, decodes what it can and
//! hands back a [`TagRecord`] plus at most one [`EmbeddedArt`]. Damage inside a
//! single object, atom or block only loses that piece; I/O failures and a
//! missing format marker fail the whole scan.
//!
//! ```no_run
//! use tagscan::{scan_file, ScanConfig};
//!
//! let config = ScanConfig::default();
//! if let Some(output) = scan_file("song.flac", &config)? {
//!     println!("{:?}", output.tag.title);
//! }
//! # Ok::<(), tagscan::ScanError>(())
//! ```

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use tracing::debug;

pub mod asf;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod field_mapping;
pub mod flac;
pub mod genres;
pub mod mp4;
pub mod tag;
pub mod utils;

pub use config::ScanConfig;
pub use dispatch::{FormatDispatcher, ScannerKind};
pub use error::{Result, ScanError};
pub use tag::{EmbeddedArt, PictureType, ScanOutput, TagRecord};
pub use utils::{ByteCursor, Utf16LeDecoder};

/// Scan the file at `path` with the scanner its extension selects.
///
/// Returns `Ok(None)` when no scanner handles the path.
pub fn scan_file<P: AsRef<Path>>(path: P, config: &ScanConfig) -> Result<Option<ScanOutput>> {
    let path = path.as_ref();
    let Some(kind) = FormatDispatcher::for_path(&path.to_string_lossy()) else {
        debug!(path = %path.display(), "no scanner for path");
        return Ok(None);
    };

    let mut reader = BufReader::new(File::open(path)?);
    debug!(path = %path.display(), scanner = kind.name(), "scanning");
    kind.scan(&mut reader, config).map(Some)
}

/// Scan an in-memory copy of a file.
pub fn scan_bytes(kind: ScannerKind, data: &[u8], config: &ScanConfig) -> Result<ScanOutput> {
    kind.scan(&mut Cursor::new(data), config)
}

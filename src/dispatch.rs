// Scanner selection by file extension or leading bytes

use std::io::{Read, Seek};
use std::path::Path;

use serde::Serialize;

use crate::asf::guid;
use crate::config::ScanConfig;
use crate::error::Result;
use crate::tag::ScanOutput;
use crate::{asf, flac, mp4};

/// The binary scanners this crate provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScannerKind {
    Asf,
    Mp4,
    Flac,
}

impl ScannerKind {
    pub fn scan<R: Read + Seek>(self, reader: &mut R, config: &ScanConfig) -> Result<ScanOutput> {
        match self {
            ScannerKind::Asf => asf::scan(reader, config),
            ScannerKind::Mp4 => mp4::scan(reader, config),
            ScannerKind::Flac => flac::scan(reader, config),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScannerKind::Asf => "ASF",
            ScannerKind::Mp4 => "MP4",
            ScannerKind::Flac => "FLAC",
        }
    }

    /// Guess the scanner from the first bytes of a file.
    ///
    /// An `ID3` prefix is taken as FLAC since only the FLAC scanner looks
    /// past a leading tag.
    pub fn sniff(head: &[u8]) -> Option<ScannerKind> {
        if head.len() >= 16 && head[..16] == guid::HEADER.to_bytes() {
            Some(ScannerKind::Asf)
        } else if head.len() >= 8 && &head[4..8] == b"ftyp" {
            Some(ScannerKind::Mp4)
        } else if head.starts_with(b"fLaC") || head.starts_with(b"ID3") {
            Some(ScannerKind::Flac)
        } else {
            None
        }
    }
}

/// URL schemes that name streams or library entries rather than files
const NON_FILE_SCHEMES: &[&str] = &[
    "http", "https", "mms", "mmsh", "rtsp", "rtmp", "shout", "lastfm", "udp", "rtp",
    "musicdb", "videodb", "cdda",
];

/// Maps paths to scanners
pub struct FormatDispatcher;

impl FormatDispatcher {
    /// `ext` may carry a leading dot and any case.
    pub fn for_extension(ext: &str) -> Option<ScannerKind> {
        match ext.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "wma" | "asf" => Some(ScannerKind::Asf),
            "m4a" | "mp4" | "m4b" | "m4p" => Some(ScannerKind::Mp4),
            "flac" => Some(ScannerKind::Flac),
            _ => None,
        }
    }

    /// Pick a scanner for a path or URL string.
    ///
    /// Streams and virtual library paths get `None`; any `?query` suffix is
    /// ignored when reading the extension.
    pub fn for_path(path: &str) -> Option<ScannerKind> {
        if let Some((scheme, _)) = path.split_once("://") {
            let scheme = scheme.to_ascii_lowercase();
            if NON_FILE_SCHEMES.contains(&scheme.as_str()) {
                return None;
            }
        }
        let path = path.split('?').next().unwrap_or(path);
        let ext = Path::new(path).extension()?.to_str()?;
        Self::for_extension(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        assert_eq!(FormatDispatcher::for_extension("WMA"), Some(ScannerKind::Asf));
        assert_eq!(FormatDispatcher::for_extension(".m4b"), Some(ScannerKind::Mp4));
        assert_eq!(FormatDispatcher::for_extension("flac"), Some(ScannerKind::Flac));
        assert_eq!(FormatDispatcher::for_extension("mp3"), None);
        assert_eq!(FormatDispatcher::for_extension(""), None);
    }

    #[test]
    fn test_paths() {
        assert_eq!(
            FormatDispatcher::for_path("/music/Album/01 - Track.FLAC"),
            Some(ScannerKind::Flac)
        );
        assert_eq!(
            FormatDispatcher::for_path("smb://nas/share/song.m4a?x=1"),
            Some(ScannerKind::Mp4)
        );
        assert_eq!(FormatDispatcher::for_path("http://radio.example/live.wma"), None);
        assert_eq!(FormatDispatcher::for_path("musicdb://songs/12.flac"), None);
        assert_eq!(FormatDispatcher::for_path("cdda://local/01.flac"), None);
        assert_eq!(FormatDispatcher::for_path("/music/README"), None);
    }

    #[test]
    fn test_sniff() {
        assert_eq!(ScannerKind::sniff(&guid::HEADER.to_bytes()), Some(ScannerKind::Asf));
        assert_eq!(
            ScannerKind::sniff(b"\0\0\0\x20ftypM4A "),
            Some(ScannerKind::Mp4)
        );
        assert_eq!(ScannerKind::sniff(b"fLaC\0\0\0\x22"), Some(ScannerKind::Flac));
        assert_eq!(ScannerKind::sniff(b"ID3\x04"), Some(ScannerKind::Flac));
        assert_eq!(ScannerKind::sniff(b"OggS"), None);
        assert_eq!(ScannerKind::sniff(b""), None);
    }
}

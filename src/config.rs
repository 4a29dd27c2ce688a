// Scan configuration

use serde::{Deserialize, Serialize};

/// Limits and conventions shared by all scanners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Joins multiple values of append-merged fields (artists, genres)
    pub item_separator: String,
    /// Bytes of an ASF file searched for header objects
    pub asf_window: usize,
    /// Bytes searched for the `fLaC` marker
    pub flac_marker_window: usize,
    /// FLAC metadata blocks starting past this offset are not read
    pub flac_metadata_limit: u64,
    /// Longest single Vorbis comment accepted
    pub vorbis_comment_ceiling: usize,
    /// Largest MP4 `meta` payload read into memory
    pub mp4_meta_limit: usize,
    /// Recursion bound for the MP4 atom walk
    pub max_atom_depth: usize,
    /// Atom headers read in one MP4 walk before it gives up
    pub max_atom_count: usize,
    /// Album artist given to compilations that lack one
    pub various_artists_label: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            item_separator: " / ".to_string(),
            asf_window: 256 * 1024,
            flac_marker_window: 16 * 1024,
            flac_metadata_limit: 32 * 1024 * 1024,
            vorbis_comment_ceiling: 1024 * 1024,
            mp4_meta_limit: 16 * 1024 * 1024,
            max_atom_depth: 16,
            max_atom_count: 65_536,
            various_artists_label: "Various Artists".to_string(),
        }
    }
}

impl ScanConfig {
    /// Parse a JSON config; missing keys take their defaults.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

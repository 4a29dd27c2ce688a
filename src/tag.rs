// Normalized output model shared by every scanner

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use serde::{Serialize, Serializer};

use crate::field_mapping::{MergePolicy, TagField};

/// Tag fields accumulated during one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    pub comment: Option<String>,
    pub lyrics: Option<String>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub release_year: Option<u16>,
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Option<Duration>,
    pub compilation: bool,
    /// Set once a title or artist has been decoded
    pub loaded: bool,
}

fn serialize_secs<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => s.serialize_some(&d.as_secs()),
        None => s.serialize_none(),
    }
}

impl TagRecord {
    pub fn new() -> Self {
        TagRecord::default()
    }

    fn text_slot(&mut self, field: TagField) -> Option<&mut Option<String>> {
        match field {
            TagField::Title => Some(&mut self.title),
            TagField::Artist => Some(&mut self.artist),
            TagField::Album => Some(&mut self.album),
            TagField::AlbumArtist => Some(&mut self.album_artist),
            TagField::Genre => Some(&mut self.genre),
            TagField::Comment => Some(&mut self.comment),
            TagField::Lyrics => Some(&mut self.lyrics),
            _ => None,
        }
    }

    /// Store a decoded text value.
    ///
    /// Numeric fields parse the leading digits of `value`. Blank values never
    /// overwrite anything. Returns whether the record changed.
    pub fn apply_text(
        &mut self,
        field: TagField,
        value: &str,
        policy: MergePolicy,
        separator: &str,
    ) -> bool {
        let value = value.trim_matches(|c: char| c == '\0' || c.is_whitespace());
        if value.is_empty() {
            return false;
        }

        match field {
            TagField::TrackNumber | TagField::TrackIndex | TagField::DiscNumber | TagField::Year => {
                return match leading_number(value) {
                    Some(n) => self.apply_number(field, n),
                    None => false,
                };
            }
            TagField::Compilation => {
                let flag = value == "1" || value.eq_ignore_ascii_case("true");
                return self.apply_flag(field, flag);
            }
            _ => {}
        }

        let Some(slot) = self.text_slot(field) else {
            return false;
        };

        let changed = match (slot.as_mut(), policy) {
            (None, _) => {
                *slot = Some(value.to_string());
                true
            }
            (Some(existing), MergePolicy::Append) => {
                if existing.split(separator).any(|v| v == value) {
                    false
                } else {
                    existing.push_str(separator);
                    existing.push_str(value);
                    true
                }
            }
            (Some(_), MergePolicy::FirstWins) => false,
        };

        if changed && matches!(field, TagField::Title | TagField::Artist) {
            self.loaded = true;
        }
        changed
    }

    /// Store a numeric value. Zero is treated as "absent" and ignored.
    pub fn apply_number(&mut self, field: TagField, value: u32) -> bool {
        match field {
            TagField::TrackNumber if value > 0 && self.track_number.is_none() => {
                self.track_number = Some(value);
                true
            }
            // zero-based index only fills a missing track number
            TagField::TrackIndex if self.track_number.is_none() => {
                self.track_number = value.checked_add(1);
                self.track_number.is_some()
            }
            TagField::DiscNumber if value > 0 && self.disc_number.is_none() => {
                self.disc_number = Some(value);
                true
            }
            TagField::Year if value > 0 && self.release_year.is_none() => {
                match u16::try_from(value) {
                    Ok(year) => {
                        self.release_year = Some(year);
                        true
                    }
                    Err(_) => false,
                }
            }
            _ => false,
        }
    }

    pub fn apply_flag(&mut self, field: TagField, value: bool) -> bool {
        if field == TagField::Compilation && value && !self.compilation {
            self.compilation = true;
            return true;
        }
        false
    }

    /// Keep the first duration found.
    pub fn set_duration(&mut self, duration: Duration) {
        if self.duration.is_none() {
            self.duration = Some(duration);
        }
    }

    /// Fill the album artist of a compilation with a caller-supplied label.
    pub fn apply_compilation_fallback(&mut self, label: &str) {
        if self.compilation && self.album_artist.is_none() && !label.is_empty() {
            self.album_artist = Some(label.to_string());
        }
    }
}

/// Parse the leading decimal digits of a string ("3/12" -> 3, "2004-05-01" -> 2004).
pub fn leading_number(value: &str) -> Option<u32> {
    let digits: &str = {
        let trimmed = value.trim_start();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    };
    digits.parse().ok()
}

/// Picture types shared by FLAC PICTURE blocks and ASF WM/Picture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureType {
    Other = 0,
    FileIcon = 1,
    OtherFileIcon = 2,
    CoverFront = 3,
    CoverBack = 4,
    LeafletPage = 5,
    Media = 6,
    LeadArtist = 7,
    Artist = 8,
    Conductor = 9,
    Band = 10,
    Composer = 11,
    Lyricist = 12,
    RecordingLocation = 13,
    DuringRecording = 14,
    DuringPerformance = 15,
    VideoScreenCapture = 16,
    BrightColouredFish = 17,
    Illustration = 18,
    BandLogo = 19,
    PublisherLogo = 20,
}

impl PictureType {
    pub fn from_u32(value: u32) -> Option<Self> {
        let kind = match value {
            0 => PictureType::Other,
            1 => PictureType::FileIcon,
            2 => PictureType::OtherFileIcon,
            3 => PictureType::CoverFront,
            4 => PictureType::CoverBack,
            5 => PictureType::LeafletPage,
            6 => PictureType::Media,
            7 => PictureType::LeadArtist,
            8 => PictureType::Artist,
            9 => PictureType::Conductor,
            10 => PictureType::Band,
            11 => PictureType::Composer,
            12 => PictureType::Lyricist,
            13 => PictureType::RecordingLocation,
            14 => PictureType::DuringRecording,
            15 => PictureType::DuringPerformance,
            16 => PictureType::VideoScreenCapture,
            17 => PictureType::BrightColouredFish,
            18 => PictureType::Illustration,
            19 => PictureType::BandLogo,
            20 => PictureType::PublisherLogo,
            _ => return None,
        };
        Some(kind)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PictureType::Other => "Other",
            PictureType::FileIcon => "File Icon",
            PictureType::OtherFileIcon => "Other File Icon",
            PictureType::CoverFront => "Cover (front)",
            PictureType::CoverBack => "Cover (back)",
            PictureType::LeafletPage => "Leaflet page",
            PictureType::Media => "Media",
            PictureType::LeadArtist => "Lead artist",
            PictureType::Artist => "Artist",
            PictureType::Conductor => "Conductor",
            PictureType::Band => "Band",
            PictureType::Composer => "Composer",
            PictureType::Lyricist => "Lyricist",
            PictureType::RecordingLocation => "Recording Location",
            PictureType::DuringRecording => "During recording",
            PictureType::DuringPerformance => "During performance",
            PictureType::VideoScreenCapture => "Video screen capture",
            PictureType::BrightColouredFish => "Bright coloured fish",
            PictureType::Illustration => "Illustration",
            PictureType::BandLogo => "Band logo",
            PictureType::PublisherLogo => "Publisher logo",
        }
    }

    /// Selection rank: front cover beats "other", which beats everything else.
    pub fn priority(raw: u32) -> u8 {
        match Self::from_u32(raw) {
            Some(PictureType::CoverFront) => 2,
            Some(PictureType::Other) => 1,
            _ => 0,
        }
    }
}

/// Cover art pulled out of the file itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedArt {
    pub mime_type: String,
    #[serde(rename = "data", serialize_with = "serialize_base64")]
    pub bytes: Vec<u8>,
}

fn serialize_base64<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
}

impl EmbeddedArt {
    /// Build from a declared MIME type, sniffing the bytes when it is blank.
    pub fn new(mime_type: &str, bytes: Vec<u8>) -> Self {
        let mime_type = if mime_type.trim().is_empty() {
            Self::sniff_mime(&bytes)
                .unwrap_or("application/octet-stream")
                .to_string()
        } else {
            mime_type.trim().to_string()
        };
        EmbeddedArt { mime_type, bytes }
    }

    /// Identify an image by its magic bytes.
    pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some("image/jpeg")
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some("image/png")
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some("image/gif")
        } else if bytes.starts_with(b"BM") {
            Some("image/bmp")
        } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            Some("image/webp")
        } else {
            None
        }
    }

    /// Get file extension based on MIME type
    pub fn extension(&self) -> &'static str {
        match self.mime_type.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            "image/tiff" => "tiff",
            _ => "jpg",
        }
    }

    /// Save cover art to file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, &self.bytes)
    }
}

/// Everything one scan produces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanOutput {
    pub tag: TagRecord,
    pub art: Option<EmbeddedArt>,
}

// Unified metadata field mapping
//
// Each container names its fields differently:
// - ASF: attribute names (Author, WM/AlbumTitle, WM/Genre, ...)
// - MP4: iTunes item atoms (©nam, ©ART, trkn, ...)
// - FLAC: Vorbis comment keys (TITLE, ARTIST, ALBUM, ...)
//
// This module maps them onto `TagField` together with the merge policy that
// decides what happens when the same field is seen twice.

use crate::mp4::atoms;

/// Normalized tag fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagField {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Genre,
    Comment,
    Lyrics,
    TrackNumber,
    /// Zero-based track index (ASF `WM/Track`)
    TrackIndex,
    DiscNumber,
    Year,
    Compilation,
    Picture,
}

/// What to do when a field that already holds a value is seen again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Keep the first non-empty value.
    FirstWins,
    /// Join distinct values with the configured separator.
    Append,
}

/// ASF attribute names
pub struct AsfNames;

impl AsfNames {
    pub const AUTHOR: &'static str = "Author";
    pub const ALBUM_TITLE: &'static str = "WM/AlbumTitle";
    pub const ALBUM_ARTIST: &'static str = "WM/AlbumArtist";
    pub const TRACK_NUMBER: &'static str = "WM/TrackNumber";
    pub const TRACK: &'static str = "WM/Track";
    pub const PART_OF_SET: &'static str = "WM/PartOfSet";
    pub const YEAR: &'static str = "WM/Year";
    pub const GENRE: &'static str = "WM/Genre";
    pub const LYRICS: &'static str = "WM/Lyrics";
    pub const PICTURE: &'static str = "WM/Picture";

    pub fn lookup(name: &str) -> Option<(TagField, MergePolicy)> {
        let field = match name {
            Self::AUTHOR => return Some((TagField::Artist, MergePolicy::Append)),
            Self::GENRE => return Some((TagField::Genre, MergePolicy::Append)),
            Self::ALBUM_TITLE => TagField::Album,
            Self::ALBUM_ARTIST => TagField::AlbumArtist,
            Self::TRACK_NUMBER => TagField::TrackNumber,
            Self::TRACK => TagField::TrackIndex,
            Self::PART_OF_SET => TagField::DiscNumber,
            Self::YEAR => TagField::Year,
            Self::LYRICS => TagField::Lyrics,
            Self::PICTURE => TagField::Picture,
            _ => return None,
        };
        Some((field, MergePolicy::FirstWins))
    }
}

/// Vorbis comment keys (FLAC)
pub struct VorbisKeys;

impl VorbisKeys {
    pub fn lookup(key: &str) -> Option<(TagField, MergePolicy)> {
        let field = match key.to_ascii_uppercase().as_str() {
            "ARTIST" => return Some((TagField::Artist, MergePolicy::Append)),
            "GENRE" => return Some((TagField::Genre, MergePolicy::Append)),
            "TITLE" => TagField::Title,
            "ALBUM" => TagField::Album,
            "ALBUMARTIST" | "ALBUM ARTIST" => TagField::AlbumArtist,
            "DATE" | "YEAR" => TagField::Year,
            "TRACKNUMBER" => TagField::TrackNumber,
            "DISCNUMBER" => TagField::DiscNumber,
            "COMMENT" | "DESCRIPTION" => TagField::Comment,
            "LYRICS" | "UNSYNCEDLYRICS" => TagField::Lyrics,
            "COMPILATION" => TagField::Compilation,
            _ => return None,
        };
        Some((field, MergePolicy::FirstWins))
    }
}

/// iTunes item atoms (MP4). All MP4 items keep the first value.
pub fn mp4_field(code: u32) -> Option<TagField> {
    match code {
        atoms::TITLE => Some(TagField::Title),
        atoms::ARTIST => Some(TagField::Artist),
        atoms::ALBUM => Some(TagField::Album),
        atoms::ALBUM_ARTIST => Some(TagField::AlbumArtist),
        atoms::YEAR => Some(TagField::Year),
        atoms::CUSTOM_GENRE | atoms::CUSTOM_GENRE_ALT | atoms::GENRE_ID => Some(TagField::Genre),
        atoms::TRACK => Some(TagField::TrackNumber),
        atoms::DISC => Some(TagField::DiscNumber),
        atoms::COVER => Some(TagField::Picture),
        atoms::COMPILATION => Some(TagField::Compilation),
        atoms::COMMENT => Some(TagField::Comment),
        atoms::LYRICS => Some(TagField::Lyrics),
        _ => None,
    }
}

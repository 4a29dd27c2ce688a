// iTunes item list (ilst) decoding
//
// Item record: u32 length, u32 item code, then a `data` atom:
// u32 length, "data", u32 type flags, u32 locale, value.
// The value therefore starts 24 bytes into the record.

use tracing::{debug, trace};

use crate::config::ScanConfig;
use crate::error::{recover, Result, ScanError};
use crate::field_mapping::{mp4_field, MergePolicy, TagField};
use crate::genres::mp4_genre_name;
use crate::mp4::atoms::{self, fourcc_to_string};
use crate::tag::{EmbeddedArt, ScanOutput};
use crate::utils::encoding::decode_utf8;
use crate::utils::io::ByteCursor;

const ITEM_HEADER_LEN: usize = 8;
const DATA_TYPE_OFFSET: usize = 16;
const VALUE_OFFSET: usize = 24;
/// trkn/disk: reserved u16, then the number as u16; we take its low byte
const NUMBER_OFFSET: usize = 3;

const DATA_TYPE_JPEG: u32 = 13;
const DATA_TYPE_PNG: u32 = 14;
const DATA_TYPE_BMP: u32 = 27;

/// Decode the item list inside a `meta` payload.
///
/// `ilst` is found by a plain byte search rather than by walking `meta`'s
/// children, so files whose `meta` lacks the full-box header still work.
pub fn parse_meta(payload: &[u8], output: &mut ScanOutput, config: &ScanConfig) -> Result<()> {
    let mut cursor = ByteCursor::new(payload);
    let Some(name_at) = cursor.find(b"ilst", 0) else {
        trace!("meta atom without ilst");
        return Ok(());
    };

    // the ilst size sits right before its name; without it, use the whole payload
    let end = match name_at.checked_sub(4) {
        Some(size_at) => {
            cursor.seek_to(size_at)?;
            let size = cursor.read_u32_be()? as usize;
            if size < ITEM_HEADER_LEN {
                payload.len()
            } else {
                size_at.saturating_add(size).min(payload.len())
            }
        }
        None => payload.len(),
    };

    let mut pos = name_at + 4;
    while pos + ITEM_HEADER_LEN <= end {
        cursor.seek_to(pos)?;
        let item_len = cursor.read_u32_be()? as usize;
        let code = cursor.read_u32_be()?;
        if item_len < ITEM_HEADER_LEN {
            return Err(ScanError::Malformed(format!(
                "ilst item '{}' has length {}",
                fourcc_to_string(code),
                item_len
            )));
        }
        let item_end = pos.saturating_add(item_len);
        if item_end > end {
            return Err(ScanError::Truncated {
                offset: pos as u64,
                needed: item_len,
                remaining: end - pos,
            });
        }

        cursor.seek_to(pos)?;
        let item = cursor.sub_cursor(item_len)?;
        if item_len >= VALUE_OFFSET {
            recover(apply_item(code, item, output, config), "ilst item")?;
        } else {
            trace!(item = %fourcc_to_string(code), "ilst item without value");
        }
        pos = item_end;
    }
    Ok(())
}

fn apply_item(
    code: u32,
    mut item: ByteCursor<'_>,
    output: &mut ScanOutput,
    config: &ScanConfig,
) -> Result<()> {
    let Some(field) = mp4_field(code) else {
        trace!(item = %fourcc_to_string(code), "ignoring ilst item");
        return Ok(());
    };

    item.seek_to(DATA_TYPE_OFFSET)?;
    let data_type = item.read_u32_be()? & 0x00FF_FFFF;
    item.seek_to(VALUE_OFFSET)?;
    let value = item.rest();
    let separator = &config.item_separator;
    let tag = &mut output.tag;

    match code {
        atoms::GENRE_ID => {
            let raw = if value.len() >= 2 {
                item.read_u16_be()?
            } else {
                item.read_u8()? as u16
            };
            match mp4_genre_name(raw) {
                Some(genre) => {
                    tag.apply_text(TagField::Genre, genre, MergePolicy::FirstWins, separator);
                }
                None => debug!(raw, "gnre value outside the ID3v1 table"),
            }
        }
        atoms::TRACK | atoms::DISC => {
            item.advance(NUMBER_OFFSET)?;
            let number = item.read_u8()?;
            tag.apply_number(field, number as u32);
        }
        atoms::COMPILATION => {
            let flag = item.read_u8()? != 0;
            tag.apply_flag(TagField::Compilation, flag);
        }
        atoms::COVER => {
            if output.art.is_none() && !value.is_empty() {
                let mime = match data_type {
                    DATA_TYPE_JPEG => "image/jpeg",
                    DATA_TYPE_PNG => "image/png",
                    DATA_TYPE_BMP => "image/bmp",
                    _ => "",
                };
                output.art = Some(EmbeddedArt::new(mime, value.to_vec()));
            }
        }
        _ => {
            let text = decode_utf8(value);
            tag.apply_text(field, &text, MergePolicy::FirstWins, separator);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &[u8; 4], data_type: u32, value: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&((VALUE_OFFSET + value.len()) as u32).to_be_bytes());
        out.extend_from_slice(name);
        out.extend_from_slice(&((16 + value.len()) as u32).to_be_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_type.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(value);
        out
    }

    fn meta(items: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = items.concat();
        let mut out = vec![0u8; 4];
        out.extend_from_slice(&((8 + body.len()) as u32).to_be_bytes());
        out.extend_from_slice(b"ilst");
        out.extend(body);
        out
    }

    fn parse(payload: &[u8]) -> ScanOutput {
        let mut output = ScanOutput::default();
        parse_meta(payload, &mut output, &ScanConfig::default()).unwrap();
        output
    }

    #[test]
    fn test_text_items_are_zero_terminated() {
        let output = parse(&meta(&[
            item(b"\xA9nam", 1, b"Song\0garbage"),
            item(b"\xA9ART", 1, b"Band"),
            item(b"\xA9day", 1, b"2011-02-03T00:00:00Z"),
        ]));
        assert_eq!(output.tag.title.as_deref(), Some("Song"));
        assert_eq!(output.tag.artist.as_deref(), Some("Band"));
        assert_eq!(output.tag.release_year, Some(2011));
        assert!(output.tag.loaded);
    }

    #[test]
    fn test_numbers_and_flags() {
        let output = parse(&meta(&[
            item(b"trkn", 0, &[0, 0, 0, 7, 0, 12, 0, 0]),
            item(b"disk", 0, &[0, 0, 0, 2, 0, 2]),
            item(b"cpil", 21, &[1]),
        ]));
        assert_eq!(output.tag.track_number, Some(7));
        assert_eq!(output.tag.disc_number, Some(2));
        assert!(output.tag.compilation);
        assert!(!output.tag.loaded);
    }

    #[test]
    fn test_cover_mime_from_data_type() {
        let output = parse(&meta(&[
            item(b"covr", DATA_TYPE_PNG, &[1, 2, 3]),
            item(b"covr", DATA_TYPE_JPEG, &[4, 5, 6]),
        ]));
        let art = output.art.unwrap();
        assert_eq!(art.mime_type, "image/png");
        assert_eq!(art.bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_short_trkn_skips_only_that_item() {
        let output = parse(&meta(&[
            item(b"trkn", 0, &[0, 0]),
            item(b"\xA9alb", 1, b"Record"),
        ]));
        assert_eq!(output.tag.track_number, None);
        assert_eq!(output.tag.album.as_deref(), Some("Record"));
    }

    #[test]
    fn test_overlong_item_stops_list() {
        let mut payload = meta(&[item(b"\xA9nam", 1, b"Kept")]);
        let mut bad = item(b"\xA9alb", 1, b"Lost");
        bad[..4].copy_from_slice(&500u32.to_be_bytes());
        payload.extend(bad);
        // widen ilst so the bad item falls inside it
        let ilst_len = (payload.len() - 4) as u32;
        payload[4..8].copy_from_slice(&ilst_len.to_be_bytes());

        let mut output = ScanOutput::default();
        let result = parse_meta(&payload, &mut output, &ScanConfig::default());
        assert!(matches!(result, Err(ScanError::Truncated { .. })));
        assert_eq!(output.tag.title.as_deref(), Some("Kept"));
        assert_eq!(output.tag.album, None);
    }

    #[test]
    fn test_missing_ilst() {
        let output = parse(b"\0\0\0\0hdlr");
        assert_eq!(output, ScanOutput::default());
    }
}

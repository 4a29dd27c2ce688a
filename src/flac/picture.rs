// FLAC PICTURE block
//
// All integers big-endian: type, MIME length, MIME, description length,
// description (UTF-8), width, height, depth, colors, data length, data.

use std::io::{Read, Seek};

use tracing::{debug, warn};

use crate::error::{recover, Result, ScanError};
use crate::tag::{EmbeddedArt, PictureType};
use crate::utils::io::{read_exact_at, ByteCursor};

/// A decoded PICTURE block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlacPicture {
    pub picture_type: u32,
    pub mime_type: String,
    pub description: String,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub colors: u32,
    pub data: Vec<u8>,
}

impl FlacPicture {
    /// Read FLAC PICTURE block from data
    pub fn read_from_data(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);

        let picture_type = cursor.read_u32_be()?;
        let mime_len = cursor.read_u32_be()? as usize;
        let mime_type = String::from_utf8_lossy(cursor.read_bytes(mime_len)?).to_string();
        let desc_len = cursor.read_u32_be()? as usize;
        let description = String::from_utf8_lossy(cursor.read_bytes(desc_len)?).to_string();

        let width = cursor.read_u32_be()?;
        let height = cursor.read_u32_be()?;
        let depth = cursor.read_u32_be()?;
        let colors = cursor.read_u32_be()?;

        let data_len = cursor.read_u32_be()? as usize;
        if data_len > cursor.remaining() {
            warn!(
                declared = data_len,
                remaining = cursor.remaining(),
                "picture data runs past its block"
            );
        }
        let data = cursor.read_bytes(data_len)?.to_vec();

        Ok(FlacPicture {
            picture_type,
            mime_type,
            description,
            width,
            height,
            depth,
            colors,
            data,
        })
    }

    pub fn type_label(&self) -> &'static str {
        PictureType::from_u32(self.picture_type)
            .map(|t| t.label())
            .unwrap_or("Unknown")
    }

    pub fn into_art(self) -> EmbeddedArt {
        EmbeddedArt::new(&self.mime_type, self.data)
    }
}

/// A picture block seen during the walk, remembered by position only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PictureCandidate {
    pub body_offset: u64,
    pub length: u32,
    pub rank: u8,
}

/// Collects picture blocks and loads the highest-ranked one that decodes.
///
/// Ties go to the earlier block. A candidate that fails to decode or has no
/// data gives way to the next one in rank order.
#[derive(Debug, Default)]
pub struct PictureSelector {
    candidates: Vec<PictureCandidate>,
}

impl PictureSelector {
    pub fn offer(&mut self, picture_type: u32, body_offset: u64, length: u32) {
        self.candidates.push(PictureCandidate {
            body_offset,
            length,
            rank: PictureType::priority(picture_type),
        });
    }

    /// Candidates best first.
    pub fn ranked(&self) -> Vec<PictureCandidate> {
        let mut ranked = self.candidates.clone();
        // stable, so earlier blocks stay ahead within a rank
        ranked.sort_by(|a, b| b.rank.cmp(&a.rank));
        ranked
    }

    pub fn best(&self) -> Option<PictureCandidate> {
        self.ranked().into_iter().next()
    }

    /// Load and decode the best usable block.
    pub fn load<R: Read + Seek>(&self, reader: &mut R) -> Result<Option<FlacPicture>> {
        for candidate in self.ranked() {
            let picture = read_exact_at(reader, candidate.body_offset, candidate.length as usize)
                .and_then(|body| FlacPicture::read_from_data(&body));
            match recover(picture, "PICTURE block")? {
                Some(picture) if !picture.data.is_empty() => return Ok(Some(picture)),
                Some(_) => debug!(offset = candidate.body_offset, "empty picture data"),
                None => {}
            }
        }
        Ok(None)
    }
}

/// Peek the picture type from the first bytes of a block body.
pub fn read_picture_type(head: &[u8]) -> Result<u32> {
    if head.len() < 4 {
        return Err(ScanError::Truncated {
            offset: 0,
            needed: 4,
            remaining: head.len(),
        });
    }
    ByteCursor::new(head).read_u32_be()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn block(picture_type: u32, mime: &str, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&picture_type.to_be_bytes());
        out.extend_from_slice(&(mime.len() as u32).to_be_bytes());
        out.extend_from_slice(mime.as_bytes());
        out.extend_from_slice(&5u32.to_be_bytes());
        out.extend_from_slice(b"front");
        for v in [300u32, 300, 24, 0] {
            out.extend_from_slice(&v.to_be_bytes());
        }
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn test_read_picture() {
        let picture = FlacPicture::read_from_data(&block(3, "image/png", &[9, 8, 7])).unwrap();
        assert_eq!(picture.picture_type, 3);
        assert_eq!(picture.mime_type, "image/png");
        assert_eq!(picture.description, "front");
        assert_eq!(picture.width, 300);
        assert_eq!(picture.depth, 24);
        assert_eq!(picture.data, vec![9, 8, 7]);
        assert_eq!(picture.type_label(), "Cover (front)");
    }

    #[test]
    fn test_overlong_data_is_an_error() {
        let mut raw = block(3, "image/png", &[1, 2]);
        let at = raw.len() - 6;
        raw[at..at + 4].copy_from_slice(&100u32.to_be_bytes());
        assert!(matches!(
            FlacPicture::read_from_data(&raw),
            Err(ScanError::Truncated { .. })
        ));
    }

    #[test]
    fn test_selector_prefers_front_cover() {
        let mut selector = PictureSelector::default();
        selector.offer(0, 10, 1);
        selector.offer(3, 20, 1);
        selector.offer(0, 30, 1);
        selector.offer(3, 40, 1);
        assert_eq!(selector.best().map(|c| c.body_offset), Some(20));
    }

    #[test]
    fn test_selector_falls_back_to_any() {
        let mut selector = PictureSelector::default();
        selector.offer(8, 10, 1);
        selector.offer(4, 20, 1);
        assert_eq!(selector.best().map(|c| c.body_offset), Some(10));
        selector.offer(0, 30, 1);
        assert_eq!(selector.best().map(|c| c.body_offset), Some(30));
    }

    #[test]
    fn test_load_reads_chosen_block() {
        let mut source = vec![0u8; 7];
        let raw = block(3, "", &[0xFF, 0xD8, 0xFF, 0xE0]);
        source.extend_from_slice(&raw);

        let mut selector = PictureSelector::default();
        selector.offer(3, 7, raw.len() as u32);
        let picture = selector.load(&mut Cursor::new(source)).unwrap().unwrap();
        assert_eq!(picture.into_art().mime_type, "image/jpeg");
    }

    #[test]
    fn test_load_falls_back_past_broken_block() {
        let other = block(0, "image/png", &[0xAA]);
        let mut front = block(3, "image/png", &[0xBB]);
        let at = front.len() - 5;
        front[at..at + 4].copy_from_slice(&1000u32.to_be_bytes());
        let empty = block(3, "image/png", &[]);

        let mut source = other.clone();
        source.extend_from_slice(&front);
        source.extend_from_slice(&empty);

        let mut selector = PictureSelector::default();
        selector.offer(0, 0, other.len() as u32);
        selector.offer(3, other.len() as u64, front.len() as u32);
        selector.offer(3, (other.len() + front.len()) as u64, empty.len() as u32);
        assert_eq!(
            selector.ranked().iter().map(|c| c.rank).collect::<Vec<_>>(),
            vec![2, 2, 1]
        );

        let picture = selector.load(&mut Cursor::new(source)).unwrap().unwrap();
        assert_eq!(picture.picture_type, 0);
        assert_eq!(picture.data, vec![0xAA]);
    }

    #[test]
    fn test_load_without_usable_candidates() {
        let mut selector = PictureSelector::default();
        assert!(selector.load(&mut Cursor::new(Vec::new())).unwrap().is_none());
        selector.offer(3, 100, 40);
        assert!(selector.load(&mut Cursor::new(vec![0u8; 20])).unwrap().is_none());
    }
}

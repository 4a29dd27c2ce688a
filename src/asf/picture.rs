// WM/Picture attribute payload

use crate::error::Result;
use crate::utils::encoding::Utf16LeDecoder;
use crate::utils::io::ByteCursor;

/// Decoded WM/Picture value
#[derive(Debug)]
pub struct WmPicture {
    pub picture_type: u8,
    pub mime_type: String,
    pub description: String,
    pub data: Vec<u8>,
}

impl WmPicture {
    /// Layout: type byte, u32 data length, NUL-terminated UTF-16LE MIME type,
    /// NUL-terminated UTF-16LE description, image bytes.
    pub fn read(value: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(value);
        let picture_type = cursor.read_u8()?;
        let data_len = cursor.read_u32_le()? as usize;
        let mime_type = Utf16LeDecoder::read_terminated(&mut cursor)?;
        let description = Utf16LeDecoder::read_terminated(&mut cursor)?;
        let data = cursor.read_bytes(data_len)?.to_vec();

        Ok(WmPicture {
            picture_type,
            mime_type,
            description,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16z(text: &str) -> Vec<u8> {
        let mut out: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        out.extend_from_slice(&[0, 0]);
        out
    }

    fn picture(kind: u8, declared: u32, image: &[u8]) -> Vec<u8> {
        let mut out = vec![kind];
        out.extend_from_slice(&declared.to_le_bytes());
        out.extend(utf16z("image/jpeg"));
        out.extend(utf16z("cover"));
        out.extend_from_slice(image);
        out
    }

    #[test]
    fn test_read_picture() {
        let raw = picture(3, 4, &[0xFF, 0xD8, 0xFF, 0xE0]);
        let pic = WmPicture::read(&raw).unwrap();
        assert_eq!(pic.picture_type, 3);
        assert_eq!(pic.mime_type, "image/jpeg");
        assert_eq!(pic.description, "cover");
        assert_eq!(pic.data, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn test_declared_length_past_end() {
        let raw = picture(3, 1_000_000, &[0xFF, 0xD8]);
        assert!(WmPicture::read(&raw).is_err());
    }
}

// ASF object GUIDs, held as four little-endian 32-bit words

use std::fmt;

use crate::error::Result;
use crate::utils::io::ByteCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guid(pub [u32; 4]);

/// 75B22630-668E-11CF-A6D9-00AA0062CE6C
pub const HEADER: Guid = Guid([0x75B2_2630, 0x11CF_668E, 0xAA00_D9A6, 0x6CCE_6200]);
/// 8CABDCA1-A947-11CF-8EE4-00C00C205365
pub const FILE_PROPERTIES: Guid = Guid([0x8CAB_DCA1, 0x11CF_A947, 0xC000_E48E, 0x6553_200C]);
/// 75B22633-668E-11CF-A6D9-00AA0062CE6C
pub const CONTENT_DESCRIPTION: Guid = Guid([0x75B2_2633, 0x11CF_668E, 0xAA00_D9A6, 0x6CCE_6200]);
/// D2D0A440-E307-11D2-97F0-00A0C95EA850
pub const EXTENDED_CONTENT_DESCRIPTION: Guid =
    Guid([0xD2D0_A440, 0x11D2_E307, 0xA000_F097, 0x50A8_5EC9]);
/// C5F8CBEA-5BAF-4877-8467-AA8C44FA4CCA
pub const METADATA: Guid = Guid([0xC5F8_CBEA, 0x4877_5BAF, 0x8CAA_6784, 0xCA4C_FA44]);
/// 44231C94-9498-49D1-A141-1D134E457054
pub const METADATA_LIBRARY: Guid = Guid([0x4423_1C94, 0x49D1_9498, 0x131D_41A1, 0x5470_454E]);

pub const GUID_LEN: usize = 16;

impl Guid {
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(Guid([
            cursor.read_u32_le()?,
            cursor.read_u32_le()?,
            cursor.read_u32_le()?,
            cursor.read_u32_le()?,
        ]))
    }

    /// Byte-by-byte search for this GUID, not aligned to object boundaries.
    pub fn find_in(&self, data: &[u8], from: usize) -> Option<usize> {
        let last = data.len().checked_sub(GUID_LEN)?;
        let mut cursor = ByteCursor::new(data);
        for offset in from..=last {
            cursor.seek_to(offset).ok()?;
            if cursor.read_u32_le().ok()? != self.0[0] {
                continue;
            }
            cursor.seek_to(offset).ok()?;
            if Guid::read(&mut cursor).ok()? == *self {
                return Some(offset);
            }
        }
        None
    }

    pub fn to_bytes(&self) -> [u8; GUID_LEN] {
        let mut out = [0u8; GUID_LEN];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.to_bytes();
        write!(
            f,
            "{:02X}{:02X}{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
            b[3], b[2], b[1], b[0], b[5], b[4], b[7], b[6], b[8], b[9], b[10], b[11], b[12],
            b[13], b[14], b[15]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_canonical_form() {
        assert_eq!(HEADER.to_string(), "75B22630-668E-11CF-A6D9-00AA0062CE6C");
        assert_eq!(
            EXTENDED_CONTENT_DESCRIPTION.to_string(),
            "D2D0A440-E307-11D2-97F0-00A0C95EA850"
        );
        assert_eq!(METADATA_LIBRARY.to_string(), "44231C94-9498-49D1-A141-1D134E457054");
        assert_eq!(METADATA.to_string(), "C5F8CBEA-5BAF-4877-8467-AA8C44FA4CCA");
        assert_eq!(FILE_PROPERTIES.to_string(), "8CABDCA1-A947-11CF-8EE4-00C00C205365");
    }

    #[test]
    fn test_unaligned_search() {
        let mut data = vec![0xEEu8; 7];
        data.extend_from_slice(&CONTENT_DESCRIPTION.to_bytes());
        data.extend_from_slice(&[0u8; 3]);
        assert_eq!(CONTENT_DESCRIPTION.find_in(&data, 0), Some(7));
        assert_eq!(CONTENT_DESCRIPTION.find_in(&data, 8), None);
        assert_eq!(HEADER.find_in(&data, 0), None);
    }

    #[test]
    fn test_search_near_end_of_buffer() {
        let bytes = HEADER.to_bytes();
        assert_eq!(HEADER.find_in(&bytes, 0), Some(0));
        assert_eq!(HEADER.find_in(&bytes[..15], 0), None);
        assert_eq!(HEADER.find_in(&[], 0), None);
    }
}

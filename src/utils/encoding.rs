// Encoding utilities

use encoding_rs::{UTF_16LE, UTF_8};

use crate::error::Result;
use crate::utils::io::ByteCursor;

/// UTF-16LE to UTF-8 conversion for ASF strings
pub struct Utf16LeDecoder;

impl Utf16LeDecoder {
    /// Decode a UTF-16LE byte run, stopping at the first NUL code unit.
    ///
    /// A dangling odd byte is dropped and unpaired surrogates become U+FFFD.
    pub fn decode(bytes: &[u8]) -> String {
        let mut end = bytes.len() & !1;
        if let Some(nul) = bytes[..end]
            .chunks_exact(2)
            .position(|unit| unit[0] == 0 && unit[1] == 0)
        {
            end = nul * 2;
        }
        UTF_16LE
            .decode_without_bom_handling(&bytes[..end])
            .0
            .into_owned()
    }

    /// Read exactly `byte_len` bytes and decode them.
    pub fn read_sized(cursor: &mut ByteCursor<'_>, byte_len: usize) -> Result<String> {
        Ok(Self::decode(cursor.read_bytes(byte_len)?))
    }

    /// Read a NUL-terminated string, consuming the terminator.
    ///
    /// Without a terminator the cursor is left where it started.
    pub fn read_terminated(cursor: &mut ByteCursor<'_>) -> Result<String> {
        let start = cursor.position();
        loop {
            match cursor.read_u16_le() {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    cursor.seek_to(start)?;
                    return Err(e);
                }
            }
        }
        let len = cursor.position() - start;
        cursor.seek_to(start)?;
        Self::read_sized(cursor, len)
    }
}

/// Decode UTF-8 text, cut at the first NUL.
pub fn decode_utf8(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    UTF_8.decode_without_bom_handling(&bytes[..end]).0.into_owned()
}

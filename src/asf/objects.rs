// ASF header object decoders
//
// Object layout: GUID (16) + u64 size (8) + body. Sizes count the 24-byte
// header. Bodies are clamped to the bytes we actually read, so an object that
// straddles the end of the scan window fails record by record instead of
// reading past the buffer.

use std::time::Duration;

use tracing::trace;

use crate::asf::guid::{Guid, GUID_LEN};
use crate::error::{Result, ScanError};
use crate::utils::encoding::Utf16LeDecoder;
use crate::utils::io::ByteCursor;

pub const OBJECT_HEADER_LEN: usize = GUID_LEN + 8;

/// Offset of the play-duration field inside the File Properties body:
/// file id (16) + file size (8) + creation date (8) + packet count (8).
const PLAY_DURATION_OFFSET: usize = 40;

/// 100-ns ticks per second
const TICKS_PER_SECOND: u64 = 10_000 * 1000;

/// Cursor over the body of the object starting at `offset`.
pub fn object_body<'a>(data: &'a [u8], offset: usize) -> Result<ByteCursor<'a>> {
    let mut cursor = ByteCursor::new(data);
    cursor.seek_to(offset)?;
    let guid = Guid::read(&mut cursor)?;
    let size = cursor.read_u64_le()?;
    if size < OBJECT_HEADER_LEN as u64 {
        return Err(ScanError::Malformed(format!(
            "object {} declares size {}",
            guid, size
        )));
    }
    let declared = usize::try_from(size - OBJECT_HEADER_LEN as u64).unwrap_or(usize::MAX);
    let len = declared.min(cursor.remaining());
    cursor.sub_cursor(len)
}

/// Play duration from the File Properties object, in whole seconds.
pub fn read_play_duration(body: &mut ByteCursor<'_>) -> Result<Option<Duration>> {
    body.seek_to(PLAY_DURATION_OFFSET)?;
    let ticks = body.read_u64_le()?;
    if ticks == 0 {
        return Ok(None);
    }
    Ok(Some(Duration::from_secs(ticks / TICKS_PER_SECOND)))
}

/// Fixed strings of the Content Description object
#[derive(Debug, Default)]
pub struct ContentDescription {
    pub title: String,
    pub author: String,
    pub copyright: String,
    pub description: String,
}

impl ContentDescription {
    /// Five u16 byte lengths (title, author, copyright, description, rating),
    /// then the strings back-to-back in that order.
    pub fn read(body: &mut ByteCursor<'_>) -> Result<Self> {
        let title_len = body.read_u16_le()? as usize;
        let author_len = body.read_u16_le()? as usize;
        let copyright_len = body.read_u16_le()? as usize;
        let description_len = body.read_u16_le()? as usize;
        let _rating_len = body.read_u16_le()?;

        let mut content = ContentDescription {
            title: Utf16LeDecoder::read_sized(body, title_len)?,
            author: Utf16LeDecoder::read_sized(body, author_len)?,
            ..Default::default()
        };
        // trailing strings are optional; a short body keeps title and author
        if let Ok(copyright) = Utf16LeDecoder::read_sized(body, copyright_len) {
            content.copyright = copyright;
            if let Ok(description) = Utf16LeDecoder::read_sized(body, description_len) {
                content.description = description;
            }
        }
        Ok(content)
    }
}

/// Typed attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsfValue<'a> {
    Text(String),
    Binary(&'a [u8]),
    Bool(bool),
    DWord(u32),
    QWord(u64),
    Word(u16),
    Guid,
}

impl<'a> AsfValue<'a> {
    pub fn decode(type_code: u16, data: &'a [u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        let value = match type_code {
            0 => AsfValue::Text(Utf16LeDecoder::decode(data)),
            1 => AsfValue::Binary(data),
            // 4 bytes in Extended Content Description, 2 in Metadata objects
            2 => match data.len() {
                4 => AsfValue::Bool(cursor.read_u32_le()? != 0),
                2 => AsfValue::Bool(cursor.read_u16_le()? != 0),
                n => {
                    return Err(ScanError::Malformed(format!("BOOL value of {} bytes", n)));
                }
            },
            3 => AsfValue::DWord(cursor.read_u32_le()?),
            4 => AsfValue::QWord(cursor.read_u64_le()?),
            5 => AsfValue::Word(cursor.read_u16_le()?),
            6 => AsfValue::Guid,
            other => {
                return Err(ScanError::Malformed(format!("unknown value type {}", other)));
            }
        };
        Ok(value)
    }
}

/// One name/value record
#[derive(Debug)]
pub struct AsfAttribute<'a> {
    pub name: String,
    pub value: AsfValue<'a>,
}

/// Record layouts of the two attribute-carrying objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLayout {
    /// Extended Content Description: u16 name length, name, u16 type,
    /// u16 value length, value.
    ExtendedContent,
    /// Metadata / Metadata Library: u16 language index, u16 stream number,
    /// u16 name length, u16 type, u32 value length, name, value.
    MetadataLibrary,
}

impl RecordLayout {
    fn read_record<'a>(&self, body: &mut ByteCursor<'a>) -> Result<(String, u16, &'a [u8])> {
        match self {
            RecordLayout::ExtendedContent => {
                let name_len = body.read_u16_le()? as usize;
                let name = Utf16LeDecoder::read_sized(body, name_len)?;
                let type_code = body.read_u16_le()?;
                let value_len = body.read_u16_le()? as usize;
                let data = body.read_bytes(value_len)?;
                Ok((name, type_code, data))
            }
            RecordLayout::MetadataLibrary => {
                let _language = body.read_u16_le()?;
                let _stream = body.read_u16_le()?;
                let name_len = body.read_u16_le()? as usize;
                let type_code = body.read_u16_le()?;
                let value_len = body.read_u32_le()? as usize;
                let name = Utf16LeDecoder::read_sized(body, name_len)?;
                let data = body.read_bytes(value_len)?;
                Ok((name, type_code, data))
            }
        }
    }

    /// Feed each record to `apply` as it is decoded.
    ///
    /// A bad length stops the walk; records already handed out stay applied.
    /// A record with an unknown value type is skipped since its length is
    /// still trustworthy.
    pub fn for_each_attribute<'a>(
        &self,
        body: &mut ByteCursor<'a>,
        mut apply: impl FnMut(AsfAttribute<'a>),
    ) -> Result<()> {
        let count = body.read_u16_le()?;
        for index in 0..count {
            let (name, type_code, data) = self.read_record(body)?;
            match AsfValue::decode(type_code, data) {
                Ok(value) => apply(AsfAttribute { name, value }),
                Err(e) if e.is_recoverable() => {
                    trace!(record = index, name = %name, error = %e, "skipping attribute");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

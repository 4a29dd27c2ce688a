// I/O utilities for reading audio files
//
// `ByteCursor` is the only way scanners touch raw buffers. Every read is
// checked against the remaining length and yields `Truncated`/`OutOfRange`
// instead of panicking.

use std::io::{Read, Seek, SeekFrom};

use crate::error::{Result, ScanError};

/// Bounds-checked read cursor over an in-memory buffer
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Move to an absolute offset. The end of the buffer is a valid position.
    pub fn seek_to(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(ScanError::OutOfRange {
                offset,
                len: self.data.len(),
            });
        }
        self.pos = offset;
        Ok(())
    }

    /// Move forward by `n` bytes relative to the current position.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        let target = self.pos.checked_add(n).ok_or(ScanError::OutOfRange {
            offset: usize::MAX,
            len: self.data.len(),
        })?;
        self.seek_to(target)
    }

    /// Look at the next `n` bytes without consuming them.
    pub fn peek_bytes(&self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(ScanError::Truncated {
                offset: self.pos as u64,
                needed: n,
                remaining: self.remaining(),
            });
        }
        Ok(&self.data[self.pos..self.pos + n])
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(n)?;
        self.pos += n;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Big-endian 24-bit integer (FLAC block lengths)
    pub fn read_u24_be(&mut self) -> Result<u32> {
        let b: [u8; 3] = self.read_array()?;
        Ok(((b[0] as u32) << 16) | ((b[1] as u32) << 8) | (b[2] as u32))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_be(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Split off a child cursor over the next `len` bytes and skip past them.
    pub fn sub_cursor(&mut self, len: usize) -> Result<ByteCursor<'a>> {
        Ok(ByteCursor::new(self.read_bytes(len)?))
    }

    /// Everything from the current position to the end.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Byte-string search starting at `from`. Returns the absolute offset.
    pub fn find(&self, needle: &[u8], from: usize) -> Option<usize> {
        if needle.is_empty() || from >= self.data.len() {
            return None;
        }
        self.data[from..]
            .windows(needle.len())
            .position(|w| w == needle)
            .map(|i| i + from)
    }
}

/// Read at most `limit` bytes from the start of the source.
pub fn read_prefix<R: Read + Seek>(reader: &mut R, limit: usize) -> Result<Vec<u8>> {
    reposition(reader, 0)?;
    let mut buffer = Vec::new();
    reader.take(limit as u64).read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Move the source to `offset` with a relative seek, which keeps a
/// `BufReader`'s buffer when the target is already inside it.
pub fn reposition<R: Seek>(reader: &mut R, offset: u64) -> Result<()> {
    let current = reader.stream_position()?;
    if current == offset {
        return Ok(());
    }
    match i64::try_from(offset as i128 - current as i128) {
        Ok(delta) => reader.seek_relative(delta)?,
        Err(_) => {
            reader.seek(SeekFrom::Start(offset))?;
        }
    }
    Ok(())
}

/// Read exactly `len` bytes at `offset`.
///
/// The buffer grows only as bytes actually arrive, so a forged length can't
/// force a huge allocation. A short read becomes `Truncated`.
pub fn read_exact_at<R: Read + Seek>(reader: &mut R, offset: u64, len: usize) -> Result<Vec<u8>> {
    reposition(reader, offset)?;
    let mut buffer = Vec::new();
    reader.take(len as u64).read_to_end(&mut buffer)?;
    if buffer.len() < len {
        return Err(ScanError::Truncated {
            offset,
            needed: len,
            remaining: buffer.len(),
        });
    }
    Ok(buffer)
}

/// Total length of the source.
pub fn source_len<R: Seek>(reader: &mut R) -> Result<u64> {
    let len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_integer_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u16_le().unwrap(), 0x0201);
        assert_eq!(cursor.read_u16_be().unwrap(), 0x0304);
        assert_eq!(cursor.read_u32_le().unwrap(), 0x08070605);
        assert_eq!(cursor.remaining(), 0);

        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u32_be().unwrap(), 0x01020304);
        assert_eq!(cursor.read_u24_be().unwrap(), 0x050607);
        assert_eq!(cursor.read_u8().unwrap(), 0x08);
    }

    #[test]
    fn test_truncated_read_leaves_position() {
        let data = [0xAA, 0xBB, 0xCC];
        let mut cursor = ByteCursor::new(&data);
        cursor.advance(1).unwrap();
        match cursor.read_u32_le() {
            Err(ScanError::Truncated { offset, needed, remaining }) => {
                assert_eq!(offset, 1);
                assert_eq!(needed, 4);
                assert_eq!(remaining, 2);
            }
            other => panic!("expected Truncated, got {:?}", other),
        }
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_seek_bounds() {
        let data = [0u8; 4];
        let mut cursor = ByteCursor::new(&data);
        assert!(cursor.seek_to(4).is_ok());
        assert_eq!(cursor.remaining(), 0);
        assert!(matches!(
            cursor.seek_to(5),
            Err(ScanError::OutOfRange { offset: 5, len: 4 })
        ));
        cursor.seek_to(2).unwrap();
        assert!(cursor.advance(3).is_err());
        assert!(cursor.advance(usize::MAX).is_err());
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let data = b"ilst";
        let cursor = ByteCursor::new(data);
        assert_eq!(cursor.peek_bytes(4).unwrap(), b"ilst");
        assert_eq!(cursor.position(), 0);
        assert!(cursor.peek_bytes(5).is_err());
    }

    #[test]
    fn test_sub_cursor_is_bounded() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let mut cursor = ByteCursor::new(&data);
        let mut child = cursor.sub_cursor(2).unwrap();
        assert_eq!(cursor.position(), 2);
        assert_eq!(child.read_u16_be().unwrap(), 0x0102);
        assert!(child.read_u8().is_err());
    }

    #[test]
    fn test_find() {
        let data = b"xxmetaxxilstxx";
        let cursor = ByteCursor::new(data);
        assert_eq!(cursor.find(b"ilst", 0), Some(8));
        assert_eq!(cursor.find(b"ilst", 9), None);
        assert_eq!(cursor.find(b"ilst", 100), None);
    }

    #[test]
    fn test_read_exact_at_short_source() {
        let mut source = Cursor::new(vec![0u8; 10]);
        assert_eq!(read_exact_at(&mut source, 4, 6).unwrap().len(), 6);
        assert!(matches!(
            read_exact_at(&mut source, 8, 6),
            Err(ScanError::Truncated { remaining: 2, .. })
        ));
    }

    #[test]
    fn test_small_reads_stay_in_buffer() {
        use std::io::BufReader;

        let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let mut source = BufReader::with_capacity(1024, Cursor::new(data));
        assert_eq!(read_exact_at(&mut source, 0, 4).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(source.buffer().len(), 1020);

        assert_eq!(read_exact_at(&mut source, 10, 2).unwrap(), vec![10, 11]);
        assert_eq!(source.buffer().len(), 1012);

        // backwards inside the buffer
        assert_eq!(read_exact_at(&mut source, 4, 1).unwrap(), vec![4]);
        assert_eq!(source.buffer().len(), 1019);

        assert_eq!(read_exact_at(&mut source, 3000, 1).unwrap(), vec![(3000 % 256) as u8]);
        assert!(read_exact_at(&mut source, 4095, 2).is_err());
    }

    #[test]
    fn test_read_prefix_caps_length() {
        let mut source = Cursor::new(vec![7u8; 100]);
        assert_eq!(read_prefix(&mut source, 16).unwrap().len(), 16);
        assert_eq!(read_prefix(&mut source, 1000).unwrap().len(), 100);
        assert_eq!(source_len(&mut source).unwrap(), 100);
    }
}

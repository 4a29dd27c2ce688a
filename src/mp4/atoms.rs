// ISO-BMFF atom codes and header parsing

use std::io::{Read, Seek};

use crate::error::{Result, ScanError};
use crate::utils::io::{read_exact_at, ByteCursor};

/// Pack 4 bytes into a big-endian atom code.
pub const fn fourcc(name: &[u8; 4]) -> u32 {
    ((name[0] as u32) << 24) | ((name[1] as u32) << 16) | ((name[2] as u32) << 8) | (name[3] as u32)
}

/// Readable form of an atom code for logging.
pub fn fourcc_to_string(code: u32) -> String {
    code.to_be_bytes()
        .iter()
        .map(|&b| match b {
            0xA9 => '©',
            b if b.is_ascii_graphic() || b == b' ' => b as char,
            _ => '?',
        })
        .collect()
}

pub const FTYP: u32 = fourcc(b"ftyp");
pub const MOOV: u32 = fourcc(b"moov");
pub const TRAK: u32 = fourcc(b"trak");
pub const UDTA: u32 = fourcc(b"udta");
pub const TREF: u32 = fourcc(b"tref");
pub const IMAP: u32 = fourcc(b"imap");
pub const MDIA: u32 = fourcc(b"mdia");
pub const MINF: u32 = fourcc(b"minf");
pub const STBL: u32 = fourcc(b"stbl");
pub const EDTS: u32 = fourcc(b"edts");
pub const MDRA: u32 = fourcc(b"mdra");
pub const RMRA: u32 = fourcc(b"rmra");
pub const IMAG: u32 = fourcc(b"imag");
pub const VNRP: u32 = fourcc(b"vnrp");
pub const DINF: u32 = fourcc(b"dinf");
pub const META: u32 = fourcc(b"meta");
pub const ILST: u32 = fourcc(b"ilst");
pub const MDHD: u32 = fourcc(b"mdhd");
pub const MDAT: u32 = fourcc(b"mdat");
pub const FREE: u32 = fourcc(b"free");
pub const SKIP: u32 = fourcc(b"skip");
pub const WIDE: u32 = fourcc(b"wide");
pub const PNOT: u32 = fourcc(b"pnot");
pub const UUID: u32 = fourcc(b"uuid");
pub const PDIN: u32 = fourcc(b"pdin");
pub const MOOF: u32 = fourcc(b"moof");

// iTunes item atoms
pub const TITLE: u32 = fourcc(b"\xA9nam");
pub const ARTIST: u32 = fourcc(b"\xA9ART");
pub const ALBUM: u32 = fourcc(b"\xA9alb");
pub const ALBUM_ARTIST: u32 = fourcc(b"aART");
pub const YEAR: u32 = fourcc(b"\xA9day");
pub const CUSTOM_GENRE: u32 = fourcc(b"\xA9gnr");
pub const CUSTOM_GENRE_ALT: u32 = fourcc(b"\xA9gen");
pub const GENRE_ID: u32 = fourcc(b"gnre");
pub const TRACK: u32 = fourcc(b"trkn");
pub const DISC: u32 = fourcc(b"disk");
pub const COVER: u32 = fourcc(b"covr");
pub const COMPILATION: u32 = fourcc(b"cpil");
pub const COMMENT: u32 = fourcc(b"\xA9cmt");
pub const LYRICS: u32 = fourcc(b"\xA9lyr");

/// Atoms whose payload is a plain list of child atoms
pub const CONTAINERS: [u32; 14] = [
    MOOV, TRAK, UDTA, TREF, IMAP, MDIA, MINF, STBL, EDTS, MDRA, RMRA, IMAG, VNRP, DINF,
];

/// Atoms a well-formed file can start with
pub const TOP_LEVEL: [u32; 10] = [FTYP, MOOV, MDAT, FREE, SKIP, WIDE, PNOT, UUID, PDIN, MOOF];

pub fn is_container(code: u32) -> bool {
    CONTAINERS.contains(&code)
}

/// A parsed atom header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomHeader {
    pub code: u32,
    /// Offset of the atom start in the source
    pub offset: u64,
    /// Total atom size including the header; 0 means "to the end of the parent"
    pub size: u64,
    /// 8, or 16 when a 64-bit size follows the name
    pub header_len: u64,
}

impl AtomHeader {
    /// Read the header at `offset`.
    pub fn read<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<Self> {
        let raw = read_exact_at(reader, offset, 8)?;
        let mut cursor = ByteCursor::new(&raw);
        let size32 = cursor.read_u32_be()?;
        let code = cursor.read_u32_be()?;

        let (size, header_len) = if size32 == 1 {
            let ext = read_exact_at(reader, offset + 8, 8)?;
            (ByteCursor::new(&ext).read_u64_be()?, 16)
        } else {
            (size32 as u64, 8)
        };

        if size != 0 && size < header_len {
            return Err(ScanError::Malformed(format!(
                "atom '{}' at {} has size {}",
                fourcc_to_string(code),
                offset,
                size
            )));
        }

        Ok(AtomHeader {
            code,
            offset,
            size,
            header_len,
        })
    }

    pub fn payload_offset(&self) -> u64 {
        self.offset + self.header_len
    }
}

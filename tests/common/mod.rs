// Synthetic file builders shared by the integration tests
#![allow(dead_code)]

use tagscan::asf::guid::{self, Guid};

pub fn utf16z(text: &str) -> Vec<u8> {
    let mut out: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
    out.extend_from_slice(&[0, 0]);
    out
}

// ---- ASF ----

pub const ASF_STRING: u16 = 0;
pub const ASF_BINARY: u16 = 1;
pub const ASF_BOOL: u16 = 2;
pub const ASF_DWORD: u16 = 3;

pub fn asf_object(guid: Guid, body: &[u8]) -> Vec<u8> {
    let mut out = guid.to_bytes().to_vec();
    out.extend_from_slice(&((24 + body.len()) as u64).to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// Header Object wrapping `children`
pub fn asf_file(children: &[Vec<u8>]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&(children.len() as u32).to_le_bytes());
    body.extend_from_slice(&[1, 2]);
    for child in children {
        body.extend_from_slice(child);
    }
    asf_object(guid::HEADER, &body)
}

pub fn file_properties(ticks: u64) -> Vec<u8> {
    let mut body = vec![0u8; 40];
    body.extend_from_slice(&ticks.to_le_bytes());
    body.extend_from_slice(&[0u8; 32]);
    asf_object(guid::FILE_PROPERTIES, &body)
}

pub fn content_description(title: &str, author: &str) -> Vec<u8> {
    let title = utf16z(title);
    let author = utf16z(author);
    let mut body = Vec::new();
    for len in [title.len(), author.len(), 0, 0, 0] {
        body.extend_from_slice(&(len as u16).to_le_bytes());
    }
    body.extend(title);
    body.extend(author);
    asf_object(guid::CONTENT_DESCRIPTION, &body)
}

pub fn asf_text(value: &str) -> (u16, Vec<u8>) {
    (ASF_STRING, utf16z(value))
}

pub fn asf_dword(value: u32) -> (u16, Vec<u8>) {
    (ASF_DWORD, value.to_le_bytes().to_vec())
}

/// v1 records: name length, name, type, value length, value
pub fn extended_content(records: &[(&str, (u16, Vec<u8>))]) -> Vec<u8> {
    let mut body = (records.len() as u16).to_le_bytes().to_vec();
    for (name, (kind, value)) in records {
        let name = utf16z(name);
        body.extend_from_slice(&(name.len() as u16).to_le_bytes());
        body.extend(name);
        body.extend_from_slice(&kind.to_le_bytes());
        body.extend_from_slice(&(value.len() as u16).to_le_bytes());
        body.extend_from_slice(value);
    }
    asf_object(guid::EXTENDED_CONTENT_DESCRIPTION, &body)
}

/// v2 records: language, stream, name length, type, value length, name, value
pub fn metadata_library(records: &[(&str, (u16, Vec<u8>))]) -> Vec<u8> {
    let mut body = (records.len() as u16).to_le_bytes().to_vec();
    for (name, (kind, value)) in records {
        let name = utf16z(name);
        body.extend_from_slice(&0u16.to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes());
        body.extend_from_slice(&(name.len() as u16).to_le_bytes());
        body.extend_from_slice(&kind.to_le_bytes());
        body.extend_from_slice(&(value.len() as u32).to_le_bytes());
        body.extend(name);
        body.extend_from_slice(value);
    }
    asf_object(guid::METADATA_LIBRARY, &body)
}

pub fn wm_picture(picture_type: u8, mime: &str, image: &[u8]) -> (u16, Vec<u8>) {
    let mut out = vec![picture_type];
    out.extend_from_slice(&(image.len() as u32).to_le_bytes());
    out.extend(utf16z(mime));
    out.extend(utf16z(""));
    out.extend_from_slice(image);
    (ASF_BINARY, out)
}

// ---- MP4 ----

pub fn atom(name: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((8 + payload.len()) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(name);
    out.extend_from_slice(payload);
    out
}

pub fn ftyp() -> Vec<u8> {
    atom(b"ftyp", b"M4A \0\0\0\0M4A mp42isom")
}

pub fn mdhd_v0(timescale: u32, duration: u32) -> Vec<u8> {
    let mut payload = vec![0u8; 12];
    payload.extend_from_slice(&timescale.to_be_bytes());
    payload.extend_from_slice(&duration.to_be_bytes());
    payload.extend_from_slice(&[0u8; 4]);
    atom(b"mdhd", &payload)
}

pub fn mdhd_v1(timescale: u32, duration: u64) -> Vec<u8> {
    let mut payload = vec![1u8, 0, 0, 0];
    payload.extend_from_slice(&[0u8; 16]);
    payload.extend_from_slice(&timescale.to_be_bytes());
    payload.extend_from_slice(&duration.to_be_bytes());
    payload.extend_from_slice(&[0u8; 4]);
    atom(b"mdhd", &payload)
}

/// Atom with a 64-bit size field
pub fn large_atom(name: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = 1u32.to_be_bytes().to_vec();
    out.extend_from_slice(name);
    out.extend_from_slice(&((16 + payload.len()) as u64).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn ilst_item(name: &[u8; 4], data_type: u32, value: &[u8]) -> Vec<u8> {
    let mut data = data_type.to_be_bytes().to_vec();
    data.extend_from_slice(&0u32.to_be_bytes());
    data.extend_from_slice(value);
    atom(name, &atom(b"data", &data))
}

pub fn text_item(name: &[u8; 4], value: &str) -> Vec<u8> {
    ilst_item(name, 1, value.as_bytes())
}

/// meta full box holding an hdlr and the item list
pub fn meta(items: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = vec![0u8; 4];
    payload.extend(atom(b"hdlr", &[0u8; 25]));
    payload.extend(atom(b"ilst", &items.concat()));
    atom(b"meta", &payload)
}

/// ftyp + moov(trak(mdia(mdhd)), udta(meta(ilst)))
pub fn m4a_file(mdhd: Vec<u8>, items: &[Vec<u8>]) -> Vec<u8> {
    let trak = atom(b"trak", &atom(b"mdia", &mdhd));
    let udta = atom(b"udta", &meta(items));
    let mut file = ftyp();
    file.extend(atom(b"moov", &[trak, udta].concat()));
    file
}

// ---- FLAC ----

pub const FLAC_STREAMINFO: u8 = 0;
pub const FLAC_PADDING: u8 = 1;
pub const FLAC_VORBIS_COMMENT: u8 = 4;
pub const FLAC_PICTURE: u8 = 6;

pub fn streaminfo_body(sample_rate: u32, total_samples: u64) -> Vec<u8> {
    let mut body = vec![0u8; 10];
    let packed = ((sample_rate as u64) << 44)
        | (1u64 << 41)
        | (15u64 << 36)
        | (total_samples & 0x000F_FFFF_FFFF);
    body.extend_from_slice(&packed.to_be_bytes());
    body.extend_from_slice(&[0u8; 16]);
    body
}

pub fn vorbis_body(comments: &[&str]) -> Vec<u8> {
    let vendor = b"tagscan tests";
    let mut out = (vendor.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(vendor);
    out.extend_from_slice(&(comments.len() as u32).to_le_bytes());
    for comment in comments {
        out.extend_from_slice(&(comment.len() as u32).to_le_bytes());
        out.extend_from_slice(comment.as_bytes());
    }
    out
}

pub fn picture_body(picture_type: u32, mime: &str, image: &[u8]) -> Vec<u8> {
    let mut out = picture_type.to_be_bytes().to_vec();
    out.extend_from_slice(&(mime.len() as u32).to_be_bytes());
    out.extend_from_slice(mime.as_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    for v in [1u32, 1, 24, 0] {
        out.extend_from_slice(&v.to_be_bytes());
    }
    out.extend_from_slice(&(image.len() as u32).to_be_bytes());
    out.extend_from_slice(image);
    out
}

/// `fLaC` followed by the given (type, body) blocks; the last one is flagged.
pub fn flac_file(blocks: &[(u8, Vec<u8>)]) -> Vec<u8> {
    let mut file = b"fLaC".to_vec();
    for (index, (block_type, body)) in blocks.iter().enumerate() {
        let last = index + 1 == blocks.len();
        let flags = if last { 0x80 | block_type } else { *block_type };
        let len = (body.len() as u32).to_be_bytes();
        file.extend_from_slice(&[flags, len[1], len[2], len[3]]);
        file.extend_from_slice(body);
    }
    // a few bytes standing in for audio frames
    file.extend_from_slice(&[0xFF, 0xF8, 0x69, 0x08]);
    file
}

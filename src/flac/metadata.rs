// FLAC metadata block headers and STREAMINFO

use std::io::{Read, Seek};
use std::time::Duration;

use crate::error::{Result, ScanError};
use crate::utils::io::{read_exact_at, ByteCursor};

/// FLAC file signature
pub const FLAC_SIGNATURE: &[u8; 4] = b"fLaC";

/// FLAC metadata block types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlacMetadataBlockType {
    StreamInfo,
    Padding,
    Application,
    SeekTable,
    VorbisComment,
    CueSheet,
    Picture,
    /// 7-126
    Reserved(u8),
    /// 127, forbidden to avoid confusion with a frame sync code
    Invalid,
}

impl FlacMetadataBlockType {
    pub fn from_byte(byte: u8) -> Self {
        match byte & 0x7F {
            0 => FlacMetadataBlockType::StreamInfo,
            1 => FlacMetadataBlockType::Padding,
            2 => FlacMetadataBlockType::Application,
            3 => FlacMetadataBlockType::SeekTable,
            4 => FlacMetadataBlockType::VorbisComment,
            5 => FlacMetadataBlockType::CueSheet,
            6 => FlacMetadataBlockType::Picture,
            127 => FlacMetadataBlockType::Invalid,
            other => FlacMetadataBlockType::Reserved(other),
        }
    }
}

/// FLAC metadata block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlacMetadataBlockHeader {
    pub is_last: bool,
    pub block_type: FlacMetadataBlockType,
    pub length: u32,
    /// Source offset of the block body
    pub body_offset: u64,
}

impl FlacMetadataBlockHeader {
    pub const HEADER_SIZE: usize = 4;

    /// Read the block header at `offset`: 1 last-block bit, 7-bit type,
    /// 24-bit big-endian length.
    pub fn read<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<Self> {
        let raw = read_exact_at(reader, offset, Self::HEADER_SIZE)?;
        let mut cursor = ByteCursor::new(&raw);
        let flags = cursor.read_u8()?;
        let length = cursor.read_u24_be()?;

        Ok(FlacMetadataBlockHeader {
            is_last: (flags & 0x80) != 0,
            block_type: FlacMetadataBlockType::from_byte(flags),
            length,
            body_offset: offset + Self::HEADER_SIZE as u64,
        })
    }

    pub fn next_offset(&self) -> u64 {
        self.body_offset + self.length as u64
    }
}

/// The fields of STREAMINFO we use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub sample_rate: u32,
    pub channels: u8,
    pub bits_per_sample: u8,
    pub total_samples: u64,
}

impl StreamInfo {
    /// Bytes 10..18 pack sample rate (20 bits), channels-1 (3), bits-1 (5)
    /// and total samples (36).
    pub fn read(body: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(body);
        cursor.advance(10)?;
        let packed = cursor.read_u64_be()?;

        Ok(StreamInfo {
            sample_rate: (packed >> 44) as u32,
            channels: (((packed >> 41) & 0x07) + 1) as u8,
            bits_per_sample: (((packed >> 36) & 0x1F) + 1) as u8,
            total_samples: packed & 0x000F_FFFF_FFFF,
        })
    }

    /// Whole seconds; unknown when the rate or the sample count is zero.
    pub fn duration(&self) -> Result<Option<Duration>> {
        if self.sample_rate == 0 {
            return Err(ScanError::Malformed("STREAMINFO sample rate is zero".to_string()));
        }
        if self.total_samples == 0 {
            return Ok(None);
        }
        Ok(Some(Duration::from_secs(
            self.total_samples / self.sample_rate as u64,
        )))
    }
}

// FLAC metadata scanner
//
// Reads the metadata block chain that follows the `fLaC` marker. Audio
// frames are never touched.

pub mod metadata;
pub mod picture;
pub mod vorbis;

use std::io::{Read, Seek};

use tracing::{debug, trace};

use crate::config::ScanConfig;
use crate::error::{recover, Result, ScanError};
use crate::tag::ScanOutput;
use crate::utils::io::{read_exact_at, read_prefix, ByteCursor};

pub use metadata::{FlacMetadataBlockHeader, FlacMetadataBlockType, StreamInfo, FLAC_SIGNATURE};
pub use picture::{FlacPicture, PictureSelector};

/// Scan a FLAC source.
///
/// The marker may sit behind a prepended ID3v2 tag, so the first
/// `flac_marker_window` bytes are searched rather than only offset 0.
pub fn scan<R: Read + Seek>(reader: &mut R, config: &ScanConfig) -> Result<ScanOutput> {
    let head = read_prefix(reader, config.flac_marker_window)?;
    let Some(marker) = ByteCursor::new(&head).find(FLAC_SIGNATURE, 0) else {
        return Err(ScanError::Unsupported(
            "no fLaC marker in leading window".to_string(),
        ));
    };
    debug!(offset = marker, "found FLAC marker");

    let mut output = ScanOutput::default();
    let mut pictures = PictureSelector::default();
    let mut offset = (marker + FLAC_SIGNATURE.len()) as u64;
    let mut seen_stream_info = false;

    loop {
        if offset > config.flac_metadata_limit {
            debug!(offset, "metadata chain runs past the scan limit, stopping");
            break;
        }
        let Some(header) = recover(
            FlacMetadataBlockHeader::read(reader, offset),
            "metadata block header",
        )?
        else {
            break;
        };
        trace!(
            block = ?header.block_type,
            offset,
            length = header.length,
            last = header.is_last,
            "metadata block"
        );

        match header.block_type {
            FlacMetadataBlockType::StreamInfo if seen_stream_info => {
                debug!(offset, "second STREAMINFO, stopping");
                break;
            }
            FlacMetadataBlockType::StreamInfo => {
                seen_stream_info = true;
                let info = recover(read_stream_info(reader, &header), "STREAMINFO")?;
                if let Some(duration) = info.flatten() {
                    output.tag.set_duration(duration);
                }
            }
            FlacMetadataBlockType::VorbisComment => {
                let body = read_exact_at(reader, header.body_offset, header.length as usize);
                if let Some(body) = recover(body, "VORBIS_COMMENT body")? {
                    recover(
                        vorbis::apply_comments(&body, &mut output.tag, config),
                        "VORBIS_COMMENT",
                    )?;
                }
            }
            FlacMetadataBlockType::Picture => {
                let head = read_exact_at(reader, header.body_offset, 4usize.min(header.length as usize))
                    .and_then(|head| picture::read_picture_type(&head));
                if let Some(picture_type) = recover(head, "PICTURE type")? {
                    pictures.offer(picture_type, header.body_offset, header.length);
                }
            }
            FlacMetadataBlockType::Invalid => {
                debug!(offset, "invalid metadata block type, stopping");
                break;
            }
            _ => {}
        }

        if header.is_last {
            break;
        }
        offset = header.next_offset();
    }

    if let Some(picture) = pictures.load(reader)? {
        debug!(
            kind = picture.type_label(),
            mime = %picture.mime_type,
            bytes = picture.data.len(),
            "embedded picture"
        );
        output.art = Some(picture.into_art());
    }

    Ok(output)
}

fn read_stream_info<R: Read + Seek>(
    reader: &mut R,
    header: &FlacMetadataBlockHeader,
) -> Result<Option<std::time::Duration>> {
    let body = read_exact_at(reader, header.body_offset, header.length as usize)?;
    StreamInfo::read(&body)?.duration()
}

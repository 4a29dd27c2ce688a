// VORBIS_COMMENT block
//
// Layout (all lengths little-endian u32): vendor length, vendor string,
// comment count, then each comment as length + "KEY=value" in UTF-8.

use tracing::{trace, warn};

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::field_mapping::VorbisKeys;
use crate::tag::TagRecord;
use crate::utils::io::ByteCursor;

/// Apply every recognised comment in `body` to `tag`.
///
/// A comment whose length is over the ceiling or past the block end
/// abandons the rest of the block; comments applied before it stay.
pub fn apply_comments(body: &[u8], tag: &mut TagRecord, config: &ScanConfig) -> Result<()> {
    let mut cursor = ByteCursor::new(body);

    let vendor_len = cursor.read_u32_le()? as usize;
    cursor.advance(vendor_len)?;

    let count = cursor.read_u32_le()?;
    for index in 0..count {
        let len = cursor.read_u32_le()? as usize;
        if len > config.vorbis_comment_ceiling || len > cursor.remaining() {
            warn!(
                comment = index,
                length = len,
                remaining = cursor.remaining(),
                "vorbis comment length out of bounds, abandoning block"
            );
            return Err(ScanError::Truncated {
                offset: cursor.position() as u64,
                needed: len,
                remaining: cursor.remaining(),
            });
        }
        let raw = cursor.read_bytes(len)?;
        let comment = String::from_utf8_lossy(raw);

        let Some((key, value)) = comment.split_once('=') else {
            trace!(comment = index, "comment without '='");
            continue;
        };
        match VorbisKeys::lookup(key) {
            Some((field, policy)) => {
                tag.apply_text(field, value, policy, &config.item_separator);
            }
            None => trace!(key, "ignoring vorbis comment"),
        }
    }
    Ok(())
}

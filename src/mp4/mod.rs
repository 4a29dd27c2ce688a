// MP4/M4A metadata scanner
//
// MP4 files are a tree of size-prefixed atoms. iTunes-style metadata lives in
// an `ilst` item list under moov/udta/meta, track timing in mdia/mdhd.
//
// - ftyp: File type atom
// - moov: Movie atom (container)
//   - trak/mdia/mdhd: timescale and duration
//   - udta: User data atom
//     - meta: Metadata atom
//       - ilst: Information list atom (contains metadata items)
// - mdat: Media data atom (never read)
//
// The walk reads atom headers straight from the source and only loads the
// payloads it decodes, so large `mdat` atoms cost nothing.

pub mod atoms;
pub mod ilst;

use std::io::{Read, Seek};
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::ScanConfig;
use crate::error::{recover, Result, ScanError};
use crate::tag::ScanOutput;
use crate::utils::io::{read_exact_at, source_len, ByteCursor};

use atoms::{fourcc_to_string, AtomHeader};

/// mdhd payload sizes: version/flags + times + timescale + duration
const MDHD_V0_LEN: usize = 20;
const MDHD_V1_LEN: usize = 32;

/// Scan an MP4/M4A source.
pub fn scan<R: Read + Seek>(reader: &mut R, config: &ScanConfig) -> Result<ScanOutput> {
    let len = source_len(reader)?;

    let first = match AtomHeader::read(reader, 0) {
        Ok(header) => header,
        Err(e) if e.is_recoverable() => {
            return Err(ScanError::Unsupported(format!("no leading atom: {}", e)));
        }
        Err(e) => return Err(e),
    };
    if !atoms::TOP_LEVEL.contains(&first.code) {
        return Err(ScanError::Unsupported(format!(
            "unexpected leading atom '{}'",
            fourcc_to_string(first.code)
        )));
    }

    let mut walker = AtomWalker {
        reader,
        config,
        atoms_read: 0,
        output: ScanOutput::default(),
    };
    walker.walk(0, len, 0)?;
    Ok(walker.output)
}

struct AtomWalker<'r, R> {
    reader: &'r mut R,
    config: &'r ScanConfig,
    atoms_read: usize,
    output: ScanOutput,
}

impl<'r, R: Read + Seek> AtomWalker<'r, R> {
    /// Walk the sibling atoms in `[start, stop)`.
    fn walk(&mut self, start: u64, stop: u64, depth: usize) -> Result<()> {
        if depth > self.config.max_atom_depth {
            debug!(depth, "atom tree too deep, not descending");
            return Ok(());
        }

        let mut pos = start;
        while pos.saturating_add(8) <= stop {
            if self.atoms_read >= self.config.max_atom_count {
                debug!(offset = pos, "atom count limit reached, stopping walk");
                return Ok(());
            }
            self.atoms_read += 1;

            // a bad header ends this level only
            let Some(header) = recover(AtomHeader::read(&mut *self.reader, pos), "atom header")? else {
                break;
            };

            if header.size == 0 {
                // runs to the end of the parent
                self.visit(&header, stop, depth)?;
                break;
            }

            let mut end = pos.saturating_add(header.size);
            if end > stop {
                debug!(
                    atom = %fourcc_to_string(header.code),
                    offset = pos,
                    "atom overruns its parent"
                );
                end = stop;
            }
            self.visit(&header, end, depth)?;
            pos = end;
        }
        Ok(())
    }

    fn visit(&mut self, header: &AtomHeader, end: u64, depth: usize) -> Result<()> {
        trace!(
            atom = %fourcc_to_string(header.code),
            offset = header.offset,
            size = header.size,
            depth,
            "atom"
        );
        let payload = header.payload_offset();
        if payload > end {
            return Ok(());
        }

        match header.code {
            code if atoms::is_container(code) => self.walk(payload, end, depth + 1),
            atoms::META => {
                recover(self.read_meta(payload, end), "meta atom")?;
                Ok(())
            }
            atoms::MDHD => {
                recover(self.read_mdhd(payload, end), "mdhd atom")?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn read_meta(&mut self, payload: u64, end: u64) -> Result<()> {
        let len = usize::try_from(end - payload).unwrap_or(usize::MAX);
        if len > self.config.mp4_meta_limit {
            return Err(ScanError::Malformed(format!(
                "meta payload of {} bytes exceeds limit",
                len
            )));
        }
        let bytes = read_exact_at(&mut *self.reader, payload, len)?;
        ilst::parse_meta(&bytes, &mut self.output, self.config)
    }

    fn read_mdhd(&mut self, payload: u64, end: u64) -> Result<()> {
        let available = usize::try_from(end - payload).unwrap_or(usize::MAX);
        let head = read_exact_at(&mut *self.reader, payload, MDHD_V0_LEN.min(available))?;
        let version = ByteCursor::new(&head).read_u8()?;
        let wanted = if version == 1 { MDHD_V1_LEN } else { MDHD_V0_LEN };
        if wanted > available {
            return Err(ScanError::Truncated {
                offset: payload,
                needed: wanted,
                remaining: available,
            });
        }
        let bytes = read_exact_at(&mut *self.reader, payload, wanted)?;

        if let Some(duration) = mdhd_duration(&bytes)? {
            self.output.tag.set_duration(duration);
        }
        Ok(())
    }
}

/// Decode an mdhd payload into whole seconds.
///
/// Returns `Ok(None)` when the duration is the "unknown" sentinel.
pub fn mdhd_duration(payload: &[u8]) -> Result<Option<Duration>> {
    let mut cursor = ByteCursor::new(payload);
    let version = cursor.read_u8()?;
    cursor.advance(3)?;

    let (timescale, duration) = if version == 1 {
        cursor.advance(16)?;
        let timescale = cursor.read_u32_be()?;
        let duration = cursor.read_u64_be()?;
        (timescale, duration)
    } else {
        cursor.advance(8)?;
        let timescale = cursor.read_u32_be()?;
        let raw = cursor.read_u32_be()?;
        let duration = if raw == u32::MAX { u64::MAX } else { raw as u64 };
        (timescale, duration)
    };

    if timescale == 0 {
        return Err(ScanError::Malformed("mdhd timescale is zero".to_string()));
    }
    if duration == u64::MAX {
        return Ok(None);
    }
    Ok(Some(Duration::from_secs(duration / timescale as u64)))
}

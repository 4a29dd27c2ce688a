// ASF/WMA metadata scanner
//
// The first `asf_window` bytes are searched linearly for known header
// objects. Only the Header Object is required; each of the others is
// decoded independently and a failure in one never affects the rest.
//
// Objects read:
// - File Properties: play duration in 100-ns units
// - Content Description: title, author, description
// - Extended Content Description: WM/* attributes (v1 records)
// - Metadata / Metadata Library: WM/* attributes (v2 records)

pub mod guid;
pub mod objects;
pub mod picture;

use std::io::{Read, Seek};

use tracing::{debug, trace};

use crate::config::ScanConfig;
use crate::error::{recover, Result, ScanError};
use crate::field_mapping::{AsfNames, MergePolicy, TagField};
use crate::tag::{EmbeddedArt, PictureType, ScanOutput};
use crate::utils::io::read_prefix;

use guid::Guid;
use objects::{object_body, AsfAttribute, AsfValue, ContentDescription, RecordLayout};
use picture::WmPicture;

/// Scan an ASF/WMA source.
pub fn scan<R: Read + Seek>(reader: &mut R, config: &ScanConfig) -> Result<ScanOutput> {
    let buffer = read_prefix(reader, config.asf_window)?;
    scan_buffer(&buffer, config)
}

/// Scan an in-memory ASF header window.
pub fn scan_buffer(buffer: &[u8], config: &ScanConfig) -> Result<ScanOutput> {
    let header_at = guid::HEADER
        .find_in(buffer, 0)
        .ok_or_else(|| ScanError::Unsupported("no ASF header object".to_string()))?;

    let mut scanner = AsfScanner {
        data: buffer,
        from: header_at,
        config,
        output: ScanOutput::default(),
    };

    scanner.file_properties()?;
    scanner.content_description()?;
    scanner.attributes(guid::EXTENDED_CONTENT_DESCRIPTION, RecordLayout::ExtendedContent)?;
    scanner.attributes(guid::METADATA, RecordLayout::MetadataLibrary)?;
    scanner.attributes(guid::METADATA_LIBRARY, RecordLayout::MetadataLibrary)?;

    Ok(scanner.output)
}

struct AsfScanner<'a> {
    data: &'a [u8],
    from: usize,
    config: &'a ScanConfig,
    output: ScanOutput,
}

impl<'a> AsfScanner<'a> {
    fn locate(&self, guid: Guid) -> Option<usize> {
        let found = guid.find_in(self.data, self.from);
        if found.is_none() {
            trace!(object = %guid, "object not present");
        }
        found
    }

    fn file_properties(&mut self) -> Result<()> {
        let Some(offset) = self.locate(guid::FILE_PROPERTIES) else {
            return Ok(());
        };
        let duration = recover(
            object_body(self.data, offset).and_then(|mut body| objects::read_play_duration(&mut body)),
            "file properties object",
        )?;
        if let Some(Some(duration)) = duration {
            self.output.tag.set_duration(duration);
        }
        Ok(())
    }

    fn content_description(&mut self) -> Result<()> {
        let Some(offset) = self.locate(guid::CONTENT_DESCRIPTION) else {
            return Ok(());
        };
        let content = recover(
            object_body(self.data, offset).and_then(|mut body| ContentDescription::read(&mut body)),
            "content description object",
        )?;
        if let Some(content) = content {
            let separator = &self.config.item_separator;
            let tag = &mut self.output.tag;
            tag.apply_text(TagField::Title, &content.title, MergePolicy::FirstWins, separator);
            tag.apply_text(TagField::Artist, &content.author, MergePolicy::Append, separator);
            tag.apply_text(TagField::Comment, &content.description, MergePolicy::FirstWins, separator);
        }
        Ok(())
    }

    fn attributes(&mut self, guid: Guid, layout: RecordLayout) -> Result<()> {
        let Some(offset) = self.locate(guid) else {
            return Ok(());
        };
        let data = self.data;
        let mut pending = Vec::new();
        let walked = object_body(data, offset)
            .and_then(|mut body| layout.for_each_attribute(&mut body, |attr| pending.push(attr)));
        // records decoded before a failure are still applied
        for attribute in pending {
            self.apply_attribute(attribute);
        }
        recover(walked, "attribute object")?;
        Ok(())
    }

    fn apply_attribute(&mut self, attribute: AsfAttribute<'_>) {
        let Some((field, policy)) = AsfNames::lookup(&attribute.name) else {
            trace!(name = %attribute.name, "ignoring attribute");
            return;
        };

        if field == TagField::Picture {
            if let AsfValue::Binary(data) = attribute.value {
                self.apply_picture(data);
            }
            return;
        }

        let config = self.config;
        let separator = &config.item_separator;
        let tag = &mut self.output.tag;
        match attribute.value {
            AsfValue::Text(text) => {
                tag.apply_text(field, &text, policy, separator);
            }
            AsfValue::DWord(n) => {
                tag.apply_number(field, n);
            }
            AsfValue::Word(n) => {
                tag.apply_number(field, n as u32);
            }
            AsfValue::QWord(n) => {
                if let Ok(n) = u32::try_from(n) {
                    tag.apply_number(field, n);
                }
            }
            AsfValue::Bool(flag) => {
                tag.apply_flag(field, flag);
            }
            other => {
                trace!(name = %attribute.name, value = ?other, "attribute value not usable");
            }
        }
    }

    /// Only front-cover and "other" pictures are kept, first one wins.
    fn apply_picture(&mut self, data: &[u8]) {
        if self.output.art.is_some() {
            return;
        }
        let picture = match WmPicture::read(data) {
            Ok(picture) => picture,
            Err(e) => {
                debug!(error = %e, "skipping WM/Picture");
                return;
            }
        };
        match PictureType::from_u32(picture.picture_type as u32) {
            Some(PictureType::CoverFront) | Some(PictureType::Other) => {
                trace!(
                    mime = %picture.mime_type,
                    description = %picture.description,
                    bytes = picture.data.len(),
                    "captured WM/Picture"
                );
                self.output.art = Some(EmbeddedArt::new(&picture.mime_type, picture.data));
            }
            _ => trace!(picture_type = picture.picture_type, "ignoring WM/Picture"),
        }
    }
}

//! PDF serialization: object graph construction, content stream encoding,
//! cross-reference table and trailer.
//!
//! Object numbers are assigned in one deterministic pass before anything is
//! written, so every dictionary can reference objects that are emitted
//! later.

use std::io::Write;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::document::DocumentOptions;
use crate::error::Result;
use crate::objects::{name, Dictionary, Object, ObjectId};
use crate::page::Page;
use crate::resources::{ImageData, RasterChannels, ResourceStore};
use crate::text::escape_text;

const PDF_VERSION: &str = "1.7";

/// Character range covered by the /Widths array of every font dictionary.
const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 126;

pub(crate) struct PdfWriter<W: Write> {
    writer: W,
    position: u64,
    offsets: Vec<(u32, u64)>,
}

/// Object numbers assigned to one page.
struct PageIds {
    page: ObjectId,
    content: ObjectId,
}

/// Object numbers assigned to one image: the XObject stream plus an
/// optional soft mask stream for its alpha channel.
struct ImageIds {
    xobject: ObjectId,
    smask: Option<ObjectId>,
}

struct FontIds {
    font: ObjectId,
    descriptor: ObjectId,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            position: 0,
            offsets: Vec::new(),
        }
    }

    pub fn write_document(
        &mut self,
        pages: &[Page],
        resources: &ResourceStore,
        options: &DocumentOptions,
        creation_date: DateTime<Utc>,
    ) -> Result<()> {
        self.write_header()?;

        // Assign all object numbers up front
        let catalog_id = ObjectId::new(1);
        let pages_root_id = ObjectId::new(2);
        let mut next = 3u32;
        let mut take_id = || {
            let id = ObjectId::new(next);
            next += 1;
            id
        };

        let page_ids: Vec<PageIds> = pages
            .iter()
            .map(|_| PageIds {
                page: take_id(),
                content: take_id(),
            })
            .collect();
        let font_ids: Vec<FontIds> = resources
            .fonts()
            .iter()
            .map(|_| FontIds {
                font: take_id(),
                descriptor: take_id(),
            })
            .collect();
        let image_ids: Vec<ImageIds> = resources
            .images()
            .iter()
            .map(|image| ImageIds {
                xobject: take_id(),
                smask: match &image.data {
                    ImageData::Raster { alpha: Some(_), .. } => Some(take_id()),
                    _ => None,
                },
            })
            .collect();
        let icc_ids: Vec<ObjectId> = resources.icc_profiles().iter().map(|_| take_id()).collect();
        let info_id = take_id();
        let object_count = next;

        debug!(objects = object_count - 1, pages = pages.len(), "serializing document");

        // Catalog and page tree
        let mut catalog = Dictionary::new();
        catalog.set("Type", name("Catalog"));
        catalog.set("Pages", pages_root_id);
        self.write_object_at(catalog_id, &catalog.into())?;

        let mut pages_root = Dictionary::new();
        pages_root.set("Type", name("Pages"));
        pages_root.set(
            "Kids",
            Object::Array(page_ids.iter().map(|ids| ids.page.into()).collect()),
        );
        pages_root.set("Count", pages.len() as i64);
        self.write_object_at(pages_root_id, &pages_root.into())?;

        for (page, ids) in pages.iter().zip(&page_ids) {
            let dict = page_dictionary(page, pages_root_id, ids, &font_ids, &image_ids, &icc_ids);
            self.write_object_at(ids.page, &dict.into())?;
            self.write_content_stream(ids.content, &page.content, options.compress)?;
        }

        for (font, ids) in resources.fonts().iter().zip(&font_ids) {
            let metrics = &font.metrics;
            let widths: Vec<Object> = (FIRST_CHAR..=LAST_CHAR)
                .map(|code| Object::Integer(metrics.advance_1000(code as char) as i64))
                .collect();

            let mut dict = Dictionary::new();
            dict.set("Type", name("Font"));
            dict.set("Subtype", name("TrueType"));
            dict.set("BaseFont", name(font.base_name.clone()));
            dict.set("FirstChar", FIRST_CHAR as i64);
            dict.set("LastChar", LAST_CHAR as i64);
            dict.set("Widths", Object::Array(widths));
            dict.set("FontDescriptor", ids.descriptor);
            self.write_object_at(ids.font, &dict.into())?;

            let mut descriptor = Dictionary::new();
            descriptor.set("Type", name("FontDescriptor"));
            descriptor.set("FontName", name(font.base_name.clone()));
            // Nonsymbolic
            descriptor.set("Flags", 32i64);
            descriptor.set(
                "FontBBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(metrics.descent_1000() as i64),
                    Object::Integer(1000),
                    Object::Integer(metrics.ascent_1000() as i64),
                ]),
            );
            descriptor.set("ItalicAngle", 0i64);
            descriptor.set("Ascent", metrics.ascent_1000() as i64);
            descriptor.set("Descent", metrics.descent_1000() as i64);
            descriptor.set("CapHeight", metrics.cap_height_1000() as i64);
            descriptor.set("StemV", 80i64);
            self.write_object_at(ids.descriptor, &descriptor.into())?;
        }

        for (image, ids) in resources.images().iter().zip(&image_ids) {
            self.write_image(image, ids, options.compress)?;
        }

        for (profile, &id) in resources.icc_profiles().iter().zip(&icc_ids) {
            let mut dict = Dictionary::new();
            dict.set("N", profile.channels as i64);
            self.write_stream(id, dict, &profile.data, options.compress)?;
        }

        let info = info_dictionary(options, creation_date);
        self.write_object_at(info_id, &info.into())?;

        self.write_xref_and_trailer(object_count, catalog_id, info_id)?;
        Ok(())
    }

    fn write_header(&mut self) -> Result<()> {
        self.write_bytes(format!("%PDF-{PDF_VERSION}\n").as_bytes())?;
        // Binary marker comment so transports treat the file as binary
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;
        Ok(())
    }

    fn write_content_stream(&mut self, id: ObjectId, content: &[u8], compress: bool) -> Result<()> {
        self.write_stream(id, Dictionary::new(), content, compress)
    }

    fn write_image(
        &mut self,
        image: &crate::resources::ImageResource,
        ids: &ImageIds,
        compress: bool,
    ) -> Result<()> {
        let mut dict = Dictionary::new();
        dict.set("Type", name("XObject"));
        dict.set("Subtype", name("Image"));
        dict.set("Width", image.width as i64);
        dict.set("Height", image.height as i64);
        dict.set("BitsPerComponent", 8i64);

        match &image.data {
            ImageData::Jpeg { data, components } => {
                let space = match components {
                    1 => "DeviceGray",
                    4 => "DeviceCMYK",
                    _ => "DeviceRGB",
                };
                dict.set("ColorSpace", name(space));
                dict.set("Filter", name("DCTDecode"));
                dict.set("Length", data.len() as i64);
                self.write_raw_stream(ids.xobject, dict, data)?;
            }
            ImageData::Raster {
                pixels,
                channels,
                alpha,
            } => {
                let space = match channels {
                    RasterChannels::Gray => "DeviceGray",
                    RasterChannels::Rgb => "DeviceRGB",
                };
                dict.set("ColorSpace", name(space));
                if let Some(smask_id) = ids.smask {
                    dict.set("SMask", smask_id);
                }
                self.write_stream(ids.xobject, dict, pixels, compress)?;

                if let (Some(alpha), Some(smask_id)) = (alpha, ids.smask) {
                    let mut mask = Dictionary::new();
                    mask.set("Type", name("XObject"));
                    mask.set("Subtype", name("Image"));
                    mask.set("Width", image.width as i64);
                    mask.set("Height", image.height as i64);
                    mask.set("ColorSpace", name("DeviceGray"));
                    mask.set("BitsPerComponent", 8i64);
                    self.write_stream(smask_id, mask, alpha, compress)?;
                }
            }
        }
        Ok(())
    }

    /// Write a stream object, compressing the data when enabled.
    fn write_stream(
        &mut self,
        id: ObjectId,
        mut dict: Dictionary,
        data: &[u8],
        compress: bool,
    ) -> Result<()> {
        let encoded = if compress { compress_data(data)? } else { None };
        match encoded {
            Some(compressed) => {
                dict.set("Filter", name("FlateDecode"));
                dict.set("Length", compressed.len() as i64);
                self.write_raw_stream(id, dict, &compressed)
            }
            None => {
                dict.set("Length", data.len() as i64);
                self.write_raw_stream(id, dict, data)
            }
        }
    }

    /// Write a stream object whose dictionary already describes the data.
    fn write_raw_stream(&mut self, id: ObjectId, dict: Dictionary, data: &[u8]) -> Result<()> {
        self.begin_object(id)?;
        self.write_object(&dict.into())?;
        self.write_bytes(b"\nstream\n")?;
        self.write_bytes(data)?;
        self.write_bytes(b"\nendstream\nendobj\n")?;
        Ok(())
    }

    fn write_object_at(&mut self, id: ObjectId, object: &Object) -> Result<()> {
        self.begin_object(id)?;
        self.write_object(object)?;
        self.write_bytes(b"\nendobj\n")?;
        Ok(())
    }

    fn begin_object(&mut self, id: ObjectId) -> Result<()> {
        self.offsets.push((id.number(), self.position));
        self.write_bytes(format!("{} 0 obj\n", id.number()).as_bytes())?;
        Ok(())
    }

    fn write_object(&mut self, object: &Object) -> Result<()> {
        match object {
            Object::Null => self.write_bytes(b"null")?,
            Object::Boolean(b) => self.write_bytes(if *b { b"true" } else { b"false" })?,
            Object::Integer(i) => self.write_bytes(i.to_string().as_bytes())?,
            Object::Real(r) => self.write_bytes(format!("{r}").as_bytes())?,
            Object::String(s) => {
                let mut escaped = String::new();
                escape_text(s, &mut escaped);
                self.write_bytes(format!("({escaped})").as_bytes())?;
            }
            Object::Name(n) => self.write_bytes(format!("/{n}").as_bytes())?,
            Object::Array(items) => {
                self.write_bytes(b"[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.write_bytes(b" ")?;
                    }
                    self.write_object(item)?;
                }
                self.write_bytes(b"]")?;
            }
            Object::Dictionary(dict) => {
                self.write_bytes(b"<< ")?;
                for (key, value) in dict.entries() {
                    self.write_bytes(format!("/{key} ").as_bytes())?;
                    self.write_object(value)?;
                    self.write_bytes(b" ")?;
                }
                self.write_bytes(b">>")?;
            }
            Object::Reference(id) => self.write_bytes(id.to_string().as_bytes())?,
        }
        Ok(())
    }

    fn write_xref_and_trailer(
        &mut self,
        object_count: u32,
        catalog_id: ObjectId,
        info_id: ObjectId,
    ) -> Result<()> {
        let xref_position = self.position;

        let mut offsets = std::mem::take(&mut self.offsets);
        offsets.sort_by_key(|(number, _)| *number);
        self.write_bytes(format!("xref\n0 {object_count}\n").as_bytes())?;
        self.write_bytes(b"0000000000 65535 f \n")?;
        for &(_, offset) in &offsets {
            self.write_bytes(format!("{offset:010} 00000 n \n").as_bytes())?;
        }

        let mut trailer = Dictionary::new();
        trailer.set("Size", object_count as i64);
        trailer.set("Root", catalog_id);
        trailer.set("Info", info_id);

        self.write_bytes(b"trailer\n")?;
        self.write_object(&trailer.into())?;
        self.write_bytes(format!("\nstartxref\n{xref_position}\n%%EOF\n").as_bytes())?;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }
}

fn page_dictionary(
    page: &Page,
    parent: ObjectId,
    ids: &PageIds,
    font_ids: &[FontIds],
    image_ids: &[ImageIds],
    icc_ids: &[ObjectId],
) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", name("Page"));
    dict.set("Parent", parent);
    for (kind, rect) in page.boxes.iter() {
        dict.set(
            kind.pdf_key(),
            Object::Array(vec![
                rect.lower_left.x.into(),
                rect.lower_left.y.into(),
                rect.upper_right.x.into(),
                rect.upper_right.y.into(),
            ]),
        );
    }
    dict.set("Contents", ids.content);

    let mut page_resources = Dictionary::new();
    if !page.used_fonts.is_empty() {
        let mut fonts = Dictionary::new();
        for &index in &page.used_fonts {
            fonts.set(format!("F{index}"), font_ids[index as usize].font);
        }
        page_resources.set("Font", fonts);
    }
    if !page.used_images.is_empty() {
        let mut xobjects = Dictionary::new();
        for &index in &page.used_images {
            xobjects.set(format!("Im{index}"), image_ids[index as usize].xobject);
        }
        page_resources.set("XObject", xobjects);
    }
    if !page.used_profiles.is_empty() {
        let mut spaces = Dictionary::new();
        for &index in &page.used_profiles {
            spaces.set(
                format!("CS{index}"),
                Object::Array(vec![name("ICCBased"), icc_ids[index as usize].into()]),
            );
        }
        page_resources.set("ColorSpace", spaces);
    }
    dict.set("Resources", page_resources);

    if let Some(transition) = page.transition {
        let mut trans = Dictionary::new();
        trans.set("Type", name("Trans"));
        trans.set("S", name(transition.kind.pdf_name()));
        trans.set("D", transition.duration);
        dict.set("Trans", trans);
    }
    dict
}

fn info_dictionary(options: &DocumentOptions, creation_date: DateTime<Utc>) -> Dictionary {
    let mut info = Dictionary::new();
    if let Some(title) = &options.title {
        info.set("Title", Object::String(title.clone()));
    }
    if let Some(author) = &options.author {
        info.set("Author", Object::String(author.clone()));
    }
    info.set("Creator", Object::String("scribe-pdf".to_string()));
    info.set(
        "Producer",
        Object::String(format!("scribe-pdf {}", env!("CARGO_PKG_VERSION"))),
    );
    info.set("CreationDate", Object::String(format_pdf_date(creation_date)));
    info
}

/// Format a timestamp as a PDF date string, e.g. `D:20260826120000+00'00`.
fn format_pdf_date(date: DateTime<Utc>) -> String {
    date.format("D:%Y%m%d%H%M%S+00'00").to_string()
}

#[cfg(feature = "compression")]
fn compress_data(data: &[u8]) -> Result<Option<Vec<u8>>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(Some(encoder.finish()?))
}

#[cfg(not(feature = "compression"))]
fn compress_data(_data: &[u8]) -> Result<Option<Vec<u8>>> {
    Ok(None)
}

//! PDF output of a [`ReportDocument`].
//!
//! The writer lays out blocks top to bottom on fixed-size pages using the standard
//! Type1 fonts, embeds every image of an image table as an RGB XObject, and adds a
//! document outline with one entry per section heading. The whole file is produced
//! in memory before anything touches the destination path.

mod layout;
pub mod style;

use self::layout::{Line, encode_text, line_height, line_width, wrap_inlines};
use self::style::{FontFace, PageFormat, Rgb, Theme};
use crate::core::models::document::{
    Block, Cell, DocumentMetadata, ImageTable, LabeledList, Paragraph, ReportDocument, TextStyle,
};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub use self::style::{FontFamily, FontSpec};

const PRODUCER: &str = concat!("simreport ", env!("CARGO_PKG_VERSION"));
const LIST_INDENT: f32 = 12.0;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to load image '{path}': {source}")]
    Image {
        path: String,
        source: image::ImageError,
    },
    #[error("PDF encoding error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result of rendering a document.
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub pages: usize,
    /// Distinct image files embedded.
    pub images: usize,
}

pub struct PdfWriter<'t> {
    theme: &'t Theme,
    page: PageFormat,
}

impl<'t> PdfWriter<'t> {
    pub fn new(theme: &'t Theme, page: PageFormat) -> Self {
        Self { theme, page }
    }

    pub fn render(&self, document: &ReportDocument) -> Result<RenderedPdf, PdfError> {
        let mut canvas = Canvas::new(self.theme, self.page);
        for section in &document.sections {
            if let Some(heading) = &section.heading {
                canvas.heading(heading);
            }
            for block in &section.blocks {
                match block {
                    Block::Text(paragraph) => canvas.paragraph(paragraph, 0.0),
                    Block::List(list) => canvas.list(list),
                    Block::Table(table) => canvas.table(table)?,
                    Block::Rule => canvas.rule(),
                    Block::Spacer => canvas.spacer(),
                }
            }
        }
        canvas.finish(&document.metadata)
    }

    /// Renders `document` and writes it to `path`. A partially written file is removed.
    pub fn write(&self, document: &ReportDocument, path: &Path) -> Result<RenderedPdf, PdfError> {
        let rendered = self.render(document)?;
        if let Err(e) = std::fs::write(path, &rendered.bytes) {
            let _ = std::fs::remove_file(path);
            return Err(PdfError::Io {
                path: path.to_string_lossy().to_string(),
                source: e,
            });
        }
        info!(
            "Wrote {} page(s) with {} image(s) to {:?}",
            rendered.pages, rendered.images, path
        );
        Ok(rendered)
    }
}

#[derive(Debug, Clone)]
struct EmbeddedImage {
    name: String,
    width: u32,
    height: u32,
}

struct Bookmark {
    title: String,
    page: usize,
    top: f32,
}

struct Canvas<'t> {
    theme: &'t Theme,
    doc: Document,
    width: f32,
    height: f32,
    pages: Vec<Vec<Operation>>,
    cursor: f32,
    fonts: Dictionary,
    xobjects: Dictionary,
    images: HashMap<PathBuf, EmbeddedImage>,
    bookmarks: Vec<Bookmark>,
}

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

fn color_operands(color: Rgb) -> Vec<Object> {
    vec![real(color.r), real(color.g), real(color.b)]
}

fn text_object(text: &str) -> Object {
    Object::String(encode_text(text), StringFormat::Literal)
}

impl<'t> Canvas<'t> {
    fn new(theme: &'t Theme, page: PageFormat) -> Self {
        let (width, height) = page.size();
        let mut doc = Document::with_version("1.5");
        let mut fonts = Dictionary::new();
        for face in FontFace::ALL {
            let id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => theme.family.base_font(face),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(face.resource_name(), id);
        }
        Self {
            theme,
            doc,
            width,
            height,
            pages: vec![Vec::new()],
            cursor: height - theme.margin,
            fonts,
            xobjects: Dictionary::new(),
            images: HashMap::new(),
            bookmarks: Vec::new(),
        }
    }

    fn content_width(&self) -> f32 {
        self.width - 2.0 * self.theme.margin
    }

    fn usable_height(&self) -> f32 {
        self.height - 2.0 * self.theme.margin
    }

    fn at_page_top(&self) -> bool {
        self.cursor >= self.height - self.theme.margin
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor = self.height - self.theme.margin;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.cursor - needed < self.theme.margin && !self.at_page_top() {
            self.new_page();
        }
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn text_line(&mut self, line: &Line, indent: f32) {
        let height = line_height(line, self.theme);
        self.ensure_space(height);
        let baseline = self.cursor - height * 0.8;
        let mut x = self.theme.margin + indent;
        let theme = self.theme;

        let mut ops = vec![Operation::new("BT", vec![])];
        for span in line {
            let spec = theme.font(span.style);
            ops.push(Operation::new(
                "Tf",
                vec![spec.face.resource_name().into(), real(spec.size)],
            ));
            ops.push(Operation::new("rg", color_operands(spec.color)));
            ops.push(Operation::new("Ts", vec![real(spec.rise)]));
            ops.push(Operation::new(
                "Tm",
                vec![1.into(), 0.into(), 0.into(), 1.into(), real(x), real(baseline)],
            ));
            ops.push(Operation::new("Tj", vec![text_object(&span.text)]));
            x += line_width(std::slice::from_ref(span), theme);
        }
        ops.push(Operation::new("ET", vec![]));
        self.ops().extend(ops);
        self.cursor -= height;
    }

    fn paragraph(&mut self, paragraph: &Paragraph, indent: f32) {
        let max_width = self.content_width() - indent;
        for line in wrap_inlines(&paragraph.inlines, self.theme, max_width) {
            self.text_line(&line, indent);
        }
    }

    fn heading(&mut self, text: &str) {
        let paragraph = Paragraph::styled(text, TextStyle::Heading);
        let lines = wrap_inlines(&paragraph.inlines, self.theme, self.content_width());
        if let Some(first) = lines.first() {
            self.ensure_space(line_height(first, self.theme));
        }
        self.bookmarks.push(Bookmark {
            title: text.to_string(),
            page: self.pages.len() - 1,
            top: self.cursor,
        });
        for line in lines {
            self.text_line(&line, 0.0);
        }
    }

    fn list(&mut self, list: &LabeledList) {
        self.paragraph(&Paragraph::styled(list.label.as_str(), TextStyle::Label), 0.0);
        for item in &list.items {
            let bullet = Paragraph::styled(format!("- {item}"), TextStyle::Normal);
            self.paragraph(&bullet, LIST_INDENT);
        }
    }

    fn rule(&mut self) {
        let height = 6.0;
        self.ensure_space(height);
        let y = self.cursor - height / 2.0;
        let (left, right) = (self.theme.margin, self.width - self.theme.margin);
        let theme = self.theme;
        self.ops().extend([
            Operation::new("q", vec![]),
            Operation::new("RG", color_operands(theme.rule_color)),
            Operation::new("w", vec![real(theme.rule_width)]),
            Operation::new("m", vec![real(left), real(y)]),
            Operation::new("l", vec![real(right), real(y)]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
        self.cursor -= height;
    }

    fn spacer(&mut self) {
        let height = self.theme.normal.size * 1.25;
        if self.cursor - height < self.theme.margin {
            self.new_page();
        } else {
            self.cursor -= height;
        }
    }

    fn embed_image(&mut self, path: &Path) -> Result<EmbeddedImage, PdfError> {
        if let Some(image) = self.images.get(path) {
            return Ok(image.clone());
        }
        let image_error = |source: image::ImageError| PdfError::Image {
            path: path.to_string_lossy().to_string(),
            source,
        };
        let decoded = image::ImageReader::open(path)
            .map_err(|e| image_error(image::ImageError::IoError(e)))?
            .with_guessed_format()
            .map_err(|e| image_error(image::ImageError::IoError(e)))?
            .decode()
            .map_err(image_error)?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();

        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            rgb.into_raw(),
        );
        let id = self.doc.add_object(stream);
        let name = format!("Im{}", self.images.len() + 1);
        self.xobjects.set(name.as_str(), id);
        debug!("Embedded {:?} as {} ({}x{})", path, name, width, height);

        let embedded = EmbeddedImage {
            name,
            width,
            height,
        };
        self.images.insert(path.to_path_buf(), embedded.clone());
        Ok(embedded)
    }

    fn table(&mut self, table: &ImageTable) -> Result<(), PdfError> {
        let columns = table.columns.max(1);
        let cell_width = self.content_width() / columns as f32;
        let max_height = self.usable_height();

        for row in &table.rows {
            let mut placed = Vec::new();
            let mut row_height = 0.0_f32;
            for (column, cell) in row.iter().enumerate() {
                let Cell::Image(cell) = cell else {
                    continue;
                };
                let image = self.embed_image(&cell.path)?;
                if image.width == 0 || image.height == 0 {
                    continue;
                }
                let pad = cell.padding;
                let mut w = (cell_width - 2.0 * pad).max(1.0);
                let mut h = image.height as f32 * w / image.width as f32;
                let max_image_height = (max_height - 2.0 * pad).max(1.0);
                if h > max_image_height {
                    w *= max_image_height / h;
                    h = max_image_height;
                }
                row_height = row_height.max(h + 2.0 * pad);
                placed.push((column, image.name, w, h, cell.bordered));
            }
            if placed.is_empty() {
                continue;
            }

            self.ensure_space(row_height);
            let top = self.cursor;
            let margin = self.theme.margin;
            let rule_color = self.theme.rule_color;
            for (column, name, w, h, bordered) in placed {
                let cell_left = margin + column as f32 * cell_width;
                let x = cell_left + (cell_width - w) / 2.0;
                let y = top - row_height + (row_height - h) / 2.0;
                let ops = self.ops();
                ops.extend([
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![real(w), 0.into(), 0.into(), real(h), real(x), real(y)],
                    ),
                    Operation::new("Do", vec![Object::Name(name.into_bytes())]),
                    Operation::new("Q", vec![]),
                ]);
                if bordered {
                    ops.extend([
                        Operation::new("q", vec![]),
                        Operation::new("RG", color_operands(rule_color)),
                        Operation::new(
                            "re",
                            vec![
                                real(cell_left),
                                real(top - row_height),
                                real(cell_width),
                                real(row_height),
                            ],
                        ),
                        Operation::new("S", vec![]),
                        Operation::new("Q", vec![]),
                    ]);
                }
            }
            self.cursor -= row_height;
        }
        Ok(())
    }

    fn write_outline(&mut self, page_ids: &[ObjectId]) -> Option<ObjectId> {
        if self.bookmarks.is_empty() {
            return None;
        }
        let outlines_id = self.doc.new_object_id();
        let item_ids: Vec<ObjectId> = (0..self.bookmarks.len())
            .map(|_| self.doc.new_object_id())
            .collect();

        for (i, mark) in self.bookmarks.iter().enumerate() {
            let page_id = page_ids[mark.page.min(page_ids.len() - 1)];
            let mut item = dictionary! {
                "Title" => text_object(&mark.title),
                "Parent" => outlines_id,
                "Dest" => vec![
                    Object::Reference(page_id),
                    "XYZ".into(),
                    real(self.theme.margin),
                    real(mark.top),
                    Object::Null,
                ],
            };
            if i > 0 {
                item.set("Prev", item_ids[i - 1]);
            }
            if let Some(next) = item_ids.get(i + 1) {
                item.set("Next", *next);
            }
            self.doc.objects.insert(item_ids[i], Object::Dictionary(item));
        }

        let outlines = dictionary! {
            "Type" => "Outlines",
            "First" => item_ids[0],
            "Last" => item_ids[item_ids.len() - 1],
            "Count" => item_ids.len() as i64,
        };
        self.doc
            .objects
            .insert(outlines_id, Object::Dictionary(outlines));
        Some(outlines_id)
    }

    fn finish(mut self, metadata: &DocumentMetadata) -> Result<RenderedPdf, PdfError> {
        let pages_id = self.doc.new_object_id();
        let mut page_ids = Vec::with_capacity(self.pages.len());
        for operations in std::mem::take(&mut self.pages) {
            let content = Content { operations };
            let content_id = self
                .doc
                .add_object(Stream::new(dictionary! {}, content.encode()?));
            page_ids.push(self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            }));
        }

        let resources_id = self.doc.add_object(dictionary! {
            "Font" => std::mem::take(&mut self.fonts),
            "XObject" => std::mem::take(&mut self.xobjects),
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => page_ids.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), real(self.width), real(self.height)],
        };
        self.doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if let Some(outlines_id) = self.write_outline(&page_ids) {
            catalog.set("Outlines", outlines_id);
            catalog.set("PageMode", "UseOutlines");
        }
        let catalog_id = self.doc.add_object(catalog);
        self.doc.trailer.set("Root", catalog_id);

        let created = metadata.created.format("D:%Y%m%d%H%M%S+00'00'").to_string();
        let info_id = self.doc.add_object(dictionary! {
            "Title" => text_object(&metadata.title),
            "Author" => text_object(&metadata.author),
            "Creator" => text_object(&metadata.creator),
            "Producer" => text_object(PRODUCER),
            "CreationDate" => text_object(&created),
        });
        self.doc.trailer.set("Info", info_id);

        self.doc.compress();
        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| PdfError::Pdf(e.into()))?;

        Ok(RenderedPdf {
            bytes,
            pages: page_ids.len(),
            images: self.images.len(),
        })
    }
}

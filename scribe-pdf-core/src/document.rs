//! Document assembly: options, resource registration, page lifecycle and
//! serialization entry points.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{PdfError, Result};
use crate::graphics::DrawingContext;
use crate::page::{Page, PageBox, PageBoxes};
use crate::resources::{FontId, IccProfileId, ImageId, ResourceStore};
use crate::writer::PdfWriter;

/// Document-level options, fixed when the document is created.
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    pub(crate) title: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) page_boxes: PageBoxes,
    pub(crate) compress: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            title: None,
            author: None,
            page_boxes: PageBoxes::default(),
            compress: true,
        }
    }
}

impl DocumentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_author(&mut self, author: impl Into<String>) -> &mut Self {
        self.author = Some(author.into());
        self
    }

    /// Set a page box for all pages of the document. Setting the same box
    /// kind again replaces the earlier rectangle.
    pub fn set_page_box(
        &mut self,
        kind: PageBox,
        llx: f64,
        lly: f64,
        urx: f64,
        ury: f64,
    ) -> &mut Self {
        self.page_boxes
            .set(kind, crate::geometry::Rectangle::from_coordinates(llx, lly, urx, ury));
        self
    }

    /// Disable content stream compression, e.g. for debugging output.
    pub fn set_compress(&mut self, compress: bool) -> &mut Self {
        self.compress = compress;
        self
    }
}

/// An in-memory PDF document under construction.
///
/// Resources are registered up front, pages are built one at a time
/// through [`DrawingContext`]s, and nothing touches the filesystem until
/// [`write`](Self::write).
///
/// ```no_run
/// use scribe_pdf::{Color, Document, DocumentOptions};
///
/// # fn main() -> scribe_pdf::Result<()> {
/// let mut doc = Document::new(DocumentOptions::new());
/// let mut ctx = doc.page_context();
/// ctx.set_fill_color(Color::rgb(0.9, 0.1, 0.1)?)?;
/// ctx.rect(100.0, 100.0, 200.0, 150.0).fill();
/// doc.add_page(ctx)?;
/// doc.write("out.pdf")?;
/// # Ok(())
/// # }
/// ```
pub struct Document {
    pages: Vec<Page>,
    resources: ResourceStore,
    options: DocumentOptions,
    creation_date: DateTime<Utc>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DocumentOptions::default())
    }
}

impl Document {
    pub fn new(options: DocumentOptions) -> Self {
        Self {
            pages: Vec::new(),
            resources: ResourceStore::default(),
            options,
            creation_date: Utc::now(),
        }
    }

    // --- Resource registration ------------------------------------------

    /// Register a TrueType/OpenType font file.
    pub fn load_font(&mut self, path: impl AsRef<Path>) -> Result<FontId> {
        self.resources.load_font(path.as_ref())
    }

    /// Register a raster image (PNG, JPEG or TIFF). The image is re-encoded
    /// losslessly into the document.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<ImageId> {
        self.resources.load_image(path.as_ref())
    }

    /// Register a JPEG file whose compressed data is embedded as-is.
    pub fn embed_jpg(&mut self, path: impl AsRef<Path>) -> Result<ImageId> {
        self.resources.embed_jpg(path.as_ref())
    }

    /// Register an ICC color profile for ICC-based colors.
    pub fn load_icc_profile(&mut self, path: impl AsRef<Path>) -> Result<IccProfileId> {
        self.resources.load_icc_profile(path.as_ref())
    }

    // --- Text measurement -----------------------------------------------

    /// Width of `text` in points when set in `font` at `size`.
    pub fn text_width(&self, font: FontId, text: &str, size: f64) -> Result<f64> {
        Ok(self.resources.font(font)?.metrics.width_of(text, size))
    }

    /// Metrics of a registered font, for standalone measurement.
    pub fn font_metrics(&self, font: FontId) -> Result<&crate::text::FontMetrics> {
        Ok(&self.resources.font(font)?.metrics)
    }

    /// Wrap `text` into lines no wider than `max_width` points.
    pub fn wrap_text(
        &self,
        font: FontId,
        text: &str,
        size: f64,
        max_width: f64,
    ) -> Result<Vec<String>> {
        let metrics = &self.resources.font(font)?.metrics;
        Ok(crate::text::wrap_text(metrics, text, size, max_width))
    }

    // --- Page lifecycle -------------------------------------------------

    /// Open a drawing context for a new page.
    ///
    /// The context validates resource handles against what is registered
    /// right now, so register fonts, images and profiles before opening the
    /// context that uses them. Dropping the context without passing it to
    /// [`add_page`](Self::add_page) abandons the page.
    pub fn page_context(&self) -> DrawingContext {
        DrawingContext::new(self.options.page_boxes.clone(), self.resources.summary())
    }

    /// Commit a finished drawing context as the document's next page.
    ///
    /// Fails with [`PdfError::UnbalancedState`] if the context has unmatched
    /// graphics state pushes, or with [`PdfError::InvalidResource`] if the
    /// context references resources this document does not hold (a context
    /// created by a different document); the page is not added in either
    /// case.
    pub fn add_page(&mut self, ctx: DrawingContext) -> Result<()> {
        let page = ctx.finish()?;
        self.check_page_resources(&page)?;
        debug!(page = self.pages.len(), bytes = page.content.len(), "page committed");
        self.pages.push(page);
        Ok(())
    }

    // Contexts validate handles against a snapshot, so a context built
    // against another document's store can carry indices this store has
    // never issued. Catch that here rather than at serialization time.
    fn check_page_resources(&self, page: &Page) -> Result<()> {
        let summary = self.resources.summary();
        for &index in &page.used_fonts {
            summary.check_font(FontId::new(index))?;
        }
        for &index in &page.used_images {
            summary.check_image(ImageId::new(index))?;
        }
        for &index in &page.used_profiles {
            summary.check_profile(IccProfileId::new(index))?;
        }
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    // --- Serialization --------------------------------------------------

    /// Serialize the document into PDF bytes.
    ///
    /// Fails with [`PdfError::EmptyDocument`] when no pages have been
    /// committed.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(PdfError::EmptyDocument);
        }
        let mut buffer = Vec::new();
        let mut writer = PdfWriter::new(&mut buffer);
        writer.write_document(&self.pages, &self.resources, &self.options, self.creation_date)?;
        Ok(buffer)
    }

    /// Serialize the document and write it to `path`.
    ///
    /// The file is created only after serialization succeeds; a failing
    /// document never leaves a partial file behind.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        fs::write(path.as_ref(), &bytes)?;
        info!(
            path = %path.as_ref().display(),
            pages = self.pages.len(),
            bytes = bytes.len(),
            "document written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_fails_to_serialize() {
        let doc = Document::default();
        let err = doc.to_bytes().unwrap_err();
        assert!(matches!(err, PdfError::EmptyDocument));
    }

    #[test]
    fn test_add_page_grows_page_count() {
        let mut doc = Document::default();
        assert_eq!(doc.page_count(), 0);

        let ctx = doc.page_context();
        doc.add_page(ctx).unwrap();
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_abandoned_context_leaves_document_unchanged() {
        let mut doc = Document::default();
        {
            let mut ctx = doc.page_context();
            ctx.rect(0.0, 0.0, 10.0, 10.0).fill();
            // dropped without add_page
        }
        assert_eq!(doc.page_count(), 0);

        let ctx = doc.page_context();
        doc.add_page(ctx).unwrap();
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_unbalanced_context_is_not_added() {
        let mut doc = Document::default();
        let mut ctx = doc.page_context();
        ctx.push_gstate();
        let err = doc.add_page(ctx).unwrap_err();
        assert!(matches!(err, PdfError::UnbalancedState(_)));
        assert_eq!(doc.page_count(), 0);
    }

    #[test]
    fn test_context_from_another_document_is_rejected() {
        use crate::resources::ResourceSummary;

        // A context whose snapshot claims a font this document never loaded
        let foreign_summary = ResourceSummary {
            font_count: 1,
            image_count: 0,
            icc_channels: Vec::new(),
        };
        let mut ctx = DrawingContext::new(PageBoxes::default(), foreign_summary);
        ctx.render_text("stray", FontId::new(0), 12.0, 0.0, 0.0).unwrap();

        let mut doc = Document::default();
        let err = doc.add_page(ctx).unwrap_err();
        assert!(matches!(err, PdfError::InvalidResource(_)));
        assert_eq!(doc.page_count(), 0);
    }

    #[test]
    fn test_text_width_with_unknown_font_fails() {
        let doc = Document::default();
        let err = doc.text_width(FontId::new(0), "hi", 12.0).unwrap_err();
        assert!(matches!(err, PdfError::InvalidResource(_)));
    }

    #[test]
    fn test_options_builder() {
        let mut options = DocumentOptions::new();
        options
            .set_title("Slides")
            .set_author("presenter")
            .set_page_box(PageBox::Media, 0.0, 0.0, 640.0, 480.0)
            .set_compress(false);

        assert_eq!(options.title.as_deref(), Some("Slides"));
        assert_eq!(options.author.as_deref(), Some("presenter"));
        assert_eq!(options.page_boxes.media_box().width(), 640.0);
        assert!(!options.compress);
    }
}

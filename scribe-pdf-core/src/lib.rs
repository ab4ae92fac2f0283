//! A PDF construction engine.
//!
//! Documents are built in memory: register fonts, images and ICC color
//! profiles up front, draw each page through a [`DrawingContext`], then
//! serialize the whole document in one step. Content streams carry
//! correctly scoped graphics state, paths, colors and text; the engine
//! validates parameters, resource handles and save/restore balance while
//! the page is being built.
//!
//! ```no_run
//! use scribe_pdf::{Color, Document, DocumentOptions};
//!
//! # fn main() -> scribe_pdf::Result<()> {
//! let mut options = DocumentOptions::new();
//! options.set_title("Example");
//!
//! let mut doc = Document::new(options);
//! let mut ctx = doc.page_context();
//! ctx.set_fill_color(Color::rgb(0.2, 0.4, 0.9)?)?;
//! ctx.rect(72.0, 72.0, 200.0, 100.0).fill();
//! doc.add_page(ctx)?;
//! doc.write("example.pdf")?;
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod geometry;
pub mod graphics;
pub mod objects;
pub mod page;
pub mod text;

mod resources;
mod writer;

pub use document::{Document, DocumentOptions};
pub use error::{PdfError, Result};
pub use geometry::{Matrix, Point, Rectangle};
pub use graphics::{Color, DrawingContext, GraphicsState, LineCap, LineJoin};
pub use page::{PageBox, Transition, TransitionType};
pub use resources::{FontId, IccProfileId, ImageId};
pub use text::{measure_text, wrap_text, FontMetrics, TextObject, TextRenderMode};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Page content construction.
//!
//! A [`DrawingContext`] wraps one page in progress. It appends content
//! stream operators while tracking the graphics state those operators
//! produce, so that save/restore mismatches and invalid parameters are
//! caught at build time instead of by a PDF viewer.

mod color;
mod path;
mod state;

pub use color::Color;
pub use path::{LineCap, LineJoin};
pub use state::GraphicsState;

use std::collections::BTreeSet;
use std::fmt::Write;

use path::{PathBuilder, PathCommand};
use state::StateStack;

use crate::error::{PdfError, Result};
use crate::geometry::Matrix;
use crate::page::{Page, PageBoxes, Transition};
use crate::resources::{FontId, ImageId, ResourceSummary};
use crate::text::{escape_text, TextObject};

/// Builds the content stream of one page.
///
/// Obtained from [`Document::page_context`](crate::Document::page_context)
/// and committed with [`Document::add_page`](crate::Document::add_page).
/// Dropping a context without committing it abandons the page; the
/// document is left unchanged.
#[derive(Debug)]
pub struct DrawingContext {
    operations: String,
    state: GraphicsState,
    stack: StateStack,
    path: PathBuilder,
    boxes: PageBoxes,
    transition: Option<Transition>,
    resources: ResourceSummary,
    used_fonts: BTreeSet<u32>,
    used_images: BTreeSet<u32>,
    used_profiles: BTreeSet<u32>,
}

impl DrawingContext {
    pub(crate) fn new(boxes: PageBoxes, resources: ResourceSummary) -> Self {
        Self {
            operations: String::new(),
            state: GraphicsState::default(),
            stack: StateStack::default(),
            path: PathBuilder::default(),
            boxes,
            transition: None,
            resources,
            used_fonts: BTreeSet::new(),
            used_images: BTreeSet::new(),
            used_profiles: BTreeSet::new(),
        }
    }

    // --- Graphics state -------------------------------------------------

    /// Save the current graphics state (`q`).
    ///
    /// Every push must be matched by [`pop_gstate`](Self::pop_gstate)
    /// before the context is committed.
    pub fn push_gstate(&mut self) -> &mut Self {
        self.stack.push(self.state.clone());
        self.operations.push_str("q\n");
        self
    }

    /// Restore the most recently saved graphics state (`Q`).
    pub fn pop_gstate(&mut self) -> Result<&mut Self> {
        let saved = self.stack.pop().ok_or_else(|| {
            PdfError::UnbalancedState("pop without matching push".to_string())
        })?;
        self.state = saved;
        self.operations.push_str("Q\n");
        Ok(self)
    }

    /// Run `f` inside a saved graphics state scope.
    ///
    /// The state is restored on every exit path, including when `f` fails.
    pub fn with_gstate<F>(&mut self, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.push_gstate();
        let outcome = f(self);
        self.pop_gstate()?;
        outcome?;
        Ok(self)
    }

    /// The graphics state the next operator will be drawn under.
    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    /// Number of saved states not yet restored.
    pub fn gstate_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn set_line_width(&mut self, width: f64) -> Result<&mut Self> {
        if width < 0.0 || width.is_nan() {
            return Err(PdfError::InvalidParameter(format!(
                "negative line width: {width}"
            )));
        }
        writeln!(&mut self.operations, "{width:.2} w").unwrap();
        self.state.line_width = width;
        Ok(self)
    }

    pub fn set_line_cap(&mut self, cap: LineCap) -> &mut Self {
        writeln!(&mut self.operations, "{} J", cap as u8).unwrap();
        self.state.line_cap = cap;
        self
    }

    pub fn set_line_join(&mut self, join: LineJoin) -> &mut Self {
        writeln!(&mut self.operations, "{} j", join as u8).unwrap();
        self.state.line_join = join;
        self
    }

    pub fn set_stroke_color(&mut self, color: Color) -> Result<&mut Self> {
        self.emit_color(&color, true)?;
        self.state.stroke_color = color;
        Ok(self)
    }

    pub fn set_fill_color(&mut self, color: Color) -> Result<&mut Self> {
        self.emit_color(&color, false)?;
        self.state.fill_color = color;
        Ok(self)
    }

    fn emit_color(&mut self, color: &Color, stroke: bool) -> Result<()> {
        match color {
            Color::Gray(v) => {
                let op = if stroke { "G" } else { "g" };
                writeln!(&mut self.operations, "{v:.3} {op}").unwrap();
            }
            Color::Rgb { r, g, b } => {
                let op = if stroke { "RG" } else { "rg" };
                writeln!(&mut self.operations, "{r:.3} {g:.3} {b:.3} {op}").unwrap();
            }
            Color::Cmyk { c, m, y, k } => {
                let op = if stroke { "K" } else { "k" };
                writeln!(&mut self.operations, "{c:.3} {m:.3} {y:.3} {k:.3} {op}").unwrap();
            }
            Color::Icc(profile, components) => {
                self.resources.check_icc_color(*profile, components)?;
                self.used_profiles.insert(profile.index());
                let space_op = if stroke { "CS" } else { "cs" };
                let set_op = if stroke { "SCN" } else { "scn" };
                writeln!(&mut self.operations, "/CS{} {space_op}", profile.index()).unwrap();
                for value in components {
                    write!(&mut self.operations, "{value:.3} ").unwrap();
                }
                writeln!(&mut self.operations, "{set_op}").unwrap();
            }
        }
        Ok(())
    }

    // --- Transformations ------------------------------------------------

    pub fn translate(&mut self, tx: f64, ty: f64) -> &mut Self {
        writeln!(&mut self.operations, "1 0 0 1 {tx:.2} {ty:.2} cm").unwrap();
        self.state.ctm = self.state.ctm.then(&Matrix::translation(tx, ty));
        self
    }

    pub fn scale(&mut self, sx: f64, sy: f64) -> &mut Self {
        writeln!(&mut self.operations, "{sx:.2} 0 0 {sy:.2} 0 0 cm").unwrap();
        self.state.ctm = self.state.ctm.then(&Matrix::scaling(sx, sy));
        self
    }

    /// Rotate the user space counter-clockwise by `angle` radians.
    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        let (sin, cos) = angle.sin_cos();
        writeln!(
            &mut self.operations,
            "{cos:.6} {sin:.6} {:.6} {cos:.6} 0 0 cm",
            -sin
        )
        .unwrap();
        self.state.ctm = self.state.ctm.then(&Matrix::rotation(angle));
        self
    }

    pub fn concat_matrix(&mut self, m: Matrix) -> &mut Self {
        writeln!(
            &mut self.operations,
            "{:.4} {:.4} {:.4} {:.4} {:.4} {:.4} cm",
            m.a, m.b, m.c, m.d, m.e, m.f
        )
        .unwrap();
        self.state.ctm = self.state.ctm.then(&m);
        self
    }

    // --- Path construction ----------------------------------------------

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.path.push(PathCommand::MoveTo { x, y });
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.path.push(PathCommand::LineTo { x, y });
        self
    }

    /// Append a cubic Bézier from the current point with control points
    /// (x1,y1) and (x2,y2) ending at (x3,y3).
    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> &mut Self {
        self.path.push(PathCommand::CurveTo { x1, y1, x2, y2, x3, y3 });
        self
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.path.push(PathCommand::Rect { x, y, width, height });
        self
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.path.push(PathCommand::Close);
        self
    }

    // --- Painting -------------------------------------------------------

    pub fn stroke(&mut self) -> &mut Self {
        self.paint("S")
    }

    pub fn fill(&mut self) -> &mut Self {
        self.paint("f")
    }

    pub fn fill_even_odd(&mut self) -> &mut Self {
        self.paint("f*")
    }

    pub fn stroke_and_fill(&mut self) -> &mut Self {
        self.paint("B")
    }

    pub fn stroke_and_fill_even_odd(&mut self) -> &mut Self {
        self.paint("B*")
    }

    /// Discard the current path without painting it (`n`).
    pub fn end_path(&mut self) -> &mut Self {
        self.paint("n")
    }

    fn paint(&mut self, operator: &str) -> &mut Self {
        // Painting an empty path is a no-op, not an error
        if self.path.is_empty() {
            return self;
        }
        for command in self.path.take() {
            match command {
                PathCommand::MoveTo { x, y } => {
                    writeln!(&mut self.operations, "{x:.2} {y:.2} m").unwrap();
                }
                PathCommand::LineTo { x, y } => {
                    writeln!(&mut self.operations, "{x:.2} {y:.2} l").unwrap();
                }
                PathCommand::CurveTo { x1, y1, x2, y2, x3, y3 } => {
                    writeln!(
                        &mut self.operations,
                        "{x1:.2} {y1:.2} {x2:.2} {y2:.2} {x3:.2} {y3:.2} c"
                    )
                    .unwrap();
                }
                PathCommand::Rect { x, y, width, height } => {
                    writeln!(&mut self.operations, "{x:.2} {y:.2} {width:.2} {height:.2} re")
                        .unwrap();
                }
                PathCommand::Close => {
                    self.operations.push_str("h\n");
                }
            }
        }
        writeln!(&mut self.operations, "{operator}").unwrap();
        self
    }

    // --- Images ---------------------------------------------------------

    /// Paint an image into the unit square of the current transform.
    ///
    /// Scale and position first, typically inside a gstate scope:
    /// translate to the target corner, scale to the target size, then draw.
    pub fn draw_image(&mut self, image: ImageId) -> Result<&mut Self> {
        self.resources.check_image(image)?;
        self.used_images.insert(image.index());
        writeln!(&mut self.operations, "/Im{} Do", image.index()).unwrap();
        Ok(self)
    }

    // --- Text -----------------------------------------------------------

    /// Show a single line of text at (x, y) in the given font and size.
    pub fn render_text(
        &mut self,
        text: &str,
        font: FontId,
        size: f64,
        x: f64,
        y: f64,
    ) -> Result<&mut Self> {
        self.resources.check_font(font)?;
        self.used_fonts.insert(font.index());
        self.operations.push_str("BT\n");
        writeln!(&mut self.operations, "/F{} {} Tf", font.index(), size).unwrap();
        writeln!(&mut self.operations, "{x:.2} {y:.2} Td").unwrap();
        self.operations.push('(');
        escape_text(text, &mut self.operations);
        self.operations.push_str(") Tj\nET\n");
        Ok(self)
    }

    /// Replay a prepared [`TextObject`] into this page.
    pub fn render_text_object(&mut self, obj: &TextObject) -> Result<&mut Self> {
        for &index in obj.used_fonts() {
            self.resources.check_font(FontId::new(index))?;
        }
        self.used_fonts.extend(obj.used_fonts().iter().copied());
        self.operations.push_str("BT\n");
        self.operations.push_str(obj.operations());
        self.operations.push_str("ET\n");
        Ok(self)
    }

    // --- Page metadata --------------------------------------------------

    /// Attach a presentation transition to this page. A later call
    /// replaces an earlier one.
    pub fn set_page_transition(&mut self, transition: Transition) -> &mut Self {
        self.transition = Some(transition);
        self
    }

    #[cfg(test)]
    pub(crate) fn operations(&self) -> &str {
        &self.operations
    }

    pub(crate) fn finish(self) -> Result<Page> {
        if self.stack.depth() != 0 {
            return Err(PdfError::UnbalancedState(format!(
                "{} unmatched graphics state push(es) at page commit",
                self.stack.depth()
            )));
        }
        Ok(Page {
            content: self.operations.into_bytes(),
            boxes: self.boxes,
            transition: self.transition,
            used_fonts: self.used_fonts,
            used_images: self.used_images,
            used_profiles: self.used_profiles,
        })
    }
}

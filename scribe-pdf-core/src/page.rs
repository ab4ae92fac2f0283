//! Committed pages and their metadata: page boxes and presentation
//! transitions.

use std::collections::BTreeSet;

use crate::geometry::Rectangle;

/// The five page boundary boxes defined by PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBox {
    Media,
    Crop,
    Bleed,
    Trim,
    Art,
}

impl PageBox {
    pub(crate) fn pdf_key(&self) -> &'static str {
        match self {
            PageBox::Media => "MediaBox",
            PageBox::Crop => "CropBox",
            PageBox::Bleed => "BleedBox",
            PageBox::Trim => "TrimBox",
            PageBox::Art => "ArtBox",
        }
    }
}

/// Page boxes set on a page, in insertion order.
///
/// Every page has a MediaBox; the default is A4 in points. The other boxes
/// are only written when set.
#[derive(Debug, Clone)]
pub(crate) struct PageBoxes {
    boxes: Vec<(PageBox, Rectangle)>,
}

impl Default for PageBoxes {
    fn default() -> Self {
        Self {
            boxes: vec![(PageBox::Media, Rectangle::from_coordinates(0.0, 0.0, 595.0, 842.0))],
        }
    }
}

impl PageBoxes {
    pub fn set(&mut self, kind: PageBox, rect: Rectangle) {
        if let Some(entry) = self.boxes.iter_mut().find(|(k, _)| *k == kind) {
            entry.1 = rect;
        } else {
            self.boxes.push((kind, rect));
        }
    }

    #[cfg(test)]
    pub fn media_box(&self) -> Rectangle {
        // Default always carries a MediaBox and set() never removes one
        self.boxes
            .iter()
            .find(|(k, _)| *k == PageBox::Media)
            .map(|(_, r)| *r)
            .unwrap_or_else(|| Rectangle::from_coordinates(0.0, 0.0, 595.0, 842.0))
    }

    pub fn iter(&self) -> impl Iterator<Item = &(PageBox, Rectangle)> {
        self.boxes.iter()
    }
}

/// Page transition styles for presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionType {
    Split,
    Blinds,
    Box,
    Wipe,
    Dissolve,
    Glitter,
    R,
    Fly,
    Push,
    Cover,
    Uncover,
    Fade,
}

impl TransitionType {
    pub(crate) fn pdf_name(&self) -> &'static str {
        match self {
            TransitionType::Split => "Split",
            TransitionType::Blinds => "Blinds",
            TransitionType::Box => "Box",
            TransitionType::Wipe => "Wipe",
            TransitionType::Dissolve => "Dissolve",
            TransitionType::Glitter => "Glitter",
            TransitionType::R => "R",
            TransitionType::Fly => "Fly",
            TransitionType::Push => "Push",
            TransitionType::Cover => "Cover",
            TransitionType::Uncover => "Uncover",
            TransitionType::Fade => "Fade",
        }
    }
}

/// A page transition: style plus duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub kind: TransitionType,
    pub duration: f64,
}

impl Transition {
    pub fn new(kind: TransitionType, duration: f64) -> Self {
        Self { kind, duration }
    }
}

/// A finished page: its content stream plus everything the writer needs to
/// build the page dictionary.
#[derive(Debug)]
pub(crate) struct Page {
    pub content: Vec<u8>,
    pub boxes: PageBoxes,
    pub transition: Option<Transition>,
    pub used_fonts: BTreeSet<u32>,
    pub used_images: BTreeSet<u32>,
    pub used_profiles: BTreeSet<u32>,
}

//! Color values for stroking and filling.

use crate::error::{PdfError, Result};
use crate::resources::IccProfileId;

/// A color in one of the supported color spaces.
///
/// Component values are validated on construction, so a held `Color` is
/// always in range.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// DeviceGray, one component.
    Gray(f64),
    /// DeviceRGB, three components.
    Rgb { r: f64, g: f64, b: f64 },
    /// DeviceCMYK, four components.
    Cmyk { c: f64, m: f64, y: f64, k: f64 },
    /// ICCBased color space; the component count must match the profile.
    Icc(IccProfileId, Vec<f64>),
}

impl Color {
    pub fn gray(value: f64) -> Result<Self> {
        check_component("gray", value)?;
        Ok(Color::Gray(value))
    }

    pub fn rgb(r: f64, g: f64, b: f64) -> Result<Self> {
        check_component("red", r)?;
        check_component("green", g)?;
        check_component("blue", b)?;
        Ok(Color::Rgb { r, g, b })
    }

    pub fn cmyk(c: f64, m: f64, y: f64, k: f64) -> Result<Self> {
        check_component("cyan", c)?;
        check_component("magenta", m)?;
        check_component("yellow", y)?;
        check_component("black", k)?;
        Ok(Color::Cmyk { c, m, y, k })
    }

    /// A color in the space described by an ICC profile. The component count
    /// is checked against the profile when the color is used on a page.
    pub fn icc(profile: IccProfileId, components: Vec<f64>) -> Result<Self> {
        for &value in &components {
            check_component("ICC", value)?;
        }
        Ok(Color::Icc(profile, components))
    }

    pub fn black() -> Self {
        Color::Gray(0.0)
    }

    pub fn white() -> Self {
        Color::Gray(1.0)
    }
}

fn check_component(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(PdfError::InvalidColor(format!(
            "{name} component {value} is outside 0.0..=1.0"
        )));
    }
    Ok(())
}

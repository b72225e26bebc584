// src/preview/layout.rs
//! Simulated A4 page: everything scales with the measured container width

use serde::Serialize;

/// A4 at 96 dpi: 210mm -> 794px
pub const REFERENCE_PAGE_WIDTH_PX: f64 = 794.0;
pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub width_px: f64,
    pub height_px: f64,
    /// Applied uniformly to typography and spacing
    pub scale: f64,
}

impl PageGeometry {
    /// Negative or non-finite widths are treated as "not measured yet"
    pub fn for_width(container_width: f64) -> Self {
        let width = if container_width.is_finite() && container_width > 0.0 {
            container_width
        } else {
            0.0
        };

        Self {
            width_px: width,
            height_px: width * A4_HEIGHT_MM / A4_WIDTH_MM,
            scale: width / REFERENCE_PAGE_WIDTH_PX,
        }
    }

    /// Nothing is shown until the container has been measured
    pub fn is_measured(&self) -> bool {
        self.width_px > 0.0
    }
}

//! Slide geometry for exercise slides.
//!
//! All positions are in EMU. The picture sits on the left; the answer boxes
//! form a vertically centered stack on the right.

use crate::types::{inches, Placement};

/// Geometry used to place the picture and the answer boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideLayout {
    /// Slide width in EMU.
    pub slide_width: i64,

    /// Slide height in EMU.
    pub slide_height: i64,

    /// Left edge of the picture.
    pub picture_left: i64,

    /// Top edge of the picture.
    pub picture_top: i64,

    /// Picture width; height follows the image's aspect ratio.
    pub picture_width: i64,

    /// Width of each answer box.
    pub choice_width: i64,

    /// Height of each answer box before any fit-to-slide scaling.
    pub choice_height: i64,

    /// Vertical gap between answer boxes before any fit-to-slide scaling.
    pub choice_spacing: i64,

    /// Left edge of the answer stack as a fraction of the slide width.
    pub choice_left_ratio: f64,
}

impl Default for SlideLayout {
    fn default() -> Self {
        Self {
            slide_width: inches(10.0),
            slide_height: inches(7.5),
            picture_left: inches(1.0),
            picture_top: inches(1.9),
            picture_width: inches(4.0),
            choice_width: inches(3.0),
            choice_height: inches(1.0),
            choice_spacing: inches(0.5),
            choice_left_ratio: 0.6,
        }
    }
}

/// Resolved vertical metrics of an answer stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackMetrics {
    /// Top edge of the first box.
    pub top: i64,

    /// Height of each box.
    pub height: i64,

    /// Gap between consecutive boxes.
    pub spacing: i64,
}

impl StackMetrics {
    /// Total height of `count` boxes with their gaps.
    pub fn total(&self, count: usize) -> i64 {
        if count == 0 {
            return 0;
        }
        let n = count as i64;
        n * self.height + (n - 1) * self.spacing
    }
}

impl SlideLayout {
    /// Compute the centered stack for `count` boxes.
    ///
    /// A stack taller than the slide is scaled down proportionally so that it
    /// fits; centering is always computed from the resolved height and gap.
    pub fn stack(&self, count: usize) -> StackMetrics {
        let mut metrics = StackMetrics {
            top: 0,
            height: self.choice_height,
            spacing: self.choice_spacing,
        };

        let natural = metrics.total(count);
        if natural > self.slide_height && natural > 0 {
            let scale = self.slide_height as f64 / natural as f64;
            metrics.height = (self.choice_height as f64 * scale).floor() as i64;
            metrics.spacing = (self.choice_spacing as f64 * scale).floor() as i64;
        }

        metrics.top = (self.slide_height - metrics.total(count)) / 2;
        metrics
    }

    /// Placements of `count` answer boxes, top to bottom.
    pub fn choice_placements(&self, count: usize) -> Vec<Placement> {
        let metrics = self.stack(count);
        let x = (self.slide_width as f64 * self.choice_left_ratio).round() as i64;

        (0..count as i64)
            .map(|i| Placement {
                x,
                y: metrics.top + i * (metrics.height + metrics.spacing),
                cx: self.choice_width,
                cy: metrics.height,
            })
            .collect()
    }

    /// Placement of the picture for an image of the given pixel size.
    ///
    /// Unknown sizes are treated as square. A picture too tall for the slide
    /// is shrunk, keeping its aspect ratio, until its bottom edge fits.
    pub fn picture_placement(&self, dimensions: Option<(u32, u32)>) -> Placement {
        let (px_w, px_h) = dimensions.unwrap_or((1, 1));
        let aspect = px_h as f64 / px_w as f64;

        let mut cx = self.picture_width;
        let mut cy = (cx as f64 * aspect).round() as i64;

        let room = self.slide_height - self.picture_top;
        if cy > room && room > 0 {
            cy = room;
            cx = (cy as f64 / aspect).round() as i64;
        }

        Placement {
            x: self.picture_left,
            y: self.picture_top,
            cx,
            cy,
        }
    }
}

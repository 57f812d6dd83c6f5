/// Template matching data types
use image::{DynamicImage, GrayImage};
use serde::Serialize;
use std::sync::Arc;

/// One captured screenshot of the target window
#[derive(Clone, Debug)]
pub struct Frame {
    /// Luma pixels of the window client area
    pixels: Arc<GrayImage>,
    /// Global display coordinates of the frame's top-left corner
    origin: (i32, i32),
}

impl Frame {
    pub fn new(pixels: GrayImage, origin: (i32, i32)) -> Self {
        Self {
            pixels: Arc::new(pixels),
            origin,
        }
    }

    /// Build a frame from any decoded image, converting to luma
    pub fn from_dynamic(image: &DynamicImage, origin: (i32, i32)) -> Self {
        Self::new(image.to_luma8(), origin)
    }

    pub fn pixels(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// A saved reference image with its logical name
#[derive(Clone, Debug)]
pub struct Template {
    /// Logical name, the file stem it was saved under (e.g. "Battle")
    pub name: String,
    pub pixels: GrayImage,
}

impl Template {
    pub fn new(name: impl Into<String>, pixels: GrayImage) -> Self {
        Self {
            name: name.into(),
            pixels,
        }
    }

    pub fn from_dynamic(name: impl Into<String>, image: &DynamicImage) -> Self {
        Self::new(name, image.to_luma8())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Whether this template can be aligned anywhere inside a frame of the given size
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width() > 0 && self.height() > 0 && self.width() <= width && self.height() <= height
    }
}

/// Best alignment of a template inside a frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MatchResult {
    /// False when the template cannot be aligned at all (larger than the frame)
    pub found: bool,
    /// Frame-local top-left corner; meaningless when `found` is false
    pub location: (u32, u32),
    /// Similarity score (0.0-1.0) at `location`
    pub confidence: f32,
    pub template_size: (u32, u32),
}

impl MatchResult {
    pub fn not_found(template_size: (u32, u32)) -> Self {
        Self {
            found: false,
            location: (0, 0),
            confidence: 0.0,
            template_size,
        }
    }

    /// Click target at the template centre, in global display coordinates
    pub fn actionable_point(&self, frame_origin: (i32, i32)) -> Option<ActionablePoint> {
        if !self.found {
            return None;
        }
        let (w, h) = self.template_size;
        Some(ActionablePoint {
            x: frame_origin.0 + (self.location.0 + w / 2) as i32,
            y: frame_origin.1 + (self.location.1 + h / 2) as i32,
        })
    }

    /// Why the template could not be aligned against a `frame_size` frame, if it could not
    pub fn unmatchable_reason(&self, frame_size: (u32, u32)) -> Option<String> {
        if self.found {
            return None;
        }
        let (w, h) = self.template_size;
        if w == 0 || h == 0 {
            return Some(format!("template is empty ({}x{})", w, h));
        }
        Some(format!(
            "template ({}x{}) is larger than the captured frame ({}x{})",
            w, h, frame_size.0, frame_size.1
        ))
    }

    /// Format result with confidence percentage
    pub fn describe(&self, name: &str) -> String {
        if !self.found {
            return format!("{} does not fit in frame", name);
        }
        format!(
            "{} at ({},{}) - {:.1}%",
            name,
            self.location.0,
            self.location.1,
            self.confidence * 100.0
        )
    }
}

/// A global display coordinate suitable for a click
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ActionablePoint {
    pub x: i32,
    pub y: i32,
}

impl ActionablePoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl std::fmt::Display for ActionablePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actionable_point_is_template_center() {
        // Match at (100, 150) for a 50x30 template, frame origin (20, -40)
        let result = MatchResult {
            found: true,
            location: (100, 150),
            confidence: 0.95,
            template_size: (50, 30),
        };
        let point = result.actionable_point((20, -40)).unwrap();
        assert_eq!(point, ActionablePoint::new(20 + 125, -40 + 165));
    }

    #[test]
    fn test_odd_template_size_rounds_down() {
        let result = MatchResult {
            found: true,
            location: (0, 0),
            confidence: 1.0,
            template_size: (5, 7),
        };
        assert_eq!(
            result.actionable_point((0, 0)),
            Some(ActionablePoint::new(2, 3))
        );
    }

    #[test]
    fn test_not_found_has_no_point() {
        let result = MatchResult::not_found((10, 10));
        assert!(result.actionable_point((0, 0)).is_none());
    }

    #[test]
    fn test_template_fits_within() {
        let template = Template::new("Battle", GrayImage::new(10, 20));
        assert!(template.fits_within(10, 20));
        assert!(!template.fits_within(9, 20));
        assert!(!template.fits_within(10, 19));

        let empty = Template::new("empty", GrayImage::new(0, 0));
        assert!(!empty.fits_within(10, 10));
    }

    #[test]
    fn test_unmatchable_reason_distinguishes_empty_template() {
        let empty = MatchResult::not_found((0, 0));
        let oversized = MatchResult::not_found((300, 40));
        let reason = empty.unmatchable_reason((200, 100)).unwrap();
        assert!(reason.contains("empty"));
        assert!(!reason.contains("larger"));
        assert_eq!(
            oversized.unmatchable_reason((200, 100)).unwrap(),
            "template (300x40) is larger than the captured frame (200x100)"
        );

        let found = MatchResult {
            found: true,
            location: (1, 1),
            confidence: 0.5,
            template_size: (4, 4),
        };
        assert_eq!(found.unmatchable_reason((200, 100)), None);
    }
}

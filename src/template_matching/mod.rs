/// Template matching module for locating saved UI elements in screenshots
///
/// This module provides:
/// - Exact, deterministic normalized cross-correlation matching
/// - A named template store loaded from a flat directory
/// - A locator applying a per-call confidence threshold and screen translation
mod correlation;
pub mod library;
pub mod locator;
pub mod matcher;
pub mod types;

pub use library::TemplateLibrary;
pub use locator::Locator;
pub use matcher::TemplateMatcher;
pub use types::{ActionablePoint, Frame, MatchResult, Template};

#[cfg(test)]
pub(crate) mod test_support {
    use image::{GrayImage, Luma};

    /// Deterministic pseudo-random noise so every window is distinct
    pub(crate) fn noise_image(width: u32, height: u32, seed: u32) -> GrayImage {
        let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);
        GrayImage::from_fn(width, height, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            Luma([(state & 0xff) as u8])
        })
    }
}

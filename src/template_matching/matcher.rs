/// Template matching implementation
///
/// Zero-mean normalized cross-correlation over every valid offset, computed with
/// exact integer sums so repeated calls on identical inputs agree bit for bit.
/// imageproc's `match_template` has no zero-mean variant and accumulates in f32,
/// so window sums come from its integral images and the cross term from an FFT.
use super::correlation::valid_cross_correlation;
use super::types::{Frame, MatchResult, Template};
use imageproc::integral_image::{integral_image, integral_squared_image};

/// Sum of the `w`x`h` window at (x, y) in a (W+1)x(H+1) integral image
fn window_sum(table: &[u64], stride: usize, x: usize, y: usize, w: usize, h: usize) -> i64 {
    let top = y * stride;
    let bottom = (y + h) * stride;
    (table[bottom + x + w] + table[top + x] - table[top + x + w] - table[bottom + x]) as i64
}

/// Template matcher for finding the single best alignment of a template in a frame
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateMatcher;

impl TemplateMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Find the best-scoring offset of `template` inside `frame`
    ///
    /// Never applies a threshold: the true best confidence is always reported so
    /// callers can tell "low confidence" apart from "cannot match". A template
    /// larger than the frame in either axis, or an empty one, yields `found = false`.
    ///
    /// Ties are resolved in favour of the first offset in row-major order.
    pub fn match_template(&self, frame: &Frame, template: &Template) -> MatchResult {
        let template_size = (template.width(), template.height());
        if template.width() == 0
            || template.height() == 0
            || !template.fits_within(frame.width(), frame.height())
        {
            return MatchResult::not_found(template_size);
        }

        let image = frame.pixels();
        let tw = template.width() as usize;
        let th = template.height() as usize;
        let n = (tw * th) as i64;

        let t_raw = template.pixels.as_raw();
        let t_sum: i64 = t_raw.iter().map(|&v| v as i64).sum();
        let t_sum_sq: i64 = t_raw.iter().map(|&v| (v as i64) * (v as i64)).sum();
        let t_var = n * t_sum_sq - t_sum * t_sum;

        let sums = integral_image::<_, u64>(image);
        let squares = integral_squared_image::<_, u64>(image);
        let stride = image.width() as usize + 1;
        let cross = valid_cross_correlation(image, &template.pixels);

        let x_max = image.width() as usize - tw;
        let y_max = image.height() as usize - th;

        let mut best_conf = -1.0f64;
        let mut best_loc = (0u32, 0u32);

        for y in 0..=y_max {
            for x in 0..=x_max {
                let w_sum = window_sum(sums.as_raw(), stride, x, y, tw, th);
                let w_sum_sq = window_sum(squares.as_raw(), stride, x, y, tw, th);
                let w_var = n * w_sum_sq - w_sum * w_sum;

                let conf = if t_var == 0 || w_var == 0 {
                    // A flat patch only correlates with an identical flat patch
                    if t_var == 0 && w_var == 0 && t_sum == w_sum {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    let num = n * cross[y * (x_max + 1) + x] - t_sum * w_sum;
                    let denom = ((t_var as f64) * (w_var as f64)).sqrt();
                    (num as f64 / denom).clamp(0.0, 1.0)
                };

                if conf > best_conf {
                    best_conf = conf;
                    best_loc = (x as u32, y as u32);
                }
            }
        }

        log::trace!(
            "🔍 {}: best offset ({},{}) confidence {:.4} over {}x{} offsets",
            template.name,
            best_loc.0,
            best_loc.1,
            best_conf,
            x_max + 1,
            y_max + 1
        );

        MatchResult {
            found: true,
            location: best_loc,
            confidence: best_conf as f32,
            template_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template_matching::test_support::noise_image;
    use image::{GrayImage, Luma};

    fn crop(image: &GrayImage, x: u32, y: u32, w: u32, h: u32) -> GrayImage {
        image::imageops::crop_imm(image, x, y, w, h).to_image()
    }

    #[test]
    fn test_verbatim_template_found_exactly() {
        let frame_img = noise_image(64, 48, 7);
        for &(x0, y0) in &[(0, 0), (13, 21), (44, 28)] {
            let template = Template::new("patch", crop(&frame_img, x0, y0, 20, 20));
            let frame = Frame::new(frame_img.clone(), (0, 0));
            let result = TemplateMatcher::new().match_template(&frame, &template);

            assert!(result.found);
            assert_eq!(result.location, (x0, y0));
            assert_eq!(result.confidence, 1.0);
            assert_eq!(result.template_size, (20, 20));
        }
    }

    #[test]
    fn test_template_pasted_into_other_frame() {
        let mut frame_img = noise_image(80, 60, 1);
        let patch = noise_image(12, 9, 99);
        image::imageops::replace(&mut frame_img, &patch, 31, 17);

        let frame = Frame::new(frame_img, (500, 300));
        let template = Template::new("Battle", patch);
        let result = TemplateMatcher::new().match_template(&frame, &template);

        assert_eq!(result.location, (31, 17));
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_oversized_template_not_found() {
        let frame = Frame::new(noise_image(30, 30, 3), (0, 0));
        let matcher = TemplateMatcher::new();

        let wide = Template::new("wide", noise_image(31, 10, 4));
        let tall = Template::new("tall", noise_image(10, 31, 4));
        assert!(!matcher.match_template(&frame, &wide).found);
        assert!(!matcher.match_template(&frame, &tall).found);
    }

    #[test]
    fn test_same_size_template_single_offset() {
        let img = noise_image(16, 16, 5);
        let frame = Frame::new(img.clone(), (0, 0));
        let template = Template::new("full", img);
        let result = TemplateMatcher::new().match_template(&frame, &template);
        assert_eq!(result.location, (0, 0));
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_match_is_idempotent() {
        let frame = Frame::new(noise_image(50, 40, 11), (0, 0));
        let template = Template::new("other", noise_image(8, 8, 12));
        let matcher = TemplateMatcher::new();

        let first = matcher.match_template(&frame, &template);
        let second = matcher.match_template(&frame, &template);
        assert_eq!(first.location, second.location);
        assert_eq!(first.confidence.to_bits(), second.confidence.to_bits());
    }

    #[test]
    fn test_confidence_bounded() {
        let frame = Frame::new(noise_image(40, 40, 21), (0, 0));
        let template = Template::new("unrelated", noise_image(10, 10, 22));
        let result = TemplateMatcher::new().match_template(&frame, &template);
        assert!(result.found);
        assert!((0.0..=1.0).contains(&result.confidence));
        assert!(result.confidence < 1.0);
    }

    #[test]
    fn test_ties_resolved_in_row_major_order() {
        // Two identical copies of the patch; the upper-left one wins
        let mut frame_img = GrayImage::from_pixel(40, 40, Luma([10]));
        let patch = noise_image(6, 6, 8);
        image::imageops::replace(&mut frame_img, &patch, 25, 5);
        image::imageops::replace(&mut frame_img, &patch, 3, 20);

        let frame = Frame::new(frame_img, (0, 0));
        let template = Template::new("twin", patch);
        let result = TemplateMatcher::new().match_template(&frame, &template);
        assert_eq!(result.location, (25, 5));
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_flat_template_matches_identical_flat_region() {
        let mut frame_img = noise_image(30, 30, 2);
        let flat = GrayImage::from_pixel(5, 5, Luma([200]));
        image::imageops::replace(&mut frame_img, &flat, 10, 12);

        let frame = Frame::new(frame_img, (0, 0));
        let template = Template::new("flat", flat);
        let result = TemplateMatcher::new().match_template(&frame, &template);
        assert_eq!(result.location, (10, 12));
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_brightness_shift_still_matches() {
        let noise = noise_image(10, 10, 31);
        let base = GrayImage::from_fn(10, 10, |x, y| Luma([noise.get_pixel(x, y)[0] / 2]));
        let brighter = GrayImage::from_fn(10, 10, |x, y| Luma([base.get_pixel(x, y)[0] + 40]));
        let mut frame_img = GrayImage::from_pixel(30, 30, Luma([0]));
        image::imageops::replace(&mut frame_img, &brighter, 7, 9);

        let frame = Frame::new(frame_img, (0, 0));
        let template = Template::new("shifted", base);
        let result = TemplateMatcher::new().match_template(&frame, &template);
        assert_eq!(result.location, (7, 9));
        assert!(result.confidence > 0.999);
    }

    #[test]
    fn test_empty_template_not_found() {
        let frame = Frame::new(noise_image(20, 20, 3), (0, 0));
        let empty = Template::new("empty", GrayImage::new(0, 0));
        let result = TemplateMatcher::new().match_template(&frame, &empty);
        assert!(!result.found);
    }

    #[test]
    fn test_screen_sized_match_within_poll_interval() {
        // 1280x720 frame with a 120x40 button, the size of a real window capture
        let mut frame_img = noise_image(1280, 720, 41);
        let button = noise_image(120, 40, 42);
        image::imageops::replace(&mut frame_img, &button, 900, 500);
        let frame = Frame::new(frame_img, (0, 0));
        let template = Template::new("Start Fight", button);

        let started = std::time::Instant::now();
        let result = TemplateMatcher::new().match_template(&frame, &template);
        let elapsed = started.elapsed();

        assert_eq!(result.location, (900, 500));
        assert_eq!(result.confidence, 1.0);
        assert!(
            elapsed < crate::game_automation::config::DEFAULT_POLL_INTERVAL,
            "one match took {elapsed:?}"
        );
    }
}

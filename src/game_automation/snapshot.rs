//! Annotated frame dumps for diagnosing steps that timed out

use crate::error::{NavError, NavResult};
use crate::template_matching::{Frame, MatchResult};
use image::{DynamicImage, ImageFormat, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::io::Cursor;
use std::path::{Path, PathBuf};

const CANDIDATE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// File name for a step snapshot: `<sequence>-step<N>-<template>.png`, spaces replaced
pub fn snapshot_file_name(sequence: &str, step_index: usize, template_name: &str) -> String {
    let clean = |s: &str| -> String {
        s.chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect()
    };
    format!(
        "{}-step{}-{}.png",
        clean(sequence),
        step_index + 1,
        clean(template_name)
    )
}

/// Render `frame` as PNG bytes with the best candidate rectangle drawn on it
fn render_snapshot(frame: &Frame, candidate: &MatchResult) -> image::ImageResult<Vec<u8>> {
    let mut canvas = DynamicImage::ImageLuma8(frame.pixels().clone()).to_rgb8();
    let (w, h) = candidate.template_size;
    if candidate.found && w > 0 && h > 0 {
        let rect = Rect::at(candidate.location.0 as i32, candidate.location.1 as i32).of_size(w, h);
        draw_hollow_rect_mut(&mut canvas, rect, CANDIDATE_COLOR);
    }
    let mut bytes = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Write `frame` with the best candidate rectangle drawn on it
///
/// The rectangle marks where the template scored highest, which shows whether
/// the template is stale (right place, low score) or the screen is unexpected.
/// Drawing and encoding run on the blocking pool.
pub async fn save_debug_snapshot(
    directory: &Path,
    file_name: &str,
    frame: &Frame,
    candidate: &MatchResult,
) -> NavResult<PathBuf> {
    let path = directory.join(file_name);
    let io_error = |e: std::io::Error| NavError::Snapshot {
        path: path.clone(),
        source: image::ImageError::IoError(e),
    };

    let owned_frame = frame.clone();
    let owned_candidate = *candidate;
    let bytes = tokio::task::spawn_blocking(move || render_snapshot(&owned_frame, &owned_candidate))
        .await?
        .map_err(|source| NavError::Snapshot {
            path: path.clone(),
            source,
        })?;

    tokio::fs::create_dir_all(directory).await.map_err(io_error)?;
    tokio::fs::write(&path, &bytes).await.map_err(io_error)?;
    log::info!(
        "🖼️ Saved debug snapshot to {:?} (confidence {:.3})",
        path,
        candidate.confidence
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_file_name_is_filesystem_safe() {
        assert_eq!(
            snapshot_file_name("arena-navigation", 2, "Classic Arena"),
            "arena-navigation-step3-Classic_Arena.png"
        );
    }

    #[tokio::test]
    async fn test_snapshot_draws_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let frame = Frame::new(GrayImage::from_pixel(40, 30, Luma([0])), (0, 0));
        let candidate = MatchResult {
            found: true,
            location: (5, 6),
            confidence: 0.42,
            template_size: (10, 8),
        };

        let path = save_debug_snapshot(
            &dir.path().join("snapshots"),
            "run-step1-Battle.png",
            &frame,
            &candidate,
        )
        .await
        .unwrap();

        let saved = image::open(&path).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (40, 30));
        assert_eq!(*saved.get_pixel(5, 6), CANDIDATE_COLOR);
        assert_eq!(*saved.get_pixel(14, 13), CANDIDATE_COLOR);
        assert_eq!(*saved.get_pixel(9, 9), Rgb([0, 0, 0]));
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_snapshot_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let frame = Frame::new(GrayImage::from_pixel(4, 4, Luma([0])), (0, 0));

        let result = save_debug_snapshot(
            &blocker,
            "x.png",
            &frame,
            &MatchResult::not_found((8, 8)),
        )
        .await;
        assert!(matches!(result, Err(NavError::Snapshot { .. })));
    }
}

//! Letterboxing of source images onto the vertical canvas.
//!
//! Each scene's frame is named after its scene number (`image{n}.jpg`) and
//! made from the raw image `scene_{NNN}.<ext>`, so a scene without a usable
//! source leaves a gap instead of shifting later frames. An existing output
//! frame is trusted and left untouched, so re-running after an interruption
//! only processes what is missing.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{GenericImageView, Rgb, RgbImage};
use tracing::{debug, info, warn};

use reel_models::paths::frame_file_name;
use reel_models::ReelPaths;

use crate::error::{MediaError, MediaResult};

/// Source extensions accepted by the preprocessor.
pub const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// JPEG quality for frames; they are re-encoded by the renderer anyway.
const FRAME_JPEG_QUALITY: u8 = 100;

/// Outcome of a preprocessing pass.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Frames present after the pass, in scene order
    pub frames: Vec<PathBuf>,
    /// Newly written frames
    pub processed: usize,
    /// Frames that already existed
    pub skipped: usize,
    /// Source images that could not be converted
    pub failed: Vec<PathBuf>,
    /// Scenes with neither a frame nor a source image
    pub missing: Vec<u32>,
}

/// Fit `input` inside a `width` x `height` canvas without cropping, center
/// it on black, and save as JPEG.
pub fn preprocess_image(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    width: u32,
    height: u32,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    let img = image::open(input)?;
    let (src_w, src_h) = img.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(MediaError::internal(format!("Empty image: {}", input.display())));
    }

    let (new_w, new_h) = fit_within(src_w, src_h, width, height);
    let resized = img.resize_exact(new_w, new_h, FilterType::Lanczos3).to_rgb8();

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    let x = (width - new_w) / 2;
    let y = (height - new_h) / 2;
    imageops::replace(&mut canvas, &resized, x as i64, y as i64);

    let mut writer = BufWriter::new(File::create(output)?);
    JpegEncoder::new_with_quality(&mut writer, FRAME_JPEG_QUALITY).encode_image(&canvas)?;

    debug!(
        "Letterboxed {} ({}x{}) -> {} ({}x{} at {},{})",
        input.display(),
        src_w,
        src_h,
        output.display(),
        new_w,
        new_h,
        x,
        y
    );
    Ok(())
}

/// Size after uniform scaling by `min(width / w, height / h)`.
pub fn fit_within(src_w: u32, src_h: u32, width: u32, height: u32) -> (u32, u32) {
    let scale = (width as f64 / src_w as f64).min(height as f64 / src_h as f64);
    let new_w = ((src_w as f64 * scale) as u32).clamp(1, width);
    let new_h = ((src_h as f64 * scale) as u32).clamp(1, height);
    (new_w, new_h)
}

fn is_raster(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| RASTER_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Raw image for `scene_number` in `dir`, whatever its raster extension.
pub fn find_source_image(dir: &Path, scene_number: u32) -> Option<PathBuf> {
    let stem = ReelPaths::raw_image_stem(scene_number);
    let mut matches: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path.file_stem().and_then(|s| s.to_str()) == Some(stem.as_str())
                && is_raster(path)
        })
        .collect();
    matches.sort();
    matches.into_iter().next()
}

/// Letterbox the source image of every scene in `scene_numbers` from
/// `input_dir` into `output_dir`.
///
/// A scene whose source is absent is reported in [`FrameReport::missing`];
/// one whose source fails to decode is reported in [`FrameReport::failed`].
/// Either way only that scene loses its frame.
pub async fn preprocess_frames(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    scene_numbers: &[u32],
    width: u32,
    height: u32,
) -> MediaResult<FrameReport> {
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();
    if !input_dir.exists() {
        return Err(MediaError::FileNotFound(input_dir.to_path_buf()));
    }
    tokio::fs::create_dir_all(output_dir).await?;

    info!(
        scenes = scene_numbers.len(),
        "Preprocessing source images into {}",
        output_dir.display()
    );

    let mut report = FrameReport::default();
    for &n in scene_numbers {
        let target = output_dir.join(frame_file_name(n));

        if target.exists() {
            debug!(scene = n, "Frame {} already exists, skipping", target.display());
            report.skipped += 1;
            report.frames.push(target);
            continue;
        }

        let Some(source) = find_source_image(input_dir, n) else {
            warn!(scene = n, "No source image, scene will have no frame");
            report.missing.push(n);
            continue;
        };

        let (src, dst) = (source.clone(), target.clone());
        let result = tokio::task::spawn_blocking(move || preprocess_image(&src, &dst, width, height))
            .await
            .map_err(|e| MediaError::internal(format!("Frame task panicked: {}", e)))?;

        match result {
            Ok(()) => {
                report.processed += 1;
                report.frames.push(target);
            }
            Err(e) => {
                warn!(scene = n, "Failed to preprocess {}: {}", source.display(), e);
                report.failed.push(source);
            }
        }
    }

    info!(
        "Frames ready: {} processed, {} reused, {} failed, {} missing",
        report.processed,
        report.skipped,
        report.failed.len(),
        report.missing.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_png(path: &Path, w: u32, h: u32, color: [u8; 3]) {
        RgbImage::from_pixel(w, h, Rgb(color)).save(path).unwrap();
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(1024, 1792, 1080, 1920), (1080, 1890));
        assert_eq!(fit_within(1920, 1080, 1080, 1920), (1080, 607));
        assert_eq!(fit_within(40, 20, 1080, 1920), (1080, 540));
        assert_eq!(fit_within(1080, 1920, 1080, 1920), (1080, 1920));
    }

    #[test]
    fn test_letterbox_centers_on_black() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("wide.png");
        let dst = dir.path().join("out.jpg");
        write_png(&src, 40, 20, [255, 255, 255]);

        preprocess_image(&src, &dst, 1080, 1920).unwrap();

        let out = image::open(&dst).unwrap().to_rgb8();
        assert_eq!(out.dimensions(), (1080, 1920));
        // 540px tall band starts at y = 690
        assert!(out.get_pixel(540, 10)[0] < 16);
        assert!(out.get_pixel(540, 1910)[0] < 16);
        assert!(out.get_pixel(540, 960)[0] > 240);
    }

    #[tokio::test]
    async fn test_frames_named_by_scene_number() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("images");
        let output = dir.path().join("frames");
        std::fs::create_dir_all(&input).unwrap();

        write_png(&input.join("scene_004.png"), 8, 16, [0, 255, 0]);
        write_png(&input.join("scene_001.PNG"), 8, 16, [255, 0, 0]);
        std::fs::write(input.join("scene_002.txt"), "not an image").unwrap();

        let report = preprocess_frames(&input, &output, &[1, 2, 4], 108, 192).await.unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.frames, vec![output.join("image1.jpg"), output.join("image4.jpg")]);
        assert_eq!(report.missing, vec![2]);
        assert!(!output.join("image2.jpg").exists());

        let fourth = image::open(output.join("image4.jpg")).unwrap().to_rgb8();
        let px = fourth.get_pixel(54, 96);
        assert!(px[1] > 200 && px[0] < 60);
    }

    #[tokio::test]
    async fn test_missing_middle_source_does_not_shift_frames() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("images");
        let output = dir.path().join("frames");
        std::fs::create_dir_all(&input).unwrap();
        write_png(&input.join("scene_001.png"), 10, 10, [255, 0, 0]);
        write_png(&input.join("scene_003.png"), 10, 10, [0, 0, 255]);

        let report = preprocess_frames(&input, &output, &[1, 2, 3], 108, 192).await.unwrap();
        assert_eq!(report.missing, vec![2]);
        assert!(!output.join("image2.jpg").exists());

        let third = image::open(output.join("image3.jpg")).unwrap().to_rgb8();
        let px = third.get_pixel(54, 96);
        assert!(px[2] > 200 && px[0] < 60);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("images");
        let output = dir.path().join("frames");
        std::fs::create_dir_all(&input).unwrap();
        write_png(&input.join("scene_001.png"), 30, 10, [10, 20, 30]);
        write_png(&input.join("scene_002.jpg"), 10, 30, [200, 100, 50]);

        let first = preprocess_frames(&input, &output, &[1, 2], 108, 192).await.unwrap();
        let bytes_before: Vec<Vec<u8>> =
            first.frames.iter().map(|p| std::fs::read(p).unwrap()).collect();

        let second = preprocess_frames(&input, &output, &[1, 2], 108, 192).await.unwrap();
        assert_eq!(second.processed, 0);
        assert_eq!(second.skipped, 2);

        let bytes_after: Vec<Vec<u8>> =
            second.frames.iter().map(|p| std::fs::read(p).unwrap()).collect();
        assert_eq!(bytes_before, bytes_after);
    }

    #[tokio::test]
    async fn test_undecodable_source_leaves_gap() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("images");
        let output = dir.path().join("frames");
        std::fs::create_dir_all(&input).unwrap();
        write_png(&input.join("scene_001.png"), 10, 10, [1, 2, 3]);
        std::fs::write(input.join("scene_002.png"), b"garbage").unwrap();
        write_png(&input.join("scene_003.png"), 10, 10, [1, 2, 3]);

        let report = preprocess_frames(&input, &output, &[1, 2, 3], 108, 192).await.unwrap();
        assert_eq!(report.failed, vec![input.join("scene_002.png")]);
        assert!(output.join("image1.jpg").exists());
        assert!(!output.join("image2.jpg").exists());
        assert!(output.join("image3.jpg").exists());
    }

    #[test]
    fn test_find_source_image() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("scene_002.webp"), b"x").unwrap();
        std::fs::write(dir.path().join("scene_003.txt"), b"x").unwrap();

        assert_eq!(
            find_source_image(dir.path(), 2),
            Some(dir.path().join("scene_002.webp"))
        );
        assert_eq!(find_source_image(dir.path(), 3), None);
        assert_eq!(find_source_image(dir.path(), 1), None);
        assert_eq!(find_source_image(&dir.path().join("missing"), 1), None);
    }

    #[tokio::test]
    async fn test_missing_input_dir() {
        let dir = TempDir::new().unwrap();
        let result =
            preprocess_frames(dir.path().join("nope"), dir.path().join("out"), &[1], 108, 192).await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}

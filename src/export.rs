use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, ColorImage, Rect};

/// Ask the viewport for a screenshot; it arrives as `Event::Screenshot`.
pub fn request_screenshot(ctx: &egui::Context) {
    ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
}

/// The screenshot delivered this frame, if any.
pub fn take_screenshot(ctx: &egui::Context) -> Option<std::sync::Arc<ColorImage>> {
    ctx.input(|i| {
        i.raw.events.iter().find_map(|e| match e {
            egui::Event::Screenshot { image, .. } => Some(image.clone()),
            _ => None,
        })
    })
}

/// RGBA bytes of `shot`, cropped to `area` (in points) when given.
///
/// The crop is clamped to the image bounds.
pub fn crop_rgba(
    shot: &ColorImage,
    area: Option<Rect>,
    pixels_per_point: f32,
) -> (Vec<u8>, usize, usize) {
    let (full_w, full_h) = (shot.width(), shot.height());
    let (x0, y0, x1, y1) = match area {
        Some(rect) => (
            ((rect.left() * pixels_per_point) as usize).min(full_w),
            ((rect.top() * pixels_per_point) as usize).min(full_h),
            ((rect.right() * pixels_per_point).ceil() as usize).min(full_w),
            ((rect.bottom() * pixels_per_point).ceil() as usize).min(full_h),
        ),
        None => (0, 0, full_w, full_h),
    };

    let (w, h) = (x1.saturating_sub(x0), y1.saturating_sub(y0));
    let mut rgba = Vec::with_capacity(w * h * 4);
    for row in y0..y1 {
        for col in x0..x1 {
            let c = shot.pixels[row * full_w + col];
            rgba.extend_from_slice(&[c.r(), c.g(), c.b(), c.a()]);
        }
    }
    (rgba, w, h)
}

/// Write the (cropped) screenshot as PNG.
pub fn save_png(
    path: &Path,
    shot: &ColorImage,
    area: Option<Rect>,
    pixels_per_point: f32,
) -> Result<()> {
    let (rgba, w, h) = crop_rgba(shot, area, pixels_per_point);
    let buffer = image::RgbaImage::from_raw(w as u32, h as u32, rgba)
        .context("screenshot has an unexpected pixel layout")?;
    buffer
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

//! Renderer seam and the bitmap export contract.
//!
//! The scene never rasterizes itself; callers hand in a
//! [`SnapshotRenderer`] and the export helpers decide what region it
//! draws. [`FlatRenderer`] is the trivial backend used by the CLI and
//! tests.

use std::io::Cursor;

use image::{Rgba, RgbaImage};
use kurbo::Rect;

use crate::{
    error::{EaselError, EaselResult},
    geom::rotated_bounding_box,
    model::Scene,
};

/// Drawing backend collaborator: rasterize `bounds` of the scene.
pub trait SnapshotRenderer {
    fn snapshot(&mut self, scene: &Scene, bounds: Rect) -> EaselResult<RgbaImage>;
}

/// Region a bitmap export covers: the background's rotated box, or the
/// active clip frame's when `frame_only` is set (and a mask exists).
pub fn export_bounds(scene: &Scene, frame_only: bool) -> Rect {
    if frame_only {
        if let Some(frame) = scene.clip_frame().and_then(|id| scene.node(id)) {
            return rotated_bounding_box(frame);
        }
    }
    rotated_bounding_box(scene.background())
}

/// Rasterize the scene for download. With `zero_angle` the background's
/// rotation is cleared and the mask detached for the duration, so the
/// output is axis-aligned; both are restored before returning.
pub fn export<R: SnapshotRenderer>(
    scene: &mut Scene,
    renderer: &mut R,
    frame_only: bool,
    zero_angle: bool,
) -> EaselResult<RgbaImage> {
    if !zero_angle {
        let bounds = export_bounds(scene, frame_only);
        return renderer.snapshot(scene, bounds);
    }

    let saved_angle = scene.background().angle;
    let saved_frame = scene.clip_frame();

    scene.set_clip_frame(None);
    {
        let bg = scene.background_mut();
        bg.angle = 0.0;
        bg.set_coords();
    }

    let bounds = export_bounds(scene, frame_only);
    let result = renderer.snapshot(scene, bounds);

    scene.set_clip_frame(saved_frame);
    {
        let bg = scene.background_mut();
        bg.angle = saved_angle;
        bg.set_coords();
    }

    result
}

pub fn encode_png(image: &RgbaImage) -> EaselResult<Vec<u8>> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| EaselError::document(format!("png encode failed: {e}")))?;
    Ok(buf)
}

pub fn decode_png(bytes: &[u8]) -> EaselResult<RgbaImage> {
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map_err(|e| EaselError::document(format!("png decode failed: {e}")))?;
    Ok(img.to_rgba8())
}

fn parse_hex_color(color: &str) -> Rgba<u8> {
    let digit = |c: u8| match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    };
    let bytes = color.trim_start_matches('#').as_bytes();
    match bytes.len() {
        3 => Rgba([
            digit(bytes[0]) * 17,
            digit(bytes[1]) * 17,
            digit(bytes[2]) * 17,
            255,
        ]),
        6 => {
            let pair = |i: usize| digit(bytes[i]) * 16 + digit(bytes[i + 1]);
            Rgba([pair(0), pair(2), pair(4), 255])
        }
        _ => Rgba([0, 0, 0, 255]),
    }
}

/// Minimal backend: fills the requested bounds with the scene's
/// background color. Enough for snapshot plumbing and tests.
#[derive(Debug, Default)]
pub struct FlatRenderer;

impl SnapshotRenderer for FlatRenderer {
    fn snapshot(&mut self, scene: &Scene, bounds: Rect) -> EaselResult<RgbaImage> {
        let w = bounds.width().ceil().max(1.0) as u32;
        let h = bounds.height().ceil().max(1.0) as u32;
        let fill = parse_hex_color(&scene.background_color);
        Ok(RgbaImage::from_pixel(w, h, fill))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        activity::ActivityLog,
        frame::{ClipFrameController, FrameKind},
        session::Session,
    };

    #[test]
    fn flat_snapshot_matches_bounds_and_color() {
        let mut scene = Scene::from_image(200.0, 100.0).unwrap();
        scene.background_color = "#ff0000".to_string();
        let bounds = export_bounds(&scene, false);
        let img = FlatRenderer.snapshot(&scene, bounds).unwrap();
        assert_eq!((img.width(), img.height()), (200, 100));
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn frame_only_uses_the_mask_bounds() {
        let mut scene = Scene::from_image(400.0, 300.0).unwrap();
        let mut session = Session::default();
        let mut log = ActivityLog::default();
        let mut ctl = ClipFrameController::default();
        ctl.create_frame(FrameKind::Rect, &mut scene, &mut session, &mut log);
        ctl.apply_frame(&mut scene, &mut session, &mut log).unwrap();

        let bounds = export_bounds(&scene, true);
        assert_eq!(bounds.width(), 100.0);
        assert_eq!(bounds.height(), 60.0);
        // Without the flag the background wins.
        assert_eq!(export_bounds(&scene, false).width(), 400.0);
    }

    #[test]
    fn zero_angle_export_restores_scene_state() {
        let mut scene = Scene::from_image(300.0, 200.0).unwrap();
        scene.background_mut().angle = 30.0;
        scene.background_mut().set_coords();
        let mut session = Session::default();
        let mut log = ActivityLog::default();
        let mut ctl = ClipFrameController::default();
        ctl.create_frame(FrameKind::Rect, &mut scene, &mut session, &mut log);
        let frame = ctl.apply_frame(&mut scene, &mut session, &mut log);

        let img = export(&mut scene, &mut FlatRenderer, false, true).unwrap();
        assert_eq!((img.width(), img.height()), (300, 200));
        assert_eq!(scene.background().angle, 30.0);
        assert_eq!(scene.clip_frame(), frame);
    }

    #[test]
    fn png_round_trip() {
        let img = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255]));
        let bytes = encode_png(&img).unwrap();
        let back = decode_png(&bytes).unwrap();
        assert_eq!(back, img);
        assert!(decode_png(b"not a png").is_err());
    }
}

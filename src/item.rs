//! Scene items — placed images with position, scale, rotation and flip.

use std::path::PathBuf;

use egui::emath::Rot2;
use egui::{Pos2, Rect, Vec2, pos2, vec2};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use uuid::Uuid;

/// An image placed on the scene.
///
/// Geometry model: the item's local origin is the image's top-left pixel.
/// Scale and rotation apply about that origin; the horizontal flip mirrors
/// the pixels in place (it affects rendering, not the outline). `pos` is
/// the scene position of the local origin.
pub struct ImageItem {
    id: Uuid,
    image: RgbaImage,
    /// Source file the image was loaded from, if any.
    pub filename: Option<PathBuf>,
    /// Scene position of the item's local origin.
    pub pos: Pos2,
    /// Stacking order; higher values draw on top.
    pub z: f32,
    scale: f32,
    /// Rotation about the local origin, in degrees.
    pub rotation: f32,
    flip: i8,
    pub selected: bool,
    /// Lazily uploaded GPU texture; never serialized.
    texture: Option<egui::TextureHandle>,
}

impl std::fmt::Debug for ImageItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageItem")
            .field("id", &self.id)
            .field("image", &self.image)
            .field("filename", &self.filename)
            .field("pos", &self.pos)
            .field("z", &self.z)
            .field("scale", &self.scale)
            .field("rotation", &self.rotation)
            .field("flip", &self.flip)
            .field("selected", &self.selected)
            .field("texture", &self.texture.is_some())
            .finish()
    }
}

impl ImageItem {
    pub fn new(image: RgbaImage, filename: Option<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            image,
            filename,
            pos: Pos2::ZERO,
            z: 0.0,
            scale: 1.0,
            rotation: 0.0,
            flip: 1,
            selected: false,
            texture: None,
        }
    }

    /// Reconstruct an item from persisted geometry (`.bee` loading).
    pub fn from_saved(
        image: RgbaImage,
        filename: Option<PathBuf>,
        pos: Pos2,
        z: f32,
        scale: f32,
        rotation: f32,
        flip: i8,
    ) -> Self {
        let mut item = Self::new(image, filename);
        item.pos = pos;
        item.z = z;
        item.scale = if scale > 0.0 { scale } else { 1.0 };
        item.rotation = rotation;
        item.flip = if flip < 0 { -1 } else { 1 };
        item
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Unscaled pixel size as a vector.
    pub fn size(&self) -> Vec2 {
        vec2(self.image.width() as f32, self.image.height() as f32)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale;
        }
    }

    /// Change the scale while keeping the item's visual center in place.
    pub fn set_scale_keep_center(&mut self, scale: f32) {
        let center = self.scene_rect().center();
        self.set_scale(scale);
        self.set_pos_center(center);
    }

    /// Horizontal mirror sign: `1` = normal, `-1` = flipped.
    pub fn flip(&self) -> i8 {
        self.flip
    }

    pub fn do_flip(&mut self) {
        self.flip = -self.flip;
    }

    /// The item's four corners in scene coordinates (ignoring flip, which
    /// mirrors in place).
    pub fn corners(&self) -> [Pos2; 4] {
        let size = self.size();
        let local = [
            pos2(0.0, 0.0),
            pos2(size.x, 0.0),
            pos2(size.x, size.y),
            pos2(0.0, size.y),
        ];
        let rot = Rot2::from_angle(self.rotation.to_radians());
        local.map(|p| self.pos + rot * (p.to_vec2() * self.scale))
    }

    /// Axis-aligned bounding rectangle in scene coordinates.
    pub fn scene_rect(&self) -> Rect {
        let mut rect = Rect::NOTHING;
        for corner in self.corners() {
            rect.extend_with(corner);
        }
        rect
    }

    /// Move the item so its bounding rectangle is centered on `center`.
    pub fn set_pos_center(&mut self, center: Pos2) {
        let offset = center - self.scene_rect().center();
        self.pos += offset;
    }

    /// Whether `scene_pos` lies inside the (possibly rotated) image.
    pub fn contains(&self, scene_pos: Pos2) -> bool {
        let rot = Rot2::from_angle(self.rotation.to_radians()).inverse();
        let local = rot * (scene_pos - self.pos) / self.scale;
        let size = self.size();
        local.x >= 0.0 && local.y >= 0.0 && local.x <= size.x && local.y <= size.y
    }

    /// Encode the pixels as a PNG blob for persistence.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, String> {
        let mut bytes = Vec::new();
        let encoder = PngEncoder::new(&mut bytes);
        encoder
            .write_image(
                self.image.as_raw(),
                self.image.width(),
                self.image.height(),
                ColorType::Rgba8,
            )
            .map_err(|e| e.to_string())?;
        Ok(bytes)
    }

    /// Decode a PNG blob back into pixels (`.bee` loading).
    pub fn image_from_png(bytes: &[u8]) -> Result<RgbaImage, String> {
        image::load_from_memory(bytes)
            .map(|img| img.to_rgba8())
            .map_err(|e| e.to_string())
    }

    /// The GPU texture for this item, uploading it on first use.
    pub fn texture_id(&mut self, ctx: &egui::Context) -> egui::TextureId {
        if let Some(texture) = &self.texture {
            return texture.id();
        }
        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [self.image.width() as usize, self.image.height() as usize],
            self.image.as_raw(),
        );
        let handle = ctx.load_texture(
            format!("item-{}", self.id),
            color_image,
            egui::TextureOptions::LINEAR,
        );
        let id = handle.id();
        self.texture = Some(handle);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(w: u32, h: u32) -> ImageItem {
        ImageItem::new(RgbaImage::new(w, h), None)
    }

    #[test]
    fn new_item_defaults() {
        let item = item(3, 3);
        assert_eq!(item.scale(), 1.0);
        assert_eq!(item.flip(), 1);
        assert_eq!(item.pos, Pos2::ZERO);
        assert!(!item.selected);
    }

    #[test]
    fn set_pos_center_translates_by_half_size() {
        let mut item = item(200, 100);
        item.set_pos_center(pos2(0.0, 0.0));
        assert_eq!(item.pos, pos2(-100.0, -50.0));
    }

    #[test]
    fn set_pos_center_accounts_for_scale() {
        let mut item = item(200, 100);
        item.set_scale(2.0);
        item.set_pos_center(pos2(0.0, 0.0));
        assert_eq!(item.pos, pos2(-200.0, -100.0));
    }

    #[test]
    fn set_pos_center_accounts_for_rotation() {
        let mut item = item(200, 100);
        item.rotation = 90.0;
        item.set_pos_center(pos2(0.0, 0.0));
        // Rotated 90° about the origin the bounds span x in [-100, 0],
        // y in [0, 200]; centering moves the origin to (50, -100).
        assert!((item.pos.x - 50.0).abs() < 1e-3);
        assert!((item.pos.y + 100.0).abs() < 1e-3);
    }

    #[test]
    fn scale_keep_center_preserves_center() {
        let mut item = item(100, 50);
        item.pos = pos2(10.0, 20.0);
        let before = item.scene_rect().center();
        item.set_scale_keep_center(3.0);
        let after = item.scene_rect().center();
        assert!((before.x - after.x).abs() < 1e-3);
        assert!((before.y - after.y).abs() < 1e-3);
        assert_eq!(item.scale(), 3.0);
    }

    #[test]
    fn invalid_scale_is_rejected() {
        let mut item = item(10, 10);
        item.set_scale(0.0);
        assert_eq!(item.scale(), 1.0);
        item.set_scale(-2.0);
        assert_eq!(item.scale(), 1.0);
        item.set_scale(f32::NAN);
        assert_eq!(item.scale(), 1.0);
    }

    #[test]
    fn contains_respects_scale_and_position() {
        let mut item = item(10, 10);
        item.pos = pos2(100.0, 100.0);
        item.set_scale(2.0);
        assert!(item.contains(pos2(110.0, 110.0)));
        assert!(!item.contains(pos2(99.0, 100.0)));
        assert!(!item.contains(pos2(121.0, 121.0)));
    }

    #[test]
    fn png_round_trip_preserves_pixels() {
        let mut img = RgbaImage::new(3, 3);
        img.put_pixel(1, 2, image::Rgba([10, 20, 30, 255]));
        let item = ImageItem::new(img.clone(), None);
        let bytes = item.to_png_bytes().unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
        let decoded = ImageItem::image_from_png(&bytes).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn flip_toggles_in_place() {
        let mut item = item(20, 10);
        let bounds = item.scene_rect();
        item.do_flip();
        assert_eq!(item.flip(), -1);
        assert_eq!(item.scene_rect(), bounds);
        item.do_flip();
        assert_eq!(item.flip(), 1);
    }
}

//! Texture-backed preview store. Dropping a `TextureHandle` frees the texture, so
//! releasing a preview means removing it from the map.

use anyhow::{Context, Result};
use eframe::egui;
use skin_core::{PreviewId, PreviewStore, UploadedImage};
use std::collections::HashMap;

const PREVIEW_SIZE: u32 = 640;

pub struct TexturePreviews {
    ctx: egui::Context,
    textures: HashMap<PreviewId, egui::TextureHandle>,
}

impl TexturePreviews {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            textures: HashMap::new(),
        }
    }

    pub fn texture(&self, id: PreviewId) -> Option<&egui::TextureHandle> {
        self.textures.get(&id)
    }
}

impl PreviewStore for TexturePreviews {
    fn acquire(&mut self, id: PreviewId, image: &UploadedImage) {
        match decode_preview(image) {
            Ok(color) => {
                let tex = self
                    .ctx
                    .load_texture(id.to_string(), color, egui::TextureOptions::LINEAR);
                self.textures.insert(id, tex);
            }
            Err(e) => {
                tracing::warn!("Failed to build preview for {}: {e:#}", image.name);
            }
        }
    }

    fn release(&mut self, id: PreviewId) {
        if self.textures.remove(&id).is_none() {
            tracing::debug!("{id} had no texture to release");
        }
    }
}

/// Decode and, when larger, shrink to fit a `PREVIEW_SIZE` square keeping the
/// aspect ratio.
fn decode_preview(image: &UploadedImage) -> Result<egui::ColorImage> {
    let img = image::load_from_memory(&image.bytes)
        .with_context(|| format!("tidak dapat membuka gambar: {}", image.name))?;
    let img = if img.width() > PREVIEW_SIZE || img.height() > PREVIEW_SIZE {
        img.thumbnail(PREVIEW_SIZE, PREVIEW_SIZE)
    } else {
        img
    };
    let thumb = img.to_rgba8();
    let (w, h) = thumb.dimensions();
    let size = [w as usize, h as usize];
    let pixels = thumb.into_raw();
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, &pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use skin_core::CandidateFile;
    use skin_core::upload::validate;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        image::RgbaImage::new(width, height)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn uploaded(bytes: Vec<u8>) -> UploadedImage {
        validate(
            CandidateFile::new("wajah.png", "image/png", bytes),
            PreviewId::new(1),
        )
        .unwrap()
    }

    #[rstest]
    #[case(4, 2, [4, 2])]
    #[case(1280, 640, [640, 320])]
    #[case(300, 1200, [160, 640])]
    fn preview_fits_inside_square(
        #[case] width: u32,
        #[case] height: u32,
        #[case] expected: [usize; 2],
    ) {
        let color = decode_preview(&uploaded(png(width, height))).unwrap();
        assert_eq!(color.size, expected);
    }

    #[test]
    fn undecodable_bytes_are_an_error() {
        assert!(decode_preview(&uploaded(vec![0u8; 32])).is_err());
    }

    #[test]
    fn release_drops_the_texture() {
        let ctx = egui::Context::default();
        let mut store = TexturePreviews::new(ctx);
        let image = uploaded(png(8, 8));
        store.acquire(image.preview, &image);
        assert!(store.texture(image.preview).is_some());
        store.release(image.preview);
        assert!(store.texture(image.preview).is_none());
    }
}

use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};

// ---------------------------------------------------------------------------
// Logo – decoded once at startup, shown in the sidebar and the header
// ---------------------------------------------------------------------------

pub struct Logo {
    pub texture: TextureHandle,
}

impl Logo {
    /// Decode the image at `path` and upload it as a texture.
    pub fn load(ctx: &egui::Context, path: &Path) -> Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("decoding logo {}", path.display()))?
            .to_rgba8();
        let size = [image.width() as usize, image.height() as usize];
        let color_image = ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        let texture = ctx.load_texture("logo", color_image, TextureOptions::LINEAR);
        Ok(Logo { texture })
    }

    /// Like [`Logo::load`], but a missing or broken logo only costs a warning.
    pub fn load_or_skip(ctx: &egui::Context, path: &Path) -> Option<Self> {
        match Self::load(ctx, path) {
            Ok(logo) => Some(logo),
            Err(e) => {
                log::warn!("Continuing without logo: {e:#}");
                None
            }
        }
    }

    pub fn image(&self) -> egui::Image<'_> {
        egui::Image::new(&self.texture)
    }
}

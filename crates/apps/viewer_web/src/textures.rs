//! Decoded images ready for upload.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use scene::config::TextureConfig;

use crate::error::ViewerError;

/// Which texture binding an image feeds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    GlobeMap,
    GlobeBump,
    GlobeSpecular,
    Starfield,
    MarkerSprite,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 5] = [
        TextureSlot::GlobeMap,
        TextureSlot::GlobeBump,
        TextureSlot::GlobeSpecular,
        TextureSlot::Starfield,
        TextureSlot::MarkerSprite,
    ];

    pub fn url(self, config: &TextureConfig) -> &str {
        match self {
            TextureSlot::GlobeMap => &config.globe_map,
            TextureSlot::GlobeBump => &config.globe_bump,
            TextureSlot::GlobeSpecular => &config.globe_specular,
            TextureSlot::Starfield => &config.starfield,
            TextureSlot::MarkerSprite => &config.marker_sprite,
        }
    }

    /// Color data is sampled in sRGB; height and mask maps are linear.
    pub fn is_srgb(self) -> bool {
        matches!(
            self,
            TextureSlot::GlobeMap | TextureSlot::Starfield | TextureSlot::MarkerSprite
        )
    }

    /// Drawn until the real image arrives.
    pub fn placeholder(self) -> TextureData {
        match self {
            // Flat height, no specular mask.
            TextureSlot::GlobeBump | TextureSlot::GlobeSpecular => {
                TextureData::solid_color([0, 0, 0, 255], "placeholder")
            }
            TextureSlot::Starfield => TextureData::solid_color([0, 0, 0, 255], "placeholder"),
            TextureSlot::GlobeMap | TextureSlot::MarkerSprite => {
                TextureData::solid_color([255, 255, 255, 255], "placeholder")
            }
        }
    }
}

/// Tightly packed RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub name: String,
}

impl TextureData {
    /// Decode a PNG or JPEG, shrinking it to fit `max_dimension` on both axes.
    pub fn from_bytes(bytes: &[u8], name: &str, max_dimension: u32) -> Result<Self, ViewerError> {
        let img = image::load_from_memory(bytes).map_err(|e| ViewerError::Texture {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_image(fit_within(img, max_dimension), name))
    }

    fn from_image(img: DynamicImage, name: &str) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.to_rgba8().into_raw(),
            name: name.to_string(),
        }
    }

    pub fn solid_color(color: [u8; 4], name: &str) -> Self {
        Self {
            width: 1,
            height: 1,
            data: color.to_vec(),
            name: name.to_string(),
        }
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

fn fit_within(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    let max_dimension = max_dimension.max(1);
    if w <= max_dimension && h <= max_dimension {
        return img;
    }
    // `resize` keeps the aspect ratio inside the bounding box.
    img.resize(max_dimension, max_dimension, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::{TextureData, TextureSlot};
    use image::{ImageFormat, RgbaImage};
    use pretty_assertions::assert_eq;
    use scene::config::TextureConfig;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_to_rgba() {
        let tex = TextureData::from_bytes(&png(4, 2), "tiny", 2048).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(tex.data.len(), 4 * 2 * 4);
        assert_eq!(&tex.data[..4], &[10, 20, 30, 255]);
        assert_eq!(tex.bytes_per_row(), 16);
    }

    #[test]
    fn oversized_images_are_shrunk() {
        let tex = TextureData::from_bytes(&png(64, 32), "wide", 16).unwrap();
        assert_eq!((tex.width, tex.height), (16, 8));
        assert_eq!(tex.data.len(), 16 * 8 * 4);
    }

    #[test]
    fn garbage_is_an_error() {
        let err = TextureData::from_bytes(b"not an image", "broken", 16).unwrap_err();
        assert!(err.to_string().starts_with("texture broken:"));
    }

    #[test]
    fn slots_map_to_configured_urls() {
        let config = TextureConfig::default();
        assert_eq!(TextureSlot::GlobeBump.url(&config), "images/elev_bump_4k.jpg");
        assert_eq!(TextureSlot::MarkerSprite.url(&config), "images/disc.png");
        assert!(TextureSlot::GlobeMap.is_srgb());
        assert!(!TextureSlot::GlobeSpecular.is_srgb());
        for slot in TextureSlot::ALL {
            assert_eq!(slot.placeholder().data.len(), 4);
        }
    }
}

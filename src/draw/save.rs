use crate::draw::buffer::RgbaBuffer;
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use chrono::Local;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";
pub const DEFAULT_EXPORT_SUBDIR: &str = "sketch_exports";

/// Point-in-time PNG export of the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    png: Vec<u8>,
}

impl Snapshot {
    pub fn new(width: u32, height: u32, png: Vec<u8>) -> Self {
        Self { width, height, png }
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn to_data_uri(&self) -> String {
        format!(
            "{}{}",
            PNG_DATA_URI_PREFIX,
            general_purpose::STANDARD.encode(&self.png)
        )
    }

    pub fn decode(&self) -> Result<RgbaBuffer> {
        let img = image::load_from_memory_with_format(&self.png, image::ImageFormat::Png)
            .context("decode snapshot png")?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(RgbaBuffer::from_pixels(width, height, img.into_raw()))
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.png)
            .with_context(|| format!("write snapshot {}", path.display()))
    }
}

pub fn encode_png(buffer: &RgbaBuffer) -> Result<Vec<u8>> {
    let img = image::RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.pixels().to_vec())
        .ok_or_else(|| {
            anyhow!("pixel buffer does not match {}x{}", buffer.width(), buffer.height())
        })?;
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageOutputFormat::Png)
        .context("encode png")?;
    Ok(out.into_inner())
}

pub fn timestamped_stem(now: chrono::DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

pub fn build_filename(stem: &str) -> String {
    format!("sketch_{}.png", stem)
}

pub fn ensure_output_folder(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("create export folder {}", dir.display()))?;
    Ok(dir.to_path_buf())
}

/// Writes the snapshot into `dir` under a timestamped name.
pub fn export_snapshot(
    snapshot: &Snapshot,
    dir: &Path,
    now: chrono::DateTime<Local>,
) -> Result<PathBuf> {
    let dir = ensure_output_folder(dir)?;
    let path = dir.join(build_filename(&timestamped_stem(now)));
    snapshot.write_to(&path)?;
    tracing::info!(path = %path.display(), "snapshot exported");
    Ok(path)
}

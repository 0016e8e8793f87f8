use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use image::{ImageFormat, RgbaImage};
use strata_world::{IMAGE_SIZE, RegionCoord};

use crate::RenderError;
use crate::image_set::ImageSet;
use crate::layer::Layer;

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Destination for finished region images. Called from the save pool, possibly
/// for several regions at once.
pub trait TileStore: Send + Sync {
    fn save(&self, region: RegionCoord, images: &ImageSet) -> Result<(), RenderError>;
}

/// Writes `<root>/<layer>/<rx>_<rz>.png`, one RGBA file per layer.
#[derive(Clone, Debug)]
pub struct PngTileStore {
    root: PathBuf,
}

impl PngTileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tile_path(&self, layer: Layer, region: RegionCoord) -> PathBuf {
        self.root
            .join(layer.name())
            .join(format!("{}_{}.png", region.rx, region.rz))
    }

    /// Encodes one layer next to its final path and returns the temporary file.
    fn write_temp(
        &self,
        layer: Layer,
        region: RegionCoord,
        rgba: Vec<u8>,
    ) -> Result<PathBuf, RenderError> {
        let dir = self.root.join(layer.name());
        fs::create_dir_all(&dir)?;
        let side = IMAGE_SIZE as u32;
        let img = RgbaImage::from_raw(side, side, rgba).ok_or(RenderError::BufferSize(layer))?;
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let name = format!(".{}_{}.{}-{}.png.tmp", region.rx, region.rz, process::id(), seq);
        let tmp = dir.join(name);
        if let Err(e) = img.save_with_format(&tmp, ImageFormat::Png) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(tmp)
    }
}

impl TileStore for PngTileStore {
    fn save(&self, region: RegionCoord, images: &ImageSet) -> Result<(), RenderError> {
        // Every layer is encoded before any tile is replaced, so a failed save
        // leaves the region's previous tiles untouched.
        let mut staged = Vec::new();
        for (layer, img) in images.layers() {
            match self.write_temp(layer, region, img.to_rgba8()) {
                Ok(tmp) => staged.push((tmp, self.tile_path(layer, region))),
                Err(e) => {
                    for (tmp, _) in &staged {
                        let _ = fs::remove_file(tmp);
                    }
                    return Err(e);
                }
            }
        }
        for (tmp, path) in &staged {
            fs::rename(tmp, path)?;
        }
        log::debug!(target: "render", "wrote tiles for {} under {}", region, self.root.display());
        Ok(())
    }
}

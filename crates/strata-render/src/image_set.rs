use strata_world::{IMAGE_SIZE, RegionCoord};

use crate::config::RenderConfig;
use crate::layer::Layer;

const SIDE: usize = IMAGE_SIZE as usize;

/// One 512×512 ARGB raster; pixel (x, z) is the column at that offset from the
/// region's north-west corner. Zero means nothing was drawn.
#[derive(Clone, PartialEq, Eq)]
pub struct LayerImage {
    pixels: Vec<u32>,
}

impl Default for LayerImage {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerImage {
    pub fn new() -> Self {
        Self {
            pixels: vec![0; SIDE * SIDE],
        }
    }

    pub const fn side() -> usize {
        SIDE
    }

    #[inline]
    fn idx(x: usize, z: usize) -> usize {
        debug_assert!(x < SIDE && z < SIDE);
        z * SIDE + x
    }

    #[inline]
    pub fn pixel(&self, x: usize, z: usize) -> u32 {
        self.pixels[Self::idx(x, z)]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, z: usize, argb: u32) {
        self.pixels[Self::idx(x, z)] = argb;
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| *p == 0)
    }

    /// Row-major RGBA8 bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            let [a, r, g, b] = p.to_be_bytes();
            out.extend_from_slice(&[r, g, b, a]);
        }
        out
    }
}

impl std::fmt::Debug for LayerImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let drawn = self.pixels.iter().filter(|p| **p != 0).count();
        f.debug_struct("LayerImage").field("drawn", &drawn).finish()
    }
}

/// The rasters produced for one region, one per enabled layer.
#[derive(Clone, Debug)]
pub struct ImageSet {
    region: RegionCoord,
    layers: [Option<LayerImage>; 4],
}

impl ImageSet {
    pub fn new(region: RegionCoord, config: &RenderConfig) -> Self {
        let layers = Layer::ALL.map(|l| config.renders(l).then(LayerImage::new));
        Self { region, layers }
    }

    pub fn region(&self) -> RegionCoord {
        self.region
    }

    #[inline]
    pub fn get(&self, layer: Layer) -> Option<&LayerImage> {
        self.layers[layer.index()].as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, layer: Layer) -> Option<&mut LayerImage> {
        self.layers[layer.index()].as_mut()
    }

    /// Writes a pixel if `layer` is part of this set.
    #[inline]
    pub fn set_pixel(&mut self, layer: Layer, x: usize, z: usize, argb: u32) {
        if let Some(img) = self.get_mut(layer) {
            img.set_pixel(x, z, argb);
        }
    }

    pub fn layers(&self) -> impl Iterator<Item = (Layer, &LayerImage)> {
        Layer::ALL
            .into_iter()
            .filter_map(|l| self.get(l).map(|img| (l, img)))
    }

    pub fn is_blank(&self) -> bool {
        self.layers().all(|(_, img)| img.is_blank())
    }
}

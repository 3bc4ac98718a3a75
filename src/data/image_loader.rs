// ============================================================
// Layer 4 — Camera Image Loader
// ============================================================
// Decodes the JPEG/PNG camera frames referenced by the driving
// log into raw 8-bit RGB pixel buffers using the `image` crate.
//
// Pixels are kept as u8 in HWC order (row by row, RGB
// interleaved) exactly as they come out of the decoder.
// Normalisation and cropping happen inside the network so a
// saved model always sees the same preprocessing.
//
// Every frame must have the shape the network was built for
// (160 x 320 by default). A frame with a different size is an
// error rather than being silently resized.
//
// Reference: image crate documentation

use anyhow::{bail, Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

use crate::data::dataset::FrameSample;
use crate::domain::driving_record::LabeledFrame;

/// Native simulator frame height
pub const DEFAULT_IMAGE_HEIGHT: usize = 160;
/// Native simulator frame width
pub const DEFAULT_IMAGE_WIDTH: usize = 320;

pub struct ImageLoader {
    height: usize,
    width:  usize,
}

impl ImageLoader {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Decode one image file and check its dimensions.
    pub fn load(&self, path: &Path) -> Result<RgbImage> {
        let img = image::open(path)
            .with_context(|| format!("Cannot open image '{}'", path.display()))?
            .to_rgb8();

        let (w, h) = img.dimensions();
        if h as usize != self.height || w as usize != self.width {
            bail!(
                "Image '{}' is {}x{}, expected {}x{}",
                path.display(),
                w,
                h,
                self.width,
                self.height
            );
        }
        Ok(img)
    }

    /// Load every labelled frame in order, pairing pixels with its steering label.
    ///
    /// `resolve` maps the path stored in the log to a file on disk.
    pub fn load_frames<F>(&self, frames: &[LabeledFrame], resolve: F) -> Result<Vec<FrameSample>>
    where
        F: Fn(&str) -> PathBuf,
    {
        let mut samples = Vec::with_capacity(frames.len());

        for frame in frames {
            let path = resolve(&frame.image_path);
            let img  = self.load(&path)?;
            samples.push(FrameSample {
                pixels:   img.into_raw(),
                height:   self.height,
                width:    self.width,
                steering: frame.steering,
            });
        }

        tracing::info!(
            "Loaded {} camera frames ({}x{})",
            samples.len(),
            self.width,
            self.height
        );
        Ok(samples)
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH)
    }
}

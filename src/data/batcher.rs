// ============================================================
// Layer 4 — Frame Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<FrameSample>
// into tensors the network can consume.
//
// How batching works here:
//   Input:  N FrameSamples, each H x W x 3 bytes (HWC)
//   Output: images   [N, 3, H, W]  raw 0..255 values as floats
//           steering [N, 1]
//
// Burn's Conv2d expects channels first (NCHW), so each sample is
// transposed from HWC to CHW while flattening:
//   for c in 0..3, for y in 0..H, for x in 0..W → pixels[(y*W + x)*3 + c]
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::FrameSample;

// ─── FrameBatch ───────────────────────────────────────────────────────────────
/// A batch of camera frames ready for the forward pass.
#[derive(Debug, Clone)]
pub struct FrameBatch<B: Backend> {
    /// Shape: [batch_size, 3, height, width]
    pub images: Tensor<B, 4>,

    /// Shape: [batch_size, 1]
    pub steering: Tensor<B, 2>,
}

// ─── FrameBatcher ─────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct FrameBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> FrameBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<FrameSample, FrameBatch<B>> for FrameBatcher<B> {
    fn batch(&self, items: Vec<FrameSample>) -> FrameBatch<B> {
        let batch_size = items.len();
        // Every sample was checked against the same shape at load time
        let (height, width) = items
            .first()
            .map(|s| (s.height, s.width))
            .unwrap_or((0, 0));

        let mut image_buf: Vec<f32> = Vec::with_capacity(batch_size * 3 * height * width);
        for sample in &items {
            image_buf.extend(hwc_to_chw(&sample.pixels, height, width));
        }

        let labels: Vec<f32> = items.iter().map(|s| s.steering).collect();

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(image_buf, [batch_size, 3, height, width]),
            &self.device,
        );
        let steering = Tensor::<B, 2>::from_data(
            TensorData::new(labels, [batch_size, 1]),
            &self.device,
        );

        FrameBatch { images, steering }
    }
}

/// Reorder an interleaved RGB buffer into planar channels.
pub fn hwc_to_chw(pixels: &[u8], height: usize, width: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(pixels.len());
    for c in 0..3 {
        for y in 0..height {
            for x in 0..width {
                out.push(pixels[(y * width + x) * 3 + c] as f32);
            }
        }
    }
    out
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_hwc_to_chw() {
        // 1x2 image: pixel0 = (1,2,3), pixel1 = (4,5,6)
        let chw = hwc_to_chw(&[1, 2, 3, 4, 5, 6], 1, 2);
        assert_eq!(chw, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_batch_shapes_and_values() {
        let sample = |v: u8, steering: f32| FrameSample {
            pixels: vec![v; 2 * 3 * 3],
            height: 2,
            width:  3,
            steering,
        };
        let batcher = FrameBatcher::<TestBackend>::new(Default::default());
        let batch   = batcher.batch(vec![sample(0, 0.1), sample(255, -0.2)]);

        assert_eq!(batch.images.dims(), [2, 3, 2, 3]);
        assert_eq!(batch.steering.dims(), [2, 1]);

        let pixels: Vec<f32> = batch.images.into_data().to_vec::<f32>().unwrap();
        assert_eq!(pixels[0], 0.0);
        assert_eq!(pixels[pixels.len() - 1], 255.0);

        let labels: Vec<f32> = batch.steering.into_data().to_vec::<f32>().unwrap();
        assert!((labels[0] - 0.1).abs() < 1e-6);
        assert!((labels[1] + 0.2).abs() < 1e-6);
    }
}

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One decoded camera frame and its steering label.
/// Pixels are 8-bit RGB in HWC order: [row][column][channel].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSample {
    pub pixels:   Vec<u8>,
    pub height:   usize,
    pub width:    usize,
    pub steering: f32,
}

pub struct DrivingDataset {
    samples: Vec<FrameSample>,
}

impl DrivingDataset {
    pub fn new(samples: Vec<FrameSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<FrameSample> for DrivingDataset {
    fn get(&self, index: usize) -> Option<FrameSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

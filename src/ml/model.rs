use anyhow::{bail, Result};
use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::{MseLoss, Reduction},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::relu,
};

/// (out_channels, kernel, stride) for each convolution, in order.
const CONV_LAYERS: [(usize, usize, usize); 5] = [
    (24, 5, 2),
    (36, 5, 2),
    (48, 5, 2),
    (64, 3, 1),
    (64, 3, 1),
];

/// Widths of the fully connected layers after the flatten.
const DENSE_LAYERS: [usize; 4] = [100, 50, 10, 1];

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct SteeringModelConfig {
    #[config(default = 160)]
    pub input_height: usize,
    #[config(default = 320)]
    pub input_width:  usize,
    /// Rows removed from the top (sky, trees)
    #[config(default = 70)]
    pub crop_top:     usize,
    /// Rows removed from the bottom (car hood)
    #[config(default = 25)]
    pub crop_bottom:  usize,
    #[config(default = 0.25)]
    pub dropout:      f64,
}

impl SteeringModelConfig {
    /// Height and width of the image once cropped.
    pub fn cropped_dims(&self) -> Result<(usize, usize)> {
        let removed = self.crop_top + self.crop_bottom;
        if removed >= self.input_height {
            bail!(
                "Cropping {} + {} rows leaves nothing of a {}-row image",
                self.crop_top,
                self.crop_bottom,
                self.input_height
            );
        }
        Ok((self.input_height - removed, self.input_width))
    }

    /// Spatial size of the last convolution's output.
    /// Errors if the cropped image is too small for the conv stack.
    pub fn conv_output_dims(&self) -> Result<(usize, usize)> {
        let (mut h, mut w) = self.cropped_dims()?;
        for (_, kernel, stride) in CONV_LAYERS {
            if h < kernel || w < kernel {
                bail!(
                    "Cropped input {}x{} is too small for the convolution stack",
                    self.input_height - self.crop_top - self.crop_bottom,
                    self.input_width
                );
            }
            h = (h - kernel) / stride + 1;
            w = (w - kernel) / stride + 1;
        }
        Ok((h, w))
    }

    /// Number of features entering the first dense layer.
    pub fn feature_dims(&self) -> Result<usize> {
        let (h, w) = self.conv_output_dims()?;
        let channels = CONV_LAYERS[CONV_LAYERS.len() - 1].0;
        Ok(channels * h * w)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<SteeringModel<B>> {
        let features = self.feature_dims()?;

        let mut in_channels = 3;
        let convs: Vec<Conv2d<B>> = CONV_LAYERS
            .iter()
            .map(|&(out_channels, kernel, stride)| {
                let conv = Conv2dConfig::new([in_channels, out_channels], [kernel, kernel])
                    .with_stride([stride, stride])
                    .init(device);
                in_channels = out_channels;
                conv
            })
            .collect();

        let mut in_features = features;
        let dense: Vec<Linear<B>> = DENSE_LAYERS
            .iter()
            .map(|&out_features| {
                let linear = LinearConfig::new(in_features, out_features).init(device);
                in_features = out_features;
                linear
            })
            .collect();

        Ok(SteeringModel {
            convs,
            dense,
            dropout:     DropoutConfig::new(self.dropout).init(),
            crop_top:    self.crop_top,
            crop_bottom: self.crop_bottom,
        })
    }
}

/// NVIDIA-style end-to-end steering network with dropout between the dense layers.
#[derive(Module, Debug)]
pub struct SteeringModel<B: Backend> {
    pub convs:       Vec<Conv2d<B>>,
    pub dense:       Vec<Linear<B>>,
    pub dropout:     Dropout,
    pub crop_top:    usize,
    pub crop_bottom: usize,
}

impl<B: Backend> SteeringModel<B> {
    /// images: [batch, 3, H, W] raw 0..255 → steering: [batch, 1]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch, channels, height, width] = images.dims();

        // Center on zero, then crop.
        let x = images.div_scalar(255.0).sub_scalar(0.5);
        let mut x = x.slice([
            0..batch,
            0..channels,
            self.crop_top..height - self.crop_bottom,
            0..width,
        ]);

        for conv in &self.convs {
            x = relu(conv.forward(x));
        }

        let mut x: Tensor<B, 2> = x.flatten(1, 3);

        // Dense layers are linear; dropout sits between them but not after the output.
        let last = self.dense.len() - 1;
        for (i, linear) in self.dense.iter().enumerate() {
            x = linear.forward(x);
            if i < last {
                x = self.dropout.forward(x);
            }
        }
        x
    }

    /// Mean squared error against `targets` ([batch, 1]).
    pub fn forward_loss(
        &self,
        images:  Tensor<B, 4>,
        targets: Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let output = self.forward(images);
        let loss   = MseLoss::new().forward(output.clone(), targets, Reduction::Mean);
        (loss, output)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_default_feature_dims() {
        // 160x320 cropped to 65x320 → 31x158 → 14x77 → 5x37 → 3x35 → 1x33
        let cfg = SteeringModelConfig::new();
        assert_eq!(cfg.cropped_dims().unwrap(), (65, 320));
        assert_eq!(cfg.conv_output_dims().unwrap(), (1, 33));
        assert_eq!(cfg.feature_dims().unwrap(), 64 * 33);
    }

    #[test]
    fn test_too_small_input_is_rejected() {
        let cfg = SteeringModelConfig::new()
            .with_input_height(60)
            .with_input_width(60)
            .with_crop_top(0)
            .with_crop_bottom(0);
        assert!(cfg.feature_dims().is_err());
    }

    #[test]
    fn test_crop_larger_than_image_is_rejected() {
        let cfg = SteeringModelConfig::new().with_input_height(90);
        assert!(cfg.cropped_dims().is_err());
    }

    #[test]
    fn test_forward_shape_on_small_frames() {
        // Smallest square input the conv stack accepts is 61x61.
        let cfg = SteeringModelConfig::new()
            .with_input_height(64)
            .with_input_width(64)
            .with_crop_top(2)
            .with_crop_bottom(1);
        let device = Default::default();
        let model: SteeringModel<TestBackend> = cfg.init(&device).unwrap();

        let images = Tensor::<TestBackend, 4>::zeros([2, 3, 64, 64], &device);
        let out    = model.forward(images);
        assert_eq!(out.dims(), [2, 1]);
    }

    #[test]
    fn test_forward_loss_is_scalar_and_finite() {
        let cfg = SteeringModelConfig::new()
            .with_input_height(61)
            .with_input_width(61)
            .with_crop_top(0)
            .with_crop_bottom(0);
        let device = Default::default();
        let model: SteeringModel<TestBackend> = cfg.init(&device).unwrap();

        let images  = Tensor::<TestBackend, 4>::ones([1, 3, 61, 61], &device).mul_scalar(128.0);
        let targets = Tensor::<TestBackend, 2>::zeros([1, 1], &device);
        let (loss, _) = model.forward_loss(images, targets);

        assert_eq!(loss.dims(), [1]);
        let value: f32 = loss.into_scalar().elem();
        assert!(value.is_finite());
    }
}

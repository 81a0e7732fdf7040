// ============================================================
// Layer 5 — CompareNet Model
// ============================================================
// A Siamese regressor:
//
//   before ─┐
//           ├─ shared conv encoder → [N, C] each
//   after  ─┘
//
//   [before, after, after - before] → Linear → ReLU → Dropout
//                                   → Linear → [N, 1] day delta

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Encoder width preset. Selected by name on the command line,
/// the same way a pretrained backbone would be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backbone {
    Tiny,
    Small,
    Base,
}

impl Backbone {
    /// Output channels of each stride-2 conv stage.
    pub fn channels(&self) -> &'static [usize] {
        match self {
            Backbone::Tiny  => &[8, 16, 32],
            Backbone::Small => &[16, 32, 64, 128],
            Backbone::Base  => &[32, 64, 128, 256],
        }
    }

    pub fn feature_dim(&self) -> usize {
        self.channels().last().copied().unwrap_or(3)
    }
}

impl FromStr for Backbone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tiny"  => Ok(Self::Tiny),
            "small" => Ok(Self::Small),
            "base"  => Ok(Self::Base),
            other   => Err(format!("Unknown backbone '{other}' (tiny, small or base)")),
        }
    }
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct CompareNetConfig {
    pub backbone: Backbone,
    #[config(default = 128)]
    pub hidden:   usize,
    #[config(default = 0.1)]
    pub dropout:  f64,
}

impl CompareNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> CompareNet<B> {
        let mut stages = Vec::new();
        let mut in_ch  = 3;
        for &out_ch in self.backbone.channels() {
            stages.push(
                Conv2dConfig::new([in_ch, out_ch], [3, 3])
                    .with_stride([2, 2])
                    .with_padding(PaddingConfig2d::Explicit(1, 1))
                    .init(device),
            );
            in_ch = out_ch;
        }
        let feature_dim = self.backbone.feature_dim();

        CompareNet {
            stages,
            pool:    AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            fc1:     LinearConfig::new(feature_dim * 3, self.hidden).init(device),
            fc2:     LinearConfig::new(self.hidden, 1).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

/// Siamese regressor: one shared encoder sees both images, the
/// head sees `[before, after, after - before]` and predicts days.
#[derive(Module, Debug)]
pub struct CompareNet<B: Backend> {
    pub stages:  Vec<Conv2d<B>>,
    pub pool:    AdaptiveAvgPool2d,
    pub fc1:     Linear<B>,
    pub fc2:     Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> CompareNet<B> {
    /// images: [batch, 3, H, W] → features: [batch, feature_dim]
    pub fn encode(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = images;
        for stage in &self.stages {
            x = relu(stage.forward(x));
        }
        let [batch, channels, _, _] = x.dims();
        self.pool.forward(x).reshape([batch, channels])
    }

    /// before, after: [batch, 3, H, W] → predicted delta: [batch, 1]
    pub fn forward(&self, before: Tensor<B, 4>, after: Tensor<B, 4>) -> Tensor<B, 2> {
        let before = self.encode(before);
        let after  = self.encode(after);
        let diff   = after.clone() - before.clone();

        let x = Tensor::cat(vec![before, after, diff], 1);
        let x = self.dropout.forward(relu(self.fc1.forward(x)));
        self.fc2.forward(x)
    }
}

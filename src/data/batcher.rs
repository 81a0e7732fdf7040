// ============================================================
// Layer 4 — Pair Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<PairItem>
// into image tensors the model can consume.
//
// How batching works here:
//   Input:  N PairItems, each holding two CHW images of H×W
//   Output: PairBatch with before/after tensors of [N, 3, H, W]
//
//   Every image is flattened into one long Vec<f32> in order,
//   then reshaped:
//   [img1_c0..., img1_c1..., img1_c2..., img2_c0..., ...] → [N, 3, H, W]
//
// All images in one batch must share H and W. The transform
// resizes by the shorter edge, so a table whose photos all come
// from the same camera satisfies this automatically.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::PairItem;
use crate::data::transform::TransformedImage;

/// A batch of image pairs ready for the forward pass.
#[derive(Debug, Clone)]
pub struct PairBatch<B: Backend> {
    /// Earlier images, shape [batch_size, 3, height, width]
    pub before: Tensor<B, 4>,

    /// Later images, shape [batch_size, 3, height, width]
    pub after: Tensor<B, 4>,

    /// Day deltas, shape [batch_size]; None for test batches
    pub time_delta: Option<Tensor<B, 1>>,
}

#[derive(Clone, Debug)]
pub struct PairBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> PairBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    fn stack_images<'a>(
        &self,
        images: impl Iterator<Item = &'a TransformedImage>,
        n:      usize,
        h:      usize,
        w:      usize,
    ) -> Tensor<B, 4> {
        let mut flat: Vec<f32> = Vec::with_capacity(n * 3 * h * w);
        for img in images {
            assert!(
                img.height == h && img.width == w,
                "all images in a batch must share dimensions: expected {}x{}, got {}x{}",
                h, w, img.height, img.width
            );
            flat.extend_from_slice(&img.chw);
        }
        Tensor::<B, 1>::from_data(TensorData::new(flat, [n * 3 * h * w]), &self.device)
            .reshape([n, 3, h, w])
    }
}

impl<B: Backend> Batcher<PairItem, PairBatch<B>> for PairBatcher<B> {
    fn batch(&self, items: Vec<PairItem>) -> PairBatch<B> {
        let batch_size = items.len();
        assert!(batch_size > 0, "cannot batch zero items");
        let (h, w) = (items[0].before.height, items[0].before.width);

        let before = self.stack_images(items.iter().map(|i| &i.before), batch_size, h, w);
        let after  = self.stack_images(items.iter().map(|i| &i.after),  batch_size, h, w);

        // Labels are all-or-nothing: a batch comes from one table
        let labels: Option<Vec<f32>> = items
            .iter()
            .map(|i| i.time_delta.map(|d| d as f32))
            .collect();
        let time_delta = labels.map(|l| {
            Tensor::<B, 1>::from_data(TensorData::new(l, [batch_size]), &self.device)
        });

        PairBatch { before, after, time_delta }
    }
}

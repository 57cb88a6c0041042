// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
//   - Training runs on an autodiff backend (Autodiff<Wgpu>)
//   - model.valid() drops to the inner backend for validation,
//     which also switches dropout off
//   - argmax(1) returns [batch, 1], flattened before .equal()
//
// Loss is categorical cross-entropy on the next word; accuracy
// is the share of validation prefixes whose argmax is the target.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::CaptionBatcher, dataset::CaptionDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{CaptionModel, CaptionModelConfig};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: CaptionDataset,
    val_dataset:   CaptionDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop::<MyBackend>(cfg, train_dataset, val_dataset, ckpt_manager, metrics, device)
        .map(|_| ())
}

/// Returns the trained model (on the training backend).
pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: CaptionDataset,
    val_dataset:   CaptionDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<CaptionModel<B>> {

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: CaptionModel<B> = CaptionModelConfig::from(cfg).init(&device);
    tracing::info!(
        "Model ready: vocab_size={}, max_length={}, emb_size={}",
        cfg.vocab_size, cfg.max_length, cfg.emb_size
    );

    let mut optim = AdamConfig::new().init();

    let train_batcher = CaptionBatcher::<B>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    let val_batcher = CaptionBatcher::<B::InnerBackend>::new(device.clone());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut best_val_loss = f64::INFINITY;

    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.features, batch.input_ids, batch.targets);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();

        let mut val_loss_sum  = 0.0f64;
        let mut val_batches   = 0usize;
        let mut correct       = 0usize;
        let mut total_samples = 0usize;

        for batch in val_loader.iter() {
            total_samples += batch.targets.dims()[0];

            let (loss, logits) = model_valid.forward_loss(
                batch.features,
                batch.input_ids,
                batch.targets.clone(),
            );
            val_loss_sum += loss.into_scalar().elem::<f64>();
            val_batches  += 1;

            let predicted = logits.argmax(1).flatten::<1>(0, 1);
            let hits: i64 = predicted
                .equal(batch.targets)
                .int().sum().into_scalar().elem::<i64>();
            correct += hits as usize;
        }

        let avg_val_loss = if val_batches   > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };
        let val_accuracy = if total_samples > 0 { correct as f64 / total_samples as f64 } else { 0.0 };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}%",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss, val_accuracy * 100.0,
        );

        let row = EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, val_accuracy);
        if row.is_improvement(best_val_loss) {
            best_val_loss = row.val_loss;
            tracing::info!("New best validation loss {:.4} at epoch {}", best_val_loss, epoch);
        }
        metrics.log(&row)?;

        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint for epoch {} saved to '{}'", epoch, ckpt_manager.dir().display());
    }

    tracing::info!("Training complete! Metrics in '{}'", metrics.csv_path().display());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use burn::backend::{Autodiff, NdArray};

    use crate::data::sequences::SequenceItem;
    use crate::domain::features::{FeatureMap, FEATURE_SIZE};

    #[test]
    fn test_one_epoch_writes_checkpoint_and_metrics() {
        let dir     = tempfile::tempdir().unwrap();
        let path    = dir.path().to_string_lossy().into_owned();
        let ckpt    = CheckpointManager::new(&path).unwrap();
        let metrics = MetricsLogger::new(&path).unwrap();

        let mut features = FeatureMap::new();
        features.insert("img".to_string(), vec![0.5; FEATURE_SIZE]);
        let features = Arc::new(features);

        let items = vec![
            SequenceItem { image_id: "img".into(), input_ids: vec![0, 0, 1], target: 2 },
            SequenceItem { image_id: "img".into(), input_ids: vec![0, 1, 2], target: 3 },
        ];

        let cfg = TrainConfig {
            vocab_size: 4,
            max_length: 3,
            emb_size:   8,
            epochs:     1,
            batch_size: 2,
            ..TrainConfig::default()
        };

        let model = train_loop::<Autodiff<NdArray>>(
            &cfg,
            CaptionDataset::new(features.clone(), items.clone()),
            CaptionDataset::new(features, items),
            &ckpt,
            &metrics,
            Default::default(),
        )
        .unwrap();

        assert_eq!(model.max_len, 3);
        assert!(ckpt.dir().join("latest_epoch.json").exists());
        let csv = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }
}

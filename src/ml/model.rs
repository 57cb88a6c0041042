use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig, LstmState,
    },
    prelude::*,
    tensor::activation::{relu, softmax},
};

use crate::application::train_use_case::TrainConfig;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct CaptionModelConfig {
    pub vocab_size: usize,
    pub max_len:    usize,
    #[config(default = 0.5)]
    pub dropout:    f64,
    #[config(default = 256)]
    pub emb_size:   usize,
    #[config(default = 256)]
    pub lstm_units: usize,
    #[config(default = 256)]
    pub decoder_units: usize,
    #[config(default = 4096)]
    pub feature_size: usize,
}

impl CaptionModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> CaptionModel<B> {
        CaptionModel {
            image_dropout: DropoutConfig::new(self.dropout).init(),
            image_dense:   LinearConfig::new(self.feature_size, self.emb_size).init(device),
            embedding:     EmbeddingConfig::new(self.vocab_size, self.emb_size).init(device),
            seq_dropout:   DropoutConfig::new(self.dropout).init(),
            lstm:          LstmConfig::new(self.emb_size, self.lstm_units, true).init(device),
            decoder_dense: LinearConfig::new(self.emb_size + self.lstm_units, self.decoder_units)
                .init(device),
            output:        LinearConfig::new(self.decoder_units, self.vocab_size).init(device),
            lstm_units:    self.lstm_units,
            max_len:       self.max_len,
        }
    }
}

/// Architecture of a training run. Training and checkpoint loading both
/// go through here so saved weights always fit the rebuilt model.
impl From<&TrainConfig> for CaptionModelConfig {
    fn from(cfg: &TrainConfig) -> Self {
        CaptionModelConfig::new(cfg.vocab_size, cfg.max_length)
            .with_dropout(cfg.dropout)
            .with_emb_size(cfg.emb_size)
    }
}

/// Untrained merge model with the default sizes: 4096-d features,
/// 256-d embedding and LSTM, dropout 0.5.
#[allow(dead_code)]
pub fn define_model<B: Backend>(vocab_size: usize, max_len: usize, device: &B::Device) -> CaptionModel<B> {
    CaptionModelConfig::new(vocab_size, max_len).init(device)
}

/// Two-branch "merge" captioner.
///
/// ```text
/// image [N, 4096] ─ dropout ─ dense(256) ─ relu ───────────┐
///                                                           concat ─ dense(256) ─ relu ─ dense(V) ─ softmax
/// words [N, L] ─ embedding(256) ─ dropout ─ lstm(256) ──────┘
/// ```
#[derive(Module, Debug)]
pub struct CaptionModel<B: Backend> {
    pub image_dropout: Dropout,
    pub image_dense:   Linear<B>,
    pub embedding:     Embedding<B>,
    pub seq_dropout:   Dropout,
    pub lstm:          Lstm<B>,
    pub decoder_dense: Linear<B>,
    pub output:        Linear<B>,
    pub lstm_units:    usize,
    pub max_len:       usize,
}

impl<B: Backend> CaptionModel<B> {
    /// features: [batch, feature_size], input_ids: [batch, seq_len]
    /// → next-word probabilities [batch, vocab_size]
    pub fn forward(&self, features: Tensor<B, 2>, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        softmax(self.forward_logits(features, input_ids), 1)
    }

    /// Same as `forward` but before the softmax.
    pub fn forward_logits(&self, features: Tensor<B, 2>, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let image = relu(self.image_dense.forward(self.image_dropout.forward(features)));

        // 1.0 for real words, 0.0 for padding
        let mask = input_ids.clone().greater_elem(0).float();
        let embedded = self.seq_dropout.forward(self.embedding.forward(input_ids));
        let sequence = self.encode_sequence(embedded, mask);

        let merged = Tensor::cat(vec![image, sequence], 1);
        let hidden = relu(self.decoder_dense.forward(merged));
        self.output.forward(hidden)
    }

    /// Run the LSTM one step at a time and return the final hidden
    /// state. Masked steps leave cell and hidden state untouched, so
    /// leading padding has no effect on the summary.
    fn encode_sequence(&self, embedded: Tensor<B, 3>, mask: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch_size, seq_len, d_emb] = embedded.dims();
        let device = embedded.device();

        let mut cell   = Tensor::<B, 2>::zeros([batch_size, self.lstm_units], &device);
        let mut hidden = Tensor::<B, 2>::zeros([batch_size, self.lstm_units], &device);

        for t in 0..seq_len {
            let step = embedded.clone().slice([0..batch_size, t..t + 1, 0..d_emb]);
            let state = LstmState::new(cell.clone(), hidden.clone());
            let (_, next) = self.lstm.forward(step, Some(state));

            let keep = mask.clone().slice([0..batch_size, t..t + 1]); // [batch, 1]
            let skip = keep.clone().neg().add_scalar(1.0);

            cell   = next.cell * keep.clone() + cell * skip.clone();
            hidden = next.hidden * keep + hidden * skip;
        }

        hidden
    }

    /// Categorical cross-entropy against the next-word index.
    /// Returns the scalar loss and the logits for accuracy tracking.
    pub fn forward_loss(
        &self,
        features:  Tensor<B, 2>,
        input_ids: Tensor<B, 2, Int>,
        targets:   Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward_logits(features, input_ids);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets);
        (loss, logits)
    }
}

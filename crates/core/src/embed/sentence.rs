//! Sentence embeddings from a local BERT-family model (MiniLM and friends).
//!
//! The model directory must hold `config.json`, `tokenizer.json` and either
//! `model.safetensors` or `pytorch_model.bin`. Nothing is downloaded.

use std::fmt::Display;
use std::path::Path;

use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::Embedder;
use crate::error::{OutlineError, Result};

/// Headings are short; longer inputs are cut to this many tokens.
const MAX_SEQ_LEN: usize = 256;

fn embedding_error(context: &str, err: impl Display) -> OutlineError {
    OutlineError::Embedding(format!("{context}: {err}"))
}

/// Mean-pooled, L2-normalised BERT embeddings on the CPU.
pub struct SentenceEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl SentenceEmbedder {
    /// Loads a model from a local directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let device = Device::Cpu;

        let config_path = dir.join("config.json");
        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|err| embedding_error(&config_path.display().to_string(), err))?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|err| embedding_error("invalid BERT config", err))?;

        let tokenizer_path = dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|err| embedding_error(&tokenizer_path.display().to_string(), err))?;

        let safetensors = dir.join("model.safetensors");
        let vb = if safetensors.is_file() {
            // SAFETY: the weights file is not modified while mapped.
            unsafe { VarBuilder::from_mmaped_safetensors(&[&safetensors], DType::F32, &device) }
                .map_err(|err| embedding_error("safetensors weights", err))?
        } else {
            VarBuilder::from_pth(dir.join("pytorch_model.bin"), DType::F32, &device)
                .map_err(|err| embedding_error("pytorch weights", err))?
        };

        // sentence-transformers exports drop the "bert" prefix
        let model = BertModel::load(vb.pp("bert"), &config)
            .or_else(|_| BertModel::load(vb, &config))
            .map_err(|err| embedding_error("loading BERT model", err))?;

        info!(model = %dir.display(), "loaded sentence embedding model");
        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    fn tokenize(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|err| embedding_error("tokenization failed", err))?;
        let mut tokens = encoding.get_ids().to_vec();
        tokens.truncate(MAX_SEQ_LEN);
        Ok(tokens)
    }

    fn forward(&self, tokens: &[u32]) -> candle_core::Result<Tensor> {
        let input_ids = Tensor::new(tokens, &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::zeros((1, tokens.len()), DType::U32, &self.device)?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, None)?;
        // [1, seq_len, hidden] -> [hidden]
        let pooled = hidden.i(0)?.mean(0)?;
        l2_normalize_1d(&pooled)
    }
}

impl Embedder for SentenceEmbedder {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        let tokens = self.tokenize(text)?;
        debug!(tokens = tokens.len(), "embedding heading");
        self.forward(&tokens)
            .and_then(|tensor| tensor.to_vec1::<f32>())
            .map_err(|err| embedding_error("forward pass failed", err))
    }
}

fn l2_normalize_1d(tensor: &Tensor) -> candle_core::Result<Tensor> {
    let norm = tensor
        .sqr()?
        .sum_all()?
        .sqrt()?
        .to_scalar::<f32>()?
        .max(1e-12);
    tensor / f64::from(norm)
}

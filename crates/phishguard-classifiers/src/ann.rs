//! Feed-forward neural network scorer
//!
//! Dense layers over standardized inputs, evaluated with `ndarray`.

use crate::classifier::{sigmoid, Classifier, ModelKind, Score};
use ndarray::{Array1, Array2};
use phishguard_core::{Error, FeatureSchema, FeatureVector, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Element-wise activation applied after a dense layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    Linear,
}

impl Activation {
    fn apply(&self, x: f32) -> f32 {
        match self {
            Self::Relu => x.max(0.0),
            Self::Sigmoid => sigmoid(x),
            Self::Tanh => x.tanh(),
            Self::Linear => x,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NetworkFile {
    #[serde(default)]
    name: Option<String>,
    feature_names: Vec<String>,
    #[serde(default)]
    scaler: Option<ScalerFile>,
    layers: Vec<LayerFile>,
}

#[derive(Debug, Deserialize)]
struct ScalerFile {
    mean: Vec<f32>,
    scale: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct LayerFile {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
    activation: Activation,
}

#[derive(Debug, Clone)]
struct Dense {
    weights: Array2<f32>,
    bias: Array1<f32>,
    activation: Activation,
}

/// Standardization applied before the first layer: `(x - mean) / scale`
#[derive(Debug, Clone)]
struct Scaler {
    mean: Array1<f32>,
    scale: Array1<f32>,
}

/// Neural network scorer
#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    name: String,
    scaler: Option<Scaler>,
    layers: Vec<Dense>,
    num_features: usize,
}

impl NeuralNetwork {
    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>, schema: FeatureSchema) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read network {}: {}", path.display(), e))
        })?;
        let model = Self::from_json(&json, schema)?;

        info!(
            "Loaded neural network '{}' from {} ({} layers)",
            model.name,
            path.display(),
            model.layers.len()
        );
        Ok(model)
    }

    /// Parse and validate a JSON network against a schema
    pub fn from_json(json: &str, schema: FeatureSchema) -> Result<Self> {
        let file: NetworkFile = serde_json::from_str(json)?;
        schema.check_names(&file.feature_names)?;

        let num_features = schema.len();
        let scaler = file
            .scaler
            .map(|s| build_scaler(s, num_features))
            .transpose()?;

        if file.layers.is_empty() {
            return Err(Error::config("network has no layers"));
        }

        let mut layers = Vec::with_capacity(file.layers.len());
        let mut inputs = num_features;
        for (i, layer) in file.layers.into_iter().enumerate() {
            let dense = build_layer(i, layer, inputs)?;
            inputs = dense.bias.len();
            layers.push(dense);
        }

        if inputs != 1 {
            return Err(Error::config(format!(
                "network output has {} units, expected 1",
                inputs
            )));
        }
        if let Some(last) = layers.last() {
            if !matches!(last.activation, Activation::Sigmoid | Activation::Linear) {
                return Err(Error::config(
                    "network output activation must be sigmoid or linear",
                ));
            }
        }

        Ok(Self {
            name: file.name.unwrap_or_else(|| "ann".to_string()),
            scaler,
            layers,
            num_features,
        })
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    fn forward(&self, values: &[f32]) -> f32 {
        let mut x = Array1::from(values.to_vec());
        if let Some(scaler) = &self.scaler {
            x = (&x - &scaler.mean) / &scaler.scale;
        }

        for layer in &self.layers {
            x = layer.weights.dot(&x) + &layer.bias;
            x.mapv_inplace(|v| layer.activation.apply(v));
        }

        x[0]
    }

    fn output_is_probability(&self) -> bool {
        self.layers
            .last()
            .is_some_and(|l| l.activation == Activation::Sigmoid)
    }
}

fn build_scaler(file: ScalerFile, num_features: usize) -> Result<Scaler> {
    if file.mean.len() != num_features || file.scale.len() != num_features {
        return Err(Error::config(format!(
            "scaler has {} means and {} scales for {} features",
            file.mean.len(),
            file.scale.len(),
            num_features
        )));
    }
    if file.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
        return Err(Error::config("scaler has a zero or non-finite scale"));
    }
    if file.mean.iter().any(|m| !m.is_finite()) {
        return Err(Error::config("scaler has a non-finite mean"));
    }

    Ok(Scaler {
        mean: Array1::from(file.mean),
        scale: Array1::from(file.scale),
    })
}

fn build_layer(i: usize, file: LayerFile, inputs: usize) -> Result<Dense> {
    let outputs = file.weights.len();
    if outputs == 0 || file.bias.len() != outputs {
        return Err(Error::config(format!(
            "layer {} has {} weight rows and {} biases",
            i,
            outputs,
            file.bias.len()
        )));
    }
    if let Some(row) = file.weights.iter().position(|r| r.len() != inputs) {
        return Err(Error::config(format!(
            "layer {} row {} has {} weights, expected {}",
            i,
            row,
            file.weights[row].len(),
            inputs
        )));
    }

    let flat: Vec<f32> = file.weights.into_iter().flatten().collect();
    if flat.iter().chain(&file.bias).any(|w| !w.is_finite()) {
        return Err(Error::config(format!("layer {} has non-finite parameters", i)));
    }

    let weights = Array2::from_shape_vec((outputs, inputs), flat)
        .map_err(|e| Error::config(format!("layer {}: {}", i, e)))?;

    Ok(Dense {
        weights,
        bias: Array1::from(file.bias),
        activation: file.activation,
    })
}

impl Classifier for NeuralNetwork {
    fn score(&self, features: &FeatureVector) -> Result<Score> {
        if features.len() != self.num_features {
            return Err(Error::inference(
                &self.name,
                format!("expected {} features, got {}", self.num_features, features.len()),
            ));
        }

        let out = self.forward(features.values());
        Ok(if self.output_is_probability() {
            Score::Probability(out)
        } else {
            Score::Margin(out)
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Ann
    }
}

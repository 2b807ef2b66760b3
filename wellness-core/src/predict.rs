//! Wellness score prediction
//!
//! The regression model is trained elsewhere. The core only sees it through
//! the [`Predictor`] trait: six input features in, one score out.
//!
//! [`LinearModel`] is the bundled implementation. It reads a JSON artifact
//! holding a standard-scaler (per-feature mean and scale) followed by a
//! linear regression (coefficients and intercept):
//!
//! ```json
//! {
//!   "model_name": "Ridge",
//!   "features": ["sleepHours", "calories", "steps", "waterIntake", "screenTime", "stressLevel"],
//!   "scaler": { "mean": [7.0, 2100.0, 7500.0, 2.2, 4.5, 5.0],
//!               "scale": [1.2, 450.0, 3000.0, 0.8, 2.0, 2.1] },
//!   "coefficients": [4.1, 1.2, 5.3, 2.2, -3.0, -4.4],
//!   "intercept": 62.5,
//!   "metrics": { "rmse": 4.87, "r2": 0.91 }
//! }
//! ```

use crate::error::{Error, Result};
use crate::types::{Metric, MetricSnapshot};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Lowest score a predictor result is clipped to.
pub const MIN_SCORE: f64 = 0.0;
/// Highest score a predictor result is clipped to.
pub const MAX_SCORE: f64 = 100.0;

// ============================================
// Features
// ============================================

/// The six model inputs, absent metrics set to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; 6],
}

impl FeatureVector {
    pub fn from_snapshot(snapshot: &MetricSnapshot) -> Self {
        Self {
            values: Metric::INPUTS.map(|m| snapshot.value_or_zero(m)),
        }
    }

    /// Value of an input metric. [`Metric::WellnessScore`] is not an input
    /// and reads as zero.
    pub fn get(&self, metric: Metric) -> f64 {
        Metric::INPUTS
            .iter()
            .position(|&m| m == metric)
            .map(|i| self.values[i])
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::INPUTS.iter().copied().zip(self.values.iter().copied())
    }
}

/// A source of wellness scores.
pub trait Predictor: Send + Sync {
    /// Raw model output. Callers clip it with [`clip_score`].
    fn predict(&self, features: &FeatureVector) -> Result<f64>;
}

impl<F> Predictor for F
where
    F: Fn(&FeatureVector) -> Result<f64> + Send + Sync,
{
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        self(features)
    }
}

/// Clip a raw prediction into `[0, 100]`.
///
/// Non-finite output is a prediction failure, not a score.
pub fn clip_score(raw: f64) -> Result<f64> {
    if !raw.is_finite() {
        return Err(Error::Prediction(format!(
            "predictor returned a non-finite score: {}",
            raw
        )));
    }
    Ok(raw.clamp(MIN_SCORE, MAX_SCORE))
}

// ============================================
// Linear model artifact
// ============================================

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    #[serde(default)]
    model_name: Option<String>,
    features: Vec<String>,
    #[serde(default)]
    scaler: Option<ScalerArtifact>,
    coefficients: Vec<f64>,
    intercept: f64,
    #[serde(default)]
    metrics: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct ScalerArtifact {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Metadata about a loaded model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub features: Vec<Metric>,
    pub metrics: BTreeMap<String, f64>,
    /// SHA-256 of the artifact bytes, hex encoded
    pub fingerprint: String,
    pub source: Option<PathBuf>,
}

/// Standard-scaled linear regression over the input metrics.
#[derive(Debug, Clone)]
pub struct LinearModel {
    features: Vec<Metric>,
    means: Vec<f64>,
    scales: Vec<f64>,
    coefficients: Vec<f64>,
    intercept: f64,
    info: ModelInfo,
}

impl LinearModel {
    /// Load a model artifact from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "model artifact not found at {:?}",
                path
            )));
        }

        let bytes = std::fs::read(path)?;
        let mut model = Self::from_slice(&bytes)?;
        model.info.source = Some(path.to_path_buf());

        tracing::info!(
            path = %path.display(),
            model = %model.info.model_name,
            fingerprint = %model.info.fingerprint,
            "Loaded wellness model"
        );
        Ok(model)
    }

    /// Parse a model artifact from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_slice(json.as_bytes())
    }

    fn from_slice(bytes: &[u8]) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes)?;

        let features = artifact
            .features
            .iter()
            .map(|name| match name.parse::<Metric>() {
                Ok(Metric::WellnessScore) | Err(_) => Err(Error::Config(format!(
                    "model references unknown input feature {:?}",
                    name
                ))),
                Ok(metric) => Ok(metric),
            })
            .collect::<Result<Vec<_>>>()?;

        let n = features.len();
        if n == 0 {
            return Err(Error::Config("model declares no features".to_string()));
        }
        if artifact.coefficients.len() != n {
            return Err(Error::Config(format!(
                "model has {} features but {} coefficients",
                n,
                artifact.coefficients.len()
            )));
        }

        let (means, scales) = match artifact.scaler {
            Some(scaler) => {
                if scaler.mean.len() != n || scaler.scale.len() != n {
                    return Err(Error::Config(format!(
                        "scaler shape does not match {} features",
                        n
                    )));
                }
                if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                    return Err(Error::Config(
                        "scaler contains a zero or non-finite scale".to_string(),
                    ));
                }
                (scaler.mean, scaler.scale)
            }
            None => (vec![0.0; n], vec![1.0; n]),
        };

        let info = ModelInfo {
            model_name: artifact
                .model_name
                .unwrap_or_else(|| "linear".to_string()),
            features: features.clone(),
            metrics: artifact.metrics,
            fingerprint: hex::encode(Sha256::digest(bytes)),
            source: None,
        };

        Ok(Self {
            features,
            means,
            scales,
            coefficients: artifact.coefficients,
            intercept: artifact.intercept,
            info,
        })
    }

    pub fn model_info(&self) -> &ModelInfo {
        &self.info
    }

    /// Features ranked by absolute coefficient, largest first.
    pub fn feature_importance(&self) -> Vec<(Metric, f64)> {
        let mut ranked: Vec<(Metric, f64)> = self
            .features
            .iter()
            .copied()
            .zip(self.coefficients.iter().map(|c| c.abs()))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let score = self
            .features
            .iter()
            .enumerate()
            .map(|(i, &metric)| {
                let scaled = (features.get(metric) - self.means[i]) / self.scales[i];
                scaled * self.coefficients[i]
            })
            .sum::<f64>()
            + self.intercept;

        if !score.is_finite() {
            return Err(Error::Prediction(format!(
                "model produced a non-finite score for {:?}",
                features
            )));
        }
        Ok(score)
    }
}

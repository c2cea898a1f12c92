//! Gradient-boosted decision tree ensemble
//!
//! Loads a JSON tree dump and evaluates it natively. Each tree is a flat node
//! array rooted at index 0; a sample descends left when
//! `features[feature] < threshold`. The ensemble margin is `base_score` plus
//! the sum of the reached leaves.

use crate::classifier::{sigmoid, Classifier, ModelKind, Score};
use phishguard_core::{Error, FeatureSchema, FeatureVector, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// How the ensemble margin is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Objective {
    /// Margin passed through the logistic function
    #[default]
    #[serde(rename = "binary:logistic")]
    Logistic,

    /// Margin reported as is
    #[serde(rename = "binary:logitraw")]
    LogitRaw,
}

#[derive(Debug, Deserialize)]
struct TreeModelFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    objective: Objective,
    #[serde(default)]
    base_score: f32,
    feature_names: Vec<String>,
    trees: Vec<TreeFile>,
}

#[derive(Debug, Deserialize)]
struct TreeFile {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        leaf: f32,
    },
}

/// Tree ensemble scorer
#[derive(Debug, Clone)]
pub struct GradientBoostedTrees {
    name: String,
    objective: Objective,
    base_score: f32,
    trees: Vec<Vec<Node>>,
    num_features: usize,
}

impl GradientBoostedTrees {
    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>, schema: FeatureSchema) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read tree model {}: {}", path.display(), e))
        })?;
        let model = Self::from_json(&json, schema)?;

        info!(
            "Loaded tree ensemble '{}' from {} ({} trees)",
            model.name,
            path.display(),
            model.trees.len()
        );
        Ok(model)
    }

    /// Parse and validate a JSON tree dump against a schema
    pub fn from_json(json: &str, schema: FeatureSchema) -> Result<Self> {
        let file: TreeModelFile = serde_json::from_str(json)?;
        schema.check_names(&file.feature_names)?;

        if file.trees.is_empty() {
            return Err(Error::config("tree model has no trees"));
        }
        if !file.base_score.is_finite() {
            return Err(Error::config("tree model base_score is not finite"));
        }

        let num_features = schema.len();
        for (t, tree) in file.trees.iter().enumerate() {
            validate_tree(t, &tree.nodes, num_features)?;
        }

        Ok(Self {
            name: file.name.unwrap_or_else(|| "gbdt".to_string()),
            objective: file.objective,
            base_score: file.base_score,
            trees: file.trees.into_iter().map(|t| t.nodes).collect(),
            num_features,
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Sum of leaf values plus the base score
    pub fn margin(&self, values: &[f32]) -> f32 {
        self.base_score + self.trees.iter().map(|nodes| eval_tree(nodes, values)).sum::<f32>()
    }
}

/// Children must point strictly forward so that every descent terminates
fn validate_tree(t: usize, nodes: &[Node], num_features: usize) -> Result<()> {
    if nodes.is_empty() {
        return Err(Error::config(format!("tree {} has no nodes", t)));
    }

    for (i, node) in nodes.iter().enumerate() {
        match *node {
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if feature >= num_features {
                    return Err(Error::config(format!(
                        "tree {} node {} splits on feature {} of {}",
                        t, i, feature, num_features
                    )));
                }
                if !threshold.is_finite() {
                    return Err(Error::config(format!(
                        "tree {} node {} has a non-finite threshold",
                        t, i
                    )));
                }
                for child in [left, right] {
                    if child <= i || child >= nodes.len() {
                        return Err(Error::config(format!(
                            "tree {} node {} has invalid child {}",
                            t, i, child
                        )));
                    }
                }
            }
            Node::Leaf { leaf } => {
                if !leaf.is_finite() {
                    return Err(Error::config(format!(
                        "tree {} node {} has a non-finite leaf",
                        t, i
                    )));
                }
            }
        }
    }

    Ok(())
}

fn eval_tree(nodes: &[Node], values: &[f32]) -> f32 {
    let mut idx = 0;
    loop {
        match nodes[idx] {
            Node::Leaf { leaf } => return leaf,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                idx = if values[feature] < threshold { left } else { right };
            }
        }
    }
}

impl Classifier for GradientBoostedTrees {
    fn score(&self, features: &FeatureVector) -> Result<Score> {
        if features.len() != self.num_features {
            return Err(Error::inference(
                &self.name,
                format!("expected {} features, got {}", self.num_features, features.len()),
            ));
        }

        let margin = self.margin(features.values());
        Ok(match self.objective {
            Objective::Logistic => Score::Probability(sigmoid(margin)),
            Objective::LogitRaw => Score::Margin(margin),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Gbdt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phishguard_core::features::names;

    fn feature_names() -> String {
        serde_json::to_string(&FeatureSchema::standard().names().collect::<Vec<_>>()).unwrap()
    }

    /// One stump on has_ip_host (index 9)
    fn stump(objective: &str) -> String {
        format!(
            r#"{{
                "objective": "{}",
                "base_score": 0.25,
                "feature_names": {},
                "trees": [{{"nodes": [
                    {{"feature": 9, "threshold": 0.5, "left": 1, "right": 2}},
                    {{"leaf": -1.25}},
                    {{"leaf": 2.0}}
                ]}}]
            }}"#,
            objective,
            feature_names()
        )
    }

    fn vector(ip: f32) -> FeatureVector {
        let schema = FeatureSchema::standard();
        let mut values = vec![0.0; schema.len()];
        values[schema.index_of(names::HAS_IP_HOST).unwrap()] = ip;
        FeatureVector::new(schema, values)
    }

    #[test]
    fn test_stump_probability() {
        let model =
            GradientBoostedTrees::from_json(&stump("binary:logistic"), FeatureSchema::standard())
                .unwrap();
        assert_eq!(model.num_trees(), 1);

        let Score::Probability(p) = model.score(&vector(1.0)).unwrap() else {
            panic!("expected a probability");
        };
        assert!((p - sigmoid(2.25)).abs() < 1e-6);

        let Score::Probability(p) = model.score(&vector(0.0)).unwrap() else {
            panic!("expected a probability");
        };
        assert!((p - sigmoid(-1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_logitraw_reports_margin() {
        let model =
            GradientBoostedTrees::from_json(&stump("binary:logitraw"), FeatureSchema::standard())
                .unwrap();
        assert_eq!(model.score(&vector(1.0)).unwrap(), Score::Margin(2.25));
    }

    #[test]
    fn test_threshold_goes_right() {
        let model =
            GradientBoostedTrees::from_json(&stump("binary:logitraw"), FeatureSchema::standard())
                .unwrap();
        assert_eq!(model.score(&vector(0.5)).unwrap(), Score::Margin(2.25));
    }

    #[test]
    fn test_backward_child_rejected() {
        let json = format!(
            r#"{{"feature_names": {}, "trees": [{{"nodes": [
                {{"feature": 0, "threshold": 1.0, "left": 1, "right": 0}},
                {{"leaf": 1.0}}
            ]}}]}}"#,
            feature_names()
        );
        let err = GradientBoostedTrees::from_json(&json, FeatureSchema::standard()).unwrap_err();
        assert!(err.to_string().contains("invalid child 0"));
    }

    #[test]
    fn test_out_of_range_feature_rejected() {
        let json = format!(
            r#"{{"feature_names": {}, "trees": [{{"nodes": [
                {{"feature": 16, "threshold": 1.0, "left": 1, "right": 2}},
                {{"leaf": 1.0}},
                {{"leaf": 0.0}}
            ]}}]}}"#,
            feature_names()
        );
        assert!(GradientBoostedTrees::from_json(&json, FeatureSchema::standard()).is_err());
    }

    #[test]
    fn test_feature_name_mismatch_is_schema_error() {
        let json = r#"{"feature_names": ["url_length"], "trees": [{"nodes": [{"leaf": 0.0}]}]}"#;
        let err = GradientBoostedTrees::from_json(json, FeatureSchema::standard()).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)));
    }

    #[test]
    fn test_empty_ensemble_rejected() {
        let json = format!(r#"{{"feature_names": {}, "trees": []}}"#, feature_names());
        assert!(GradientBoostedTrees::from_json(&json, FeatureSchema::standard()).is_err());
    }
}

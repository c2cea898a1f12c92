//! Model registry: the closed set of classifiers a process serves

use crate::classifier::Classifier;
use crate::config::{ClassifierConfig, ModelSpec};
use parking_lot::RwLock;
use phishguard_core::{Error, FeatureSchema, ModelId, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Collects classifiers before the registry is sealed
///
/// Registration only appends; a duplicate identifier is a configuration
/// error rather than a silent replacement.
pub struct ModelRegistryBuilder {
    schema: FeatureSchema,
    models: BTreeMap<ModelId, Arc<dyn Classifier>>,
}

impl ModelRegistryBuilder {
    pub fn new(schema: FeatureSchema) -> Self {
        Self {
            schema,
            models: BTreeMap::new(),
        }
    }

    /// Register a classifier under an identifier
    pub fn register(
        &mut self,
        id: impl Into<ModelId>,
        classifier: Arc<dyn Classifier>,
    ) -> Result<&mut Self> {
        let id = id.into();
        if self.models.contains_key(&id) {
            return Err(Error::config(format!("model '{}' registered twice", id)));
        }

        info!("Registered model '{}' ({}, {})", id, classifier.name(), classifier.kind());
        self.models.insert(id, classifier);
        Ok(self)
    }

    /// Load an artifact and register it
    pub fn load(&mut self, id: impl Into<ModelId>, spec: &ModelSpec) -> Result<&mut Self> {
        let id = id.into();
        let classifier = spec
            .load(self.schema)
            .map_err(|e| match e {
                Error::SchemaMismatch(msg) => {
                    Error::schema(format!("model '{}': {}", id, msg))
                }
                other => Error::config(format!("Failed to load model '{}': {}", id, other)),
            })?;
        self.register(id, classifier)
    }

    /// Seal the registry
    pub fn build(self) -> Result<ModelRegistry> {
        if self.models.is_empty() {
            return Err(Error::config("model registry is empty"));
        }

        Ok(ModelRegistry {
            schema: self.schema,
            models: self.models,
        })
    }
}

/// Immutable mapping from model identifier to classifier
pub struct ModelRegistry {
    schema: FeatureSchema,
    models: BTreeMap<ModelId, Arc<dyn Classifier>>,
}

impl ModelRegistry {
    pub fn builder(schema: FeatureSchema) -> ModelRegistryBuilder {
        ModelRegistryBuilder::new(schema)
    }

    /// Look up a classifier; never falls back to another model
    pub fn resolve(&self, id: &ModelId) -> Result<Arc<dyn Classifier>> {
        self.models
            .get(id)
            .cloned()
            .ok_or_else(|| Error::unknown_model(id.as_str()))
    }

    pub fn contains(&self, id: &ModelId) -> bool {
        self.models.contains_key(id)
    }

    /// Registered identifiers, sorted
    pub fn ids(&self) -> Vec<ModelId> {
        self.models.keys().cloned().collect()
    }

    /// Identifiers with their classifiers, sorted by identifier
    pub fn iter(&self) -> impl Iterator<Item = (&ModelId, &Arc<dyn Classifier>)> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Schema every registered model was loaded against
    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }
}

/// Initialize a registry from classifier configuration
///
/// Any model that fails to load fails the whole registry.
pub fn init_registry_from_config(
    config: &ClassifierConfig,
    schema: FeatureSchema,
) -> Result<ModelRegistry> {
    info!("Initializing model registry with {} models", config.models.len());

    let mut builder = ModelRegistryBuilder::new(schema);
    for (id, spec) in &config.models {
        builder.load(id.as_str(), spec)?;
    }

    let registry = builder.build()?;
    info!("Model registry initialized with {} models", registry.len());
    Ok(registry)
}

/// Registry shared across request handlers, replaceable as a whole
///
/// Readers take a snapshot once per request, so a concurrent `swap` never
/// changes the model set mid-request.
#[derive(Clone)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Arc<ModelRegistry>>>,
}

impl SharedRegistry {
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// Current registry
    pub fn snapshot(&self) -> Arc<ModelRegistry> {
        self.inner.read().clone()
    }

    /// Install a new registry, returning the previous one
    pub fn swap(&self, registry: ModelRegistry) -> Arc<ModelRegistry> {
        let registry = Arc::new(registry);
        std::mem::replace(&mut *self.inner.write(), registry)
    }
}

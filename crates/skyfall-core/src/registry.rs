use std::any::type_name;
use std::collections::HashMap;

use anyhow::Result;
use thiserror::Error;

use crate::fault::contain;
use crate::feature::{Feature, FeatureHandle};

/// Discovery failed as a whole; no feature may load.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("feature id `{id}` is declared by both `{first}` and `{second}`")]
    DuplicateId {
        id: &'static str,
        first: String,
        second: String,
    },

    #[error("feature catalog is invalid: {0}")]
    Invalid(String),
}

type Factory = Box<dyn Fn() -> Result<Box<dyn Feature>>>;

struct Entry {
    label: String,
    factory: Factory,
}

/// The startup-time list of every feature the application ships.
///
/// Entries are factories; nothing is constructed until
/// [`discover`](FeatureCatalog::discover) runs.
#[derive(Default)]
pub struct FeatureCatalog {
    entries: Vec<Entry>,
    invalid: Option<String>,
}

impl FeatureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature factory. The entry is labelled with the feature's type
    /// name for logs.
    pub fn register<F, B>(&mut self, build: B) -> &mut Self
    where
        F: Feature + 'static,
        B: Fn() -> Result<F> + 'static,
    {
        self.entries.push(Entry {
            label: short_type_name::<F>().to_string(),
            factory: Box::new(move || Ok(Box::new(build()?) as Box<dyn Feature>)),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mark the whole catalog unusable. The next
    /// [`discover`](FeatureCatalog::discover) fails without building
    /// anything.
    pub fn invalidate(&mut self, reason: impl Into<String>) {
        self.invalid = Some(reason.into());
    }

    /// Instantiate every entry.
    ///
    /// An entry whose factory fails or panics, or whose feature has an
    /// empty id or name, is skipped with a warning. Two features sharing an
    /// id abort the whole pass.
    pub fn discover(&self) -> Result<Vec<FeatureHandle>, DiscoveryError> {
        if let Some(reason) = &self.invalid {
            return Err(DiscoveryError::Invalid(reason.clone()));
        }

        tracing::info!(candidates = self.entries.len(), "found potential features");
        if !self.entries.is_empty() {
            let labels: Vec<&str> = self.entries.iter().map(|e| e.label.as_str()).collect();
            tracing::info!("discovered features: [{}]", labels.join(", "));
        }

        let mut handles = Vec::with_capacity(self.entries.len());
        let mut seen: HashMap<&'static str, &str> = HashMap::new();

        for entry in &self.entries {
            let feature = match contain(|| (entry.factory)()) {
                Ok(feature) => feature,
                Err(fault) => {
                    tracing::warn!(entry = %entry.label, error = %fault, "failed to construct feature, skipping");
                    continue;
                }
            };

            if feature.id().is_empty() || feature.name().is_empty() {
                tracing::warn!(entry = %entry.label, "feature declares an empty id or name, skipping");
                continue;
            }

            if let Some(first) = seen.insert(feature.id(), entry.label.as_str()) {
                return Err(DiscoveryError::DuplicateId {
                    id: feature.id(),
                    first: first.to_string(),
                    second: entry.label.clone(),
                });
            }

            let handle = FeatureHandle::new(feature);
            tracing::info!(
                feature = handle.name(),
                "feature type: [{}]",
                handle.capabilities().labels().join(", ")
            );
            handles.push(handle);
        }

        Ok(handles)
    }
}

fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

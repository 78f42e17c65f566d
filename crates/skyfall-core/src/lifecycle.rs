use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;

use crate::fault::contain;
use crate::feature::{FeatureHandle, FeatureKind};
use crate::registry::{DiscoveryError, FeatureCatalog};
use crate::services::FeatureServices;

/// What a sync pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub started: Vec<&'static str>,
    pub stopped: Vec<&'static str>,
    /// Features whose transition hook failed, with the error message.
    pub failed: Vec<(&'static str, String)>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.started.is_empty() && self.stopped.is_empty() && self.failed.is_empty()
    }
}

/// Feature counts for the console and debug output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeatureStats {
    pub total: usize,
    pub running: usize,
    pub event_system: usize,
    pub legacy: usize,
    pub hud_capable: usize,
    pub slot_capable: usize,
}

/// One row of [`FeatureManager::features`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: FeatureKind,
    pub running: bool,
}

/// Sync every feature's running state with its predicate.
///
/// A feature whose predicate is true and which is stopped is started; one
/// whose predicate is false and which is running is stopped. Features that
/// already agree are left alone. A failing predicate or transition is
/// logged and reported against that feature only.
pub fn sync_feature_states(features: &[FeatureHandle], services: &FeatureServices) -> SyncReport {
    let mut report = SyncReport::default();

    for feature in features {
        let should_load = match contain(|| Ok(feature.should_load())) {
            Ok(Some(should_load)) => should_load,
            Ok(None) => {
                tracing::warn!(feature = feature.name(), "feature busy, skipping state update");
                continue;
            }
            Err(fault) => {
                let message = fault.to_string();
                tracing::error!(feature = feature.name(), error = %message, "failed to evaluate feature predicate");
                report.failed.push((feature.id(), message));
                continue;
            }
        };

        if should_load && !feature.is_running() {
            tracing::info!(feature = feature.name(), "starting feature");
            match feature.init(services) {
                Ok(()) => report.started.push(feature.id()),
                Err(err) => {
                    let message = format!("{err:#}");
                    tracing::error!(feature = feature.name(), error = %message, "failed to start feature");
                    report.failed.push((feature.id(), message));
                }
            }
        } else if !should_load && feature.is_running() {
            tracing::info!(feature = feature.name(), "stopping feature");
            match feature.terminate(services) {
                Ok(()) => report.stopped.push(feature.id()),
                Err(err) => {
                    let message = format!("{err:#}");
                    tracing::error!(feature = feature.name(), error = %message, "failed to stop feature");
                    report.failed.push((feature.id(), message));
                }
            }
        }
    }

    report
}

/// Owns the discovered features and drives them through their lifecycle.
pub struct FeatureManager {
    services: FeatureServices,
    features: Vec<FeatureHandle>,
}

impl FeatureManager {
    pub fn new(services: FeatureServices) -> Self {
        Self {
            services,
            features: Vec::new(),
        }
    }

    /// Discover every feature in `catalog` and run the first sync pass.
    ///
    /// Features from an earlier call are stopped and dropped first. If
    /// discovery fails as a whole the manager keeps no features and the
    /// error is returned.
    pub fn initialize(&mut self, catalog: &FeatureCatalog) -> Result<SyncReport, DiscoveryError> {
        if !self.features.is_empty() {
            tracing::warn!(
                features = self.features.len(),
                "features already initialized, stopping them before a new scan"
            );
            self.shutdown();
            self.features.clear();
        }

        tracing::info!("starting feature scan");
        let started = Instant::now();

        let outcome = catalog.discover().map(|features| {
            self.features = features;
            self.sync_states()
        });
        if let Err(err) = &outcome {
            self.features.clear();
            tracing::error!(error = %err, "critical error during feature scan, no features will be loaded");
        }

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "feature initialization completed"
        );
        outcome
    }

    /// Re-evaluate every feature's predicate. Call after configuration
    /// changes.
    pub fn sync_states(&self) -> SyncReport {
        tracing::info!("updating feature states");
        if self.features.is_empty() {
            tracing::warn!("no features were discovered, cannot update states");
            return SyncReport::default();
        }

        let report = sync_feature_states(&self.features, &self.services);
        self.log_active();
        tracing::info!("finished updating feature states");
        report
    }

    /// Stop every running feature.
    pub fn shutdown(&self) {
        for feature in self.features.iter().filter(|f| f.is_running()) {
            if let Err(err) = feature.terminate(&self.services) {
                tracing::error!(feature = feature.name(), error = %format!("{err:#}"), "failed to stop feature");
            }
        }
        tracing::info!("all features stopped");
    }

    pub fn stats(&self) -> FeatureStats {
        let mut stats = FeatureStats {
            total: self.features.len(),
            ..FeatureStats::default()
        };
        for feature in &self.features {
            let caps = feature.capabilities();
            stats.running += usize::from(feature.is_running());
            stats.event_system += usize::from(caps.is_dispatched());
            stats.legacy += usize::from(!caps.is_dispatched());
            stats.hud_capable += usize::from(caps.hud);
            stats.slot_capable += usize::from(caps.is_slot());
        }
        stats
    }

    pub fn features(&self) -> Vec<FeatureSummary> {
        self.features
            .iter()
            .map(|f| FeatureSummary {
                id: f.id(),
                name: f.name(),
                kind: f.kind(),
                running: f.is_running(),
            })
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&FeatureHandle> {
        self.features.iter().find(|f| f.id() == id)
    }

    pub fn services(&self) -> &FeatureServices {
        &self.services
    }

    fn log_active(&self) {
        let mut groups: BTreeMap<FeatureKind, Vec<&str>> = BTreeMap::new();
        for feature in self.features.iter().filter(|f| f.is_running()) {
            groups.entry(feature.kind()).or_default().push(feature.name());
        }

        if groups.is_empty() {
            tracing::info!("no features are currently enabled");
            return;
        }
        for (kind, names) in groups {
            tracing::info!("active {kind} features: [{}]", names.join(", "));
        }
    }
}

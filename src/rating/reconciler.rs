//! Rating reconciliation
//!
//! The reconciler merges a student's submitted rating set into the stored one.
//! Systems the staleness policy marks for refresh are fetched concurrently,
//! each under its own timeout, and every provider failure is collected per
//! system instead of short-circuiting the batch. The [`ReconcilePolicy`]
//! decides afterwards which failures are fatal.

use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult, FetchError, ProviderFailure};
use crate::metrics::{fetch_outcome_label, MetricsCollector, MetricsTimer};
use crate::provider::ProviderRegistry;
use crate::rating::staleness::needs_refresh;
use crate::types::{Rating, RatingEntry, RatingSet, RatingSystem, Student};
use crate::utils::normalize_username;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which provider failures abort a reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePolicy {
    required: Vec<RatingSystem>,
    fail_when_nothing_merged: bool,
}

impl ReconcilePolicy {
    /// General profile update: failures are tolerated unless every attempted fetch failed
    pub fn update() -> Self {
        Self {
            required: Vec::new(),
            fail_when_nothing_merged: true,
        }
    }

    /// Cohort autopick: the preferred system must not fail, the others may
    pub fn autopick(preferred: RatingSystem) -> Self {
        Self {
            required: vec![preferred],
            fail_when_nothing_merged: false,
        }
    }

    /// Additionally treat a failure on `system` as fatal
    pub fn requiring(mut self, system: RatingSystem) -> Self {
        if !self.required.contains(&system) {
            self.required.push(system);
        }
        self
    }

    pub fn is_required(&self, system: RatingSystem) -> bool {
        self.required.contains(&system)
    }

    fn check(&self, refreshed: &[RatingSystem], failures: &[ProviderFailure]) -> EngineResult<()> {
        if let Some(failure) = failures.iter().find(|f| self.is_required(f.system)) {
            return Err(EngineError::Provider {
                failure: failure.clone(),
            });
        }

        if self.fail_when_nothing_merged && refreshed.is_empty() && !failures.is_empty() {
            return Err(match failures {
                [single] => EngineError::Provider {
                    failure: single.clone(),
                },
                _ => EngineError::ProvidersUnavailable {
                    failures: failures.to_vec(),
                },
            });
        }

        Ok(())
    }
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self::update()
    }
}

/// Merged ratings plus what happened on the way
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    /// Stored ratings with the update applied
    pub ratings: RatingSet,
    /// Systems fetched successfully, in system order
    pub refreshed: Vec<RatingSystem>,
    /// Tolerated provider failures, in system order
    pub failures: Vec<ProviderFailure>,
}

impl ReconcileOutcome {
    /// Whether some fetches failed but the merge was still usable
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// A fetch to run, with the entry its result is merged into
#[derive(Debug)]
struct PendingFetch {
    system: RatingSystem,
    username: String,
    base: RatingEntry,
}

/// Fans out provider fetches and merges the results
#[derive(Debug, Clone)]
pub struct RatingReconciler {
    providers: ProviderRegistry,
    settings: EngineSettings,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RatingReconciler {
    pub fn new(providers: ProviderRegistry, settings: EngineSettings) -> Self {
        Self {
            providers,
            settings,
            metrics: None,
        }
    }

    /// Record fetch outcomes and latency
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Merge `updates` into the student's stored ratings.
    ///
    /// Systems absent from `updates` are carried over untouched. The stored
    /// student is not modified; the caller persists the returned ratings.
    pub async fn reconcile(
        &self,
        student: &Student,
        updates: &RatingSet,
        policy: &ReconcilePolicy,
        now: DateTime<Utc>,
    ) -> EngineResult<ReconcileOutcome> {
        let mut merged = student.ratings.clone();
        let mut pending = Vec::new();

        for (&system, update) in updates {
            let existing = student.ratings.get(&system);
            let username = normalize_username(&update.username);

            if system.is_custom() {
                merged.insert(system, merge_custom(existing, update, now));
            } else if username.is_empty() {
                let mut entry = existing.cloned().unwrap_or_default();
                entry.reset_for_username("");
                merged.insert(system, entry);
            } else if needs_refresh(system, existing, Some(username)) {
                let base = match existing {
                    Some(entry) if normalize_username(&entry.username) == username => entry.clone(),
                    Some(entry) => {
                        let mut entry = entry.clone();
                        entry.reset_for_username(username);
                        entry
                    }
                    None => RatingEntry::new(username),
                };
                pending.push(PendingFetch {
                    system,
                    username: username.to_string(),
                    base,
                });
            } else if let Some(entry) = existing {
                merged.insert(system, retain_supplied(entry, update));
            }
        }

        debug!(
            "Reconciling {} rating system(s) for student {}, {} need refresh",
            updates.len(),
            student.id,
            pending.len()
        );

        let results: Vec<(PendingFetch, Result<Rating, FetchError>)> = stream::iter(pending)
            .map(|job| self.fetch(job))
            .buffer_unordered(self.settings.max_concurrent_fetches.max(1))
            .collect()
            .await;

        let mut refreshed = Vec::new();
        let mut failures = Vec::new();

        for (job, result) in results {
            let mut entry = job.base;
            match result {
                Ok(rating) => {
                    entry.record(rating, now);
                    refreshed.push(job.system);
                }
                Err(error) => {
                    warn!(
                        "Rating fetch failed for student {} on {}: {}",
                        student.id, job.system, error
                    );
                    failures.push(ProviderFailure {
                        system: job.system,
                        username: job.username,
                        error,
                    });
                }
            }
            merged.insert(job.system, entry);
        }

        refreshed.sort();
        failures.sort_by_key(|failure| failure.system);

        policy.check(&refreshed, &failures)?;

        if !refreshed.is_empty() || !failures.is_empty() {
            info!(
                "Reconciled ratings for student {}: {} refreshed, {} failed",
                student.id,
                refreshed.len(),
                failures.len()
            );
        }

        Ok(ReconcileOutcome {
            ratings: merged,
            refreshed,
            failures,
        })
    }

    async fn fetch(&self, job: PendingFetch) -> (PendingFetch, Result<Rating, FetchError>) {
        let timer = MetricsTimer::start();

        let result = match self.providers.get(job.system) {
            Some(provider) => {
                match tokio::time::timeout(
                    self.settings.fetch_timeout(),
                    provider.fetch_rating(&job.username),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout {
                        timeout_ms: self.settings.fetch_timeout_ms,
                    }),
                }
            }
            None => Err(FetchError::Unsupported { system: job.system }),
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_fetch(job.system, fetch_outcome_label(&result), timer.elapsed());
        }

        debug!(
            "Fetched {} rating for '{}' in {:?}",
            job.system,
            job.username,
            timer.stop()
        );

        (job, result)
    }
}

/// Custom ratings are entered by the student and taken as given
fn merge_custom(
    existing: Option<&RatingEntry>,
    update: &RatingEntry,
    now: DateTime<Utc>,
) -> RatingEntry {
    let mut entry = existing.cloned().unwrap_or_default();
    entry.username = normalize_username(&update.username).to_string();

    if update.current_rating != entry.current_rating {
        if update.current_rating == 0 {
            entry.current_rating = 0;
        } else {
            entry.record(update.current_rating, now);
        }
    }
    if update.start_rating != 0 {
        entry.start_rating = update.start_rating;
    }

    entry
}

/// Keep a stored entry that needs no fetch, taking any values the caller supplied
fn retain_supplied(existing: &RatingEntry, update: &RatingEntry) -> RatingEntry {
    let mut entry = existing.clone();
    if update.current_rating != 0 {
        entry.current_rating = update.current_rating;
    }
    if update.start_rating != 0 {
        entry.start_rating = update.start_rating;
    }
    entry
}

//! The cohort engine
//!
//! Ties the reconciler, the cohort resolver and the student store together.
//! Every operation loads the student once, works on a copy and saves at most
//! once at the end, so an aborted operation never leaves a partial write.

use crate::cohort::CohortResolver;
use crate::config::EngineSettings;
use crate::engine::outcome::{AutopickReport, UpdateReport};
use crate::error::{EngineError, EngineResult};
use crate::metrics::{MetricsCollector, MetricsTimer};
use crate::provider::ProviderRegistry;
use crate::rating::{RatingReconciler, ReconcileOutcome, ReconcilePolicy};
use crate::stats::{ProgressReport, ReportBuilder, ReportPeriod};
use crate::store::{PopulationSource, StudentStore};
use crate::types::{AutopickRequest, CohortBand, RatingSet, RatingSystem, Student};
use crate::utils::{generate_update_id, normalize_username, Clock, SystemClock};
use std::sync::Arc;
use tracing::{info, warn};

/// Collaborators the engine is built from
pub struct EngineDeps {
    pub providers: ProviderRegistry,
    pub store: Arc<dyn StudentStore>,
    pub resolver: CohortResolver,
}

/// Rating normalization and cohort autopick
pub struct CohortEngine {
    reconciler: RatingReconciler,
    store: Arc<dyn StudentStore>,
    resolver: Arc<CohortResolver>,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl CohortEngine {
    pub fn new(deps: EngineDeps, settings: EngineSettings) -> Self {
        Self {
            reconciler: RatingReconciler::new(deps.providers, settings),
            store: deps.store,
            resolver: Arc::new(deps.resolver),
            clock: Arc::new(SystemClock),
            metrics: None,
        }
    }

    /// Use `clock` for history timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.reconciler = self.reconciler.with_metrics(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    pub fn resolver(&self) -> &CohortResolver {
        &self.resolver
    }

    /// General profile update.
    ///
    /// Provider failures are tolerated and reported in the returned
    /// [`UpdateReport`]; the update only fails when every attempted fetch
    /// failed.
    pub async fn update_ratings(
        &self,
        student_id: &str,
        updates: RatingSet,
    ) -> EngineResult<UpdateReport> {
        self.update_with_policy(student_id, updates, ReconcilePolicy::update())
            .await
    }

    /// General profile update where a failure on any of `required` aborts the update
    pub async fn update_ratings_requiring(
        &self,
        student_id: &str,
        updates: RatingSet,
        required: &[RatingSystem],
    ) -> EngineResult<UpdateReport> {
        let policy = required
            .iter()
            .fold(ReconcilePolicy::update(), |policy, system| {
                policy.requiring(*system)
            });
        self.update_with_policy(student_id, updates, policy).await
    }

    async fn update_with_policy(
        &self,
        student_id: &str,
        updates: RatingSet,
        policy: ReconcilePolicy,
    ) -> EngineResult<UpdateReport> {
        let update_id = generate_update_id();
        let result = self.run_update(student_id, &updates, &policy).await;

        if let Some(metrics) = &self.metrics {
            match &result {
                Ok((_, outcome)) if outcome.is_partial() => {
                    metrics.record_update("partial", outcome.failures.len())
                }
                Ok(_) => metrics.record_update("success", 0),
                Err(err) => metrics.record_update(error_label(err), 0),
            }
        }

        let (student, outcome) = result?;
        info!(
            "Update {} saved ratings for student {} ({} refreshed, {} failed)",
            update_id,
            student.id,
            outcome.refreshed.len(),
            outcome.failures.len()
        );

        Ok(UpdateReport {
            update_id,
            student,
            refreshed: outcome.refreshed,
            failures: outcome.failures,
        })
    }

    async fn run_update(
        &self,
        student_id: &str,
        updates: &RatingSet,
        policy: &ReconcilePolicy,
    ) -> EngineResult<(Student, ReconcileOutcome)> {
        let mut student = self.store.load_student(student_id).await?;
        let outcome = self
            .reconciler
            .reconcile(&student, updates, policy, self.clock.now())
            .await?;

        student.ratings = outcome.ratings.clone();
        self.store.save_student(student.clone()).await?;
        Ok((student, outcome))
    }

    /// Refresh the student's ratings and derive the cohort from the preferred system.
    ///
    /// A failure on the preferred system aborts the whole operation and
    /// nothing is saved. Failures on other systems are tolerated and returned.
    pub async fn autopick_cohort(
        &self,
        student_id: &str,
        request: AutopickRequest,
    ) -> EngineResult<AutopickReport> {
        let result = self.run_autopick(student_id, request).await;

        if let Some(metrics) = &self.metrics {
            metrics.record_autopick(match &result {
                Ok(_) => "success",
                Err(err) => error_label(err),
            });
        }

        if let Err(err) = &result {
            warn!("Cohort autopick failed for student {}: {}", student_id, err);
        }
        result
    }

    async fn run_autopick(
        &self,
        student_id: &str,
        request: AutopickRequest,
    ) -> EngineResult<AutopickReport> {
        let preferred = request
            .preferred_system
            .ok_or_else(|| EngineError::validation("a preferred rating system is required"))?;
        if preferred.is_custom() {
            return Err(EngineError::validation(
                "cohort cannot be chosen from a custom rating",
            ));
        }

        let update_id = generate_update_id();
        let mut student = self.store.load_student(student_id).await?;

        // The stored preferred entry goes through the staleness check even
        // when the request leaves it out.
        let mut updates = request.ratings;
        if let Some(stored) = student.ratings.get(&preferred) {
            updates.entry(preferred).or_insert_with(|| stored.clone());
        }

        let outcome = self
            .reconciler
            .reconcile(
                &student,
                &updates,
                &ReconcilePolicy::autopick(preferred),
                self.clock.now(),
            )
            .await?;

        let entry = outcome
            .ratings
            .get(&preferred)
            .filter(|entry| !normalize_username(&entry.username).is_empty())
            .ok_or_else(|| {
                EngineError::validation(format!("no {} username is configured", preferred))
            })?;
        if !entry.is_fetched() {
            return Err(EngineError::UnresolvedCohort {
                system: preferred,
                rating: entry.current_rating,
            });
        }
        let source_rating = entry.current_rating;
        let cohort = self.resolver.autopick(preferred, source_rating)?;

        student.preferred_system = Some(preferred);
        student.cohort = Some(cohort.clone());
        student.ratings = outcome.ratings;
        self.store.save_student(student.clone()).await?;

        info!(
            "Update {} placed student {} in cohort {} from {} rating {}",
            update_id, student.id, cohort, preferred, source_rating
        );

        Ok(AutopickReport {
            update_id,
            student,
            cohort,
            source_rating,
            tolerated_failures: outcome.failures,
        })
    }

    /// Assign a cohort the student picked explicitly
    pub async fn set_cohort(&self, student_id: &str, cohort: CohortBand) -> EngineResult<Student> {
        if cohort.is_unassigned() || !self.resolver.is_known_band(&cohort) {
            return Err(EngineError::validation(format!(
                "unknown cohort: {}",
                cohort
            )));
        }

        let mut student = self.store.load_student(student_id).await?;
        student.cohort = Some(cohort);
        self.store.save_student(student.clone()).await?;

        info!(
            "Student {} selected cohort {}",
            student.id,
            student.cohort.as_ref().map(CohortBand::as_str).unwrap_or_default()
        );
        Ok(student)
    }

    /// Progress reports for every student in a population snapshot.
    ///
    /// Reports rank against the snapshot only and never write student records.
    pub async fn progress_reports(
        &self,
        population: &dyn PopulationSource,
        period: ReportPeriod,
    ) -> EngineResult<Vec<ProgressReport>> {
        let timer = MetricsTimer::start();
        let snapshot = population.population_snapshot().await?;

        let builder = ReportBuilder::new(period, &snapshot);
        let reports = builder.build_all(&snapshot);

        if let Some(metrics) = &self.metrics {
            metrics.record_report(timer.stop());
        }
        info!(
            "Built {} progress reports for period {}",
            reports.len(),
            builder.period().label
        );

        Ok(reports)
    }
}

/// Metric label for a failed operation
fn error_label(err: &EngineError) -> &'static str {
    match err {
        EngineError::Validation { .. } => "validation",
        EngineError::Provider { .. } | EngineError::ProvidersUnavailable { .. } => "provider",
        EngineError::UnresolvedCohort { .. } => "unresolved",
        EngineError::StudentNotFound { .. } => "not_found",
        EngineError::PartialMerge { .. } => "partial",
        EngineError::Persistence { .. }
        | EngineError::ConfigurationError { .. }
        | EngineError::InternalError { .. } => "error",
    }
}

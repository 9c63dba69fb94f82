//! Test fixtures and mock implementations for integration testing
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use cohort_engine::cohort::{CohortResolver, ThresholdTable};
use cohort_engine::config::EngineSettings;
use cohort_engine::utils::Clock;
use cohort_engine::{
    CohortBand, CohortEngine, EngineDeps, FetchError, InMemoryStudentStore, ProviderRegistry,
    Rating, RatingEntry, RatingHistory, RatingProvider, RatingSystem, Student,
};
use mockall::mock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

mock! {
    pub Provider {}

    #[async_trait]
    impl RatingProvider for Provider {
        fn system(&self) -> RatingSystem;
        async fn fetch_rating(&self, username: &str) -> Result<Rating, FetchError>;
    }
}

/// Clock that advances one day on every reading
#[derive(Debug)]
pub struct StepClock {
    next: Mutex<DateTime<Utc>>,
}

impl StepClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            next: Mutex::new(start),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + Duration::days(1);
        now
    }
}

/// Provider that sleeps on every fetch and tracks how many fetches overlap
#[derive(Debug)]
pub struct ConcurrencyProbe {
    system: RatingSystem,
    rating: Rating,
    delay: std::time::Duration,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl ConcurrencyProbe {
    /// Probes for several systems sharing one set of counters
    pub fn group(
        systems: &[RatingSystem],
        rating: Rating,
        delay: std::time::Duration,
    ) -> (Vec<ConcurrencyProbe>, Arc<AtomicUsize>) {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));

        let probes = systems
            .iter()
            .map(|system| ConcurrencyProbe {
                system: *system,
                rating,
                delay,
                in_flight: in_flight.clone(),
                max_in_flight: max_in_flight.clone(),
            })
            .collect();

        (probes, max_in_flight)
    }
}

#[async_trait]
impl RatingProvider for ConcurrencyProbe {
    fn system(&self) -> RatingSystem {
        self.system
    }

    async fn fetch_rating(&self, _username: &str) -> Result<Rating, FetchError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.rating)
    }
}

pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// Three-band Lichess table used across the workflow tests
pub fn lichess_resolver() -> CohortResolver {
    let table = ThresholdTable::from_pairs(vec![
        (0, "Beginner"),
        (1500, "Intermediate"),
        (2000, "Advanced"),
    ])
    .unwrap();
    let mut tables = BTreeMap::new();
    tables.insert(RatingSystem::Lichess, table.clone());
    tables.insert(RatingSystem::Chesscom, table);
    CohortResolver::new(tables).unwrap()
}

pub fn registry(providers: Vec<Arc<dyn RatingProvider>>) -> ProviderRegistry {
    providers
        .into_iter()
        .fold(ProviderRegistry::new(), |registry, provider| {
            registry.register(provider).unwrap()
        })
}

pub fn create_test_engine(
    store: Arc<InMemoryStudentStore>,
    providers: Vec<Arc<dyn RatingProvider>>,
    settings: EngineSettings,
) -> CohortEngine {
    CohortEngine::new(
        EngineDeps {
            providers: registry(providers),
            store,
            resolver: lichess_resolver(),
        },
        settings,
    )
    .with_clock(Arc::new(StepClock::starting_at(date(2026, 3, 1))))
}

/// Entry with a dated history, as left behind by earlier fetches
pub fn entry_with_history(username: &str, points: &[(DateTime<Utc>, Rating)]) -> RatingEntry {
    let mut entry = RatingEntry::new(username);
    for (date, rating) in points {
        if entry.start_rating == 0 {
            entry.start_rating = *rating;
        }
        entry.current_rating = *rating;
        entry.history.push(RatingHistory {
            date: *date,
            rating: *rating,
        });
    }
    entry
}

/// Small population spread over two cohorts
pub fn create_test_population() -> Vec<Student> {
    let students = [
        ("s1", "Intermediate", 1550, 1600),
        ("s2", "Intermediate", 1700, 1800),
        ("s3", "Intermediate", 1900, 1850),
        ("s4", "Advanced", 2050, 2150),
        ("s5", "Advanced", 2200, 2300),
    ];

    students
        .iter()
        .map(|(id, cohort, start, current)| {
            let mut student = Student::new(*id)
                .with_cohort(CohortBand::new(*cohort))
                .with_rating(
                    RatingSystem::Lichess,
                    entry_with_history(
                        &format!("{}-lichess", id),
                        &[(date(2024, 1, 10), *start), (date(2024, 11, 20), *current)],
                    ),
                );
            student.preferred_system = Some(RatingSystem::Lichess);
            student
        })
        .collect()
}

//! Persistence and population collaborators
//!
//! The engine reads and replaces whole student records through
//! [`StudentStore`], and report generation reads a population snapshot through
//! [`PopulationSource`]. Both are narrow interfaces so storage backends can be
//! swapped without touching the engine.

pub mod memory;

use crate::error::EngineResult;
use crate::types::Student;
use async_trait::async_trait;

pub use memory::InMemoryStudentStore;

/// Load and atomically replace student records
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Load a student, failing with [`crate::error::EngineError::StudentNotFound`] if absent
    async fn load_student(&self, student_id: &str) -> EngineResult<Student>;

    /// Replace the stored record for `student.id`
    async fn save_student(&self, student: Student) -> EngineResult<()>;
}

/// Read-only snapshot of every student, for statistics
#[async_trait]
pub trait PopulationSource: Send + Sync {
    async fn population_snapshot(&self) -> EngineResult<Vec<Student>>;
}

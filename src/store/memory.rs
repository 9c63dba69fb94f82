//! In-memory student store

use crate::error::{EngineError, EngineResult};
use crate::store::{PopulationSource, StudentStore};
use crate::types::{Student, StudentId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Student records held in memory; every save is recorded
#[derive(Debug, Default)]
pub struct InMemoryStudentStore {
    students: RwLock<HashMap<StudentId, Student>>,
    save_calls: RwLock<Vec<Student>>,
}

impl InMemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with `students`
    pub fn with_students(students: impl IntoIterator<Item = Student>) -> Self {
        let students = students
            .into_iter()
            .map(|student| (student.id.clone(), student))
            .collect();

        Self {
            students: RwLock::new(students),
            save_calls: RwLock::new(Vec::new()),
        }
    }

    /// Current record for a student, without going through the async interface
    pub fn get(&self, student_id: &str) -> Option<Student> {
        self.students
            .read()
            .ok()
            .and_then(|students| students.get(student_id).cloned())
    }

    /// Every record passed to `save_student`, in call order
    pub fn saved(&self) -> Vec<Student> {
        self.save_calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.save_calls.read().map(|calls| calls.len()).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.students.read().map(|students| students.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StudentStore for InMemoryStudentStore {
    async fn load_student(&self, student_id: &str) -> EngineResult<Student> {
        let students = self
            .students
            .read()
            .map_err(|_| EngineError::InternalError {
                message: "Failed to acquire students read lock".to_string(),
            })?;

        students
            .get(student_id)
            .cloned()
            .ok_or_else(|| EngineError::StudentNotFound {
                student_id: student_id.to_string(),
            })
    }

    async fn save_student(&self, student: Student) -> EngineResult<()> {
        // Record the call for testing
        if let Ok(mut calls) = self.save_calls.write() {
            calls.push(student.clone());
        }

        let mut students = self
            .students
            .write()
            .map_err(|_| EngineError::InternalError {
                message: "Failed to acquire students write lock".to_string(),
            })?;

        students.insert(student.id.clone(), student);
        Ok(())
    }
}

#[async_trait]
impl PopulationSource for InMemoryStudentStore {
    async fn population_snapshot(&self) -> EngineResult<Vec<Student>> {
        let students = self
            .students
            .read()
            .map_err(|_| EngineError::InternalError {
                message: "Failed to acquire students read lock".to_string(),
            })?;

        let mut snapshot: Vec<Student> = students.values().cloned().collect();
        snapshot.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(snapshot)
    }
}

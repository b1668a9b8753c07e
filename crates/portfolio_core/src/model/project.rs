//! Project domain model.
//!
//! # Responsibility
//! - Define the project record that owns timeline items.
//! - Validate project fields before persistence.
//!
//! # Invariants
//! - `id` is unique across projects and never empty.
//! - `iso` is a grid operator code, an arbitrary categorical tag.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable project identifier (for example `P001`).
pub type ProjectId = String;

/// Portfolio project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Grid regional operator code.
    pub iso: String,
    /// Interconnection voltage in kV.
    pub voltage: i64,
    /// Capacity in MW.
    pub capacity: f64,
    /// Storage duration in hours.
    pub duration: f64,
    /// Target commercial operation date.
    pub target_cod: Option<NaiveDate>,
}

/// Validation failures for [`Project`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    EmptyId,
    EmptyName,
    NonFiniteCapacity,
    NonFiniteDuration,
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "project id cannot be empty"),
            Self::EmptyName => write!(f, "project name cannot be empty"),
            Self::NonFiniteCapacity => write!(f, "project capacity must be a finite number"),
            Self::NonFiniteDuration => write!(f, "project duration must be a finite number"),
        }
    }
}

impl Error for ProjectValidationError {}

impl Project {
    /// Creates a project with zeroed numeric attributes and no target COD.
    pub fn new(id: impl Into<String>, name: impl Into<String>, iso: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            iso: iso.into(),
            voltage: 0,
            capacity: 0.0,
            duration: 0.0,
            target_cod: None,
        }
    }

    /// Checks field invariants required before persistence.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.id.trim().is_empty() {
            return Err(ProjectValidationError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(ProjectValidationError::EmptyName);
        }
        if !self.capacity.is_finite() {
            return Err(ProjectValidationError::NonFiniteCapacity);
        }
        if !self.duration.is_finite() {
            return Err(ProjectValidationError::NonFiniteDuration);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Project, ProjectValidationError};

    #[test]
    fn validate_rejects_blank_identity_fields() {
        let project = Project::new("  ", "Solar One", "CAISO");
        assert_eq!(project.validate(), Err(ProjectValidationError::EmptyId));

        let project = Project::new("P001", "", "CAISO");
        assert_eq!(project.validate(), Err(ProjectValidationError::EmptyName));
    }

    #[test]
    fn validate_rejects_non_finite_numbers() {
        let mut project = Project::new("P001", "Solar One", "CAISO");
        project.capacity = f64::NAN;
        assert_eq!(
            project.validate(),
            Err(ProjectValidationError::NonFiniteCapacity)
        );
    }
}

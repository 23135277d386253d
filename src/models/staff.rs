use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: Option<i64>,
    pub name: String,
    pub hourly_rate: f64,
}

impl Staff {
    pub fn new(name: impl Into<String>, hourly_rate: f64) -> Self {
        Self {
            id: None,
            name: name.into().trim().to_string(),
            hourly_rate,
        }
    }

    pub fn cost_for(&self, hours: f64) -> f64 {
        hours * self.hourly_rate
    }

    pub fn validate(&self) -> Result<(), StaffValidationError> {
        if self.name.is_empty() {
            return Err(StaffValidationError::EmptyName);
        }
        if !self.hourly_rate.is_finite() || self.hourly_rate < 0.0 {
            return Err(StaffValidationError::InvalidRate);
        }
        Ok(())
    }
}

/// Gebuchte Arbeitszeit auf einer Baustelle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkHours {
    pub id: Option<i64>,
    pub project_id: i64,
    pub worker_name: String,
    pub hours: f64,
    pub description: Option<String>,
    pub user_id: Option<String>,
    pub created_at: Option<String>,
}

impl WorkHours {
    pub fn new(project_id: i64, worker_name: impl Into<String>, hours: f64) -> Self {
        Self {
            id: None,
            project_id,
            worker_name: worker_name.into(),
            hours,
            description: None,
            user_id: None,
            created_at: None,
        }
    }
}

pub fn validate_hours(hours: f64) -> Result<(), StaffValidationError> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(StaffValidationError::InvalidHours);
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum StaffValidationError {
    #[error("Name darf nicht leer sein")]
    EmptyName,
    #[error("Stundensatz muss eine Zahl ≥ 0 sein")]
    InvalidRate,
    #[error("Stunden müssen größer als 0 sein")]
    InvalidHours,
}

impl From<StaffValidationError> for crate::utils::error::AppError {
    fn from(e: StaffValidationError) -> Self {
        Self::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_for() {
        let staff = Staff::new("Kurt", 42.5);
        assert_eq!(staff.cost_for(7.5), 318.75);
    }

    #[test]
    fn test_hours_validation() {
        assert!(validate_hours(0.25).is_ok());
        assert!(validate_hours(0.0).is_err());
        assert!(validate_hours(-3.0).is_err());
        assert!(validate_hours(f64::INFINITY).is_err());
    }
}

use serde::{Deserialize, Serialize};

/// Katalogartikel mit Lagerbestand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: Option<i64>,
    pub name: String,
    pub unit: String,
    pub price_per_unit: f64,
    pub stock_quantity: f64,
    pub min_stock: f64,
    pub created_at: Option<String>,
}

impl Material {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, price_per_unit: f64) -> Self {
        Self {
            id: None,
            name: name.into().trim().to_string(),
            unit: unit.into().trim().to_string(),
            price_per_unit,
            stock_quantity: 0.0,
            min_stock: 0.0,
            created_at: None,
        }
    }

    pub fn with_stock(mut self, stock_quantity: f64, min_stock: f64) -> Self {
        self.stock_quantity = stock_quantity;
        self.min_stock = min_stock;
        self
    }

    /// Bestand auf oder unter Mindestbestand
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.min_stock
    }

    /// Kosten für eine Verbrauchsmenge (Menge × Preis, ungerundet)
    pub fn cost_for(&self, quantity: f64) -> f64 {
        quantity * self.price_per_unit
    }

    pub fn validate(&self) -> Result<(), MaterialValidationError> {
        if self.name.is_empty() {
            return Err(MaterialValidationError::EmptyName);
        }
        if !self.price_per_unit.is_finite() || self.price_per_unit < 0.0 {
            return Err(MaterialValidationError::InvalidPrice);
        }
        if !self.stock_quantity.is_finite() || !self.min_stock.is_finite() {
            return Err(MaterialValidationError::InvalidQuantity);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MaterialValidationError {
    #[error("Materialname darf nicht leer sein")]
    EmptyName,
    #[error("Preis pro Einheit muss eine Zahl ≥ 0 sein")]
    InvalidPrice,
    #[error("Menge ist keine gültige Zahl")]
    InvalidQuantity,
}

impl From<MaterialValidationError> for crate::utils::error::AppError {
    fn from(e: MaterialValidationError) -> Self {
        Self::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_threshold_is_inclusive() {
        let at_threshold = Material::new("Zement", "Sack", 10.0).with_stock(5.0, 5.0);
        assert!(at_threshold.is_low_stock());

        let above = Material::new("Zement", "Sack", 10.0).with_stock(5.5, 5.0);
        assert!(!above.is_low_stock());

        let overdrawn = Material::new("Zement", "Sack", 10.0).with_stock(-2.0, 0.0);
        assert!(overdrawn.is_low_stock());
    }

    #[test]
    fn test_cost_for() {
        let m = Material::new("Kies", "t", 19.99);
        assert_eq!(m.cost_for(3.0), 3.0 * 19.99);
        assert_eq!(m.cost_for(0.5), 9.995);
        assert_eq!(Material::new("Zement", "Sack", 10.0).cost_for(3.0), 30.0);
    }

    #[test]
    fn test_validation() {
        assert!(Material::new("Kies", "t", 0.0).validate().is_ok());
        assert!(matches!(
            Material::new(" ", "t", 1.0).validate(),
            Err(MaterialValidationError::EmptyName)
        ));
        assert!(matches!(
            Material::new("Kies", "t", -1.0).validate(),
            Err(MaterialValidationError::InvalidPrice)
        ));
    }
}

use serde::{Deserialize, Serialize};

use super::domain::{Dimension, OwnershipType};

/// Allowed drift when checking that weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Target revenue window in millions of USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueRange {
    pub min: f64,
    pub max: f64,
}

impl RevenueRange {
    pub fn contains(&self, revenue: f64) -> bool {
        revenue >= self.min && revenue <= self.max
    }
}

/// Preferred headcount band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeBand {
    pub min: u32,
    pub max: u32,
}

impl EmployeeBand {
    pub fn contains(&self, employees: u32) -> bool {
        employees >= self.min && employees <= self.max
    }
}

/// Weight per dimension; non-negative and summing to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionWeights {
    pub revenue_fit: f64,
    pub geographic_fit: f64,
    pub specialty_fit: f64,
    pub culture_fit: f64,
    pub customer_overlap: f64,
    pub vendor_synergy: f64,
    pub growth_trajectory: f64,
    pub margin_profile: f64,
}

impl DimensionWeights {
    /// Equal 1/8 weighting across all dimensions.
    pub fn equal() -> Self {
        let weight = 1.0 / 8.0;
        Self {
            revenue_fit: weight,
            geographic_fit: weight,
            specialty_fit: weight,
            culture_fit: weight,
            customer_overlap: weight,
            vendor_synergy: weight,
            growth_trajectory: weight,
            margin_profile: weight,
        }
    }

    pub const fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::RevenueFit => self.revenue_fit,
            Dimension::GeographicFit => self.geographic_fit,
            Dimension::SpecialtyFit => self.specialty_fit,
            Dimension::CultureFit => self.culture_fit,
            Dimension::CustomerOverlap => self.customer_overlap,
            Dimension::VendorSynergy => self.vendor_synergy,
            Dimension::GrowthTrajectory => self.growth_trajectory,
            Dimension::MarginProfile => self.margin_profile,
        }
    }

    /// Index-aligned `(dimension, weight)` pairs in canonical dimension order.
    pub fn pairs(&self) -> [(Dimension, f64); 8] {
        Dimension::ALL.map(|dimension| (dimension, self.get(dimension)))
    }

    pub fn sum(&self) -> f64 {
        self.pairs().iter().map(|(_, weight)| weight).sum()
    }

    pub fn validate(&self) -> Result<(), CriteriaError> {
        for (dimension, weight) in self.pairs() {
            if !weight.is_finite() {
                return Err(CriteriaError::NonFiniteWeight { dimension });
            }
            if weight < 0.0 {
                return Err(CriteriaError::NegativeWeight { dimension, weight });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CriteriaError::WeightsDoNotSumToOne { sum });
        }

        Ok(())
    }
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            revenue_fit: 0.20,
            geographic_fit: 0.10,
            specialty_fit: 0.20,
            culture_fit: 0.10,
            customer_overlap: 0.10,
            vendor_synergy: 0.15,
            growth_trajectory: 0.10,
            margin_profile: 0.05,
        }
    }
}

/// The acquirer's reference profile every candidate is scored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionCriteria {
    pub target_revenue: RevenueRange,
    #[serde(default)]
    pub preferred_states: Vec<String>,
    #[serde(default)]
    pub preferred_specialties: Vec<String>,
    #[serde(default)]
    pub preferred_ownership: Vec<OwnershipType>,
    #[serde(default)]
    pub employee_band: Option<EmployeeBand>,
    #[serde(default)]
    pub target_segments: Vec<String>,
    #[serde(default)]
    pub preferred_vendors: Vec<String>,
    #[serde(default)]
    pub weights: DimensionWeights,
}

impl AcquisitionCriteria {
    pub fn validate(&self) -> Result<(), CriteriaError> {
        let RevenueRange { min, max } = self.target_revenue;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(CriteriaError::InvalidRevenueRange { min, max });
        }

        if let Some(band) = self.employee_band {
            if band.min > band.max {
                return Err(CriteriaError::InvalidEmployeeBand {
                    min: band.min,
                    max: band.max,
                });
            }
        }

        self.weights.validate()
    }

    /// Replace the weight vector, rejecting vectors that fail validation.
    pub fn with_weights(mut self, weights: DimensionWeights) -> Result<Self, CriteriaError> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }
}

impl Default for AcquisitionCriteria {
    /// Fixed reference profile used whenever a caller omits criteria.
    fn default() -> Self {
        let strings = |values: &[&str]| -> Vec<String> {
            values.iter().map(|value| value.to_string()).collect()
        };

        Self {
            target_revenue: RevenueRange {
                min: 20.0,
                max: 80.0,
            },
            preferred_states: strings(&["TX", "OK", "LA", "AR", "CO"]),
            preferred_specialties: strings(&[
                "Managed Services",
                "Cloud",
                "Cybersecurity",
                "Networking",
            ]),
            preferred_ownership: vec![
                OwnershipType::Private,
                OwnershipType::FamilyOwned,
                OwnershipType::PeBacked,
            ],
            employee_band: Some(EmployeeBand { min: 50, max: 400 }),
            target_segments: strings(&["SMB", "Mid-Market"]),
            preferred_vendors: strings(&["Cisco", "Microsoft", "Dell", "HPE", "Fortinet"]),
            weights: DimensionWeights::default(),
        }
    }
}

/// Malformed criteria are rejected, never silently corrected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CriteriaError {
    #[error("dimension weights must sum to 1.0 (got {sum:.6})")]
    WeightsDoNotSumToOne { sum: f64 },
    #[error("weight for {} must be non-negative (got {weight})", .dimension.key())]
    NegativeWeight { dimension: Dimension, weight: f64 },
    #[error("weight for {} must be a finite number", .dimension.key())]
    NonFiniteWeight { dimension: Dimension },
    #[error("target revenue range is invalid (min {min}, max {max})")]
    InvalidRevenueRange { min: f64, max: f64 },
    #[error("employee band is invalid (min {min}, max {max})")]
    InvalidEmployeeBand { min: u32, max: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_criteria_are_valid() {
        let criteria = AcquisitionCriteria::default();
        criteria.validate().expect("default criteria validate");
        assert!((criteria.weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn equal_weights_sum_to_one() {
        DimensionWeights::equal()
            .validate()
            .expect("equal weights validate");
    }

    #[test]
    fn weights_not_summing_to_one_are_rejected() {
        let mut weights = DimensionWeights::default();
        weights.revenue_fit = 0.5;

        match weights.validate() {
            Err(CriteriaError::WeightsDoNotSumToOne { sum }) => {
                assert!((sum - 1.3).abs() < 1e-9);
            }
            other => panic!("expected sum error, got {other:?}"),
        }
    }

    #[test]
    fn negative_weight_is_rejected_before_sum_check() {
        let mut weights = DimensionWeights::default();
        weights.margin_profile = -0.05;
        weights.revenue_fit = 0.30;

        assert_eq!(
            weights.validate(),
            Err(CriteriaError::NegativeWeight {
                dimension: Dimension::MarginProfile,
                weight: -0.05,
            })
        );
    }

    #[test]
    fn nan_weight_is_rejected() {
        let mut weights = DimensionWeights::default();
        weights.culture_fit = f64::NAN;
        assert_eq!(
            weights.validate(),
            Err(CriteriaError::NonFiniteWeight {
                dimension: Dimension::CultureFit
            })
        );
    }

    #[test]
    fn inverted_revenue_range_is_rejected() {
        let mut criteria = AcquisitionCriteria::default();
        criteria.target_revenue = RevenueRange {
            min: 90.0,
            max: 10.0,
        };
        assert!(matches!(
            criteria.validate(),
            Err(CriteriaError::InvalidRevenueRange { .. })
        ));
    }

    #[test]
    fn with_weights_keeps_original_on_error() {
        let mut weights = DimensionWeights::equal();
        weights.vendor_synergy = 0.0;
        let result = AcquisitionCriteria::default().with_weights(weights);
        assert!(result.is_err());
    }

    #[test]
    fn criteria_deserialize_defaults_weights() {
        let criteria: AcquisitionCriteria =
            serde_json::from_str(r#"{"targetRevenue": {"min": 10, "max": 50}}"#)
                .expect("parse criteria");
        assert_eq!(criteria.weights, DimensionWeights::default());
        assert!(criteria.preferred_states.is_empty());
        criteria.validate().expect("valid");
    }
}

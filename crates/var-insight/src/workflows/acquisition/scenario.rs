use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::domain::{UnifiedVar, VarId};
use super::scoring::labels_match;

pub const DEFAULT_EBITDA_MULTIPLE: f64 = 6.0;
pub const MIN_EBITDA_MULTIPLE: f64 = 4.0;
pub const MAX_EBITDA_MULTIPLE: f64 = 12.0;
pub const DEFAULT_CROSS_SELL_UPLIFT: f64 = 0.05;
pub const DEFAULT_MARGIN_IMPROVEMENT: f64 = 0.15;
pub const DEFAULT_INTEGRATION_COST: f64 = 0.03;
pub const DEFAULT_VALUATION_BAND: f64 = 0.15;

/// Financial levers applied to a hypothetical acquisition. Rates are fractions (0.05 = 5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealAssumptions {
    pub ebitda_multiple: f64,
    pub cross_sell_uplift_rate: f64,
    pub margin_improvement_rate: f64,
    /// Share of the valuation spent on integration.
    pub integration_cost_rate: f64,
    /// Half-width of the valuation range around the point estimate.
    pub valuation_band: f64,
}

impl Default for DealAssumptions {
    fn default() -> Self {
        Self {
            ebitda_multiple: DEFAULT_EBITDA_MULTIPLE,
            cross_sell_uplift_rate: DEFAULT_CROSS_SELL_UPLIFT,
            margin_improvement_rate: DEFAULT_MARGIN_IMPROVEMENT,
            integration_cost_rate: DEFAULT_INTEGRATION_COST,
            valuation_band: DEFAULT_VALUATION_BAND,
        }
    }
}

impl DealAssumptions {
    pub fn with_multiple(ebitda_multiple: f64) -> Self {
        Self {
            ebitda_multiple,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        let multiple = self.ebitda_multiple;
        if !multiple.is_finite() || !(MIN_EBITDA_MULTIPLE..=MAX_EBITDA_MULTIPLE).contains(&multiple)
        {
            return Err(ScenarioError::MultipleOutOfRange { multiple });
        }

        let rates = [
            ("crossSellUpliftRate", self.cross_sell_uplift_rate),
            ("marginImprovementRate", self.margin_improvement_rate),
            ("integrationCostRate", self.integration_cost_rate),
            ("valuationBand", self.valuation_band),
        ];
        for (name, value) in rates {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ScenarioError::RateOutOfRange { name, value });
            }
        }

        Ok(())
    }
}

/// The acquiring platform the targets are folded into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquirerBaseline {
    pub name: String,
    /// Annual revenue in millions of USD.
    pub revenue: f64,
    /// Annual EBITDA in millions; when absent only target EBITDA is valued.
    #[serde(default)]
    pub ebitda: Option<f64>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub vendors: Vec<String>,
}

impl Default for AcquirerBaseline {
    fn default() -> Self {
        Self {
            name: "Platform Acquirer".to_string(),
            revenue: 120.0,
            ebitda: None,
            capabilities: vec![
                "Managed Services".to_string(),
                "Networking".to_string(),
                "Cloud".to_string(),
            ],
            vendors: vec![
                "Cisco".to_string(),
                "Microsoft".to_string(),
                "Dell".to_string(),
            ],
        }
    }
}

impl AcquirerBaseline {
    fn validate(&self) -> Result<(), ScenarioError> {
        if !self.revenue.is_finite() || self.revenue < 0.0 {
            return Err(ScenarioError::InvalidBaseline { field: "revenue" });
        }
        if self.ebitda.is_some_and(|ebitda| !ebitda.is_finite()) {
            return Err(ScenarioError::InvalidBaseline { field: "ebitda" });
        }
        Ok(())
    }
}

/// Wire request: target ids and a multiple, every other lever optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRequest {
    pub target_var_ids: Vec<VarId>,
    #[serde(default = "default_multiple")]
    pub ebitda_multiple: f64,
    #[serde(default)]
    pub cross_sell_uplift_rate: Option<f64>,
    #[serde(default)]
    pub margin_improvement_rate: Option<f64>,
    #[serde(default)]
    pub integration_cost_rate: Option<f64>,
    #[serde(default)]
    pub valuation_band: Option<f64>,
    #[serde(default)]
    pub baseline: Option<AcquirerBaseline>,
}

fn default_multiple() -> f64 {
    DEFAULT_EBITDA_MULTIPLE
}

impl ScenarioRequest {
    pub fn new(target_var_ids: Vec<VarId>, ebitda_multiple: f64) -> Self {
        Self {
            target_var_ids,
            ebitda_multiple,
            cross_sell_uplift_rate: None,
            margin_improvement_rate: None,
            integration_cost_rate: None,
            valuation_band: None,
            baseline: None,
        }
    }

    pub fn assumptions(&self) -> DealAssumptions {
        let defaults = DealAssumptions::default();
        DealAssumptions {
            ebitda_multiple: self.ebitda_multiple,
            cross_sell_uplift_rate: self
                .cross_sell_uplift_rate
                .unwrap_or(defaults.cross_sell_uplift_rate),
            margin_improvement_rate: self
                .margin_improvement_rate
                .unwrap_or(defaults.margin_improvement_rate),
            integration_cost_rate: self
                .integration_cost_rate
                .unwrap_or(defaults.integration_cost_rate),
            valuation_band: self.valuation_band.unwrap_or(defaults.valuation_band),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

/// What one target brings to the combined entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetContribution {
    pub var_id: VarId,
    pub name: String,
    pub revenue: f64,
    pub ebitda: f64,
    pub valuation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub acquirer: String,
    pub target_var_ids: Vec<VarId>,
    pub assumptions: DealAssumptions,
    pub contributions: Vec<TargetContribution>,
    pub combined_revenue: f64,
    pub combined_ebitda: f64,
    pub estimated_valuation: f64,
    pub valuation_range: PriceRange,
    pub projected_roi: f64,
    pub cross_sell_revenue: f64,
    pub margin_gain: f64,
    pub integration_cost: f64,
    pub capability_gains: Vec<String>,
    pub capability_overlaps: Vec<String>,
    pub vendor_overlaps: Vec<String>,
    /// Targets whose revenue or margin was absent and contributed zero.
    pub missing_financials: Vec<VarId>,
}

/// Projects combined financials for a set of targets under fixed deal assumptions.
#[derive(Debug, Clone)]
pub struct ScenarioSimulator {
    assumptions: DealAssumptions,
    baseline: AcquirerBaseline,
}

impl ScenarioSimulator {
    pub fn new(
        assumptions: DealAssumptions,
        baseline: AcquirerBaseline,
    ) -> Result<Self, ScenarioError> {
        assumptions.validate()?;
        baseline.validate()?;
        Ok(Self {
            assumptions,
            baseline,
        })
    }

    pub fn assumptions(&self) -> &DealAssumptions {
        &self.assumptions
    }

    pub fn baseline(&self) -> &AcquirerBaseline {
        &self.baseline
    }

    pub fn simulate(
        &self,
        target_ids: &[VarId],
        candidates: &[UnifiedVar],
    ) -> Result<ScenarioResult, ScenarioError> {
        let targets = resolve_targets(target_ids, candidates)?;
        let assumptions = self.assumptions;

        let mut contributions = Vec::with_capacity(targets.len());
        let mut missing_financials = Vec::new();
        let mut target_revenue = 0.0;
        let mut target_ebitda = 0.0;

        for target in &targets {
            let revenue = target.annual_revenue.unwrap_or(0.0);
            let ebitda = target.ebitda().unwrap_or(0.0);
            if !revenue.is_finite() || !ebitda.is_finite() {
                return Err(ScenarioError::NonFiniteFinancials { var_id: target.id });
            }
            if target.annual_revenue.is_none() || target.ebitda_margin.is_none() {
                missing_financials.push(target.id);
            }

            target_revenue += revenue;
            target_ebitda += ebitda;
            contributions.push(TargetContribution {
                var_id: target.id,
                name: target.name.clone(),
                revenue,
                ebitda,
                valuation: ebitda * assumptions.ebitda_multiple,
            });
        }

        let combined_revenue = self.baseline.revenue + target_revenue;
        let combined_ebitda = target_ebitda + self.baseline.ebitda.unwrap_or(0.0);
        let estimated_valuation = combined_ebitda * assumptions.ebitda_multiple;
        if estimated_valuation <= 0.0 || !estimated_valuation.is_finite() {
            return Err(ScenarioError::NonPositiveValuation {
                valuation: estimated_valuation,
            });
        }

        let valuation_range = PriceRange {
            low: estimated_valuation * (1.0 - assumptions.valuation_band),
            high: estimated_valuation * (1.0 + assumptions.valuation_band),
        };
        let cross_sell_revenue = combined_revenue * assumptions.cross_sell_uplift_rate;
        let margin_gain = combined_revenue * assumptions.margin_improvement_rate;
        let integration_cost = estimated_valuation * assumptions.integration_cost_rate;
        let projected_roi =
            (cross_sell_revenue + margin_gain - integration_cost) / estimated_valuation * 100.0;

        let (capability_gains, capability_overlaps) =
            capability_split(&self.baseline.capabilities, &targets);

        Ok(ScenarioResult {
            acquirer: self.baseline.name.clone(),
            target_var_ids: targets.iter().map(|target| target.id).collect(),
            assumptions,
            contributions,
            combined_revenue,
            combined_ebitda,
            estimated_valuation,
            valuation_range,
            projected_roi,
            cross_sell_revenue,
            margin_gain,
            integration_cost,
            capability_gains,
            capability_overlaps,
            vendor_overlaps: vendor_overlaps(&self.baseline.vendors, &targets),
            missing_financials,
        })
    }
}

/// Simulate against the default acquirer baseline.
pub fn simulate(
    target_ids: &[VarId],
    candidates: &[UnifiedVar],
    assumptions: DealAssumptions,
) -> Result<ScenarioResult, ScenarioError> {
    ScenarioSimulator::new(assumptions, AcquirerBaseline::default())?
        .simulate(target_ids, candidates)
}

fn resolve_targets<'a>(
    target_ids: &[VarId],
    candidates: &'a [UnifiedVar],
) -> Result<Vec<&'a UnifiedVar>, ScenarioError> {
    if target_ids.is_empty() {
        return Err(ScenarioError::EmptyTargets);
    }

    let mut seen = BTreeSet::new();
    target_ids
        .iter()
        .map(|&var_id| {
            if !seen.insert(var_id) {
                return Err(ScenarioError::DuplicateTarget { var_id });
            }
            candidates
                .iter()
                .find(|candidate| candidate.id == var_id)
                .ok_or(ScenarioError::UnknownTarget { var_id })
        })
        .collect()
}

/// Target specialties split into new capabilities and ones the acquirer already has.
fn capability_split(baseline: &[String], targets: &[&UnifiedVar]) -> (Vec<String>, Vec<String>) {
    let mut gains = BTreeMap::new();
    let mut overlaps = BTreeMap::new();

    for specialty in targets.iter().flat_map(|target| target.specialties.iter()) {
        let key = specialty.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        let bucket = if baseline
            .iter()
            .any(|capability| labels_match(capability, specialty))
        {
            &mut overlaps
        } else {
            &mut gains
        };
        bucket.entry(key).or_insert_with(|| specialty.trim().to_string());
    }

    (gains.into_values().collect(), overlaps.into_values().collect())
}

/// Vendors carried by at least two parties among the acquirer and the targets.
fn vendor_overlaps(baseline: &[String], targets: &[&UnifiedVar]) -> Vec<String> {
    let parties = std::iter::once(baseline)
        .chain(targets.iter().map(|target| target.top_vendors.as_slice()));

    let mut carried: BTreeMap<String, (String, usize)> = BTreeMap::new();
    for vendors in parties {
        let distinct: BTreeMap<String, &str> = vendors
            .iter()
            .map(|vendor| (vendor.trim().to_lowercase(), vendor.trim()))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        for (key, label) in distinct {
            carried
                .entry(key)
                .or_insert_with(|| (label.to_string(), 0))
                .1 += 1;
        }
    }

    carried
        .into_values()
        .filter(|(_, parties)| *parties >= 2)
        .map(|(label, _)| label)
        .collect()
}

/// Invalid scenario input; no partial result is ever produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScenarioError {
    #[error("at least one target must be selected")]
    EmptyTargets,
    #[error("target {var_id} is not among the candidates")]
    UnknownTarget { var_id: VarId },
    #[error("target {var_id} was selected more than once")]
    DuplicateTarget { var_id: VarId },
    #[error("EBITDA multiple {multiple} is outside the 4x-12x range")]
    MultipleOutOfRange { multiple: f64 },
    #[error("{name} must be between 0 and 1 (got {value})")]
    RateOutOfRange { name: &'static str, value: f64 },
    #[error("acquirer baseline {field} must be a finite, non-negative number")]
    InvalidBaseline { field: &'static str },
    #[error("target {var_id} has non-finite financials")]
    NonFiniteFinancials { var_id: VarId },
    #[error("estimated valuation must be positive (got {valuation}); selected targets report no EBITDA")]
    NonPositiveValuation { valuation: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: u64, revenue: f64, margin: f64) -> UnifiedVar {
        let mut var = UnifiedVar::new(id, format!("Target {id}"));
        var.annual_revenue = Some(revenue);
        var.ebitda_margin = Some(margin);
        var
    }

    fn standalone() -> AcquirerBaseline {
        AcquirerBaseline {
            name: "Standalone".to_string(),
            revenue: 0.0,
            ebitda: None,
            capabilities: Vec::new(),
            vendors: Vec::new(),
        }
    }

    #[test]
    fn defaults_validate() {
        DealAssumptions::default().validate().expect("valid");
    }

    #[test]
    fn multiple_outside_range_is_rejected() {
        for multiple in [3.5, 12.5, f64::NAN] {
            assert!(matches!(
                DealAssumptions::with_multiple(multiple).validate(),
                Err(ScenarioError::MultipleOutOfRange { .. })
            ));
        }
        DealAssumptions::with_multiple(4.0).validate().expect("lower bound");
        DealAssumptions::with_multiple(12.0).validate().expect("upper bound");
    }

    #[test]
    fn rate_outside_unit_interval_is_rejected() {
        let assumptions = DealAssumptions {
            integration_cost_rate: -0.01,
            ..DealAssumptions::default()
        };
        assert_eq!(
            assumptions.validate(),
            Err(ScenarioError::RateOutOfRange {
                name: "integrationCostRate",
                value: -0.01,
            })
        );
    }

    #[test]
    fn single_target_contribution_matches_hand_calculation() {
        let candidates = vec![target(1, 20.0, 10.0)];
        let simulator =
            ScenarioSimulator::new(DealAssumptions::with_multiple(6.0), standalone()).expect("valid");

        let result = simulator.simulate(&[VarId(1)], &candidates).expect("simulates");

        assert_eq!(result.contributions[0].ebitda, 2.0);
        assert_eq!(result.contributions[0].valuation, 12.0);
        assert_eq!(result.estimated_valuation, 12.0);
        assert_eq!(result.combined_revenue, 20.0);
        assert!((result.cross_sell_revenue - 1.0).abs() < 1e-12);
        assert!((result.integration_cost - 0.36).abs() < 1e-12);
        // (1.0 + 3.0 - 0.36) / 12 * 100
        assert!((result.projected_roi - 30.333_333_333_333_33).abs() < 1e-9);
    }

    #[test]
    fn price_range_brackets_the_point_estimate() {
        let candidates = vec![target(1, 35.0, 9.0), target(2, 50.0, 12.5)];
        let result = simulate(
            &[VarId(1), VarId(2)],
            &candidates,
            DealAssumptions::with_multiple(7.5),
        )
        .expect("simulates");

        assert!(result.valuation_range.low <= result.estimated_valuation);
        assert!(result.estimated_valuation <= result.valuation_range.high);
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let mut first_target = target(1, 33.3, 7.7);
        first_target.specialties = vec!["Security".to_string(), "Cloud".to_string()];
        first_target.top_vendors = vec!["Cisco".to_string(), "Palo Alto".to_string()];
        let mut second_target = target(2, 41.9, 11.1);
        second_target.specialties = vec!["Networking".to_string(), "Unified Comms".to_string()];
        second_target.top_vendors = vec!["Palo Alto".to_string(), "HPE".to_string()];
        let candidates = vec![first_target, second_target];
        let ids = [VarId(2), VarId(1)];

        let first = simulate(&ids, &candidates, DealAssumptions::with_multiple(8.5)).expect("runs");
        let second = simulate(&ids, &candidates, DealAssumptions::with_multiple(8.5)).expect("runs");

        assert_eq!(first.projected_roi.to_bits(), second.projected_roi.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn capabilities_and_vendors_are_compared_against_the_acquirer() {
        let mut first = target(1, 30.0, 10.0);
        first.specialties = vec!["Cybersecurity".to_string(), "cloud".to_string()];
        first.top_vendors = vec!["Fortinet".to_string(), "Cisco".to_string()];
        let mut second = target(2, 25.0, 8.0);
        second.specialties = vec!["Cybersecurity".to_string()];
        second.top_vendors = vec!["fortinet".to_string(), "Lenovo".to_string()];
        let candidates = vec![first, second];

        let result = simulate(
            &[VarId(1), VarId(2)],
            &candidates,
            DealAssumptions::default(),
        )
        .expect("simulates");

        assert_eq!(result.capability_gains, ["Cybersecurity"]);
        assert_eq!(result.capability_overlaps, ["cloud"]);
        assert_eq!(result.vendor_overlaps, ["Cisco", "Fortinet"]);
    }

    #[test]
    fn invalid_selections_produce_no_result() {
        let candidates = vec![target(1, 20.0, 10.0)];
        let assumptions = DealAssumptions::default();

        assert_eq!(
            simulate(&[], &candidates, assumptions),
            Err(ScenarioError::EmptyTargets)
        );
        assert_eq!(
            simulate(&[VarId(1), VarId(99)], &candidates, assumptions),
            Err(ScenarioError::UnknownTarget { var_id: VarId(99) })
        );
        assert_eq!(
            simulate(&[VarId(1), VarId(1)], &candidates, assumptions),
            Err(ScenarioError::DuplicateTarget { var_id: VarId(1) })
        );
    }

    #[test]
    fn missing_financials_are_reported_and_zero_valuation_is_rejected() {
        let candidates = vec![UnifiedVar::new(5, "Unreported")];
        let simulator =
            ScenarioSimulator::new(DealAssumptions::default(), standalone()).expect("valid");

        assert!(matches!(
            simulator.simulate(&[VarId(5)], &candidates),
            Err(ScenarioError::NonPositiveValuation { .. })
        ));

        let candidates = vec![UnifiedVar::new(5, "Unreported"), target(6, 40.0, 10.0)];
        let result = simulator
            .simulate(&[VarId(5), VarId(6)], &candidates)
            .expect("simulates");
        assert_eq!(result.missing_financials, [VarId(5)]);
    }

    #[test]
    fn request_fills_unspecified_levers_with_defaults() {
        let request: ScenarioRequest =
            serde_json::from_str(r#"{"targetVarIds": [3, 4], "ebitdaMultiple": 6.5}"#)
                .expect("parse");
        let assumptions = request.assumptions();

        assert_eq!(request.target_var_ids, [VarId(3), VarId(4)]);
        assert_eq!(assumptions.ebitda_multiple, 6.5);
        assert_eq!(assumptions.cross_sell_uplift_rate, DEFAULT_CROSS_SELL_UPLIFT);
        assert_eq!(assumptions.valuation_band, DEFAULT_VALUATION_BAND);
    }
}

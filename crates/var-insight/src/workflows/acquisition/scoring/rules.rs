use std::collections::BTreeSet;

use super::super::criteria::AcquisitionCriteria;
use super::super::domain::{Dimension, UnifiedVar};
use super::geography::{division_of, normalize_state, state_from_location};

/// Score substituted when a dimension cannot be measured.
pub const NEUTRAL_SCORE: f64 = 5.0;

pub(crate) const MAX_SCORE: f64 = 10.0;
pub(crate) const REVENUE_FLOOR: f64 = 1.0;
pub(crate) const EMPLOYEE_BAND_FLOOR: f64 = 2.0;
/// Growth above this rate (percent) earns nothing extra.
pub(crate) const GROWTH_SATURATION: f64 = 60.0;
pub(crate) const GROWTH_SCALE: f64 = 15.0;
/// Typical VAR EBITDA margin band in percent.
pub(crate) const MARGIN_BAND_LOW: f64 = 3.0;
pub(crate) const MARGIN_BAND_HIGH: f64 = 15.0;

/// Raw outcome of one dimension rule before clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Signal {
    Measured(f64),
    Missing,
}

pub(crate) fn evaluate(
    dimension: Dimension,
    var: &UnifiedVar,
    criteria: &AcquisitionCriteria,
) -> Signal {
    match dimension {
        Dimension::RevenueFit => revenue_fit(var, criteria),
        Dimension::GeographicFit => geographic_fit(var, criteria),
        Dimension::SpecialtyFit => specialty_fit(var, criteria),
        Dimension::CultureFit => culture_fit(var, criteria),
        Dimension::CustomerOverlap => customer_overlap(var, criteria),
        Dimension::VendorSynergy => vendor_synergy(var, criteria),
        Dimension::GrowthTrajectory => growth_trajectory(var),
        Dimension::MarginProfile => margin_profile(var),
    }
}

fn revenue_fit(var: &UnifiedVar, criteria: &AcquisitionCriteria) -> Signal {
    let Some(revenue) = var.annual_revenue else {
        return Signal::Missing;
    };
    let range = criteria.target_revenue;

    if range.contains(revenue) {
        return Signal::Measured(MAX_SCORE);
    }

    let distance = if revenue < range.min {
        relative_distance(range.min - revenue, range.min)
    } else {
        relative_distance(revenue - range.max, range.max)
    };

    Signal::Measured(linear_decay(distance, REVENUE_FLOOR))
}

fn geographic_fit(var: &UnifiedVar, criteria: &AcquisitionCriteria) -> Signal {
    let preferred: Vec<&'static str> = criteria
        .preferred_states
        .iter()
        .filter_map(|state| normalize_state(state))
        .collect();
    if preferred.is_empty() {
        return Signal::Missing;
    }

    let headquarters = var.hq_state.as_deref().and_then(normalize_state);
    let branches: Vec<&'static str> = var
        .branch_locations
        .iter()
        .filter_map(|location| state_from_location(location))
        .collect();

    if headquarters.is_none() && branches.is_empty() {
        return Signal::Missing;
    }

    if let Some(state) = headquarters {
        if preferred.contains(&state) {
            return Signal::Measured(10.0);
        }
    }

    if branches.iter().any(|state| preferred.contains(state)) {
        return Signal::Measured(8.0);
    }

    let footprint: Vec<&'static str> = match headquarters {
        Some(state) => vec![state],
        None => branches,
    };
    let divisions: Vec<_> = footprint
        .iter()
        .filter_map(|state| division_of(state))
        .collect();
    let preferred_divisions: Vec<_> = preferred
        .iter()
        .filter_map(|state| division_of(state))
        .collect();

    if divisions
        .iter()
        .any(|division| preferred_divisions.contains(division))
    {
        return Signal::Measured(6.5);
    }

    if divisions.iter().any(|division| {
        preferred_divisions
            .iter()
            .any(|preferred| preferred.region() == division.region())
    }) {
        return Signal::Measured(4.5);
    }

    Signal::Measured(2.0)
}

fn specialty_fit(var: &UnifiedVar, criteria: &AcquisitionCriteria) -> Signal {
    if criteria.preferred_specialties.is_empty() || var.specialties.is_empty() {
        return Signal::Missing;
    }

    let matched = criteria
        .preferred_specialties
        .iter()
        .filter(|desired| {
            var.specialties
                .iter()
                .any(|specialty| labels_match(desired, specialty))
        })
        .count();

    Signal::Measured(MAX_SCORE * matched as f64 / criteria.preferred_specialties.len() as f64)
}

fn culture_fit(var: &UnifiedVar, criteria: &AcquisitionCriteria) -> Signal {
    let mut components = Vec::with_capacity(3);

    if let (Some(ownership), false) = (var.ownership, criteria.preferred_ownership.is_empty()) {
        let alignment = if criteria.preferred_ownership.contains(&ownership) {
            10.0
        } else if ownership.is_closely_held()
            && criteria
                .preferred_ownership
                .iter()
                .any(|preferred| preferred.is_closely_held())
        {
            6.0
        } else {
            3.0
        };
        components.push(alignment);
    }

    if let (Some(employees), Some(band)) = (var.employee_count, criteria.employee_band) {
        let alignment = if band.contains(employees) {
            MAX_SCORE
        } else if employees < band.min {
            linear_decay(
                relative_distance((band.min - employees) as f64, band.min as f64),
                EMPLOYEE_BAND_FLOOR,
            )
        } else {
            linear_decay(
                relative_distance((employees - band.max) as f64, band.max as f64),
                EMPLOYEE_BAND_FLOOR,
            )
        };
        components.push(alignment);
    }

    if let Some(rating) = var.employer_rating {
        components.push(rating.clamp(0.0, 5.0) / 5.0 * MAX_SCORE);
    }

    if components.is_empty() {
        return Signal::Missing;
    }

    Signal::Measured(components.iter().sum::<f64>() / components.len() as f64)
}

fn customer_overlap(var: &UnifiedVar, criteria: &AcquisitionCriteria) -> Signal {
    let Some(segment) = var
        .customer_segment
        .as_deref()
        .filter(|segment| !segment.trim().is_empty())
    else {
        return Signal::Missing;
    };
    if criteria.target_segments.is_empty() {
        return Signal::Missing;
    }

    let candidate_label = normalize_label(segment);
    if criteria
        .target_segments
        .iter()
        .any(|target| normalize_label(target) == candidate_label)
    {
        return Signal::Measured(MAX_SCORE);
    }

    let candidate_tokens = tokens(segment);
    let best = criteria
        .target_segments
        .iter()
        .map(|target| jaccard(&candidate_tokens, &tokens(target)))
        .fold(0.0_f64, f64::max);

    Signal::Measured(2.0 + 6.0 * best)
}

fn vendor_synergy(var: &UnifiedVar, criteria: &AcquisitionCriteria) -> Signal {
    if var.top_vendors.is_empty() || criteria.preferred_vendors.is_empty() {
        return Signal::Missing;
    }

    let matched = var
        .top_vendors
        .iter()
        .filter(|vendor| {
            criteria
                .preferred_vendors
                .iter()
                .any(|preferred| labels_match(vendor, preferred))
        })
        .count();

    Signal::Measured(MAX_SCORE * matched as f64 / var.top_vendors.len() as f64)
}

fn growth_trajectory(var: &UnifiedVar) -> Signal {
    let Some(growth) = var.growth_rate else {
        return Signal::Missing;
    };

    let growth = growth.min(GROWTH_SATURATION);
    let score = if growth <= 0.0 {
        (3.0 + 0.3 * growth).max(0.0)
    } else {
        3.0 + 7.0 * (1.0 - (-growth / GROWTH_SCALE).exp())
    };

    Signal::Measured(score)
}

fn margin_profile(var: &UnifiedVar) -> Signal {
    let Some(margin) = var.ebitda_margin else {
        return Signal::Missing;
    };

    let score = if margin <= 0.0 {
        0.0
    } else if margin < MARGIN_BAND_LOW {
        3.0 * margin / MARGIN_BAND_LOW
    } else if margin < MARGIN_BAND_HIGH {
        3.0 + 7.0 * (margin - MARGIN_BAND_LOW) / (MARGIN_BAND_HIGH - MARGIN_BAND_LOW)
    } else {
        MAX_SCORE
    };

    Signal::Measured(score)
}

/// Gap relative to a reference bound; a non-positive bound counts as maximally distant.
fn relative_distance(gap: f64, bound: f64) -> f64 {
    if bound > 0.0 {
        gap / bound
    } else {
        1.0
    }
}

fn linear_decay(distance: f64, floor: f64) -> f64 {
    (MAX_SCORE * (1.0 - distance)).max(floor)
}

pub(crate) fn normalize_label(raw: &str) -> String {
    raw.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole-word match: one label's tokens are all present in the other's.
pub(crate) fn labels_match(left: &str, right: &str) -> bool {
    let left = tokens(left);
    let right = tokens(right);
    if left.is_empty() || right.is_empty() {
        return false;
    }
    left.is_subset(&right) || right.is_subset(&left)
}

fn tokens(raw: &str) -> BTreeSet<String> {
    normalize_label(raw)
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn jaccard(left: &BTreeSet<String>, right: &BTreeSet<String>) -> f64 {
    let union = left.union(right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(right).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::acquisition::criteria::{EmployeeBand, RevenueRange};
    use crate::workflows::acquisition::domain::OwnershipType;

    fn criteria() -> AcquisitionCriteria {
        AcquisitionCriteria::default()
    }

    fn measured(signal: Signal) -> f64 {
        match signal {
            Signal::Measured(score) => score,
            Signal::Missing => panic!("expected a measured signal"),
        }
    }

    #[test]
    fn revenue_inside_range_is_maximal() {
        let mut var = UnifiedVar::new(1, "Inside");
        var.annual_revenue = Some(45.0);
        assert_eq!(measured(revenue_fit(&var, &criteria())), 10.0);
    }

    #[test]
    fn revenue_decays_outside_range_down_to_floor() {
        let mut var = UnifiedVar::new(1, "Outside");
        let criteria = AcquisitionCriteria {
            target_revenue: RevenueRange {
                min: 20.0,
                max: 80.0,
            },
            ..criteria()
        };

        var.annual_revenue = Some(10.0);
        assert!((measured(revenue_fit(&var, &criteria)) - 5.0).abs() < 1e-9);

        var.annual_revenue = Some(120.0);
        assert!((measured(revenue_fit(&var, &criteria)) - 5.0).abs() < 1e-9);

        var.annual_revenue = Some(400.0);
        assert_eq!(measured(revenue_fit(&var, &criteria)), REVENUE_FLOOR);

        var.annual_revenue = Some(-5.0);
        assert_eq!(measured(revenue_fit(&var, &criteria)), REVENUE_FLOOR);
    }

    #[test]
    fn revenue_decay_is_monotonic_below_range() {
        let criteria = criteria();
        let mut previous = f64::MAX;
        for revenue in [19.0, 15.0, 10.0, 5.0, 1.0, 0.0] {
            let mut var = UnifiedVar::new(1, "Mono");
            var.annual_revenue = Some(revenue);
            let score = measured(revenue_fit(&var, &criteria));
            assert!(score <= previous, "score rose at revenue {revenue}");
            previous = score;
        }
    }

    #[test]
    fn geography_tiers_follow_census_layout() {
        let criteria = AcquisitionCriteria {
            preferred_states: vec!["TX".to_string()],
            ..criteria()
        };
        let mut var = UnifiedVar::new(1, "Geo");

        var.hq_state = Some("Texas".to_string());
        assert_eq!(measured(geographic_fit(&var, &criteria)), 10.0);

        var.hq_state = Some("NM".to_string());
        var.branch_locations = vec!["Houston, TX".to_string()];
        assert_eq!(measured(geographic_fit(&var, &criteria)), 8.0);

        var.branch_locations.clear();
        var.hq_state = Some("OK".to_string());
        assert_eq!(measured(geographic_fit(&var, &criteria)), 6.5);

        var.hq_state = Some("GA".to_string());
        assert_eq!(measured(geographic_fit(&var, &criteria)), 4.5);

        var.hq_state = Some("WA".to_string());
        assert_eq!(measured(geographic_fit(&var, &criteria)), 2.0);

        var.hq_state = None;
        assert_eq!(geographic_fit(&var, &criteria), Signal::Missing);
    }

    #[test]
    fn specialty_fit_is_proportional() {
        let mut var = UnifiedVar::new(1, "Spec");
        var.specialties = vec!["cloud services".to_string(), "Cybersecurity".to_string()];
        // 2 of 4 default specialties ("Cloud" is a word of "cloud services")
        assert!((measured(specialty_fit(&var, &criteria())) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn specialty_fit_without_desired_specialties_is_missing() {
        let mut var = UnifiedVar::new(1, "Spec");
        var.specialties = vec!["Cloud".to_string()];
        let criteria = AcquisitionCriteria {
            preferred_specialties: Vec::new(),
            ..criteria()
        };
        assert_eq!(specialty_fit(&var, &criteria), Signal::Missing);
    }

    #[test]
    fn culture_fit_averages_available_components() {
        let mut var = UnifiedVar::new(1, "Culture");
        var.ownership = Some(OwnershipType::Public);
        var.employee_count = Some(200);
        let criteria = AcquisitionCriteria {
            employee_band: Some(EmployeeBand { min: 50, max: 400 }),
            ..criteria()
        };
        // public ownership (3.0) + in-band headcount (10.0)
        assert!((measured(culture_fit(&var, &criteria)) - 6.5).abs() < 1e-9);

        var.employer_rating = Some(4.0);
        // + rating 8.0
        assert!((measured(culture_fit(&var, &criteria)) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn culture_fit_rewards_compatible_closely_held_forms() {
        let mut var = UnifiedVar::new(1, "ESOP");
        var.ownership = Some(OwnershipType::EmployeeOwned);
        assert_eq!(measured(culture_fit(&var, &criteria())), 6.0);
    }

    #[test]
    fn culture_fit_without_signals_is_missing() {
        let var = UnifiedVar::new(1, "Blank");
        assert_eq!(culture_fit(&var, &criteria()), Signal::Missing);
    }

    #[test]
    fn customer_overlap_prefers_exact_segments() {
        let mut var = UnifiedVar::new(1, "Segments");
        var.customer_segment = Some("mid market".to_string());
        assert_eq!(measured(customer_overlap(&var, &criteria())), 10.0);

        var.customer_segment = Some("Mid-Market Enterprise".to_string());
        // tokens {mid, market, enterprise} vs {mid, market}: jaccard 2/3
        assert!((measured(customer_overlap(&var, &criteria())) - 6.0).abs() < 1e-9);

        var.customer_segment = Some("Federal".to_string());
        assert_eq!(measured(customer_overlap(&var, &criteria())), 2.0);
    }

    #[test]
    fn vendor_synergy_counts_candidate_vendors_in_preferred_set() {
        let mut var = UnifiedVar::new(1, "Vendors");
        var.top_vendors = vec![
            "Cisco".to_string(),
            "Microsoft".to_string(),
            "Lenovo".to_string(),
            "VMware".to_string(),
        ];
        assert!((measured(vendor_synergy(&var, &criteria())) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn growth_has_diminishing_returns_and_saturates() {
        let mut var = UnifiedVar::new(1, "Growth");
        let mut at = |rate: f64| {
            var.growth_rate = Some(rate);
            measured(growth_trajectory(&var))
        };

        let negative = at(-20.0);
        let flat = at(0.0);
        let moderate = at(15.0);
        let strong = at(30.0);
        let saturated = at(60.0);
        let outlier = at(400.0);

        assert_eq!(negative, 0.0);
        assert_eq!(flat, 3.0);
        assert!(flat < moderate && moderate < strong && strong < saturated);
        assert!(moderate - flat > strong - moderate);
        assert_eq!(saturated, outlier);
        assert!(outlier <= 10.0);
    }

    #[test]
    fn margin_profile_tracks_industry_band() {
        let mut var = UnifiedVar::new(1, "Margin");
        let mut at = |margin: f64| {
            var.ebitda_margin = Some(margin);
            measured(margin_profile(&var))
        };

        assert_eq!(at(-4.0), 0.0);
        assert!((at(1.5) - 1.5).abs() < 1e-9);
        assert!((at(3.0) - 3.0).abs() < 1e-9);
        assert!((at(9.0) - 6.5).abs() < 1e-9);
        assert_eq!(at(15.0), 10.0);
        assert_eq!(at(40.0), 10.0);
    }

    #[test]
    fn labels_match_ignores_case_and_punctuation() {
        assert!(labels_match("Managed-Services", "managed services"));
        assert!(labels_match("HPE", "hpe"));
        assert!(!labels_match("Cisco", "Dell"));
        assert!(!labels_match("", "Dell"));
    }

    #[test]
    fn labels_match_compares_whole_words_only() {
        assert!(labels_match("Cloud", "cloud services"));
        assert!(labels_match("Palo Alto Networks", "palo alto"));
        assert!(!labels_match("HP", "HPE"));
        assert!(!labels_match("AI", "Email"));
        assert!(!labels_match("Security", "Cybersecurity"));
    }

    #[test]
    fn vendor_synergy_does_not_credit_hp_for_hpe() {
        let mut var = UnifiedVar::new(5, "Printer Shop");
        var.top_vendors = vec!["HP".to_string(), "Cisco".to_string()];
        assert!((measured(vendor_synergy(&var, &criteria())) - 5.0).abs() < 1e-9);
    }
}

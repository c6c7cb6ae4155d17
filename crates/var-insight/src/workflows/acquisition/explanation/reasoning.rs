use super::super::criteria::AcquisitionCriteria;
use super::super::domain::{Dimension, UnifiedVar};
use super::super::scoring::{labels_match, normalize_state, NEUTRAL_SCORE};

/// Deterministic one-line justification for a single dimension.
pub(crate) fn dimension_reasoning(
    dimension: Dimension,
    var: &UnifiedVar,
    criteria: &AcquisitionCriteria,
    imputed: bool,
) -> String {
    if imputed {
        return format!(
            "{}; scored at the neutral default of {NEUTRAL_SCORE:.1}",
            missing_reason(dimension, var, criteria)
        );
    }

    match dimension {
        Dimension::RevenueFit => revenue(var, criteria),
        Dimension::GeographicFit => geography(var, criteria),
        Dimension::SpecialtyFit => specialties(var, criteria),
        Dimension::CultureFit => culture(var),
        Dimension::CustomerOverlap => customers(var, criteria),
        Dimension::VendorSynergy => vendors(var, criteria),
        Dimension::GrowthTrajectory => growth(var),
        Dimension::MarginProfile => margin(var),
    }
}

fn missing_reason(dimension: Dimension, var: &UnifiedVar, criteria: &AcquisitionCriteria) -> String {
    let reason = match dimension {
        Dimension::RevenueFit => "No annual revenue reported",
        Dimension::GeographicFit if criteria.preferred_states.is_empty() => {
            "No preferred geographies configured"
        }
        Dimension::GeographicFit => "No headquarters or branch state on file",
        Dimension::SpecialtyFit if criteria.preferred_specialties.is_empty() => {
            "No preferred specialties configured"
        }
        Dimension::SpecialtyFit => "No specialties declared",
        Dimension::CultureFit => "No ownership, headcount, or employer rating signals available",
        Dimension::CustomerOverlap if criteria.target_segments.is_empty() => {
            "No target customer segments configured"
        }
        Dimension::CustomerOverlap => "No customer segment declared",
        Dimension::VendorSynergy if criteria.preferred_vendors.is_empty() => {
            "No preferred vendors configured"
        }
        Dimension::VendorSynergy => "No top vendors declared",
        Dimension::GrowthTrajectory => "No growth rate reported",
        Dimension::MarginProfile => "No EBITDA margin reported",
    };

    if var.confidence_score > 0.0 && var.confidence_score < 0.5 {
        format!("{reason} (low-confidence record)")
    } else {
        reason.to_string()
    }
}

fn revenue(var: &UnifiedVar, criteria: &AcquisitionCriteria) -> String {
    let revenue = var.annual_revenue.unwrap_or_default();
    let range = criteria.target_revenue;
    let position = if range.contains(revenue) {
        "inside"
    } else if revenue < range.min {
        "below"
    } else {
        "above"
    };

    format!(
        "${revenue:.1}M annual revenue is {position} the ${:.0}M-${:.0}M target range",
        range.min, range.max
    )
}

fn geography(var: &UnifiedVar, criteria: &AcquisitionCriteria) -> String {
    let preferred = criteria.preferred_states.join(", ");
    let in_preferred = |state: &str| {
        normalize_state(state).is_some_and(|code| {
            criteria
                .preferred_states
                .iter()
                .filter_map(|preferred| normalize_state(preferred))
                .any(|preferred| preferred == code)
        })
    };

    match var.hq_state.as_deref() {
        Some(state) if in_preferred(state) => format!(
            "Headquartered in {}, a preferred state",
            var.location_label()
        ),
        Some(_) if !var.branch_locations.is_empty() => format!(
            "Headquartered in {} with branches in {}; preferred states are {preferred}",
            var.location_label(),
            var.branch_locations.join("; ")
        ),
        Some(_) => format!(
            "Headquartered in {}, outside the preferred states ({preferred})",
            var.location_label()
        ),
        None => format!(
            "Branch footprint: {}; preferred states are {preferred}",
            var.branch_locations.join("; ")
        ),
    }
}

fn specialties(var: &UnifiedVar, criteria: &AcquisitionCriteria) -> String {
    let matched: Vec<&str> = criteria
        .preferred_specialties
        .iter()
        .filter(|desired| {
            var.specialties
                .iter()
                .any(|specialty| labels_match(desired, specialty))
        })
        .map(String::as_str)
        .collect();

    if matched.is_empty() {
        format!(
            "None of the {} preferred specialties are covered",
            criteria.preferred_specialties.len()
        )
    } else {
        format!(
            "Covers {} of {} preferred specialties ({})",
            matched.len(),
            criteria.preferred_specialties.len(),
            matched.join(", ")
        )
    }
}

fn culture(var: &UnifiedVar) -> String {
    let mut signals = Vec::new();
    if let Some(ownership) = var.ownership {
        signals.push(format!("{} ownership", ownership.label()));
    }
    if let Some(employees) = var.employee_count {
        signals.push(format!("{employees} employees"));
    }
    if let Some(rating) = var.employer_rating {
        signals.push(format!("employer rating {rating:.1}/5"));
    }

    format!("Culture signals: {}", signals.join(", "))
}

fn customers(var: &UnifiedVar, criteria: &AcquisitionCriteria) -> String {
    format!(
        "Serves the {} segment; target segments are {}",
        var.customer_segment.as_deref().unwrap_or_default(),
        criteria.target_segments.join(", ")
    )
}

fn vendors(var: &UnifiedVar, criteria: &AcquisitionCriteria) -> String {
    let shared: Vec<&str> = var
        .top_vendors
        .iter()
        .filter(|vendor| {
            criteria
                .preferred_vendors
                .iter()
                .any(|preferred| labels_match(vendor, preferred))
        })
        .map(String::as_str)
        .collect();

    if shared.is_empty() {
        format!(
            "None of {} top vendors overlap the preferred vendor set",
            var.top_vendors.len()
        )
    } else {
        format!(
            "{} of {} top vendors are preferred partners ({})",
            shared.len(),
            var.top_vendors.len(),
            shared.join(", ")
        )
    }
}

fn growth(var: &UnifiedVar) -> String {
    let rate = var.growth_rate.unwrap_or_default();
    if rate < 0.0 {
        format!("Revenue contracting at {:.1}% per year", rate.abs())
    } else if rate > 60.0 {
        format!("{rate:.1}% annual growth, credited at the 60% saturation ceiling")
    } else {
        format!("{rate:.1}% annual revenue growth")
    }
}

fn margin(var: &UnifiedVar) -> String {
    format!(
        "{:.1}% EBITDA margin against a 3%-15% VAR industry band",
        var.ebitda_margin.unwrap_or_default()
    )
}

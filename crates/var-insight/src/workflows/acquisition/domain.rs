use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for candidate companies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarId(pub u64);

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ownership structure reported for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OwnershipType {
    #[serde(rename = "Private")]
    Private,
    #[serde(rename = "PE-Backed")]
    PeBacked,
    #[serde(rename = "Public")]
    Public,
    #[serde(rename = "Family-Owned")]
    FamilyOwned,
    #[serde(rename = "Employee-Owned")]
    EmployeeOwned,
}

impl OwnershipType {
    pub const fn label(self) -> &'static str {
        match self {
            OwnershipType::Private => "Private",
            OwnershipType::PeBacked => "PE-Backed",
            OwnershipType::Public => "Public",
            OwnershipType::FamilyOwned => "Family-Owned",
            OwnershipType::EmployeeOwned => "Employee-Owned",
        }
    }

    /// Lenient parse used by roster imports and CLI flags.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "private" | "privatelyheld" => Some(Self::Private),
            "pebacked" | "privateequity" | "pe" => Some(Self::PeBacked),
            "public" | "publiclytraded" => Some(Self::Public),
            "familyowned" | "family" => Some(Self::FamilyOwned),
            "employeeowned" | "esop" => Some(Self::EmployeeOwned),
            _ => None,
        }
    }

    /// Closely held forms that usually integrate without governance friction.
    pub(crate) const fn is_closely_held(self) -> bool {
        matches!(
            self,
            OwnershipType::Private | OwnershipType::FamilyOwned | OwnershipType::EmployeeOwned
        )
    }
}

/// Structured candidate record handed to the engine by the data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedVar {
    pub id: VarId,
    pub name: String,
    #[serde(default)]
    pub hq_city: Option<String>,
    #[serde(default)]
    pub hq_state: Option<String>,
    /// Annual revenue in millions of USD.
    #[serde(default)]
    pub annual_revenue: Option<f64>,
    /// EBITDA margin in percent (10.0 means 10%).
    #[serde(default)]
    pub ebitda_margin: Option<f64>,
    /// Year-over-year revenue growth in percent.
    #[serde(default)]
    pub growth_rate: Option<f64>,
    #[serde(default)]
    pub employee_count: Option<u32>,
    #[serde(default)]
    pub ownership: Option<OwnershipType>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub top_vendors: Vec<String>,
    #[serde(default)]
    pub customer_segment: Option<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub branch_locations: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Employer review rating on a 0-5 scale.
    #[serde(default)]
    pub employer_rating: Option<f64>,
    /// Data-quality indicator in [0, 1].
    #[serde(default)]
    pub confidence_score: f64,
}

impl UnifiedVar {
    /// Bare record carrying only identity; every other attribute is absent.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: VarId(id),
            name: name.into(),
            hq_city: None,
            hq_state: None,
            annual_revenue: None,
            ebitda_margin: None,
            growth_rate: None,
            employee_count: None,
            ownership: None,
            specialties: Vec::new(),
            top_vendors: Vec::new(),
            customer_segment: None,
            certifications: Vec::new(),
            branch_locations: Vec::new(),
            description: None,
            website: None,
            employer_rating: None,
            confidence_score: 0.0,
        }
    }

    /// EBITDA in millions when both revenue and margin are known.
    pub fn ebitda(&self) -> Option<f64> {
        match (self.annual_revenue, self.ebitda_margin) {
            (Some(revenue), Some(margin)) => Some(revenue * margin / 100.0),
            _ => None,
        }
    }

    pub fn location_label(&self) -> String {
        match (self.hq_city.as_deref(), self.hq_state.as_deref()) {
            (Some(city), Some(state)) => format!("{city}, {state}"),
            (None, Some(state)) => state.to_string(),
            (Some(city), None) => city.to_string(),
            (None, None) => "unknown location".to_string(),
        }
    }
}

/// The eight fit dimensions scored for every candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    RevenueFit,
    GeographicFit,
    SpecialtyFit,
    CultureFit,
    CustomerOverlap,
    VendorSynergy,
    GrowthTrajectory,
    MarginProfile,
}

impl Dimension {
    pub const ALL: [Dimension; 8] = [
        Dimension::RevenueFit,
        Dimension::GeographicFit,
        Dimension::SpecialtyFit,
        Dimension::CultureFit,
        Dimension::CustomerOverlap,
        Dimension::VendorSynergy,
        Dimension::GrowthTrajectory,
        Dimension::MarginProfile,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Dimension::RevenueFit => "Revenue Fit",
            Dimension::GeographicFit => "Geographic Fit",
            Dimension::SpecialtyFit => "Specialty Fit",
            Dimension::CultureFit => "Culture Fit",
            Dimension::CustomerOverlap => "Customer Overlap",
            Dimension::VendorSynergy => "Vendor Synergy",
            Dimension::GrowthTrajectory => "Growth Trajectory",
            Dimension::MarginProfile => "Margin Profile",
        }
    }

    /// Wire key used in JSON payloads and narrative prompts.
    pub const fn key(self) -> &'static str {
        match self {
            Dimension::RevenueFit => "revenueFit",
            Dimension::GeographicFit => "geographicFit",
            Dimension::SpecialtyFit => "specialtyFit",
            Dimension::CultureFit => "cultureFit",
            Dimension::CustomerOverlap => "customerOverlap",
            Dimension::VendorSynergy => "vendorSynergy",
            Dimension::GrowthTrajectory => "growthTrajectory",
            Dimension::MarginProfile => "marginProfile",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dimension| dimension.key() == key)
    }
}

/// Sub-scores in [0, 10] for each of the eight dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarScores {
    pub revenue_fit: f64,
    pub geographic_fit: f64,
    pub specialty_fit: f64,
    pub culture_fit: f64,
    pub customer_overlap: f64,
    pub vendor_synergy: f64,
    pub growth_trajectory: f64,
    pub margin_profile: f64,
}

impl VarScores {
    /// Every dimension set to the same score.
    pub const fn uniform(score: f64) -> Self {
        Self {
            revenue_fit: score,
            geographic_fit: score,
            specialty_fit: score,
            culture_fit: score,
            customer_overlap: score,
            vendor_synergy: score,
            growth_trajectory: score,
            margin_profile: score,
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

    pub fn set(&mut self, dimension: Dimension, score: f64) {
        let slot = match dimension {
            Dimension::RevenueFit => &mut self.revenue_fit,
            Dimension::GeographicFit => &mut self.geographic_fit,
            Dimension::SpecialtyFit => &mut self.specialty_fit,
            Dimension::CultureFit => &mut self.culture_fit,
            Dimension::CustomerOverlap => &mut self.customer_overlap,
            Dimension::VendorSynergy => &mut self.vendor_synergy,
            Dimension::GrowthTrajectory => &mut self.growth_trajectory,
            Dimension::MarginProfile => &mut self.margin_profile,
        };
        *slot = score;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL
            .into_iter()
            .map(move |dimension| (dimension, self.get(dimension)))
    }
}

/// A candidate with its scores, composite, and position in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredVar {
    pub var: UnifiedVar,
    pub scores: VarScores,
    pub composite_score: f64,
    pub rank: usize,
    /// Dimensions that fell back to the neutral default for lack of data.
    #[serde(default)]
    pub imputed: Vec<Dimension>,
}

impl ScoredVar {
    pub fn id(&self) -> VarId {
        self.var.id
    }

    pub fn is_imputed(&self, dimension: Dimension) -> bool {
        self.imputed.contains(&dimension)
    }
}

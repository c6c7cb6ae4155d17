//! CSV roster import producing candidate records for the acquisition engine.

mod parser;

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use crate::workflows::acquisition::{OwnershipType, UnifiedVar, VarId};
use parser::RosterRow;

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    DuplicateId { line: usize, id: VarId },
    InvalidOwnership { line: usize, value: String },
    InvalidValue { line: usize, field: &'static str },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read VAR roster: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid VAR roster CSV data: {}", err),
            RosterImportError::DuplicateId { line, id } => {
                write!(f, "line {line}: candidate id {id} appears more than once")
            }
            RosterImportError::InvalidOwnership { line, value } => {
                write!(f, "line {line}: unrecognised ownership type '{value}'")
            }
            RosterImportError::InvalidValue { line, field } => {
                write!(f, "line {line}: {field} is out of range")
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Bundled demo roster used when no roster path is configured.
pub const SAMPLE_ROSTER: &str = include_str!("../../../data/sample_roster.csv");

pub struct RosterImporter;

impl RosterImporter {
    pub fn sample() -> Result<Vec<UnifiedVar>, RosterImportError> {
        Self::from_reader(SAMPLE_ROSTER.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<UnifiedVar>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<UnifiedVar>, RosterImportError> {
        let mut seen = BTreeSet::new();
        let mut candidates = Vec::new();

        for (line, row) in parser::parse_rows(reader)? {
            let candidate = into_candidate(line, row)?;
            if !seen.insert(candidate.id) {
                return Err(RosterImportError::DuplicateId {
                    line,
                    id: candidate.id,
                });
            }
            candidates.push(candidate);
        }

        Ok(candidates)
    }
}

fn into_candidate(line: usize, row: RosterRow) -> Result<UnifiedVar, RosterImportError> {
    let ownership = match row.ownership {
        Some(raw) => Some(
            OwnershipType::parse(&raw)
                .ok_or(RosterImportError::InvalidOwnership { line, value: raw })?,
        ),
        None => None,
    };

    let finite = |field: &'static str, value: Option<f64>| match value {
        Some(value) if !value.is_finite() => Err(RosterImportError::InvalidValue { line, field }),
        other => Ok(other),
    };
    let annual_revenue = finite("annual_revenue", row.annual_revenue)?;
    let ebitda_margin = finite("ebitda_margin", row.ebitda_margin)?;
    let growth_rate = finite("growth_rate", row.growth_rate)?;
    let employer_rating = finite("employer_rating", row.employer_rating)?;

    if annual_revenue.is_some_and(|revenue| revenue < 0.0) {
        return Err(RosterImportError::InvalidValue {
            line,
            field: "annual_revenue",
        });
    }
    if employer_rating.is_some_and(|rating| !(0.0..=5.0).contains(&rating)) {
        return Err(RosterImportError::InvalidValue {
            line,
            field: "employer_rating",
        });
    }

    let confidence_score = match row.confidence_score {
        None => 0.0,
        Some(score) if score.is_finite() && (0.0..=1.0).contains(&score) => score,
        Some(_) => {
            return Err(RosterImportError::InvalidValue {
                line,
                field: "confidence_score",
            })
        }
    };

    Ok(UnifiedVar {
        id: VarId(row.id),
        name: row.name,
        hq_city: row.hq_city,
        hq_state: row.hq_state,
        annual_revenue,
        ebitda_margin,
        growth_rate,
        employee_count: row.employee_count,
        ownership,
        specialties: row.specialties,
        top_vendors: row.top_vendors,
        customer_segment: row.customer_segment,
        certifications: row.certifications,
        branch_locations: row.branch_locations,
        description: row.description,
        website: row.website,
        employer_rating,
        confidence_score,
    })
}

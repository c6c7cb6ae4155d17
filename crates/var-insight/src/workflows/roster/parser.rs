use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One roster row as it appears in the CSV, before domain validation.
#[derive(Debug, Deserialize)]
pub(crate) struct RosterRow {
    pub(crate) id: u64,
    pub(crate) name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) hq_city: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) hq_state: Option<String>,
    #[serde(default)]
    pub(crate) annual_revenue: Option<f64>,
    #[serde(default)]
    pub(crate) ebitda_margin: Option<f64>,
    #[serde(default)]
    pub(crate) growth_rate: Option<f64>,
    #[serde(default)]
    pub(crate) employee_count: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) ownership: Option<String>,
    #[serde(default, deserialize_with = "semicolon_list")]
    pub(crate) specialties: Vec<String>,
    #[serde(default, deserialize_with = "semicolon_list")]
    pub(crate) top_vendors: Vec<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) customer_segment: Option<String>,
    #[serde(default, deserialize_with = "semicolon_list")]
    pub(crate) certifications: Vec<String>,
    #[serde(default, deserialize_with = "semicolon_list")]
    pub(crate) branch_locations: Vec<String>,
    #[serde(default)]
    pub(crate) employer_rating: Option<f64>,
    #[serde(default)]
    pub(crate) confidence_score: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) website: Option<String>,
}

/// Parsed rows paired with their 1-based line number in the file.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<(usize, RosterRow)>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
        rows.push((index + 2, record?));
    }

    Ok(rows)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn semicolon_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    Ok(split_list(&raw))
}

pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(|item| item.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|item| !item.is_empty())
        .collect()
}

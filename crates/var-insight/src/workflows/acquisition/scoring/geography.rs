/// US Census Bureau divisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Division {
    NewEngland,
    MiddleAtlantic,
    EastNorthCentral,
    WestNorthCentral,
    SouthAtlantic,
    EastSouthCentral,
    WestSouthCentral,
    Mountain,
    Pacific,
}

/// US Census Bureau regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Region {
    Northeast,
    Midwest,
    South,
    West,
}

impl Division {
    pub(crate) const fn region(self) -> Region {
        match self {
            Division::NewEngland | Division::MiddleAtlantic => Region::Northeast,
            Division::EastNorthCentral | Division::WestNorthCentral => Region::Midwest,
            Division::SouthAtlantic | Division::EastSouthCentral | Division::WestSouthCentral => {
                Region::South
            }
            Division::Mountain | Division::Pacific => Region::West,
        }
    }
}

const STATES: &[(&str, &str, Division)] = &[
    ("AL", "alabama", Division::EastSouthCentral),
    ("AK", "alaska", Division::Pacific),
    ("AZ", "arizona", Division::Mountain),
    ("AR", "arkansas", Division::WestSouthCentral),
    ("CA", "california", Division::Pacific),
    ("CO", "colorado", Division::Mountain),
    ("CT", "connecticut", Division::NewEngland),
    ("DE", "delaware", Division::SouthAtlantic),
    ("DC", "district of columbia", Division::SouthAtlantic),
    ("FL", "florida", Division::SouthAtlantic),
    ("GA", "georgia", Division::SouthAtlantic),
    ("HI", "hawaii", Division::Pacific),
    ("ID", "idaho", Division::Mountain),
    ("IL", "illinois", Division::EastNorthCentral),
    ("IN", "indiana", Division::EastNorthCentral),
    ("IA", "iowa", Division::WestNorthCentral),
    ("KS", "kansas", Division::WestNorthCentral),
    ("KY", "kentucky", Division::EastSouthCentral),
    ("LA", "louisiana", Division::WestSouthCentral),
    ("ME", "maine", Division::NewEngland),
    ("MD", "maryland", Division::SouthAtlantic),
    ("MA", "massachusetts", Division::NewEngland),
    ("MI", "michigan", Division::EastNorthCentral),
    ("MN", "minnesota", Division::WestNorthCentral),
    ("MS", "mississippi", Division::EastSouthCentral),
    ("MO", "missouri", Division::WestNorthCentral),
    ("MT", "montana", Division::Mountain),
    ("NE", "nebraska", Division::WestNorthCentral),
    ("NV", "nevada", Division::Mountain),
    ("NH", "new hampshire", Division::NewEngland),
    ("NJ", "new jersey", Division::MiddleAtlantic),
    ("NM", "new mexico", Division::Mountain),
    ("NY", "new york", Division::MiddleAtlantic),
    ("NC", "north carolina", Division::SouthAtlantic),
    ("ND", "north dakota", Division::WestNorthCentral),
    ("OH", "ohio", Division::EastNorthCentral),
    ("OK", "oklahoma", Division::WestSouthCentral),
    ("OR", "oregon", Division::Pacific),
    ("PA", "pennsylvania", Division::MiddleAtlantic),
    ("RI", "rhode island", Division::NewEngland),
    ("SC", "south carolina", Division::SouthAtlantic),
    ("SD", "south dakota", Division::WestNorthCentral),
    ("TN", "tennessee", Division::EastSouthCentral),
    ("TX", "texas", Division::WestSouthCentral),
    ("UT", "utah", Division::Mountain),
    ("VT", "vermont", Division::NewEngland),
    ("VA", "virginia", Division::SouthAtlantic),
    ("WA", "washington", Division::Pacific),
    ("WV", "west virginia", Division::SouthAtlantic),
    ("WI", "wisconsin", Division::EastNorthCentral),
    ("WY", "wyoming", Division::Mountain),
];

/// Resolve a two-letter code or full state name to its canonical code.
pub(crate) fn normalize_state(raw: &str) -> Option<&'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    STATES
        .iter()
        .find(|(code, name, _)| {
            code.eq_ignore_ascii_case(trimmed) || name.eq_ignore_ascii_case(trimmed)
        })
        .map(|(code, _, _)| *code)
}

pub(crate) fn division_of(code: &str) -> Option<Division> {
    STATES
        .iter()
        .find(|(candidate, _, _)| *candidate == code)
        .map(|(_, _, division)| *division)
}

/// Extract the state from a "City, ST" branch label.
pub(crate) fn state_from_location(location: &str) -> Option<&'static str> {
    location
        .rsplit(',')
        .next()
        .and_then(normalize_state)
        .or_else(|| normalize_state(location))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_codes_and_names() {
        assert_eq!(normalize_state("tx"), Some("TX"));
        assert_eq!(normalize_state(" Texas "), Some("TX"));
        assert_eq!(normalize_state("District of Columbia"), Some("DC"));
        assert_eq!(normalize_state("Ontario"), None);
        assert_eq!(normalize_state(""), None);
    }

    #[test]
    fn branch_locations_resolve_trailing_state() {
        assert_eq!(state_from_location("Tulsa, OK"), Some("OK"));
        assert_eq!(state_from_location("Kansas City, Missouri"), Some("MO"));
        assert_eq!(state_from_location("Remote"), None);
    }

    #[test]
    fn divisions_roll_up_to_regions() {
        assert_eq!(division_of("TX"), Some(Division::WestSouthCentral));
        assert_eq!(
            division_of("FL").map(Division::region),
            Some(Region::South)
        );
        assert_eq!(division_of("ZZ"), None);
    }
}

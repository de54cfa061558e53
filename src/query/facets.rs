// src/query/facets.rs
//! Facet options and category grouping. Options always come from the full
//! collection, never from the filtered view.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::company::{Company, TeamSizeBucket};

/// Ordered `(category label, keyword substrings)` lookup.
pub type CategoryTable = &'static [(&'static str, &'static [&'static str])];

pub const OTHER_CATEGORY: &str = "Other";

pub const INDUSTRY_CATEGORIES: CategoryTable = &[
    (
        "AI & Machine Learning",
        &[
            "ai",
            "artificial-intelligence",
            "machine-learning",
            "deep-learning",
            "generative-ai",
            "ai-enhanced-learning",
            "aiops",
            "llm",
        ],
    ),
    (
        "Health & Biotech",
        &[
            "health",
            "healthcare",
            "biotech",
            "synthetic-biology",
            "health-tech",
            "medtech",
            "medical",
            "genomics",
            "drug-discovery",
        ],
    ),
    (
        "Developer Tools",
        &[
            "developer-tools",
            "devtools",
            "programming",
            "software",
            "code",
            "infrastructure",
            "api",
            "cloud",
            "web-development",
        ],
    ),
    (
        "Finance & Fintech",
        &[
            "finance",
            "fintech",
            "payments",
            "banking",
            "insurance",
            "crypto-web3",
            "blockchain",
            "investing",
        ],
    ),
    (
        "Enterprise & B2B",
        &[
            "b2b",
            "enterprise",
            "saas",
            "enterprise-software",
            "workflow-automation",
            "productivity",
            "compliance",
            "operations",
        ],
    ),
    (
        "Consumer",
        &[
            "consumer",
            "b2c",
            "social-media",
            "entertainment",
            "gaming",
            "travel",
            "food",
            "retail",
            "e-commerce",
        ],
    ),
    (
        "Hardware & Robotics",
        &[
            "hardware",
            "robotics",
            "iot",
            "drones",
            "hard-tech",
            "manufacturing",
            "3d-printing",
        ],
    ),
    (
        "Climate & Energy",
        &[
            "climate",
            "energy",
            "renewable-energy",
            "sustainability",
            "clean-tech",
            "climatetech",
            "agriculture",
        ],
    ),
    (
        "Data & Analytics",
        &[
            "data",
            "analytics",
            "big-data",
            "databases",
            "market-research",
            "business-intelligence",
            "data-science",
        ],
    ),
    (
        "Security",
        &["security", "cybersecurity", "privacy", "compliance", "defense"],
    ),
];

pub const LOCATION_CATEGORIES: CategoryTable = &[
    (
        "San Francisco Bay Area",
        &[
            "San Francisco",
            "SF",
            "Palo Alto",
            "Mountain View",
            "Menlo Park",
            "Redwood City",
            "San Jose",
            "Sunnyvale",
            "Santa Clara",
        ],
    ),
    (
        "New York",
        &["New York", "NYC", "New York, NY", "Brooklyn", "Manhattan"],
    ),
    (
        "Other US Cities",
        &[
            "Seattle",
            "Boston",
            "Austin",
            "Chicago",
            "Los Angeles",
            "LA",
            "Washington",
            "Miami",
            "Denver",
            "Portland",
        ],
    ),
    (
        "Europe",
        &[
            "London",
            "Berlin",
            "Paris",
            "Amsterdam",
            "Dublin",
            "Stockholm",
            "Barcelona",
            "Madrid",
            "Zurich",
            "Munich",
            "Europe",
        ],
    ),
    (
        "Asia",
        &[
            "Singapore",
            "Tokyo",
            "Hong Kong",
            "Bangalore",
            "Beijing",
            "Shanghai",
            "Seoul",
            "Taipei",
            "Mumbai",
            "Delhi",
        ],
    ),
    (
        "Other International",
        &[
            "Toronto",
            "Vancouver",
            "Montreal",
            "Sydney",
            "Melbourne",
            "Tel Aviv",
            "Dubai",
            "Mexico City",
            "Sao Paulo",
        ],
    ),
];

/// Selectable values per facet, each sorted ascending and de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetOptions {
    pub industries: Vec<String>,
    pub locations: Vec<String>,
    pub founded_years: Vec<String>,
    pub team_sizes: Vec<TeamSizeBucket>,
}

impl FacetOptions {
    pub fn derive(records: &[Company]) -> Self {
        let mut industries = BTreeSet::new();
        let mut locations = BTreeSet::new();
        let mut years = BTreeSet::new();
        for c in records {
            industries.extend(c.industry_tags().map(str::to_string));
            if !c.location.is_empty() {
                locations.insert(c.location.clone());
            }
            if !c.founded.is_empty() {
                years.insert(c.founded.clone());
            }
        }
        Self {
            industries: industries.into_iter().collect(),
            locations: locations.into_iter().collect(),
            founded_years: years.into_iter().collect(),
            team_sizes: TeamSizeBucket::ALL.to_vec(),
        }
    }

    pub fn industry_groups(&self) -> Vec<CategoryGroup> {
        group_by_category(&self.industries, INDUSTRY_CATEGORIES)
    }

    pub fn location_groups(&self) -> Vec<CategoryGroup> {
        group_by_category(&self.locations, LOCATION_CATEGORIES)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub label: String,
    pub members: Vec<String>,
}

pub fn in_category(value: &str, keywords: &[&str]) -> bool {
    let v = value.to_lowercase();
    keywords.iter().any(|k| v.contains(&k.to_lowercase()))
}

/// Labels of every category `value` belongs to (may be several, or none).
pub fn categories_of(value: &str, table: CategoryTable) -> Vec<&'static str> {
    table
        .iter()
        .filter(|(_, kws)| in_category(value, kws))
        .map(|(label, _)| *label)
        .collect()
}

/// Group `values` by `table`, in table order. Empty categories are omitted;
/// values matching nothing land in a trailing "Other" group.
pub fn group_by_category(values: &[String], table: CategoryTable) -> Vec<CategoryGroup> {
    let mut groups = Vec::new();
    let mut categorized: BTreeSet<&str> = BTreeSet::new();
    for (label, keywords) in table {
        let members: Vec<String> = values
            .iter()
            .filter(|v| in_category(v, keywords))
            .cloned()
            .collect();
        if members.is_empty() {
            continue;
        }
        categorized.extend(
            values
                .iter()
                .filter(|v| in_category(v, keywords))
                .map(String::as_str),
        );
        groups.push(CategoryGroup {
            label: (*label).to_string(),
            members,
        });
    }
    let other: Vec<String> = values
        .iter()
        .filter(|v| !categorized.contains(v.as_str()))
        .cloned()
        .collect();
    if !other.is_empty() {
        groups.push(CategoryGroup {
            label: OTHER_CATEGORY.to_string(),
            members: other,
        });
    }
    groups
}

/// Checkbox state for a group given the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Checked,
    Partial,
    Unchecked,
}

pub fn check_state(members: &[String], selected: &BTreeSet<String>) -> CheckState {
    let hit = members.iter().filter(|m| selected.contains(*m)).count();
    if hit == 0 && !members.is_empty() {
        CheckState::Unchecked
    } else if hit == members.len() {
        CheckState::Checked
    } else {
        CheckState::Partial
    }
}

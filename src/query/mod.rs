// src/query/mod.rs
//! Query pipeline: search → industry → location → team size → founded year →
//! sort → page window. Everything here is a pure function of the records and
//! the query input; the only state lives in `pagination` / `session`.

pub mod facets;
pub mod pagination;
pub mod session;

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::company::{Company, TeamSizeBucket};

pub use facets::{CategoryGroup, CheckState, FacetOptions};
pub use pagination::{Paginator, RevealRejected, RevealTicket};
pub use session::DirectorySession;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "latest")]
    Latest,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "teamSize")]
    TeamSize,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "latest" => Some(Self::Latest),
            "name" => Some(Self::Name),
            "teamSize" => Some(Self::TeamSize),
            _ => None,
        }
    }
}

/// Facet selections. An empty set never constrains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub industries: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    pub team_sizes: BTreeSet<TeamSizeBucket>,
    pub founded_years: BTreeSet<String>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.industries.is_empty()
            && self.locations.is_empty()
            && self.team_sizes.is_empty()
            && self.founded_years.is_empty()
    }

    fn passes_industry(&self, c: &Company) -> bool {
        self.industries.is_empty() || c.industry_tags().any(|t| self.industries.contains(t))
    }

    fn passes_location(&self, c: &Company) -> bool {
        self.locations.is_empty() || self.locations.contains(&c.location)
    }

    fn passes_team_size(&self, c: &Company) -> bool {
        self.team_sizes.is_empty() || self.team_sizes.iter().any(|b| b.contains(c.team_size))
    }

    fn passes_founded(&self, c: &Company) -> bool {
        self.founded_years.is_empty() || self.founded_years.contains(&c.founded)
    }

    pub fn toggle_team_size(&mut self, bucket: TeamSizeBucket, checked: bool) {
        if checked {
            self.team_sizes.insert(bucket);
        } else {
            self.team_sizes.remove(&bucket);
        }
    }

    pub fn toggle_founded_year(&mut self, year: &str, checked: bool) {
        toggle_one(&mut self.founded_years, year, checked);
    }

    pub fn toggle_industry(&mut self, tag: &str, checked: bool) {
        toggle_one(&mut self.industries, tag, checked);
    }

    pub fn toggle_location(&mut self, location: &str, checked: bool) {
        toggle_one(&mut self.locations, location, checked);
    }

    /// Category checkbox: every member tag joins or leaves the selection.
    pub fn toggle_industry_category(&mut self, group: &CategoryGroup, checked: bool) {
        toggle_many(&mut self.industries, &group.members, checked);
    }

    pub fn toggle_location_category(&mut self, group: &CategoryGroup, checked: bool) {
        toggle_many(&mut self.locations, &group.members, checked);
    }

    /// "All" checkboxes: checked selects every option, unchecked clears.
    pub fn select_all_industries(&mut self, options: &FacetOptions, checked: bool) {
        self.industries = select_all(&options.industries, checked);
    }

    pub fn select_all_locations(&mut self, options: &FacetOptions, checked: bool) {
        self.locations = select_all(&options.locations, checked);
    }

    pub fn select_all_founded_years(&mut self, options: &FacetOptions, checked: bool) {
        self.founded_years = select_all(&options.founded_years, checked);
    }

    pub fn select_all_team_sizes(&mut self, checked: bool) {
        self.team_sizes = if checked {
            TeamSizeBucket::ALL.into_iter().collect()
        } else {
            BTreeSet::new()
        };
    }
}

fn toggle_one(set: &mut BTreeSet<String>, value: &str, checked: bool) {
    if checked {
        set.insert(value.to_string());
    } else {
        set.remove(value);
    }
}

fn toggle_many(set: &mut BTreeSet<String>, values: &[String], checked: bool) {
    for v in values {
        toggle_one(set, v, checked);
    }
}

fn select_all(options: &[String], checked: bool) -> BTreeSet<String> {
    if checked {
        options.iter().cloned().collect()
    } else {
        BTreeSet::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryInput {
    pub search_term: String,
    #[serde(flatten)]
    pub filters: FilterState,
    pub sort: SortKey,
}

fn matches_search(c: &Company, term_lower: &str) -> bool {
    term_lower.is_empty()
        || c.name.to_lowercase().contains(term_lower)
        || c.description.to_lowercase().contains(term_lower)
        || c.industry.to_lowercase().contains(term_lower)
}

/// Indices into `records` that pass every stage, in display order.
pub fn select(records: &[Company], query: &QueryInput) -> Vec<usize> {
    let term = query.search_term.to_lowercase();
    let f = &query.filters;

    let mut idx: Vec<usize> = (0..records.len()).collect();
    idx.retain(|&i| matches_search(&records[i], &term));
    idx.retain(|&i| f.passes_industry(&records[i]));
    idx.retain(|&i| f.passes_location(&records[i]));
    idx.retain(|&i| f.passes_team_size(&records[i]));
    idx.retain(|&i| f.passes_founded(&records[i]));

    // sort_by is stable: ties keep ingestion order.
    match query.sort {
        SortKey::Latest => idx.sort_by(|&a, &b| {
            records[b]
                .founded_year()
                .cmp(&records[a].founded_year())
        }),
        SortKey::Name => idx.sort_by(|&a, &b| locale_cmp(&records[a].name, &records[b].name)),
        SortKey::TeamSize => idx.sort_by(|&a, &b| records[b].team_size.cmp(&records[a].team_size)),
    }
    idx
}

/// Same as [`select`] but yields the records themselves.
pub fn filter_and_sort<'a>(records: &'a [Company], query: &QueryInput) -> Vec<&'a Company> {
    select(records, query).into_iter().map(|i| &records[i]).collect()
}

/// The first `page * page_size` items (what a client shows after `page` reveals).
pub fn page_window<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let end = page.max(1).saturating_mul(page_size).min(items.len());
    &items[..end]
}

/// Name ordering that ignores accents and case first, then puts unaccented
/// before accented, then lowercase before uppercase.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| lowered(a).cmp(lowered(b)))
        .then_with(|| b.nfc().cmp(a.nfc()))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn lowered(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfc().flat_map(char::to_lowercase)
}

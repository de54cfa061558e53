// src/query/session.rs
use std::sync::Arc;

use crate::company::{Company, TeamSizeBucket};
use crate::query::facets::{check_state, CategoryGroup, CheckState, FacetOptions};
use crate::query::pagination::{Paginator, RevealRejected, RevealTicket};
use crate::query::{select, FilterState, QueryInput, SortKey};

/// One client's view of the directory: query inputs, the filtered and sorted
/// sequence, and the reveal cursor. Every input change recomputes from scratch
/// and resets pagination to page 1.
#[derive(Debug, Clone)]
pub struct DirectorySession {
    records: Arc<Vec<Company>>,
    options: FacetOptions,
    industry_groups: Vec<CategoryGroup>,
    location_groups: Vec<CategoryGroup>,
    query: QueryInput,
    matches: Vec<usize>,
    paginator: Paginator,
}

impl DirectorySession {
    pub fn new(records: Arc<Vec<Company>>, page_size: usize) -> Self {
        let options = FacetOptions::derive(&records);
        let industry_groups = options.industry_groups();
        let location_groups = options.location_groups();
        let mut session = Self {
            records,
            options,
            industry_groups,
            location_groups,
            query: QueryInput::default(),
            matches: Vec::new(),
            paginator: Paginator::new(page_size),
        };
        session.recompute();
        session
    }

    fn recompute(&mut self) {
        self.matches = select(&self.records, &self.query);
        self.paginator.reset(self.matches.len());
    }

    pub fn query(&self) -> &QueryInput {
        &self.query
    }

    pub fn filters(&self) -> &FilterState {
        &self.query.filters
    }

    pub fn options(&self) -> &FacetOptions {
        &self.options
    }

    pub fn industry_groups(&self) -> &[CategoryGroup] {
        &self.industry_groups
    }

    pub fn location_groups(&self) -> &[CategoryGroup] {
        &self.location_groups
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.query.search_term = term.into();
        self.recompute();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.query.sort = sort;
        self.recompute();
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.query.filters = filters;
        self.recompute();
    }

    /// Edit the filters in place; recomputes once afterwards.
    pub fn update_filters(&mut self, edit: impl FnOnce(&mut FilterState)) {
        edit(&mut self.query.filters);
        self.recompute();
    }

    /// Returns false when no industry category has that label.
    pub fn toggle_industry_category(&mut self, label: &str, checked: bool) -> bool {
        let Some(group) = self.industry_groups.iter().find(|g| g.label == label).cloned() else {
            return false;
        };
        self.update_filters(|f| f.toggle_industry_category(&group, checked));
        true
    }

    pub fn toggle_location_category(&mut self, label: &str, checked: bool) -> bool {
        let Some(group) = self.location_groups.iter().find(|g| g.label == label).cloned() else {
            return false;
        };
        self.update_filters(|f| f.toggle_location_category(&group, checked));
        true
    }

    pub fn toggle_team_size(&mut self, bucket: TeamSizeBucket, checked: bool) {
        self.update_filters(|f| f.toggle_team_size(bucket, checked));
    }

    pub fn toggle_founded_year(&mut self, year: &str, checked: bool) {
        self.update_filters(|f| f.toggle_founded_year(year, checked));
    }

    pub fn industry_category_state(&self, label: &str) -> Option<CheckState> {
        self.industry_groups
            .iter()
            .find(|g| g.label == label)
            .map(|g| check_state(&g.members, &self.query.filters.industries))
    }

    pub fn location_category_state(&self, label: &str) -> Option<CheckState> {
        self.location_groups
            .iter()
            .find(|g| g.label == label)
            .map(|g| check_state(&g.members, &self.query.filters.locations))
    }

    /// Companies currently on screen, in display order.
    pub fn visible(&self) -> Vec<&Company> {
        self.matches[..self.paginator.revealed()]
            .iter()
            .map(|&i| &self.records[i])
            .collect()
    }

    pub fn total_matches(&self) -> usize {
        self.matches.len()
    }

    /// True when nothing matches; the UI shows its empty-state message.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.paginator.has_more()
    }

    pub fn current_page(&self) -> usize {
        self.paginator.current_page()
    }

    pub fn begin_reveal(&mut self) -> Result<RevealTicket, RevealRejected> {
        self.paginator.begin_reveal()
    }

    /// Completes a reveal and returns the companies appended to the view.
    /// A stale ticket appends nothing.
    pub fn complete_reveal(&mut self, ticket: RevealTicket) -> Vec<&Company> {
        match self.paginator.complete_reveal(ticket) {
            Some(range) => self.matches[range]
                .iter()
                .map(|&i| &self.records[i])
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn reveal_next(&mut self) -> Result<Vec<&Company>, RevealRejected> {
        let range = self.paginator.reveal_next()?;
        Ok(self.matches[range]
            .iter()
            .map(|&i| &self.records[i])
            .collect())
    }
}

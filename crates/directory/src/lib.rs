use std::collections::HashSet;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use shared::domain::{FilterCategory, FilterFacet, TechnologistEntry};

/// Holds the full roster, the derived filter facets, and the currently
/// visible slice of the directory. All operations are synchronous state
/// transitions; the RNG used for presentation shuffling is injected so
/// callers (and tests) control the permutation source.
pub struct DirectoryStore<R: Rng> {
    roster: Vec<TechnologistEntry>,
    facets: Vec<FilterFacet>,
    visible: Option<Vec<TechnologistEntry>>,
    active_category: Option<FilterCategory>,
    panel_open: bool,
    rng: R,
}

impl DirectoryStore<StdRng> {
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> DirectoryStore<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            roster: Vec::new(),
            facets: Vec::new(),
            visible: None,
            active_category: None,
            panel_open: false,
            rng,
        }
    }

    pub fn roster(&self) -> &[TechnologistEntry] {
        &self.roster
    }

    pub fn facets(&self) -> &[FilterFacet] {
        &self.facets
    }

    /// `None` strictly before the first `initialize`; `Some` afterwards,
    /// even when the loaded roster was empty.
    pub fn visible(&self) -> Option<&[TechnologistEntry]> {
        self.visible.as_deref()
    }

    pub fn is_initialized(&self) -> bool {
        self.visible.is_some()
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn active_category(&self) -> Option<FilterCategory> {
        self.active_category
    }

    pub fn facets_in(&self, category: FilterCategory) -> impl Iterator<Item = &FilterFacet> {
        self.facets
            .iter()
            .filter(move |facet| facet.category == category)
    }

    /// The read-only facet list handed to an open filter panel. Empty while
    /// the panel is closed or no category is selected.
    pub fn panel_facets(&self) -> Vec<&FilterFacet> {
        if !self.panel_open {
            return Vec::new();
        }
        match self.active_category {
            Some(category) => self.facets_in(category).collect(),
            None => Vec::new(),
        }
    }

    /// Installs a freshly fetched roster: derives the facet set (all
    /// inactive), shuffles uniformly, then stable-sorts by `order`. Calling
    /// again re-derives everything from the new roster and discards any
    /// prior facet or panel state.
    pub fn initialize(&mut self, roster: Vec<TechnologistEntry>) {
        self.facets = derive_facets(&roster);
        self.active_category = None;
        self.panel_open = false;

        let mut roster = roster;
        roster.shuffle(&mut self.rng);
        roster.sort_by_key(|entry| entry.order);
        self.visible = Some(roster.clone());
        self.roster = roster;
    }

    /// Flips the named facet and recomputes the visible roster. A facet that
    /// does not exist in the current set (a stale reference after
    /// re-initialization) is a silent no-op.
    pub fn toggle_facet(&mut self, category: FilterCategory, label: &str) {
        let mut matched = false;
        let next: Vec<FilterFacet> = self
            .facets
            .iter()
            .map(|facet| {
                if facet.category == category && facet.label == label {
                    matched = true;
                    FilterFacet {
                        active: !facet.active,
                        ..facet.clone()
                    }
                } else {
                    facet.clone()
                }
            })
            .collect();
        if !matched {
            return;
        }
        self.facets = next;
        self.recompute_visible();
    }

    /// Deactivates every facet and resets the presentation: reshuffled,
    /// featured entries first.
    pub fn clear_filters(&mut self) {
        self.facets = self
            .facets
            .iter()
            .map(|facet| FilterFacet {
                active: false,
                ..facet.clone()
            })
            .collect();

        let mut next = self.roster.clone();
        next.shuffle(&mut self.rng);
        next.sort_by(|a, b| b.featured.cmp(&a.featured));
        self.visible = Some(next);
    }

    pub fn open_filter_panel(&mut self, category: FilterCategory) {
        self.active_category = Some(category);
        self.panel_open = true;
    }

    /// Closing leaves facet activation untouched.
    pub fn close_filter_panel(&mut self) {
        self.panel_open = false;
    }

    fn recompute_visible(&mut self) {
        let roles = effective_active_labels(&self.facets, FilterCategory::Role);
        let regions = effective_active_labels(&self.facets, FilterCategory::Region);

        if roles.is_empty() && regions.is_empty() {
            // No facets exist at all; fall back to the cleared presentation.
            self.clear_filters();
            return;
        }

        let visible = self
            .roster
            .iter()
            .filter(|entry| {
                roles.contains(entry.role.as_str()) && regions.contains(entry.region.as_str())
            })
            .cloned()
            .collect();
        self.visible = Some(visible);
    }
}

/// One facet per distinct role, then one per distinct region, in first
/// appearance order. Duplicates collapse; everything starts inactive.
pub fn derive_facets(roster: &[TechnologistEntry]) -> Vec<FilterFacet> {
    let mut facets = Vec::new();
    let mut seen: HashSet<(FilterCategory, &str)> = HashSet::new();
    for category in [FilterCategory::Role, FilterCategory::Region] {
        for entry in roster {
            let label = match category {
                FilterCategory::Role => entry.role.as_str(),
                FilterCategory::Region => entry.region.as_str(),
            };
            if seen.insert((category, label)) {
                facets.push(FilterFacet::inactive(label, category));
            }
        }
    }
    facets
}

/// The labels treated as active for one category: the active subset, or the
/// whole category when nothing in it is active. An empty selection means no
/// filtering on that axis.
pub fn effective_active_labels(facets: &[FilterFacet], category: FilterCategory) -> HashSet<String> {
    let active: HashSet<String> = facets
        .iter()
        .filter(|facet| facet.category == category && facet.active)
        .map(|facet| facet.label.clone())
        .collect();
    if !active.is_empty() {
        return active;
    }
    facets
        .iter()
        .filter(|facet| facet.category == category)
        .map(|facet| facet.label.clone())
        .collect()
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

// Dashboard view - filtered, paginated projection of the latest feed snapshot
use crate::application::feed_reconciler::FeedSnapshot;
use crate::application::filter::{self, FilterCriteria};
use crate::application::paginator::{PageSummary, Paginator};
use crate::domain::classification::Classification;
use crate::domain::reading::Reading;

#[derive(Debug, Clone)]
pub struct ClassifiedReading {
    pub reading: Reading,
    pub classification: Classification,
}

impl ClassifiedReading {
    pub fn new(reading: Reading) -> Self {
        let classification = Classification::of(&reading);
        Self {
            reading,
            classification,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageView {
    pub rows: Vec<ClassifiedReading>,
    pub summary: PageSummary,
    pub filters_active: bool,
}

/// Recomputes only when told to: `sync` for a new feed snapshot,
/// `set_criteria`/`clear_filters` for new criteria.
#[derive(Debug)]
pub struct DashboardView {
    feed: FeedSnapshot,
    criteria: FilterCriteria,
    paginator: Paginator,
    filtered: Vec<Reading>,
}

impl DashboardView {
    pub fn new(feed: FeedSnapshot) -> Self {
        let mut view = Self {
            feed,
            criteria: FilterCriteria::default(),
            paginator: Paginator::default(),
            filtered: Vec::new(),
        };
        view.refilter();
        view
    }

    /// Take a new feed snapshot. Keeps the current page when it is still in
    /// range.
    pub fn sync(&mut self, feed: FeedSnapshot) {
        let history_changed = feed.generation != self.feed.generation;
        self.feed = feed;
        if history_changed {
            self.refilter();
            self.paginator.clamp(self.filtered.len());
        }
    }

    /// Replace the criteria. Always returns to the first page.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refilter();
        self.paginator.reset();
    }

    pub fn clear_filters(&mut self) {
        self.set_criteria(FilterCriteria::default());
    }

    pub fn next_page(&mut self) {
        self.paginator.next(self.filtered.len());
    }

    pub fn previous_page(&mut self) {
        self.paginator.previous();
    }

    pub fn first_page(&mut self) {
        self.paginator.reset();
    }

    pub fn last_page(&mut self) {
        self.paginator.last(self.filtered.len());
    }

    pub fn go_to_page(&mut self, page_number: usize) {
        self.paginator.go_to(page_number, self.filtered.len());
    }

    pub fn feed(&self) -> &FeedSnapshot {
        &self.feed
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn filtered(&self) -> &[Reading] {
        &self.filtered
    }

    pub fn current_page_number(&self) -> usize {
        self.paginator.current_page()
    }

    pub fn current_page(&self) -> PageView {
        let rows = self
            .paginator
            .slice(&self.filtered)
            .iter()
            .cloned()
            .map(ClassifiedReading::new)
            .collect();

        PageView {
            rows,
            summary: self
                .paginator
                .summary(self.filtered.len(), self.feed.history.len()),
            filters_active: self.criteria.has_active_filters(),
        }
    }

    pub fn latest(&self) -> Option<ClassifiedReading> {
        self.feed.history.latest().cloned().map(ClassifiedReading::new)
    }

    fn refilter(&mut self) {
        self.filtered = filter::apply(self.feed.history.readings(), &self.criteria);
    }
}

//! The registry of open billing views.
//!
//! Each billing page load opens a view that owns its own [RevenueDrilldown],
//! so two browser tabs can drill into different months independently.

use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::{Error, billing::drilldown::RevenueDrilldown};

/// Identifies an open billing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(u64);

impl ViewId {
    /// Wrap a raw view ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw view ID.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The drill-down state of every open billing view.
///
/// IDs increase monotonically, so the smallest ID is the oldest view. When
/// more than `max_open` views are open the oldest is closed.
#[derive(Debug)]
pub struct DrilldownViews {
    views: BTreeMap<ViewId, RevenueDrilldown>,
    next_id: u64,
    max_open: usize,
}

impl DrilldownViews {
    /// Create an empty registry that keeps at most `max_open` views (at least one).
    pub fn new(max_open: usize) -> Self {
        Self {
            views: BTreeMap::new(),
            next_id: 1,
            max_open: max_open.max(1),
        }
    }

    /// Register `drilldown` as a new view and return its ID.
    pub fn open(&mut self, drilldown: RevenueDrilldown) -> ViewId {
        let id = ViewId(self.next_id);
        self.next_id += 1;
        self.views.insert(id, drilldown);

        while self.views.len() > self.max_open {
            if let Some((evicted, _)) = self.views.pop_first() {
                tracing::debug!("closed billing view {evicted} to make room for view {id}");
            }
        }

        id
    }

    /// Get the drill-down of an open view.
    ///
    /// # Errors
    /// Returns [Error::ViewNotFound] if the view was never opened, has been
    /// closed or was evicted.
    pub fn get_mut(&mut self, id: ViewId) -> Result<&mut RevenueDrilldown, Error> {
        self.views.get_mut(&id).ok_or(Error::ViewNotFound(id))
    }

    /// Close a view, returning its drill-down if it was open.
    pub fn close(&mut self, id: ViewId) -> Option<RevenueDrilldown> {
        self.views.remove(&id)
    }

    /// The number of open views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether no views are open.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        billing::{
            drilldown::{DrilldownConfig, RevenueDrilldown},
            views::{DrilldownViews, ViewId},
        },
        timezone::LocalTimezone,
    };

    fn drilldown() -> RevenueDrilldown {
        RevenueDrilldown::new(DrilldownConfig::default(), LocalTimezone::UTC, 2024)
    }

    #[test]
    fn open_assigns_increasing_ids() {
        let mut views = DrilldownViews::new(8);

        let first = views.open(drilldown());
        let second = views.open(drilldown());

        assert!(first < second);
        assert_eq!(views.len(), 2);
    }

    #[test]
    fn views_are_independent() {
        let mut views = DrilldownViews::new(8);
        let first = views.open(drilldown());
        let second = views.open(drilldown());

        views.get_mut(first).unwrap().focus_on_date(1_718_409_600_000);

        assert!(views.get_mut(first).unwrap().selected_period().is_some());
        assert!(views.get_mut(second).unwrap().selected_period().is_none());
    }

    #[test]
    fn unknown_view_is_an_error() {
        let mut views = DrilldownViews::new(8);

        let result = views.get_mut(ViewId::new(42));

        assert_eq!(result.err(), Some(Error::ViewNotFound(ViewId::new(42))));
    }

    #[test]
    fn close_removes_view() {
        let mut views = DrilldownViews::new(8);
        let id = views.open(drilldown());

        assert!(views.close(id).is_some());
        assert!(views.close(id).is_none());
        assert!(views.is_empty());
    }

    #[test]
    fn evicts_oldest_view_when_full() {
        let mut views = DrilldownViews::new(2);
        let first = views.open(drilldown());
        let second = views.open(drilldown());
        let third = views.open(drilldown());

        assert_eq!(views.len(), 2);
        assert!(views.get_mut(first).is_err());
        assert!(views.get_mut(second).is_ok());
        assert!(views.get_mut(third).is_ok());
    }

    #[test]
    fn keeps_at_least_one_view() {
        let mut views = DrilldownViews::new(0);

        let id = views.open(drilldown());

        assert!(views.get_mut(id).is_ok());
    }
}

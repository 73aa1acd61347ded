//! Column width planning for a terminal width.
//!
//! Fixed-width fields are reserved first. The remaining space (after the
//! inter-field gaps) is split into equal shares for the auto fields. If that
//! leaves the line too wide, fields lose one column each in turn, never going
//! below one column.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::field::FieldSpec;

/// Allocated column widths, in layout order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutPlan {
    terminal_width: usize,
    widths: Vec<(String, usize)>,
}

impl LayoutPlan {
    /// Width allocated to the named field.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.widths
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, width)| *width)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.widths.iter().map(|(name, width)| (name.as_str(), *width))
    }

    /// Sum of all field widths, without gaps.
    pub fn total(&self) -> usize {
        self.widths.iter().map(|(_, width)| width).sum()
    }

    /// The terminal width this plan was computed for.
    pub fn terminal_width(&self) -> usize {
        self.terminal_width
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}

/// Computes column widths for `fields` on a terminal `terminal_width` wide.
///
/// Once the terminal can hold one column per field plus the gaps, the widths
/// and gaps add up to exactly `terminal_width` whenever at least one field is
/// auto-sized. Narrower terminals still give every field one column.
///
/// ```rust
/// use ttyline_render::{layout::plan, FieldSpec};
///
/// let fields = [
///     FieldSpec::new("level").width(8),
///     FieldSpec::new("name").width(10),
///     FieldSpec::new("message"),
/// ];
/// let plan = plan(&fields, 40, 1);
/// assert_eq!(plan.get("message"), Some(20));
/// assert_eq!(plan.total() + 2, 40);
/// ```
pub fn plan(fields: &[FieldSpec], terminal_width: usize, gap: usize) -> LayoutPlan {
    let gaps = fields.len().saturating_sub(1) * gap;
    let total = terminal_width.saturating_sub(gaps);

    let mut available = total;
    let mut auto_count = 0;
    for field in fields {
        if field.is_auto() {
            auto_count += 1;
        } else {
            available = available.saturating_sub(field.width);
        }
    }

    let auto_size = if auto_count == 0 {
        0
    } else {
        available.max(auto_count).div_ceil(auto_count)
    };

    let mut widths: Vec<(String, usize)> = fields
        .iter()
        .map(|field| {
            let width = if field.is_auto() { auto_size } else { field.width };
            (field.name.clone(), width)
        })
        .collect();

    let mut overflow = widths
        .iter()
        .map(|(_, width)| width)
        .sum::<usize>()
        .saturating_sub(total);
    while overflow > 0 && widths.iter().any(|(_, width)| *width > 1) {
        for (_, width) in widths.iter_mut() {
            if overflow == 0 {
                break;
            }
            if *width > 1 {
                *width -= 1;
                overflow -= 1;
            }
        }
    }

    LayoutPlan {
        terminal_width,
        widths,
    }
}

/// The most recent plan, reused until the terminal width changes.
#[derive(Debug, Default)]
pub struct LayoutCache {
    plan: Mutex<Option<Arc<LayoutPlan>>>,
    rebuilds: AtomicUsize,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached plan for `terminal_width`, computing it first if
    /// the cache is empty or was built for another width.
    ///
    /// Concurrent callers observing a new width wait for a single rebuild.
    pub fn get_or_plan(
        &self,
        fields: &[FieldSpec],
        terminal_width: usize,
        gap: usize,
    ) -> Arc<LayoutPlan> {
        let mut cached = self.plan.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(plan) = cached.as_ref() {
            if plan.terminal_width == terminal_width {
                return Arc::clone(plan);
            }
        }

        let fresh = Arc::new(plan(fields, terminal_width, gap));
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "layout for width {}: {}",
            terminal_width,
            fresh
                .iter()
                .map(|(name, width)| format!("{}={}", name, width))
                .collect::<Vec<_>>()
                .join(", ")
        );
        *cached = Some(Arc::clone(&fresh));
        fresh
    }

    /// Number of plans computed so far.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds.load(Ordering::Relaxed)
    }

    /// Drops the cached plan, e.g. after the field list changed.
    pub fn invalidate(&self) {
        *self.plan.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(widths: &[usize]) -> Vec<FieldSpec> {
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| FieldSpec::new(format!("f{}", i)).width(*w))
            .collect()
    }

    fn widths(plan: &LayoutPlan) -> Vec<usize> {
        plan.iter().map(|(_, w)| w).collect()
    }

    #[test]
    fn fixed_and_auto() {
        let plan = plan(&fields(&[8, 10, 0]), 40, 1);
        assert_eq!(widths(&plan), [8, 10, 20]);
        assert_eq!(plan.get("f2"), Some(20));
        assert_eq!(plan.get("missing"), None);
        assert_eq!(plan.terminal_width(), 40);
    }

    #[test]
    fn auto_fields_share_evenly() {
        let plan = plan(&fields(&[0, 0]), 21, 1);
        assert_eq!(widths(&plan), [10, 10]);
    }

    #[test]
    fn uneven_share_is_shrunk_in_layout_order() {
        let plan = plan(&fields(&[0, 0, 0]), 13, 0);
        assert_eq!(widths(&plan), [4, 4, 5]);
    }

    #[test]
    fn fixed_fields_too_wide_are_shrunk() {
        let plan = plan(&fields(&[10, 10, 0]), 20, 0);
        // the auto share floors at one column and the first field gives it back
        assert_eq!(widths(&plan), [9, 10, 1]);
    }

    #[test]
    fn shrinking_skips_single_column_fields() {
        let plan = plan(&fields(&[1, 30]), 11, 1);
        assert_eq!(widths(&plan), [1, 9]);
    }

    #[test]
    fn narrow_terminal_floors_at_one() {
        let narrow = plan(&fields(&[8, 10, 0]), 2, 1);
        assert_eq!(widths(&narrow), [1, 1, 1]);

        let empty = plan(&fields(&[0, 0]), 0, 1);
        assert_eq!(widths(&empty), [1, 1]);
    }

    #[test]
    fn only_fixed_fields_may_underfill() {
        let plan = plan(&fields(&[5, 5]), 80, 1);
        assert_eq!(widths(&plan), [5, 5]);
    }

    #[test]
    fn empty_layout() {
        let plan = plan(&[], 80, 1);
        assert!(plan.is_empty());
        assert_eq!(plan.total(), 0);
    }

    #[test]
    fn cache_reuses_plan_for_same_width() {
        let cache = LayoutCache::new();
        let layout = fields(&[8, 0]);

        let first = cache.get_or_plan(&layout, 40, 1);
        let second = cache.get_or_plan(&layout, 40, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.rebuilds(), 1);

        let third = cache.get_or_plan(&layout, 60, 1);
        assert_eq!(third.get("f1"), Some(51));
        assert_eq!(cache.rebuilds(), 2);
    }

    #[test]
    fn cache_invalidate_forces_rebuild() {
        let cache = LayoutCache::new();
        let layout = fields(&[0]);
        cache.get_or_plan(&layout, 40, 1);
        cache.invalidate();
        cache.get_or_plan(&layout, 40, 1);
        assert_eq!(cache.rebuilds(), 2);
    }

    #[test]
    fn cache_is_shared_across_threads() {
        let cache = Arc::new(LayoutCache::new());
        let layout = Arc::new(fields(&[8, 10, 0]));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let layout = Arc::clone(&layout);
                std::thread::spawn(move || cache.get_or_plan(&layout, 40, 1).get("f2"))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(20));
        }
        assert_eq!(cache.rebuilds(), 1);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn layout() -> impl Strategy<Value = Vec<FieldSpec>> {
        prop::collection::vec(prop_oneof![Just(0usize), 1usize..30], 1..8).prop_map(|widths| {
            widths
                .into_iter()
                .enumerate()
                .map(|(i, w)| FieldSpec::new(format!("f{}", i)).width(w))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn fills_terminal_exactly(
            mut fields in layout(),
            gap in 0usize..3,
            extra in 0usize..200,
        ) {
            fields.push(FieldSpec::new("auto"));
            let gaps = (fields.len() - 1) * gap;
            let width = fields.len() + gaps + extra;

            let plan = plan(&fields, width, gap);
            prop_assert_eq!(plan.total() + gaps, width);
            prop_assert!(plan.iter().all(|(_, w)| w >= 1));
        }

        #[test]
        fn never_below_one_column(fields in layout(), width in 0usize..40, gap in 0usize..3) {
            let plan = plan(&fields, width, gap);
            prop_assert_eq!(plan.len(), fields.len());
            prop_assert!(plan.iter().all(|(_, w)| w >= 1));
        }

        #[test]
        fn same_width_same_plan(fields in layout(), width in 0usize..200) {
            prop_assert_eq!(plan(&fields, width, 1), plan(&fields, width, 1));
        }
    }
}

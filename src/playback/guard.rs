//! Boundary guard: keeps playback inside the active page's time window.

use crate::book::{Page, Seconds, TimeWindow};

/// Outcome of checking a position against the bound window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuardVerdict {
    /// Inside the window, or nothing bound.
    Inside,
    /// Outside the window; stop and rewind to the page start.
    Violated { rewind_to: Seconds },
}

/// Check `now` against a closed window.
pub fn enforce(window: TimeWindow, now: Seconds) -> GuardVerdict {
    if window.contains(now) {
        GuardVerdict::Inside
    } else {
        GuardVerdict::Violated {
            rewind_to: window.start,
        }
    }
}

/// Binding of the guard to one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subscription {
    pub id: u64,
    pub page_index: usize,
    pub window: TimeWindow,
}

/// Holds at most one page subscription at a time.
///
/// `bind` replaces the previous subscription in one step, so no check can
/// ever run against a page that is no longer active.
#[derive(Debug, Default)]
pub struct BoundaryGuard {
    subscription: Option<Subscription>,
    next_id: u64,
}

impl BoundaryGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear down the current subscription and subscribe to `page`.
    pub fn bind(&mut self, page_index: usize, page: &Page) -> Subscription {
        if let Some(old) = self.subscription.take() {
            log::trace!(
                "guard: unbinding subscription {} (page {})",
                old.id,
                old.page_index
            );
        }
        self.next_id += 1;
        let subscription = Subscription {
            id: self.next_id,
            page_index,
            window: page.window(),
        };
        log::trace!(
            "guard: subscription {} on page {} [{:.3}, {:.3}]",
            subscription.id,
            page_index,
            subscription.window.start,
            subscription.window.end
        );
        self.subscription = Some(subscription);
        subscription
    }

    pub fn unbind(&mut self) {
        self.subscription = None;
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    /// Check a position update against the bound page.
    pub fn check(&self, now: Seconds) -> GuardVerdict {
        match &self.subscription {
            Some(sub) => enforce(sub.window, now),
            None => GuardVerdict::Inside,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::TimedWord;

    fn page(start: f64, end: f64) -> Page {
        Page::new(vec![
            TimedWord::new("first", start, start + 1.0).unwrap(),
            TimedWord::new("last.", end - 1.0, end).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn past_window_end_rewinds_to_page_start() {
        let window = TimeWindow {
            start: 10.0,
            end: 20.0,
        };
        assert_eq!(
            enforce(window, 21.0),
            GuardVerdict::Violated { rewind_to: 10.0 }
        );
    }

    #[test]
    fn before_window_start_rewinds_to_page_start() {
        let window = TimeWindow {
            start: 10.0,
            end: 20.0,
        };
        assert_eq!(
            enforce(window, 9.5),
            GuardVerdict::Violated { rewind_to: 10.0 }
        );
    }

    #[test]
    fn inside_window_takes_no_action() {
        let window = TimeWindow {
            start: 10.0,
            end: 20.0,
        };
        for now in [10.0, 15.0, 20.0] {
            assert_eq!(enforce(window, now), GuardVerdict::Inside, "now={now}");
        }
    }

    #[test]
    fn unbound_guard_never_trips() {
        let guard = BoundaryGuard::new();
        assert_eq!(guard.check(1e9), GuardVerdict::Inside);
    }

    #[test]
    fn rebinding_replaces_old_window() {
        let mut guard = BoundaryGuard::new();
        let first = guard.bind(0, &page(0.0, 10.0));
        assert_eq!(guard.check(5.0), GuardVerdict::Inside);

        let second = guard.bind(1, &page(10.0, 20.0));

        assert_ne!(first.id, second.id);
        assert_eq!(guard.subscription().map(|s| s.page_index), Some(1));
        // A position valid only for the old page now trips the guard.
        assert_eq!(
            guard.check(5.0),
            GuardVerdict::Violated { rewind_to: 10.0 }
        );
        assert_eq!(guard.check(15.0), GuardVerdict::Inside);
    }

    #[test]
    fn unbind_clears_subscription() {
        let mut guard = BoundaryGuard::new();
        guard.bind(0, &page(0.0, 10.0));
        guard.unbind();
        assert!(guard.subscription().is_none());
    }
}

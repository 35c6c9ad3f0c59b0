use std::collections::HashMap;

/// Pull round bookkeeping: which repositories still owe a completion, and the
/// HEAD each one had before its pull was dispatched.
///
/// Keyed by path so completions can arrive in any order.
#[derive(Debug, Clone, Default)]
pub struct BatchTracker {
    pending: HashMap<String, Option<String>>,
}

impl BatchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register paths for a round. A path already in flight is reset and will
    /// have its head captured again.
    pub fn begin<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            self.pending.insert(path.into(), None);
        }
    }

    /// Remember the pre-pull head. Returns false when the path is not pending.
    pub fn record_head(&mut self, path: &str, head: Option<String>) -> bool {
        match self.pending.get_mut(path) {
            Some(slot) => {
                *slot = head;
                true
            }
            None => false,
        }
    }

    pub fn pre_pull_head(&self, path: &str) -> Option<&str> {
        self.pending.get(path).and_then(|h| h.as_deref())
    }

    /// Mark a path finished. Returns true only when this completion emptied the set.
    pub fn complete(&mut self, path: &str) -> bool {
        self.pending.remove(path).is_some() && self.pending.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.pending.contains_key(path)
    }

    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("/git/repo{}", i)).collect()
    }

    #[test]
    fn test_done_only_after_last_completion() {
        let mut tracker = BatchTracker::new();
        tracker.begin(paths(3));
        assert!(!tracker.complete("/git/repo1"));
        assert!(!tracker.complete("/git/repo0"));
        assert!(!tracker.is_done());
        assert!(tracker.complete("/git/repo2"));
        assert!(tracker.is_done());
    }

    #[test]
    fn test_every_completion_order_finishes_exactly_once() {
        // all 24 orderings of four completions
        let all = paths(4);
        let mut orders: Vec<Vec<usize>> = vec![vec![]];
        for _ in 0..all.len() {
            orders = orders
                .into_iter()
                .flat_map(|prefix| {
                    (0..all.len())
                        .filter(|i| !prefix.contains(i))
                        .map(|i| {
                            let mut next = prefix.clone();
                            next.push(i);
                            next
                        })
                        .collect::<Vec<_>>()
                })
                .collect();
        }
        assert_eq!(orders.len(), 24);

        for order in orders {
            let mut tracker = BatchTracker::new();
            tracker.begin(all.clone());
            let done: Vec<bool> = order.iter().map(|&i| tracker.complete(&all[i])).collect();
            assert_eq!(done, vec![false, false, false, true]);
        }
    }

    #[test]
    fn test_unknown_completion_does_not_finish() {
        let mut tracker = BatchTracker::new();
        assert!(!tracker.complete("/git/stray"));

        tracker.begin(["/git/a"]);
        assert!(!tracker.complete("/git/stray"));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_head_recorded_per_path() {
        let mut tracker = BatchTracker::new();
        tracker.begin(["/git/a", "/git/b"]);
        assert!(tracker.record_head("/git/a", Some("aaa".to_string())));
        assert!(tracker.record_head("/git/b", None));
        assert!(!tracker.record_head("/git/c", Some("ccc".to_string())));
        assert_eq!(tracker.pre_pull_head("/git/a"), Some("aaa"));
        assert_eq!(tracker.pre_pull_head("/git/b"), None);
    }

    #[test]
    fn test_begin_resets_in_flight_path() {
        let mut tracker = BatchTracker::new();
        tracker.begin(["/git/a"]);
        tracker.record_head("/git/a", Some("old".to_string()));
        tracker.begin(["/git/a", "/git/b"]);
        assert_eq!(tracker.pre_pull_head("/git/a"), None);
        assert_eq!(tracker.len(), 2);
    }
}

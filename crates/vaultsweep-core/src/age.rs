/// File age checks: the "too young to touch" rule and stale trash entries.
use std::time::{Duration, SystemTime};

const SECS_PER_DAY: u64 = 24 * 3600;

/// Whole days between `modified` and `now`. `None` if either the timestamp
/// is missing or it lies in the future.
pub fn age_days(modified: Option<SystemTime>, now: SystemTime) -> Option<u64> {
    let age = now.duration_since(modified?).ok()?;
    Some(age.as_secs() / SECS_PER_DAY)
}

/// `true` if the file was modified less than `threshold_days` ago.
///
/// A threshold of 0 disables the check. A missing timestamp counts as old;
/// a timestamp in the future counts as young.
pub fn is_younger_than(
    modified: Option<SystemTime>,
    now: SystemTime,
    threshold_days: u32,
) -> bool {
    if threshold_days == 0 {
        return false;
    }
    let Some(modified) = modified else {
        return false;
    };
    let threshold = Duration::from_secs(u64::from(threshold_days) * SECS_PER_DAY);
    match now.duration_since(modified) {
        Ok(age) => age < threshold,
        Err(_) => true,
    }
}

/// An item identified as older than a threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleItem<T> {
    pub item: T,
    pub age_days: u64,
}

/// Items at least `min_age_days` old, oldest first. Items without a
/// timestamp are skipped.
pub fn find_stale<T>(
    items: impl IntoIterator<Item = T>,
    modified: impl Fn(&T) -> Option<SystemTime>,
    min_age_days: u64,
    now: SystemTime,
) -> Vec<StaleItem<T>> {
    let mut stale: Vec<StaleItem<T>> = items
        .into_iter()
        .filter_map(|item| {
            let days = age_days(modified(&item), now)?;
            (days >= min_age_days).then_some(StaleItem {
                age_days: days,
                item,
            })
        })
        .collect();

    stale.sort_by(|a, b| b.age_days.cmp(&a.age_days));
    stale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days_ago(now: SystemTime, days: u64) -> SystemTime {
        now - Duration::from_secs(days * SECS_PER_DAY + 1)
    }

    #[test]
    fn file_modified_five_days_ago_is_younger_than_thirty() {
        let now = SystemTime::now();
        assert!(is_younger_than(Some(days_ago(now, 5)), now, 30));
    }

    #[test]
    fn old_file_is_not_young() {
        let now = SystemTime::now();
        assert!(!is_younger_than(Some(days_ago(now, 31)), now, 30));
    }

    #[test]
    fn zero_threshold_disables_the_check() {
        let now = SystemTime::now();
        assert!(!is_younger_than(Some(now), now, 0));
    }

    #[test]
    fn missing_timestamp_counts_as_old() {
        assert!(!is_younger_than(None, SystemTime::now(), 30));
    }

    #[test]
    fn future_timestamp_counts_as_young() {
        let now = SystemTime::now();
        let future = now + Duration::from_secs(3600);
        assert!(is_younger_than(Some(future), now, 1));
    }

    #[test]
    fn age_in_whole_days() {
        let now = SystemTime::now();
        assert_eq!(age_days(Some(days_ago(now, 400)), now), Some(400));
        assert_eq!(age_days(None, now), None);
    }

    #[test]
    fn stale_items_are_filtered_and_sorted_oldest_first() {
        let now = SystemTime::now();
        let items = vec![
            ("new", Some(days_ago(now, 1))),
            ("old", Some(days_ago(now, 40))),
            ("older", Some(days_ago(now, 90))),
            ("unknown", None),
        ];
        let stale = find_stale(items, |(_, m)| *m, 7, now);
        let names: Vec<&str> = stale.iter().map(|s| s.item.0).collect();
        assert_eq!(names, vec!["older", "old"]);
        assert!(stale[0].age_days >= 90);
    }

    #[test]
    fn stale_threshold_is_inclusive_and_skips_future_items() {
        let now = SystemTime::now();
        let items = vec![
            ("edge", Some(days_ago(now, 7))),
            ("future", Some(now + Duration::from_secs(3600))),
        ];
        let stale = find_stale(items, |(_, m)| *m, 7, now);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].item.0, "edge");
        assert_eq!(stale[0].age_days, 7);
    }
}

//! Half-open interval arithmetic.

use chrono::DateTime;
use chrono_tz::Tz;
use search_ingest_shared::OpeningHoursTimesRange;

/// A non-empty half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval<T> {
    start: T,
    end: T,
}

/// An interval in absolute time.
pub type DateTimeRange = Interval<DateTime<Tz>>;

impl<T: Ord + Copy> Interval<T> {
    /// Returns `None` when `start >= end`.
    pub fn new(start: T, end: T) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> T {
        self.start
    }

    pub fn end(&self) -> T {
        self.end
    }

    pub fn contains(&self, point: T) -> bool {
        self.start <= point && point < self.end
    }

    /// Remove `subtrahend` from this interval.
    ///
    /// The result has zero, one or two intervals and never contains an
    /// empty one.
    pub fn difference(&self, subtrahend: &Self) -> Vec<Self> {
        if subtrahend.start <= self.start && subtrahend.end >= self.end {
            // covered
            Vec::new()
        } else if subtrahend.end <= self.start || subtrahend.start >= self.end {
            // disjoint
            vec![*self]
        } else if subtrahend.start > self.start && subtrahend.end < self.end {
            // strictly inside, splits in two
            vec![
                Self {
                    start: self.start,
                    end: subtrahend.start,
                },
                Self {
                    start: subtrahend.end,
                    end: self.end,
                },
            ]
        } else if subtrahend.start <= self.start {
            vec![Self {
                start: subtrahend.end,
                end: self.end,
            }]
        } else {
            vec![Self {
                start: self.start,
                end: subtrahend.start,
            }]
        }
    }
}

/// Subtract every interval of `subtrahends` from every interval of `minuends`.
///
/// Subtrahends are applied one at a time, each to the result of the previous
/// ones.
pub fn subtract_all<T: Ord + Copy>(
    minuends: Vec<Interval<T>>,
    subtrahends: &[Interval<T>],
) -> Vec<Interval<T>> {
    subtrahends.iter().fold(minuends, |remaining, subtrahend| {
        remaining
            .iter()
            .flat_map(|minuend| minuend.difference(subtrahend))
            .collect()
    })
}

impl Interval<DateTime<Tz>> {
    /// Indexable form with RFC 3339 bounds.
    pub fn as_opening_hours_times_range(&self) -> OpeningHoursTimesRange {
        OpeningHoursTimesRange {
            gte: self.start.to_rfc3339(),
            lt: self.end.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn iv(start: i32, end: i32) -> Interval<i32> {
        Interval::new(start, end).unwrap()
    }

    #[test]
    fn test_empty_and_inverted_intervals_are_rejected() {
        assert_eq!(Interval::new(5, 5), None);
        assert_eq!(Interval::new(6, 5), None);
    }

    #[test]
    fn test_difference_cases() {
        let minuend = iv(10, 20);

        assert!(minuend.difference(&iv(5, 25)).is_empty());
        assert!(minuend.difference(&iv(10, 20)).is_empty());
        assert_eq!(minuend.difference(&iv(20, 30)), vec![iv(10, 20)]);
        assert_eq!(minuend.difference(&iv(0, 10)), vec![iv(10, 20)]);
        assert_eq!(minuend.difference(&iv(12, 15)), vec![iv(10, 12), iv(15, 20)]);
        assert_eq!(minuend.difference(&iv(5, 15)), vec![iv(15, 20)]);
        assert_eq!(minuend.difference(&iv(10, 15)), vec![iv(15, 20)]);
        assert_eq!(minuend.difference(&iv(15, 25)), vec![iv(10, 15)]);
        assert_eq!(minuend.difference(&iv(15, 20)), vec![iv(10, 15)]);
    }

    #[test]
    fn test_subtract_all_applies_subtrahends_in_sequence() {
        let result = subtract_all(
            vec![iv(0, 100), iv(200, 300)],
            &[iv(10, 20), iv(50, 250), iv(290, 400)],
        );
        assert_eq!(result, vec![iv(0, 10), iv(20, 50), iv(250, 290)]);
    }

    #[test]
    fn test_reduce_examples() {
        assert_eq!(subtract_all(vec![iv(4, 7)], &[iv(1, 3)]), vec![iv(4, 7)]);
        assert_eq!(subtract_all(vec![iv(4, 7)], &[iv(5, 6)]), vec![iv(4, 5), iv(6, 7)]);
        assert!(subtract_all(vec![iv(4, 7)], &[iv(4, 7)]).is_empty());
        assert_eq!(
            subtract_all(vec![iv(3, 5), iv(7, 9)], &[iv(4, 8)]),
            vec![iv(3, 4), iv(8, 9)]
        );
    }

    #[test]
    fn test_subtract_nothing_returns_minuends() {
        assert_eq!(subtract_all(vec![iv(1, 2)], &[]), vec![iv(1, 2)]);
    }

    fn arb_interval() -> impl Strategy<Value = Interval<i32>> {
        (-50i32..50, 1i32..30).prop_map(|(start, len)| iv(start, start + len))
    }

    proptest! {
        #[test]
        fn prop_difference_is_exact_set_difference(
            opens in prop::collection::vec(arb_interval(), 0..5),
            closeds in prop::collection::vec(arb_interval(), 0..5),
        ) {
            let result = subtract_all(opens.clone(), &closeds);

            for range in &result {
                prop_assert!(range.start() < range.end());
            }

            for point in -60i32..90 {
                let in_result = result.iter().any(|r| r.contains(point));
                let expected = opens.iter().any(|r| r.contains(point))
                    && !closeds.iter().any(|r| r.contains(point));
                prop_assert_eq!(in_result, expected, "point {}", point);
            }
        }
    }
}

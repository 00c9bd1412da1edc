//! Clipping of a slot sequence to a time window and a maximum count.

use chrono::{DateTime, Utc};

use crate::error::{ServiceError, ServiceResult};

/// Position of a slot relative to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Ends at or before the window start.
    Before,
    /// Overlaps the window.
    Inside,
    /// Starts at or after the window end. No later slot can be inside.
    After,
}

/// Optional half-open window `[start, end)` plus optional limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeFilter {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    limit: Option<usize>,
}

impl RangeFilter {
    /// ## Summary
    /// Creates a filter after checking its arguments.
    ///
    /// ## Errors
    /// Returns `InvalidLimit` for a zero limit and `InvalidRange` when the
    /// end lies before the start.
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> ServiceResult<Self> {
        if limit == Some(0) {
            return Err(ServiceError::InvalidLimit(0));
        }
        if let (Some(start), Some(end)) = (start, end)
            && end < start
        {
            return Err(ServiceError::InvalidRange { start, end });
        }
        Ok(Self { start, end, limit })
    }

    /// Returns whether `emitted` occurrences exhaust the limit.
    #[must_use]
    pub fn limit_reached(&self, emitted: usize) -> bool {
        self.limit.is_some_and(|limit| emitted >= limit)
    }

    /// ## Summary
    /// Classifies the slot `[slot_start, slot_end)`.
    ///
    /// Slots overlapping the window are inside. A zero-length slot is inside
    /// when its start lies within the window.
    #[must_use]
    pub fn membership(&self, slot_start: DateTime<Utc>, slot_end: DateTime<Utc>) -> Membership {
        if self.end.is_some_and(|end| slot_start >= end) {
            return Membership::After;
        }
        let Some(start) = self.start else {
            return Membership::Inside;
        };

        let inside = if slot_end > slot_start {
            slot_end > start
        } else {
            slot_start >= start
        };
        if inside {
            Membership::Inside
        } else {
            Membership::Before
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2008, 10, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(matches!(
            RangeFilter::new(None, None, Some(0)),
            Err(ServiceError::InvalidLimit(0))
        ));
        assert!(matches!(
            RangeFilter::new(Some(at(10)), Some(at(9)), None),
            Err(ServiceError::InvalidRange { .. })
        ));
        assert!(RangeFilter::new(Some(at(10)), Some(at(10)), Some(1)).is_ok());
    }

    #[test]
    fn test_overlap_membership() {
        let filter = RangeFilter::new(Some(at(10)), Some(at(12)), None).unwrap();

        assert_eq!(filter.membership(at(8), at(10)), Membership::Before);
        assert_eq!(filter.membership(at(9), at(11)), Membership::Inside);
        assert_eq!(filter.membership(at(11), at(13)), Membership::Inside);
        assert_eq!(filter.membership(at(12), at(13)), Membership::After);
    }

    #[test]
    fn test_zero_length_membership() {
        let filter = RangeFilter::new(Some(at(10)), Some(at(12)), None).unwrap();

        assert_eq!(filter.membership(at(9), at(9)), Membership::Before);
        assert_eq!(filter.membership(at(10), at(10)), Membership::Inside);
        assert_eq!(filter.membership(at(12), at(12)), Membership::After);
    }

    #[test]
    fn test_unbounded_admits_everything() {
        let filter = RangeFilter::new(None, None, None).unwrap();

        assert_eq!(filter.membership(at(0), at(1)), Membership::Inside);
        assert!(!filter.limit_reached(1_000_000));
    }

    #[test]
    fn test_limit_reached() {
        let filter = RangeFilter::new(None, None, Some(3)).unwrap();

        assert!(!filter.limit_reached(2));
        assert!(filter.limit_reached(3));
        assert!(filter.limit_reached(4));
    }
}

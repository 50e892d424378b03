//! Date inference for value-only quarters.

use findata_core::QuarterRecord;

/// Dates undated quarters from their neighbours.
///
/// A missing start becomes the day after the previous quarter ends; a missing
/// end becomes the day before the next quarter starts. The first and last
/// records have no neighbour on one side and keep that date unset. `quarters`
/// must already be sorted by key and hold every synthesised quarter.
pub fn infer_dates(quarters: &mut [QuarterRecord]) {
    debug_assert!(quarters.windows(2).all(|w| w[0].key <= w[1].key));

    for i in 0..quarters.len() {
        let start = i
            .checked_sub(1)
            .and_then(|prev| quarters[prev].end())
            .and_then(|end| end.succ_opt());
        let end = quarters
            .get(i + 1)
            .and_then(QuarterRecord::start)
            .and_then(|start| start.pred_opt());
        quarters[i].fill_dates(start, end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use findata_core::{PeriodKey, Provenance};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key(s: &str) -> PeriodKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_interior_quarter_dated_from_neighbours() {
        let mut quarters = vec![
            QuarterRecord::explicit(key("2020Q1"), 20, date(2020, 1, 1), date(2020, 3, 31)),
            QuarterRecord::inferred(key("2020Q2"), 30),
            QuarterRecord::explicit(key("2020Q3"), 25, date(2020, 7, 1), date(2020, 9, 30)),
        ];
        infer_dates(&mut quarters);

        assert_eq!(quarters[1].start(), Some(date(2020, 4, 1)));
        assert_eq!(quarters[1].end(), Some(date(2020, 6, 30)));
        assert!(matches!(quarters[1].provenance, Provenance::InferredDate { .. }));
    }

    #[test]
    fn test_last_quarter_keeps_end_unset() {
        let mut quarters = vec![
            QuarterRecord::explicit(key("2020Q3"), 25, date(2020, 7, 1), date(2020, 9, 30)),
            QuarterRecord::inferred(key("2020Q4"), 25),
        ];
        infer_dates(&mut quarters);

        assert_eq!(quarters[1].start(), Some(date(2020, 10, 1)));
        assert_eq!(quarters[1].end(), None);
    }

    #[test]
    fn test_first_quarter_keeps_start_unset() {
        let mut quarters = vec![
            QuarterRecord::inferred(key("2020Q1"), 20),
            QuarterRecord::explicit(key("2020Q2"), 30, date(2020, 4, 1), date(2020, 6, 30)),
        ];
        infer_dates(&mut quarters);

        assert_eq!(quarters[0].start(), None);
        assert_eq!(quarters[0].end(), Some(date(2020, 3, 31)));
    }

    #[test]
    fn test_lone_inferred_quarter_stays_undated() {
        let mut quarters = vec![QuarterRecord::inferred(key("2020Q4"), 25)];
        infer_dates(&mut quarters);
        assert_eq!(quarters[0].provenance, Provenance::InferredValue);
    }

    #[test]
    fn test_explicit_dates_untouched() {
        let original = vec![
            QuarterRecord::explicit(key("2020Q1"), 20, date(2020, 1, 1), date(2020, 3, 31)),
            QuarterRecord::explicit(key("2020Q2"), 30, date(2020, 4, 5), date(2020, 6, 30)),
        ];
        let mut quarters = original.clone();
        infer_dates(&mut quarters);
        assert_eq!(quarters, original);
    }
}

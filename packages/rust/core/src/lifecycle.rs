//! Entry time and lifetime of each unit, in simulation months.
//!
//! Every date is reduced to a [`YearMonth`] with the same half-month rounding
//! before any subtraction, so scenario start, commercial date and shutdown
//! date are all treated alike.

use chrono::NaiveDate;
use tracing::{debug, instrument};

use cyclusgen_fleet::YearMonth;
use cyclusgen_shared::{FleetUnit, Lifecycle, ReactorRecord};

/// Lifetime assumed for units with no known shutdown date (60 years).
pub const DEFAULT_ASSUMED_LIFETIME: i32 = 720;

/// `12 * (y1 - y0) + (m1 - m0)`.
pub fn month_delta(y0: i32, m0: i32, y1: i32, m1: i32) -> i32 {
    12 * (y1 - y0) + (m1 - m0)
}

/// Months from `from` to `to` (negative when `to` is earlier).
pub fn months_between(from: YearMonth, to: YearMonth) -> i32 {
    month_delta(from.year, from.month as i32, to.year, to.month as i32)
}

/// Derives [`Lifecycle`]s relative to one scenario start.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleCalculator {
    start: YearMonth,
    assumed_lifetime: i32,
}

impl LifecycleCalculator {
    pub fn new(start: NaiveDate, assumed_lifetime: i32) -> Self {
        Self {
            start: YearMonth::from_date(start),
            assumed_lifetime,
        }
    }

    /// The scenario start month.
    pub fn start(&self) -> YearMonth {
        self.start
    }

    /// Unclamped offset from scenario start to commercial operation.
    pub fn raw_entry(&self, commercial: NaiveDate) -> i32 {
        months_between(self.start, commercial.into())
    }

    /// Operating window before any pre-scenario adjustment.
    pub fn raw_lifetime(&self, commercial: NaiveDate, shutdown: Option<NaiveDate>) -> i32 {
        match shutdown {
            Some(end) => months_between(commercial.into(), end.into()),
            None => self.assumed_lifetime,
        }
    }

    /// Entry time and lifetime for a unit.
    ///
    /// A unit that started at or before the scenario epoch enters at timestep 1
    /// and loses the months it already ran; for a known shutdown this leaves
    /// exactly the months between scenario start and shutdown.
    pub fn lifecycle(&self, commercial: NaiveDate, shutdown: Option<NaiveDate>) -> Lifecycle {
        let entry = self.raw_entry(commercial);
        let lifetime = self.raw_lifetime(commercial, shutdown);

        if entry <= 0 {
            Lifecycle {
                entry_time: 1,
                lifetime: (lifetime + entry).max(0),
            }
        } else {
            Lifecycle {
                entry_time: entry,
                lifetime,
            }
        }
    }

    /// Attach a lifecycle to every record, preserving order.
    #[instrument(skip_all, fields(start = %self.start, units = records.len()))]
    pub fn attach(&self, records: Vec<ReactorRecord>) -> Vec<FleetUnit> {
        records
            .into_iter()
            .map(|record| {
                let lifecycle = self.lifecycle(record.commercial, record.shutdown);
                if record.shutdown.is_none() {
                    debug!(unit = %record.name, assumed = self.assumed_lifetime, "no shutdown date, lifetime assumed");
                }
                if !lifecycle.is_deployed() {
                    debug!(unit = %record.name, "decommissioned before scenario start");
                }
                FleetUnit { record, lifecycle }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calc() -> LifecycleCalculator {
        LifecycleCalculator::new(ymd(2020, 1, 1), DEFAULT_ASSUMED_LIFETIME)
    }

    #[test]
    fn month_delta_is_antisymmetric() {
        let cases = [(2020, 1, 2015, 7), (1975, 2, 2025, 2), (1999, 12, 2000, 1), (2010, 5, 2010, 5)];
        for (y0, m0, y1, m1) in cases {
            assert_eq!(month_delta(y0, m0, y1, m1), -month_delta(y1, m1, y0, m0));
        }
        assert_eq!(month_delta(2020, 1, 2015, 7), -54);
    }

    #[test]
    fn reference_scenario() {
        // 2015-06-20 rounds to July 2015: 54 months before the start.
        let c = calc();
        assert_eq!(c.raw_entry(ymd(2015, 6, 20)), -54);
        assert_eq!(
            c.lifecycle(ymd(2015, 6, 20), None),
            Lifecycle {
                entry_time: 1,
                lifetime: 666
            }
        );
    }

    #[test]
    fn future_unit_keeps_its_offset() {
        let c = calc();
        let lc = c.lifecycle(ymd(2024, 3, 1), None);
        assert_eq!(lc.entry_time, 50);
        assert_eq!(lc.lifetime, 720);

        let lc = c.lifecycle(ymd(2024, 3, 1), Some(ymd(2064, 3, 1)));
        assert_eq!(lc.entry_time, 50);
        assert_eq!(lc.lifetime, 480);
    }

    #[test]
    fn unit_starting_at_epoch_enters_at_one() {
        let lc = calc().lifecycle(ymd(2020, 1, 1), None);
        assert_eq!(lc, Lifecycle { entry_time: 1, lifetime: 720 });
    }

    #[test]
    fn known_shutdown_before_start_counts_from_start() {
        // Commercial Feb 1975, shutdown Feb 2025: 61 months remain after Jan 2020.
        let lc = calc().lifecycle(ymd(1975, 2, 15), Some(ymd(2025, 2, 14)));
        assert_eq!(lc, Lifecycle { entry_time: 1, lifetime: 61 });
        assert_eq!(lc.lifetime, months_between(calc().start(), ymd(2025, 2, 14).into()));
    }

    #[test]
    fn shutdown_at_start_is_excluded() {
        let lc = calc().lifecycle(ymd(1975, 2, 15), Some(ymd(2020, 1, 1)));
        assert_eq!(lc.lifetime, 0);
        assert!(!lc.is_deployed());
    }

    #[test]
    fn long_retired_unit_clamps_to_zero() {
        let lc = calc().lifecycle(ymd(1962, 10, 10), Some(ymd(1987, 6, 30)));
        assert_eq!(lc.entry_time, 1);
        assert_eq!(lc.lifetime, 0);
    }

    #[test]
    fn ancient_unit_without_shutdown_outlives_assumption() {
        // Started 61 years before the scenario: the assumed 60 years are used up.
        let lc = calc().lifecycle(ymd(1959, 1, 1), None);
        assert_eq!(lc.lifetime, 0);
    }

    #[test]
    fn rounding_applies_to_scenario_start_too() {
        // A start on Jan 20 counts as February.
        let c = LifecycleCalculator::new(ymd(2020, 1, 20), DEFAULT_ASSUMED_LIFETIME);
        assert_eq!(c.start(), YearMonth { year: 2020, month: 2 });
        assert_eq!(c.raw_entry(ymd(2020, 3, 1)), 1);
    }

    #[test]
    fn attach_preserves_order_and_floors_entry() {
        let record = |name: &str, commercial: NaiveDate| ReactorRecord {
            country: "Belgium".into(),
            name: name.into(),
            reactor_type: "PWR".into(),
            net_capacity_mwe: 900.0,
            commercial,
            shutdown: None,
            position: None,
        };
        let units = calc().attach(vec![
            record("OLD", ymd(1980, 1, 1)),
            record("NEW", ymd(2030, 1, 1)),
        ]);
        assert_eq!(units[0].record.name, "OLD");
        assert_eq!(units[1].record.name, "NEW");
        assert!(units.iter().all(|u| u.lifecycle.entry_time >= 1));
        assert_eq!(units[1].lifecycle.entry_time, 120);
    }
}

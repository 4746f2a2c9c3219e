//! Directory queries: which playdates happen on a given calendar day.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use entities::Playdate;
use playdate_store::{DateRange, PlaydateFilter, PlaydateStore, SortOrder};

use crate::{PlaydateError, PlaydateResult, PlaydateService};

/// Longest DST gap we step over when local midnight does not exist.
const MAX_GAP_MINUTES: i64 = 180;

/// First instant of `day` in `tz`, as UTC.
///
/// When a DST transition skips local midnight, the first valid local time
/// after it is used. When midnight occurs twice, the earlier one is used.
fn local_midnight<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    (0..=MAX_GAP_MINUTES)
        .find_map(|minutes| {
            tz.from_local_datetime(&(midnight + Duration::minutes(minutes)))
                .earliest()
        })
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// The window `[day 00:00, next day 00:00)` in the caller's time zone.
///
/// The end is the next local midnight, so on DST transition days the window
/// is 23 or 25 hours long.
pub fn day_window<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> PlaydateResult<DateRange> {
    let next_day = day
        .succ_opt()
        .ok_or_else(|| PlaydateError::validation("Date is out of range"))?;
    Ok(DateRange::new(
        local_midnight(day, tz),
        local_midnight(next_day, tz),
    ))
}

/// Today's calendar date in `tz`.
pub fn today_in<Tz: TimeZone>(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

impl<S: PlaydateStore> PlaydateService<S> {
    /// Lists every playdate on `day` (local to `tz`), earliest first.
    ///
    /// An empty day is a successful, empty result.
    pub async fn list_playdates_for_day<Tz: TimeZone + Sync>(
        &self,
        day: NaiveDate,
        tz: &Tz,
    ) -> PlaydateResult<Vec<Playdate>> {
        let window = day_window(day, tz)?;
        let filter = PlaydateFilter::new()
            .with_date_range(window)
            .with_order(SortOrder::Ascending);

        let playdates = self
            .store_call("list_playdates", self.store.list_playdates(&filter))
            .await?;

        tracing::debug!(
            %day,
            start = %window.start,
            end = %window.end,
            count = playdates.len(),
            "Listed playdates for day"
        );
        Ok(playdates)
    }

    /// Lists today's playdates in `tz`.
    pub async fn list_playdates_today<Tz: TimeZone + Sync>(
        &self,
        tz: &Tz,
    ) -> PlaydateResult<Vec<Playdate>> {
        self.list_playdates_for_day(today_in(tz), tz).await
    }
}

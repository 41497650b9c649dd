//! Aggregation and derivation of the analytics series.
//!
//! Pure and synchronous: rows in, zero-filled daily series and summary out.
//! The revenue split affects only `average_rpm`; view and revenue totals are
//! always the unsplit sums.

use chrono::NaiveDate;
use creator_core::numeric::{clamp_split_percent, finite_or_zero, floor_cents};
use creator_core::range::DateRange;
use creator_core::types::{
    AggregatedDayRow, AnalyticsAggregate, ChannelIdentity, ChannelTotals, DailyCounterRow,
    SummaryMetrics,
};
use std::collections::HashMap;

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    views: u64,
    premium_views: u64,
    revenue: f64,
}

impl Counters {
    fn add(&mut self, row: &DailyCounterRow) {
        self.views = self.views.saturating_add(row.views);
        self.premium_views = self.premium_views.saturating_add(row.premium_views);
        self.revenue += finite_or_zero(row.revenue_raw);
    }
}

/// Revenue per thousand views, zero when there are no views.
pub fn rpm(revenue: f64, views: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    finite_or_zero(revenue / views as f64 * 1000.0)
}

/// Aggregate raw rows into one entry per day of `[start, end]`.
///
/// Days without rows are zero-filled, so the series always has
/// `(end - start) + 1` entries. Rows dated outside the range are ignored.
/// An inverted range (`start > end`) yields an empty series and a zero summary.
/// Monetary values and RPMs are floored to cents.
pub fn aggregate(
    rows: &[DailyCounterRow],
    split_percent: f64,
    start: NaiveDate,
    end: NaiveDate,
) -> AnalyticsAggregate {
    let range = DateRange::new(start, end);
    if !range.is_valid() {
        return AnalyticsAggregate {
            daily_data: Vec::new(),
            summary: SummaryMetrics::default(),
        };
    }

    let mut by_date: HashMap<NaiveDate, Counters> = HashMap::new();
    for row in rows.iter().filter(|row| range.contains(row.date)) {
        by_date.entry(row.date).or_default().add(row);
    }

    let daily_data: Vec<AggregatedDayRow> = range
        .days()
        .map(|date| {
            let day = by_date.get(&date).copied().unwrap_or_default();
            AggregatedDayRow {
                date,
                views: day.views,
                premium_views: day.premium_views,
                revenue: floor_cents(day.revenue),
                rpm: floor_cents(rpm(day.revenue, day.views)),
            }
        })
        .collect();

    let summary = summarize(&daily_data, split_percent);
    AnalyticsAggregate {
        daily_data,
        summary,
    }
}

/// Totals over an already aggregated series plus the split-adjusted RPM.
pub fn summarize(daily_data: &[AggregatedDayRow], split_percent: f64) -> SummaryMetrics {
    let total_views = daily_data
        .iter()
        .fold(0u64, |acc, d| acc.saturating_add(d.views));
    let total_premium_views = daily_data
        .iter()
        .fold(0u64, |acc, d| acc.saturating_add(d.premium_views));
    let total_revenue = floor_cents(daily_data.iter().map(|d| d.revenue).sum());

    let split_factor = clamp_split_percent(split_percent) / 100.0;
    let adjusted_revenue = total_revenue * split_factor;

    SummaryMetrics {
        total_views,
        total_premium_views,
        total_revenue,
        average_rpm: floor_cents(rpm(adjusted_revenue, total_views)),
    }
}

/// Per-channel totals over `[start, end]` for channels that contributed rows,
/// highest revenue first. Totals are unsplit.
pub fn channel_totals(
    rows: &[DailyCounterRow],
    channels: &[ChannelIdentity],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<ChannelTotals> {
    let range = DateRange::new(start, end);
    let mut by_channel: HashMap<&str, Counters> = HashMap::new();
    for row in rows.iter().filter(|row| range.contains(row.date)) {
        by_channel.entry(row.channel_id.as_str()).or_default().add(row);
    }

    let mut totals: Vec<ChannelTotals> = by_channel
        .into_iter()
        .map(|(channel_id, c)| {
            let display_name = channels
                .iter()
                .find(|ch| ch.channel_id == channel_id)
                .map(|ch| ch.display_name.clone())
                .unwrap_or_else(|| channel_id.to_string());
            ChannelTotals {
                channel_id: channel_id.to_string(),
                display_name,
                views: c.views,
                premium_views: c.premium_views,
                revenue: floor_cents(c.revenue),
                rpm: floor_cents(rpm(c.revenue, c.views)),
            }
        })
        .collect();

    totals.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.channel_id.cmp(&b.channel_id))
    });
    totals
}

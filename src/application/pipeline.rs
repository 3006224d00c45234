// Telemetry pipeline - pure transformation stages
//
// The whole pipeline is stateless and re-run in full on every request:
// filter to the selected date window, resample to calendar-aligned buckets
// (last value wins), then derive per-bucket consumption deltas and window
// statistics.
use crate::domain::dashboard::BatteryStats;
use crate::domain::frame::Frame;
use crate::domain::period::SamplePeriod;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Summary of one counter channel over the filtered window.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterStat {
    pub channel: String,
    /// Last valid reading minus first valid reading, missing cells at the
    /// window edges ignored.
    pub total_variation: f64,
}

/// Keep the rows whose timestamp's date component lies in the inclusive
/// `[start, end]` range, sorted by timestamp. All channels survive even
/// when no rows do; an empty result is valid.
pub fn filter_by_date(frame: &Frame, start: NaiveDate, end: NaiveDate) -> Frame {
    let keep: Vec<usize> = frame
        .timestamps
        .iter()
        .enumerate()
        .filter(|(_, ts)| {
            let date = ts.date();
            date >= start && date <= end
        })
        .map(|(i, _)| i)
        .collect();

    let mut filtered = frame.select_rows(&keep);
    filtered.sort_by_time();
    filtered
}

/// Downsample to one row per calendar-aligned bucket, keeping the last
/// observation in each bucket. The counters are cumulative instantaneous
/// readings, so averaging or summing them would be wrong. The output
/// timestamp index is gap-filled from the first to the last occupied
/// bucket; empty buckets carry `None` in every channel.
pub fn resample(frame: &Frame, period: SamplePeriod) -> Frame {
    let mut sorted = frame.clone();
    sorted.sort_by_time();

    let mut out = Frame::with_channels(sorted.channel_names().map(str::to_owned));
    let (Some(&first_ts), Some(&last_ts)) = (sorted.timestamps.first(), sorted.timestamps.last())
    else {
        return out;
    };

    let last_edge = period.bucket_start(last_ts);
    let mut edge = period.bucket_start(first_ts);
    let mut cursor = 0usize;

    loop {
        let next_edge = period.advance(edge);
        let mut last_in_bucket = None;
        while cursor < sorted.len() && sorted.timestamps[cursor] < next_edge {
            last_in_bucket = Some(cursor);
            cursor += 1;
        }

        out.timestamps.push(edge);
        for (name, column) in &sorted.channels {
            let value = last_in_bucket.and_then(|i| column[i]);
            if let Some(out_column) = out.channels.get_mut(name) {
                out_column.push(value);
            }
        }

        if edge >= last_edge {
            break;
        }
        edge = next_edge;
    }

    out
}

/// Per-bucket consumption for every counter channel of a resampled frame:
/// current bucket value minus previous bucket value. The first bucket has
/// no prior reference, so its delta is zero rather than missing. A delta
/// is missing when either endpoint is; a counter reset shows up as a
/// negative delta and passes through unclamped.
pub fn derive_deltas(
    resampled: &Frame,
    counter_prefix: &str,
) -> BTreeMap<String, Vec<Option<f64>>> {
    let mut deltas = BTreeMap::new();

    for (name, column) in &resampled.channels {
        if !name.starts_with(counter_prefix) {
            continue;
        }

        let mut delta = Vec::with_capacity(column.len());
        for (i, value) in column.iter().copied().enumerate() {
            let d = if i == 0 {
                value.map(|_| 0.0)
            } else {
                match (column[i - 1], value) {
                    (Some(previous), Some(current)) => Some(current - previous),
                    _ => None,
                }
            };
            delta.push(d);
        }
        deltas.insert(name.clone(), delta);
    }

    deltas
}

/// `total_variation` per counter channel over the filtered (pre-resample)
/// window. Channels with no valid reading produce no statistic. Assumes
/// time-sorted input, which [`filter_by_date`] guarantees.
pub fn counter_stats(filtered: &Frame, counter_prefix: &str) -> Vec<CounterStat> {
    let mut stats = Vec::new();

    for (name, column) in &filtered.channels {
        if !name.starts_with(counter_prefix) {
            continue;
        }
        let Some(first) = column.iter().copied().flatten().next() else {
            continue;
        };
        let last = column.iter().rev().copied().flatten().next().unwrap_or(first);
        stats.push(CounterStat {
            channel: name.clone(),
            total_variation: last - first,
        });
    }

    stats
}

/// Battery voltage min/max over the filtered window, ignoring missing
/// cells. `None` when the channel is absent or holds no valid reading.
pub fn battery_stats(filtered: &Frame, battery_channel: &str) -> Option<BatteryStats> {
    let column = filtered.channel(battery_channel)?;
    let mut valid = column.iter().copied().flatten();
    let first = valid.next()?;
    let (min, max) = valid.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    Some(BatteryStats { min, max })
}

/// Resolve a channel role (timestamp aside, e.g. battery) to the first
/// configured candidate name present in the frame. Column naming varies
/// across source revisions, so the candidates are configuration.
pub fn resolve_channel(frame: &Frame, candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .find(|name| frame.channels.contains_key(*name))
        .cloned()
}

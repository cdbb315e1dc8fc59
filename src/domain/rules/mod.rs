// Domain rules - Range parsing, interval planning and strategy selection

use tracing::warn;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Outcome of parsing a comma-separated range list
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRanges {
    pub remove_set: RemoveSet,
    /// Entries dropped with a warning, verbatim
    pub skipped: Vec<String>,
}

/// Lenient parser for `a-b,c-d` range lists
pub struct RangeListParser;

impl RangeListParser {
    /// Parse a range list into a normalized remove set.
    ///
    /// Malformed entries (no `-`, unparsable bounds, `start >= end`) are
    /// skipped with a warning instead of failing the whole list.
    pub fn parse(ranges: &str) -> ParsedRanges {
        let mut intervals = Vec::new();
        let mut skipped = Vec::new();

        for entry in ranges.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            match Self::parse_entry(entry) {
                Ok(interval) => intervals.push(interval),
                Err(e) => {
                    warn!("Skipping range '{}': {}", entry, e);
                    skipped.push(entry.to_string());
                }
            }
        }

        ParsedRanges {
            remove_set: RemoveSet::from_intervals(intervals),
            skipped,
        }
    }

    fn parse_entry(entry: &str) -> Result<Interval, DomainError> {
        let (start, end) = entry.split_once('-').ok_or_else(|| {
            DomainError::InvalidFormat("missing '-' between start and end".to_string())
        })?;
        let start = TimeSpec::parse(start)?;
        let end = TimeSpec::parse(end)?;
        Interval::new(start.as_seconds(), end.as_seconds())
    }
}

/// Converts remove requests into keep plans
pub struct IntervalPlanner;

impl IntervalPlanner {
    /// Compute the keep intervals of `[0, duration]` left after removing `remove_set`.
    pub fn plan(remove_set: &RemoveSet, duration: f64) -> Result<KeepPlan, DomainError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(DomainError::EmptyResult(format!(
                "source duration {} leaves nothing to keep",
                duration
            )));
        }

        let mut keep = Vec::new();
        let mut cursor = 0.0_f64;

        for remove in remove_set.intervals() {
            let gap_end = remove.start().min(duration);
            if cursor < gap_end {
                keep.push(Interval::new(cursor, gap_end)?);
            }
            cursor = cursor.max(remove.end());
        }

        if cursor < duration {
            keep.push(Interval::new(cursor, duration)?);
        }

        if keep.is_empty() {
            return Err(DomainError::EmptyResult(
                "the removed ranges cover the entire video".to_string(),
            ));
        }

        Ok(KeepPlan::new(keep, duration))
    }

    /// Regions of `[0, duration]` not covered by `plan`
    pub fn complement(plan: &KeepPlan, duration: f64) -> Vec<Interval> {
        let mut removed = Vec::new();
        let mut cursor = 0.0_f64;

        for keep in plan.intervals() {
            if cursor < keep.start() {
                if let Ok(gap) = Interval::new(cursor, keep.start()) {
                    removed.push(gap);
                }
            }
            cursor = cursor.max(keep.end());
        }

        if cursor < duration {
            if let Ok(tail) = Interval::new(cursor, duration) {
                removed.push(tail);
            }
        }

        removed
    }

    /// Merge overlapping or touching removes and clip them to `[0, duration]`
    pub fn merge(remove_set: &RemoveSet, duration: f64) -> Vec<Interval> {
        let mut merged: Vec<Interval> = Vec::new();

        for remove in remove_set.intervals() {
            if remove.start() >= duration {
                continue;
            }
            let end = remove.end().min(duration);

            match merged.last_mut() {
                Some(last) if remove.start() <= last.end() => {
                    if end > last.end() {
                        if let Ok(extended) = Interval::new(last.start(), end) {
                            *last = extended;
                        }
                    }
                }
                _ => {
                    if let Ok(interval) = Interval::new(remove.start(), end) {
                        merged.push(interval);
                    }
                }
            }
        }

        merged
    }
}

/// Resolves an edit request against a concrete source duration
pub struct EditPlanner;

impl EditPlanner {
    /// Turn an edit spec into a keep plan for a source of `duration` seconds
    pub fn resolve(spec: &EditSpec, duration: f64) -> Result<KeepPlan, DomainError> {
        match spec {
            EditSpec::RemoveSegments(remove_set) => IntervalPlanner::plan(remove_set, duration),
            EditSpec::TrimEdges { start, end } => {
                let start = start.map(|t| t.as_seconds()).unwrap_or(0.0);
                let mut end = end.map(|t| t.as_seconds()).unwrap_or(duration);

                if end > duration {
                    warn!(
                        "End time {:.2}s exceeds video duration {:.2}s, using the duration",
                        end, duration
                    );
                    end = duration;
                }

                if start >= end {
                    return Err(DomainError::EmptyResult(format!(
                        "start {:.2}s must be before end {:.2}s",
                        start, end
                    )));
                }

                Ok(KeepPlan::new(vec![Interval::new(start, end)?], duration))
            }
            EditSpec::CutHeadTail { head, tail } => {
                let keep_end = duration - tail.as_seconds();
                if keep_end <= head.as_seconds() {
                    return Err(DomainError::EmptyResult(format!(
                        "video is {:.2}s long, too short to drop {:.2}s from the head and {:.2}s from the tail",
                        duration,
                        head.as_seconds(),
                        tail.as_seconds()
                    )));
                }

                Ok(KeepPlan::new(
                    vec![Interval::new(head.as_seconds(), keep_end)?],
                    duration,
                ))
            }
        }
    }
}

/// Chooses how a keep plan is materialized
pub struct StrategySelector;

impl StrategySelector {
    /// One interval is a single cut; two or more need extract-and-concat
    pub fn select(plan: &KeepPlan) -> Result<CutStrategy, DomainError> {
        match plan.intervals() {
            [] => Err(DomainError::EmptyResult(
                "keep plan has no intervals".to_string(),
            )),
            [only] => Ok(CutStrategy::SingleCut(*only)),
            many => Ok(CutStrategy::ExtractAndConcat(many.to_vec())),
        }
    }
}

#[cfg(test)]
mod tests;

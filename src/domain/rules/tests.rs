// Unit tests for business rules

use super::*;

fn interval(start: f64, end: f64) -> Interval {
    Interval::new(start, end).unwrap()
}

fn bounds(intervals: &[Interval]) -> Vec<(f64, f64)> {
    intervals.iter().map(|i| (i.start(), i.end())).collect()
}

fn remove_set(ranges: &[(f64, f64)]) -> RemoveSet {
    RemoveSet::from_intervals(ranges.iter().map(|&(s, e)| interval(s, e)).collect())
}

#[test]
fn test_range_list_parsing() {
    let parsed = RangeListParser::parse("5:00-6:00, 1:00-2:00");
    assert!(parsed.skipped.is_empty());
    assert_eq!(
        bounds(parsed.remove_set.intervals()),
        vec![(60.0, 120.0), (300.0, 360.0)]
    );
}

#[test]
fn test_range_list_skips_malformed_entries() {
    let parsed = RangeListParser::parse("10-20,oops,30-25,40-x,50-60");
    assert_eq!(bounds(parsed.remove_set.intervals()), vec![(10.0, 20.0), (50.0, 60.0)]);
    assert_eq!(parsed.skipped, vec!["oops", "30-25", "40-x"]);
}

#[test]
fn test_range_list_all_invalid_is_empty_not_fatal() {
    let parsed = RangeListParser::parse("nonsense,20-10");
    assert!(parsed.remove_set.is_empty());
    assert_eq!(parsed.skipped.len(), 2);
}

#[test]
fn test_range_list_splits_on_first_dash() {
    // The end bound "2-3" is not a valid time, so the entry is skipped
    let parsed = RangeListParser::parse("1-2-3");
    assert!(parsed.remove_set.is_empty());
    assert_eq!(parsed.skipped, vec!["1-2-3"]);
}

#[test]
fn test_plan_empty_remove_set_keeps_everything() {
    let plan = IntervalPlanner::plan(&RemoveSet::default(), 42.5).unwrap();
    assert_eq!(bounds(plan.intervals()), vec![(0.0, 42.5)]);
    assert!(plan.is_noop());
}

#[test]
fn test_plan_full_coverage_is_empty_result() {
    let err = IntervalPlanner::plan(&remove_set(&[(0.0, 100.0)]), 100.0).unwrap_err();
    assert!(matches!(err, DomainError::EmptyResult(_)));

    let err = IntervalPlanner::plan(&remove_set(&[(0.0, 60.0), (50.0, 120.0)]), 100.0)
        .unwrap_err();
    assert!(matches!(err, DomainError::EmptyResult(_)));
}

#[test]
fn test_plan_three_segments() {
    let plan = IntervalPlanner::plan(&remove_set(&[(10.0, 20.0), (50.0, 60.0)]), 100.0).unwrap();
    assert_eq!(
        bounds(plan.intervals()),
        vec![(0.0, 10.0), (20.0, 50.0), (60.0, 100.0)]
    );
    assert_eq!(plan.kept_seconds(), 70.0);
}

#[test]
fn test_plan_remove_past_duration() {
    let plan = IntervalPlanner::plan(&remove_set(&[(5.0, 35.0)]), 30.0).unwrap();
    assert_eq!(bounds(plan.intervals()), vec![(0.0, 5.0)]);
}

#[test]
fn test_plan_remove_entirely_beyond_duration_is_clamped() {
    let plan = IntervalPlanner::plan(&remove_set(&[(40.0, 50.0)]), 30.0).unwrap();
    assert_eq!(bounds(plan.intervals()), vec![(0.0, 30.0)]);
    assert!(plan.is_noop());
}

#[test]
fn test_plan_overlapping_removes() {
    let plan = IntervalPlanner::plan(
        &remove_set(&[(10.0, 30.0), (20.0, 25.0), (28.0, 40.0)]),
        60.0,
    )
    .unwrap();
    assert_eq!(bounds(plan.intervals()), vec![(0.0, 10.0), (40.0, 60.0)]);
}

#[test]
fn test_plan_invariants_hold_for_varied_inputs() {
    let cases: Vec<(Vec<(f64, f64)>, f64)> = vec![
        (vec![(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)], 10.0),
        (vec![(0.0, 1.0), (9.0, 10.0)], 10.0),
        (vec![(2.0, 8.0), (1.0, 3.0), (7.0, 9.5)], 10.0),
        (vec![(4.0, 5.0), (4.5, 12.0)], 10.0),
        (vec![(0.5, 0.75)], 1.0),
    ];

    for (ranges, duration) in cases {
        let removes = remove_set(&ranges);
        let plan = IntervalPlanner::plan(&removes, duration).unwrap();
        let keeps = plan.intervals();

        for pair in keeps.windows(2) {
            assert!(pair[0].end() <= pair[1].start(), "sorted and disjoint: {:?}", ranges);
        }
        for keep in keeps {
            assert!(keep.length() > 0.0);
            assert!(keep.end() <= duration);
            for remove in removes.intervals() {
                assert!(!keep.overlaps(remove), "{} overlaps {}", keep, remove);
            }
        }

        // Idempotence: the complement of the keeps is the merged remove set
        let removed = IntervalPlanner::complement(&plan, duration);
        assert_eq!(
            bounds(&removed),
            bounds(&IntervalPlanner::merge(&removes, duration)),
            "{:?}",
            ranges
        );
    }
}

#[test]
fn test_merge_joins_touching_ranges() {
    let merged = IntervalPlanner::merge(&remove_set(&[(10.0, 20.0), (20.0, 30.0), (50.0, 70.0)]), 60.0);
    assert_eq!(bounds(&merged), vec![(10.0, 30.0), (50.0, 60.0)]);
}

#[test]
fn test_strategy_single_cut_iff_one_interval() {
    let single = IntervalPlanner::plan(&remove_set(&[(5.0, 35.0)]), 30.0).unwrap();
    assert_eq!(
        StrategySelector::select(&single).unwrap(),
        CutStrategy::SingleCut(interval(0.0, 5.0))
    );

    let multi = IntervalPlanner::plan(&remove_set(&[(10.0, 20.0), (50.0, 60.0)]), 100.0).unwrap();
    let strategy = StrategySelector::select(&multi).unwrap();
    assert!(matches!(strategy, CutStrategy::ExtractAndConcat(_)));
    assert_eq!(strategy.segment_count(), 3);

    let two = IntervalPlanner::plan(&remove_set(&[(10.0, 20.0)]), 100.0).unwrap();
    assert_eq!(StrategySelector::select(&two).unwrap().segment_count(), 2);
}

#[test]
fn test_strategy_rejects_empty_plan() {
    let empty = KeepPlan::new(Vec::new(), 10.0);
    assert!(matches!(
        StrategySelector::select(&empty),
        Err(DomainError::EmptyResult(_))
    ));
}

#[test]
fn test_trim_edges_full_span_is_noop() {
    let spec = EditSpec::TrimEdges {
        start: Some(TimeSpec::zero()),
        end: Some(TimeSpec::from_seconds(120.0)),
    };
    let plan = EditPlanner::resolve(&spec, 120.0).unwrap();
    assert!(plan.is_noop());
}

#[test]
fn test_trim_edges_clamps_end_to_duration() {
    let spec = EditSpec::TrimEdges {
        start: Some(TimeSpec::from_seconds(60.0)),
        end: Some(TimeSpec::from_seconds(500.0)),
    };
    let plan = EditPlanner::resolve(&spec, 300.0).unwrap();
    assert_eq!(bounds(plan.intervals()), vec![(60.0, 300.0)]);
}

#[test]
fn test_trim_edges_start_after_end_is_empty_result() {
    let spec = EditSpec::TrimEdges {
        start: Some(TimeSpec::from_seconds(400.0)),
        end: None,
    };
    assert!(matches!(
        EditPlanner::resolve(&spec, 300.0),
        Err(DomainError::EmptyResult(_))
    ));
}

#[test]
fn test_cut_head_tail() {
    let spec = EditSpec::CutHeadTail {
        head: TimeSpec::from_seconds(29.0),
        tail: TimeSpec::from_seconds(25.0),
    };
    let plan = EditPlanner::resolve(&spec, 600.0).unwrap();
    assert_eq!(bounds(plan.intervals()), vec![(29.0, 575.0)]);

    assert!(matches!(
        EditPlanner::resolve(&spec, 54.0),
        Err(DomainError::EmptyResult(_))
    ));
}

//! End-to-end tests of the edit, batch and merge flows over fake tools

mod common;

use std::fs;
use std::path::PathBuf;

use common::{container, touch, Behavior, FakeConfirm, FakeProbe, FakeTranscoder};
use segcut_cli::adapters::AppConfig;
use segcut_cli::app::container::AppContainer;
use segcut_cli::app::OutputTarget;
use segcut_cli::domain::errors::DomainError;
use segcut_cli::domain::model::*;
use segcut_cli::domain::rules::RangeListParser;

fn remove(ranges: &str) -> EditSpec {
    EditSpec::RemoveSegments(RangeListParser::parse(ranges).remove_set)
}

fn config_with(policy: OverwritePolicy) -> AppConfig {
    let mut config = AppConfig::default();
    config.output.overwrite = policy;
    config
}

#[tokio::test]
async fn test_remove_two_ranges_extracts_three_segments() {
    let dir = tempfile::tempdir().unwrap();
    let files = touch(dir.path(), &["talk.mp4"]);
    let transcoder = FakeTranscoder::new(Behavior::Succeed);
    let app = container(
        &AppConfig::default(),
        FakeProbe::new(&[("talk.mp4", 100.0)]),
        transcoder.clone(),
        FakeConfirm::new(true),
    );

    let outcome = app
        .edit_interactor()
        .edit(&files[0], &remove("10-20,50-60"), &dir.path().join("talk_processed.mp4"))
        .await
        .unwrap();

    match outcome {
        EditOutcome::Written {
            destination,
            kept_seconds,
            segments,
        } => {
            assert!(destination.exists());
            assert!((kept_seconds - 80.0).abs() < 1e-9);
            assert_eq!(segments, 3);
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    let windows: Vec<Option<TimeWindow>> = transcoder.jobs().iter().map(|j| j.window()).collect();
    assert_eq!(
        windows,
        vec![
            Some(TimeWindow { seek: 0.0, duration: 10.0 }),
            Some(TimeWindow { seek: 20.0, duration: 30.0 }),
            Some(TimeWindow { seek: 60.0, duration: 40.0 }),
            None,
        ]
    );
}

#[tokio::test]
async fn test_remove_past_end_keeps_only_the_head() {
    let dir = tempfile::tempdir().unwrap();
    let files = touch(dir.path(), &["short.mp4"]);
    let transcoder = FakeTranscoder::new(Behavior::Succeed);
    let app = container(
        &AppConfig::default(),
        FakeProbe::new(&[("short.mp4", 30.0)]),
        transcoder.clone(),
        FakeConfirm::new(true),
    );

    let outcome = app
        .edit_interactor()
        .edit(&files[0], &remove("5-35"), &dir.path().join("short_processed.mp4"))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        EditOutcome::Written { segments: 1, .. }
    ));
    let jobs = transcoder.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].window(), Some(TimeWindow { seek: 0.0, duration: 5.0 }));
}

#[tokio::test]
async fn test_trim_runs_a_single_cut() {
    let dir = tempfile::tempdir().unwrap();
    let files = touch(dir.path(), &["clip.mkv"]);
    let transcoder = FakeTranscoder::new(Behavior::Succeed);
    let app = container(
        &AppConfig::default(),
        FakeProbe::new(&[("clip.mkv", 100.0)]),
        transcoder.clone(),
        FakeConfirm::new(true),
    );

    let spec = EditSpec::TrimEdges {
        start: Some(TimeSpec::parse("0:30").unwrap()),
        end: Some(TimeSpec::parse("1:15").unwrap()),
    };
    let result = app
        .batch_interactor()
        .run_batch(&files, &spec, &OutputTarget::NextToSource)
        .await
        .unwrap();

    assert_eq!(result.success_count(), 1);
    let jobs = transcoder.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].window(), Some(TimeWindow { seek: 30.0, duration: 45.0 }));
    assert!(dir.path().join("clip_trimmed.mp4").exists());
}

#[tokio::test]
async fn test_full_length_trim_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let files = touch(dir.path(), &["clip.mp4"]);
    let transcoder = FakeTranscoder::new(Behavior::Succeed);
    let app = container(
        &AppConfig::default(),
        FakeProbe::new(&[("clip.mp4", 42.0)]),
        transcoder.clone(),
        FakeConfirm::new(true),
    );

    let spec = EditSpec::TrimEdges {
        start: None,
        end: None,
    };
    let result = app
        .batch_interactor()
        .run_batch(&files, &spec, &OutputTarget::NextToSource)
        .await
        .unwrap();

    assert_eq!(result.skipped_count(), 1);
    assert!(result.all_succeeded());
    assert!(transcoder.jobs().is_empty());
}

#[tokio::test]
async fn test_batch_isolates_per_file_failures() {
    let dir = tempfile::tempdir().unwrap();
    let files = touch(dir.path(), &["a.mp4", "b.mp4", "c.mp4"]);
    let out_dir = dir.path().join("out");
    let app = container(
        &AppConfig::default(),
        // b is shorter than the removed range, nothing would remain
        FakeProbe::new(&[("a.mp4", 100.0), ("b.mp4", 8.0), ("c.mp4", 50.0)]),
        FakeTranscoder::new(Behavior::Succeed),
        FakeConfirm::new(true),
    );

    let result = app
        .batch_interactor()
        .run_batch(&files, &remove("0-10"), &OutputTarget::Directory(out_dir.clone()))
        .await
        .unwrap();

    assert_eq!(result.total(), 3);
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.failure_count(), 1);
    assert!(!result.all_succeeded());

    match &result.files()[1] {
        (path, FileStatus::Failed { kind, .. }) => {
            assert!(path.ends_with("b.mp4"));
            assert_eq!(kind, "empty_result");
        }
        other => panic!("unexpected status {:?}", other),
    }
    assert!(out_dir.join("a.mp4").exists());
    assert!(!out_dir.join("b.mp4").exists());
    assert!(out_dir.join("c.mp4").exists());
}

#[tokio::test]
async fn test_probe_failure_is_recorded_and_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    let files = touch(dir.path(), &["broken.mp4", "good.mp4"]);
    let app = container(
        &AppConfig::default(),
        FakeProbe::new(&[("good.mp4", 60.0)]),
        FakeTranscoder::new(Behavior::Succeed),
        FakeConfirm::new(true),
    );

    let head_tail = EditSpec::CutHeadTail {
        head: TimeSpec::from_seconds(5.0),
        tail: TimeSpec::from_seconds(5.0),
    };
    let result = app
        .batch_interactor()
        .run_batch(&files, &head_tail, &OutputTarget::NextToSource)
        .await
        .unwrap();

    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.success_count(), 1);
    assert!(dir.path().join("good_cut.mp4").exists());
}

#[tokio::test]
async fn test_hardware_failure_falls_back_within_batch() {
    let dir = tempfile::tempdir().unwrap();
    let files = touch(dir.path(), &["a.mp4"]);
    let transcoder = FakeTranscoder::new(Behavior::FailHardware);
    let mut config = AppConfig::default();
    config.encoding.encoder = EncoderKind::Hardware;
    config.encoding.hw_backend = HardwareBackend::Nvenc;
    let app = container(
        &config,
        FakeProbe::new(&[("a.mp4", 30.0)]),
        transcoder.clone(),
        FakeConfirm::new(true),
    );

    let result = app
        .batch_interactor()
        .run_batch(&files, &remove("5-10"), &OutputTarget::NextToSource)
        .await
        .unwrap();

    assert_eq!(result.success_count(), 1);
    let profiles: Vec<bool> = transcoder
        .jobs()
        .iter()
        .filter(|j| j.window().is_some())
        .map(|j| j.profile().is_hardware())
        .collect();
    // The first hardware failure switches the whole plan to software
    assert_eq!(profiles, vec![true, false, false]);
}

#[tokio::test]
async fn test_never_overwrite_skips_existing_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let files = touch(dir.path(), &["a.mp4", "b.mp4"]);
    fs::write(dir.path().join("a_cut.mp4"), b"previous").unwrap();
    let transcoder = FakeTranscoder::new(Behavior::Succeed);
    let app = container(
        &config_with(OverwritePolicy::Never),
        FakeProbe::new(&[("a.mp4", 100.0), ("b.mp4", 100.0)]),
        transcoder.clone(),
        FakeConfirm::new(true),
    );

    let spec = EditSpec::CutHeadTail {
        head: TimeSpec::from_seconds(29.0),
        tail: TimeSpec::from_seconds(25.0),
    };
    let result = app
        .batch_interactor()
        .run_batch(&files, &spec, &OutputTarget::NextToSource)
        .await
        .unwrap();

    assert_eq!(result.skipped_count(), 1);
    assert_eq!(result.success_count(), 1);
    assert_eq!(fs::read(dir.path().join("a_cut.mp4")).unwrap(), b"previous");
    assert_eq!(transcoder.jobs().len(), 1);
}

#[tokio::test]
async fn test_prompt_asks_once_per_run() {
    let dir = tempfile::tempdir().unwrap();
    let files = touch(dir.path(), &["a.mp4", "b.mp4"]);
    fs::write(dir.path().join("a_cut.mp4"), b"previous").unwrap();
    fs::write(dir.path().join("b_cut.mp4"), b"previous").unwrap();
    let confirm = FakeConfirm::new(false);
    let app = container(
        &config_with(OverwritePolicy::Prompt),
        FakeProbe::new(&[("a.mp4", 100.0), ("b.mp4", 100.0)]),
        FakeTranscoder::new(Behavior::Succeed),
        confirm.clone(),
    );

    let spec = EditSpec::CutHeadTail {
        head: TimeSpec::from_seconds(1.0),
        tail: TimeSpec::from_seconds(1.0),
    };
    let result = app
        .batch_interactor()
        .run_batch(&files, &spec, &OutputTarget::NextToSource)
        .await
        .unwrap();

    assert_eq!(confirm.asked(), 1);
    assert_eq!(result.skipped_count(), 2);
}

#[tokio::test]
async fn test_missing_tool_aborts_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let files = touch(dir.path(), &["a.mp4", "b.mp4"]);
    let transcoder = FakeTranscoder::new(Behavior::Missing);
    let app = container(
        &AppConfig::default(),
        FakeProbe::new(&[("a.mp4", 100.0), ("b.mp4", 100.0)]),
        transcoder.clone(),
        FakeConfirm::new(true),
    );

    assert!(matches!(app.ensure_tools(), Err(DomainError::ToolNotFound(_))));

    let result = app
        .batch_interactor()
        .run_batch(&files, &remove("10-20"), &OutputTarget::NextToSource)
        .await;
    assert!(matches!(result, Err(DomainError::ToolNotFound(_))));
    // The second file is never attempted
    assert_eq!(transcoder.jobs().len(), 1);
}

#[tokio::test]
async fn test_cancellation_stops_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let files = touch(dir.path(), &["a.mp4", "b.mp4"]);
    let app = container(
        &AppConfig::default(),
        FakeProbe::new(&[("a.mp4", 100.0), ("b.mp4", 100.0)]),
        FakeTranscoder::new(Behavior::Cancel),
        FakeConfirm::new(true),
    );

    let result = app
        .batch_interactor()
        .run_batch(&files, &remove("10-20"), &OutputTarget::NextToSource)
        .await;
    assert!(matches!(result, Err(DomainError::Cancelled)));
    assert!(!dir.path().join("a_processed.mp4").exists());
}

#[tokio::test]
async fn test_edit_refuses_to_overwrite_its_source() {
    let dir = tempfile::tempdir().unwrap();
    let files = touch(dir.path(), &["a.mp4"]);
    let transcoder = FakeTranscoder::new(Behavior::Succeed);
    let app = container(
        &AppConfig::default(),
        FakeProbe::new(&[("a.mp4", 100.0)]),
        transcoder.clone(),
        FakeConfirm::new(true),
    );

    let result = app
        .edit_interactor()
        .edit(&files[0], &remove("10-20"), &files[0])
        .await;
    assert!(matches!(result, Err(DomainError::BadArgs(_))));
    assert!(transcoder.jobs().is_empty());
}

#[tokio::test]
async fn test_merge_concatenates_directory_contents() {
    let dir = tempfile::tempdir().unwrap();
    let files = touch(dir.path(), &["part1.mp4", "part2.mp4", "part3.mp4"]);
    let destination = dir.path().join("merged_output.mp4");
    let transcoder = FakeTranscoder::new(Behavior::Succeed);
    let app = container(
        &AppConfig::default(),
        FakeProbe::new(&[("part1.mp4", 10.0), ("part2.mp4", 20.5), ("part3.mp4", 30.0)]),
        transcoder.clone(),
        FakeConfirm::new(true),
    );

    let outcome = app
        .merge_interactor()
        .merge(&files, &destination)
        .await
        .unwrap();

    match outcome {
        EditOutcome::Written {
            kept_seconds,
            segments,
            ..
        } => {
            assert!((kept_seconds - 60.5).abs() < 1e-9);
            assert_eq!(segments, 3);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(destination.exists());
    assert_eq!(transcoder.manifests()[0].lines().count(), 3);
}

#[tokio::test]
async fn test_merge_ignores_previous_output_and_needs_two_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = touch(dir.path(), &["merged_output.mp4", "only.mp4"]);
    files.sort();
    let destination: PathBuf = dir.path().join("merged_output.mp4");
    let app = container(
        &config_with(OverwritePolicy::Always),
        FakeProbe::new(&[("only.mp4", 10.0)]),
        FakeTranscoder::new(Behavior::Succeed),
        FakeConfirm::new(true),
    );

    let result = app.merge_interactor().merge(&files, &destination).await;
    assert!(matches!(result, Err(DomainError::BadArgs(_))));
}

#[tokio::test]
async fn test_same_stem_sources_get_distinct_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = touch(dir.path(), &["a.mkv", "a.mp4"]);
    files.sort();
    let out_dir = dir.path().join("out");
    let app = container(
        &config_with(OverwritePolicy::Always),
        FakeProbe::new(&[("a.mkv", 60.0), ("a.mp4", 60.0)]),
        FakeTranscoder::new(Behavior::Succeed),
        FakeConfirm::new(true),
    );

    let result = app
        .batch_interactor()
        .run_batch(&files, &remove("0-10"), &OutputTarget::Directory(out_dir.clone()))
        .await
        .unwrap();

    assert_eq!(result.success_count(), 2);
    let destinations: Vec<PathBuf> = result
        .files()
        .iter()
        .map(|(_, status)| match status {
            FileStatus::Succeeded { destination } => destination.clone(),
            other => panic!("unexpected status {:?}", other),
        })
        .collect();
    assert_eq!(
        destinations,
        vec![out_dir.join("a.mp4"), out_dir.join("a_mp4.mp4")]
    );
    assert!(out_dir.join("a.mp4").exists());
    assert!(out_dir.join("a_mp4.mp4").exists());
}

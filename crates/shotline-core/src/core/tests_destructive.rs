//! Destructive and Edge Case Tests for the Timeline Core
//!
//! Hostile or degenerate inputs (NaN times, broken persisted data, bad drag
//! payloads) must be absorbed without panics or invalid state.

use crate::core::settings::TimelineSettings;
use crate::core::timeline::{
    drop_asset, hit_test_audio, hit_test_video, parse_asset_payload, AudioClip, ClipKey,
    InitOutcome, MoveContext, Segment, Selection, Timeline, TimelineStore, VideoClip,
    VideoClipPatch,
};
use crate::core::{clamp_time, CoreError};

fn segments() -> Vec<Segment> {
    vec![
        Segment::new("s1", "One").with_duration(3.0),
        Segment::new("s2", "Two").with_duration(4.0),
    ]
}

#[test]
fn test_destructive_nan_times() {
    let store = {
        let mut s = TimelineStore::new(TimelineSettings::default());
        s.initialize(segments(), None);
        s
    };
    assert!(hit_test_video(store.video_clips(), f64::NAN, 0.1).is_none());
    assert!(hit_test_video(store.video_clips(), f64::INFINITY, 0.1).is_none());
    assert!(hit_test_audio(&[], f64::NAN).is_none());
    assert_eq!(clamp_time(f64::NAN, 0.0, 10.0), 0.0);
    // Inverted bounds resolve to the lower bound
    assert_eq!(clamp_time(5.0, 3.0, 1.0), 3.0);
}

#[test]
fn test_destructive_drop_at_nan_inserts_at_zero() {
    let mut store = TimelineStore::new(TimelineSettings::default());
    store.initialize(segments(), None);

    let asset = parse_asset_payload(r#"{"kind":"video","id":"x","name":"X","durationSeconds":-4}"#)
        .unwrap();
    let outcome = drop_asset(&mut store, &asset, f64::NAN, 9.0).unwrap();

    let clip = store.timeline().video_clip(&outcome.clip.id).unwrap();
    assert_eq!(clip.start, 0.0);
    // Negative payload duration falls back to the default video length
    assert_eq!(clip.duration, 2.0);
    assert_eq!(store.timeline().video_clip("v-s1").unwrap().start, 2.0);
}

#[test]
fn test_destructive_persisted_garbage_is_repaired() {
    let mut broken = VideoClip::seeded(&segments()[0], 0.0, 3.0);
    broken.duration = f64::NAN;
    broken.trim_end = 99.0;
    let persisted = Timeline::new(
        vec![broken],
        vec![AudioClip {
            id: "a-1".to_string(),
            asset_id: "bgm".to_string(),
            name: String::new(),
            start: 1.0,
            duration: 2.0,
            src: None,
        }],
    );

    let mut store = TimelineStore::new(TimelineSettings::default());
    assert_eq!(
        store.initialize(segments(), Some(persisted)),
        InitOutcome::AutoArranged
    );

    let clips = store.video_clips();
    assert_eq!(clips.len(), 2);
    assert_eq!(clips[0].duration, 3.0);
    assert_eq!(clips[0].trim_end, 2.5);
    assert_eq!(clips[0].visible_len(), 0.5);
    assert_eq!(clips[1].start, 3.0);
    assert_eq!(store.audio_clips().len(), 1);
}

#[test]
fn test_destructive_unknown_ids() {
    let mut store = TimelineStore::new(TimelineSettings::default());
    store.initialize(segments(), None);

    assert!(!store.update_video_clip("nope", &VideoClipPatch::start(1.0)));
    assert!(matches!(
        store.try_update_video_clip("nope", &VideoClipPatch::start(1.0)),
        Err(CoreError::ClipNotFound(id)) if id == "nope"
    ));
    assert_eq!(store.remove_clips(&[ClipKey::audio("nope")]), 0);
    assert!(MoveContext::build(store.video_clips(), &["nope".to_string()], &[], 48.0).is_none());

    let mut selection = Selection::new();
    selection.toggle(ClipKey::video("nope"));
    selection.toggle(ClipKey::video("v-s1"));
    selection.retain_existing(store.timeline());
    assert_eq!(selection.keys(), &[ClipKey::video("v-s1")]);
}

#[test]
fn test_destructive_settings_values() {
    let mut settings = TimelineSettings {
        px_per_second: f64::NAN,
        min_clip_seconds: -1.0,
        fallback_video_seconds: 0.001,
        snap_threshold_px: f64::INFINITY,
        ..TimelineSettings::default()
    };
    settings.normalize();

    assert_eq!(settings.px_per_second, 48.0);
    assert_eq!(settings.min_clip_seconds, 0.01);
    assert!(settings.fallback_video_seconds > settings.min_clip_seconds);
    assert!(settings.snap_threshold_px.is_finite());
}

#[test]
fn test_destructive_payload_shapes() {
    for bad in [
        "",
        "null",
        "[]",
        r#"{"kind":"video"}"#,
        r#"{"kind":"VIDEO","id":"a","name":"A"}"#,
        r#"{"id":"a","name":"A"}"#,
    ] {
        assert!(
            matches!(parse_asset_payload(bad), Err(CoreError::InvalidAssetPayload(_))),
            "{bad}"
        );
    }
}

mod common;

use common::FakeApi;
use sentiment_client::bridge::{Bridge, MemoryClipboard, View};
use sentiment_client::samples;
use sentiment_client::single::SingleAnalysisController;
use std::sync::Arc;

#[test]
fn views_round_trip_through_keys() {
    for view in View::ALL {
        assert_eq!(View::from_key(view.key()), Some(view));
    }
    assert_eq!(View::from_key("settings"), None);
    assert_eq!(View::Metrics.to_string(), "Model Performance");
}

#[tokio::test]
async fn testing_a_sample_fills_input_and_switches_view() {
    let bridge = Bridge::new(View::Samples);
    let mut views = bridge.subscribe_view();
    let sample = samples::find(2).unwrap();

    bridge.test_sample(sample);

    assert_eq!(bridge.pending_text(), sample.text);
    assert_eq!(bridge.active_view(), View::Single);
    assert!(views.has_changed().unwrap());
    assert_eq!(*views.borrow_and_update(), View::Single);
}

#[tokio::test]
async fn tested_sample_is_what_single_analysis_submits() {
    let api = Arc::new(FakeApi::default());
    let bridge = Bridge::new(View::Samples);
    let mut single = SingleAnalysisController::new(api.clone(), bridge.clone());

    bridge.test_sample(samples::find(4).unwrap());
    assert_eq!(single.text(), samples::find(4).unwrap().text);
    single.submit().await;

    assert_eq!(api.sent(), vec![samples::find(4).unwrap().text.to_string()]);
}

#[test]
fn copying_a_sample_leaves_views_alone() {
    let bridge = Bridge::new(View::Samples);
    bridge.set_pending_text("draft");
    let mut clipboard = MemoryClipboard::default();
    let sample = samples::find(5).unwrap();

    bridge.copy_sample(sample, &mut clipboard).unwrap();

    assert_eq!(clipboard.contents.as_deref(), Some(sample.text));
    assert_eq!(bridge.pending_text(), "draft");
    assert_eq!(bridge.active_view(), View::Samples);
}

#[test]
fn activating_the_current_view_is_not_a_change() {
    let bridge = Bridge::default();
    let views = bridge.subscribe_view();

    bridge.activate(View::Single);
    assert!(!views.has_changed().unwrap());

    bridge.activate(View::Batch);
    assert!(views.has_changed().unwrap());
}

#[test]
fn clones_share_state() {
    let bridge = Bridge::default();
    let other = bridge.clone();

    other.set_pending_text("shared");
    other.activate(View::Metrics);

    assert_eq!(bridge.pending_text(), "shared");
    assert_eq!(bridge.active_view(), View::Metrics);
}

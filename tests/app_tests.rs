mod common;

use common::{analysis, batch_response, FakeApi};
use sentiment_client::app::{App, Command};
use sentiment_client::bridge::{Clipboard, ClipboardError, View};
use sentiment_client::config::AppConfig;
use sentiment_client::models::Sentiment;
use sentiment_client::samples;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Clone, Default)]
struct SharedClipboard(Arc<Mutex<Option<String>>>);

impl Clipboard for SharedClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        *self.0.lock().unwrap() = Some(text.to_owned());
        Ok(())
    }
}

fn app(api: &Arc<FakeApi>, export_dir: PathBuf) -> (App, SharedClipboard) {
    let cfg = AppConfig { export_dir, ..AppConfig::default() };
    let clipboard = SharedClipboard::default();
    let app = App::new(api.clone(), &cfg, Box::new(clipboard.clone()), None);
    (app, clipboard)
}

async fn run_script(app: &mut App, script: &str) -> String {
    let mut out = Vec::new();
    app.run(script.as_bytes(), &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn parses_commands() {
    assert_eq!(Command::parse("view batch"), Ok(Command::View(View::Batch)));
    assert_eq!(Command::parse("  analyze "), Ok(Command::Analyze));
    assert_eq!(Command::parse("text  two  spaces "), Ok(Command::Text("two  spaces".into())));
    assert_eq!(Command::parse("text"), Ok(Command::Text(String::new())));
    assert_eq!(Command::parse("file data/reviews.csv"), Ok(Command::File("data/reviews.csv".into())));
    assert_eq!(Command::parse("export"), Ok(Command::Export(None)));
    assert_eq!(Command::parse("export /tmp/out"), Ok(Command::Export(Some("/tmp/out".into()))));
    assert_eq!(Command::parse("test 3"), Ok(Command::Test(3)));
    assert_eq!(Command::parse("exit"), Ok(Command::Quit));
}

#[test]
fn rejects_bad_commands() {
    assert!(Command::parse("view settings").is_err());
    assert!(Command::parse("copy two").is_err());
    assert!(Command::parse("file").is_err());
    assert!(Command::parse("").is_err());
    assert!(Command::parse("dance").is_err());
}

#[tokio::test]
async fn sample_flows_into_single_analysis() {
    let api = Arc::new(FakeApi::default());
    let sample = samples::find(1).unwrap();
    api.push_single(Ok(analysis(sample.text, Sentiment::Positive, 0.93)));
    let (mut app, _) = app(&api, PathBuf::from("."));

    let output = run_script(&mut app, "view samples\ntest 1\nanalyze\nquit\n").await;

    assert_eq!(api.sent(), vec![sample.text.to_string()]);
    assert_eq!(app.bridge().active_view(), View::Single);
    assert!(output.contains("[Sample Reviews]"));
    assert!(output.contains("Loaded sample #1"));
    assert!(output.contains("Analysis Results"));
    assert!(output.contains("93.0%"));
}

#[tokio::test]
async fn copy_uses_clipboard_without_switching_view() {
    let api = Arc::new(FakeApi::default());
    let (mut app, clipboard) = app(&api, PathBuf::from("."));

    let output = run_script(&mut app, "view samples\ncopy 2\n").await;

    assert!(output.contains("Copied!"));
    assert_eq!(clipboard.0.lock().unwrap().as_deref(), Some(samples::find(2).unwrap().text));
    assert_eq!(app.bridge().active_view(), View::Samples);
    assert_eq!(app.single().text(), "");
}

#[tokio::test]
async fn metrics_view_fetches_once() {
    let api = Arc::new(FakeApi::default());
    let (mut app, _) = app(&api, PathBuf::from("."));

    let output = run_script(&mut app, "view metrics\nview single\nmetrics\n").await;

    assert_eq!(api.metrics_call_count(), 1);
    assert!(app.metrics().is_activated());
    assert!(output.contains("Model Performance Metrics"));
}

#[tokio::test]
async fn blank_analysis_shows_validation_error() {
    let api = Arc::new(FakeApi::default());
    let (mut app, _) = app(&api, PathBuf::from("."));

    let output = run_script(&mut app, "text    \nanalyze\n").await;

    assert!(api.sent().is_empty());
    assert!(output.contains("Error: Please enter some text to analyze"));
}

#[tokio::test]
async fn batch_upload_and_export() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("reviews.csv");
    std::fs::write(&csv_path, "text\nGreat staff\nLong wait\nIt was fine\n").unwrap();
    let txt_path = dir.path().join("notes.txt");
    std::fs::write(&txt_path, "hello").unwrap();

    let api = Arc::new(FakeApi::default());
    api.push_batch(Ok(batch_response(&["Great staff", "Long wait", "It was fine"])));
    let (mut app, _) = app(&api, dir.path().to_path_buf());

    let script = format!(
        "export\nfile {}\nfile {}\nupload\nexport\n",
        txt_path.display(),
        csv_path.display()
    );
    let output = run_script(&mut app, &script).await;

    assert!(output.contains("Nothing to export yet"));
    assert!(output.contains("Error: Please select a CSV file"));
    assert!(output.contains("Results from 3 reviews"));
    assert!(output.contains("Saved "));
    assert_eq!(api.upload_count(), 1);

    let exported: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .map_or(false, |n| n.to_string_lossy().starts_with("sentiment_analysis_results_"))
        })
        .collect();
    assert_eq!(exported.len(), 1);
    assert_eq!(std::fs::read_to_string(&exported[0]).unwrap().lines().count(), 4);
}

#[tokio::test]
async fn missing_file_is_reported_and_session_continues() {
    let api = Arc::new(FakeApi::default());
    let (mut app, _) = app(&api, PathBuf::from("."));

    let output = run_script(&mut app, "file /definitely/not/here.csv\nhealth\n").await;

    assert!(output.contains("Error: io error:"));
    assert!(output.contains("Service: healthy"));
}

//! Interactive shell: one tab per view, all sharing a single [`Bridge`].

use crate::batch::BatchAnalysisController;
use crate::bridge::{Bridge, Clipboard, View};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::gateway::SentimentApi;
use crate::metrics::ClientMetrics;
use crate::model_metrics::MetricsViewer;
use crate::models::BatchFile;
use crate::render;
use crate::samples;
use crate::single::SingleAnalysisController;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

pub const HELP: &str = "\
Commands:
  view <single|batch|metrics|samples>  switch view
  text <review>                        set the single-analysis input
  analyze                              analyze the current input
  file <path>                          choose a CSV file for batch analysis
  upload                               analyze the chosen file
  export [dir]                         save batch results as CSV
  samples                              list sample reviews
  test <id>                            load a sample into single analysis
  copy <id>                            copy a sample to the clipboard
  metrics                              show model performance
  health                               check the service
  help                                 show this help
  quit                                 leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    View(View),
    Text(String),
    Analyze,
    File(PathBuf),
    Upload,
    Export(Option<PathBuf>),
    Samples,
    Test(u32),
    Copy(u32),
    Metrics,
    Health,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let sample_id = |arg: &str| -> Result<u32, String> {
            arg.parse().map_err(|_| format!("expected a sample id, got '{arg}'"))
        };
        match word {
            "view" => View::from_key(rest)
                .map(Command::View)
                .ok_or_else(|| format!("unknown view '{rest}'")),
            // Inner whitespace is kept; blank checks happen in the controller.
            "text" => Ok(Command::Text(
                line.strip_prefix("text").unwrap_or_default().trim_start_matches(' ').to_string(),
            )),
            "analyze" => Ok(Command::Analyze),
            "file" if !rest.is_empty() => Ok(Command::File(PathBuf::from(rest))),
            "file" => Err("usage: file <path>".into()),
            "upload" => Ok(Command::Upload),
            "export" if rest.is_empty() => Ok(Command::Export(None)),
            "export" => Ok(Command::Export(Some(PathBuf::from(rest)))),
            "samples" => Ok(Command::Samples),
            "test" => sample_id(rest).map(Command::Test),
            "copy" => sample_id(rest).map(Command::Copy),
            "metrics" => Ok(Command::Metrics),
            "health" => Ok(Command::Health),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            "" => Err("type 'help' for commands".into()),
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub message: Option<String>,
    pub quit: bool,
}

impl Outcome {
    fn say(message: impl Into<String>) -> Self {
        Self { message: Some(message.into()), quit: false }
    }
}

pub struct App {
    api: Arc<dyn SentimentApi>,
    bridge: Bridge,
    single: SingleAnalysisController,
    batch: BatchAnalysisController,
    metrics: MetricsViewer,
    clipboard: Box<dyn Clipboard>,
    export_dir: PathBuf,
    hint: String,
}

impl App {
    pub fn new(
        api: Arc<dyn SentimentApi>,
        cfg: &AppConfig,
        clipboard: Box<dyn Clipboard>,
        client_metrics: Option<ClientMetrics>,
    ) -> Self {
        let bridge = Bridge::new(View::Single);
        let mut single = SingleAnalysisController::new(Arc::clone(&api), bridge.clone());
        let mut batch = BatchAnalysisController::new(
            Arc::clone(&api),
            cfg.progress.clone(),
            cfg.failed_run_policy,
        );
        if let Some(m) = client_metrics {
            single = single.with_metrics(m.clone());
            batch = batch.with_metrics(m);
        }
        let metrics = MetricsViewer::new(Arc::clone(&api));
        Self {
            api,
            bridge,
            single,
            batch,
            metrics,
            clipboard,
            export_dir: cfg.export_dir.clone(),
            hint: render::service_hint(&cfg.api_base_url),
        }
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn single(&self) -> &SingleAnalysisController {
        &self.single
    }

    pub fn batch(&self) -> &BatchAnalysisController {
        &self.batch
    }

    pub fn metrics(&self) -> &MetricsViewer {
        &self.metrics
    }

    pub async fn handle(&mut self, command: Command) -> Result<Outcome, AppError> {
        debug!(?command, "shell command");
        let outcome = match command {
            Command::View(view) => {
                self.bridge.activate(view);
                Outcome::default()
            }
            Command::Text(text) => {
                self.single.edit(text);
                self.bridge.activate(View::Single);
                Outcome::default()
            }
            Command::Analyze => {
                self.bridge.activate(View::Single);
                self.single.submit().await;
                Outcome::default()
            }
            Command::File(path) => {
                let file = BatchFile::from_path(&path).await?;
                self.bridge.activate(View::Batch);
                if self.batch.select_file(file) {
                    Outcome::say(format!("Selected {}", path.display()))
                } else {
                    Outcome::default()
                }
            }
            Command::Upload => {
                self.bridge.activate(View::Batch);
                self.batch.submit().await;
                Outcome::default()
            }
            Command::Export(dir) => {
                let dir = dir.unwrap_or_else(|| self.export_dir.clone());
                match self.batch.export_to(&dir).await? {
                    Some(path) => Outcome::say(format!("Saved {}", path.display())),
                    None => Outcome::say("Nothing to export yet; run a batch analysis first."),
                }
            }
            Command::Samples => {
                self.bridge.activate(View::Samples);
                Outcome::default()
            }
            Command::Test(id) => match samples::find(id) {
                Some(sample) => {
                    self.bridge.test_sample(sample);
                    Outcome::say(format!("Loaded sample #{id}; type 'analyze' to run it."))
                }
                None => Outcome::say(format!("No sample with id {id}")),
            },
            Command::Copy(id) => match samples::find(id) {
                Some(sample) => {
                    self.bridge.copy_sample(sample, self.clipboard.as_mut())?;
                    Outcome::say("Copied!")
                }
                None => Outcome::say(format!("No sample with id {id}")),
            },
            Command::Metrics => {
                self.bridge.activate(View::Metrics);
                Outcome::default()
            }
            Command::Health => match self.api.health().await {
                Ok(health) => Outcome::say(render::render_health(&health)),
                Err(e) => Outcome::say(format!("Error: {e}\n{}", self.hint)),
            },
            Command::Help => Outcome::say(HELP),
            Command::Quit => Outcome { message: None, quit: true },
        };

        if self.bridge.active_view() == View::Metrics && !self.metrics.is_activated() {
            self.metrics.activate().await;
        }
        Ok(outcome)
    }

    /// The tab strip and the active view.
    pub fn render(&self) -> String {
        let view = self.bridge.active_view();
        let body = match view {
            View::Single => {
                let text = self.single.text();
                let input = if text.is_empty() { "(empty)".to_string() } else { text };
                format!("Input: {input}\n{}", render::render_single(&self.single.state(), &self.hint))
            }
            View::Batch => render::render_batch(&self.batch.state(), self.batch.progress(), &self.hint),
            View::Metrics => render::render_metrics(&self.metrics.state(), &self.hint),
            View::Samples => render::render_samples(),
        };
        format!("{}\n\n{}", render::render_tabs(view), body)
    }

    /// Reads commands line by line until `quit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> Result<(), AppError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        output.write_all(format!("{}\n> ", self.render()).as_bytes()).await?;
        output.flush().await?;

        while let Some(line) = lines.next_line().await? {
            let mut text = String::new();
            match Command::parse(&line) {
                Err(message) => text.push_str(&message),
                Ok(command) => match self.handle(command).await {
                    Ok(Outcome { quit: true, .. }) => break,
                    Ok(Outcome { message, .. }) => {
                        if let Some(message) = message {
                            text.push_str(&message);
                            text.push_str("\n\n");
                        }
                        text.push_str(&self.render());
                    }
                    Err(e) => text.push_str(&format!("Error: {e}")),
                },
            }
            output.write_all(format!("{text}\n> ").as_bytes()).await?;
            output.flush().await?;
        }
        output.write_all(b"\n").await?;
        output.flush().await?;
        Ok(())
    }
}

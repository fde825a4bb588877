use clap::{Parser, Subcommand};
use prometheus::{Encoder, Registry, TextEncoder};
use sentiment_client::app::App;
use sentiment_client::batch::{BatchAnalysisController, BatchPhase};
use sentiment_client::bridge::{Bridge, Clipboard, MemoryClipboard, SystemClipboard, View};
use sentiment_client::config::{load_config, AppConfig};
use sentiment_client::csv_codec::{column_help, find_text_column};
use sentiment_client::errors::AppError;
use sentiment_client::gateway::{HttpGateway, SentimentApi};
use sentiment_client::logger;
use sentiment_client::metrics::ClientMetrics;
use sentiment_client::model_metrics::{MetricsState, MetricsViewer};
use sentiment_client::models::BatchFile;
use sentiment_client::progress::TaskGuard;
use sentiment_client::render;
use sentiment_client::samples;
use sentiment_client::single::SingleAnalysisController;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "sentiment-client", version)]
#[command(about = "Analyze healthcare review sentiment with a remote model")]
struct Cli {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the sentiment service
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print client request counters to stderr on exit
    #[arg(long, global = true)]
    dump_metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single review
    Analyze {
        #[arg(conflicts_with = "sample", required_unless_present = "sample")]
        text: Option<String>,
        /// Analyze one of the built-in sample reviews
        #[arg(short, long)]
        sample: Option<u32>,
    },
    /// Analyze every review in a CSV file
    Batch {
        file: PathBuf,
        /// Directory to write the results CSV into
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// Show model performance metrics
    Metrics,
    /// Check that the service is up
    Health,
    /// List the built-in sample reviews
    Samples,
    /// Report which column of a CSV file the service will read
    CheckCsv { file: PathBuf },
    /// Interactive session with all views
    Shell,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, AppError> {
    let cli = Cli::parse();
    let quiet = matches!(cli.command, Commands::Shell);
    logger::init_logging(if quiet { "warn" } else { "info" });

    let cfg = load_config(cli.config.as_deref(), &cli.api_url)?;
    let registry = Registry::new();
    let client_metrics = ClientMetrics::new(&registry)?;
    let gateway = HttpGateway::from_config(&cfg)?.with_metrics(client_metrics.clone());
    info!(api = gateway.base_url(), "sentiment client ready");
    let api: Arc<dyn SentimentApi> = Arc::new(gateway);
    let hint = render::service_hint(&cfg.api_base_url);

    let code = match cli.command {
        Commands::Analyze { text, sample } => {
            analyze(Arc::clone(&api), client_metrics, text, sample, &hint).await?
        }
        Commands::Batch { file, export } => {
            batch(Arc::clone(&api), &cfg, client_metrics, file, export, &hint).await?
        }
        Commands::Metrics => {
            let mut viewer = MetricsViewer::new(Arc::clone(&api));
            viewer.activate().await;
            let state = viewer.state().clone();
            print!("{}", render::render_metrics(&state, &hint));
            exit_code(matches!(state, MetricsState::Loaded(_)))
        }
        Commands::Health => match api.health().await {
            Ok(health) => {
                print!("{}", render::render_health(&health));
                ExitCode::SUCCESS
            }
            Err(e) => {
                println!("Error: {e}\n{hint}");
                ExitCode::FAILURE
            }
        },
        Commands::Samples => {
            print!("{}", render::render_samples());
            ExitCode::SUCCESS
        }
        Commands::CheckCsv { file } => {
            let data = tokio::fs::read(&file).await?;
            match find_text_column(&data)? {
                Some(column) => {
                    println!("{}: reviews will be read from the '{column}' column", file.display());
                    ExitCode::SUCCESS
                }
                None => {
                    println!("{}: no supported column. {}", file.display(), column_help());
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Shell => {
            let mut app = App::new(Arc::clone(&api), &cfg, clipboard(), Some(client_metrics));
            let stdin = BufReader::new(tokio::io::stdin());
            app.run(stdin, tokio::io::stdout()).await?;
            ExitCode::SUCCESS
        }
    };

    if cli.dump_metrics {
        dump_metrics(&registry)?;
    }
    Ok(code)
}

async fn analyze(
    api: Arc<dyn SentimentApi>,
    client_metrics: ClientMetrics,
    text: Option<String>,
    sample: Option<u32>,
    hint: &str,
) -> Result<ExitCode, AppError> {
    let bridge = Bridge::new(View::Single);
    let mut controller = SingleAnalysisController::new(api, bridge.clone()).with_metrics(client_metrics);
    match (sample, text) {
        (Some(id), _) => {
            let sample = samples::find(id)
                .ok_or_else(|| AppError::Other(format!("no sample with id {id}")))?;
            bridge.test_sample(sample);
        }
        (None, Some(text)) => controller.edit(text),
        (None, None) => {}
    }
    controller.submit().await;
    let state = controller.state().clone();
    print!("{}", render::render_single(&state, hint));
    Ok(exit_code(state.result().is_some()))
}

async fn batch(
    api: Arc<dyn SentimentApi>,
    cfg: &AppConfig,
    client_metrics: ClientMetrics,
    path: PathBuf,
    export: Option<PathBuf>,
    hint: &str,
) -> Result<ExitCode, AppError> {
    let mut controller = BatchAnalysisController::new(api, cfg.progress.clone(), cfg.failed_run_policy)
        .with_metrics(client_metrics);
    let file = BatchFile::from_path(&path).await?;
    if !controller.select_file(file) {
        print!("{}", render::render_batch(&controller.state(), controller.progress(), hint));
        return Ok(ExitCode::FAILURE);
    }

    let mut progress = controller.subscribe_progress();
    let printer = TaskGuard::spawn(async move {
        while progress.changed().await.is_ok() {
            let percent = progress.borrow_and_update().percent;
            eprint!("\rProcessing... {percent:>3}%");
        }
    });
    controller.submit().await;
    drop(printer);
    eprintln!();

    let state = controller.state().clone();
    print!("{}", render::render_batch(&state, controller.progress(), hint));
    if state.phase != BatchPhase::Completed {
        return Ok(ExitCode::FAILURE);
    }
    if let Some(dir) = export {
        if let Some(saved) = controller.export_to(&dir).await? {
            println!("Saved {}", saved.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn clipboard() -> Box<dyn Clipboard> {
    match SystemClipboard::new() {
        Ok(clipboard) => Box::new(clipboard),
        Err(e) => {
            warn!(error = %e, "system clipboard unavailable, copies stay in memory");
            Box::new(MemoryClipboard::default())
        }
    }
}

fn dump_metrics(registry: &Registry) -> Result<(), AppError> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    std::io::stderr().write_all(&buffer)?;
    Ok(())
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

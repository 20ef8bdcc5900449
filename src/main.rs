use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use sunan_radar::config::Config;
use sunan_radar::history::{HistoryRecord, HistoryStore, DEFAULT_TOP};
use sunan_radar::scoring::{InputRecord, RawInput, ScoreEngine};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_STORE: i32 = 2;
const EXIT_CONFIG: i32 = 4;

const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one self-assessment and print the diagnosis
    Analyze(AnalyzeArgs),
    /// List saved results
    History {
        /// Only rows saved under this display name
        #[arg(long)]
        name: Option<String>,

        /// Show at most this many of the newest rows
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,

        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Best effectiveness per display name
    Leaderboard {
        /// Number of entries to show
        #[arg(long, default_value_t = DEFAULT_TOP)]
        top: usize,
    },
    /// Interactive dashboard with radar chart (default if no subcommand)
    Dashboard,
    /// Create a config file interactively
    Init,
}

#[derive(Args, Debug, Default)]
struct AnalyzeArgs {
    /// JSON file with the nine input keys ('-' reads stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Hours online per day (0-16)
    #[arg(long, allow_negative_numbers = true)]
    daily_hours: Option<f64>,

    /// Share of online time spent producing (0-1)
    #[arg(long, allow_negative_numbers = true)]
    production_ratio: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    completed_projects: Option<i64>,

    /// Self-rated quality of finished work (1-5)
    #[arg(long, allow_negative_numbers = true)]
    quality_score: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    original_posts: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    replies: Option<i64>,

    /// Emotional stability (0-10)
    #[arg(long, allow_negative_numbers = true)]
    emotional_stability: Option<i64>,

    /// Alignment of tasks with a larger goal (0-10)
    #[arg(long, allow_negative_numbers = true)]
    task_alignment: Option<i64>,

    /// Work is done as part of a team
    #[arg(long)]
    team: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Show the intermediate values behind each score
    #[arg(long)]
    explain: bool,

    /// Append the result to the history store
    #[arg(long)]
    save: bool,

    /// Display name for --save (overrides the config)
    #[arg(long)]
    name: Option<String>,
}

#[derive(Parser, Debug)]
#[command(name = "sunan-radar")]
#[command(about = "Self-assessment radar: effectiveness, immunity and cohesion", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/sunan-radar/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+); an
    // already installed provider is fine
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    sunan_radar::logging::init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Dashboard);
    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init = command {
        if let Err(e) = sunan_radar::config::init::run_init_wizard(config_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config = match sunan_radar::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate the whole config at startup
    if let Err(errors) = sunan_radar::config::validate_config(&config) {
        std::process::exit(report_config_errors(errors));
    }

    tracing::debug!(
        "history backend {:?}, validation {:?}",
        config.history.backend,
        config.validation
    );

    let code = match command {
        Commands::Analyze(args) => run_analyze(&config, args).await,
        Commands::History { name, limit, tsv } => run_history(&config, name, limit, tsv).await,
        Commands::Leaderboard { top } => run_leaderboard(&config, top).await,
        Commands::Dashboard => run_dashboard(&config).await,
        Commands::Init => EXIT_SUCCESS,
    };

    std::process::exit(code);
}

fn open_store(config: &Config) -> Result<HistoryStore, i32> {
    HistoryStore::from_config(&config.history).map_err(|e| {
        eprintln!("Config error: {:#}", e);
        EXIT_CONFIG
    })
}

fn build_engine(config: &Config) -> Result<ScoreEngine, i32> {
    ScoreEngine::new(config.effective_scoring()).map_err(report_config_errors)
}

fn report_config_errors(errors: Vec<String>) -> i32 {
    eprintln!("Config errors:");
    for error in errors {
        eprintln!("  - {}", error);
    }
    EXIT_CONFIG
}

/// `--name` wins over the configured display name; either must be a valid row cell.
fn resolve_save_name(flag: Option<&str>, config: &Config) -> Result<String, String> {
    let name = flag
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| config.display_name())
        .ok_or("No display name: pass --name or set display_name in the config.")?;
    sunan_radar::history::check_display_name(name)
        .map_err(|e| format!("Invalid display name: {}", e))?;
    Ok(name.to_string())
}

/// Merge the optional input file with the field flags. Flags win; without a
/// file, unset fields take the dashboard's starting values.
fn build_raw_input(args: &AnalyzeArgs) -> anyhow::Result<RawInput> {
    let mut value = match &args.input {
        Some(path) => {
            let text = if path.as_os_str() == "-" {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read input from stdin")?;
                buf
            } else {
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read input file {}", path.display()))?
            };
            serde_json::from_str::<serde_json::Value>(&text).context("Input is not valid JSON")?
        }
        None => serde_json::to_value(RawInput::default())?,
    };

    let map = value
        .as_object_mut()
        .context("Input must be a JSON object with the nine input keys")?;

    let overrides = [
        ("daily_hours", args.daily_hours.map(serde_json::Value::from)),
        ("production_ratio", args.production_ratio.map(serde_json::Value::from)),
        ("completed_projects", args.completed_projects.map(serde_json::Value::from)),
        ("quality_score", args.quality_score.map(serde_json::Value::from)),
        ("original_posts", args.original_posts.map(serde_json::Value::from)),
        ("replies", args.replies.map(serde_json::Value::from)),
        ("emotional_stability", args.emotional_stability.map(serde_json::Value::from)),
        ("task_alignment", args.task_alignment.map(serde_json::Value::from)),
        ("is_team", args.team.then_some(serde_json::Value::Bool(true))),
    ];
    for (key, override_value) in overrides {
        if let Some(v) = override_value {
            map.insert(key.to_string(), v);
        }
    }

    Ok(RawInput::from_json_value(value)?)
}

async fn run_analyze(config: &Config, args: AnalyzeArgs) -> i32 {
    // Resolve the save target before scoring so a bad setup fails early
    let save_target = if args.save {
        let name = match resolve_save_name(args.name.as_deref(), config) {
            Ok(name) => name,
            Err(msg) => {
                eprintln!("{}", msg);
                return EXIT_INPUT;
            }
        };
        match open_store(config) {
            Ok(store) => Some((name, store)),
            Err(code) => return code,
        }
    } else {
        None
    };

    let raw = match build_raw_input(&args) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            return EXIT_INPUT;
        }
    };
    let input = match InputRecord::from_raw(&raw, config.validation) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Input error: {}", e);
            return EXIT_INPUT;
        }
    };

    let engine = match build_engine(config) {
        Ok(engine) => engine,
        Err(code) => return code,
    };
    let result = engine.compute(&input);
    let breakdown = args.explain.then(|| engine.explain(&input));

    if args.json {
        match sunan_radar::output::format_result_json(&result, breakdown.as_ref()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to render JSON: {}", e);
                return EXIT_INPUT;
            }
        }
    } else {
        let use_colors = sunan_radar::output::should_use_colors();
        println!(
            "{}",
            sunan_radar::output::format_result(&result, engine.config().threshold, use_colors)
        );
        if let Some(ref breakdown) = breakdown {
            println!();
            println!("Breakdown:");
            println!("{}", sunan_radar::output::format_breakdown(breakdown));
        }
    }

    // The result is already printed; a failed save only changes the exit code
    if let Some((name, store)) = save_target {
        let record = HistoryRecord::now(&name, &result);
        if let Err(e) = store.append(record).await {
            eprintln!("Could not save result: {}", e);
            return EXIT_STORE;
        }
        if !args.json {
            eprintln!("Saved to {}", store.describe());
        }
    }

    EXIT_SUCCESS
}

async fn load_records(config: &Config) -> Result<Vec<HistoryRecord>, i32> {
    let store = open_store(config)?;
    store.load().await.map_err(|e| {
        eprintln!("Could not load history from {}: {}", store.describe(), e);
        EXIT_STORE
    })
}

async fn run_history(config: &Config, name: Option<String>, limit: usize, tsv: bool) -> i32 {
    let mut records = match load_records(config).await {
        Ok(records) => records,
        Err(code) => return code,
    };

    if let Some(ref name) = name {
        records.retain(|r| &r.display_name == name);
    }
    if records.len() > limit {
        records.drain(..records.len() - limit);
    }

    if tsv {
        let out = sunan_radar::output::format_tsv(&records);
        if !out.is_empty() {
            println!("{}", out);
        }
    } else {
        let now = chrono::Local::now().naive_local();
        let use_colors = sunan_radar::output::should_use_colors();
        println!(
            "{}",
            sunan_radar::output::format_history_table(&records, now, use_colors)
        );
    }

    EXIT_SUCCESS
}

async fn run_leaderboard(config: &Config, top: usize) -> i32 {
    let records = match load_records(config).await {
        Ok(records) => records,
        Err(code) => return code,
    };

    let entries = sunan_radar::history::leaderboard(&records, top);
    let use_colors = sunan_radar::output::should_use_colors();
    println!(
        "{}",
        sunan_radar::output::format_leaderboard(&entries, use_colors)
    );

    EXIT_SUCCESS
}

async fn run_dashboard(config: &Config) -> i32 {
    let store = match open_store(config) {
        Ok(store) => store,
        Err(code) => return code,
    };

    let colors = sunan_radar::tui::resolve_theme(config.theme);
    let app = match sunan_radar::tui::App::new(config, store.describe(), colors) {
        Ok(app) => app,
        Err(errors) => return report_config_errors(errors),
    };

    if let Err(e) = sunan_radar::tui::run_tui(app, store).await {
        eprintln!("Dashboard error: {:#}", e);
        return EXIT_INPUT;
    }

    EXIT_SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_analyze_flags() {
        let cli = Cli::parse_from([
            "sunan-radar",
            "analyze",
            "--daily-hours",
            "2",
            "--quality-score",
            "-1",
            "--team",
            "--json",
        ]);
        match cli.command {
            Some(Commands::Analyze(args)) => {
                assert_eq!(args.daily_hours, Some(2.0));
                assert_eq!(args.quality_score, Some(-1));
                assert!(args.team);
                assert!(args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_save_name_resolution() {
        let config = Config {
            display_name: Some("amina".to_string()),
            ..Config::default()
        };
        assert_eq!(resolve_save_name(None, &config).unwrap(), "amina");
        assert_eq!(resolve_save_name(Some(" yusuf "), &config).unwrap(), "yusuf");
        assert_eq!(resolve_save_name(Some("  "), &config).unwrap(), "amina");

        let err = resolve_save_name(Some("ami\tna"), &config).unwrap_err();
        assert!(err.starts_with("Invalid display name"));
        assert!(resolve_save_name(None, &Config::default()).is_err());
    }

    #[test]
    fn test_leaderboard_default_top() {
        let cli = Cli::parse_from(["sunan-radar", "leaderboard"]);
        assert!(matches!(cli.command, Some(Commands::Leaderboard { top: 3 })));
    }

    #[test]
    fn test_flags_without_file_start_from_defaults() {
        let args = AnalyzeArgs {
            daily_hours: Some(2.0),
            team: true,
            ..AnalyzeArgs::default()
        };
        let raw = build_raw_input(&args).unwrap();
        assert_eq!(raw.daily_hours, 2.0);
        assert!(raw.is_team);
        assert_eq!(raw.quality_score, RawInput::default().quality_score);
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        std::fs::write(
            &path,
            r#"{"daily_hours": 2, "production_ratio": 0.8, "completed_projects": 2,
                "quality_score": 4, "original_posts": 8, "replies": 2,
                "emotional_stability": 7, "task_alignment": 8, "is_team": true,
                "note": "ignored"}"#,
        )
        .unwrap();
        let args = AnalyzeArgs {
            input: Some(path),
            replies: Some(20),
            ..AnalyzeArgs::default()
        };
        let raw = build_raw_input(&args).unwrap();
        assert_eq!(raw.production_ratio, 0.8);
        assert_eq!(raw.replies, 20);
        assert!(raw.is_team);
    }

    #[test]
    fn test_incomplete_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        std::fs::write(&path, r#"{"daily_hours": 2}"#).unwrap();
        let args = AnalyzeArgs {
            input: Some(path),
            ..AnalyzeArgs::default()
        };
        assert!(build_raw_input(&args).is_err());
    }
}

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, Config, HistoryBackend, HistoryConfig};
use crate::scoring::ScoringConfig;

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Keep asking until the answer parses as a number inside `range`.
fn prompt_number(
    message: &str,
    default: f64,
    range: std::ops::RangeInclusive<f64>,
) -> Result<f64> {
    loop {
        let input = prompt_with_default(message, &default.to_string())?;
        match input.parse::<f64>() {
            Ok(v) if range.contains(&v) => return Ok(v),
            Ok(_) => println!(
                "  Invalid: must be between {} and {}. Try again.",
                range.start(),
                range.end()
            ),
            Err(_) => println!("  Invalid: not a number. Try again."),
        }
    }
}

/// Print text with a typewriter effect, one character at a time.
fn typewriter(text: &str) {
    use std::thread;
    use std::time::Duration;
    for c in text.chars() {
        print!("{}", c);
        std::io::stdout().flush().ok();
        thread::sleep(Duration::from_millis(18));
    }
    println!();
}

fn parse_backend(input: &str) -> Option<HistoryBackend> {
    match input.trim().to_lowercase().as_str() {
        "local" => Some(HistoryBackend::Local),
        "remote" => Some(HistoryBackend::Remote),
        "disabled" | "none" | "off" => Some(HistoryBackend::Disabled),
        _ => None,
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    typewriter("Sunan Radar Configuration Wizard");
    println!("================================");
    println!();

    // 1. Display name
    typewriter("Saved results and the leaderboard are keyed by your display name.");
    let name = prompt("Display name (leave blank to be asked on save): ")?;
    let display_name = if name.is_empty() { None } else { Some(name) };

    // 2. History backend
    println!();
    typewriter("Results can be kept in a local file, appended to a remote sheet endpoint, or not saved at all.");
    let backend = loop {
        let input = prompt_with_default("History backend (local/remote/disabled)", "local")?;
        match parse_backend(&input) {
            Some(b) => break b,
            None => println!("  Invalid: choose local, remote or disabled. Try again."),
        }
    };

    let mut history = HistoryConfig {
        backend,
        ..HistoryConfig::default()
    };
    match backend {
        HistoryBackend::Local => {
            let default_file = crate::history::default_history_path();
            let path = prompt_with_default(
                "History file",
                &default_file.display().to_string(),
            )?;
            if PathBuf::from(&path) != default_file {
                history.path = Some(PathBuf::from(path));
            }
        }
        HistoryBackend::Remote => {
            let endpoint = loop {
                let url = prompt("Endpoint URL: ")?;
                if url.starts_with("http://") || url.starts_with("https://") {
                    break url;
                }
                println!("  Invalid: must start with http:// or https://. Try again.");
            };
            history.endpoint = Some(endpoint);
            typewriter("If the endpoint needs a bearer token, export it as SUNAN_RADAR_STORE_TOKEN.");
        }
        HistoryBackend::Disabled => {}
    }

    // 3. Scoring
    println!();
    let defaults = ScoringConfig::default();
    let scoring = if prompt_yes_no("Tune scoring? (n accepts defaults)", false)? {
        typewriter("The threshold is the score below which an axis counts as weak.");
        let threshold = prompt_number("Weak-axis threshold", defaults.threshold, 0.0..=100.0)?;
        typewriter("Each daily hour online costs this many effectiveness points.");
        let hour_tax = prompt_number("Hour tax", defaults.hour_tax, 0.0..=100.0)?;
        Some(ScoringConfig {
            threshold,
            hour_tax,
            ..defaults
        })
    } else {
        None
    };

    // 4. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 5. Write config
    let config = Config {
        display_name,
        scoring,
        history,
        ..Config::default()
    };

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `sunan-radar` to get started.");

    Ok(())
}

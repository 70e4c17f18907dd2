use anyhow::Result;
use clap::Args;
use journal_record_store::FileInfo;
use serde::Serialize;

use super::output::OutputFormat;
use learning_journal::LoadedConfig;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Args, Clone)]
pub struct InfoArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct InfoReport {
    version: &'static str,
    build_date: &'static str,
    git_commit: &'static str,
    config_path: String,
    config_loaded: bool,
    data_dir: String,
    site_dir: String,
    corrupt_policy: String,
    max_scores: usize,
    reflections: Option<FileInfo>,
    snake_scores: Option<FileInfo>,
}

pub async fn cmd_info(args: InfoArgs, loaded: &LoadedConfig) -> Result<()> {
    let config = &loaded.config;
    let report = InfoReport {
        version: env!("CARGO_PKG_VERSION"),
        build_date: option_env!("JOURNAL_BUILD_DATE").unwrap_or("unknown"),
        git_commit: option_env!("JOURNAL_GIT_HASH").unwrap_or("unknown"),
        config_path: loaded.path.display().to_string(),
        config_loaded: loaded.from_file,
        data_dir: config.data_dir.display().to_string(),
        site_dir: config.site_dir.display().to_string(),
        corrupt_policy: config.corrupt_policy.to_string(),
        max_scores: config.max_scores,
        reflections: config.reflection_book().file_info()?,
        snake_scores: config.leaderboard().file_info()?,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&report)?),
        OutputFormat::Human => print_human(&report),
    }
    Ok(())
}

fn print_human(report: &InfoReport) {
    println!("Learning Journal Information");
    println!("============================");
    println!("Version: {}", report.version);
    println!("Build Date: {}", report.build_date);
    println!("Git Commit: {}", report.git_commit);
    println!();

    println!("Configuration:");
    if report.config_loaded {
        println!("- Config File: {}", report.config_path);
    } else {
        println!("- Config File: (defaults; {} not found)", report.config_path);
    }
    println!("- Data Directory: {}", report.data_dir);
    println!("- Site Directory: {}", report.site_dir);
    println!("- Corrupt Files: {}", report.corrupt_policy);
    println!("- Leaderboard Size: {}", report.max_scores);

    print_collection("Reflections", report.reflections.as_ref());
    print_collection("Snake Scores", report.snake_scores.as_ref());
}

fn print_collection(title: &str, info: Option<&FileInfo>) {
    println!();
    println!("{title}:");
    let Some(info) = info else {
        println!("- (no file yet)");
        return;
    };
    println!("- File: {}", info.path.display());
    println!("- Size: {} bytes", info.size_bytes);
    match info.entries {
        Some(entries) => println!("- Entries: {entries}"),
        None => println!("- Entries: unreadable (file is corrupted)"),
    }
    println!("- Created: {}", info.created.format(TIME_FORMAT));
    println!("- Modified: {}", info.modified.format(TIME_FORMAT));
}

use std::fmt;

use services::{AppServices, Clock, WalkConfig};
use tipswalk_core::model::ProfileDraft;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod walk;

use walk::{AnswerStrategy, WalkPlan};

const DEFAULT_STEP_M: f64 = 50.0;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidStrategy { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidStrategy { raw } => {
                write!(f, "invalid --strategy value: {raw} (expected first or random)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_positive(flag: &'static str, raw: String) -> Result<f64, ArgsError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(ArgsError::InvalidNumber { flag, raw }),
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  tipswalk walk     [--db <sqlite_url>] [--unlock-distance <m>] [--step <m>]");
    eprintln!("                    [--strategy first|random]");
    eprintln!("  tipswalk profile  [--db <sqlite_url>] [--name <display name>] [--avatar <uri>]");
    eprintln!("  tipswalk trophies [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://tipswalk.sqlite3");
    eprintln!("  --unlock-distance 200");
    eprintln!("  --step 50");
    eprintln!("  --strategy first");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TIPSWALK_DB_URL, TIPSWALK_UNLOCK_DISTANCE_M, TIPSWALK_CONTENT_TIMEOUT_SECS,");
    eprintln!("  TIPSWALK_QUIZ_API_KEY, TIPSWALK_QUIZ_BASE_URL, TIPSWALK_QUIZ_MODEL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Walk,
    Profile,
    Trophies,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "walk" => Some(Self::Walk),
            "profile" => Some(Self::Profile),
            "trophies" => Some(Self::Trophies),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: Option<String>,
    unlock_distance_m: Option<f64>,
    plan: WalkPlan,
    name: Option<String>,
    avatar: Option<String>,
}

impl Args {
    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: None,
            unlock_distance_m: None,
            plan: WalkPlan {
                step_m: DEFAULT_STEP_M,
                strategy: AnswerStrategy::First,
            },
            name: None,
            avatar: None,
        };

        while let Some(arg) = args.next() {
            match (cmd, arg.as_str()) {
                (_, "--db") => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = Some(normalize_sqlite_url(value));
                }
                (Command::Walk, "--unlock-distance") => {
                    let value = require_value(args, "--unlock-distance")?;
                    parsed.unlock_distance_m = Some(parse_positive("--unlock-distance", value)?);
                }
                (Command::Walk, "--step") => {
                    let value = require_value(args, "--step")?;
                    parsed.plan.step_m = parse_positive("--step", value)?;
                }
                (Command::Walk, "--strategy") => {
                    let value = require_value(args, "--strategy")?;
                    parsed.plan.strategy = AnswerStrategy::from_arg(&value)
                        .ok_or(ArgsError::InvalidStrategy { raw: value })?;
                }
                (Command::Profile, "--name") => {
                    parsed.name = Some(require_value(args, "--name")?);
                }
                (Command::Profile, "--avatar") => {
                    parsed.avatar = Some(require_value(args, "--avatar")?);
                }
                (_, "--help" | "-h") => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let mut iter = argv.into_iter().skip(1);
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut config = WalkConfig::from_env()?;
    if let Some(db_url) = parsed.db_url {
        config.db_url = db_url;
    } else {
        config.db_url = normalize_sqlite_url(config.db_url);
    }
    if let Some(meters) = parsed.unlock_distance_m {
        config = config.with_unlock_distance(meters)?;
    }

    // sqlx will not create a missing database file.
    prepare_sqlite_file(&config.db_url)?;
    info!(db = %config.db_url, "opening storage");
    let app = AppServices::new_sqlite(config, Clock::default_clock()).await?;

    match cmd {
        Command::Walk => {
            println!(
                "Starting walk: {} m between questions",
                app.config().settings.unlock_distance_m()
            );
            let completed = walk::simulate(&app.walks(), parsed.plan).await?;
            println!(
                "Walk finished: {}/10 correct{}",
                completed.result.final_score(),
                if completed.result.perfect() { " (perfect!)" } else { "" }
            );
            if let Some(trophy) = completed.trophy {
                println!("Trophy awarded: {}", trophy.label());
            }
        }
        Command::Profile => {
            let profile_service = app.profile();
            let mut profile = profile_service.load().await?;
            if parsed.name.is_some() || parsed.avatar.is_some() {
                let current = profile.to_draft();
                profile = profile_service
                    .save(ProfileDraft {
                        display_name: parsed.name.or(current.display_name),
                        avatar_uri: parsed.avatar.or(current.avatar_uri),
                    })
                    .await?;
            }
            println!("Name:   {}", profile.display_name());
            println!("Avatar: {}", profile.avatar_uri());
        }
        Command::Trophies => {
            let trophies = app.trophies().list().await?;
            if trophies.is_empty() {
                println!("No trophies yet. A perfect walk earns the week's trophy.");
            }
            for trophy in &trophies {
                println!(
                    "{}  ({}, awarded {})",
                    trophy.label(),
                    trophy.week(),
                    trophy.awarded_at().format("%Y-%m-%d")
                );
            }

            let recent = app.storage().summaries.list_summaries(10).await?;
            if !recent.is_empty() {
                println!();
                println!("Recent walks:");
            }
            for row in recent {
                let summary = row.summary;
                println!(
                    "  {}  {}/{}",
                    summary.completed_at().format("%Y-%m-%d %H:%M"),
                    summary.correct(),
                    summary.total_rounds()
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use log::{error, info};
use substitute_planner::display::format_plan_table;
use substitute_planner::server::{self, AppState};
use substitute_planner::{Config, ReplacementRequest, Timetable, generate_plan};

const CONFIG_ENV: &str = "SUBSTITUTE_PLANNER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "substitute_planner.toml";

type BoxError = Box<dyn std::error::Error>;

fn load_config() -> Result<Config, BoxError> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if Path::new(&path).exists() {
        info!("Loading configuration from {}", path);
        Ok(Config::load(&path)?)
    } else {
        info!("No configuration at {}, using defaults", path);
        Ok(Config::default())
    }
}

fn load_timetable(config: &Config) -> Result<Timetable, BoxError> {
    let path = &config.timetable_path;
    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let timetable = if is_json {
        Timetable::from_json_str(&std::fs::read_to_string(path)?)?
    } else {
        Timetable::from_csv_path(path)?
    };
    info!(
        "Timetable has {} lessons and {} teachers",
        timetable.len(),
        timetable.teachers().len()
    );
    Ok(timetable)
}

async fn run(args: &[String]) -> Result<(), BoxError> {
    let config = load_config()?;
    let timetable = load_timetable(&config)?;

    match args.first().map(String::as_str) {
        None | Some("serve") => {
            let state = Arc::new(AppState {
                timetable,
                rules: config.rules,
            });
            server::run_server(state, &config.bind_addr).await?;
        }
        Some("plan") => {
            let day = args
                .get(1)
                .ok_or("usage: substitute_planner plan <Day> <Teacher>...")?;
            let request = ReplacementRequest {
                absent_teachers: args[2..].to_vec(),
                day: day.clone(),
            };
            let plan = generate_plan(&timetable, &request, &config.rules)?;
            print!("{}", format_plan_table(&plan));
        }
        Some(other) => return Err(format!("unknown command '{}'", other).into()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

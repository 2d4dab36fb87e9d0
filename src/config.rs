use chrono::FixedOffset;
use dotenvy::dotenv;
use eyre::{eyre, Result};
use std::{env, path::PathBuf};
use tracing::info;

use crate::reconcile::ReconcileOptions;

#[derive(Debug, Clone)]
pub struct Config {
    pub holders_api_url: String,
    pub rune_id: String,
    pub project_name: String,
    pub data_dir: PathBuf,
    pub report_path: PathBuf,
    pub page_limit: usize,
    pub utc_offset_hours: i32,
    pub include_zero_balances: bool,
    pub serve_report: bool,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            holders_api_url: "https://api.hiro.so/runes/v1/etchings".to_string(),
            rune_id: "927500:732".to_string(),
            project_name: "ZZZZZZZ".to_string(),
            data_dir: PathBuf::from("data"),
            report_path: PathBuf::from("report.json"),
            page_limit: 60,
            utc_offset_hours: 8, // reports are dated in Beijing time
            include_zero_balances: false,
            serve_report: false,
            port: 8080,
        }
    }
}

impl Config {
    /// Timezone in which observation periods and report timestamps are taken.
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| eyre!("UTC_OFFSET_HOURS out of range: {}", self.utc_offset_hours))
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            include_zero_balances: self.include_zero_balances,
        }
    }
}

pub fn load() -> Result<Config> {
    dotenv().ok(); // .env is optional

    let cfg = from_vars(|key| env::var(key).ok())?;
    info!("Loaded config: {:?}", cfg);
    Ok(cfg)
}

fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let defaults = Config::default();

    let flag = |key: &str, default: bool| match get(key) {
        Some(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        None => default,
    };

    let page_limit = match get("PAGE_LIMIT") {
        Some(v) => v
            .trim()
            .parse::<usize>()
            .map_err(|e| eyre!("PAGE_LIMIT {:?}: {}", v, e))?,
        None => defaults.page_limit,
    };
    if page_limit == 0 {
        return Err(eyre!("PAGE_LIMIT must be at least 1"));
    }

    let utc_offset_hours = match get("UTC_OFFSET_HOURS") {
        Some(v) => v
            .trim()
            .parse::<i32>()
            .map_err(|e| eyre!("UTC_OFFSET_HOURS {:?}: {}", v, e))?,
        None => defaults.utc_offset_hours,
    };

    let port = match get("PORT") {
        Some(v) => v
            .trim()
            .parse::<u16>()
            .map_err(|e| eyre!("PORT {:?}: {}", v, e))?,
        None => defaults.port,
    };

    let cfg = Config {
        holders_api_url: get("HOLDERS_API_URL").unwrap_or(defaults.holders_api_url),
        rune_id: get("RUNE_ID").unwrap_or(defaults.rune_id),
        project_name: get("PROJECT_NAME").unwrap_or(defaults.project_name),
        data_dir: get("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
        report_path: get("REPORT_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.report_path),
        page_limit,
        utc_offset_hours,
        include_zero_balances: flag("INCLUDE_ZERO_BALANCES", defaults.include_zero_balances),
        serve_report: flag("SERVE_REPORT", defaults.serve_report),
        port,
    };

    cfg.utc_offset()?;
    Ok(cfg)
}

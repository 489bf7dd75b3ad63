//! CLI command implementations for loginscope.
//!
//! Provides subcommand handlers for:
//! - `loginscope watch` — live dashboard, redrawn every poll cycle
//! - `loginscope snapshot` — one poll cycle, printed once
//! - `loginscope history` — recent predictions table
//! - `loginscope predict` — submit one login event for classification
//! - `loginscope health` — check backend, config, event log
//! - `loginscope log` — summarize the event log
//! - `loginscope config show|init|set|reset` — configuration management

use std::io::{self, BufRead, Write};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use serde_json::{Value, json};

use crate::analytics::logger::{EventLog, PredictOutcome};
use crate::analytics::reporter::{self, DayEntry, LogSummary, PanelStats};
use crate::analytics::warn;
use crate::api::{BackendClient, DashboardSource, PredictionService};
use crate::config::{self, LoginscopeConfig};
use crate::dashboard::history::HistoryRow;
use crate::dashboard::{CycleReport, DashboardView, HistoryTable, Poller, ViewSettings};
use crate::predict::{FlowState, PredictionFlow};

/// Output format for report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// ANSI: clear screen and move the cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Client for the poll loop. A cycle makes two requests back to back, so
/// each is capped at half the interval.
fn poll_client(cfg: &LoginscopeConfig) -> BackendClient {
    BackendClient::from_config(&cfg.backend).with_timeout_cap(cfg.polling.interval() / 2)
}

fn poller_for(cfg: &LoginscopeConfig) -> Poller<BackendClient> {
    let interval = cfg.polling.interval();
    let client = poll_client(cfg);
    let view = DashboardView::new(ViewSettings::from_config(cfg));
    Poller::new(client, view, interval).with_event_log(EventLog::from_config(&cfg.logging))
}

fn warn_failures(report: &CycleReport) {
    for (panel, err) in report.failures() {
        warn(&format!(
            "{} refresh failed (cycle {}): {err}",
            panel.as_str(),
            report.cycle
        ));
    }
}

// ---------------------------------------------------------------------------
// loginscope watch
// ---------------------------------------------------------------------------

/// Run the live dashboard until interrupted.
pub fn run_watch(cfg: &LoginscopeConfig) -> Result<()> {
    let mut poller = poller_for(cfg);

    poller.start(|view, report| {
        print!("{CLEAR_SCREEN}");
        println!("{}", view.render());
        let _ = io::stdout().flush();
        warn_failures(report);
    })
}

// ---------------------------------------------------------------------------
// loginscope snapshot
// ---------------------------------------------------------------------------

/// Run a single poll cycle and print the result.
pub fn run_snapshot(cfg: &LoginscopeConfig, format: OutputFormat) -> Result<()> {
    let mut poller = poller_for(cfg);
    let report = poller.run_cycle();

    if report.failures().len() == 2 {
        let (_, err) = report.failures()[0];
        bail!(
            "backend at {} is unavailable: {err}",
            cfg.backend.base_url
        );
    }

    match format {
        OutputFormat::Json => {
            let value = snapshot_json(poller.view(), &report);
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table | OutputFormat::Csv => {
            println!("{}", poller.view().render());
        }
    }
    warn_failures(&report);

    Ok(())
}

fn snapshot_json(view: &DashboardView, report: &CycleReport) -> Value {
    let aggregate = view.aggregate().map(|agg| {
        json!({
            "total_predictions": agg.summary.total_predictions,
            "anomaly_count": agg.summary.anomaly_count,
            "accuracy": agg.summary.accuracy,
            "distribution": {
                "normal": agg.distribution.normal,
                "anomaly": agg.distribution.anomaly,
            },
            "hourly": agg.hourly.to_vec(),
            "top_locations": agg.geo_top.iter().map(|(location, count)| json!({
                "location": location,
                "count": count,
            })).collect::<Vec<_>>(),
        })
    });

    json!({
        "cycle": report.cycle.0,
        "stats": aggregate,
        "history": view.history().rows().iter().map(row_json).collect::<Vec<_>>(),
        "errors": report.failures().iter().map(|(panel, err)| json!({
            "panel": panel.as_str(),
            "kind": err.kind(),
            "message": err.message(),
        })).collect::<Vec<_>>(),
    })
}

// ---------------------------------------------------------------------------
// loginscope history
// ---------------------------------------------------------------------------

/// Fetch and print the most recent predictions, newest first.
pub fn run_history(
    cfg: &LoginscopeConfig,
    format: OutputFormat,
    limit: Option<usize>,
) -> Result<()> {
    let client = BackendClient::from_config(&cfg.backend);
    let records = client
        .fetch_history()
        .context("failed to fetch prediction history")?;

    let mut table = HistoryTable::default();
    table.replace(&records, limit.unwrap_or(cfg.polling.history_rows));

    if table.is_empty() {
        println!("{}", "No predictions yet.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let rows: Vec<Value> = table.rows().iter().map(row_json).collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Csv => print!("{}", history_csv(table.rows())),
        OutputFormat::Table => {
            println!("{}", "Recent Predictions".bold().cyan());
            println!("{}", table.render(cfg.display.color).join("\n"));
        }
    }

    Ok(())
}

fn row_json(row: &HistoryRow) -> Value {
    json!({
        "timestamp": row.timestamp,
        "user_id": row.user,
        "location": row.location,
        "device_id": row.device,
        "status": row.status.label(),
    })
}

fn history_csv(rows: &[HistoryRow]) -> String {
    let mut out = String::from("timestamp,user_id,location,device_id,status\n");
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            csv_field(&row.timestamp),
            csv_field(&row.user),
            csv_field(&row.location),
            csv_field(&row.device),
            row.status.label(),
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// loginscope predict
// ---------------------------------------------------------------------------

/// Submit one login event built from `key=value` assignments, or prompt for
/// every field when `interactive` is set.
pub fn run_predict(cfg: &LoginscopeConfig, assignments: &[String], interactive: bool) -> Result<()> {
    let client = BackendClient::from_config(&cfg.backend);
    let log = EventLog::from_config(&cfg.logging);
    let color = cfg.display.color;

    let mut flow = PredictionFlow::new();
    for raw in assignments {
        flow.form_mut().apply_assignment(raw)?;
    }

    if !interactive {
        submit_and_show(&mut flow, &client, &log, color);
        return Ok(());
    }

    println!("{}", "Login Anomaly Check".bold().cyan());
    println!("{}", "=".repeat(60));
    println!("{}", flow.render(color));
    println!();

    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        if !fill_form(&mut flow, &mut input)? {
            return Ok(());
        }
        submit_and_show(&mut flow, &client, &log, color);

        loop {
            println!();
            let Some(choice) = prompt(&mut input, "(r)eset, (s)ubmit again, (q)uit")? else {
                return Ok(());
            };
            match MenuChoice::parse(&choice) {
                Some(MenuChoice::Submit) => submit_and_show(&mut flow, &client, &log, color),
                Some(MenuChoice::Quit) => return Ok(()),
                Some(MenuChoice::Reset) => {
                    flow.reset();
                    println!();
                    println!("{}", flow.render(color));
                    break;
                }
                None => println!("{}", format!("Unknown choice: {}", choice.trim()).yellow()),
            }
        }
    }
}

/// Action picked after a result is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Reset,
    Submit,
    Quit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "r" | "reset" => Some(Self::Reset),
            "s" | "submit" => Some(Self::Submit),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

fn submit_and_show(
    flow: &mut PredictionFlow,
    client: &BackendClient,
    log: &EventLog,
    color: bool,
) {
    let start = Instant::now();
    let request = flow.begin_submit();
    println!("{}", flow.render(color));

    flow.complete(client.predict(&request));
    let latency_ms = start.elapsed().as_millis() as u64;

    let (logged, error) = predict_outcome(flow.state());
    log.log_predict(logged, latency_ms, error);

    println!();
    println!("{}", flow.render(color));
}

/// Map a resolved state to the event log outcome.
fn predict_outcome(state: &FlowState) -> (PredictOutcome, Option<&str>) {
    match state {
        FlowState::Success(card) if card.is_anomaly() => (PredictOutcome::Anomaly, None),
        FlowState::Success(_) => (PredictOutcome::Normal, None),
        FlowState::Error(card) => (PredictOutcome::Error, Some(card.message.as_str())),
        FlowState::Idle { .. } | FlowState::Pending { .. } => (PredictOutcome::Error, None),
    }
}

/// Prompt for each form field, keeping the current value on empty input.
/// Returns `false` on end of input.
fn fill_form(flow: &mut PredictionFlow, input: &mut impl BufRead) -> Result<bool> {
    let fields = flow.form().fields().to_vec();
    for (key, current) in fields {
        let label = if current.is_empty() {
            key.clone()
        } else {
            format!("{key} [{current}]")
        };
        let Some(answer) = prompt(input, &label)? else {
            return Ok(false);
        };
        let answer = answer.trim();
        if !answer.is_empty() {
            flow.form_mut().set(&key, answer);
        }
    }
    Ok(true)
}

/// Print `label: ` and read one line. `None` on end of input.
fn prompt(input: &mut impl BufRead, label: &str) -> Result<Option<String>> {
    print!("  {}: ", label.bold());
    io::stdout().flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("failed to read input")?;
    if read == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

// ---------------------------------------------------------------------------
// loginscope health
// ---------------------------------------------------------------------------

/// Check backend reachability, config sources and the event log.
pub fn run_health(cfg: &LoginscopeConfig) -> Result<()> {
    println!("{}", "loginscope Health Check".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();

    // 1. Backend
    let client = BackendClient::from_config(&cfg.backend);
    let backend_ok = client.is_healthy();
    let backend_detail = if backend_ok {
        format!("healthy at {}", client.base_url())
    } else {
        format!("not reachable at {}", client.base_url())
    };
    print_health_item("Backend", backend_ok, &backend_detail);

    // 2. Config files
    let global = config::global_config_file();
    let global_ok = global.as_ref().is_some_and(|p| p.exists());
    print_health_item(
        "Global config",
        global_ok,
        &match &global {
            Some(p) if global_ok => p.display().to_string(),
            _ => "using defaults".to_string(),
        },
    );
    let project_ok = config::project_config_file().is_some_and(|p| p.exists());
    print_health_item(
        "Project config",
        project_ok,
        if project_ok { ".loginscope.toml" } else { "not found" },
    );

    // 3. Polling
    print_health_item(
        "Poll interval",
        true,
        &format!("{} ms", cfg.polling.interval().as_millis()),
    );

    // 4. Event log
    let log = EventLog::from_config(&cfg.logging);
    match log.path() {
        Some(path) if path.exists() => print_health_item(
            "Event log",
            true,
            &format!("{} events", format_number(log.read_all().len())),
        ),
        Some(_) => print_health_item("Event log", true, "no events yet"),
        None => print_health_item("Event log", false, "disabled"),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// loginscope log
// ---------------------------------------------------------------------------

/// Summarize the structured event log.
pub fn run_log(cfg: &LoginscopeConfig, format: OutputFormat) -> Result<()> {
    let log = EventLog::from_config(&cfg.logging);
    let summary = reporter::compute_summary(&log);

    if summary.is_empty() {
        println!(
            "{}",
            "No events yet. Run `loginscope watch` or `loginscope predict` first.".yellow()
        );
        return Ok(());
    }

    let days = reporter::compute_daily(&log);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&log_json(&summary, &days))?)
        }
        OutputFormat::Csv => print!("{}", daily_csv(&days)),
        OutputFormat::Table => print_log_table(&summary, &days),
    }

    Ok(())
}

fn print_log_table(summary: &LogSummary, days: &[DayEntry]) {
    println!("{}", "loginscope Event Log".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    println!("{}", "Polling".bold().cyan());
    println!(
        "  {:<10} {:>8} {:>8} {:>8} {:>9} {:>10}",
        "Panel", "Applied", "Stale", "Failed", "Fail %", "Avg ms"
    );
    println!("  {}", "-".repeat(58));
    for (name, stats) in [("stats", &summary.stats), ("history", &summary.history)] {
        println!("{}", panel_line(name, stats));
    }
    println!();

    let p = &summary.predictions;
    println!("{}", "Predictions".bold().cyan());
    println!(
        "  Normal: {}  Anomaly: {}  Errors: {}",
        format_number(p.normal),
        format_number(p.anomaly),
        format_number(p.errors),
    );
    println!();

    if let Some(last) = &summary.last_failure {
        println!("{}", "Last Failure".bold().cyan());
        println!("  {} {} {}", last.timestamp.dimmed(), last.source.bold(), last.message);
        println!();
    }

    println!("{}", "Daily Activity".bold().cyan());
    println!(
        "  {:<12} {:>8} {:>10} {:>12} {:>10}",
        "Date", "Polls", "Failures", "Predictions", "Anomalies"
    );
    println!("  {}", "-".repeat(56));
    for (i, day) in days.iter().enumerate() {
        let line = format!(
            "  {:<12} {:>8} {:>10} {:>12} {:>10}",
            day.date, day.polls, day.poll_failures, day.predictions, day.anomalies
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn panel_line(name: &str, stats: &PanelStats) -> String {
    format!(
        "  {:<10} {:>8} {:>8} {:>8} {:>8.1}% {:>10}",
        name,
        stats.applied,
        stats.stale,
        stats.failed,
        stats.failure_pct(),
        stats.avg_latency_ms(),
    )
}

fn log_json(summary: &LogSummary, days: &[DayEntry]) -> Value {
    let panel = |stats: &PanelStats| {
        json!({
            "applied": stats.applied,
            "stale": stats.stale,
            "failed": stats.failed,
            "failure_pct": stats.failure_pct(),
            "avg_latency_ms": stats.avg_latency_ms(),
        })
    };

    json!({
        "polling": {
            "stats": panel(&summary.stats),
            "history": panel(&summary.history),
        },
        "predictions": {
            "normal": summary.predictions.normal,
            "anomaly": summary.predictions.anomaly,
            "errors": summary.predictions.errors,
        },
        "last_failure": summary.last_failure.as_ref().map(|f| json!({
            "timestamp": f.timestamp,
            "source": f.source,
            "message": f.message,
        })),
        "daily": days.iter().map(|d| json!({
            "date": d.date,
            "polls": d.polls,
            "poll_failures": d.poll_failures,
            "predictions": d.predictions,
            "anomalies": d.anomalies,
        })).collect::<Vec<_>>(),
    })
}

fn daily_csv(days: &[DayEntry]) -> String {
    let mut out = String::from("date,polls,poll_failures,predictions,anomalies\n");
    for d in days {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            d.date, d.polls, d.poll_failures, d.predictions, d.anomalies
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// loginscope config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective loginscope Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file().is_some_and(|p| p.exists());
    let project_exists = config::project_config_file().is_some_and(|p| p.exists());
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.loginscope/config.toml", global_exists);
    print_source(".loginscope.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "LOGINSCOPE_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.loginscope/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Edit the file to point loginscope at your backend.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Quote a CSV field when it contains a separator, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::reporter::summarize;
    use crate::api::{FetchError, StatsSnapshot};
    use crate::dashboard::history::Status;
    use crate::dashboard::{CycleId, PanelOutcome};
    use crate::predict::{ErrorCard, ResultCard};

    fn row(user: &str, status: Status) -> HistoryRow {
        HistoryRow {
            timestamp: "2025-06-15 14:30:00".to_string(),
            user: user.to_string(),
            location: "Lima, Peru".to_string(),
            device: "D1".to_string(),
            status,
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_csv_field() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }

    #[test]
    fn test_menu_choice_parsing() {
        assert_eq!(MenuChoice::parse("r\n"), Some(MenuChoice::Reset));
        assert_eq!(MenuChoice::parse("reset"), Some(MenuChoice::Reset));
        assert_eq!(MenuChoice::parse("S"), Some(MenuChoice::Submit));
        assert_eq!(MenuChoice::parse(" submit "), Some(MenuChoice::Submit));
        assert_eq!(MenuChoice::parse("Q"), Some(MenuChoice::Quit));
        assert_eq!(MenuChoice::parse("sbumit"), None);
        assert_eq!(MenuChoice::parse(""), None);
    }

    #[test]
    fn test_poll_client_fits_two_requests_in_interval() {
        let mut cfg = LoginscopeConfig::default();
        cfg.backend.timeout_ms = 60_000;
        cfg.polling.interval_ms = 30_000;
        assert_eq!(
            poll_client(&cfg).timeout(),
            std::time::Duration::from_millis(15_000)
        );

        cfg.backend.timeout_ms = 2_000;
        assert_eq!(
            poll_client(&cfg).timeout(),
            std::time::Duration::from_millis(2_000)
        );
    }

    #[test]
    fn test_history_csv() {
        let csv = history_csv(&[row("U1", Status::Anomaly), row("U2", Status::Normal)]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "timestamp,user_id,location,device_id,status");
        assert_eq!(lines[1], "2025-06-15 14:30:00,U1,\"Lima, Peru\",D1,Anomaly");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_row_json() {
        let value = row_json(&row("U1", Status::Normal));
        assert_eq!(value["user_id"], "U1");
        assert_eq!(value["status"], "Normal");
    }

    #[test]
    fn test_snapshot_json_reports_errors() {
        let mut view = DashboardView::new(ViewSettings {
            color: false,
            ..ViewSettings::default()
        });
        let snapshot: StatsSnapshot = serde_json::from_value(json!({
            "total_predictions": 4,
            "anomaly_count": 1,
            "normal_count": 3,
            "accuracy": 0.75,
            "hourly_distribution": { "9": 4 },
            "geographic_distribution": { "Peru": 4 }
        }))
        .unwrap();
        view.apply_stats(CycleId(1), &snapshot);
        let report = CycleReport {
            cycle: CycleId(1),
            stats: PanelOutcome::Applied,
            history: PanelOutcome::Failed(FetchError::Transport("refused".to_string())),
        };

        let value = snapshot_json(&view, &report);
        assert_eq!(value["stats"]["hourly"][9], 4);
        assert_eq!(value["stats"]["top_locations"][0]["location"], "Peru");
        assert_eq!(value["errors"][0]["panel"], "history");
        assert_eq!(value["errors"][0]["kind"], "transport");
        assert_eq!(value["history"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_predict_outcome_mapping() {
        let card = ResultCard::from_prediction(&crate::api::Prediction {
            anomaly: true,
            probability_normal: 0.1,
            probability_anomaly: 0.9,
        });
        assert_eq!(
            predict_outcome(&FlowState::Success(card)),
            (PredictOutcome::Anomaly, None)
        );

        let error = FlowState::Error(ErrorCard {
            message: "model unavailable".to_string(),
        });
        assert_eq!(
            predict_outcome(&error),
            (PredictOutcome::Error, Some("model unavailable"))
        );
    }

    #[test]
    fn test_fill_form_keeps_defaults_on_empty_input() {
        let mut flow = PredictionFlow::new();
        let timestamp = flow.form().get("timestamp").unwrap().to_string();
        // user_id, timestamp (kept), ip_address, then EOF
        let mut input = io::Cursor::new("U77\n\n10.0.0.1\n");

        assert!(!fill_form(&mut flow, &mut input).unwrap());
        assert_eq!(flow.form().get("user_id"), Some("U77"));
        assert_eq!(flow.form().get("timestamp"), Some(timestamp.as_str()));
        assert_eq!(flow.form().get("ip_address"), Some("10.0.0.1"));
        assert_eq!(flow.form().get("geo_location"), Some(""));
    }

    #[test]
    fn test_log_json_and_csv() {
        let summary = summarize(&[]);
        let value = log_json(&summary, &[]);
        assert_eq!(value["predictions"]["errors"], 0);
        assert!(value["last_failure"].is_null());

        let days = vec![DayEntry {
            date: "2025-01-15".to_string(),
            polls: 4,
            poll_failures: 1,
            predictions: 2,
            anomalies: 1,
        }];
        assert_eq!(
            daily_csv(&days),
            "date,polls,poll_failures,predictions,anomalies\n2025-01-15,4,1,2,1\n"
        );
    }
}

use munchy_agent::{LlmClient, OllamaClient};
use munchy_core::config::{AppConfig, LoadOptions};
use munchy_db::connect_with_settings;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    command: &'static str,
    status: &'static str,
    checks: Vec<DoctorCheck>,
}

pub fn run(json: bool) -> String {
    let report = build_report();
    if json {
        return serde_json::to_string_pretty(&report)
            .unwrap_or_else(|error| format!("{{\"error\":\"{error}\"}}"));
    }

    let mut output = format!("munchy doctor: {}\n", report.status);
    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "✓",
            CheckStatus::Fail => "✗",
            CheckStatus::Skipped => "-",
        };
        output.push_str(&format!("  {marker} {:<24} {}\n", check.name, check.detail));
    }
    output
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                detail: "configuration loaded and validated".to_string(),
            });
            Some(config)
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                detail: error.to_string(),
            });
            None
        }
    };

    match config {
        Some(config) => run_async_checks(&config, &mut checks),
        None => {
            checks.push(DoctorCheck {
                name: "database_connectivity",
                status: CheckStatus::Skipped,
                detail: "skipped: configuration invalid".to_string(),
            });
            checks.push(DoctorCheck {
                name: "generator_reachability",
                status: CheckStatus::Skipped,
                detail: "skipped: configuration invalid".to_string(),
            });
        }
    }

    let status =
        if checks.iter().any(|check| check.status == CheckStatus::Fail) { "degraded" } else { "ready" };
    DoctorReport { command: "doctor", status, checks }
}

fn run_async_checks(config: &AppConfig, checks: &mut Vec<DoctorCheck>) {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            checks.push(DoctorCheck {
                name: "database_connectivity",
                status: CheckStatus::Fail,
                detail: format!("failed to initialize async runtime: {error}"),
            });
            return;
        }
    };

    runtime.block_on(async {
        match connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        {
            Ok(pool) => {
                checks.push(DoctorCheck {
                    name: "database_connectivity",
                    status: CheckStatus::Pass,
                    detail: format!("database reachable at {}", config.database.url),
                });
                pool.close().await;
            }
            Err(error) => {
                checks.push(DoctorCheck {
                    name: "database_connectivity",
                    status: CheckStatus::Fail,
                    detail: format!("connection failed: {error}"),
                });
            }
        }

        let llm = OllamaClient::new(&config.llm);
        match llm.ensure_available().await {
            Ok(()) => checks.push(DoctorCheck {
                name: "generator_reachability",
                status: CheckStatus::Pass,
                detail: format!("model `{}` available at {}", config.llm.model, config.llm.base_url),
            }),
            Err(error) => checks.push(DoctorCheck {
                name: "generator_reachability",
                status: CheckStatus::Fail,
                detail: error.to_string(),
            }),
        }
    });
}

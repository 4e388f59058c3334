use munchy_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct EffectiveConfig {
    database: DatabaseView,
    llm: LlmView,
    server: ServerView,
    chat: ChatView,
    logging: LoggingView,
}

#[derive(Debug, Serialize)]
struct DatabaseView {
    url: String,
    max_connections: u32,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct LlmView {
    base_url: String,
    model: String,
    api_key: &'static str,
    timeout_secs: u64,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
struct ServerView {
    bind_address: String,
    port: u16,
    graceful_shutdown_secs: u64,
}

#[derive(Debug, Serialize)]
struct ChatView {
    max_history: usize,
    default_session_id: String,
    support_phone: String,
}

#[derive(Debug, Serialize)]
struct LoggingView {
    level: String,
    format: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return format!("{{\"command\":\"config\",\"status\":\"error\",\"message\":\"{error}\"}}")
        }
    };

    let view = EffectiveConfig {
        database: DatabaseView {
            url: config.database.url.clone(),
            max_connections: config.database.max_connections,
            timeout_secs: config.database.timeout_secs,
        },
        llm: LlmView {
            base_url: config.llm.base_url.clone(),
            model: config.llm.model.clone(),
            api_key: if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" },
            timeout_secs: config.llm.timeout_secs,
            max_retries: config.llm.max_retries,
        },
        server: ServerView {
            bind_address: config.server.bind_address.clone(),
            port: config.server.port,
            graceful_shutdown_secs: config.server.graceful_shutdown_secs,
        },
        chat: ChatView {
            max_history: config.chat.max_history,
            default_session_id: config.chat.default_session_id.clone(),
            support_phone: config.chat.support_phone.clone(),
        },
        logging: LoggingView {
            level: config.logging.level.clone(),
            format: format!("{:?}", config.logging.format).to_lowercase(),
        },
    };

    serde_json::to_string_pretty(&view)
        .unwrap_or_else(|error| format!("{{\"error\":\"{error}\"}}"))
}

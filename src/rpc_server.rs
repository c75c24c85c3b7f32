//! linkkeeper RPC server: JSON-RPC over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"archive.category", "params":{"path":"Work > Projects"}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use linkkeeper::app::App;
use linkkeeper::logging;
use linkkeeper::rpc_handler::handle_method;
use linkkeeper::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use linkkeeper::types::settings::default_data_dir;

use serde_json::{json, Value};

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn emit(out: &mut impl Write, value: &Value) -> io::Result<()> {
    writeln!(out, "{}", value)?;
    out.flush()
}

fn main() {
    let data_dir = std::env::var("LINKKEEPER_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_data_dir());

    let mut settings = SettingsEngine::new(Some(
        data_dir.join("settings.json").to_string_lossy().to_string(),
    ));
    let level = settings
        .load()
        .map(|s| s.logging.level)
        .unwrap_or_else(|_| "info".to_string());
    logging::init(&level);

    let app = match App::new(&data_dir) {
        Ok(app) => app,
        Err(err) => {
            tracing::error!(error = %err, data_dir = %data_dir.display(), "failed to open data directory");
            std::process::exit(1);
        }
    };
    let app = Mutex::new(app);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")});
    if emit(&mut out, &ready).is_err() {
        return;
    }

    let mut rate_limiter = RateLimiter::new(200);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Err(e) => json!({"id": null, "error": format!("parse error: {}", e)}),
            Ok(req) => {
                let id = req.get("id").cloned().unwrap_or(Value::Null);
                if !rate_limiter.check() {
                    json!({"id": id, "error": "rate limit exceeded"})
                } else {
                    let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                    let params = req.get("params").cloned().unwrap_or(json!({}));
                    tracing::debug!(method, "rpc call");
                    match handle_method(&app, method, &params) {
                        Ok(val) => json!({"id": id, "result": val}),
                        Err(err) => {
                            tracing::debug!(method, error = %err, "rpc call failed");
                            json!({"id": id, "error": err})
                        }
                    }
                }
            }
        };

        if emit(&mut out, &response).is_err() {
            break;
        }
    }
}

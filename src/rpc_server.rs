//! Linkbook RPC Server: JSON-RPC over stdin/stdout for the UI process.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"link.create", "params":{"name":"...","link":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":{"kind":"...","message":"..."}}
//! Event:    {"event":"changed", "tree":{...}} after every successful mutation.
//!
//! Logs go to stderr.

use std::time::Instant;

use linkbook::app::{init_logging, App};
use linkbook::rpc_handler::handle_method;
use linkbook::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, Mutex};

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
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

/// Writes every outgoing line, responses and change events alike, in order.
async fn write_lines(mut rx: mpsc::UnboundedReceiver<Value>) {
    let mut stdout = io::stdout();
    while let Some(message) = rx.recv().await {
        let line = format!("{}\n", message);
        if let Err(e) = stdout.write_all(line.as_bytes()).await {
            tracing::error!(error = %e, "stdout closed");
            break;
        }
        let _ = stdout.flush().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings_engine = SettingsEngine::new(None);
    let log_filter = settings_engine
        .load()
        .map(|s| s.log_filter)
        .unwrap_or_else(|_| "info".to_string());
    init_logging(&log_filter);

    let app = App::new(settings_engine)?;
    app.startup().await?;

    let (tx, rx) = mpsc::unbounded_channel::<Value>();
    let writer = tokio::spawn(write_lines(rx));

    let events = tx.clone();
    app.linkbook.bind_linkbook_data_changed(move |tree| match serde_json::to_value(tree) {
        Ok(tree) => {
            let _ = events.send(json!({"event": "changed", "tree": tree}));
        }
        Err(e) => tracing::error!(error = %e, "failed to serialize change event"),
    });
    let app = Mutex::new(app);

    let _ = tx.send(json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));

    // Max 200 RPC requests per second.
    let mut rate_limiter = RateLimiter::new(200);

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let _ = tx.send(json!({"id": null, "error": {"kind": "invalidParams", "message": format!("parse error: {}", e)}}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            tracing::warn!("rate limit exceeded");
            let _ = tx.send(json!({"id": id, "error": {"kind": "rateLimited", "message": "rate limit exceeded"}}));
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&app, method, &params).await {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => {
                tracing::debug!(method, kind = err.kind, message = %err.message, "request failed");
                json!({"id": id, "error": err})
            }
        };
        let _ = tx.send(response);
    }

    drop(tx);
    drop(app);
    let _ = writer.await;
    Ok(())
}

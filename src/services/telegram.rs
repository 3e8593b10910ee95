//! Telegram notifier.
//!
//! One `sendMessage` POST per destination, no retry; each destination's
//! outcome is recorded so one dead chat never blocks the others. The known
//! recipient list grows by polling the bot inbox (`getUpdates`) for senders
//! not yet on file.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::{AnalysisResult, StopLossBreach};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Outcome of one sendMessage call.
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(token: String) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), token)
    }

    /// Custom endpoint, used by tests.
    pub fn with_base_url(base_url: String, token: String) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(Error::Config("Telegram bot token is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Send one message to every destination. Always returns one entry per
    /// destination; a failed call is recorded, never propagated.
    pub async fn send_message(&self, text: &str, chat_ids: &[String]) -> HashMap<String, Delivery> {
        let mut results = HashMap::new();
        if chat_ids.is_empty() {
            warn!("send_message called with no destinations");
            return results;
        }

        for chat_id in chat_ids {
            let delivery = match self.send_to_chat(chat_id, text).await {
                Ok(delivery) => delivery,
                Err(e) => Delivery {
                    ok: false,
                    detail: Some(e.to_string()),
                },
            };
            if !delivery.ok {
                warn!(chat_id = %chat_id, detail = ?delivery.detail, "Delivery failed");
            }
            results.insert(chat_id.clone(), delivery);
        }

        let delivered = results.values().filter(|d| d.ok).count();
        info!(delivered = delivered, total = results.len(), "Telegram send completed");
        results
    }

    async fn send_to_chat(&self, chat_id: &str, text: &str) -> Result<Delivery> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let response = self
            .client
            .post(&url)
            .form(&[("chat_id", chat_id), ("text", text), ("parse_mode", "HTML")])
            .send()
            .await?;

        let status = response.status();
        match response.json::<Value>().await {
            Ok(body) => {
                let ok = body["ok"].as_bool().unwrap_or(false);
                let detail = if ok {
                    None
                } else {
                    Some(
                        body["description"]
                            .as_str()
                            .unwrap_or("unknown provider error")
                            .to_string(),
                    )
                };
                Ok(Delivery { ok, detail })
            }
            Err(_) => Ok(Delivery {
                ok: status.is_success(),
                detail: Some(format!("HTTP {}", status)),
            }),
        }
    }

    /// Poll the bot inbox and return every sender chat id seen, deduplicated,
    /// in first-seen order.
    pub async fn poll_sender_ids(&self) -> Result<Vec<String>> {
        let url = format!("{}/bot{}/getUpdates", self.base_url, self.token);
        let body: Value = self.client.get(&url).send().await?.json().await?;

        if !body["ok"].as_bool().unwrap_or(false) {
            let detail = body["description"].as_str().unwrap_or("getUpdates failed");
            return Err(Error::Network(detail.to_string()));
        }

        Ok(extract_sender_ids(&body))
    }
}

/// Pull distinct `message.chat.id` values out of a getUpdates payload.
fn extract_sender_ids(body: &Value) -> Vec<String> {
    let mut ids = Vec::new();
    let Some(updates) = body["result"].as_array() else {
        return ids;
    };
    for update in updates {
        let chat_id = &update["message"]["chat"]["id"];
        let id = match (chat_id.as_i64(), chat_id.as_str()) {
            (Some(n), _) => n.to_string(),
            (None, Some(s)) => s.to_string(),
            _ => continue,
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Persisted set of chat ids learned from the inbox: one JSON array of
/// strings, grown by [`RecipientBook::merge`].
#[derive(Debug, Clone)]
pub struct RecipientBook {
    path: PathBuf,
}

impl RecipientBook {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Known ids; a missing or unreadable file is an empty list.
    pub fn load(&self) -> Vec<String> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Add any unseen ids, preserving existing order. Returns how many were
    /// new; the file is only rewritten when something changed.
    pub fn merge(&self, new_ids: &[String]) -> Result<usize> {
        let mut known = self.load();
        let mut added = 0;
        for id in new_ids {
            if !known.contains(id) {
                known.push(id.clone());
                added += 1;
            }
        }
        if added > 0 {
            let json = serde_json::to_string_pretty(&known)?;
            fs::write(&self.path, json)
                .map_err(|e| Error::Io(format!("Failed to write recipients: {}", e)))?;
        }
        Ok(added)
    }
}

/// Ranked top-K summary in the HTML shape Telegram renders.
pub fn format_ranked_summary(results: &[AnalysisResult], timestamp: &str) -> String {
    if results.is_empty() {
        return "<b>No ranked data available right now (provider returned no data)</b>".to_string();
    }

    let mut message = format!(
        "<b>🔥 Top {} Nifty50 Stocks 🔥</b>\n<i>{}</i>\n\n",
        results.len(),
        timestamp
    );
    for (i, r) in results.iter().enumerate() {
        let sign = if r.percent_change >= 0.0 { "+" } else { "" };
        message.push_str(&format!(
            "{}. {} {} | {}{:.2}% | ₹{:.2} | score {} | {}\n",
            i + 1,
            r.signal.emoji(),
            r.symbol,
            sign,
            r.percent_change,
            r.current_price,
            r.score,
            r.signal,
        ));
    }
    message
}

/// Stop-loss alert body listing breached positions.
pub fn format_stop_loss_alert(breaches: &[StopLossBreach], partial_sell_percent: f64) -> String {
    let mut message = "<b>⚠️ Stop-loss breached</b>\n\n".to_string();
    for b in breaches {
        message.push_str(&format!(
            "{} | entry ₹{:.2} → now ₹{:.2} | -{:.2}% | qty {}\n",
            b.symbol, b.entry_price, b.current_price, b.loss_percent, b.quantity
        ));
    }
    message.push_str(&format!(
        "\nSuggested action: sell {:.0}% of each breached position.",
        partial_sell_percent
    ));
    message
}

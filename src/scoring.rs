//! Final-score hand-off to the remote scoreboard
//!
//! Fire-and-forget: a submission is validated locally, handed to a sink,
//! and the outcome is only logged. Nothing here can stall or alter a run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::MAX_PLAYER_NAME_LEN;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("player name is empty")]
    EmptyName,
    #[error("player name longer than 50 characters")]
    NameTooLong,
    #[error("scoreboard rejected submission (HTTP {0})")]
    Rejected(u16),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unreadable reply: {0}")]
    BadReply(String),
}

/// Body of `POST /api/highscores`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    player_name: String,
    score: u64,
}

impl ScoreSubmission {
    /// Trims the name and checks it is 1..=50 characters
    pub fn new(player_name: &str, score: u64) -> Result<Self, SubmissionError> {
        let name = player_name.trim();
        if name.is_empty() {
            return Err(SubmissionError::EmptyName);
        }
        if name.chars().count() > MAX_PLAYER_NAME_LEN {
            return Err(SubmissionError::NameTooLong);
        }
        Ok(Self {
            player_name: name.to_string(),
            score,
        })
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn score(&self) -> u64 {
        self.score
    }
}

/// Stored entry echoed back by the scoreboard
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReceipt {
    pub id: String,
    pub player_name: String,
    pub score: u64,
    /// ISO 8601
    pub timestamp: String,
    #[serde(default)]
    pub rank: Option<u32>,
}

/// Reply envelope
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReply {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub data: Option<ScoreReceipt>,
}

impl SubmitReply {
    pub fn parse(json: &str) -> Result<ScoreReceipt, SubmissionError> {
        let reply: SubmitReply =
            serde_json::from_str(json).map_err(|e| SubmissionError::BadReply(e.to_string()))?;
        match reply.data {
            Some(receipt) if reply.success => Ok(receipt),
            _ => Err(SubmissionError::BadReply(reply.message)),
        }
    }
}

/// Receiver of final scores
pub trait ScoreSink {
    /// Hand off a score. Must return promptly and never fail the caller.
    fn submit(&mut self, submission: ScoreSubmission);
}

/// Posts to the scoreboard over HTTP
#[derive(Debug, Clone)]
pub struct HttpScoreSink {
    url: String,
}

impl HttpScoreSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreSink for HttpScoreSink {
    fn submit(&mut self, submission: ScoreSubmission) {
        let body = match serde_json::to_string(&submission) {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Could not encode score submission: {}", e);
                return;
            }
        };
        let url = self.url.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match post_json(&url, &body).await {
                Ok(receipt) => log::info!(
                    "Score {} submitted as {} (rank {:?})",
                    receipt.score,
                    receipt.id,
                    receipt.rank
                ),
                Err(e) => log::warn!("Score submission failed, kept locally: {}", e),
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
async fn post_json(url: &str, body: &str) -> Result<ScoreReceipt, SubmissionError> {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    let js_err = |e: JsValue| SubmissionError::Transport(format!("{:?}", e));

    let headers = web_sys::Headers::new().map_err(js_err)?;
    headers
        .set("Content-Type", "application/json")
        .map_err(js_err)?;

    let init = web_sys::RequestInit::new();
    init.set_method("POST");
    init.set_mode(web_sys::RequestMode::Cors);
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(body));

    let request = web_sys::Request::new_with_str_and_init(url, &init).map_err(js_err)?;
    let window =
        web_sys::window().ok_or_else(|| SubmissionError::Transport("no window".into()))?;

    let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(js_err)?;
    if !response.ok() {
        return Err(SubmissionError::Rejected(response.status()));
    }

    let text = JsFuture::from(response.text().map_err(js_err)?)
        .await
        .map_err(js_err)?
        .as_string()
        .unwrap_or_default();
    SubmitReply::parse(&text)
}

/// Native stub
#[cfg(not(target_arch = "wasm32"))]
impl ScoreSink for HttpScoreSink {
    fn submit(&mut self, submission: ScoreSubmission) {
        log::info!(
            "Would submit {} for {} to {}",
            submission.score(),
            submission.player_name(),
            self.url
        );
    }
}

/// Sink that keeps every submission
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub submitted: std::rc::Rc<std::cell::RefCell<Vec<ScoreSubmission>>>,
}

#[cfg(test)]
impl ScoreSink for RecordingSink {
    fn submit(&mut self, submission: ScoreSubmission) {
        self.submitted.borrow_mut().push(submission);
    }
}

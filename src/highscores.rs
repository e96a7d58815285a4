//! High score leaderboard service
//!
//! Keeps the top 10 `(name, score)` records in a [`ScoreStore`]. Storage
//! failures never reach the caller: reads fall back to a fixed joke
//! leaderboard and writes report a fallback flag with a failure message.
//! Only malformed submissions are rejected.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::persistence::ScoreStore;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Shown instead of real data when storage can't be read
const FALLBACK_SCORES: [(&str, u64); MAX_HIGH_SCORES] = [
    ("Xx_NoScope_xX", 999_999),
    ("ERROR_42", 888_888),
    ("GLITCH_MASTER", 777_777),
    ("SYSTEM_FAILURE", 666_666),
    ("NULL_POINTER", 555_555),
    ("SEGFAULT_99", 444_444),
    ("YOU_TRIED", 1_234),
    ("404_NOT_FOUND", 111_111),
    ("BUFFER_OVERFLOW", 99_999),
    ("KERNEL_PANIC", 88_888),
];

const ERROR_MESSAGES: [&str; 6] = [
    "⚠ SCORE STORAGE FAILURE. Your achievement has been spiritually recorded.",
    "❌ ERROR: The score elves are on strike!",
    "🚫 Save failed. Your score exists in an alternate dimension.",
    "💾 Disk full... just kidding, we lost your score in a wormhole.",
    "⚡ High voltage destroyed your score! Try again!",
    "🦆 Your score was eaten by a duck. Quack!",
];

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u64,
}

/// What the leaderboard looks like to a player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeaderboardView {
    /// Sorted descending, at most [`MAX_HIGH_SCORES`]
    pub scores: Vec<ScoreEntry>,
    /// Storage failed; `scores` is not (or not durably) the real leaderboard
    pub is_fallback: bool,
    pub message: Option<String>,
}

impl LeaderboardView {
    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.scores.first().map(|e| e.score)
    }

    /// 1-indexed rank of the first entry with this name and score
    pub fn rank_of(&self, name: &str, score: u64) -> Option<usize> {
        self.scores
            .iter()
            .position(|e| e.name == name && e.score == score)
            .map(|i| i + 1)
    }
}

pub fn fallback_scores() -> Vec<ScoreEntry> {
    let mut entries: Vec<ScoreEntry> = FALLBACK_SCORES
        .iter()
        .map(|&(name, score)| ScoreEntry {
            name: name.to_string(),
            score,
        })
        .collect();
    rank(&mut entries);
    entries
}

fn random_error_message() -> String {
    let i = rand::rng().random_range(0..ERROR_MESSAGES.len());
    ERROR_MESSAGES[i].to_string()
}

/// Sort descending by score (stable, so earlier entries win ties) and trim
pub fn rank(entries: &mut Vec<ScoreEntry>) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(MAX_HIGH_SCORES);
}

/// A validated score submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    /// Trimmed, non-empty
    pub name: String,
    /// Floored
    pub score: u64,
}

impl SubmitRequest {
    pub fn new(name: &str, score: f64) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !score.is_finite() || score < 0.0 {
            return Err(ValidationError::InvalidScore(score.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            score: score.floor() as u64,
        })
    }

    /// Validate a raw `{"name": .., "score": ..}` body
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let name = match body.get("name") {
            Some(Value::String(name)) => name,
            _ => return Err(ValidationError::MissingName),
        };
        let score = match body.get("score") {
            None | Some(Value::Null) => return Err(ValidationError::MissingScore),
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| ValidationError::InvalidScore(n.to_string()))?,
            Some(other) => return Err(ValidationError::InvalidScore(other.to_string())),
        };
        Self::new(name, score)
    }
}

/// Leaderboard operations over a store
#[derive(Debug)]
pub struct ScoreService<S: ScoreStore> {
    store: S,
}

impl<S: ScoreStore> ScoreService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Top scores, or the fallback board if storage can't be read
    pub fn fetch_top(&self) -> LeaderboardView {
        match self.store.load() {
            Ok(mut scores) => {
                rank(&mut scores);
                LeaderboardView {
                    scores,
                    is_fallback: false,
                    message: None,
                }
            }
            Err(e) => {
                log::warn!("Leaderboard unreadable, showing fallback ({})", e);
                LeaderboardView {
                    scores: fallback_scores(),
                    is_fallback: true,
                    message: Some(random_error_message()),
                }
            }
        }
    }

    /// Record a score. Only validation can fail; storage trouble comes back
    /// as a fallback view holding the computed top 10.
    pub fn submit(&mut self, name: &str, score: f64) -> Result<LeaderboardView, ValidationError> {
        let request = SubmitRequest::new(name, score)?;
        Ok(self.record(request))
    }

    /// Same as [`Self::submit`] for an untyped request body
    pub fn submit_json(&mut self, body: &Value) -> Result<LeaderboardView, ValidationError> {
        let request = SubmitRequest::from_json(body)?;
        Ok(self.record(request))
    }

    fn record(&mut self, request: SubmitRequest) -> LeaderboardView {
        let mut scores = self.store.load().unwrap_or_else(|e| {
            log::warn!("Leaderboard unreadable, building on fallback ({})", e);
            fallback_scores()
        });
        let SubmitRequest { name, score } = request;
        scores.push(ScoreEntry { name, score });
        rank(&mut scores);

        match self.store.save(&scores) {
            Ok(()) => {
                log::info!("Score {} recorded ({} entries)", score, scores.len());
                LeaderboardView {
                    scores,
                    is_fallback: false,
                    message: None,
                }
            }
            Err(e) => {
                log::error!("Failed to save leaderboard: {}", e);
                LeaderboardView {
                    scores,
                    is_fallback: true,
                    message: Some(random_error_message()),
                }
            }
        }
    }
}

/// Where the session sends finished scores. Fire-and-forget: results, if
/// any, are picked up later with `poll`.
pub trait ScoreSink {
    fn submit(&mut self, name: &str, score: u64);
    /// Ask for a fresh copy of the leaderboard
    fn request_top(&mut self);
    /// Latest leaderboard received since the last poll
    fn poll(&mut self) -> Option<LeaderboardView>;
}

enum Request {
    Top,
    Submit { name: String, score: u64 },
}

/// Runs a [`ScoreService`] on its own thread
pub struct ScoreClient {
    requests: Option<Sender<Request>>,
    responses: Receiver<Result<LeaderboardView, ValidationError>>,
    worker: Option<JoinHandle<()>>,
}

impl ScoreClient {
    pub fn spawn<S: ScoreStore + 'static>(mut service: ScoreService<S>) -> std::io::Result<Self> {
        let (req_tx, req_rx) = mpsc::channel::<Request>();
        let (resp_tx, resp_rx) = mpsc::channel();

        let worker = std::thread::Builder::new()
            .name("score-service".into())
            .spawn(move || {
                for request in req_rx {
                    let response = match request {
                        Request::Top => Ok(service.fetch_top()),
                        Request::Submit { name, score } => service.submit(&name, score as f64),
                    };
                    if resp_tx.send(response).is_err() {
                        break;
                    }
                }
                log::debug!("Score service worker stopped");
            })?;

        Ok(Self {
            requests: Some(req_tx),
            responses: resp_rx,
            worker: Some(worker),
        })
    }

    fn send(&self, request: Request) {
        let delivered = self
            .requests
            .as_ref()
            .is_some_and(|tx| tx.send(request).is_ok());
        if !delivered {
            log::warn!("Score service is gone, request dropped");
        }
    }

    /// Block until the next response arrives or `timeout` passes
    pub fn wait(&mut self, timeout: Duration) -> Option<LeaderboardView> {
        match self.responses.recv_timeout(timeout) {
            Ok(Ok(view)) => Some(view),
            Ok(Err(e)) => {
                log::warn!("Score rejected: {}", e);
                None
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl ScoreSink for ScoreClient {
    fn submit(&mut self, name: &str, score: u64) {
        self.send(Request::Submit {
            name: name.to_string(),
            score,
        });
    }

    fn request_top(&mut self) {
        self.send(Request::Top);
    }

    fn poll(&mut self) -> Option<LeaderboardView> {
        let mut latest = None;
        while let Ok(response) = self.responses.try_recv() {
            match response {
                Ok(view) => latest = Some(view),
                Err(e) => log::warn!("Score rejected: {}", e),
            }
        }
        latest
    }
}

impl Drop for ScoreClient {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

use crate::{Card, Event, EventBus, HandStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdviceAction {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
}

impl AdviceAction {
    pub fn label(self) -> &'static str {
        match self {
            AdviceAction::Hit => "HIT",
            AdviceAction::Stand => "STAND",
            AdviceAction::Double => "DOUBLE",
            AdviceAction::Split => "SPLIT",
            AdviceAction::Surrender => "SURRENDER",
        }
    }
}

impl fmt::Display for AdviceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidAdvice {
    #[error("confidence {0} outside 0..=100")]
    Confidence(f64),
}

/// A recommendation as returned by an advisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AdviceReply")]
pub struct AdviceResult {
    action: AdviceAction,
    confidence: u8,
    explanation: String,
}

#[derive(Deserialize)]
struct AdviceReply {
    action: AdviceAction,
    confidence: f64,
    #[serde(default)]
    explanation: String,
}

impl TryFrom<AdviceReply> for AdviceResult {
    type Error = InvalidAdvice;

    fn try_from(reply: AdviceReply) -> Result<Self, Self::Error> {
        if !reply.confidence.is_finite() || !(0.0..=100.0).contains(&reply.confidence) {
            return Err(InvalidAdvice::Confidence(reply.confidence));
        }
        Ok(Self {
            action: reply.action,
            confidence: reply.confidence.round() as u8,
            explanation: reply.explanation,
        })
    }
}

impl AdviceResult {
    pub fn new(
        action: AdviceAction,
        confidence: u8,
        explanation: impl Into<String>,
    ) -> Result<Self, InvalidAdvice> {
        if confidence > 100 {
            return Err(InvalidAdvice::Confidence(f64::from(confidence)));
        }
        Ok(Self {
            action,
            confidence,
            explanation: explanation.into(),
        })
    }

    pub fn action(&self) -> AdviceAction {
        self.action
    }

    /// Percentage, 0 to 100 inclusive.
    pub fn confidence(&self) -> u8 {
        self.confidence
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

/// The single failure kind an advisor reports. Network, auth and parse
/// problems all collapse into this; `reason` is for logs and status text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("advice unavailable: {reason}")]
pub struct AdviceUnavailable {
    reason: String,
}

impl AdviceUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<InvalidAdvice> for AdviceUnavailable {
    fn from(value: InvalidAdvice) -> Self {
        Self::new(value.to_string())
    }
}

pub type AdviceOutcome = Result<AdviceResult, AdviceUnavailable>;

/// Tags one advice request. Tokens increase monotonically per orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionToken(u64);

impl SessionToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Snapshot of the hand an advisor is asked about.
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceRequest {
    pub token: SessionToken,
    pub dealer: Card,
    pub player: Vec<Card>,
}

/// External collaborator that turns a hand into a recommendation.
///
/// `submit` must not block on the answer. The outcome is reported later,
/// tagged with `request.token`, through [`crate::Table::complete_advice`].
pub trait Advisor {
    fn submit(&mut self, request: AdviceRequest);
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AdviceSession {
    #[default]
    Idle,
    Loading {
        token: SessionToken,
    },
    Resolved(AdviceResult),
    Failed,
}

impl AdviceSession {
    pub fn is_idle(&self) -> bool {
        matches!(self, AdviceSession::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AdviceSession::Loading { .. })
    }

    pub fn result(&self) -> Option<&AdviceResult> {
        match self {
            AdviceSession::Resolved(result) => Some(result),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct AdviceOrchestrator {
    session: AdviceSession,
    last_token: u64,
}

impl AdviceOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &AdviceSession {
        &self.session
    }

    /// Submits the current hand to `advisor` unless the hand is incomplete
    /// or a request is already loading. Returns the token of the new request.
    pub fn request_advice(
        &mut self,
        hand: &HandStore,
        advisor: &mut dyn Advisor,
        events: &mut EventBus,
    ) -> Option<SessionToken> {
        if self.session.is_loading() {
            log::debug!("advice already loading, request ignored");
            return None;
        }
        let dealer = match hand.dealer() {
            Some(dealer) if hand.can_ask() => dealer,
            _ => {
                log::debug!("hand incomplete, advice request ignored");
                return None;
            }
        };
        self.last_token += 1;
        let token = SessionToken(self.last_token);
        self.session = AdviceSession::Loading { token };
        let request = AdviceRequest {
            token,
            dealer,
            player: hand.player().to_vec(),
        };
        log::info!(
            "{token}: asking advisor about dealer {} vs {}",
            request.dealer,
            format_cards(&request.player)
        );
        events.push(Event::AdviceRequested {
            token,
            dealer: request.dealer,
            player: request.player.clone(),
        });
        advisor.submit(request);
        Some(token)
    }

    /// Applies an advisor outcome if `token` is still the loading request.
    /// Returns whether the outcome was applied.
    pub fn complete(
        &mut self,
        token: SessionToken,
        outcome: AdviceOutcome,
        events: &mut EventBus,
    ) -> bool {
        if self.session != (AdviceSession::Loading { token }) {
            log::debug!("{token}: stale advice outcome discarded");
            events.push(Event::StaleAdviceDiscarded { token });
            return false;
        }
        match outcome {
            Ok(result) => {
                log::info!(
                    "{token}: advisor says {} ({}%)",
                    result.action(),
                    result.confidence()
                );
                events.push(Event::AdviceResolved {
                    token,
                    action: result.action(),
                    confidence: result.confidence(),
                });
                self.session = AdviceSession::Resolved(result);
            }
            Err(err) => {
                log::warn!("{token}: {err}");
                events.push(Event::AdviceFailed {
                    token,
                    reason: err.reason().to_string(),
                });
                self.session = AdviceSession::Failed;
            }
        }
        true
    }

    /// The hand changed: whatever the session held no longer applies.
    pub fn invalidate(&mut self, events: &mut EventBus) {
        if self.session.is_idle() {
            return;
        }
        self.session = AdviceSession::Idle;
        events.push(Event::AdviceInvalidated);
    }

    pub fn reset_session(&mut self) {
        self.session = AdviceSession::Idle;
    }
}

fn format_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| card.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

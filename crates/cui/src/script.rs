use oracle_core::{CardFace, CardParseError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptAction {
    pub action: String,
    #[serde(default)]
    pub card: Option<String>,
    #[serde(default)]
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ScriptPayload {
    Script { actions: Vec<ScriptAction> },
    Actions(Vec<ScriptAction>),
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown script action '{0}'")]
    UnknownAction(String),
    #[error("script action '{action}' needs a {field}")]
    Missing {
        action: String,
        field: &'static str,
    },
    #[error("script card: {0}")]
    Card(#[from] CardParseError),
}

/// A decoded script step. Each one maps onto a key the user could press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptCommand {
    OpenDealer,
    OpenPlayer(usize),
    OpenAppend,
    Choose(CardFace),
    Dismiss,
    Remove(usize),
    ClearPlayer,
    Reset,
    Ask,
}

impl TryFrom<&ScriptAction> for ScriptCommand {
    type Error = ScriptError;

    fn try_from(action: &ScriptAction) -> Result<Self, Self::Error> {
        let index = || {
            action.index.ok_or_else(|| ScriptError::Missing {
                action: action.action.clone(),
                field: "index",
            })
        };
        let command = match action.action.as_str() {
            "open_dealer" => Self::OpenDealer,
            "open_player" => Self::OpenPlayer(index()?),
            "open_append" | "hit" => Self::OpenAppend,
            "choose" => {
                let text = action.card.as_deref().ok_or_else(|| ScriptError::Missing {
                    action: action.action.clone(),
                    field: "card",
                })?;
                Self::Choose(text.parse()?)
            }
            "dismiss" => Self::Dismiss,
            "remove" => Self::Remove(index()?),
            "clear_player" => Self::ClearPlayer,
            "reset" => Self::Reset,
            "ask" => Self::Ask,
            other => return Err(ScriptError::UnknownAction(other.to_string())),
        };
        Ok(command)
    }
}

pub fn parse_script(body: &str) -> Result<Vec<ScriptCommand>, ScriptError> {
    let payload: ScriptPayload = serde_json::from_str(body)?;
    let actions = match payload {
        ScriptPayload::Script { actions } | ScriptPayload::Actions(actions) => actions,
    };
    actions.iter().map(ScriptCommand::try_from).collect()
}

pub fn load_script_file(path: &Path) -> Result<Vec<ScriptCommand>, ScriptError> {
    let body = fs::read_to_string(path)?;
    parse_script(&body)
}

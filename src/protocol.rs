use crate::format::Format;
use crate::occurrence::ResolveHint;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{trace, Level};

/// Records exchanged between the source side and the preview side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Message {
    ScrollTo {
        line: usize,
        total_lines: usize,
    },
    RevealLine {
        line: usize,
    },
    ApplyFormat {
        format: Format,
        selected_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line_hint: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block_text_hint: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ordinal: Option<usize>,
    },
    RequestExport,
}

impl Message {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to encode message")
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).with_context(|| format!("Invalid message: {raw}"))
    }

    /// Resolver hints carried by an `applyFormat`.
    pub fn resolve_hint(&self) -> Option<ResolveHint> {
        match self {
            Message::ApplyFormat {
                line_hint,
                block_text_hint,
                ordinal,
                ..
            } => Some(ResolveHint {
                line: *line_hint,
                block_text: block_text_hint.clone(),
                ordinal: *ordinal,
            }),
            _ => None,
        }
    }
}

/// One end of a duplex message channel.
pub struct Endpoint {
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl Endpoint {
    pub fn send(&self, message: Message) {
        if tracing::enabled!(Level::TRACE) {
            if let Ok(json) = message.to_json() {
                trace!(%json, "send");
            }
        }
        // The peer only disappears during shutdown.
        let _ = self.tx.send(message);
    }

    pub fn drain(&self) -> Vec<Message> {
        self.rx.try_iter().collect()
    }
}

/// A connected pair: `(source, preview)`.
pub fn channel() -> (Endpoint, Endpoint) {
    let (to_preview, from_source) = mpsc::channel();
    let (to_source, from_preview) = mpsc::channel();
    (
        Endpoint {
            tx: to_preview,
            rx: from_preview,
        },
        Endpoint {
            tx: to_source,
            rx: from_source,
        },
    )
}

//! Child side of the iframe resize protocol.
//!
//! Frames exchange plain strings of the form
//! `pymxPYMx{id}xPYMx{kind}xPYMx{payload}`. The child reports its content
//! height with `height` messages; the parent announces its width with
//! `width` messages, which the child answers by re-rendering.

use tracing::{debug, warn};

use crate::chart::{ResizeCallback, ResizeSource};

pub const MESSAGE_PREFIX: &str = "pym";
pub const MESSAGE_DELIMITER: &str = "xPYMx";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeMessage {
    /// Child content height in pixels.
    Height(u32),
    /// Parent container width in pixels.
    Width(u32),
    Other { kind: String, payload: String },
}

impl BridgeMessage {
    pub fn kind(&self) -> &str {
        match self {
            BridgeMessage::Height(_) => "height",
            BridgeMessage::Width(_) => "width",
            BridgeMessage::Other { kind, .. } => kind,
        }
    }

    fn payload(&self) -> String {
        match self {
            BridgeMessage::Height(h) => h.to_string(),
            BridgeMessage::Width(w) => w.to_string(),
            BridgeMessage::Other { payload, .. } => payload.clone(),
        }
    }

    fn from_parts(kind: &str, payload: &str) -> Self {
        let px = || payload.trim().parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0);
        match (kind, px()) {
            ("height", Some(h)) => BridgeMessage::Height(h.round() as u32),
            ("width", Some(w)) => BridgeMessage::Width(w.round() as u32),
            _ => BridgeMessage::Other {
                kind: kind.to_string(),
                payload: payload.to_string(),
            },
        }
    }
}

/// A message addressed to one child frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub id: String,
    pub message: BridgeMessage,
}

impl Envelope {
    pub fn new(id: impl Into<String>, message: BridgeMessage) -> Self {
        Self {
            id: id.into(),
            message,
        }
    }

    pub fn encode(&self) -> String {
        [
            MESSAGE_PREFIX,
            &self.id,
            self.message.kind(),
            &self.message.payload(),
        ]
        .join(MESSAGE_DELIMITER)
    }

    /// `None` for anything that is not a protocol message.
    pub fn decode(raw: &str) -> Option<Self> {
        let rest = raw
            .strip_prefix(MESSAGE_PREFIX)?
            .strip_prefix(MESSAGE_DELIMITER)?;
        let mut parts = rest.splitn(3, MESSAGE_DELIMITER);
        let id = parts.next()?;
        let kind = parts.next()?;
        let payload = parts.next()?;
        if kind.is_empty() || kind.contains(char::is_whitespace) {
            return None;
        }
        Some(Self::new(id, BridgeMessage::from_parts(kind, payload)))
    }
}

/// Where outbound messages go; `window.parent.postMessage` in a browser.
pub trait ParentPort {
    fn post(&self, message: &str);
}

impl<P: ParentPort + ?Sized> ParentPort for std::sync::Arc<P> {
    fn post(&self, message: &str) {
        (**self).post(message)
    }
}

pub struct EmbeddingBridge<P> {
    id: String,
    port: P,
    callbacks: Vec<ResizeCallback>,
    parent_width: Option<u32>,
}

impl<P: ParentPort> EmbeddingBridge<P> {
    pub fn new(id: impl Into<String>, port: P) -> Self {
        Self {
            id: id.into(),
            port,
            callbacks: Vec::new(),
            parent_width: None,
        }
    }

    /// Last width announced by the parent.
    pub fn parent_width(&self) -> Option<u32> {
        self.parent_width
    }

    pub fn send_height(&self, height: f64) {
        let px = if height.is_finite() && height > 0.0 {
            height.ceil() as u32
        } else {
            0
        };
        let msg = Envelope::new(self.id.clone(), BridgeMessage::Height(px)).encode();
        debug!(height = px, "reporting height to parent");
        self.port.post(&msg);
    }

    /// Feed one inbound message. Returns whether it triggered a resize.
    pub fn handle_message(&mut self, raw: &str) -> bool {
        let Some(envelope) = Envelope::decode(raw) else {
            // other scripts post to the window too
            return false;
        };
        if envelope.id != self.id {
            return false;
        }
        match envelope.message {
            BridgeMessage::Width(width) => {
                debug!(width, "parent resized");
                self.parent_width = Some(width);
                for callback in &mut self.callbacks {
                    callback();
                }
                true
            }
            BridgeMessage::Height(_) => false,
            BridgeMessage::Other { kind, .. } => {
                warn!(%kind, "ignoring unsupported embed message");
                false
            }
        }
    }
}

impl<P: ParentPort> ResizeSource for EmbeddingBridge<P> {
    fn subscribe(&mut self, callback: ResizeCallback) {
        self.callbacks.push(callback);
    }
}

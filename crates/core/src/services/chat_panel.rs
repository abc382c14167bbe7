use crate::errors::CoreError;
use crate::models::chat::{ChatContext, ChatMessage, ChatReply, ChatRequest};
use crate::models::geometry::{Gesture, PanelGeometry, Position, Viewport};
use crate::models::session::Session;
use crate::providers::traits::ChatAssistant;
use crate::storage::manager::{history_key, PanelStore};

pub const FALLBACK_REPLY: &str = "Sorry, there was a problem contacting the AI assistant.";

/// Starter questions offered under an empty input.
pub const SUGGESTED_QUESTIONS: [&str; 6] = [
    "Summarize this chart for me.",
    "Is there a buy/sell signal right now?",
    "Explain the meaning of EMA 20.",
    "What is a gap up and why does it matter?",
    "Describe current support/resistance levels.",
    "What does the RSI say about this stock?",
];

/// Greeting that opens every fresh conversation.
pub fn welcome_text(bot_name: &str) -> String {
    format!(
        "Hi! Ask me anything about stocks, indicators, this chart, or finance concepts. I'm {bot_name}."
    )
}

/// A chat request that was sent and has not been answered yet.
#[derive(Debug, Clone, PartialEq)]
pub struct SendTicket {
    /// History scope the request belongs to.
    pub generation: u64,
    pub request: ChatRequest,
}

/// Observable state of the floating panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    Open,
    Dragging,
    Resizing,
}

/// Result of a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input or a request already in flight; nothing happened.
    Ignored,
    /// One user and one assistant message were appended. `credits` is the
    /// balance reported by the server, if any.
    Completed { credits: Option<u64> },
}

/// The floating assistant panel: visibility, geometry gestures, and the
/// conversation with its request/response cycle.
///
/// Geometry is persisted at the end of each gesture, history after every
/// mutation. Storage failures never interrupt the panel.
pub struct ChatPanel {
    store: PanelStore,
    history_key: String,
    bot_name: String,
    open: bool,
    gesture: Gesture,
    geometry: PanelGeometry,
    messages: Vec<ChatMessage>,
    input: String,
    /// Bumped on every history scope change.
    generation: u64,
    /// Generation the outstanding request was sent under.
    in_flight: Option<u64>,
}

impl ChatPanel {
    /// Restore geometry and the history scoped to `session`.
    pub fn new(
        store: PanelStore,
        session: Option<&Session>,
        viewport: Viewport,
        bot_name: impl Into<String>,
    ) -> Self {
        let bot_name = bot_name.into();
        let key = history_key(session);
        let geometry = store.load_geometry(viewport);
        let messages = store
            .load_history(&key)
            .unwrap_or_else(|| vec![ChatMessage::assistant(welcome_text(&bot_name))]);
        let panel = Self {
            store,
            history_key: key,
            bot_name,
            open: false,
            gesture: Gesture::Idle,
            geometry,
            messages,
            input: String::new(),
            generation: 0,
            in_flight: None,
        };
        panel.persist_history();
        panel
    }

    // ── Visibility ──────────────────────────────────────────────────

    pub fn state(&self) -> PanelState {
        match (self.open, self.gesture) {
            (false, _) => PanelState::Closed,
            (true, Gesture::Idle) => PanelState::Open,
            (true, Gesture::Dragging { .. }) => PanelState::Dragging,
            (true, Gesture::Resizing) => PanelState::Resizing,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Hide the panel. History is kept; an active gesture ends here.
    pub fn close(&mut self) {
        self.pointer_up();
        self.open = false;
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    // ── Geometry gestures ───────────────────────────────────────────

    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Pointer pressed on the header. Ignored while closed.
    pub fn pointer_down_drag(&mut self, pointer: Position) {
        if !self.open {
            return;
        }
        let origin = self.geometry.position;
        self.gesture = Gesture::Dragging {
            offset: Position::new(pointer.x - origin.x, pointer.y - origin.y),
        };
    }

    /// Pointer pressed on the resize grip. Ignored while closed.
    pub fn pointer_down_resize(&mut self) {
        if !self.open {
            return;
        }
        self.gesture = Gesture::Resizing;
    }

    /// Pointer moved anywhere in the window.
    pub fn pointer_move(&mut self, pointer: Position, viewport: Viewport) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Dragging { offset } => {
                let origin = Position::new(pointer.x - offset.x, pointer.y - offset.y);
                self.geometry.position = self.geometry.dragged_to(origin, viewport);
            }
            Gesture::Resizing => {
                self.geometry.size = self.geometry.resized_to(pointer, viewport);
            }
        }
    }

    /// Pointer released anywhere. Ends the gesture and persists geometry.
    pub fn pointer_up(&mut self) {
        if self.gesture.is_active() {
            self.store.save_geometry(&self.geometry);
        }
        self.gesture = Gesture::Idle;
    }

    // ── Conversation ────────────────────────────────────────────────

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Put a starter question into the input box.
    pub fn insert_suggestion(&mut self, question: &str) {
        self.input = question.to_string();
    }

    pub fn suggested_questions(&self) -> &'static [&'static str] {
        &SUGGESTED_QUESTIONS
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn history_key(&self) -> &str {
        &self.history_key
    }

    /// First half of a send: append the user message and build the request.
    ///
    /// Returns `None` without side effects for blank text or while another
    /// request is in flight.
    pub fn begin_send(&mut self, text: &str, context: ChatContext) -> Option<SendTicket> {
        if text.trim().is_empty() || self.in_flight.is_some() {
            return None;
        }
        self.in_flight = Some(self.generation);
        self.messages.push(ChatMessage::user(text));
        self.input.clear();
        self.persist_history();
        Some(SendTicket {
            generation: self.generation,
            request: ChatRequest::new(text, context),
        })
    }

    /// Second half of a send: append exactly one assistant message.
    ///
    /// Any failure becomes the fallback reply; nothing is retried. Returns
    /// the server-reported balance so the caller can replace its copy.
    ///
    /// A reply to a request sent before the last scope change is dropped.
    pub fn complete_send(
        &mut self,
        generation: u64,
        result: Result<ChatReply, CoreError>,
    ) -> Option<u64> {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "dropping chat reply from a previous session"
            );
            return None;
        }
        if self.in_flight != Some(generation) {
            tracing::debug!("chat reply arrived with no request in flight; ignored");
            return None;
        }
        let (content, credits) = match result {
            Ok(reply) => (reply.response, reply.credits),
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                (FALLBACK_REPLY.to_string(), None)
            }
        };
        self.messages.push(ChatMessage::assistant(content));
        self.in_flight = None;
        self.persist_history();
        credits
    }

    /// Send `text` and wait for the reply.
    pub async fn send_message(
        &mut self,
        text: &str,
        context: ChatContext,
        assistant: &dyn ChatAssistant,
    ) -> SendOutcome {
        let Some(ticket) = self.begin_send(text, context) else {
            return SendOutcome::Ignored;
        };
        let result = assistant.ask(&ticket.request).await;
        SendOutcome::Completed {
            credits: self.complete_send(ticket.generation, result),
        }
    }

    /// Reset to a fresh welcome message and drop the stored history.
    pub fn clear_history(&mut self) {
        self.messages = vec![ChatMessage::assistant(welcome_text(&self.bot_name))];
        self.store.clear_history(&self.history_key);
    }

    /// Switch the history scope after a sign-in or sign-out.
    pub fn rescope(&mut self, session: Option<&Session>) {
        let key = history_key(session);
        if key == self.history_key {
            return;
        }
        tracing::debug!(key = %key, "switching chat history scope");
        if self.in_flight.take().is_some() {
            tracing::debug!("abandoning in-flight chat request on scope change");
        }
        self.generation += 1;
        self.messages = self
            .store
            .load_history(&key)
            .unwrap_or_else(|| vec![ChatMessage::assistant(welcome_text(&self.bot_name))]);
        self.history_key = key;
        self.persist_history();
    }

    fn persist_history(&self) {
        self.store.save_history(&self.history_key, &self.messages);
    }
}

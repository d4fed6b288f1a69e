//! AI chat assistant: transcript, input box and one request at a time.

use eframe::egui;

use crate::bus::{topics, BusMessage};
use crate::error::{ModuleError, ModuleMountError};
use crate::module::{FeatureModule, ModuleContext};
use crate::protocol::{BackendEvent, ChatRequest, ChatRole, ChatTurn, TaskId};

pub const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";

const INPUT_ID: &str = "ai_chat_input";

/// Take a plain Enter press out of the frame's input. Shift+Enter is left
/// for the text edit, which turns it into a newline.
fn take_send_key(input: &mut egui::InputState) -> bool {
    !input.modifiers.shift && input.consume_key(egui::Modifiers::NONE, egui::Key::Enter)
}

/// One line of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatLine {
    Turn(ChatTurn),
    /// A failed request, shown inline but never sent back as history.
    Error { text: String, timestamp: String },
}

#[derive(Debug)]
pub struct AiChat {
    transcript: Vec<ChatLine>,
    input: String,
    in_flight: Option<TaskId>,
    scroll_to_bottom: bool,
}

impl Default for AiChat {
    fn default() -> Self {
        Self {
            transcript: vec![ChatLine::Turn(ChatTurn::new(ChatRole::Assistant, GREETING))],
            input: String::new(),
            in_flight: None,
            scroll_to_bottom: false,
        }
    }
}

impl AiChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[ChatLine] {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_waiting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Completed turns, oldest first.
    fn history(&self) -> Vec<ChatTurn> {
        self.transcript
            .iter()
            .filter_map(|line| match line {
                ChatLine::Turn(turn) => Some(turn.clone()),
                ChatLine::Error { .. } => None,
            })
            .collect()
    }

    /// Send the input box. Returns the task, or `None` if there was nothing
    /// to send or a reply is still pending.
    pub fn send(&mut self, cx: &mut ModuleContext<'_>) -> Option<TaskId> {
        let message = self.input.trim().to_string();
        if message.is_empty() || self.in_flight.is_some() {
            return None;
        }
        let request = ChatRequest {
            history: self.history(),
            message: message.clone(),
        };
        self.transcript
            .push(ChatLine::Turn(ChatTurn::new(ChatRole::User, message)));
        self.input.clear();
        self.scroll_to_bottom = true;

        let task = cx.request_chat(request);
        self.in_flight = Some(task);
        tracing::debug!(?task, "chat request sent");
        Some(task)
    }

    fn push_error(&mut self, text: String) {
        self.transcript.push(ChatLine::Error {
            text,
            timestamp: chrono::Local::now().format("%H:%M").to_string(),
        });
        self.scroll_to_bottom = true;
    }

    fn bubble(ui: &mut egui::Ui, line: &ChatLine) {
        let dark = ui.visuals().dark_mode;
        let (fill, who, text, timestamp) = match line {
            ChatLine::Turn(turn) => {
                let fill = match (turn.role, dark) {
                    (ChatRole::User, true) => egui::Color32::from_rgb(40, 70, 50),
                    (ChatRole::User, false) => egui::Color32::from_rgb(225, 255, 199),
                    (ChatRole::Assistant, true) => egui::Color32::from_rgb(45, 45, 52),
                    (ChatRole::Assistant, false) => egui::Color32::WHITE,
                };
                let who = match turn.role {
                    ChatRole::User => "You",
                    ChatRole::Assistant => "Assistant",
                };
                (fill, who, turn.text.as_str(), turn.timestamp.as_str())
            }
            ChatLine::Error { text, timestamp } => (
                egui::Color32::from_rgb(90, 30, 30),
                "Error",
                text.as_str(),
                timestamp.as_str(),
            ),
        };

        let is_user = matches!(line, ChatLine::Turn(t) if t.role == ChatRole::User);
        let layout = if is_user {
            egui::Layout::top_down(egui::Align::Max)
        } else {
            egui::Layout::top_down(egui::Align::Min)
        };
        ui.with_layout(layout, |ui| {
            egui::Frame::new()
                .fill(fill)
                .corner_radius(10.0)
                .inner_margin(egui::Margin::symmetric(10, 6))
                .show(ui, |ui| {
                    ui.set_max_width(ui.available_width() * 0.8);
                    ui.horizontal(|ui| {
                        ui.strong(who);
                        ui.weak(timestamp);
                    });
                    ui.label(text);
                });
        });
        ui.add_space(4.0);
    }
}

impl FeatureModule for AiChat {
    fn mount(&mut self, _cx: &mut ModuleContext<'_>) -> Result<(), ModuleMountError> {
        self.scroll_to_bottom = true;
        Ok(())
    }

    fn unmount(&mut self, _cx: &mut ModuleContext<'_>) {
        if self.in_flight.take().is_some() {
            self.push_error("Request cancelled.".to_string());
        }
    }

    fn on_message(
        &mut self,
        message: &BusMessage,
        _cx: &mut ModuleContext<'_>,
    ) -> Result<(), ModuleError> {
        if message.is(topics::CHAT_PROMPT) {
            self.input = message.expect_payload::<String>()?.clone();
        }
        Ok(())
    }

    fn on_task_event(&mut self, event: BackendEvent, _cx: &mut ModuleContext<'_>) {
        let BackendEvent::ChatReply { task, result } = event else {
            return;
        };
        if self.in_flight != Some(task) {
            return;
        }
        self.in_flight = None;
        match result {
            Ok(reply) => {
                self.transcript
                    .push(ChatLine::Turn(ChatTurn::new(ChatRole::Assistant, reply)));
                self.scroll_to_bottom = true;
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat request failed");
                self.push_error(err.to_string());
            }
        }
    }

    fn ui(&mut self, ui: &mut egui::Ui, cx: &mut ModuleContext<'_>) {
        let input_height = 90.0;
        let history_height = (ui.available_height() - input_height).max(80.0);

        egui::ScrollArea::vertical()
            .max_height(history_height)
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &self.transcript {
                    Self::bubble(ui, line);
                }
                if self.in_flight.is_some() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.weak("Thinking…");
                    });
                }
                if std::mem::take(&mut self.scroll_to_bottom) {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });

        ui.separator();
        ui.horizontal(|ui| {
            let input_id = egui::Id::new(INPUT_ID);
            // Must run before the edit is added so it never sees the key
            let enter = ui.memory(|m| m.has_focus(input_id)) && ui.input_mut(take_send_key);
            let response = ui.add(
                egui::TextEdit::multiline(&mut self.input)
                    .id(input_id)
                    .desired_rows(3)
                    .desired_width(ui.available_width() - 70.0)
                    .hint_text("Type a message… (Enter to send, Shift+Enter for newline)"),
            );

            let can_send = self.in_flight.is_none() && !self.input.trim().is_empty();
            let clicked = ui
                .add_enabled(can_send, egui::Button::new("Send ⬆"))
                .clicked();
            if (clicked || enter) && self.send(cx).is_some() {
                response.request_focus();
            }
        });
    }
}

use std::sync::Arc;

use moodchat_core::{
    char_to_byte_index, ChatBackend, ChatRequest, ChatResponse, ConversationController,
    ExchangeError, SubmitKey, REFOCUS_DELAY,
};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::tui::AppEvent;
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub controller: ConversationController,
    pub endpoint: String,

    // Draft editing
    pub cursor: usize, // char index into the draft

    // Transcript view
    pub scroll: u16,
    pub follow_latest: bool, // keep the newest turn in view
    pub chat_height: u16,    // inner height of the transcript pane
    pub chat_width: u16,     // inner width of the transcript pane
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    backend: Arc<dyn ChatBackend>,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        endpoint: impl Into<String>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            controller: ConversationController::new(),
            endpoint: endpoint.into(),
            cursor: 0,
            scroll: 0,
            follow_latest: true,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            animation_frame: 0,
            backend,
            events,
        }
    }

    pub fn draft(&self) -> &str {
        self.controller.draft()
    }

    fn draft_len(&self) -> usize {
        self.controller.draft().chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        let mut draft = self.controller.draft().to_string();
        let byte_pos = char_to_byte_index(&draft, self.cursor);
        draft.insert(byte_pos, c);
        self.controller.update_draft(draft);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.remove_at_cursor();
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.draft_len() {
            self.remove_at_cursor();
        }
    }

    fn remove_at_cursor(&mut self) {
        let mut draft = self.controller.draft().to_string();
        let byte_pos = char_to_byte_index(&draft, self.cursor);
        draft.remove(byte_pos);
        self.controller.update_draft(draft);
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.draft_len());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.draft_len();
    }

    /// Enter in the input box: send the draft, or add a line break when `newline` is set
    pub fn press_enter(&mut self, newline: bool) {
        if newline {
            self.controller.on_submit_key(SubmitKey::Newline {
                cursor: self.cursor,
            });
            self.cursor += 1;
            return;
        }

        if let Some(request) = self.controller.on_submit_key(SubmitKey::Commit) {
            // Stay in Editing: the draft remains editable while the reply is pending
            self.cursor = 0;
            self.scroll_to_bottom();
            self.dispatch(request);
        }
    }

    /// Run the exchange on its own task; the outcome comes back as [`AppEvent::Reply`]
    fn dispatch(&self, request: ChatRequest) {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = backend.send(request).await;
            let _ = events.send(AppEvent::Reply(outcome));
        });
    }

    pub fn apply_reply(&mut self, outcome: Result<ChatResponse, ExchangeError>) {
        if self.controller.settle(outcome).is_some() {
            self.scroll_to_bottom();
            self.schedule_refocus();
        }
    }

    fn schedule_refocus(&self) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(REFOCUS_DELAY).await;
            let _ = events.send(AppEvent::Refocus);
        });
    }

    /// Put the user back in the input box, e.g. after Esc to scroll while waiting
    pub fn refocus(&mut self) {
        if !self.controller.is_busy() {
            self.input_mode = InputMode::Editing;
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.controller.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn max_scroll(&self) -> u16 {
        let width = if self.chat_width > 0 { self.chat_width } else { 50 };
        let height = if self.chat_height > 0 { self.chat_height } else { 20 };
        let total_lines = ui::transcript_lines(self, width as usize).len();
        let total_lines = u16::try_from(total_lines).unwrap_or(u16::MAX);
        total_lines.saturating_sub(height)
    }

    /// Scroll so the newest turn (or the busy indicator) is visible
    pub fn scroll_to_bottom(&mut self) {
        self.follow_latest = true;
        self.scroll = self.max_scroll();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_latest = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_scroll();
        self.scroll = self.scroll.saturating_add(lines).min(max);
        self.follow_latest = self.scroll == max;
    }

    pub fn scroll_to_top(&mut self) {
        self.follow_latest = false;
        self.scroll = 0;
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use moodchat_core::Message;
    use tokio::sync::mpsc;

    struct CannedBackend;

    #[async_trait]
    impl ChatBackend for CannedBackend {
        async fn send(&self, request: ChatRequest) -> Result<ChatResponse, ExchangeError> {
            Ok(ChatResponse {
                response: Some(format!("heard: {}", request.message)),
                session_id: Some("s1".to_string()),
            })
        }
    }

    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(Arc::new(CannedBackend), "http://stub/chat/", tx), rx)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.insert_char(c);
        }
    }

    #[tokio::test]
    async fn test_enter_round_trip() {
        let (mut app, mut rx) = test_app();
        type_text(&mut app, "sad songs");

        app.press_enter(false);
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.cursor, 0);
        assert!(app.controller.is_busy());

        // Leave the input box to scroll while the reply is pending
        app.input_mode = InputMode::Normal;

        let Some(AppEvent::Reply(outcome)) = rx.recv().await else {
            panic!("expected a reply event");
        };
        app.apply_reply(outcome);

        assert_eq!(
            app.controller.transcript(),
            &[Message::user("sad songs"), Message::bot("heard: sad songs")]
        );
        assert_eq!(app.controller.session_id(), Some("s1"));

        assert!(matches!(rx.recv().await, Some(AppEvent::Refocus)));
        app.refocus();
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[tokio::test]
    async fn test_enter_while_busy_keeps_draft() {
        let (mut app, _rx) = test_app();
        type_text(&mut app, "first");
        app.press_enter(false);

        type_text(&mut app, "second");
        app.press_enter(false);

        assert_eq!(app.draft(), "second");
        assert_eq!(app.controller.transcript().len(), 1);
    }

    #[test]
    fn test_newline_enter_edits_draft() {
        let (mut app, _rx) = test_app();
        type_text(&mut app, "ab");
        app.cursor_left();

        app.press_enter(true);

        assert_eq!(app.draft(), "a\nb");
        assert_eq!(app.cursor, 2);
        assert!(app.controller.transcript().is_empty());
    }

    #[test]
    fn test_cursor_editing_is_utf8_safe() {
        let (mut app, _rx) = test_app();
        type_text(&mut app, "cañón");
        app.cursor_home();
        app.cursor_right();
        app.cursor_right();
        app.delete();
        app.backspace();
        assert_eq!(app.draft(), "cón");
        app.cursor_end();
        assert_eq!(app.cursor, 3);
    }

    #[test]
    fn test_refocus_ignored_while_busy() {
        let (mut app, _rx) = test_app();
        app.input_mode = InputMode::Normal;
        app.controller.begin_submit("hi");
        app.refocus();
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_scroll_follows_latest() {
        let (mut app, _rx) = test_app();
        app.chat_height = 4;
        app.chat_width = 40;
        for i in 0..5 {
            app.controller.begin_submit(&format!("turn {i}"));
            app.controller.settle(Ok(ChatResponse::default()));
        }

        app.scroll_to_bottom();
        let bottom = app.scroll;
        assert!(bottom > 0);

        app.scroll_up(2);
        assert!(!app.follow_latest);
        assert_eq!(app.scroll, bottom - 2);

        app.scroll_down(10);
        assert!(app.follow_latest);
        assert_eq!(app.scroll, bottom);
    }
}

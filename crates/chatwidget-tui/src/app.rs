use std::sync::Arc;

use chatwidget_core::{
    settle, ChatBackend, ChatError, Config, ConversationStore, Dispatcher, Outcome,
    StoreEvent,
};
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Lines the chat pane moves per page / wheel step
pub const PAGE_SCROLL: u16 = 10;
pub const WHEEL_SCROLL: u16 = 3;

pub struct App {
    pub should_quit: bool,

    // Header text
    pub title: String,
    pub subtitle: String,

    // Conversation state and the request path
    pub store: ConversationStore,
    pub dispatcher: Dispatcher,
    pub query_task: Option<JoinHandle<Outcome>>,
    store_events: mpsc::UnboundedReceiver<StoreEvent>,

    // Input state
    pub query_cursor: usize, // cursor position in the draft, in chars

    // Chat pane state
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height, updated during render
    pub chat_lines: u16,  // wrapped row count, updated during render
    pub follow_tail: bool,
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(config: &Config, backend: Arc<dyn ChatBackend>) -> Self {
        let mut store = ConversationStore::new(config.greeting());
        let store_events = store.subscribe();

        Self {
            should_quit: false,
            title: config.title().to_string(),
            subtitle: config.subtitle().to_string(),
            store,
            dispatcher: Dispatcher::new(backend),
            query_task: None,
            store_events,
            query_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_lines: 0,
            follow_tail: true,
            chat_area: None,
            animation_frame: 0,
        }
    }

    /// Start an exchange from the current draft, running the request in the background.
    pub fn submit(&mut self) {
        let Some(exchange) = self.dispatcher.begin(&mut self.store) else {
            return;
        };

        self.query_cursor = 0;
        self.follow_tail = true;
        self.query_task = Some(tokio::spawn(exchange.run()));
        self.sync_with_store();
    }

    /// Resolves when the in-flight exchange finishes. Never resolves while idle.
    pub async fn exchange_finished(&mut self) -> Outcome {
        match self.query_task.as_mut() {
            Some(handle) => match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(ChatError::Transport(format!("request task failed: {e}"))),
            },
            None => std::future::pending().await,
        }
    }

    /// Record a finished exchange in the conversation.
    pub fn finish_exchange(&mut self, outcome: Outcome) {
        self.query_task = None;
        settle(&mut self.store, &outcome);
        self.sync_with_store();
    }

    /// React to store notifications: keep the newest message in view.
    pub fn sync_with_store(&mut self) {
        while let Ok(event) = self.store_events.try_recv() {
            match event {
                StoreEvent::MessageAppended(_) => {
                    if self.follow_tail {
                        self.scroll_chat_to_bottom();
                    }
                }
                StoreEvent::BusyChanged(true) => self.animation_frame = 0,
                StoreEvent::BusyChanged(false) | StoreEvent::DraftChanged => {}
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.store.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn max_chat_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.chat_lines.saturating_sub(visible_height)
    }

    /// Scroll chat to bottom so the latest message (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
        self.follow_tail = true;
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_tail = self.chat_scroll >= self.max_chat_scroll();
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max = self.max_chat_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
        self.follow_tail = self.chat_scroll >= max;
    }
}

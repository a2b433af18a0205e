use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use appliance_core::state::POPULAR_BRANDS;
use appliance_core::{
    ApplianceType, Conversation, PendingSearch, SearchCompletion, SearchGateway, StepInput,
    Submission, Subscription, WizardStep,
};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;

use crate::tui::AppEvent;

/// Preset that hands the brand answer over to the text box
const OTHER_BRAND: &str = "Other";

pub struct App {
    // Core state
    pub should_quit: bool,
    pub conversation: Conversation,
    pub api_url: String,
    gateway: Arc<dyn SearchGateway>,
    events: UnboundedSender<AppEvent>,

    // Step widgets
    pub appliance_state: ListState,
    pub brand_state: ListState,
    pub brand_for_brand: bool,
    pub text_input: String,
    pub text_cursor: usize, // cursor position in text_input, in chars

    // Transcript view
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of the chat area for scroll calculations
    pub chat_width: u16,  // Inner width of the chat area for wrap calculations
    pub chat_area: Option<Rect>,
    follow_transcript: Arc<AtomicBool>,
    _transcript_subscription: Subscription,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(
        gateway: Arc<dyn SearchGateway>,
        api_url: impl Into<String>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        let conversation = Conversation::new();

        // Any transcript change pulls the view down to the newest message
        let follow_transcript = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&follow_transcript);
        let subscription = conversation.subscribe(move |_| flag.store(true, Ordering::Relaxed));

        let mut app = Self {
            should_quit: false,
            conversation,
            api_url: api_url.into(),
            gateway,
            events,

            appliance_state: ListState::default(),
            brand_state: ListState::default(),
            brand_for_brand: false,
            text_input: String::new(),
            text_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            follow_transcript,
            _transcript_subscription: subscription,

            animation_frame: 0,
        };
        app.prepare_step_widgets();
        app
    }

    pub fn step(&self) -> WizardStep {
        self.conversation.step()
    }

    pub fn is_loading(&self) -> bool {
        self.conversation.is_loading()
    }

    /// The answer the widgets for the active step currently hold
    pub fn current_input(&self) -> Option<StepInput> {
        match self.step() {
            WizardStep::ApplianceType => self
                .appliance_state
                .selected()
                .and_then(|i| ApplianceType::all().get(i).copied())
                .map(|t| StepInput::ApplianceType(t.as_str().to_string())),
            WizardStep::Brand => {
                let preset = self
                    .brand_state
                    .selected()
                    .and_then(|i| POPULAR_BRANDS.get(i).copied())
                    .filter(|brand| *brand != OTHER_BRAND);
                let brand = preset.map(str::to_string).unwrap_or_else(|| self.text_input.clone());
                Some(StepInput::Brand(brand))
            }
            WizardStep::Model => Some(StepInput::Model(self.text_input.clone())),
            WizardStep::BrandForBrand => Some(StepInput::BrandForBrand(self.brand_for_brand)),
            WizardStep::DollarLimit => {
                parse_dollar_limit(&self.text_input).map(StepInput::DollarLimit)
            }
            WizardStep::Results => None,
        }
    }

    /// Hand the active step's answer to the conversation. Returns whether it
    /// was accepted.
    pub fn submit(&mut self) -> bool {
        let Some(input) = self.current_input() else {
            return false;
        };

        match self.conversation.submit(input) {
            Submission::Rejected => false,
            Submission::Advanced(_) => {
                self.prepare_step_widgets();
                true
            }
            Submission::SearchStarted(pending) => {
                self.prepare_step_widgets();
                self.spawn_search(pending);
                true
            }
        }
    }

    /// Step back one question, keeping the answers already given
    pub fn go_back(&mut self) -> bool {
        let Some(target) = self.step().previous() else {
            return false;
        };
        if !self.conversation.go_back(target) {
            return false;
        }
        self.prepare_step_widgets();
        true
    }

    pub fn new_search(&mut self) {
        self.conversation.reset();
        self.chat_scroll = 0;
        self.animation_frame = 0;
        self.prepare_step_widgets();
    }

    /// Apply a finished background search. Stale results are dropped.
    pub fn finish_search(&mut self, completion: SearchCompletion) -> bool {
        self.conversation.complete_search(completion)
    }

    fn spawn_search(&self, pending: PendingSearch) {
        let gateway = Arc::clone(&self.gateway);
        let events = self.events.clone();
        tokio::spawn(async move {
            let completion = pending.run(&*gateway).await;
            // The receiver is gone only when the app is shutting down
            let _ = events.send(AppEvent::SearchFinished(completion));
        });
    }

    /// Load the widgets for the active step, prefilled with any earlier answer
    fn prepare_step_widgets(&mut self) {
        let state = self.conversation.state().clone();
        self.text_input.clear();

        match state.step {
            WizardStep::ApplianceType => {
                let index = state
                    .appliance_type
                    .and_then(|t| ApplianceType::all().iter().position(|a| *a == t))
                    .unwrap_or(0);
                self.appliance_state.select(Some(index));
            }
            WizardStep::Brand => {
                let preset = POPULAR_BRANDS.iter().position(|b| *b == state.brand);
                self.brand_state.select(preset);
                if preset.is_none() {
                    self.text_input = state.brand;
                }
            }
            WizardStep::Model => self.text_input = state.model,
            WizardStep::BrandForBrand => self.brand_for_brand = state.brand_for_brand,
            WizardStep::DollarLimit => {
                if let Some(limit) = state.dollar_limit {
                    self.text_input = format!("{}", limit);
                }
            }
            WizardStep::Results => {}
        }

        self.text_cursor = self.text_input.chars().count();
    }

    // List navigation for the appliance and brand steps
    pub fn select_next(&mut self) {
        match self.step() {
            WizardStep::ApplianceType => {
                let len = ApplianceType::all().len();
                let i = self.appliance_state.selected().unwrap_or(0);
                self.appliance_state.select(Some((i + 1).min(len - 1)));
            }
            WizardStep::Brand => {
                let next = match self.brand_state.selected() {
                    Some(i) => (i + 1).min(POPULAR_BRANDS.len() - 1),
                    None => 0,
                };
                self.brand_state.select(Some(next));
            }
            WizardStep::BrandForBrand => self.brand_for_brand = !self.brand_for_brand,
            _ => {}
        }
    }

    pub fn select_prev(&mut self) {
        match self.step() {
            WizardStep::ApplianceType => {
                let i = self.appliance_state.selected().unwrap_or(0);
                self.appliance_state.select(Some(i.saturating_sub(1)));
            }
            WizardStep::Brand => {
                // Moving above the first preset returns focus to the text box
                let prev = match self.brand_state.selected() {
                    Some(0) | None => None,
                    Some(i) => Some(i - 1),
                };
                self.brand_state.select(prev);
            }
            WizardStep::BrandForBrand => self.brand_for_brand = !self.brand_for_brand,
            _ => {}
        }
    }

    /// True while the brand answer comes from the text box
    pub fn brand_uses_text(&self) -> bool {
        match self.brand_state.selected() {
            None => true,
            Some(i) => POPULAR_BRANDS.get(i).copied() == Some(OTHER_BRAND),
        }
    }

    // Text box editing
    pub fn insert_char(&mut self, c: char) {
        if self.step() == WizardStep::Brand && !self.brand_uses_text() {
            self.brand_state.select(None);
        }
        let byte_pos = char_to_byte_index(&self.text_input, self.text_cursor);
        self.text_input.insert(byte_pos, c);
        self.text_cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.text_cursor > 0 {
            self.text_cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text_input, self.text_cursor);
            self.text_input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        let char_count = self.text_input.chars().count();
        if self.text_cursor < char_count {
            let byte_pos = char_to_byte_index(&self.text_input, self.text_cursor);
            self.text_input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.text_cursor = self.text_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.text_input.chars().count();
        self.text_cursor = (self.text_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.text_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.text_cursor = self.text_input.chars().count();
    }

    // Transcript scrolling
    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    /// Consume a pending request to jump to the newest message
    pub fn take_follow_request(&self) -> bool {
        self.follow_transcript.swap(false, Ordering::Relaxed)
    }

    /// Keep the scroll offset inside the rendered transcript
    pub fn clamp_scroll(&mut self, total_lines: u16, follow: bool) {
        let max_scroll = total_lines.saturating_sub(self.chat_height);
        if follow || self.chat_scroll > max_scroll {
            self.chat_scroll = max_scroll;
        }
    }

    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Read the budget box. Blank means no limit; `None` means the text is not
/// a number yet.
pub fn parse_dollar_limit(raw: &str) -> Option<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(None);
    }
    // At most one leading dollar sign, and it must be followed by an amount
    let amount = trimmed.strip_prefix('$').unwrap_or(trimmed).trim_start();
    if amount.is_empty() || amount.contains('$') {
        return None;
    }
    let cleaned: String = amount.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().map(Some)
}

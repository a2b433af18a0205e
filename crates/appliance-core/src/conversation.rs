//! Conversation controller
//!
//! Owns the questionnaire state and the transcript. Every accepted answer
//! echoes a user message, stores the value, advances one step and asks the
//! next question. The last answer hands back a [`PendingSearch`] instead; the
//! caller runs it against a [`SearchGateway`] and reports the outcome through
//! [`Conversation::complete_search`].
//!
//! Invalid input is a silent no-op. Completions issued before the latest
//! `reset()` are dropped.

#[cfg(test)]
mod proptests;

use crate::content::{ContentBlock, ErrorKind};
use crate::formatter::format_results;
use crate::gateway::{GatewayError, SearchGateway, SearchRequest, SearchResponse};
use crate::observer::Subscription;
use crate::state::{ApplianceType, ChatMessage, WizardState, WizardStep};
use crate::transcript::{LogEvent, MessageLog};

pub const WELCOME_TEXT: &str = "Hello! I'm your Appliance Research Assistant.";
pub const CAPABILITIES_TEXT: &str =
    "I can help you find product specifications and replacement options.";
pub const RESTART_TEXT: &str = "Let's start a new search!";
pub const APPLIANCE_PROMPT: &str = "What type of appliance are you looking for?";
pub const BRAND_PROMPT: &str = "Great! What brand are you looking for?";
pub const MODEL_PROMPT: &str = "Perfect! What's the model number?";
pub const BRAND_FOR_BRAND_PROMPT: &str =
    "Do you need a brand-for-brand replacement (same brand only)?";
pub const DOLLAR_LIMIT_PROMPT: &str = "What's your budget limit for replacements?";
pub const SEARCHING_TEXT: &str =
    "Searching for your product and finding replacements...\nThis may take a few seconds.";
pub const CONNECTION_ERROR_TEXT: &str = "Could not connect to the server.";

/// An answer for one step of the questionnaire
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    ApplianceType(String),
    Brand(String),
    Model(String),
    BrandForBrand(bool),
    DollarLimit(Option<f64>),
}

impl StepInput {
    /// The step this input answers
    pub fn step(&self) -> WizardStep {
        match self {
            StepInput::ApplianceType(_) => WizardStep::ApplianceType,
            StepInput::Brand(_) => WizardStep::Brand,
            StepInput::Model(_) => WizardStep::Model,
            StepInput::BrandForBrand(_) => WizardStep::BrandForBrand,
            StepInput::DollarLimit(_) => WizardStep::DollarLimit,
        }
    }
}

/// What `submit` did with an input
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Wrong step or invalid value; nothing changed
    Rejected,
    /// Stored and moved on to the given step
    Advanced(WizardStep),
    /// Last answer stored; the search must now be run
    SearchStarted(PendingSearch),
}

/// A search the controller is waiting on
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSearch {
    pub generation: u64,
    pub request: SearchRequest,
}

impl PendingSearch {
    /// Run the request through a gateway, keeping the generation tag
    pub async fn run<G: SearchGateway + ?Sized>(self, gateway: &G) -> SearchCompletion {
        let outcome = gateway.complete_search(&self.request).await;
        SearchCompletion {
            generation: self.generation,
            outcome,
        }
    }
}

/// The result of a [`PendingSearch`], ready to be applied
#[derive(Debug, Clone)]
pub struct SearchCompletion {
    pub generation: u64,
    pub outcome: Result<SearchResponse, GatewayError>,
}

/// One user's pass through the questionnaire
#[derive(Debug)]
pub struct Conversation {
    state: WizardState,
    log: MessageLog,
    generation: u64,
    loading: bool,
}

impl Conversation {
    pub fn new() -> Self {
        let mut log = MessageLog::new();
        log.append_bot(ContentBlock::text(WELCOME_TEXT));
        log.append_bot(ContentBlock::text(CAPABILITIES_TEXT));
        log.append_bot(ContentBlock::text(format!("Let's get started! {}", APPLIANCE_PROMPT)));

        Self {
            state: WizardState::default(),
            log,
            generation: 0,
            loading: false,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> WizardStep {
        self.state.step
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.log.snapshot()
    }

    pub fn transcript(&self) -> &MessageLog {
        &self.log
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Observe transcript changes. See [`MessageLog::subscribe`].
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&LogEvent) + Send + 'static,
    {
        self.log.subscribe(callback)
    }

    /// Accept an answer for the current step
    pub fn submit(&mut self, input: StepInput) -> Submission {
        if self.loading || input.step() != self.state.step {
            tracing::debug!(
                current = ?self.state.step,
                answered = ?input.step(),
                loading = self.loading,
                "Ignoring input for inactive step"
            );
            return Submission::Rejected;
        }

        match input {
            StepInput::ApplianceType(raw) => {
                let Some(appliance_type) = ApplianceType::from_str(&raw) else {
                    return reject(WizardStep::ApplianceType);
                };
                self.log.append_user(ContentBlock::text(format!(
                    "Appliance Type: {}",
                    appliance_type.display_name()
                )));
                self.state.appliance_type = Some(appliance_type);
                self.advance(BRAND_PROMPT)
            }
            StepInput::Brand(raw) => {
                let brand = raw.trim();
                if brand.is_empty() {
                    return reject(WizardStep::Brand);
                }
                self.log.append_user(ContentBlock::text(format!("Brand: {}", brand)));
                self.state.brand = brand.to_string();
                self.advance(MODEL_PROMPT)
            }
            StepInput::Model(raw) => {
                let model = raw.trim();
                if model.is_empty() {
                    return reject(WizardStep::Model);
                }
                self.log.append_user(ContentBlock::text(format!("Model: {}", model)));
                self.state.model = model.to_string();
                self.advance(BRAND_FOR_BRAND_PROMPT)
            }
            StepInput::BrandForBrand(same_brand) => {
                self.log.append_user(ContentBlock::text(format!(
                    "Brand-for-brand: {}",
                    if same_brand { "Yes" } else { "No" }
                )));
                self.state.brand_for_brand = same_brand;
                self.advance(DOLLAR_LIMIT_PROMPT)
            }
            StepInput::DollarLimit(limit) => {
                if let Some(amount) = limit {
                    if !amount.is_finite() || amount < 0.0 {
                        return reject(WizardStep::DollarLimit);
                    }
                }
                self.log.append_user(ContentBlock::text(budget_text(limit)));
                self.state.dollar_limit = limit;
                self.begin_search()
            }
        }
    }

    /// Submit an answer and, if it was the last one, run the search inline
    pub async fn submit_and_search<G>(&mut self, input: StepInput, gateway: &G) -> Submission
    where
        G: SearchGateway + ?Sized,
    {
        let submission = self.submit(input);
        if let Submission::SearchStarted(pending) = &submission {
            let completion = pending.clone().run(gateway).await;
            self.complete_search(completion);
        }
        submission
    }

    /// Return to an earlier question.
    ///
    /// Answers already given for later steps are kept, and the transcript is
    /// not truncated.
    pub fn go_back(&mut self, target: WizardStep) -> bool {
        let current = self.state.step;
        if self.loading || current.is_terminal() || target.is_terminal() || target > current {
            tracing::debug!(?current, ?target, "Refusing back-navigation");
            return false;
        }
        tracing::debug!(from = ?current, to = ?target, "Going back");
        self.state.step = target;
        true
    }

    /// Start over with an empty transcript. Searches still in flight are
    /// left to finish and their results are discarded.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.loading = false;
        self.state = WizardState::default();
        self.log.reset();
        self.log.append_bot(ContentBlock::text(RESTART_TEXT));
        self.log.append_bot(ContentBlock::text(APPLIANCE_PROMPT));
        tracing::debug!(generation = self.generation, "Conversation reset");
    }

    /// The request the current answers would produce
    pub fn search_request(&self) -> SearchRequest {
        SearchRequest {
            brand: self.state.brand.clone(),
            model: self.state.model.clone(),
            appliance_type: self
                .state
                .appliance_type
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            brand_for_brand: self.state.brand_for_brand,
            dollar_limit: self.state.dollar_limit,
        }
    }

    /// Apply a finished search. Returns `false` when the completion belongs
    /// to an earlier generation or no search is pending.
    pub fn complete_search(&mut self, completion: SearchCompletion) -> bool {
        if completion.generation != self.generation || !self.loading {
            tracing::debug!(
                completion = completion.generation,
                current = self.generation,
                "Discarding stale search result"
            );
            return false;
        }
        self.loading = false;

        match completion.outcome {
            Ok(response) if response.success => {
                let blocks = format_results(&response);
                tracing::info!(
                    replacements = response.replacements().len(),
                    blocks = blocks.len(),
                    "Search completed"
                );
                for block in blocks {
                    self.log.append_bot(block);
                }
            }
            Ok(response) => {
                let message = response
                    .error
                    .unwrap_or_else(|| "Unknown error".to_string());
                tracing::info!(
                    error = %message,
                    stage = ?response.stage,
                    "Search service reported failure"
                );
                self.log.append_bot(ContentBlock::error(ErrorKind::Application, message));
            }
            Err(err) => {
                tracing::warn!(error = %err, kind = ?err.kind, "Search request failed");
                self.log.append_bot(ContentBlock::error(
                    ErrorKind::Connectivity,
                    CONNECTION_ERROR_TEXT,
                ));
            }
        }
        true
    }

    fn advance(&mut self, prompt: &str) -> Submission {
        let Some(next) = self.state.step.next() else {
            return Submission::Rejected;
        };
        tracing::debug!(from = ?self.state.step, to = ?next, "Step accepted");
        self.state.step = next;
        self.log.append_bot(ContentBlock::text(prompt));
        Submission::Advanced(next)
    }

    fn begin_search(&mut self) -> Submission {
        self.state.step = WizardStep::Results;
        self.log.append_bot(ContentBlock::text(SEARCHING_TEXT));
        self.loading = true;

        let request = self.search_request();
        tracing::info!(
            generation = self.generation,
            appliance_type = %request.appliance_type,
            brand = %request.brand,
            model = %request.model,
            "Starting replacement search"
        );
        Submission::SearchStarted(PendingSearch {
            generation: self.generation,
            request,
        })
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

fn reject(step: WizardStep) -> Submission {
    tracing::debug!(?step, "Rejected invalid input");
    Submission::Rejected
}

fn budget_text(limit: Option<f64>) -> String {
    match limit {
        Some(amount) => format!("Budget limit: ${}", amount),
        None => "Budget limit: No limit".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::MockSearchGateway;
    use crate::state::Author;

    fn last_text(conversation: &Conversation) -> String {
        conversation
            .messages()
            .last()
            .map(|m| m.content.to_lines().join("\n"))
            .unwrap_or_default()
    }

    fn answered_through_brand_for_brand() -> Conversation {
        let mut conversation = Conversation::new();
        conversation.submit(StepInput::ApplianceType("range".into()));
        conversation.submit(StepInput::Brand("GE".into()));
        conversation.submit(StepInput::Model("JGB735".into()));
        conversation.submit(StepInput::BrandForBrand(false));
        conversation
    }

    #[test]
    fn starts_with_three_greetings() {
        let conversation = Conversation::new();
        assert_eq!(conversation.messages().len(), 3);
        assert!(conversation.messages().iter().all(|m| m.author == Author::Bot));
        assert_eq!(conversation.step(), WizardStep::ApplianceType);
    }

    #[test]
    fn appliance_type_echoes_and_prompts_for_brand() {
        let mut conversation = Conversation::new();
        let before = conversation.messages().len();

        let result = conversation.submit(StepInput::ApplianceType("range".into()));

        assert_eq!(result, Submission::Advanced(WizardStep::Brand));
        let added = &conversation.messages()[before..];
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].author, Author::User);
        assert_eq!(added[0].content, ContentBlock::text("Appliance Type: Range"));
        assert_eq!(added[1].author, Author::Bot);
        assert_eq!(added[1].content, ContentBlock::text(BRAND_PROMPT));
        assert_eq!(conversation.state().appliance_type, Some(ApplianceType::Range));
    }

    #[test]
    fn invalid_input_changes_nothing_at_every_step() {
        let cases: Vec<(Conversation, StepInput)> = vec![
            (Conversation::new(), StepInput::ApplianceType("toaster".into())),
            (Conversation::new(), StepInput::ApplianceType("".into())),
            (
                {
                    let mut c = Conversation::new();
                    c.submit(StepInput::ApplianceType("range".into()));
                    c
                },
                StepInput::Brand("   ".into()),
            ),
            (
                {
                    let mut c = Conversation::new();
                    c.submit(StepInput::ApplianceType("range".into()));
                    c.submit(StepInput::Brand("GE".into()));
                    c
                },
                StepInput::Model("  ".into()),
            ),
            (answered_through_brand_for_brand(), StepInput::DollarLimit(Some(-1.0))),
            (answered_through_brand_for_brand(), StepInput::DollarLimit(Some(f64::NAN))),
        ];

        for (mut conversation, input) in cases {
            let state_before = conversation.state().clone();
            let messages_before = conversation.messages().len();

            assert_eq!(conversation.submit(input.clone()), Submission::Rejected, "{:?}", input);
            assert_eq!(conversation.state(), &state_before);
            assert_eq!(conversation.messages().len(), messages_before);
            assert!(!conversation.is_loading());
        }
    }

    #[test]
    fn empty_model_keeps_model_step() {
        let mut conversation = Conversation::new();
        conversation.submit(StepInput::ApplianceType("range".into()));
        conversation.submit(StepInput::Brand("GE".into()));

        conversation.submit(StepInput::Model(String::new()));

        assert_eq!(conversation.step(), WizardStep::Model);
    }

    #[test]
    fn input_for_another_step_is_rejected() {
        let mut conversation = Conversation::new();
        assert_eq!(
            conversation.submit(StepInput::Brand("GE".into())),
            Submission::Rejected
        );
        assert_eq!(conversation.step(), WizardStep::ApplianceType);
        assert!(conversation.state().brand.is_empty());
    }

    #[test]
    fn brand_and_model_are_trimmed() {
        let mut conversation = Conversation::new();
        conversation.submit(StepInput::ApplianceType("dishwasher".into()));
        conversation.submit(StepInput::Brand("  Bosch ".into()));
        conversation.submit(StepInput::Model(" SHX878 ".into()));

        assert_eq!(conversation.state().brand, "Bosch");
        assert_eq!(conversation.state().model, "SHX878");
    }

    #[test]
    fn budget_echo_text() {
        let mut with_limit = answered_through_brand_for_brand();
        with_limit.submit(StepInput::DollarLimit(Some(2000.0)));
        let user_echo = &with_limit.messages()[with_limit.messages().len() - 2];
        assert_eq!(user_echo.content, ContentBlock::text("Budget limit: $2000"));

        let mut without_limit = answered_through_brand_for_brand();
        without_limit.submit(StepInput::DollarLimit(None));
        let user_echo = &without_limit.messages()[without_limit.messages().len() - 2];
        assert_eq!(user_echo.content, ContentBlock::text("Budget limit: No limit"));
    }

    #[test]
    fn last_answer_starts_search_with_collected_request() {
        let mut conversation = answered_through_brand_for_brand();

        let submission = conversation.submit(StepInput::DollarLimit(None));

        let Submission::SearchStarted(pending) = submission else {
            panic!("expected search to start, got {:?}", submission);
        };
        assert_eq!(
            pending.request,
            SearchRequest {
                brand: "GE".into(),
                model: "JGB735".into(),
                appliance_type: "range".into(),
                brand_for_brand: false,
                dollar_limit: None,
            }
        );
        assert_eq!(conversation.step(), WizardStep::Results);
        assert!(conversation.is_loading());
        assert_eq!(last_text(&conversation), SEARCHING_TEXT);
    }

    #[test]
    fn no_second_search_while_one_is_pending() {
        let mut conversation = answered_through_brand_for_brand();
        conversation.submit(StepInput::DollarLimit(None));
        let messages = conversation.messages().len();

        assert_eq!(
            conversation.submit(StepInput::DollarLimit(Some(10.0))),
            Submission::Rejected
        );
        assert!(!conversation.go_back(WizardStep::DollarLimit));
        assert_eq!(conversation.messages().len(), messages);
    }

    #[test]
    fn go_back_keeps_later_answers_and_transcript() {
        let mut conversation = answered_through_brand_for_brand();
        let messages = conversation.messages().len();

        assert!(conversation.go_back(WizardStep::Brand));

        assert_eq!(conversation.step(), WizardStep::Brand);
        assert_eq!(conversation.state().model, "JGB735");
        assert!(!conversation.state().brand_for_brand);
        assert_eq!(conversation.messages().len(), messages);

        // Re-answering appends rather than replacing; the model answer stays stale.
        conversation.submit(StepInput::Brand("Whirlpool".into()));
        assert_eq!(conversation.messages().len(), messages + 2);
        assert_eq!(conversation.step(), WizardStep::Model);
        assert_eq!(conversation.state().brand, "Whirlpool");
        assert_eq!(conversation.state().model, "JGB735");
    }

    #[test]
    fn go_back_cannot_jump_forward_or_leave_results() {
        let mut conversation = Conversation::new();
        conversation.submit(StepInput::ApplianceType("range".into()));

        assert!(!conversation.go_back(WizardStep::Model));
        assert!(!conversation.go_back(WizardStep::Results));
        assert!(conversation.go_back(WizardStep::Brand));
        assert!(conversation.go_back(WizardStep::ApplianceType));
        assert_eq!(conversation.step(), WizardStep::ApplianceType);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut conversation = answered_through_brand_for_brand();

        conversation.reset();
        let first: Vec<ContentBlock> =
            conversation.messages().iter().map(|m| m.content.clone()).collect();
        let first_state = conversation.state().clone();
        conversation.reset();
        let second: Vec<ContentBlock> =
            conversation.messages().iter().map(|m| m.content.clone()).collect();

        assert_eq!(
            first,
            vec![ContentBlock::text(RESTART_TEXT), ContentBlock::text(APPLIANCE_PROMPT)]
        );
        assert_eq!(first, second);
        assert_eq!(first_state, WizardState::default());
        assert_eq!(conversation.state(), &WizardState::default());
    }

    #[test]
    fn stale_completion_after_reset_is_discarded() {
        let mut conversation = answered_through_brand_for_brand();
        let Submission::SearchStarted(pending) = conversation.submit(StepInput::DollarLimit(None))
        else {
            panic!("expected search to start");
        };

        conversation.reset();
        let applied = conversation.complete_search(SearchCompletion {
            generation: pending.generation,
            outcome: Err(GatewayError::network("late")),
        });

        assert!(!applied);
        assert_eq!(conversation.messages().len(), 2);
        assert!(!conversation.is_loading());
    }

    #[test]
    fn completion_is_applied_once() {
        let mut conversation = answered_through_brand_for_brand();
        let Submission::SearchStarted(pending) = conversation.submit(StepInput::DollarLimit(None))
        else {
            panic!("expected search to start");
        };
        let completion = SearchCompletion {
            generation: pending.generation,
            outcome: Err(GatewayError::network("refused")),
        };

        assert!(conversation.complete_search(completion.clone()));
        let messages = conversation.messages().len();
        assert!(!conversation.complete_search(completion));
        assert_eq!(conversation.messages().len(), messages);
    }

    #[tokio::test]
    async fn transport_failure_appends_connection_error() {
        let gateway = MockSearchGateway::new();
        gateway.queue_error(GatewayError::network("connection refused"));
        let mut conversation = answered_through_brand_for_brand();
        let before = conversation.messages().len();

        conversation
            .submit_and_search(StepInput::DollarLimit(None), &gateway)
            .await;

        // user echo + searching + error
        assert_eq!(conversation.messages().len(), before + 3);
        assert_eq!(
            conversation.messages().last().map(|m| m.content.clone()),
            Some(ContentBlock::error(ErrorKind::Connectivity, CONNECTION_ERROR_TEXT))
        );
        assert!(!conversation.is_loading());
        assert_eq!(conversation.step(), WizardStep::Results);
    }

    #[test]
    fn subscribers_follow_the_conversation() {
        use std::sync::{Arc, Mutex};

        let mut conversation = Conversation::new();
        let appended = Arc::new(Mutex::new(0usize));
        let sink = appended.clone();
        let _subscription = conversation.subscribe(move |event| {
            if let LogEvent::Appended(_) = event {
                *sink.lock().unwrap() += 1;
            }
        });

        conversation.submit(StepInput::ApplianceType("microwave".into()));
        conversation.reset();

        assert_eq!(*appended.lock().unwrap(), 4);
    }
}

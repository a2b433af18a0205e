pub mod config;
pub mod content;
pub mod conversation;
pub mod formatter;
pub mod gateway;
pub mod observer;
pub mod state;
pub mod transcript;

// Re-export main types for convenience
pub use config::Config;
pub use content::{AvailabilityBadge, ContentBlock, ErrorKind};
pub use conversation::{Conversation, PendingSearch, SearchCompletion, StepInput, Submission};
pub use formatter::format_results;
pub use gateway::{GatewayError, GatewayErrorKind, HttpSearchClient, SearchGateway};
pub use gateway::{SearchRequest, SearchResponse};
pub use observer::Subscription;
pub use state::{ApplianceType, Author, ChatMessage, WizardState, WizardStep};
pub use transcript::{LogEvent, MessageLog};

//! Non-interactive rendering for the `search` subcommand
//!
//! Drives a [`Conversation`] with answers taken from the command line and
//! streams each transcript entry to a writer as it is appended.

use std::io::Write;

use anyhow::{bail, Result};
use appliance_core::{
    Author, ChatMessage, ContentBlock, Conversation, LogEvent, SearchGateway, StepInput, Submission,
};

/// Answers for every question, as given on the command line
#[derive(Debug, Clone)]
pub struct SearchAnswers {
    pub appliance_type: String,
    pub brand: String,
    pub model: String,
    pub brand_for_brand: bool,
    pub dollar_limit: Option<f64>,
}

impl SearchAnswers {
    fn into_inputs(self) -> Vec<StepInput> {
        vec![
            StepInput::ApplianceType(self.appliance_type),
            StepInput::Brand(self.brand),
            StepInput::Model(self.model),
            StepInput::BrandForBrand(self.brand_for_brand),
            StepInput::DollarLimit(self.dollar_limit),
        ]
    }
}

pub fn format_message(message: &ChatMessage) -> String {
    let who = match message.author {
        Author::User => "You",
        Author::Bot => "Assistant",
    };
    let lines = message.content.to_lines();
    let mut out = format!("{}:", who);
    for line in lines {
        out.push_str("\n  ");
        out.push_str(&line);
    }
    out
}

/// Answer every question in order, run the search and write the transcript.
///
/// Fails when an answer is refused or the search ends in an error block.
pub async fn run_search<G, W>(
    gateway: &G,
    answers: SearchAnswers,
    mut out: W,
) -> Result<Conversation>
where
    G: SearchGateway + ?Sized,
    W: Write + Send + 'static,
{
    let mut conversation = Conversation::new();
    for message in conversation.messages() {
        writeln!(out, "{}\n", format_message(message))?;
    }

    let _subscription = conversation.subscribe(move |event| {
        if let LogEvent::Appended(message) = event {
            // stdout going away mid-run is not worth aborting over
            let _ = writeln!(out, "{}\n", format_message(message));
        }
    });

    for input in answers.into_inputs() {
        let step = input.step();
        if let Submission::Rejected = conversation.submit_and_search(input.clone(), gateway).await {
            bail!("Invalid answer for \"{}\": {:?}", step.label(), input);
        }
    }

    let failed = matches!(
        conversation.messages().last().map(|m| &m.content),
        Some(ContentBlock::Error { .. })
    );
    if failed {
        bail!("Search did not complete");
    }

    Ok(conversation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use appliance_core::gateway::testing::MockSearchGateway;
    use appliance_core::{GatewayError, SearchResponse, WizardStep};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn answers(appliance_type: &str) -> SearchAnswers {
        SearchAnswers {
            appliance_type: appliance_type.to_string(),
            brand: "GE".to_string(),
            model: "JGB735".to_string(),
            brand_for_brand: false,
            dollar_limit: Some(2000.0),
        }
    }

    #[test]
    fn formats_author_and_indented_lines() {
        let message = ChatMessage::new(Author::Bot, ContentBlock::text("one\ntwo"));
        assert_eq!(format_message(&message), "Assistant:\n  one\n  two");
    }

    #[tokio::test]
    async fn writes_the_whole_transcript() {
        let gateway = MockSearchGateway::new();
        gateway.queue_response(
            serde_json::from_value::<SearchResponse>(serde_json::json!({
                "success": true,
                "replacements": []
            }))
            .unwrap(),
        );
        let buf = SharedBuf::default();

        let conversation = run_search(&gateway, answers("Range"), buf.clone()).await.unwrap();

        assert_eq!(conversation.step(), WizardStep::Results);
        let text = buf.contents();
        assert!(text.starts_with("Assistant:\n  Hello! I'm your Appliance Research Assistant."));
        assert!(text.contains("You:\n  Appliance Type: Range"));
        assert!(text.contains("You:\n  Budget limit: $2000"));
        assert!(text.contains("No replacement products found matching your criteria."));
    }

    #[tokio::test]
    async fn unknown_appliance_is_refused() {
        let gateway = MockSearchGateway::new();
        let err = run_search(&gateway, answers("toaster"), SharedBuf::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("toaster"));
        assert!(gateway.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn connection_failure_is_an_error() {
        let gateway = MockSearchGateway::new();
        gateway.queue_error(GatewayError::network("connection refused"));
        let buf = SharedBuf::default();

        let result = run_search(&gateway, answers("range"), buf.clone()).await;

        assert!(result.is_err());
        assert!(buf.contents().contains("Connection Error: Could not connect to the server."));
    }
}

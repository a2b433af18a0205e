//! Property-based tests for the conversation controller

use super::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Answer {
        appliance: ApplianceType,
        brand: String,
        model: String,
        same_brand: bool,
        limit: Option<u32>,
    },
    Back(WizardStep),
    Garbage(String),
}

fn arb_appliance() -> impl Strategy<Value = ApplianceType> {
    prop_oneof![
        Just(ApplianceType::Range),
        Just(ApplianceType::Dishwasher),
        Just(ApplianceType::Refrigerator),
        Just(ApplianceType::Microwave),
    ]
}

fn arb_step() -> impl Strategy<Value = WizardStep> {
    prop_oneof![
        Just(WizardStep::ApplianceType),
        Just(WizardStep::Brand),
        Just(WizardStep::Model),
        Just(WizardStep::BrandForBrand),
        Just(WizardStep::DollarLimit),
        Just(WizardStep::Results),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (
            arb_appliance(),
            "[A-Za-z]{1,10}",
            "[A-Z0-9]{1,8}",
            any::<bool>(),
            proptest::option::of(0u32..5000),
        )
            .prop_map(|(appliance, brand, model, same_brand, limit)| Op::Answer {
                appliance,
                brand,
                model,
                same_brand,
                limit,
            }),
        2 => arb_step().prop_map(Op::Back),
        1 => "[ ]{0,3}".prop_map(Op::Garbage),
    ]
}

/// Build the input for whichever step is active
fn answer_for(step: WizardStep, op: &Op) -> Option<StepInput> {
    let Op::Answer {
        appliance,
        brand,
        model,
        same_brand,
        limit,
    } = op
    else {
        return None;
    };
    match step {
        WizardStep::ApplianceType => Some(StepInput::ApplianceType(appliance.as_str().to_string())),
        WizardStep::Brand => Some(StepInput::Brand(brand.clone())),
        WizardStep::Model => Some(StepInput::Model(model.clone())),
        WizardStep::BrandForBrand => Some(StepInput::BrandForBrand(*same_brand)),
        WizardStep::DollarLimit => Some(StepInput::DollarLimit(limit.map(f64::from))),
        WizardStep::Results => None,
    }
}

fn garbage_for(step: WizardStep, blank: &str) -> Option<StepInput> {
    match step {
        WizardStep::ApplianceType => Some(StepInput::ApplianceType(blank.to_string())),
        WizardStep::Brand => Some(StepInput::Brand(blank.to_string())),
        WizardStep::Model => Some(StepInput::Model(blank.to_string())),
        WizardStep::DollarLimit => Some(StepInput::DollarLimit(Some(-1.0))),
        WizardStep::BrandForBrand | WizardStep::Results => None,
    }
}

proptest! {
    #[test]
    fn final_answers_are_the_last_accepted_ones(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let mut conversation = Conversation::new();
        let mut expected = WizardState::default();

        for op in &ops {
            match op {
                Op::Back(target) => {
                    if conversation.go_back(*target) {
                        expected.step = *target;
                    }
                }
                Op::Garbage(blank) => {
                    if let Some(input) = garbage_for(conversation.step(), blank) {
                        prop_assert_eq!(conversation.submit(input), Submission::Rejected);
                    }
                }
                Op::Answer { .. } => {
                    let step = conversation.step();
                    let Some(input) = answer_for(step, op) else { continue };
                    match input.clone() {
                        StepInput::ApplianceType(raw) => {
                            expected.appliance_type = ApplianceType::from_str(&raw)
                        }
                        StepInput::Brand(brand) => expected.brand = brand,
                        StepInput::Model(model) => expected.model = model,
                        StepInput::BrandForBrand(same) => expected.brand_for_brand = same,
                        StepInput::DollarLimit(limit) => expected.dollar_limit = limit,
                    }
                    let submission = conversation.submit(input);
                    prop_assert_ne!(submission, Submission::Rejected);
                    expected.step = step.next().unwrap_or(WizardStep::Results);
                }
            }
            prop_assert_eq!(conversation.state(), &expected);
        }
    }

    #[test]
    fn rejected_input_never_touches_the_transcript(
        ops in proptest::collection::vec(arb_op(), 0..30)
    ) {
        let mut conversation = Conversation::new();

        for op in &ops {
            let before = conversation.messages().len();
            let state_before = conversation.state().clone();
            let submission = match op {
                Op::Garbage(blank) => match garbage_for(conversation.step(), blank) {
                    Some(input) => conversation.submit(input),
                    None => continue,
                },
                Op::Answer { .. } => match answer_for(conversation.step(), op) {
                    Some(input) => conversation.submit(input),
                    None => continue,
                },
                Op::Back(target) => {
                    conversation.go_back(*target);
                    prop_assert_eq!(conversation.messages().len(), before);
                    continue;
                }
            };

            if submission == Submission::Rejected {
                prop_assert_eq!(conversation.messages().len(), before);
                prop_assert_eq!(conversation.state(), &state_before);
            } else {
                prop_assert!(conversation.messages().len() >= before + 2);
            }
        }
    }

    #[test]
    fn reset_always_lands_on_the_same_greeting(ops in proptest::collection::vec(arb_op(), 0..20)) {
        let mut conversation = Conversation::new();
        for op in &ops {
            if let Some(input) = answer_for(conversation.step(), op) {
                conversation.submit(input);
            }
        }

        conversation.reset();

        let texts: Vec<String> = conversation
            .messages()
            .iter()
            .map(|m| m.content.to_lines().join("\n"))
            .collect();
        prop_assert_eq!(texts, vec![RESTART_TEXT.to_string(), APPLIANCE_PROMPT.to_string()]);
        prop_assert_eq!(conversation.state(), &WizardState::default());
        prop_assert!(!conversation.is_loading());
    }
}

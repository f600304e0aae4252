//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::backend::{BackendErrorKind, ExecutionResult, Intent, IntentResolution, Parameters};
use crate::conversation::{ConversationStore, Role, Turn, FAILURE_TEXT};
use proptest::prelude::*;
use serde_json::{json, Value};

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new("test-session")
}

/// Drive the pure machine the way the runtime does, minus the I/O
fn apply(
    state: &mut PipelineState,
    store: &mut ConversationStore,
    event: Event,
) -> Result<Vec<Effect>, TransitionError> {
    let result = transition(state, &test_context(), event)?;
    *state = result.new_state;
    for effect in &result.effects {
        if let Effect::AppendTurn { turn } = effect {
            store.append(turn.clone());
        }
    }
    Ok(result.effects)
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        Just(Intent::Unresolved),
        "[a-z_]{1,16}".prop_map(Intent::Named),
    ]
}

fn arb_entities() -> impl Strategy<Value = Parameters> {
    proptest::collection::btree_map("[a-z]{1,8}", "[A-Za-z ]{0,12}", 0..4).prop_map(|m| {
        m.into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect()
    })
}

fn arb_resolution() -> impl Strategy<Value = IntentResolution> {
    (
        arb_intent(),
        0.0f64..=1.0,
        arb_entities(),
        proptest::collection::vec("[a-z]{1,8}", 0..4),
    )
        .prop_map(|(intent, confidence, entities, matched_keywords)| IntentResolution {
            intent,
            confidence,
            entities,
            matched_keywords,
        })
}

fn arb_error_kind() -> impl Strategy<Value = BackendErrorKind> {
    prop_oneof![
        Just(BackendErrorKind::Transport),
        Just(BackendErrorKind::MalformedResponse),
    ]
}

fn arb_busy_state() -> impl Strategy<Value = PipelineState> {
    prop_oneof![
        Just(PipelineState::Resolving),
        arb_resolution().prop_map(|resolution| PipelineState::Executing { resolution }),
    ]
}

fn arb_state() -> impl Strategy<Value = PipelineState> {
    prop_oneof![Just(PipelineState::Idle), arb_busy_state()]
}

fn arb_result() -> impl Strategy<Value = ExecutionResult> {
    prop_oneof![
        Just(json!(null)),
        Just(json!({ "flights": [] })),
        "[a-z ]{0,20}".prop_map(Value::String),
        proptest::collection::vec(0i64..100, 0..5).prop_map(|v| json!({ "ids": v })),
    ]
    .prop_map(|result| ExecutionResult { result })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[ a-zA-Z]{0,20}".prop_map(|text| Event::UserSubmit { text }),
        arb_resolution().prop_map(|resolution| Event::IntentResolved { resolution }),
        arb_result().prop_map(|result| Event::CommandExecuted { result }),
        (
            prop_oneof![Just(Stage::Resolve), Just(Stage::Execute)],
            arb_error_kind()
        )
            .prop_map(|(stage, error_kind)| Event::StageFailed {
                stage,
                error_kind,
                message: "boom".to_string(),
            }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn busy_states_reject_submissions(state in arb_busy_state(), text in ".*") {
        let result = transition(&state, &test_context(), Event::UserSubmit { text });
        prop_assert_eq!(result.unwrap_err(), TransitionError::Busy);
    }

    #[test]
    fn whitespace_never_starts_a_run(text in "[ \t\r\n]{0,10}") {
        let result = transition(&PipelineState::Idle, &test_context(), Event::UserSubmit { text });
        prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyInput);
    }

    #[test]
    fn accepted_submission_appends_before_resolving(text in "[ ]{0,3}[a-zA-Z][a-zA-Z ]{0,20}") {
        let result = transition(
            &PipelineState::Idle,
            &test_context(),
            Event::UserSubmit { text: text.clone() },
        ).unwrap();

        prop_assert_eq!(result.new_state, PipelineState::Resolving);
        prop_assert_eq!(result.effects, vec![
            Effect::append(Turn::user(text.trim())),
            Effect::ResolveIntent { text: text.trim().to_string() },
        ]);
    }

    #[test]
    fn failure_yields_exactly_one_plain_turn(state in arb_busy_state(), kind in arb_error_kind()) {
        let stage = match state {
            PipelineState::Executing { .. } => Stage::Execute,
            _ => Stage::Resolve,
        };
        let result = transition(&state, &test_context(), Event::StageFailed {
            stage,
            error_kind: kind,
            message: "detail that must not leak".to_string(),
        }).unwrap();

        prop_assert_eq!(result.new_state, PipelineState::Idle);
        prop_assert_eq!(result.effects, vec![Effect::append(Turn::assistant(FAILURE_TEXT))]);
    }

    #[test]
    fn execute_only_follows_a_resolution(state in arb_state(), event in arb_event()) {
        let was_resolving = state == PipelineState::Resolving;
        let is_resolution = matches!(event, Event::IntentResolved { .. });

        if let Ok(result) = transition(&state, &test_context(), event) {
            let executes = result
                .effects
                .iter()
                .any(|e| matches!(e, Effect::ExecuteCommand { .. }));
            if executes {
                prop_assert!(was_resolving && is_resolution);
            }
        }
    }

    #[test]
    fn submissions_are_gated_by_busy_flag_and_content(state in arb_state(), text in "[ a-z]{0,6}") {
        let result = transition(&state, &test_context(), Event::UserSubmit { text: text.clone() });
        match (state.is_busy(), text.trim().is_empty()) {
            (true, _) => {
                prop_assert_eq!(result.unwrap_err(), TransitionError::Busy);
            }
            (false, true) => {
                prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyInput);
            }
            (false, false) => {
                prop_assert!(result.unwrap().new_state.is_busy());
            }
        }
    }

    #[test]
    fn store_is_append_only(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut state = PipelineState::Idle;
        let mut store = ConversationStore::seeded("hello");
        let mut previous: Vec<Turn> = store.all().to_vec();

        for event in events {
            let _ = apply(&mut state, &mut store, event);
            let current = store.all();
            prop_assert!(current.len() >= previous.len());
            prop_assert_eq!(&current[..previous.len()], previous.as_slice());
            previous = current.to_vec();
        }
    }

    #[test]
    fn every_run_ends_with_one_assistant_turn(
        text in "[a-zA-Z][a-zA-Z ]{0,20}",
        resolution in arb_resolution(),
        result in arb_result(),
        fail_at in prop_oneof![Just(None), Just(Some(Stage::Resolve)), Just(Some(Stage::Execute))],
        kind in arb_error_kind(),
    ) {
        let mut state = PipelineState::Idle;
        let mut store = ConversationStore::seeded("hello");

        apply(&mut state, &mut store, Event::UserSubmit { text }).unwrap();
        let failure = |stage| Event::StageFailed { stage, error_kind: kind, message: String::new() };

        if fail_at == Some(Stage::Resolve) {
            apply(&mut state, &mut store, failure(Stage::Resolve)).unwrap();
        } else {
            apply(&mut state, &mut store, Event::IntentResolved { resolution }).unwrap();
            if fail_at == Some(Stage::Execute) {
                apply(&mut state, &mut store, failure(Stage::Execute)).unwrap();
            } else {
                apply(&mut state, &mut store, Event::CommandExecuted { result }).unwrap();
            }
        }

        prop_assert_eq!(state, PipelineState::Idle);
        prop_assert_eq!(store.len(), 3);
        let last = &store.all()[2];
        prop_assert_eq!(last.role, Role::Assistant);
        prop_assert_eq!(last.annotation.is_some(), fail_at.is_none());
        if fail_at.is_some() {
            prop_assert_eq!(last.text.as_str(), FAILURE_TEXT);
        }
    }
}

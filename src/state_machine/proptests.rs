//! Property-based tests for the handoff state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::helpdesk::{ConversationStatus, ListedMessage, SenderRole};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> HandoffContext {
    HandoffContext::default()
}

fn appended(result: &TransitionResult) -> Vec<TimelineEntry> {
    result.effects.iter().filter_map(Effect::entry).cloned().collect()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_sender_role() -> impl Strategy<Value = SenderRole> {
    prop_oneof![
        3 => Just(SenderRole::Agent),
        1 => Just(SenderRole::Contact),
        1 => Just(SenderRole::Other("agent_bot".to_string())),
    ]
}

fn arb_agent_name() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        4 => prop_oneof![Just("Sam"), Just("Riley"), Just("Kai")].prop_map(|n| Some(n.to_string())),
        1 => Just(None),
    ]
}

fn arb_listed_message() -> impl Strategy<Value = ListedMessage> {
    (0u64..50, arb_sender_role(), arb_agent_name(), "[a-z ]{0,12}").prop_map(
        |(id, sender_role, sender_name, content)| ListedMessage {
            id,
            sender_role,
            sender_name,
            content,
        },
    )
}

fn arb_listing() -> impl Strategy<Value = Vec<ListedMessage>> {
    proptest::collection::vec(arb_listed_message(), 0..12)
}

fn arb_active_session() -> impl Strategy<Value = Session> {
    (proptest::option::of(0u64..50), arb_agent_name()).prop_map(|(marker, name)| {
        let mut session = Session::new("contact-1").with_conversation("conv-1");
        session.last_agent_marker = marker;
        session.last_announced_agent_name = name;
        session
    })
}

fn arb_status() -> impl Strategy<Value = ConversationStatus> {
    prop_oneof![
        Just(ConversationStatus::Open),
        Just(ConversationStatus::Resolved),
        Just(ConversationStatus::Other("pending".to_string())),
        Just(ConversationStatus::Other("snoozed".to_string())),
    ]
}

/// Text that cannot contain any default trigger word: every one of them has an `a`
fn arb_plain_text() -> impl Strategy<Value = String> {
    "[b-z ]{0,40}"
}

fn arb_trigger_text() -> impl Strategy<Value = String> {
    (
        "[b-z ]{0,10}",
        prop_oneof![
            Just("human"),
            Just("agent"),
            Just("representative"),
            Just("operator")
        ],
        any::<bool>(),
        "[b-z ]{0,10}",
    )
        .prop_map(|(prefix, word, upper, suffix)| {
            let word = if upper {
                word.to_uppercase()
            } else {
                word.to_string()
            };
            format!("{prefix}{word}{suffix}")
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    // Invariant 1: no session + non-trigger text → automated reply, no session
    #[test]
    fn prop_plain_text_never_creates_session(text in arb_plain_text()) {
        let result = transition(None, &test_context(), Event::UserMessage { text: text.clone() })
            .unwrap();

        prop_assert!(result.session.is_none());
        prop_assert_eq!(result.effects, vec![Effect::RequestAutoReply { text }]);
    }

    // Invariant 2: trigger words fire regardless of case
    #[test]
    fn prop_trigger_detected_case_insensitively(text in arb_trigger_text()) {
        let result = transition(None, &test_context(), Event::UserMessage { text: text.clone() })
            .unwrap();

        prop_assert_eq!(
            result.effects,
            vec![Effect::forward(text, HandoffNotice::Connecting)]
        );
    }

    // Invariant 3: an open conversation forwards everything, never re-announcing the handoff
    #[test]
    fn prop_active_session_always_forwards(
        session in arb_active_session(),
        text in prop_oneof![arb_plain_text(), arb_trigger_text()]
    ) {
        let result = transition(Some(&session), &test_context(), Event::UserMessage { text: text.clone() })
            .unwrap();

        prop_assert_eq!(result.session, Some(session));
        prop_assert_eq!(
            result.effects,
            vec![Effect::forward(text, HandoffNotice::Forwarded)]
        );
    }

    // Invariant 4: the agent marker never decreases
    #[test]
    fn prop_marker_monotonic(session in arb_active_session(), listing in arb_listing()) {
        let result = transition(
            Some(&session),
            &test_context(),
            Event::AgentMessagesListed { messages: listing },
        )
        .unwrap();

        let next = result.session.unwrap();
        if let Some(before) = session.last_agent_marker {
            prop_assert!(next.last_agent_marker.is_some_and(|after| after >= before));
        }
    }

    // Invariant 5: re-applying an unchanged listing appends nothing
    #[test]
    fn prop_reconcile_idempotent(session in arb_active_session(), listing in arb_listing()) {
        let first = transition(
            Some(&session),
            &test_context(),
            Event::AgentMessagesListed { messages: listing.clone() },
        )
        .unwrap();
        let after_first = first.session.clone();

        let second = transition(
            after_first.as_ref(),
            &test_context(),
            Event::AgentMessagesListed { messages: listing },
        )
        .unwrap();

        prop_assert!(appended(&second).is_empty());
        prop_assert_eq!(second.session, after_first);
    }

    // Invariant 6: merged agent messages appear in ascending id order, only from agents
    #[test]
    fn prop_merged_in_id_order(listing in arb_listing()) {
        let listing: Vec<ListedMessage> = listing
            .into_iter()
            .map(|mut m| {
                m.content = m.id.to_string();
                m
            })
            .collect();
        let session = Session::new("contact-1").with_conversation("conv-1");

        let result = transition(
            Some(&session),
            &test_context(),
            Event::AgentMessagesListed { messages: listing.clone() },
        )
        .unwrap();

        let merged: Vec<u64> = appended(&result)
            .iter()
            .filter(|e| e.origin == Origin::Agent)
            .map(|e| e.text.parse().unwrap())
            .collect();

        let mut expected: Vec<u64> = listing
            .iter()
            .filter(|m| m.sender_role.is_agent())
            .map(|m| m.id)
            .collect();
        expected.sort_unstable();
        expected.dedup();

        prop_assert_eq!(merged, expected);
    }

    // Invariant 7: every "joined" notice directly precedes an agent message and names a new agent
    #[test]
    fn prop_joined_precedes_agent_message(session in arb_active_session(), listing in arb_listing()) {
        let result = transition(
            Some(&session),
            &test_context(),
            Event::AgentMessagesListed { messages: listing },
        )
        .unwrap();

        let entries = appended(&result);
        let mut announced = session.last_announced_agent_name.clone();
        for (i, entry) in entries.iter().enumerate() {
            if entry.origin == Origin::System {
                prop_assert!(entries.get(i + 1).is_some_and(|next| next.origin == Origin::Agent));
                let name = entry
                    .text
                    .strip_prefix("Agent ")
                    .and_then(|rest| rest.strip_suffix(" has joined the conversation."))
                    .map(str::to_string);
                prop_assert!(name.is_some());
                prop_assert_ne!(&name, &announced);
                announced = name;
            }
        }
        prop_assert_eq!(result.session.unwrap().last_announced_agent_name, announced);
    }

    // Invariant 8: resolution is reported exactly once, however often it is observed
    #[test]
    fn prop_resolution_reported_once(session in arb_active_session(), repeats in 1usize..4) {
        let mut current = Some(session);
        let mut notices = 0;

        for _ in 0..=repeats {
            let result = transition(
                current.as_ref(),
                &test_context(),
                Event::StatusObserved { status: ConversationStatus::Resolved },
            )
            .unwrap();
            notices += appended(&result).len();
            current = result.session;
        }

        prop_assert_eq!(notices, 1);
        prop_assert!(current.is_none());
    }

    // Invariant 9: only a resolved status ends the session
    #[test]
    fn prop_only_resolved_ends_session(session in arb_active_session(), status in arb_status()) {
        let resolved = status.is_resolved();
        let result = transition(
            Some(&session),
            &test_context(),
            Event::StatusObserved { status },
        )
        .unwrap();

        prop_assert_eq!(result.session.is_none(), resolved);
    }

    // Invariant 10: observations without an open conversation change nothing
    #[test]
    fn prop_observations_without_conversation_are_noops(
        listing in arb_listing(),
        status in arb_status(),
        has_contact in any::<bool>()
    ) {
        let session = has_contact.then(|| Session::new("contact-1"));

        for event in [
            Event::AgentMessagesListed { messages: listing },
            Event::StatusObserved { status },
        ] {
            let result = transition(session.as_ref(), &test_context(), event).unwrap();
            prop_assert!(result.effects.is_empty());
            prop_assert_eq!(&result.session, &session);
        }
    }
}

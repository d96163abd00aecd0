//! Property-based tests for the conversation store and dispatcher
//!
//! These drive random sequences of draft edits, submissions and settlements
//! through the two-phase API and check that:
//! - the busy flag is set exactly while an exchange is in flight
//! - blank drafts never start an exchange
//! - every settled exchange adds exactly two messages

use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;

use crate::backend::{Answer, ChatBackend};
use crate::dispatcher::{settle, Dispatcher, Exchange, Outcome};
use crate::error::ChatError;
use crate::state::{ChatRole, ConversationStore};

struct NeverCalled;

#[async_trait]
impl ChatBackend for NeverCalled {
    async fn ask(&self, _prompt: &str) -> Result<Answer, ChatError> {
        unreachable!("exchanges are settled directly in these tests")
    }
}

#[derive(Debug, Clone)]
enum Op {
    SetDraft(String),
    Submit,
    Settle(Outcome),
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        "[a-zA-Z0-9 .!?]{0,40}".prop_map(|s| Ok(Answer(s))),
        "[a-zA-Z ]{1,30}".prop_map(|s| Err(ChatError::Transport(s))),
        (400u16..600, "[a-z ]{0,20}")
            .prop_map(|(status, detail)| Err(ChatError::Server { status, detail })),
        "[a-z ]{1,20}".prop_map(|s| Err(ChatError::Malformed(s))),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[ a-z\\t]{0,12}".prop_map(Op::SetDraft),
        Just(Op::Submit),
        arb_outcome().prop_map(Op::Settle),
    ]
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(NeverCalled))
}

proptest! {
    #[test]
    fn busy_flag_tracks_in_flight_exchange(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let dispatcher = dispatcher();
        let mut store = ConversationStore::default();
        let mut in_flight: Option<Exchange> = None;
        let mut settled = 0usize;

        for op in ops {
            match op {
                Op::SetDraft(text) => store.set_draft(text),
                Op::Submit => {
                    let was_busy = store.is_busy();
                    let could_submit = store.can_submit();
                    let started = dispatcher.begin(&mut store);
                    prop_assert_eq!(started.is_some(), could_submit);
                    if let Some(exchange) = started {
                        prop_assert!(!was_busy);
                        prop_assert!(in_flight.is_none());
                        in_flight = Some(exchange);
                    }
                }
                Op::Settle(outcome) => {
                    if in_flight.take().is_some() {
                        settle(&mut store, &outcome);
                        settled += 1;
                        let last = store.messages().last().unwrap();
                        prop_assert_eq!(last.role(), ChatRole::Assistant);
                        prop_assert_eq!(last.is_failure(), outcome.is_err());
                    }
                }
            }
            prop_assert_eq!(store.is_busy(), in_flight.is_some());
        }

        let expected = 1 + 2 * settled + usize::from(in_flight.is_some());
        prop_assert_eq!(store.messages().len(), expected);
    }

    #[test]
    fn blank_drafts_never_start_an_exchange(draft in "[ \\t\\n\\r]{0,16}") {
        let dispatcher = dispatcher();
        let mut store = ConversationStore::default();
        store.set_draft(draft.clone());

        prop_assert!(dispatcher.begin(&mut store).is_none());
        prop_assert_eq!(store.messages().len(), 1);
        prop_assert_eq!(store.draft(), draft.as_str());
        prop_assert!(!store.is_busy());
    }

    #[test]
    fn successful_answer_is_recorded_verbatim(prompt in "[a-z]{1,20}", answer in ".{0,60}") {
        let dispatcher = dispatcher();
        let mut store = ConversationStore::default();
        store.set_draft(prompt.clone());

        let exchange = dispatcher.begin(&mut store).unwrap();
        prop_assert_eq!(exchange.prompt(), prompt.as_str());
        settle(&mut store, &Ok(Answer(answer.clone())));

        prop_assert_eq!(store.messages()[1].content(), prompt.as_str());
        prop_assert_eq!(store.messages()[2].content(), answer.as_str());
    }
}

use crate::error::ApiError;
use crate::model::types::{Content, ContentRole};
use crate::web::models::{ChatTurn, Role, MESSAGES_REQUIRED};

/// A client conversation reshaped for the completion API: the replayable
/// history plus the newest user message, which is sent separately.
#[derive(Debug, PartialEq, Eq)]
pub struct Conversation<'a> {
    pub history: Vec<Content>,
    pub latest: &'a str,
}

/// Splits off the newest turn and trims the rest so that it opens on a user
/// turn. Leading assistant turns (the client's greeting, for one) cannot be
/// replayed and are dropped; if no user turn precedes the newest one the
/// history is empty. Turns with blank text are skipped, the provider rejects
/// empty parts.
pub fn adapt(turns: &[ChatTurn]) -> Result<Conversation<'_>, ApiError> {
    let (latest, raw_history) = turns
        .split_last()
        .ok_or_else(|| ApiError::InvalidPayload(MESSAGES_REQUIRED.to_string()))?;

    if latest.role != Role::User {
        return Err(ApiError::LastTurnNotUser);
    }
    if latest.text.trim().is_empty() {
        return Err(ApiError::InvalidPayload("Last message must not be empty".to_string()));
    }

    let history = raw_history
        .iter()
        .filter(|turn| !turn.text.trim().is_empty())
        .skip_while(|turn| turn.role != Role::User)
        .map(|turn| Content::text(content_role(turn.role), turn.text.clone()))
        .collect();

    Ok(Conversation {
        history,
        latest: &latest.text,
    })
}

fn content_role(role: Role) -> ContentRole {
    match role {
        Role::User => ContentRole::User,
        Role::Assistant => ContentRole::Model,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn user(text: &str) -> ChatTurn {
        ChatTurn { role: Role::User, text: text.to_string() }
    }

    fn bot(text: &str) -> ChatTurn {
        ChatTurn { role: Role::Assistant, text: text.to_string() }
    }

    #[test]
    fn greeting_before_first_question_is_dropped() {
        let turns = vec![bot("Hi!"), user("What services?")];
        let conversation = adapt(&turns).unwrap();
        assert!(conversation.history.is_empty());
        assert_eq!(conversation.latest, "What services?");
    }

    #[test]
    fn history_starts_at_first_user_turn() {
        let turns = vec![bot("Hi!"), user("Q1"), bot("A1"), user("Q2")];
        let conversation = adapt(&turns).unwrap();
        assert_eq!(
            conversation.history,
            vec![
                Content::text(ContentRole::User, "Q1"),
                Content::text(ContentRole::Model, "A1"),
            ]
        );
        assert_eq!(conversation.latest, "Q2");
    }

    #[test]
    fn lone_assistant_turn_is_rejected() {
        let turns = vec![bot("Hi!")];
        assert!(matches!(adapt(&turns), Err(ApiError::LastTurnNotUser)));
    }

    #[test]
    fn single_user_turn_has_no_history() {
        let turns = vec![user("Hello")];
        let conversation = adapt(&turns).unwrap();
        assert!(conversation.history.is_empty());
        assert_eq!(conversation.latest, "Hello");
    }

    #[test]
    fn empty_conversation_is_invalid() {
        assert!(matches!(adapt(&[]), Err(ApiError::InvalidPayload(_))));
    }

    #[test]
    fn blank_latest_message_is_invalid() {
        let turns = vec![user("Q1"), bot("A1"), user("  ")];
        assert!(matches!(adapt(&turns), Err(ApiError::InvalidPayload(_))));
    }

    #[test]
    fn empty_earlier_turns_are_not_replayed() {
        let turns = vec![bot("Hi!"), user("Q1"), bot(""), user("Q2"), bot("  "), user("Q3")];
        let conversation = adapt(&turns).unwrap();
        assert_eq!(
            conversation.history,
            vec![
                Content::text(ContentRole::User, "Q1"),
                Content::text(ContentRole::User, "Q2"),
            ]
        );
        assert_eq!(conversation.latest, "Q3");
    }

    #[test]
    fn blank_user_turn_does_not_anchor_history() {
        let turns = vec![user(""), bot("A0"), user("Q1"), user("Q2")];
        let history = adapt(&turns).unwrap().history;
        assert_eq!(history, vec![Content::text(ContentRole::User, "Q1")]);
    }

    #[test]
    fn later_assistant_turns_are_kept() {
        let turns = vec![user("Q1"), bot("A1"), bot("A1 continued"), user("Q2")];
        let conversation = adapt(&turns).unwrap();
        assert_eq!(conversation.history.len(), 3);
        assert_eq!(conversation.history[2], Content::text(ContentRole::Model, "A1 continued"));
    }

    fn arb_turn() -> impl Strategy<Value = ChatTurn> {
        (any::<bool>(), "[a-z ]{0,8}").prop_map(|(is_user, text)| ChatTurn {
            role: if is_user { Role::User } else { Role::Assistant },
            text,
        })
    }

    fn to_turns(history: &[Content]) -> Vec<ChatTurn> {
        history
            .iter()
            .map(|c| ChatTurn {
                role: match c.role {
                    ContentRole::User => Role::User,
                    ContentRole::Model => Role::Assistant,
                },
                text: c.parts[0].text.clone(),
            })
            .collect()
    }

    proptest! {
        #[test]
        fn trailing_assistant_turn_is_always_rejected(
            mut turns in prop::collection::vec(arb_turn(), 0..8)
        ) {
            turns.push(bot("last"));
            prop_assert!(matches!(adapt(&turns), Err(ApiError::LastTurnNotUser)));
        }

        #[test]
        fn history_never_opens_on_model_turn(
            mut turns in prop::collection::vec(arb_turn(), 0..12)
        ) {
            turns.push(user("latest"));
            let conversation = adapt(&turns).unwrap();
            if let Some(first) = conversation.history.first() {
                prop_assert_eq!(first.role, ContentRole::User);
            }
            prop_assert!(conversation.history.iter().all(|c| !c.parts[0].text.trim().is_empty()));
        }

        #[test]
        fn assistant_only_prefix_yields_empty_history(n in 0usize..8) {
            let mut turns: Vec<ChatTurn> = (0..n).map(|i| bot(&format!("a{}", i))).collect();
            turns.push(user("latest"));
            prop_assert!(adapt(&turns).unwrap().history.is_empty());
        }

        #[test]
        fn adapting_adapted_history_is_stable(
            mut turns in prop::collection::vec(arb_turn(), 0..12)
        ) {
            turns.push(user("latest"));
            let first = adapt(&turns).unwrap().history;
            let mut replay = to_turns(&first);
            replay.push(user("again"));
            let second = adapt(&replay).unwrap().history;
            prop_assert_eq!(first, second);
        }
    }
}

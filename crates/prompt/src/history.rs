//! Conversation history supplied by the caller.
//!
//! The front end sends the whole chat log with every request as a flat list
//! of turns. Only closed question/answer pairs are useful as dialogue memory,
//! so the log is folded into [`ConversationPair`]s before prompting.

use serde::{Deserialize, Deserializer, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
    /// Anything else the front end sends; ignored when pairing
    #[default]
    #[serde(other)]
    Unknown,
}

/// One message of the chat log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sender: Sender,

    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// A user question immediately answered by the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationPair {
    pub question: String,
    pub answer: String,
}

/// Fold a flat turn log into closed question/answer pairs.
///
/// At most one user question is pending at a time. A later user turn
/// replaces it, a bot turn closes it, and a bot turn with nothing pending is
/// dropped. A question still pending at the end of the log is dropped too.
pub fn reconstruct_history(turns: &[ChatTurn]) -> Vec<ConversationPair> {
    let mut pairs = Vec::new();
    let mut pending: Option<&str> = None;

    for turn in turns {
        match turn.sender {
            Sender::User => pending = Some(turn.text.as_str()),
            Sender::Bot => {
                if let Some(question) = pending.take() {
                    pairs.push(ConversationPair {
                        question: question.to_string(),
                        answer: turn.text.clone(),
                    });
                }
            }
            Sender::Unknown => {}
        }
    }

    pairs
}

/// Render pairs as alternating `User:` / `Bot:` lines.
pub fn render_history(pairs: &[ConversationPair]) -> String {
    pairs
        .iter()
        .map(|pair| format!("User: {}\nBot: {}\n", pair.question, pair.answer))
        .collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternating_turns_pair_up_in_order() {
        let turns = vec![
            ChatTurn::user("q1"),
            ChatTurn::bot("a1"),
            ChatTurn::user("q2"),
            ChatTurn::bot("a2"),
            ChatTurn::user("q3"),
            ChatTurn::bot("a3"),
        ];

        let pairs = reconstruct_history(&turns);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].question, "q1");
        assert_eq!(pairs[0].answer, "a1");
        assert_eq!(pairs[2].question, "q3");
        assert_eq!(pairs[2].answer, "a3");
    }

    #[test]
    fn test_trailing_user_turn_dropped() {
        let turns = vec![ChatTurn::user("q1"), ChatTurn::bot("a1"), ChatTurn::user("q2")];
        let pairs = reconstruct_history(&turns);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].question, "q1");
    }

    #[test]
    fn test_lone_user_turn_yields_nothing() {
        assert!(reconstruct_history(&[ChatTurn::user("hello")]).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(reconstruct_history(&[]).is_empty());
    }

    #[test]
    fn test_leading_bot_turn_dropped() {
        let turns = vec![
            ChatTurn::bot("안녕하세요! 저는 Jobs입니다."),
            ChatTurn::user("q1"),
            ChatTurn::bot("a1"),
        ];
        let pairs = reconstruct_history(&turns);
        assert_eq!(
            pairs,
            vec![ConversationPair {
                question: "q1".to_string(),
                answer: "a1".to_string(),
            }]
        );
    }

    #[test]
    fn test_consecutive_user_turns_keep_latest() {
        let turns = vec![ChatTurn::user("first"), ChatTurn::user("second"), ChatTurn::bot("a")];
        let pairs = reconstruct_history(&turns);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].question, "second");
    }

    #[test]
    fn test_consecutive_bot_turns_only_first_pairs() {
        let turns = vec![ChatTurn::user("q"), ChatTurn::bot("a1"), ChatTurn::bot("a2")];
        let pairs = reconstruct_history(&turns);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].answer, "a1");
    }

    #[test]
    fn test_lenient_turn_deserialization() {
        let turns: Vec<ChatTurn> = serde_json::from_str(
            r#"[
                {"sender": "user", "text": "q1"},
                {"sender": "system", "text": "ignored"},
                {"sender": "bot"},
                {"sender": null, "text": null}
            ]"#,
        )
        .unwrap();

        assert_eq!(turns[1].sender, Sender::Unknown);
        assert_eq!(turns[2].text, "");
        assert_eq!(turns[3], ChatTurn::default());

        let pairs = reconstruct_history(&turns);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].answer, "");
    }

    #[test]
    fn test_render_history() {
        let pairs = vec![
            ConversationPair {
                question: "q1".to_string(),
                answer: "a1".to_string(),
            },
            ConversationPair {
                question: "q2".to_string(),
                answer: "a2".to_string(),
            },
        ];
        assert_eq!(render_history(&pairs), "User: q1\nBot: a1\nUser: q2\nBot: a2\n");
        assert_eq!(render_history(&[]), "");
    }
}

//! Property-based testing utilities using proptest.
//!
//! Strategies produce session keys, JSON values and sequences of
//! [`SessionMutation`]s that can be replayed against a record or a handler.

use proptest::prelude::*;
use serde_json::Value;

/// One handler-side operation on a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMutation {
    /// `set(key, value)`
    Set(String, Value),
    /// `del(key)`
    Del(String),
    /// `destroy()`
    Destroy,
}

/// Session keys drawn from a small alphabet so sets and deletes collide.
pub fn session_key() -> impl Strategy<Value = String> {
    "[a-d]{1,2}"
}

/// JSON values a session commonly stores.
pub fn json_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::String),
    ]
}

/// A single mutation; destroy is rarer than set/del.
pub fn session_mutation() -> impl Strategy<Value = SessionMutation> {
    prop_oneof![
        4 => (session_key(), json_value()).prop_map(|(k, v)| SessionMutation::Set(k, v)),
        2 => session_key().prop_map(SessionMutation::Del),
        1 => Just(SessionMutation::Destroy),
    ]
}

/// A sequence of up to `max` mutations.
pub fn session_mutations(max: usize) -> impl Strategy<Value = Vec<SessionMutation>> {
    prop::collection::vec(session_mutation(), 0..=max)
}

/// Reference model: the data a session holds after `mutations`.
#[must_use]
pub fn expected_data(mutations: &[SessionMutation]) -> serde_json::Map<String, Value> {
    let mut data = serde_json::Map::new();
    for mutation in mutations {
        match mutation {
            SessionMutation::Set(key, value) => {
                data.insert(key.clone(), value.clone());
            }
            SessionMutation::Del(key) => {
                data.remove(key);
            }
            SessionMutation::Destroy => data.clear(),
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_destroy_last_leaves_no_data(mut mutations in session_mutations(8)) {
            mutations.push(SessionMutation::Destroy);
            prop_assert!(expected_data(&mutations).is_empty());
        }

        #[test]
        fn prop_keys_match_alphabet(key in session_key()) {
            prop_assert!(key.chars().all(|c| ('a'..='d').contains(&c)));
        }
    }

    #[test]
    fn test_expected_data_applies_in_order() {
        let mutations = vec![
            SessionMutation::Set("a".into(), Value::from(1)),
            SessionMutation::Set("b".into(), Value::from(2)),
            SessionMutation::Del("a".into()),
        ];

        let data = expected_data(&mutations);

        assert_eq!(data.len(), 1);
        assert_eq!(data.get("b"), Some(&Value::from(2)));
    }
}

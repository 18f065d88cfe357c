//! Property tests for `SessionRecord` driven by the shared mutation
//! strategies.

#![allow(clippy::unwrap_used)] // Test code can use unwrap

use proptest::prelude::*;
use redis_session_core::{mocks::MockSessionStore, SessionId, SessionRecord};
use redis_session_testing::properties::{expected_data, session_mutations, SessionMutation};

fn apply(record: &mut SessionRecord<MockSessionStore>, mutation: &SessionMutation) {
    match mutation {
        SessionMutation::Set(key, value) => record.set(key.clone(), value.clone()),
        SessionMutation::Del(key) => record.del(key),
        SessionMutation::Destroy => record.destroy(),
    }
}

proptest! {
    #[test]
    fn prop_data_and_empty_follow_model(mutations in session_mutations(32)) {
        let mut record = SessionRecord::new(SessionId::generate(), MockSessionStore::new(), 60);

        for (step, mutation) in mutations.iter().enumerate() {
            apply(&mut record, mutation);

            let expected = expected_data(&mutations[..=step]);
            prop_assert_eq!(record.data(), &expected);
            prop_assert_eq!(record.empty(), expected.is_empty());
        }
    }

    #[test]
    fn prop_changed_only_after_effective_mutation(mutations in session_mutations(32)) {
        let mut record = SessionRecord::new(SessionId::generate(), MockSessionStore::new(), 60);
        let mut any_effective = false;

        for mutation in &mutations {
            any_effective |= match mutation {
                SessionMutation::Set(..) | SessionMutation::Destroy => true,
                SessionMutation::Del(key) => record.has(key),
            };
            apply(&mut record, mutation);
            prop_assert_eq!(record.changed(), any_effective);
        }
    }

    #[test]
    fn prop_destroy_always_rotates_id(mutations in session_mutations(16)) {
        let mut record = SessionRecord::new(SessionId::generate(), MockSessionStore::new(), 60);

        for mutation in &mutations {
            let before = record.id().clone();
            apply(&mut record, mutation);

            if *mutation == SessionMutation::Destroy {
                prop_assert_ne!(record.id(), &before);
            } else {
                prop_assert_eq!(record.id(), &before);
            }
        }
    }
}

#[tokio::test]
async fn test_saved_payload_matches_model() {
    let store = MockSessionStore::new();
    let mutations = vec![
        SessionMutation::Set("a".into(), 1.into()),
        SessionMutation::Destroy,
        SessionMutation::Set("b".into(), "two".into()),
        SessionMutation::Del("missing".into()),
    ];
    let mut record = SessionRecord::new(SessionId::generate(), store.clone(), 60);
    for mutation in &mutations {
        apply(&mut record, mutation);
    }

    record.save().await.unwrap();

    let raw = store.raw(&record.id().store_key()).unwrap().unwrap();
    let saved: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(saved, expected_data(&mutations));
}

//! Model-based tests for the registry over the in-memory store.
//!
//! Random sequences of upserts and removals are applied both to the registry
//! and to a plain map; afterwards every application's listing must match the
//! map exactly.

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use proptest::prelude::*;
    use uuid::Uuid;

    use homepage_core::{ApiCallback, CallbackId};

    use crate::callback_store::InMemoryCallbackStore;
    use crate::registry::CallbackRegistry;

    const APPS: [&str; 3] = ["alpha", "beta", "gamma"];

    #[derive(Debug, Clone)]
    enum Op {
        Upsert { app: usize, id: u8, version: u8 },
        Remove { id: u8 },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0..APPS.len(), 0u8..6, 0u8..4)
                .prop_map(|(app, id, version)| Op::Upsert { app, id, version }),
            1 => (0u8..6).prop_map(|id| Op::Remove { id }),
        ]
    }

    fn id(n: u8) -> CallbackId {
        CallbackId::from_uuid(Uuid::from_u128(u128::from(n) + 1))
    }

    fn callback(n: u8, version: u8) -> ApiCallback {
        ApiCallback::new(id(n), "card", format!("v{version}"), format!("/cb/{n}"))
    }

    fn sorted(mut v: Vec<ApiCallback>) -> Vec<ApiCallback> {
        v.sort_by_key(|c| c.public_id);
        v
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 200,
            ..ProptestConfig::default()
        })]

        #[test]
        fn listings_match_a_simple_map_model(ops in proptest::collection::vec(op(), 0..40)) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let store = InMemoryCallbackStore::new();
            let registry = CallbackRegistry::new(store.clone());
            let mut model: HashMap<CallbackId, (&str, ApiCallback)> = HashMap::new();

            rt.block_on(async {
                for op in &ops {
                    match *op {
                        Op::Upsert { app, id: n, version } => {
                            let cb = callback(n, version);
                            registry.upsert(APPS[app], &cb).await.unwrap();
                            model.insert(cb.public_id, (APPS[app], cb));
                        }
                        Op::Remove { id: n } => {
                            registry.remove(id(n)).await.unwrap();
                            model.remove(&id(n));
                        }
                    }
                }
            });

            prop_assert_eq!(store.len(), model.len());

            let mut expected: BTreeMap<&str, Vec<ApiCallback>> = BTreeMap::new();
            for (app, cb) in model.values() {
                expected.entry(*app).or_default().push(cb.clone());
            }
            for app in APPS {
                let listed = rt.block_on(registry.list_by_application(app)).unwrap();
                let want = expected.remove(app).unwrap_or_default();
                prop_assert_eq!(sorted(listed), sorted(want));
            }
        }
    }
}

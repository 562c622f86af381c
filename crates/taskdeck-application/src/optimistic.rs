//! Optimistic update helper.
//!
//! Wraps the "snapshot → apply → confirm remotely → restore on failure"
//! sequence around any value reachable inside a lock-protected state.
//! The lock is never held while the remote call is pending.

use std::future::Future;
use tokio::sync::RwLock;

/// Applies a local change immediately, then confirms it remotely.
///
/// # Arguments
///
/// * `state` - The lock guarding the value
/// * `get` - Reads the current value; `None` means there is nothing to update
/// * `set` - Writes a value back (used both to apply and to revert)
/// * `next` - Computes the new value from the current one
/// * `remote` - Confirms the new value with the server
///
/// # Returns
///
/// `Ok(None)` when `get` finds nothing (no remote call is made),
/// `Ok(Some(new_value))` once the server accepted the change.
///
/// # Errors
///
/// Returns the remote error after `set` has restored the snapshot.
/// The server's response body is not applied on success.
pub async fn optimistic_update<S, V, R, E, Fut>(
    state: &RwLock<S>,
    get: impl Fn(&S) -> Option<V>,
    set: impl Fn(&mut S, V),
    next: impl FnOnce(&V) -> V,
    remote: impl FnOnce(V) -> Fut,
) -> Result<Option<V>, E>
where
    V: Clone,
    Fut: Future<Output = Result<R, E>>,
{
    let (snapshot, applied) = {
        let mut guard = state.write().await;
        let Some(snapshot) = get(&guard) else {
            return Ok(None);
        };
        let applied = next(&snapshot);
        set(&mut guard, applied.clone());
        (snapshot, applied)
    };

    match remote(applied.clone()).await {
        Ok(_) => Ok(Some(applied)),
        Err(e) => {
            let mut guard = state.write().await;
            set(&mut guard, snapshot);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn counters() -> RwLock<HashMap<&'static str, i32>> {
        RwLock::new(HashMap::from([("a", 1)]))
    }

    #[tokio::test]
    async fn test_applies_before_remote_resolves() {
        let state = counters();

        let result: Result<_, String> = optimistic_update(
            &state,
            |s| s.get("a").copied(),
            |s, v| {
                s.insert("a", v);
            },
            |v| v + 1,
            |v| async move {
                assert_eq!(v, 2);
                Ok(())
            },
        )
        .await;

        assert_eq!(result, Ok(Some(2)));
        assert_eq!(state.read().await.get("a"), Some(&2));
    }

    #[tokio::test]
    async fn test_restores_snapshot_on_failure() {
        let state = counters();

        let result = optimistic_update(
            &state,
            |s| s.get("a").copied(),
            |s, v| {
                s.insert("a", v);
            },
            |v| v * 10,
            |_| async { Err::<(), _>("offline".to_string()) },
        )
        .await;

        assert_eq!(result, Err("offline".to_string()));
        assert_eq!(state.read().await.get("a"), Some(&1));
    }

    #[tokio::test]
    async fn test_missing_value_skips_remote() {
        let state = counters();
        let called = AtomicBool::new(false);

        let result: Result<Option<i32>, String> = optimistic_update(
            &state,
            |s| s.get("missing").copied(),
            |s, v| {
                s.insert("missing", v);
            },
            |v| v + 1,
            |_| {
                called.store(true, Ordering::SeqCst);
                async { Ok(()) }
            },
        )
        .await;

        assert_eq!(result, Ok(None));
        assert!(!called.load(Ordering::SeqCst));
        assert!(!state.read().await.contains_key("missing"));
    }
}

//! Runs a closure inside one store scope: commit on success, roll back on error.
//!
//! Concurrency conflicts detected by the store retry the *whole* closure against a
//! fresh scope, so every read is redone against the newly committed state.

use tracing::warn;

use stockkeep_core::DomainResult;

use crate::store::{Store, UnitOfWork};

/// How often a conflicted unit of work is re-run before the conflict is surfaced.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub conflict_retries: u32,
}

impl RetryPolicy {
    pub const fn new(conflict_retries: u32) -> Self {
        Self { conflict_retries }
    }

    pub const fn no_retry() -> Self {
        Self::new(0)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Execute `op` atomically, retrying on concurrency conflicts per `policy`.
pub fn execute<'s, S, T, F>(store: &'s S, policy: RetryPolicy, mut op: F) -> DomainResult<T>
where
    S: Store,
    F: FnMut(&mut S::Scope<'s>) -> DomainResult<T>,
{
    let mut attempt = 0;
    loop {
        match attempt_once(store, &mut op) {
            Err(err) if err.is_retryable() && attempt < policy.conflict_retries => {
                attempt += 1;
                warn!(attempt, error = %err, "unit of work conflicted; retrying");
            }
            outcome => return outcome,
        }
    }
}

fn attempt_once<'s, S, T, F>(store: &'s S, op: &mut F) -> DomainResult<T>
where
    S: Store,
    F: FnMut(&mut S::Scope<'s>) -> DomainResult<T>,
{
    let mut scope = store.begin()?;
    match op(&mut scope) {
        Ok(value) => {
            scope.commit()?;
            Ok(value)
        }
        Err(err) => {
            scope.rollback();
            Err(err)
        }
    }
}

/// Run a read-only closure against a consistent snapshot.
pub fn read<'s, S, T>(store: &'s S, op: impl FnOnce(&S::Scope<'s>) -> DomainResult<T>) -> DomainResult<T>
where
    S: Store,
{
    let scope = store.begin()?;
    let out = op(&scope);
    scope.rollback();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FaultPoint, InMemoryStore};
    use stockkeep_core::{CategoryId, DomainError, Entity};
    use stockkeep_products::Category;

    fn category(name: &str) -> Category {
        Category::new(CategoryId::new(), name, "").unwrap()
    }

    #[test]
    fn error_rolls_back_every_write() {
        let store = InMemoryStore::new();
        let cat = category("Tools");
        let id = cat.id();

        let result: DomainResult<()> = execute(&store, RetryPolicy::default(), |scope| {
            scope.upsert_category(cat.clone())?;
            Err(DomainError::validation("boom"))
        });
        assert!(result.is_err());

        let found = read(&store, |scope| Ok(scope.get_category(id).is_ok())).unwrap();
        assert!(!found);
    }

    #[test]
    fn backend_failures_are_not_retried() {
        let store = InMemoryStore::new();
        let mut runs = 0;

        store.inject_fault(FaultPoint::Commit);
        let result = execute(&store, RetryPolicy::default(), |scope| {
            runs += 1;
            scope.upsert_category(category("Tools"))?;
            Ok(())
        });
        assert!(matches!(result, Err(DomainError::StoreFailure(_))));
        assert_eq!(runs, 1);
    }

    #[test]
    fn conflicts_retry_up_to_the_policy_limit() {
        let store = InMemoryStore::new();
        let mut runs = 0;
        let result: DomainResult<()> = execute(&store, RetryPolicy::new(2), |_scope| {
            runs += 1;
            Err(DomainError::conflict("stale"))
        });
        assert!(matches!(result, Err(DomainError::ConcurrencyConflict(_))));
        assert_eq!(runs, 3);

        runs = 0;
        let result: DomainResult<u32> = execute(&store, RetryPolicy::default(), |_scope| {
            runs += 1;
            if runs == 1 {
                Err(DomainError::conflict("stale"))
            } else {
                Ok(runs)
            }
        });
        assert_eq!(result, Ok(2));
    }
}

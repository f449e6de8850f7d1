use crate::{Request, Stub};
use log::debug;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The ordered set of active [`Stub`]s.
///
/// Insertion order is priority order: when several stubs match the same request, the one
/// installed first wins.
///
/// All operations take `&self` and can be called from any thread. A single lock guards the
/// whole sequence, so a lookup observes the registry either entirely before or entirely after
/// any given `install`/`clear`.
///
/// ### Example:
/// ```rust
/// use httpstub::{Request, ResponseTemplate, Stub, StubRegistry};
///
/// let registry = StubRegistry::new();
/// registry.install(vec![
///     Stub::new("abcd", "GET", ResponseTemplate::new(200)).unwrap(),
///     Stub::new("[a-z]{4}", "GET", ResponseTemplate::new(201)).unwrap(),
/// ]);
///
/// let request = Request::from_parts("GET", "https://example.com/abcd");
/// let stub = registry.first_match(&request).unwrap();
/// assert_eq!(stub.url_pattern(), "abcd");
///
/// registry.clear();
/// assert_eq!(registry.count(), 0);
/// assert!(registry.first_match(&request).is_none());
/// ```
#[derive(Debug, Default)]
pub struct StubRegistry {
    stubs: RwLock<Vec<Arc<Stub>>>,
}

impl StubRegistry {
    pub fn new() -> StubRegistry {
        StubRegistry::default()
    }

    /// Append `stubs`, in order, after every stub that is already installed.
    ///
    /// The whole batch becomes visible at once.
    pub fn install<I>(&self, stubs: I)
    where
        I: IntoIterator<Item = Stub>,
    {
        let batch: Vec<Arc<Stub>> = stubs.into_iter().map(Arc::new).collect();
        if batch.is_empty() {
            return;
        }
        debug!("Installing {} stub(s).", batch.len());
        self.write().extend(batch);
    }

    pub fn install_single(&self, stub: Stub) {
        self.install(std::iter::once(stub))
    }

    /// Drop every installed stub. Calling it on an empty registry is a no-op.
    pub fn clear(&self) {
        let dropped = std::mem::take(&mut *self.write());
        if !dropped.is_empty() {
            debug!("Dropped {} stub(s).", dropped.len());
        }
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Return the first installed stub, in insertion order, that matches `request`.
    pub fn first_match(&self, request: &Request) -> Option<Arc<Stub>> {
        self.read()
            .iter()
            .find(|stub| stub.matches(request))
            .cloned()
    }

    // Mutations are a single `extend` or `take`: a poisoned lock never guards a half-updated
    // sequence.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<Stub>>> {
        self.stubs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<Stub>>> {
        self.stubs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Outcome, ResponseTemplate};

    fn stub(pattern: &str, method: &str, status: u16) -> Stub {
        Stub::new(pattern, method, ResponseTemplate::new(status)).unwrap()
    }

    #[test]
    fn empty_batches_are_a_no_op() {
        let registry = StubRegistry::new();

        registry.install(Vec::new());

        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn later_batches_are_installed_after_earlier_ones() {
        let registry = StubRegistry::new();
        registry.install(vec![stub("users", "GET", 200), stub("users/42", "GET", 201)]);
        registry.install_single(stub("users/42", "GET", 202));
        let request = Request::from_parts("GET", "https://example.com/users/42");

        let matched = registry.first_match(&request).unwrap();

        assert_eq!(registry.count(), 3);
        assert_eq!(matched.url_pattern(), "users");
    }

    #[test]
    fn first_match_skips_stubs_for_other_methods() {
        let registry = StubRegistry::new();
        registry.install(vec![
            stub("sign_up", "GET", 200),
            Stub::new("sign_up", "POST", Outcome::TransportFailure).unwrap(),
        ]);

        let matched = registry
            .first_match(&Request::from_parts("POST", "https://example.com/sign_up"))
            .unwrap();

        assert!(matched.outcome().is_transport_failure());
    }

    #[test]
    fn clear_is_idempotent() {
        let registry = StubRegistry::new();
        registry.install_single(stub("sign_up", "POST", 200));

        registry.clear();
        registry.clear();

        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn a_poisoned_registry_keeps_working() {
        let registry = Arc::new(StubRegistry::new());
        registry.install_single(stub("sign_up", "POST", 200));

        let poisoner = registry.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.stubs.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(registry.stubs.is_poisoned());
        assert_eq!(registry.count(), 1);
        registry.clear();
        assert_eq!(registry.count(), 0);
    }
}

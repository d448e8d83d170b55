//! Tests for the session manager lifecycle.

use std::sync::atomic::AtomicUsize;

use super::*;
use crate::domain::ports::{MockRecordStore, RecordStoreError};
use crate::domain::{
    AccessDecision, AccessRequirement, FullName, Role, UserId, decide_access,
};
use async_trait::async_trait;
use rstest::{fixture, rstest};
use tokio::sync::Notify;

#[fixture]
fn patient() -> User {
    User::try_from_strings("1", "a@x.com", Some("Layla Haddad"), Role::Patient)
        .expect("valid patient")
}

fn store_without_session() -> MockRecordStore {
    let mut store = MockRecordStore::new();
    store.expect_current_session().times(1).returning(|| Ok(None));
    store
}

async fn signed_in(mut store: MockRecordStore, user: User) -> SessionManager<MockRecordStore> {
    store.expect_current_session().times(1).returning(|| Ok(None));
    let returned = user.clone();
    store
        .expect_authenticate()
        .times(1)
        .return_once(move |_| Ok(Some(returned)));
    let manager = SessionManager::start(Arc::new(store)).await;
    assert!(manager.sign_in("a@x.com", "p").await);
    manager
}

#[rstest]
#[tokio::test]
async fn hydrate_without_marker_settles_logged_out() {
    let manager = SessionManager::start(Arc::new(store_without_session())).await;

    assert_eq!(manager.phase(), SessionPhase::LoggedOut);
    assert_eq!(manager.user(), None);
    assert!(!manager.is_loading());
}

#[rstest]
#[tokio::test]
async fn hydrate_restores_the_marked_user(patient: User) {
    let mut store = MockRecordStore::new();
    let restored = patient.clone();
    store
        .expect_current_session()
        .times(1)
        .return_once(move || Ok(Some(restored)));

    let manager = SessionManager::start(Arc::new(store)).await;

    assert_eq!(manager.phase(), SessionPhase::LoggedIn);
    assert_eq!(manager.user(), Some(patient));
}

#[rstest]
#[tokio::test]
async fn hydrate_treats_store_errors_as_signed_out() {
    let mut store = MockRecordStore::new();
    store
        .expect_current_session()
        .times(1)
        .returning(|| Err(RecordStoreError::corrupt("truncated document")));

    let manager = SessionManager::start(Arc::new(store)).await;

    assert_eq!(manager.phase(), SessionPhase::LoggedOut);
    assert!(!manager.is_loading());
}

#[rstest]
#[tokio::test]
async fn hydrate_runs_only_once() {
    let manager = SessionManager::start(Arc::new(store_without_session())).await;
    manager.hydrate().await;

    assert_eq!(manager.phase(), SessionPhase::LoggedOut);
}

#[rstest]
#[tokio::test]
async fn sign_in_with_matching_credentials_sets_the_user(patient: User) {
    let mut store = store_without_session();
    let returned = patient.clone();
    store
        .expect_authenticate()
        .withf(|creds| creds.email() == "a@x.com" && creds.password() == "p")
        .times(1)
        .return_once(move |_| Ok(Some(returned)));
    let manager = SessionManager::start(Arc::new(store)).await;

    assert!(manager.sign_in(" a@x.com ", "p").await);
    assert_eq!(manager.user(), Some(patient));
    assert_eq!(manager.phase(), SessionPhase::LoggedIn);
    assert!(!manager.is_loading());
}

#[rstest]
#[case("", "p")]
#[case("a@x.com", "")]
#[tokio::test]
async fn blank_inputs_never_reach_the_store(#[case] email: &str, #[case] password: &str) {
    let mut store = store_without_session();
    store.expect_authenticate().times(0);
    let manager = SessionManager::start(Arc::new(store)).await;

    assert!(!manager.sign_in(email, password).await);
}

#[rstest]
#[tokio::test]
async fn failed_sign_in_keeps_the_existing_user(patient: User) {
    let mut store = store_without_session();
    let returned = patient.clone();
    let mut seq = mockall::Sequence::new();
    store
        .expect_authenticate()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_| Ok(Some(returned)));
    store
        .expect_authenticate()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(None));
    let manager = SessionManager::start(Arc::new(store)).await;
    assert!(manager.sign_in("a@x.com", "p").await);

    assert!(!manager.sign_in("a@x.com", "wrong").await);
    assert_eq!(manager.user(), Some(patient));
    assert_eq!(manager.phase(), SessionPhase::LoggedIn);
    assert!(!manager.is_loading());
}

#[rstest]
#[tokio::test]
async fn store_errors_during_sign_in_return_false() {
    let mut store = store_without_session();
    store
        .expect_authenticate()
        .times(1)
        .returning(|_| Err(RecordStoreError::unavailable("offline")));
    let manager = SessionManager::start(Arc::new(store)).await;

    assert!(!manager.sign_in("a@x.com", "p").await);
    assert_eq!(manager.user(), None);
    assert_eq!(manager.phase(), SessionPhase::LoggedOut);
    assert!(!manager.is_loading());
}

#[rstest]
#[tokio::test]
async fn sign_out_clears_the_user(patient: User) {
    let mut store = MockRecordStore::new();
    store.expect_clear_session().times(1).returning(|| Ok(()));
    let manager = signed_in(store, patient).await;

    manager.sign_out().await;

    assert_eq!(manager.user(), None);
    assert_eq!(manager.phase(), SessionPhase::LoggedOut);
    assert!(!manager.is_loading());
}

#[rstest]
#[tokio::test]
async fn sign_out_is_idempotent_and_survives_store_errors() {
    let mut store = store_without_session();
    store
        .expect_clear_session()
        .times(2)
        .returning(|| Err(RecordStoreError::io("read-only file system")));
    let manager = SessionManager::start(Arc::new(store)).await;

    manager.sign_out().await;
    manager.sign_out().await;

    assert_eq!(manager.user(), None);
    assert_eq!(manager.phase(), SessionPhase::LoggedOut);
}

#[rstest]
#[tokio::test]
async fn update_without_a_user_returns_false() {
    let mut store = store_without_session();
    store.expect_update_user().times(0);
    let manager = SessionManager::start(Arc::new(store)).await;

    let patch = UserPatch::default().with_full_name(FullName::new("X").expect("valid name"));
    assert!(!manager.update_user(patch).await);
}

#[rstest]
#[tokio::test]
async fn update_mirrors_the_store_record(patient: User) {
    let mut store = MockRecordStore::new();
    store
        .expect_update_user()
        .withf(|id, patch| id.as_ref() == "1" && patch.full_name.is_some())
        .times(1)
        .returning(|_, _| {
            Ok(Some(
                User::try_from_strings("1", "a@x.com", Some("New"), Role::Patient)
                    .expect("valid user"),
            ))
        });
    let manager = signed_in(store, patient).await;

    let patch = UserPatch::default().with_full_name(FullName::new("New").expect("valid name"));
    assert!(manager.update_user(patch).await);

    let user = manager.user().expect("still signed in");
    assert_eq!(user.id().as_ref(), "1");
    assert_eq!(user.full_name().map(AsRef::as_ref), Some("New"));
}

#[rstest]
#[case(Ok(None))]
#[case(Err(RecordStoreError::io("disk full")))]
#[tokio::test]
async fn rejected_updates_leave_the_user_untouched(
    patient: User,
    #[case] outcome: Result<Option<User>, RecordStoreError>,
) {
    let mut store = MockRecordStore::new();
    store
        .expect_update_user()
        .times(1)
        .return_once(move |_, _| outcome);
    let manager = signed_in(store, patient.clone()).await;

    let patch = UserPatch::default().with_role(Role::Admin);
    assert!(!manager.update_user(patch).await);
    assert_eq!(manager.user(), Some(patient));
}

#[rstest]
#[tokio::test]
async fn updates_returning_another_user_are_ignored(patient: User) {
    let mut store = MockRecordStore::new();
    store.expect_update_user().times(1).returning(|_, _| {
        Ok(Some(
            User::try_from_strings("2", "b@x.com", None, Role::Doctor).expect("valid user"),
        ))
    });
    let manager = signed_in(store, patient.clone()).await;

    assert!(!manager.update_user(UserPatch::default()).await);
    assert_eq!(manager.user(), Some(patient));
}

#[rstest]
#[tokio::test]
async fn views_observe_every_transition(patient: User) {
    let mut store = store_without_session();
    let returned = patient.clone();
    store
        .expect_authenticate()
        .times(1)
        .return_once(move |_| Ok(Some(returned)));
    store.expect_clear_session().times(1).returning(|| Ok(()));
    let manager = SessionManager::start(Arc::new(store)).await;
    let mut view = manager.view();
    assert_eq!(view.snapshot().phase, SessionPhase::LoggedOut);

    assert!(manager.sign_in("a@x.com", "p").await);
    assert!(view.changed().await);
    assert_eq!(view.user(), Some(patient));
    assert!(!view.is_loading());

    manager.sign_out().await;
    assert!(view.changed().await);
    assert_eq!(view.phase(), SessionPhase::LoggedOut);
}

#[rstest]
#[tokio::test]
async fn views_report_when_the_manager_is_gone() {
    let manager = SessionManager::start(Arc::new(store_without_session())).await;
    let mut view = manager.view();
    view.snapshot();
    drop(manager);

    assert!(!view.changed().await);
}

#[rstest]
#[tokio::test]
async fn hydrate_waits_for_an_in_flight_operation() {
    let mut store = store_without_session();
    store
        .expect_authenticate()
        .times(1)
        .returning(|_| Ok(None));
    let manager = SessionManager::new(Arc::new(store));
    let guard = manager.operation.lock().await;

    tokio::join!(manager.hydrate(), async {
        tokio::task::yield_now().await;
        assert_eq!(manager.phase(), SessionPhase::Uninitialized);
        drop(guard);
    });
    assert!(!manager.sign_in("a@x.com", "wrong").await);

    assert_eq!(manager.phase(), SessionPhase::LoggedOut);
    assert_eq!(
        decide_access(&manager.snapshot(), AccessRequirement::AnySignedIn),
        AccessDecision::RedirectToLogin
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    CurrentSession,
    Authenticate,
    UpdateUser,
}

/// Store whose gated method parks until the test releases it.
struct GatedStore {
    user: User,
    gate: Gate,
    restores_session: bool,
    entered: Notify,
    release: Notify,
    cleared: AtomicUsize,
    updates: AtomicUsize,
}

impl GatedStore {
    fn new(user: User, gate: Gate) -> Self {
        Self {
            user,
            gate,
            restores_session: false,
            entered: Notify::new(),
            release: Notify::new(),
            cleared: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }

    /// Report `user` as the current session during hydration.
    fn restoring_session(mut self) -> Self {
        self.restores_session = true;
        self
    }

    async fn pass(&self, method: Gate) {
        if self.gate == method {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }

    fn clear_count(&self) -> usize {
        self.cleared.load(Ordering::SeqCst)
    }

    fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for GatedStore {
    async fn current_session(&self) -> Result<Option<User>, RecordStoreError> {
        self.pass(Gate::CurrentSession).await;
        Ok(self.restores_session.then(|| self.user.clone()))
    }

    async fn authenticate(
        &self,
        _credentials: &Credentials,
    ) -> Result<Option<User>, RecordStoreError> {
        self.pass(Gate::Authenticate).await;
        Ok(Some(self.user.clone()))
    }

    async fn clear_session(&self) -> Result<(), RecordStoreError> {
        self.cleared.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_user(
        &self,
        _id: &UserId,
        _patch: &UserPatch,
    ) -> Result<Option<User>, RecordStoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.pass(Gate::UpdateUser).await;
        Ok(Some(self.user.clone()))
    }
}

#[rstest]
#[tokio::test]
async fn overlapping_sign_ins_are_rejected(patient: User) {
    let store = Arc::new(GatedStore::new(patient.clone(), Gate::Authenticate));
    let manager = SessionManager::start(Arc::clone(&store)).await;

    let (first, second) = tokio::join!(manager.sign_in("a@x.com", "p"), async {
        store.entered.notified().await;
        assert!(manager.is_loading());
        let rejected = manager.sign_in("a@x.com", "p").await;
        store.release.notify_one();
        rejected
    });

    assert!(first);
    assert!(!second);
    assert_eq!(manager.user(), Some(patient));
    assert!(!manager.is_loading());
}

#[rstest]
#[tokio::test]
async fn updates_during_a_sign_in_are_rejected(patient: User) {
    let store = Arc::new(GatedStore::new(patient.clone(), Gate::Authenticate).restoring_session());
    let manager = SessionManager::start(Arc::clone(&store)).await;
    assert_eq!(manager.user(), Some(patient.clone()));

    let (signed_in, updated) = tokio::join!(manager.sign_in("a@x.com", "p"), async {
        store.entered.notified().await;
        let patch = UserPatch::default().with_full_name(FullName::new("X").expect("valid name"));
        let updated = manager.update_user(patch).await;
        store.release.notify_one();
        updated
    });

    assert!(signed_in);
    assert!(!updated);
    assert_eq!(store.update_count(), 0);
    assert_eq!(manager.user(), Some(patient));
}

#[rstest]
#[tokio::test]
async fn sign_out_during_sign_in_wins(patient: User) {
    let store = Arc::new(GatedStore::new(patient, Gate::Authenticate));
    let manager = SessionManager::start(Arc::clone(&store)).await;

    let (signed_in, ()) = tokio::join!(manager.sign_in("a@x.com", "p"), async {
        store.entered.notified().await;
        manager.sign_out().await;
        store.release.notify_one();
    });

    assert!(!signed_in);
    assert_eq!(manager.user(), None);
    assert_eq!(manager.phase(), SessionPhase::LoggedOut);
    assert!(!manager.is_loading());
    // Once for the explicit sign-out, once for the marker the late
    // authentication recorded.
    assert_eq!(store.clear_count(), 2);
}

#[rstest]
#[tokio::test]
async fn sign_out_during_update_discards_the_record(patient: User) {
    let store = Arc::new(GatedStore::new(patient, Gate::UpdateUser).restoring_session());
    let manager = SessionManager::start(Arc::clone(&store)).await;
    assert_eq!(manager.phase(), SessionPhase::LoggedIn);

    let patch = UserPatch::default().with_full_name(FullName::new("X").expect("valid name"));
    let (updated, ()) = tokio::join!(manager.update_user(patch), async {
        store.entered.notified().await;
        manager.sign_out().await;
        store.release.notify_one();
    });

    assert!(!updated);
    assert_eq!(store.update_count(), 1);
    assert_eq!(manager.user(), None);
    assert_eq!(manager.phase(), SessionPhase::LoggedOut);
}

#[rstest]
#[tokio::test]
async fn sign_out_during_hydration_settles_logged_out(patient: User) {
    let store = Arc::new(GatedStore::new(patient, Gate::CurrentSession).restoring_session());
    let manager = SessionManager::new(Arc::clone(&store));

    tokio::join!(manager.hydrate(), async {
        store.entered.notified().await;
        assert_eq!(manager.phase(), SessionPhase::Hydrating);
        assert!(manager.is_loading());
        manager.sign_out().await;
        store.release.notify_one();
    });

    assert_eq!(manager.user(), None);
    assert_eq!(manager.phase(), SessionPhase::LoggedOut);
    assert!(!manager.is_loading());
}

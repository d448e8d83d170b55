//! The session manager: single source of truth for who is signed in.
//!
//! Every state change is published through a `watch` channel before the
//! operation returns, so any [`SessionView`] read after an operation completes
//! sees its effect.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::domain::ports::RecordStore;
use crate::domain::{Credentials, User, UserPatch};

use super::state::{SessionPhase, SessionSnapshot};
use super::view::SessionView;

/// Owns the in-memory session and mediates all record store traffic for it.
///
/// Store failures never reach callers: they are logged and folded into a
/// `false` return or an unchanged session.
///
/// Managers only come from [`SessionManager::start`], so every manager a
/// caller holds has already read the store's session marker.
///
/// ## Concurrency
/// `sign_in` and `update_user` hold an operation guard; a call that finds the
/// guard taken is rejected instead of queued. Hydration waits for the guard.
/// `sign_out` does not wait for it. It advances the session epoch so whatever
/// was in flight discards its result.
pub struct SessionManager<S> {
    store: Arc<S>,
    state: watch::Sender<SessionSnapshot>,
    operation: Mutex<()>,
    epoch: AtomicU64,
}

impl<S> SessionManager<S> {
    fn new(store: Arc<S>) -> Self {
        let (state, _initial) = watch::channel(SessionSnapshot::default());
        Self {
            store,
            state,
            operation: Mutex::new(()),
            epoch: AtomicU64::new(0),
        }
    }

    /// Read-only handle for consumer views.
    pub fn view(&self) -> SessionView {
        SessionView::new(self.state.subscribe())
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Currently signed-in user.
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Whether hydration or a sign-in is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase
    }

    fn publish(&self, update: impl FnOnce(&mut SessionSnapshot)) {
        self.state.send_if_modified(|snapshot| {
            let before = snapshot.clone();
            update(snapshot);
            *snapshot != before
        });
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.current_epoch() == epoch
    }
}

impl<S> SessionManager<S>
where
    S: RecordStore,
{
    /// Construct a manager and hydrate it from the record store.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use clinic_session::domain::ports::FixtureRecordStore;
    /// use clinic_session::domain::{SessionManager, SessionPhase};
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let manager = SessionManager::start(Arc::new(FixtureRecordStore)).await;
    /// assert_eq!(manager.phase(), SessionPhase::LoggedOut);
    /// assert!(!manager.is_loading());
    /// # });
    /// ```
    pub async fn start(store: Arc<S>) -> Self {
        let manager = Self::new(store);
        manager.hydrate().await;
        manager
    }

    /// Initialise the session from the record store's current-session marker.
    ///
    /// Runs once; later calls are logged no-ops. A missing marker or any store
    /// error leaves the session signed out.
    async fn hydrate(&self) {
        let _guard = self.operation.lock().await;
        if self.phase() != SessionPhase::Uninitialized {
            debug!(phase = %self.phase(), "session already hydrated");
            return;
        }

        let epoch = self.current_epoch();
        self.publish(|snapshot| {
            snapshot.phase = SessionPhase::Hydrating;
            snapshot.loading = true;
        });

        let restored = match self.store.current_session().await {
            Ok(user) => user,
            Err(error) => {
                warn!(error = %error, "failed to read current session; starting signed out");
                None
            }
        };

        if !self.is_current(epoch) {
            debug!("hydration overtaken by sign-out; discarding restored session");
            self.publish(|snapshot| snapshot.loading = false);
            return;
        }

        match &restored {
            Some(user) => info!(user_id = %user.id(), role = %user.role(), "session restored"),
            None => debug!("no stored session"),
        }
        self.publish(|snapshot| {
            snapshot.phase = SessionPhase::settled_for(restored.as_ref());
            snapshot.user = restored;
            snapshot.loading = false;
        });
    }

    /// Authenticate against the record store.
    ///
    /// Returns `true` and replaces the current user on success. On any
    /// failure returns `false` and leaves the current user untouched,
    /// including when someone is already signed in.
    pub async fn sign_in(&self, email: &str, password: &str) -> bool {
        let credentials = match Credentials::try_from_parts(email, password) {
            Ok(credentials) => credentials,
            Err(error) => {
                debug!(error = %error, "sign-in rejected before reaching the record store");
                return false;
            }
        };
        let Ok(_guard) = self.operation.try_lock() else {
            warn!("sign-in rejected: another session operation is in flight");
            return false;
        };

        let epoch = self.current_epoch();
        self.publish(|snapshot| snapshot.loading = true);

        let outcome = self.store.authenticate(&credentials).await;

        if !self.is_current(epoch) {
            self.discard_overtaken_sign_in(outcome.ok().flatten()).await;
            return false;
        }

        match outcome {
            Ok(Some(user)) => {
                info!(user_id = %user.id(), role = %user.role(), "signed in");
                self.publish(|snapshot| {
                    snapshot.user = Some(user);
                    snapshot.phase = SessionPhase::LoggedIn;
                    snapshot.loading = false;
                });
                true
            }
            Ok(None) => {
                debug!("sign-in failed: credentials did not match");
                self.publish(|snapshot| snapshot.loading = false);
                false
            }
            Err(error) => {
                warn!(error = %error, "sign-in failed: record store error");
                self.publish(|snapshot| snapshot.loading = false);
                false
            }
        }
    }

    async fn discard_overtaken_sign_in(&self, user: Option<User>) {
        let Some(user) = user else {
            self.publish(|snapshot| snapshot.loading = false);
            return;
        };
        // The store recorded a marker for a session the caller already ended.
        debug!(user_id = %user.id(), "sign-in overtaken by sign-out; discarding");
        if let Err(error) = self.store.clear_session().await {
            warn!(error = %error, "failed to clear session marker after overtaken sign-in");
        }
        self.publish(|snapshot| snapshot.loading = false);
    }

    /// End the session.
    ///
    /// The in-memory session drops to signed out before the store is asked to
    /// clear its marker. Store errors are logged and swallowed. Idempotent.
    pub async fn sign_out(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let previous = self.user();
        self.publish(|snapshot| {
            snapshot.user = None;
            snapshot.loading = false;
            snapshot.phase = SessionPhase::LoggedOut;
        });

        if let Some(user) = &previous {
            info!(user_id = %user.id(), "signed out");
        }
        if let Err(error) = self.store.clear_session().await {
            warn!(error = %error, "failed to clear session marker; signed out locally");
        }
    }

    /// Merge `patch` into the signed-in user's record.
    ///
    /// Returns `false` without touching the store when nobody is signed in.
    /// On success the updated record replaces the current user.
    pub async fn update_user(&self, patch: UserPatch) -> bool {
        let Some(current) = self.user() else {
            debug!("update rejected: no signed-in user");
            return false;
        };
        let Ok(_guard) = self.operation.try_lock() else {
            warn!(user_id = %current.id(), "update rejected: another session operation is in flight");
            return false;
        };

        let epoch = self.current_epoch();
        let outcome = self.store.update_user(current.id(), &patch).await;

        if !self.is_current(epoch) {
            debug!(user_id = %current.id(), "update overtaken by sign-out; discarding");
            return false;
        }

        match outcome {
            Ok(Some(updated)) if updated.id() == current.id() => {
                debug!(user_id = %updated.id(), "user record updated");
                self.publish(|snapshot| snapshot.user = Some(updated));
                true
            }
            Ok(Some(other)) => {
                warn!(
                    user_id = %current.id(),
                    returned_id = %other.id(),
                    "record store returned a different user; ignoring update"
                );
                false
            }
            Ok(None) => {
                debug!(user_id = %current.id(), "record store rejected the update");
                false
            }
            Err(error) => {
                warn!(user_id = %current.id(), error = %error, "update failed: record store error");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests;

//! Activation guard: online-first key verification with offline fallback.

use crate::{KeyCodec, KeyExpiry, Remaining};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Weak};
use std::time::Duration;
use storyreel_interface::{ActivationStore, LicenseAuthority, VerificationOutcome};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Where the guard is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ActivationPhase {
    /// Startup, before the stored key has been checked
    #[default]
    Loading,
    /// No usable key
    Locked,
    /// A submitted key is being verified
    Verifying,
    /// Access granted
    Unlocked,
}

/// How the current activation was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ActivationSource {
    /// Not activated
    #[default]
    None,
    /// The license server accepted the key
    Online,
    /// The server was unreachable and the offline check passed
    Offline,
}

/// Snapshot published to observers on every transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivationState {
    /// Lifecycle phase
    pub phase: ActivationPhase,
    /// How the activation was established
    pub source: ActivationSource,
    /// When a key was last verified
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Last verification failure, shown next to the key input
    pub error: Option<String>,
    /// One-off notice, e.g. after an automatic logout
    pub notice: Option<String>,
}

/// Result of [`LicenseGuard::submit_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Whether the guard is now unlocked
    pub ok: bool,
    /// Message for the user
    pub message: Option<String>,
}

impl SubmitOutcome {
    fn accepted(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}

const REJECTED_MESSAGE: &str = "This license key is invalid or has been revoked.";
const EMPTY_KEY_MESSAGE: &str = "Please enter a license key.";

/// Gates access to the app behind a license key.
///
/// The remote authority is asked first. Its `Invalid` answer is final; only
/// an indeterminate answer (network or server failure) lets the offline
/// [`KeyCodec`] check decide. While unlocked, an expiry sweep logs the user
/// out once an offline-format key passes its expiry.
pub struct LicenseGuard<A, S> {
    authority: A,
    store: S,
    codec: KeyCodec,
    state: watch::Sender<ActivationState>,
}

impl<A, S> std::fmt::Debug for LicenseGuard<A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseGuard")
            .field("codec", &self.codec)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<A, S> LicenseGuard<A, S>
where
    A: LicenseAuthority,
    S: ActivationStore,
{
    /// Creates a guard in the `Loading` phase.
    pub fn new(authority: A, store: S, codec: KeyCodec) -> Self {
        let (state, _) = watch::channel(ActivationState::default());
        Self {
            authority,
            store,
            codec,
            state,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> ActivationState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every transition.
    pub fn subscribe(&self) -> watch::Receiver<ActivationState> {
        self.state.subscribe()
    }

    /// Whether access is currently granted.
    pub fn is_unlocked(&self) -> bool {
        self.state.borrow().phase == ActivationPhase::Unlocked
    }

    /// The persisted key slot.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The offline key codec.
    pub fn codec(&self) -> &KeyCodec {
        &self.codec
    }

    /// Time left on the stored key, when it is in the offline format.
    pub fn remaining(&self) -> Option<Remaining> {
        let key = self.stored_key()?;
        let parsed = self.codec.parse(&key).ok()?;
        Some(self.codec.remaining_label(&parsed))
    }

    /// Resolve the startup state from the stored key.
    #[instrument(skip(self))]
    pub async fn check_saved_key(&self) -> ActivationState {
        self.state.send_modify(|s| s.phase = ActivationPhase::Loading);

        let Some(key) = self.stored_key() else {
            debug!("No stored license key");
            self.lock(None);
            return self.state();
        };

        match self.authority.verify(&key).await {
            VerificationOutcome::Valid => {
                info!("Stored license key verified online");
                self.unlock(ActivationSource::Online);
            }
            VerificationOutcome::Invalid { message } => {
                warn!(?message, "Stored license key rejected, clearing it");
                self.clear_store();
                self.lock(Some(message.unwrap_or_else(|| REJECTED_MESSAGE.to_string())));
            }
            VerificationOutcome::Indeterminate(reason) => {
                warn!(%reason, "License server unavailable, checking stored key offline");
                match self.codec.verify(&key) {
                    Ok(_) => {
                        info!("Stored license key accepted offline");
                        self.unlock(ActivationSource::Offline);
                    }
                    Err(e) => {
                        debug!(error = %e.kind, "Stored license key failed offline check");
                        self.lock(Some(e.kind.to_string()));
                    }
                }
            }
        }

        self.state()
    }

    /// Verify and activate a key typed by the user.
    ///
    /// The key is trimmed and uppercased first. An empty key never reaches
    /// the network.
    #[instrument(skip_all)]
    pub async fn submit_key(&self, raw: &str) -> SubmitOutcome {
        let key = raw.trim().to_uppercase();
        if key.is_empty() {
            self.lock(Some(EMPTY_KEY_MESSAGE.to_string()));
            return SubmitOutcome::rejected(EMPTY_KEY_MESSAGE);
        }

        self.state.send_modify(|s| {
            s.phase = ActivationPhase::Verifying;
            s.error = None;
            s.notice = None;
        });

        match self.authority.verify(&key).await {
            VerificationOutcome::Valid => {
                info!("License key accepted online");
                self.persist(&key);
                self.unlock(ActivationSource::Online);
                SubmitOutcome::accepted("License activated.")
            }
            VerificationOutcome::Invalid { message } => {
                let message = message.unwrap_or_else(|| REJECTED_MESSAGE.to_string());
                warn!(%message, "License key rejected online");
                self.lock(Some(message.clone()));
                SubmitOutcome::rejected(message)
            }
            VerificationOutcome::Indeterminate(reason) => {
                warn!(%reason, "License server unavailable, checking key offline");
                match self.codec.verify(&key) {
                    Ok(parsed) => {
                        self.persist(&key);
                        self.unlock(ActivationSource::Offline);
                        SubmitOutcome::accepted(format!(
                            "License activated offline ({} remaining).",
                            self.codec.remaining_label(&parsed)
                        ))
                    }
                    Err(e) => {
                        let message = format!("{} ({})", e.kind, reason);
                        self.lock(Some(message.clone()));
                        SubmitOutcome::rejected(message)
                    }
                }
            }
        }
    }

    /// Forget the key and lock.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        self.clear_store();
        self.state.send_replace(ActivationState {
            phase: ActivationPhase::Locked,
            ..ActivationState::default()
        });
        info!("Logged out");
    }

    /// One expiry sweep tick at the current time.
    ///
    /// Returns `true` if the guard logged out.
    pub fn sweep_once(&self) -> bool {
        self.sweep_at(Utc::now())
    }

    /// One expiry sweep tick at `now`.
    ///
    /// Only acts while unlocked. Keys that do not parse in the offline
    /// format are left alone.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_unlocked() {
            return false;
        }
        let Some(key) = self.stored_key() else {
            return false;
        };
        let Ok(expiry) = self.codec.parse(&key).and_then(|p| self.codec.expiry(&p)) else {
            return false;
        };

        match expiry {
            KeyExpiry::At(expires_at) if now >= expires_at => {
                warn!(%expires_at, "License expired, logging out");
                self.logout();
                self.state.send_modify(|s| {
                    s.notice = Some(format!(
                        "Your license expired on {}. Please enter a new key.",
                        expires_at.format("%Y-%m-%d")
                    ));
                });
                true
            }
            _ => false,
        }
    }

    fn stored_key(&self) -> Option<String> {
        match self.store.get() {
            Ok(key) => key.filter(|k| !k.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "Could not read stored license key");
                None
            }
        }
    }

    fn persist(&self, key: &str) {
        if let Err(e) = self.store.set(key) {
            warn!(error = %e, "Could not persist license key");
        }
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Could not clear stored license key");
        }
    }

    fn unlock(&self, source: ActivationSource) {
        self.state.send_replace(ActivationState {
            phase: ActivationPhase::Unlocked,
            source,
            last_checked_at: Some(Utc::now()),
            error: None,
            notice: None,
        });
    }

    fn lock(&self, error: Option<String>) {
        self.state.send_modify(|s| {
            s.phase = ActivationPhase::Locked;
            s.source = ActivationSource::None;
            s.error = error;
        });
    }
}

impl<A, S> LicenseGuard<A, S>
where
    A: LicenseAuthority + 'static,
    S: ActivationStore + 'static,
{
    /// Run [`sweep_once`](Self::sweep_once) every `interval` on a background task.
    ///
    /// The task holds a weak reference and ends once the guard is dropped.
    pub fn spawn_expiry_sweep(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let guard: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(guard) = guard.upgrade() else {
                    debug!("License guard dropped, stopping expiry sweep");
                    break;
                };
                guard.sweep_once();
            }
        })
    }
}

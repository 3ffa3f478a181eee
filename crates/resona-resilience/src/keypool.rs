// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rotating pool of API credentials with per-key health tracking.
//!
//! Selection is round-robin from a persistent cursor. A key that failed goes
//! into a fixed-duration cooldown and re-enters rotation lazily: the first
//! `acquire` scan past its expiry flips it back to `Active`. There is no
//! background timer.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{info, warn};

/// Health state of one credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHealth {
    /// In rotation.
    Active,
    /// Suspended until its cooldown expires or a success is reported.
    CoolingDown,
    /// Administratively removed from rotation. Never entered or left by
    /// automatic transitions -- distinct from the temporary `CoolingDown`.
    Disabled,
}

/// Classified outcome of one model call attempt, reported back to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// The call returned usable text.
    Success,
    /// The remote reported a rate limit or exhausted quota.
    QuotaExceeded,
    /// Any other remote or network failure.
    TransientFailure,
    /// A response arrived but carried no usable content. Says nothing about
    /// the key's health, so the pool leaves it untouched.
    Malformed,
}

impl KeyHealth {
    /// Stable snake_case label for status output.
    pub fn label(self) -> &'static str {
        match self {
            KeyHealth::Active => "active",
            KeyHealth::CoolingDown => "cooling_down",
            KeyHealth::Disabled => "disabled",
        }
    }
}

struct KeyEntry {
    secret: String,
    health: KeyHealth,
    cool_until: Instant,
}

struct PoolState {
    keys: Vec<KeyEntry>,
    cursor: usize,
}

/// Observability snapshot of one pool entry.
#[derive(Debug, Clone)]
pub struct KeyStatus {
    /// Masked form of the secret, safe for logs and status output.
    pub key: String,
    pub health: KeyHealth,
}

/// Shared pool of interchangeable API credentials.
///
/// `acquire` and `report` are short synchronous critical sections behind one
/// mutex; the lock is never held across a network call.
pub struct KeyPool {
    state: Mutex<PoolState>,
    cooldown: Duration,
}

impl KeyPool {
    /// Creates a pool over the given secrets with a fixed cooldown duration.
    pub fn new(secrets: Vec<String>, cooldown: Duration) -> Self {
        let now = Instant::now();
        let keys: Vec<KeyEntry> = secrets
            .into_iter()
            .map(|secret| KeyEntry {
                secret,
                health: KeyHealth::Active,
                cool_until: now,
            })
            .collect();
        info!(count = keys.len(), "key pool initialized");
        Self {
            state: Mutex::new(PoolState { keys, cursor: 0 }),
            cooldown,
        }
    }

    /// Returns the next healthy key using round-robin, or `None` when every
    /// key is cooling down or disabled.
    ///
    /// Scans at most once around the pool from the persistent cursor. Keys
    /// whose cooldown has expired are transitioned back to `Active` in
    /// passing. `None` is a legitimate "try later" condition, not an error.
    pub fn acquire(&self) -> Option<String> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let count = state.keys.len();
        if count == 0 {
            warn!("key pool is empty");
            return None;
        }

        let now = Instant::now();
        let cursor = state.cursor;
        for offset in 0..count {
            let idx = (cursor + offset) % count;
            let entry = &mut state.keys[idx];

            if entry.health == KeyHealth::CoolingDown && now >= entry.cool_until {
                entry.health = KeyHealth::Active;
                info!(key = %mask_secret(&entry.secret), "key is back from cooldown");
            }

            if entry.health == KeyHealth::Active {
                let secret = entry.secret.clone();
                state.cursor = (idx + 1) % count;
                return Some(secret);
            }
        }

        warn!("all keys are currently cooling down or disabled");
        None
    }

    /// Reports the classified outcome of a call made with `secret`.
    ///
    /// Failures start a fixed-duration cooldown. A success on a cooling key
    /// clears the cooldown immediately -- the success is proof of recovery.
    /// `Disabled` keys are never touched.
    pub fn report(&self, secret: &str, outcome: CallOutcome) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let Some(entry) = state.keys.iter_mut().find(|k| k.secret == secret) else {
            return;
        };
        if entry.health == KeyHealth::Disabled {
            return;
        }
        match outcome {
            CallOutcome::QuotaExceeded | CallOutcome::TransientFailure => {
                entry.health = KeyHealth::CoolingDown;
                entry.cool_until = Instant::now() + self.cooldown;
                warn!(
                    key = %mask_secret(secret),
                    outcome = ?outcome,
                    cooldown_secs = self.cooldown.as_secs(),
                    "key placed in cooldown"
                );
            }
            CallOutcome::Success => {
                if entry.health == KeyHealth::CoolingDown {
                    entry.health = KeyHealth::Active;
                    entry.cool_until = Instant::now();
                }
            }
            CallOutcome::Malformed => {}
        }
    }

    /// Administratively removes a key from rotation for the process lifetime.
    pub fn disable(&self, secret: &str) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = state.keys.iter_mut().find(|k| k.secret == secret) {
            entry.health = KeyHealth::Disabled;
            warn!(key = %mask_secret(secret), "key administratively disabled");
        }
    }

    /// Number of keys in the pool, regardless of health.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Masked health snapshot of every key, for status output.
    pub fn statuses(&self) -> Vec<KeyStatus> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .keys
            .iter()
            .map(|k| KeyStatus {
                key: mask_secret(&k.secret),
                health: k.health,
            })
            .collect()
    }
}

/// Masks a secret for log output: first six and last four characters.
///
/// Secrets too short to mask meaningfully are fully redacted.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 10 {
        return "***".to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

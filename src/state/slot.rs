//! Typed value bound to one storage key.
//!
//! A [`Slot`] reads its key once on open, keeps the value in memory and
//! writes through on every change. Storage faults never reach the caller:
//! they are logged and the in-memory value stays authoritative until the
//! next successful write.
//!
//! Stored text that exists but cannot be decoded puts the slot in read-only
//! mode: local changes stay in memory and are never written over the stored
//! value. Adopting a readable external value or removing the key lifts it.
//!
//! Changes made through another handle (another process on the same data
//! directory, or another clone of a memory backend) are picked up by
//! [`Slot::poll_external`]. The rule is last writer wins for the whole slot:
//! the most recent write on disk replaces the in-memory value, and the next
//! local write replaces the stored one. Nothing is merged.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::Result;
use crate::state::backend::KvBackend;
use crate::state::revive::revive;

type Fingerprint = [u8; 32];

type Watcher<T> = Box<dyn FnMut(&T)>;

/// Turns stored text into a value.
pub type Decoder<T> = fn(&str) -> Result<T>;

fn fingerprint(text: &str) -> Fingerprint {
    Sha256::digest(text.as_bytes()).into()
}

/// Parse stored text, reviving dates before typed deserialization.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    let mut value: serde_json::Value = serde_json::from_str(text)?;
    let revived = revive(&mut value);
    if revived > 0 {
        debug!(revived, "revived date strings");
    }
    Ok(serde_json::from_value(value)?)
}

/// Read `key`, falling back when it is absent or unreadable.
///
/// Faults are logged and swallowed.
pub fn read<T, B>(backend: &B, key: &str, fallback: T) -> T
where
    T: DeserializeOwned,
    B: KvBackend,
{
    read_with(backend, key, fallback, decode::<T>)
}

/// [`read`] with a custom decoder.
pub fn read_with<T, B>(backend: &B, key: &str, fallback: T, decoder: Decoder<T>) -> T
where
    B: KvBackend,
{
    match backend.get_item(key) {
        Ok(Some(text)) => match decoder(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "stored value unreadable, using fallback");
                fallback
            }
        },
        Ok(None) => fallback,
        Err(e) => {
            warn!(key, error = %e, "storage read failed, using fallback");
            fallback
        }
    }
}

/// A value of type `T` persisted under one key.
pub struct Slot<T, B: KvBackend> {
    backend: B,
    key: String,
    fallback: T,
    value: T,
    decoder: Decoder<T>,
    /// Fingerprint of the stored text last seen; `None` when the key was absent.
    seen: Option<Fingerprint>,
    /// A local change has not reached storage yet.
    dirty: bool,
    /// The stored text could not be decoded; writes are refused.
    read_only: bool,
    sync_enabled: bool,
    watchers: Vec<Watcher<T>>,
    last_error: Option<String>,
}

impl<T, B> Slot<T, B>
where
    T: Serialize + DeserializeOwned + Clone,
    B: KvBackend,
{
    /// Bind `key`, loading its current value or `fallback`.
    pub fn open(backend: B, key: impl Into<String>, fallback: T) -> Self {
        Self::open_with(backend, key, fallback, decode::<T>)
    }

    /// Bind `key`, reading stored text with `decoder`.
    pub fn open_with(
        backend: B,
        key: impl Into<String>,
        fallback: T,
        decoder: Decoder<T>,
    ) -> Self {
        let key = key.into();
        let mut slot = Self {
            backend,
            key,
            value: fallback.clone(),
            fallback,
            decoder,
            seen: None,
            dirty: false,
            read_only: false,
            sync_enabled: true,
            watchers: Vec::new(),
            last_error: None,
        };
        slot.reload();
        slot
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Whether the last local change failed to persist.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether writes are refused because the stored value is unreadable.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Most recent storage fault absorbed by this slot.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Enable or disable adoption of external changes.
    pub fn set_sync(&mut self, enabled: bool) {
        self.sync_enabled = enabled;
    }

    /// Register a callback run whenever an external change is adopted.
    pub fn watch<F>(&mut self, watcher: F)
    where
        F: FnMut(&T) + 'static,
    {
        self.watchers.push(Box::new(watcher));
    }

    /// Replace the value and write it through.
    pub fn set(&mut self, value: T) -> &T {
        self.value = value;
        self.persist();
        &self.value
    }

    /// Read-modify-write against the current in-memory value.
    pub fn update<F>(&mut self, f: F) -> &T
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next)
    }

    /// Delete the key and fall back. Allowed even when read-only.
    pub fn remove(&mut self) {
        self.value = self.fallback.clone();
        match self.backend.remove_item(&self.key) {
            Ok(()) => {
                self.seen = None;
                self.dirty = false;
                self.read_only = false;
                self.last_error = None;
            }
            Err(e) => {
                self.dirty = true;
                self.record_fault("remove", e.to_string());
            }
        }
    }

    /// Adopt a value written by another handle, if the stored text changed.
    ///
    /// Returns true when the in-memory value was replaced and watchers ran.
    pub fn poll_external(&mut self) -> bool {
        if !self.sync_enabled {
            return false;
        }

        let stored = match self.backend.get_item(&self.key) {
            Ok(stored) => stored,
            Err(e) => {
                self.record_fault("poll", e.to_string());
                return false;
            }
        };

        let current = stored.as_deref().map(fingerprint);
        if current == self.seen {
            return false;
        }
        self.seen = current;

        let next = match stored {
            None => self.fallback.clone(),
            Some(text) => match (self.decoder)(&text) {
                Ok(value) => value,
                Err(e) => {
                    warn!(key = %self.key, error = %e, "ignoring unreadable external change");
                    self.read_only = true;
                    self.last_error = Some(e.to_string());
                    return false;
                }
            },
        };

        debug!(key = %self.key, "adopting external change");
        self.value = next;
        self.dirty = false;
        if self.read_only {
            self.read_only = false;
            self.last_error = None;
        }
        for watcher in self.watchers.iter_mut() {
            watcher(&self.value);
        }
        true
    }

    fn reload(&mut self) {
        match self.backend.get_item(&self.key) {
            Ok(Some(text)) => {
                self.seen = Some(fingerprint(&text));
                match (self.decoder)(&text) {
                    Ok(value) => self.value = value,
                    Err(e) => {
                        self.read_only = true;
                        self.record_fault("read", e.to_string());
                    }
                }
            }
            Ok(None) => self.seen = None,
            Err(e) => {
                self.read_only = true;
                self.record_fault("read", e.to_string());
            }
        }
    }

    fn persist(&mut self) {
        if self.read_only {
            self.dirty = true;
            warn!(key = %self.key, "stored value unreadable, write refused");
            return;
        }

        let text = match serde_json::to_string(&self.value) {
            Ok(text) => text,
            Err(e) => {
                self.dirty = true;
                self.record_fault("serialize", e.to_string());
                return;
            }
        };

        match self.backend.set_item(&self.key, &text) {
            Ok(()) => {
                self.seen = Some(fingerprint(&text));
                self.dirty = false;
                self.last_error = None;
            }
            Err(e) => {
                self.dirty = true;
                self.record_fault("write", e.to_string());
            }
        }
    }

    fn record_fault(&mut self, operation: &'static str, message: String) {
        warn!(key = %self.key, operation, error = %message, "storage fault absorbed");
        self.last_error = Some(message);
    }
}

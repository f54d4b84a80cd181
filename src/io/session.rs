// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session cache.
//!
//! The full editor state is written as JSON after store transitions and
//! read back once at startup. Writes happen on a background thread that
//! only keeps the newest pending state, so a burst of transitions (such as
//! playback ticks) costs one write. The in-memory store stays
//! authoritative: write failures are logged and otherwise ignored.

use super::serialization;
use crate::error::EditorResult;
use crate::models::project::EditorState;
use crate::models::store::{Store, SubscriptionId};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};

#[derive(Debug, Clone)]
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached state, if present and parseable.
    pub fn load(&self) -> Option<EditorState> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                log::debug!("No session cache at {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serialization::parse_json(&text) {
            Ok(state) => {
                log::info!(
                    "Restored session from {} ({} layers)",
                    self.path.display(),
                    state.layers.len()
                );
                Some(state)
            }
            Err(e) => {
                log::warn!("Ignoring unreadable session cache {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, state: &EditorState) -> EditorResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(state)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Save, logging and swallowing any failure.
    pub fn persist(&self, state: &EditorState) {
        if let Err(e) = self.save(state) {
            log::warn!("Failed to write session cache {}: {}", self.path.display(), e);
        }
    }

    /// Persist the transitions of `store` from a writer thread.
    pub fn attach(self, store: &mut Store) -> SessionWriter {
        let (tx, rx) = channel();
        std::thread::spawn(move || self.write_loop(rx));

        let sender = tx.clone();
        let subscription = store.subscribe(move |state| {
            if sender.send(WriteRequest::Save(state.clone())).is_err() {
                log::warn!("Session writer has stopped; dropping state");
            }
        });
        SessionWriter { tx, subscription }
    }

    fn write_loop(self, rx: Receiver<WriteRequest>) {
        while let Ok(first) = rx.recv() {
            let mut latest = None;
            let mut acks = Vec::new();
            let mut next = Some(first);
            while let Some(request) = next {
                match request {
                    WriteRequest::Save(state) => latest = Some(state),
                    WriteRequest::Flush(ack) => acks.push(ack),
                }
                next = rx.try_recv().ok();
            }
            if let Some(state) = latest {
                self.persist(&state);
            }
            for ack in acks {
                let _ = ack.send(());
            }
        }
        log::debug!("Session writer for {} stopped", self.path.display());
    }
}

enum WriteRequest {
    Save(EditorState),
    Flush(Sender<()>),
}

/// Handle to an attached cache's writer thread.
pub struct SessionWriter {
    tx: Sender<WriteRequest>,
    subscription: SubscriptionId,
}

impl SessionWriter {
    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Block until every state sent so far has been written.
    pub fn flush(&self) {
        let (ack, done) = channel();
        if self.tx.send(WriteRequest::Flush(ack)).is_ok() {
            let _ = done.recv();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layer::{LayerOptions, LayerType};
    use crate::models::store::NewLayer;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("stagecraft-session-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_missing_cache_loads_nothing() {
        let cache = SessionCache::new(temp_path("missing.json"));
        assert!(cache.load().is_none());
    }

    #[test]
    fn test_attached_cache_follows_transitions() {
        let path = temp_path("attached.json");
        let mut store = Store::default();
        let writer = SessionCache::new(&path).attach(&mut store);

        let id = store.add_layer(NewLayer {
            layer_type: LayerType::Image,
            options: LayerOptions::image("a.png"),
            start: 0.0,
            end: 5.0,
        });
        store.set_selected_layer(Some(id.clone()));
        writer.flush();

        let restored = SessionCache::new(&path).load().unwrap();
        assert_eq!(&restored, store.state());
        assert_eq!(restored.selected_layer_id, Some(id));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_burst_of_ticks_ends_on_newest_state() {
        let path = temp_path("burst.json");
        let mut store = Store::default();
        let writer = SessionCache::new(&path).attach(&mut store);

        for frame in 1..=240 {
            store.set_current_time(frame as f64 / 60.0);
        }
        writer.flush();

        let restored = SessionCache::new(&path).load().unwrap();
        assert_eq!(restored.current_time, 4.0);

        store.unsubscribe(writer.subscription());
        store.set_current_time(1.0);
        writer.flush();
        let restored = SessionCache::new(&path).load().unwrap();
        assert_eq!(restored.current_time, 4.0);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_flush_survives_dropped_store() {
        let path = temp_path("dropped.json");
        let mut store = Store::default();
        let writer = SessionCache::new(&path).attach(&mut store);
        store.set_current_time(2.5);
        drop(store);

        writer.flush();
        let restored = SessionCache::new(&path).load().unwrap();
        assert_eq!(restored.current_time, 2.5);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_corrupt_cache_is_ignored() {
        let path = temp_path("corrupt.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{\"layers\": [").unwrap();
        assert!(SessionCache::new(&path).load().is_none());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        // A directory cannot be overwritten with a file.
        let dir = temp_path("occupied");
        std::fs::create_dir_all(&dir).unwrap();
        let cache = SessionCache::new(&dir);
        assert!(cache.save(&EditorState::default()).is_err());
        cache.persist(&EditorState::default());
        std::fs::remove_dir(&dir).unwrap();
    }
}

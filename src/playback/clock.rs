// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback clock.
//!
//! While the store says it is playing, the clock advances `currentTime`
//! from an anchor: `start_time + elapsed * speed`. Each tick hands back a
//! [`TickHandle`] for the next one, so the host drives the chain at its own
//! frame rate. Pausing, scrubbing or a speed change bumps the clock's
//! generation, which turns any handle still held by the host into a no-op.

use crate::models::project::EditorState;
use crate::models::store::{Action, Store};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Playing,
}

/// Permission to run exactly one tick of a given anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a dropped handle ends the tick chain"]
pub struct TickHandle {
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    started_at: Instant,
    start_time: f64,
    speed: f64,
    /// Last cursor value this anchor wrote.
    last_time: f64,
}

#[derive(Debug, Default)]
pub struct PlaybackClock {
    anchor: Option<Anchor>,
    generation: u64,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ClockState {
        if self.anchor.is_some() {
            ClockState::Playing
        } else {
            ClockState::Stopped
        }
    }

    /// Follow the store's play flag and speed.
    ///
    /// Returns a handle for the first tick whenever the clock (re)anchors:
    /// on entering play, on a speed change while playing, or when the cursor
    /// was moved by someone other than the clock.
    pub fn sync(&mut self, state: &EditorState, now: Instant) -> Option<TickHandle> {
        if !state.is_playing {
            if self.anchor.is_some() {
                self.cancel();
            }
            return None;
        }

        match self.anchor {
            Some(anchor)
                if anchor.speed == state.playback_speed
                    && anchor.last_time == state.current_time =>
            {
                None
            }
            _ => Some(self.anchor_at(state.current_time, state.playback_speed, now)),
        }
    }

    fn anchor_at(&mut self, start_time: f64, speed: f64, now: Instant) -> TickHandle {
        self.generation += 1;
        self.anchor = Some(Anchor {
            started_at: now,
            start_time,
            speed,
            last_time: start_time,
        });
        log::debug!("clock anchored at {:.3}s x{}", start_time, speed);
        TickHandle {
            generation: self.generation,
        }
    }

    /// Drop the anchor and invalidate outstanding handles.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.anchor = None;
    }

    /// Advance the store's cursor. Returns the handle for the next tick, or
    /// `None` when the chain ends (stale handle, paused, or end reached).
    pub fn tick(&mut self, handle: TickHandle, store: &mut Store, now: Instant) -> Option<TickHandle> {
        if handle.generation != self.generation {
            return None;
        }
        let mut anchor = self.anchor?;
        if !store.state().is_playing {
            self.cancel();
            return None;
        }

        let elapsed = now.saturating_duration_since(anchor.started_at).as_secs_f64();
        let next_time = anchor.start_time + elapsed * anchor.speed;
        let duration = store.state().duration;

        if next_time >= duration {
            store.dispatch_all([Action::SetCurrentTime(duration), Action::SetIsPlaying(false)]);
            self.cancel();
            log::debug!("playback reached end at {:.3}s", duration);
            None
        } else {
            store.set_current_time(next_time);
            anchor.last_time = store.state().current_time;
            self.anchor = Some(anchor);
            Some(handle)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn playing_store(current_time: f64, duration: f64, speed: f64) -> Store {
        let mut state = EditorState::with_duration(duration);
        state.current_time = current_time;
        state.is_playing = true;
        state.playback_speed = speed;
        Store::new(state)
    }

    #[test]
    fn test_advances_by_elapsed_times_speed() {
        let mut store = playing_store(1.0, 30.0, 2.0);
        let mut clock = PlaybackClock::new();
        let t0 = Instant::now();

        let handle = clock.sync(store.state(), t0).unwrap();
        let next = clock.tick(handle, &mut store, t0 + Duration::from_millis(1500));
        assert!(next.is_some());
        assert!((store.state().current_time - 4.0).abs() < 1e-9);
        assert_eq!(clock.state(), ClockState::Playing);
    }

    #[test]
    fn test_stops_and_clamps_at_duration() {
        let mut store = playing_store(9.0, 10.0, 1.0);
        let mut clock = PlaybackClock::new();
        let t0 = Instant::now();

        let handle = clock.sync(store.state(), t0).unwrap();
        let next = clock.tick(handle, &mut store, t0 + Duration::from_secs(2));
        assert!(next.is_none());
        assert_eq!(store.state().current_time, 10.0);
        assert!(!store.state().is_playing);
        assert_eq!(clock.state(), ClockState::Stopped);
    }

    #[test]
    fn test_sync_is_idempotent_while_playing() {
        let store = playing_store(0.0, 10.0, 1.0);
        let mut clock = PlaybackClock::new();
        let t0 = Instant::now();
        assert!(clock.sync(store.state(), t0).is_some());
        assert!(clock.sync(store.state(), t0 + Duration::from_millis(16)).is_none());
    }

    #[test]
    fn test_pause_invalidates_scheduled_tick() {
        let mut store = playing_store(2.0, 10.0, 1.0);
        let mut clock = PlaybackClock::new();
        let t0 = Instant::now();
        let handle = clock.sync(store.state(), t0).unwrap();

        store.scrub(5.0);
        assert!(clock.sync(store.state(), t0).is_none());

        let next = clock.tick(handle, &mut store, t0 + Duration::from_secs(1));
        assert!(next.is_none());
        assert_eq!(store.state().current_time, 5.0);
    }

    #[test]
    fn test_speed_change_reanchors() {
        let mut store = playing_store(0.0, 30.0, 1.0);
        let mut clock = PlaybackClock::new();
        let t0 = Instant::now();

        let handle = clock.sync(store.state(), t0).unwrap();
        let handle = clock
            .tick(handle, &mut store, t0 + Duration::from_secs(2))
            .unwrap();
        assert!((store.state().current_time - 2.0).abs() < 1e-9);

        store.set_playback_speed(2.0);
        let t1 = t0 + Duration::from_secs(2);
        let fresh = clock.sync(store.state(), t1).unwrap();

        // The old chain is dead; the new one continues from 2.0 at double speed.
        assert!(clock.tick(handle, &mut store, t1 + Duration::from_secs(1)).is_none());
        let _ = clock.tick(fresh, &mut store, t1 + Duration::from_secs(1)).unwrap();
        assert!((store.state().current_time - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_external_cursor_move_reanchors() {
        let mut store = playing_store(0.0, 30.0, 1.0);
        let mut clock = PlaybackClock::new();
        let t0 = Instant::now();
        let handle = clock.sync(store.state(), t0).unwrap();
        let _ = clock.tick(handle, &mut store, t0 + Duration::from_secs(1));

        store.set_current_time(20.0);
        let t1 = t0 + Duration::from_secs(1);
        let fresh = clock.sync(store.state(), t1).unwrap();
        let _ = clock.tick(fresh, &mut store, t1 + Duration::from_millis(500));
        assert!((store.state().current_time - 20.5).abs() < 1e-9);
    }

    #[test]
    fn test_stopped_store_never_anchors() {
        let store = Store::default();
        let mut clock = PlaybackClock::new();
        assert!(clock.sync(store.state(), Instant::now()).is_none());
        assert_eq!(clock.state(), ClockState::Stopped);
    }
}

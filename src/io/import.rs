// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background project import.
//!
//! Reading, validating and preloading happen on a worker thread; the UI
//! polls the job each frame and hydrates the store once it completes.

use super::media::{self, AssetReport};
use super::serialization;
use crate::error::{EditorError, EditorResult};
use crate::models::project::EditorState;
use crate::models::store::{Action, Store};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};

/// A parsed project whose assets have all been waited on.
#[derive(Debug)]
pub struct ImportedProject {
    pub source: PathBuf,
    pub state: EditorState,
    pub assets: Vec<AssetReport>,
}

/// Parse, validate and preload synchronously.
pub fn load_project(path: &Path) -> EditorResult<ImportedProject> {
    let state = serialization::import_project(path)?;
    log::info!("Imported {} layers from {}", state.layers.len(), path.display());
    let assets = media::preload_assets(&state);
    Ok(ImportedProject {
        source: path.to_path_buf(),
        state,
        assets,
    })
}

/// An import running on a worker thread.
pub struct ImportJob {
    receiver: Receiver<EditorResult<ImportedProject>>,
}

impl ImportJob {
    /// Flag the store as loading and start importing `path`.
    pub fn start(path: PathBuf, store: &mut Store) -> Self {
        store.set_loading(true);
        let (sender, receiver) = channel();
        std::thread::spawn(move || {
            let _ = sender.send(load_project(&path));
        });
        Self { receiver }
    }

    /// The result once the worker has finished.
    pub fn poll(&self) -> Option<EditorResult<ImportedProject>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(EditorError::invalid_project(
                "import worker stopped without a result",
            ))),
        }
    }
}

/// Hydrate the store from a finished import and clear the loading flag.
///
/// On failure the state is left as it was; only the loading flag changes.
pub fn complete_import(store: &mut Store, result: EditorResult<ImportedProject>) -> EditorResult<()> {
    match result {
        Ok(imported) => {
            log::info!("Assets loaded, state hydrated from {}", imported.source.display());
            store.dispatch_all([
                Action::LoadState(Box::new(imported.state)),
                Action::SetLoading(false),
            ]);
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to load project: {}", e);
            store.set_loading(false);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::AspectRatio;
    use std::time::{Duration, Instant};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("stagecraft-import-{}-{}", std::process::id(), name))
    }

    fn wait(job: &ImportJob) -> EditorResult<ImportedProject> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = job.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "import did not finish");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_import_replaces_state_and_clears_loading() {
        let path = temp_path("ok.json");
        std::fs::write(
            &path,
            r#"{"layers": [{"id": "v1", "type": "video", "name": "Clip", "zIndex": 1,
                "timeline": {"start": 0, "end": 4},
                "geometry": {"x": 0.1, "y": 0.1, "width": 0.3, "height": 0.3},
                "options": {"videoUrl": "/nonexistent/clip.mp4"}}],
               "stage": {"aspectRatio": "1:1"}, "duration": 12, "isLoading": true}"#,
        )
        .unwrap();

        let mut store = Store::default();
        let job = ImportJob::start(path.clone(), &mut store);
        assert!(store.state().is_loading);

        let result = wait(&job);
        complete_import(&mut store, result).unwrap();
        assert!(!store.state().is_loading);
        assert_eq!(store.state().stage.aspect_ratio, AspectRatio::Square);
        assert_eq!(store.state().duration, 12.0);
        assert_eq!(store.state().layers[0].id, "v1");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_invalid_project_leaves_state_unchanged() {
        let path = temp_path("bad.json");
        std::fs::write(&path, r#"{"layers": []}"#).unwrap();

        let mut store = Store::default();
        store.set_stage_size(AspectRatio::Portrait4x5);
        let before = store.state().clone();

        let job = ImportJob::start(path.clone(), &mut store);
        let err = complete_import(&mut store, wait(&job)).unwrap_err();
        assert!(matches!(err, EditorError::InvalidProject(_)));
        assert_eq!(store.state(), &before);

        std::fs::remove_file(&path).unwrap();
    }
}

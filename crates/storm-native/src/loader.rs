//! Background loading of the optional boat model.
//!
//! The OBJ file is read and parsed on a worker thread; the frame loop polls
//! for the result and hands it to the simulation between ticks.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use storm_core::asset::load_obj;
use storm_core::{AssetLoadFailure, ModelHandle};

pub type LoadResult = Result<ModelHandle, AssetLoadFailure>;

pub struct ModelLoader {
    rx: Receiver<LoadResult>,
    path: PathBuf,
}

impl ModelLoader {
    pub fn spawn(path: PathBuf) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let worker_path = path.clone();
        thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                let result = load_obj(&worker_path);
                // The receiver is gone if the window closed first.
                let _ = tx.send(result);
            })?;
        log::info!("[loader] loading {}", path.display());
        Ok(Self { rx, path })
    }

    /// Non-blocking. `Some` exactly once, when the worker has finished.
    pub fn poll(&self) -> Option<LoadResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::error!("[loader] worker for {} exited without a result", self.path.display());
                Some(Err(AssetLoadFailure::Empty))
            }
        }
    }
}

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use log::{error, info};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::terrain::build_terrain;
use crate::terrain::error::Result;
use crate::terrain::image_source::ImageHeightmap;
use crate::terrain::mesh::{EdgePolicy, MeshBuffers, MeshScales};
use crate::terrain::normals::NormalReport;

pub enum TerrainCommand {
    Load {
        path: PathBuf,
        scales: MeshScales,
        edge_policy: EdgePolicy,
    },
    Stop,
}

pub struct LoadedTerrain {
    pub path: PathBuf,
    pub mesh: MeshBuffers,
    pub normals: NormalReport,
    pub elapsed: Duration,
}

pub enum TerrainResult {
    Mesh(LoadedTerrain),
    Error(String),
}

/// Decodes heightmaps and builds their meshes on a worker thread.
pub struct TerrainEngine {
    tx_cmd: Sender<TerrainCommand>,
    rx_result: Receiver<TerrainResult>,
    last_error: Arc<Mutex<Option<String>>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl TerrainEngine {
    pub fn new() -> Self {
        let (tx_cmd, rx_cmd) = channel::unbounded::<TerrainCommand>();
        let (tx_result, rx_result) = channel::bounded::<TerrainResult>(2);
        let last_error = Arc::new(Mutex::new(None));
        let last_error_clone = Arc::clone(&last_error);

        let thread_handle = thread::Builder::new()
            .name("terrain-loader".into())
            .spawn(move || terrain_thread(rx_cmd, tx_result, last_error_clone))
            .ok();
        if thread_handle.is_none() {
            *last_error.lock() = Some("failed to spawn terrain loader thread".to_string());
        }

        Self {
            tx_cmd,
            rx_result,
            last_error,
            thread_handle,
        }
    }

    pub fn load(&self, path: &Path, scales: MeshScales, edge_policy: EdgePolicy) {
        let _ = self.tx_cmd.send(TerrainCommand::Load {
            path: path.to_path_buf(),
            scales,
            edge_policy,
        });
    }

    pub fn try_recv_result(&self) -> Option<TerrainResult> {
        self.rx_result.try_recv().ok()
    }

    pub fn recv_result_timeout(&self, timeout: Duration) -> Option<TerrainResult> {
        match self.rx_result.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn stop(&self) {
        let _ = self.tx_cmd.send(TerrainCommand::Stop);
    }
}

impl Default for TerrainEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerrainEngine {
    fn drop(&mut self) {
        let _ = self.tx_cmd.send(TerrainCommand::Stop);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn terrain_thread(
    rx_cmd: Receiver<TerrainCommand>,
    tx_result: Sender<TerrainResult>,
    last_error: Arc<Mutex<Option<String>>>,
) {
    loop {
        let cmd = match rx_cmd.recv() {
            Ok(c) => c,
            Err(_) => return,
        };

        match cmd {
            TerrainCommand::Load {
                path,
                scales,
                edge_policy,
            } => {
                *last_error.lock() = None;

                match load_terrain(&path, &scales, edge_policy) {
                    Ok(loaded) => {
                        info!(
                            "terrain ready: {} vertices, {} triangles in {:.1?}",
                            loaded.mesh.vertex_count(),
                            loaded.mesh.triangle_count(),
                            loaded.elapsed
                        );
                        let _ = tx_result.send(TerrainResult::Mesh(loaded));
                    }
                    Err(e) => {
                        let msg = e.to_string();
                        error!("{msg}");
                        *last_error.lock() = Some(msg.clone());
                        let _ = tx_result.send(TerrainResult::Error(msg));
                    }
                }
            }
            TerrainCommand::Stop => return,
        }
    }
}

/// Decode `path` and build its mesh on the calling thread.
pub fn load_terrain(
    path: &Path,
    scales: &MeshScales,
    edge_policy: EdgePolicy,
) -> Result<LoadedTerrain> {
    let start = Instant::now();
    let heightmap = ImageHeightmap::open(path)?;
    let (mesh, normals) = build_terrain(&heightmap, scales, edge_policy)?;

    Ok(LoadedTerrain {
        path: path.to_path_buf(),
        mesh,
        normals,
        elapsed: start.elapsed(),
    })
}

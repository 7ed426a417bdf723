//! Background scene loading
//!
//! The model file is parsed on its own thread so the render loop keeps
//! presenting frames while it loads. Any failure substitutes the procedural
//! fallback; the render loop just polls the receiver once per frame.

use std::path::PathBuf;

use crossbeam_channel::Receiver;

use orrery_asset::procedural::fallback_scene;
use orrery_asset::SceneAsset;

/// Result of the background load.
pub struct LoadedScene {
    pub scene: SceneAsset,
    /// True when the procedural fallback was substituted
    pub fallback: bool,
}

/// Load the scene on a background thread; the receiver yields exactly one
/// message.
pub fn spawn_scene_loader(path: PathBuf) -> Receiver<LoadedScene> {
    let (tx, rx) = crossbeam_channel::bounded(1);

    std::thread::spawn(move || {
        let loaded = match orrery_asset::gltf::load_file(&path) {
            Ok(scene) => LoadedScene {
                scene,
                fallback: false,
            },
            Err(e) => {
                log::warn!("{}; showing procedural fallback", e);
                LoadedScene {
                    scene: fallback_scene(),
                    fallback: true,
                }
            }
        };
        let _ = tx.send(loaded);
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_missing_model_falls_back() {
        let rx = spawn_scene_loader(PathBuf::from("no/such/model.glb"));
        let loaded = rx.recv_timeout(Duration::from_secs(10)).unwrap();

        assert!(loaded.fallback);
        assert!(!loaded.scene.meshes.is_empty());
        assert!(!loaded.scene.stars.is_empty());
    }
}

pub mod assignment;
pub mod config;
pub mod direction;
pub mod error;
pub mod frame;
pub mod math;
pub mod rect;
pub mod scene;
pub mod tracker;
pub mod trajectory;

pub use config::Config;
pub use direction::{CountEvent, Direction, DirectionCounter, LaneSide, Mode};
pub use frame::Frame;
pub use rect::Rect;
pub use scene::{Scene, SceneUpdate, TrackedObject};
pub use tracker::CentroidTracker;
pub use trajectory::TrajectoryRecord;

use nalgebra as na;
use std::collections::HashMap;

/// Integer pixel position of a detection center
pub type Centroid = na::Point2<i32>;

pub trait Counting {
    fn update(&mut self, frame: &Frame, src: &str) -> SceneUpdate;
    fn counts(&self, src: &str) -> Vec<(String, u32)>;
}

/// Line crossing counter over any number of independent sources
pub struct TrafficCounter {
    config: Config,
    scenes: HashMap<String, Scene>,
}

impl TrafficCounter {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            scenes: HashMap::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn scene(&self, src: &str) -> Option<&Scene> {
        self.scenes.get(src)
    }
}

impl crate::Counting for TrafficCounter {
    fn update(&mut self, frame: &Frame, src: &str) -> SceneUpdate {
        let config = &self.config;

        // the reference line is fixed by the first frame of a source
        let scene = self
            .scenes
            .entry(src.to_string())
            .or_insert_with(|| Scene::new(config, frame.dims));

        scene.process(&frame.rects)
    }

    #[inline]
    fn counts(&self, src: &str) -> Vec<(String, u32)> {
        if let Some(scene) = self.scenes.get(src) {
            return scene.counter().labeled_counts();
        }

        Vec::new()
    }
}

use std::collections::BTreeMap;

use log::{trace, warn};

use crate::config::Config;
use crate::direction::{CountEvent, DirectionCounter, Mode};
use crate::rect::Rect;
use crate::tracker::CentroidTracker;
use crate::trajectory::TrajectoryRecord;
use crate::Centroid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedObject {
    pub id: u32,
    pub centroid: Centroid,
    pub counted: bool,
}

/// Result of processing one frame
#[derive(Debug, Clone, Default)]
pub struct SceneUpdate {
    pub objects: Vec<TrackedObject>,
    pub events: Vec<CountEvent>,

    /// Counts of the most recent count event, kept across frames
    pub counts: Option<Vec<(String, u32)>>,
}

/// Counting state of one video source
pub struct Scene {
    tracker: CentroidTracker,
    counter: DirectionCounter,
    records: BTreeMap<u32, TrajectoryRecord>,
    min_area: Option<i64>,
    limit: Option<i32>,
    direction_window: usize,
    counts: Option<Vec<(String, u32)>>,
}

impl Scene {
    pub fn new(config: &Config, dims: (u32, u32)) -> Self {
        let tracker = CentroidTracker::new(config.max_disappeared, config.max_distance)
            .with_assignment(config.assignment);

        Self {
            tracker,
            counter: DirectionCounter::from_config(config, dims),
            records: BTreeMap::new(),
            min_area: config.min_area,
            limit: config.limit,
            direction_window: config.direction_window,
            counts: None,
        }
    }

    #[inline]
    pub fn tracker(&self) -> &CentroidTracker {
        &self.tracker
    }

    #[inline]
    pub fn counter(&self) -> &DirectionCounter {
        &self.counter
    }

    #[inline]
    pub fn record(&self, id: u32) -> Option<&TrajectoryRecord> {
        self.records.get(&id)
    }

    /// Drops malformed, too small and too distant rects
    pub fn gate(&self, rects: &[Rect]) -> Vec<Rect> {
        let mode = self.counter.mode();

        rects
            .iter()
            .filter(|r| {
                if !r.is_valid() {
                    warn!("dropping malformed rect {:?}", r);
                    return false;
                }

                true
            })
            .filter(|r| self.min_area.map_or(true, |min| r.area() >= min))
            .filter(|r| match (self.limit, mode) {
                (Some(limit), Mode::Vertical) => r.y_min >= limit,
                (Some(limit), Mode::Horizontal) => r.x_min <= limit,
                (None, _) => true,
            })
            .copied()
            .collect()
    }

    pub fn process(&mut self, rects: &[Rect]) -> SceneUpdate {
        let rects = self.gate(rects);
        let objects = self.tracker.update(&rects);

        // evicted identities never come back
        self.records.retain(|id, _| objects.contains_key(id));

        let mut events = Vec::new();
        let mut tracked = Vec::with_capacity(objects.len());

        for (&id, &centroid) in &objects {
            let counted = match self.records.get_mut(&id) {
                Some(record) => {
                    if let Some(event) = self.counter.evaluate(record, centroid) {
                        events.push(event);
                    }

                    record.counted()
                }
                None => {
                    self.records.insert(
                        id,
                        TrajectoryRecord::new(id, centroid, self.direction_window),
                    );

                    false
                }
            };

            trace!("{} {} {}", id, centroid.x, centroid.y);

            tracked.push(TrackedObject {
                id,
                centroid,
                counted,
            });
        }

        if let Some(event) = events.last() {
            self.counts = Some(event.counts.clone());
        }

        SceneUpdate {
            objects: tracked,
            events,
            counts: self.counts.clone(),
        }
    }
}

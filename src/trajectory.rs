use crate::direction::DirectionState;
use crate::Centroid;

/// Centroid history and counting state of one identity
#[derive(Debug, Clone)]
pub struct TrajectoryRecord {
    pub id: u32,
    centroids: Vec<Centroid>,
    counted: bool,
    pub(crate) direction: DirectionState,
}

impl TrajectoryRecord {
    pub fn new(id: u32, centroid: Centroid, direction_window: usize) -> Self {
        Self {
            id,
            centroids: vec![centroid],
            counted: false,
            direction: DirectionState::new(direction_window),
        }
    }

    /// Chronological, oldest first
    #[inline]
    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    #[inline]
    pub fn last(&self) -> Option<&Centroid> {
        self.centroids.last()
    }

    #[inline]
    pub fn counted(&self) -> bool {
        self.counted
    }

    #[inline]
    pub fn direction(&self) -> &DirectionState {
        &self.direction
    }

    #[inline]
    pub(crate) fn push(&mut self, centroid: Centroid) {
        self.centroids.push(centroid);
    }

    // once set the record stays counted
    #[inline]
    pub(crate) fn mark_counted(&mut self) {
        self.counted = true;
    }
}

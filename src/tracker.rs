use std::collections::BTreeMap;

use log::debug;

use crate::assignment::{self, Assignment};
use crate::rect::Rect;
use crate::Centroid;

/// Live identity in the tracker registry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub centroid: Centroid,
    pub disappeared: u32,
}

/// Assigns stable identities to per-frame detections by nearest centroid.
///
/// Identities start at 1 and are never reused, also after an identity
/// has been evicted.
#[derive(Debug)]
pub struct CentroidTracker {
    next_id: u32,
    objects: BTreeMap<u32, Entry>,
    max_disappeared: u32,
    max_distance: f32,
    assignment: Assignment,
}

impl CentroidTracker {
    pub fn new(max_disappeared: u32, max_distance: f32) -> Self {
        Self {
            next_id: 1,
            objects: BTreeMap::new(),
            max_disappeared,
            max_distance,
            assignment: Assignment::Greedy,
        }
    }

    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignment = assignment;
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<&Entry> {
        self.objects.get(&id)
    }

    /// Current centroid of every live identity
    pub fn objects(&self) -> BTreeMap<u32, Centroid> {
        self.objects
            .iter()
            .map(|(&id, e)| (id, e.centroid))
            .collect()
    }

    fn register(&mut self, centroid: Centroid) {
        let id = self.next_id;
        self.next_id += 1;

        debug!("object {} registered at ({}, {})", id, centroid.x, centroid.y);

        self.objects.insert(
            id,
            Entry {
                centroid,
                disappeared: 0,
            },
        );
    }

    /// Bumps the missed counter and evicts the identity once it exceeds `max_disappeared`
    fn mark_missed(&mut self, id: u32) {
        let evict = match self.objects.get_mut(&id) {
            Some(entry) => {
                entry.disappeared += 1;
                entry.disappeared > self.max_disappeared
            }
            None => false,
        };

        if evict {
            debug!("object {} deregistered", id);
            self.objects.remove(&id);
        }
    }

    /// Consumes one frame of detections and returns the live identities
    pub fn update(&mut self, rects: &[Rect]) -> BTreeMap<u32, Centroid> {
        if rects.is_empty() {
            let ids: Vec<u32> = self.objects.keys().copied().collect();
            for id in ids {
                self.mark_missed(id);
            }

            return self.objects();
        }

        let centroids: Vec<Centroid> = rects.iter().map(Rect::centroid).collect();

        if self.objects.is_empty() {
            for c in centroids {
                self.register(c);
            }

            return self.objects();
        }

        let ids: Vec<u32> = self.objects.keys().copied().collect();
        let known: Vec<Centroid> = self.objects.values().map(|e| e.centroid).collect();

        let dist = assignment::distance_matrix(&known, &centroids);
        let matches = self.assignment.solve(&dist, self.max_distance);

        let mut used_rows = vec![false; ids.len()];
        let mut used_cols = vec![false; centroids.len()];

        for (row, col) in matches {
            used_rows[row] = true;
            used_cols[col] = true;

            if let Some(entry) = self.objects.get_mut(&ids[row]) {
                entry.centroid = centroids[col];
                entry.disappeared = 0;
            }
        }

        for (row, used) in used_rows.into_iter().enumerate() {
            if !used {
                self.mark_missed(ids[row]);
            }
        }

        for (col, used) in used_cols.into_iter().enumerate() {
            if !used {
                self.register(centroids[col]);
            }
        }

        self.objects()
    }
}

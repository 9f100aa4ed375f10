use std::collections::{BTreeMap, VecDeque};
use std::str::FromStr;

use log::info;
use serde_derive::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::math;
use crate::trajectory::TrajectoryRecord;
use crate::Centroid;

/// Axis along which traffic moves
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Up/down traffic, the reference line is horizontal
    #[default]
    Vertical,

    /// Left/right traffic, the reference line is vertical
    Horizontal,
}

impl Mode {
    /// Coordinate along the direction of travel
    #[inline]
    pub fn along(&self, c: &Centroid) -> i32 {
        match self {
            Mode::Vertical => c.y,
            Mode::Horizontal => c.x,
        }
    }

    /// Coordinate across the direction of travel, compared with the lane point
    #[inline]
    pub fn across(&self, c: &Centroid) -> i32 {
        match self {
            Mode::Vertical => c.x,
            Mode::Horizontal => c.y,
        }
    }

    /// Directions in display order, decreasing coordinate first
    #[inline]
    pub fn directions(&self) -> [Direction; 2] {
        match self {
            Mode::Vertical => [Direction::Up, Direction::Down],
            Mode::Horizontal => [Direction::Left, Direction::Right],
        }
    }
}

/// Accepts the same names as the config file, `vertical` or `horizontal`
impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|e| Error::InvalidConfig(format!("unknown mode `{}`: {}", s, e)))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// True when moving this way increases the image coordinate
    #[inline]
    pub fn is_increasing(&self) -> bool {
        matches!(self, Direction::Down | Direction::Right)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }
}

/// Side of the lane point a crossing happened on
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LaneSide {
    /// Cross-axis coordinate below the lane point
    Before,
    After,
}

impl LaneSide {
    pub fn label(&self, mode: Mode) -> &'static str {
        match (mode, self) {
            (Mode::Vertical, LaneSide::Before) => "left lane",
            (Mode::Vertical, LaneSide::After) => "right lane",
            (Mode::Horizontal, LaneSide::Before) => "upper lane",
            (Mode::Horizontal, LaneSide::After) => "lower lane",
        }
    }
}

/// Smoothed direction of one trajectory
#[derive(Debug, Clone)]
pub struct DirectionState {
    // newest last, at most `window` long
    deltas: VecDeque<f32>,
    window: usize,
    direction: Option<Direction>,
}

impl DirectionState {
    pub fn new(window: usize) -> Self {
        Self {
            deltas: VecDeque::new(),
            window: window.max(1),
            direction: None,
        }
    }

    /// Sum of the recent deltas, `None` until one was recorded
    pub fn tendency(&self) -> Option<f32> {
        if self.deltas.is_empty() {
            None
        } else {
            Some(self.deltas.iter().sum())
        }
    }

    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    fn push(&mut self, mode: Mode, delta: f32) {
        if self.deltas.len() == self.window {
            self.deltas.pop_front();
        }
        self.deltas.push_back(delta);

        let [decreasing, increasing] = mode.directions();
        match self.tendency() {
            Some(t) if t < 0.0 => self.direction = Some(decreasing),
            Some(t) if t > 0.0 => self.direction = Some(increasing),
            _ => {}
        }
    }
}

/// Running totals per direction and lane
#[derive(Debug, Clone, Default)]
pub struct Counts {
    buckets: BTreeMap<(Direction, Option<LaneSide>), u32>,
}

impl Counts {
    #[inline]
    pub fn get(&self, direction: Direction, lane: Option<LaneSide>) -> u32 {
        self.buckets.get(&(direction, lane)).copied().unwrap_or(0)
    }

    /// All lanes together
    pub fn total(&self, direction: Direction) -> u32 {
        self.buckets
            .iter()
            .filter(|((d, _), _)| *d == direction)
            .map(|(_, n)| *n)
            .sum()
    }

    fn increment(&mut self, direction: Direction, lane: Option<LaneSide>) -> u32 {
        let n = self.buckets.entry((direction, lane)).or_insert(0);
        *n += 1;
        *n
    }

    /// `(label, count)` pairs for display; lane-qualified when `lanes` is set
    pub fn labeled(&self, mode: Mode, lanes: bool) -> Vec<(String, u32)> {
        let mut out = Vec::new();

        for direction in mode.directions() {
            if lanes {
                for lane in [LaneSide::Before, LaneSide::After] {
                    out.push((
                        format!("{} ({})", direction.label(), lane.label(mode)),
                        self.get(direction, Some(lane)),
                    ));
                }
            } else {
                out.push((direction.label().to_string(), self.get(direction, None)));
            }
        }

        out
    }
}

/// A trajectory counted while crossing the reference line
#[derive(Debug, Clone, PartialEq)]
pub struct CountEvent {
    pub id: u32,
    pub direction: Direction,
    pub lane: Option<LaneSide>,
    pub counts: Vec<(String, u32)>,
}

/// Infers trajectory directions and counts reference line crossings
#[derive(Debug)]
pub struct DirectionCounter {
    mode: Mode,
    line: i32,
    lane_point: Option<i32>,
    counts: Counts,
}

impl DirectionCounter {
    pub fn new(mode: Mode, line: i32) -> Self {
        Self {
            mode,
            line,
            lane_point: None,
            counts: Counts::default(),
        }
    }

    /// Reference line at `width - x_offset` or `height - y_offset` of the frame
    pub fn from_config(config: &Config, dims: (u32, u32)) -> Self {
        let (width, height) = dims;
        let line = match config.mode {
            Mode::Vertical => height as i32 - config.y_offset,
            Mode::Horizontal => width as i32 - config.x_offset,
        };

        Self::new(config.mode, line).with_lane_point(config.lane_point)
    }

    pub fn with_lane_point(mut self, lane_point: Option<i32>) -> Self {
        self.lane_point = lane_point;
        self
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn line(&self) -> i32 {
        self.line
    }

    #[inline]
    pub fn lane_point(&self) -> Option<i32> {
        self.lane_point
    }

    #[inline]
    pub fn counts(&self) -> &Counts {
        &self.counts
    }

    #[inline]
    pub fn labeled_counts(&self) -> Vec<(String, u32)> {
        self.counts.labeled(self.mode, self.lane_point.is_some())
    }

    /// Adds the offset of `centroid` from the mean of the history to the
    /// record's direction state. Does nothing for an empty history.
    pub fn find_direction(&self, record: &mut TrajectoryRecord, centroid: Centroid) {
        let mode = self.mode;
        let mean = math::mean(record.centroids().iter().map(|c| mode.along(c)));

        if let Some(mean) = mean {
            let delta = mode.along(&centroid) as f32 - mean;
            record.direction.push(mode, delta);
        }
    }

    /// Counts the record when its tendency points across the line and it has
    /// reached the far side, coming from the near side.
    pub fn count_object(
        &mut self,
        record: &mut TrajectoryRecord,
        centroid: Centroid,
    ) -> Option<CountEvent> {
        if record.counted() {
            return None;
        }

        let direction = record.direction().direction()?;
        let mode = self.mode;
        let line = self.line;

        let past_line = mode.along(&centroid) >= line;
        let crossed = if direction.is_increasing() {
            past_line && record.centroids().iter().any(|c| mode.along(c) < line)
        } else {
            !past_line && record.centroids().iter().any(|c| mode.along(c) >= line)
        };

        if !crossed {
            return None;
        }

        let lane = self.lane_point.map(|p| {
            if mode.across(&centroid) < p {
                LaneSide::Before
            } else {
                LaneSide::After
            }
        });

        record.mark_counted();
        let n = self.counts.increment(direction, lane);

        info!(
            "object {} counted {}{} at ({}, {}), total {}",
            record.id,
            direction.label(),
            lane.map(|l| format!(" ({})", l.label(mode)))
                .unwrap_or_default(),
            centroid.x,
            centroid.y,
            n
        );

        Some(CountEvent {
            id: record.id,
            direction,
            lane,
            counts: self.labeled_counts(),
        })
    }

    /// Feeds the next centroid of an already known trajectory
    pub fn evaluate(
        &mut self,
        record: &mut TrajectoryRecord,
        centroid: Centroid,
    ) -> Option<CountEvent> {
        self.find_direction(record, centroid);
        record.push(centroid);

        if record.counted() {
            None
        } else {
            self.count_object(record, centroid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Counts, Direction, DirectionCounter, LaneSide, Mode};
    use crate::config::Config;
use crate::error::Error;
    use crate::trajectory::TrajectoryRecord;
    use crate::Centroid;

    fn feed(
        counter: &mut DirectionCounter,
        record: &mut TrajectoryRecord,
        points: &[(i32, i32)],
    ) -> Vec<(usize, Direction)> {
        points
            .iter()
            .enumerate()
            .filter_map(|(i, &(x, y))| {
                counter
                    .evaluate(record, Centroid::new(x, y))
                    .map(|e| (i, e.direction))
            })
            .collect()
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("vertical".parse::<Mode>().unwrap(), Mode::Vertical);
        assert_eq!("horizontal".parse::<Mode>().unwrap(), Mode::Horizontal);
        assert!("diagonal".parse::<Mode>().is_err());
        assert!("Vertical".parse::<Mode>().is_err());
    }

    #[test]
    fn test_line_from_frame_dims() {
        let config = Config {
            y_offset: 270,
            x_offset: 100,
            ..Config::default()
        };
        assert_eq!(DirectionCounter::from_config(&config, (1280, 720)).line(), 450);

        let config = Config {
            mode: Mode::Horizontal,
            ..config
        };
        assert_eq!(DirectionCounter::from_config(&config, (1280, 720)).line(), 1180);
    }

    #[test]
    fn test_no_direction_without_history() {
        let counter = DirectionCounter::new(Mode::Vertical, 450);
        let record = TrajectoryRecord::new(1, Centroid::new(100, 400), 4);

        assert_eq!(record.direction().direction(), None);
        assert_eq!(record.direction().tendency(), None);
        assert_eq!(counter.counts().total(Direction::Down), 0);
    }

    #[test]
    fn test_find_direction_against_mean() {
        let counter = DirectionCounter::new(Mode::Vertical, 450);
        let mut record = TrajectoryRecord::new(1, Centroid::new(100, 400), 4);

        counter.find_direction(&mut record, Centroid::new(100, 420));
        assert_eq!(record.direction().tendency(), Some(20.0));
        assert_eq!(record.direction().direction(), Some(Direction::Down));

        counter.find_direction(&mut record, Centroid::new(100, 370));
        assert_eq!(record.direction().tendency(), Some(-10.0));
        assert_eq!(record.direction().direction(), Some(Direction::Up));
    }

    #[test]
    fn test_tendency_sums_last_window_deltas() {
        let counter = DirectionCounter::new(Mode::Vertical, 450);
        let mut record = TrajectoryRecord::new(1, Centroid::new(100, 100), 2);

        // deltas against the single-point history: +10, +20, -50
        counter.find_direction(&mut record, Centroid::new(100, 110));
        counter.find_direction(&mut record, Centroid::new(100, 120));
        assert_eq!(record.direction().tendency(), Some(30.0));

        counter.find_direction(&mut record, Centroid::new(100, 50));
        assert_eq!(record.direction().tendency(), Some(-30.0));
        assert_eq!(record.direction().direction(), Some(Direction::Up));
    }

    #[test]
    fn test_huge_window_does_not_preallocate() {
        let counter = DirectionCounter::new(Mode::Vertical, 450);
        let mut record = TrajectoryRecord::new(1, Centroid::new(100, 100), usize::MAX);

        counter.find_direction(&mut record, Centroid::new(100, 110));
        assert_eq!(record.direction().tendency(), Some(10.0));
    }

    #[test]
    fn test_zero_tendency_keeps_direction() {
        let counter = DirectionCounter::new(Mode::Horizontal, 450);
        let mut record = TrajectoryRecord::new(1, Centroid::new(100, 100), 2);

        counter.find_direction(&mut record, Centroid::new(110, 100));
        assert_eq!(record.direction().direction(), Some(Direction::Right));

        counter.find_direction(&mut record, Centroid::new(90, 100));
        assert_eq!(record.direction().tendency(), Some(0.0));
        assert_eq!(record.direction().direction(), Some(Direction::Right));
    }

    #[test]
    fn test_downward_crossing_counted_once() {
        let mut counter = DirectionCounter::new(Mode::Vertical, 450);
        let mut record = TrajectoryRecord::new(1, Centroid::new(100, 400), 4);

        let events = feed(
            &mut counter,
            &mut record,
            &[(100, 420), (100, 440), (100, 460), (100, 480), (100, 500)],
        );

        assert_eq!(events, vec![(2, Direction::Down)]);
        assert!(record.counted());
        assert_eq!(counter.counts().get(Direction::Down, None), 1);
        assert_eq!(counter.counts().total(Direction::Up), 0);
    }

    #[test]
    fn test_upward_crossing() {
        let mut counter = DirectionCounter::new(Mode::Vertical, 450);
        let mut record = TrajectoryRecord::new(7, Centroid::new(100, 500), 4);

        let events = feed(&mut counter, &mut record, &[(100, 480), (100, 460), (100, 440)]);

        assert_eq!(events, vec![(2, Direction::Up)]);
        assert_eq!(
            counter.labeled_counts(),
            vec![("Up".to_string(), 1), ("Down".to_string(), 0)]
        );
    }

    #[test]
    fn test_object_first_seen_past_line_not_counted() {
        let mut counter = DirectionCounter::new(Mode::Vertical, 450);
        let mut record = TrajectoryRecord::new(1, Centroid::new(100, 460), 4);

        let events = feed(&mut counter, &mut record, &[(100, 480), (100, 500)]);

        assert!(events.is_empty());
        assert!(!record.counted());
    }

    #[test]
    fn test_jitter_around_line_counts_once() {
        let mut counter = DirectionCounter::new(Mode::Vertical, 450);
        let mut record = TrajectoryRecord::new(1, Centroid::new(100, 430), 4);

        let events = feed(
            &mut counter,
            &mut record,
            &[
                (100, 445),
                (100, 455),
                (100, 440),
                (100, 458),
                (100, 446),
                (100, 470),
                (100, 430),
            ],
        );

        assert_eq!(events.len(), 1);
        assert_eq!(counter.counts().total(Direction::Down) + counter.counts().total(Direction::Up), 1);
    }

    #[test]
    fn test_horizontal_lanes() {
        let mut counter = DirectionCounter::new(Mode::Horizontal, 600).with_lane_point(Some(360));

        let mut upper = TrajectoryRecord::new(1, Centroid::new(560, 200), 4);
        let events = feed(&mut counter, &mut upper, &[(580, 200), (610, 202)]);
        assert_eq!(events, vec![(1, Direction::Right)]);

        let mut lower = TrajectoryRecord::new(2, Centroid::new(640, 500), 4);
        let events = feed(&mut counter, &mut lower, &[(620, 500), (590, 498)]);
        assert_eq!(events, vec![(1, Direction::Left)]);

        let counts = counter.counts();
        assert_eq!(counts.get(Direction::Right, Some(LaneSide::Before)), 1);
        assert_eq!(counts.get(Direction::Left, Some(LaneSide::After)), 1);
        assert_eq!(counts.get(Direction::Right, None), 0);

        assert_eq!(
            counter.labeled_counts(),
            vec![
                ("Left (upper lane)".to_string(), 0),
                ("Left (lower lane)".to_string(), 1),
                ("Right (upper lane)".to_string(), 1),
                ("Right (lower lane)".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_count_event_carries_counts() {
        let mut counter = DirectionCounter::new(Mode::Vertical, 450).with_lane_point(Some(640));
        let mut record = TrajectoryRecord::new(3, Centroid::new(700, 400), 4);

        counter.evaluate(&mut record, Centroid::new(700, 430));
        let event = counter.evaluate(&mut record, Centroid::new(700, 455)).unwrap();

        assert_eq!(event.id, 3);
        assert_eq!(event.lane, Some(LaneSide::After));
        assert!(event
            .counts
            .contains(&("Down (right lane)".to_string(), 1)));
    }

    #[test]
    fn test_empty_counts_labels() {
        let counts = Counts::default();
        assert_eq!(
            counts.labeled(Mode::Horizontal, false),
            vec![("Left".to_string(), 0), ("Right".to_string(), 0)]
        );
    }
}

use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::direction::Mode;
use crate::error::Error;

pub const MAX_DIRECTION_WINDOW: usize = 1024;

/// Counter settings, usually read from a JSON file such as
///
/// ```json
/// { "max_disappeared": 40, "max_distance": 50.0, "y_offset": 200, "min_area": 1000 }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Consecutive missed frames an identity survives
    pub max_disappeared: u32,

    /// Largest centroid jump (px) still matched to an existing identity;
    /// zero or less disables matching
    pub max_distance: f32,

    pub mode: Mode,

    /// Reference line is `width - x_offset` in horizontal mode
    pub x_offset: i32,

    /// Reference line is `height - y_offset` in vertical mode
    pub y_offset: i32,

    /// Cross-axis coordinate splitting the two lanes
    pub lane_point: Option<i32>,

    /// Rects with a smaller area are ignored
    pub min_area: Option<i64>,

    /// Rects further from the line than this coordinate are ignored
    pub limit: Option<i32>,

    /// Number of recent deltas summed into the direction tendency
    pub direction_window: usize,

    pub assignment: Assignment,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_disappeared: 40,
            max_distance: 50.0,
            mode: Mode::Vertical,
            x_offset: 0,
            y_offset: 0,
            lane_point: None,
            min_area: None,
            limit: None,
            direction_window: 4,
            assignment: Assignment::Greedy,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;
        let config: Config = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.max_distance.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "max_distance must be finite, got {}",
                self.max_distance
            )));
        }

        if self.direction_window == 0 || self.direction_window > MAX_DIRECTION_WINDOW {
            return Err(Error::InvalidConfig(format!(
                "direction_window must be within 1..={}, got {}",
                MAX_DIRECTION_WINDOW, self.direction_window
            )));
        }

        Ok(())
    }
}

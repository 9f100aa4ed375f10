use serde_derive::{Deserialize, Serialize};

use crate::error::Error;
use crate::Centroid;

/// Left-top-right-bottom detection rectangle in pixels.
///
/// Serialized as `[x_min, y_min, x_max, y_max]`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Rect {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl From<[i32; 4]> for Rect {
    #[inline]
    fn from(v: [i32; 4]) -> Self {
        Self {
            x_min: v[0],
            y_min: v[1],
            x_max: v[2],
            y_max: v[3],
        }
    }
}

impl From<Rect> for [i32; 4] {
    #[inline]
    fn from(r: Rect) -> Self {
        [r.x_min, r.y_min, r.x_max, r.y_max]
    }
}

impl Rect {
    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Result<Self, Error> {
        let rect = Self {
            x_min,
            y_min,
            x_max,
            y_max,
        };

        if rect.is_valid() {
            Ok(rect)
        } else {
            Err(Error::InvalidRect(x_min, y_min, x_max, y_max))
        }
    }

    /// From a bounding rect given as left, top, width and height
    #[inline]
    pub fn ltwh(left: i32, top: i32, width: i32, height: i32) -> Result<Self, Error> {
        match (left.checked_add(width), top.checked_add(height)) {
            (Some(right), Some(bottom)) => Self::new(left, top, right, bottom),
            _ => Err(Error::InvalidRect(left, top, width, height)),
        }
    }

    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.x_min < self.x_max && self.y_min < self.y_max
    }

    #[inline(always)]
    pub fn width(&self) -> i64 {
        self.x_max as i64 - self.x_min as i64
    }

    #[inline(always)]
    pub fn height(&self) -> i64 {
        self.y_max as i64 - self.y_min as i64
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width().saturating_mul(self.height())
    }

    /// Geometric center, truncated to whole pixels
    #[inline]
    pub fn centroid(&self) -> Centroid {
        // the midpoint of two i32 always fits back into i32
        Centroid::new(
            ((self.x_min as i64 + self.x_max as i64) / 2) as i32,
            ((self.y_min as i64 + self.y_max as i64) / 2) as i32,
        )
    }
}

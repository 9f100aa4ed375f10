use std::io::BufRead;

use crate::error::Error;
use crate::rect::Rect;

#[derive(Debug, Clone)]
pub struct Frame {
    pub dims: (u32, u32),
    pub rects: Vec<Rect>,
    pub timestamp: f32, // in seconds
}

impl Frame {
    #[inline]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Rect> {
        self.rects.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Parses one `<timestamp>:<json array of [x_min, y_min, x_max, y_max]>` line
    pub fn parse_line(line: &str, dims: (u32, u32)) -> Result<Self, Error> {
        let idx = line
            .find(':')
            .ok_or_else(|| Error::FrameFormat("expected `:`".into()))?;
        let (ts, rects) = line.split_at(idx);

        let timestamp = ts
            .trim()
            .parse::<f32>()
            .map_err(|e| Error::FrameFormat(format!("parse timestamp failed: {}", e)))?;

        let rects = serde_json::from_str(&rects[1..])
            .map_err(|e| Error::FrameFormat(format!("parse json failed: {}", e)))?;

        Ok(Self {
            dims,
            rects,
            timestamp,
        })
    }
}

/// Reads a detections dump, one frame per non-empty line
pub fn read_frames<R: BufRead>(reader: R, dims: (u32, u32)) -> Result<Vec<Frame>, Error> {
    let mut frames = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let frame = Frame::parse_line(&line, dims).map_err(|e| match e {
            Error::FrameFormat(reason) => Error::InputFormat {
                line: idx + 1,
                reason,
            },
            e => e,
        })?;

        frames.push(frame);
    }

    Ok(frames)
}

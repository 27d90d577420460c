use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The top-left corner of a region. Two regions are considered the same place when their
/// corners are equal, regardless of their size.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Corner {
    pub x: i64,
    pub y: i64,
}

/// The eight directions a region can step in, in the order neighbors are enumerated
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    UpLeft,
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::UpLeft,
        Direction::Up,
        Direction::UpRight,
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
        Direction::Left,
    ];

    /// Step in units of the region size, as (columns, rows)
    fn offset(self) -> (i64, i64) {
        match self {
            Direction::UpLeft => (-1, -1),
            Direction::Up => (0, -1),
            Direction::UpRight => (1, -1),
            Direction::Right => (1, 0),
            Direction::DownRight => (1, 1),
            Direction::Down => (0, 1),
            Direction::DownLeft => (-1, 1),
            Direction::Left => (-1, 0),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Direction::UpLeft => "up-left",
                Direction::Up => "up",
                Direction::UpRight => "up-right",
                Direction::Right => "right",
                Direction::DownRight => "down-right",
                Direction::Down => "down",
                Direction::DownLeft => "down-left",
                Direction::Left => "left",
            }
        )
    }
}

/// A closed-open rectangle `[x1, x2) x [y1, y2)` in pixel coordinates.
///
/// Coordinates are signed so that neighbors hanging off the edge of an image can still be
/// represented and rejected by the caller.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x1: i64,
    pub x2: i64,
    pub y1: i64,
    pub y2: i64,
}

impl Region {
    pub const fn new(x1: i64, x2: i64, y1: i64, y2: i64) -> Self {
        Self { x1, x2, y1, y2 }
    }

    pub fn width(&self) -> i64 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> i64 {
        self.y2.saturating_sub(self.y1)
    }

    /// Number of pixels covered, zero for an empty region
    pub fn area(&self) -> u128 {
        if self.is_empty() {
            return 0;
        }
        self.width() as u128 * self.height() as u128
    }

    pub fn corner(&self) -> Corner {
        Corner {
            x: self.x1,
            y: self.y1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// The region of the same size one step away in the given direction.
    ///
    /// Coordinates saturate at the ends of `i64`; such a region lies far outside any image.
    pub fn neighbor(&self, direction: Direction) -> Region {
        let (dx, dy) = direction.offset();
        let (xs, ys) = (self.width().saturating_mul(dx), self.height().saturating_mul(dy));

        Region {
            x1: self.x1.saturating_add(xs),
            x2: self.x2.saturating_add(xs),
            y1: self.y1.saturating_add(ys),
            y2: self.y2.saturating_add(ys),
        }
    }

    /// The eight same-sized regions tiled around this one, starting at the upper left and going
    /// clockwise. No bounds checking is done here.
    pub fn neighbors(&self) -> [Region; 8] {
        Direction::ALL.map(|d| self.neighbor(d))
    }

    /// A region anchored at the same corner with half the width and height, or `None` if
    /// halving collapses either side
    pub fn shrink(&self) -> Option<Region> {
        let smaller = Region {
            x1: self.x1,
            x2: self.x1.saturating_add(self.width() / 2),
            y1: self.y1,
            y2: self.y1.saturating_add(self.height() / 2),
        };

        if smaller.is_empty() {
            None
        } else {
            Some(smaller)
        }
    }

    /// Check that the region lies entirely within `[0, width) x [0, height)`
    pub fn within(&self, width: i64, height: i64) -> bool {
        self.x1 >= 0 && self.y1 >= 0 && self.x2 <= width && self.y2 <= height
    }

    /// The part of this region that lies within `[0, width) x [0, height)`
    pub fn clip(&self, width: i64, height: i64) -> Option<Region> {
        let clipped = Region {
            x1: self.x1.max(0),
            x2: self.x2.min(width),
            y1: self.y1.max(0),
            y2: self.y2.min(height),
        };

        if clipped.is_empty() {
            None
        } else {
            Some(clipped)
        }
    }

    /// All pixel coordinates covered by the region, column by column
    pub fn points(&self) -> impl Iterator<Item = (i64, i64)> {
        let Region { x1, x2, y1, y2 } = *self;
        (x1..x2).flat_map(move |x| (y1..y2).map(move |y| (x, y)))
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}) x [{}, {})", self.x1, self.x2, self.y1, self.y2)
    }
}

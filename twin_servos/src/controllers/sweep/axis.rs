#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Position bookkeeping for one servo. The servo itself is never queried;
/// this is what the controller believes it has commanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisState {
    pub position: i32,
    pub step: i32,
    pub direction: Direction,
}

impl AxisState {
    pub fn new(position: i32, step: i32) -> Self {
        Self {
            position,
            step,
            direction: Direction::Forward,
        }
    }

    pub fn apply(&mut self, delta: i32) {
        self.position += delta;
    }
}

/// Inclusive limits of a sweeping axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: i32,
    pub max: i32,
}

impl Bounds {
    pub fn around(center: i32, range: i32) -> Self {
        Self {
            min: center - range / 2,
            max: center + range / 2,
        }
    }

    pub fn contains(&self, position: i32) -> bool {
        (self.min..=self.max).contains(&position)
    }
}

use serde::{Deserialize, Serialize};

/// Travel limits of the servos, degrees.
pub const MIN_ANGLE: i32 = 0;
pub const MAX_ANGLE: i32 = 360;

/// Command vocabulary used to drive the two servos. Different sketch
/// revisions understand different words.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SweepProtocol {
    /// `xmove` for X, `ymove` up and `ymove` down for Y.
    #[default]
    AxisMoves,
    /// `xmove` for X, `ymove` up then `move` down on the already selected Y.
    SelectedAxis,
    /// `servo <id>` to select, then plain `move` for every step.
    ServoSelect,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SweepConfig {
    /// Origin of both servos, degrees.
    pub center: i32,
    /// Full width of the X sweep, centred on `center`.
    pub x_sweep_range: i32,
    pub x_step: i32,
    /// Size of the Y up/down cycle run on every tick.
    pub y_sweep: i32,

    pub protocol: SweepProtocol,
    pub x_servo: i32,
    pub y_servo: i32,

    pub home: bool,
    pub prime: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            center: 180,
            x_sweep_range: 80,
            x_step: 2,
            y_sweep: 80,

            protocol: SweepProtocol::AxisMoves,
            x_servo: 0,
            y_servo: 1,

            home: false,
            prime: true,
        }
    }
}

impl SweepConfig {
    /// Checks that X can bounce between its bounds landing exactly on each
    /// of them.
    pub fn validate(&self) -> Result<(), String> {
        if self.x_step <= 0 {
            return Err(format!("x_step must be positive, got {}", self.x_step));
        }
        if self.x_sweep_range < 0 || self.x_sweep_range % 2 != 0 {
            return Err(format!(
                "x_sweep_range must be a non-negative even number, got {}",
                self.x_sweep_range
            ));
        }
        if (self.x_sweep_range / 2) % self.x_step != 0 {
            return Err(format!(
                "half of x_sweep_range ({}) is not a multiple of x_step ({})",
                self.x_sweep_range / 2,
                self.x_step
            ));
        }
        if self.y_sweep < 0 {
            return Err(format!("y_sweep must not be negative, got {}", self.y_sweep));
        }
        if !(MIN_ANGLE..=MAX_ANGLE).contains(&self.center) {
            return Err(format!(
                "center must be within {}..={}, got {}",
                MIN_ANGLE, MAX_ANGLE, self.center
            ));
        }

        // Widened so that out-of-range inputs cannot overflow the check itself.
        let center = i64::from(self.center);
        let half_range = i64::from(self.x_sweep_range / 2);
        let y_sweep = i64::from(self.y_sweep);
        let in_range = |angle: i64| (i64::from(MIN_ANGLE)..=i64::from(MAX_ANGLE)).contains(&angle);

        if !in_range(center - half_range) || !in_range(center + half_range) {
            return Err(format!(
                "X sweep {}..={} leaves the servo range {}..={}",
                center - half_range,
                center + half_range,
                MIN_ANGLE,
                MAX_ANGLE
            ));
        }
        // Y never travels more than a full sweep from the centre.
        if !in_range(center + y_sweep) || !in_range(center - y_sweep) {
            return Err(format!(
                "Y sweep of {} around {} leaves the servo range {}..={}",
                self.y_sweep, self.center, MIN_ANGLE, MAX_ANGLE
            ));
        }
        if self.protocol == SweepProtocol::ServoSelect && self.x_servo == self.y_servo {
            return Err(format!(
                "x_servo and y_servo must differ, both are {}",
                self.x_servo
            ));
        }
        Ok(())
    }
}

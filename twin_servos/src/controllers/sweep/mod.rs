use std::io;

use tracing::{debug, info, instrument};

use crate::{
    command_executor::CommandChannel,
    models::{Axis, ServoCommand},
};

pub mod axis;
pub mod config;

use axis::{AxisState, Bounds, Direction};
use config::{SweepConfig, SweepProtocol};

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("Invalid sweep parameters: {0}")]
    InvalidParameters(String),

    #[error("Failed to send {command}: {source}")]
    Channel {
        command: ServoCommand,
        source: io::Error,
    },
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Relative X move sent this tick, if any.
    pub x_delta: Option<i32>,
    pub flipped: bool,
    pub x_position: i32,
    pub direction: Direction,
}

/// Bounces X between two bounds one step per tick while cycling Y up and
/// down on every tick.
pub struct SweepController {
    x: AxisState,
    y: AxisState,
    bounds: Bounds,
    center: i32,

    protocol: SweepProtocol,
    x_servo: i32,
    y_servo: i32,

    ticks: u64,
}

impl SweepController {
    /// Centres X at 180 degrees and uses the `xmove`/`ymove` vocabulary.
    pub fn new(x_sweep_range: i32, y_sweep: i32, x_step: i32) -> Result<Self, SweepError> {
        Self::from_config(&SweepConfig {
            x_sweep_range,
            y_sweep,
            x_step,
            ..Default::default()
        })
    }

    pub fn from_config(config: &SweepConfig) -> Result<Self, SweepError> {
        config.validate().map_err(SweepError::InvalidParameters)?;

        Ok(Self {
            x: AxisState::new(config.center, config.x_step),
            y: AxisState::new(config.center, config.y_sweep),
            bounds: Bounds::around(config.center, config.x_sweep_range),
            center: config.center,

            protocol: config.protocol,
            x_servo: config.x_servo,
            y_servo: config.y_servo,

            ticks: 0,
        })
    }

    pub fn x(&self) -> &AxisState {
        &self.x
    }

    pub fn y(&self) -> &AxisState {
        &self.y
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    async fn send<C: CommandChannel>(
        channel: &mut C,
        command: ServoCommand,
    ) -> Result<(), SweepError> {
        match channel.send(command.clone()).await {
            Ok(reply) => {
                debug!("{} -> {:?}", command, reply);
                Ok(())
            }
            Err(source) => Err(SweepError::Channel { command, source }),
        }
    }

    /// Sends a relative move for `axis` in the configured vocabulary.
    ///
    /// `follow_up` marks the second Y move of a cycle: Y is already the
    /// selected servo, which the `selected_axis` and `servo_select`
    /// vocabularies rely on.
    async fn move_axis<C: CommandChannel>(
        &self,
        channel: &mut C,
        axis: Axis,
        delta: i32,
        follow_up: bool,
    ) -> Result<(), SweepError> {
        match (self.protocol, axis, follow_up) {
            (SweepProtocol::AxisMoves, _, _) | (SweepProtocol::SelectedAxis, _, false) => {
                Self::send(channel, ServoCommand::relative(axis, delta)).await
            }
            (SweepProtocol::SelectedAxis, _, true) | (SweepProtocol::ServoSelect, _, true) => {
                Self::send(channel, ServoCommand::move_selected(delta)).await
            }
            (SweepProtocol::ServoSelect, axis, false) => {
                Self::send(channel, ServoCommand::select(self.servo_id(axis))).await?;
                Self::send(channel, ServoCommand::move_selected(delta)).await
            }
        }
    }

    /// Sends an absolute move for `axis` in the configured vocabulary.
    async fn goto_axis<C: CommandChannel>(
        &self,
        channel: &mut C,
        axis: Axis,
        position: i32,
    ) -> Result<(), SweepError> {
        match self.protocol {
            SweepProtocol::AxisMoves | SweepProtocol::SelectedAxis => {
                Self::send(channel, ServoCommand::absolute(axis, position)).await
            }
            SweepProtocol::ServoSelect => {
                Self::send(channel, ServoCommand::select(self.servo_id(axis))).await?;
                Self::send(channel, ServoCommand::goto_selected(position)).await
            }
        }
    }

    fn servo_id(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x_servo,
            Axis::Y => self.y_servo,
        }
    }

    /// Moves Y by `up` and then back by `down`.
    async fn cycle_y<C: CommandChannel>(
        &mut self,
        channel: &mut C,
        up: i32,
        down: i32,
    ) -> Result<(), SweepError> {
        self.move_axis(channel, Axis::Y, up, false).await?;
        self.y.apply(up);
        self.y.direction = Direction::Backward;

        self.move_axis(channel, Axis::Y, -down, true).await?;
        self.y.apply(-down);
        self.y.direction = Direction::Forward;

        Ok(())
    }

    /// Drives both servos to the centre with absolute moves.
    #[instrument(skip(self, channel), fields(center = self.center))]
    pub async fn home<C: CommandChannel>(&mut self, channel: &mut C) -> Result<(), SweepError> {
        self.goto_axis(channel, Axis::X, self.center).await?;
        self.goto_axis(channel, Axis::Y, self.center).await?;

        self.x.position = self.center;
        self.y.position = self.center;
        info!("Both servos homed");

        Ok(())
    }

    /// Lifts Y half a sweep above its origin and drops it a full sweep, so
    /// that the per-tick cycle runs symmetrically around the origin.
    #[instrument(skip(self, channel), fields(y_sweep = self.y.step))]
    pub async fn prime<C: CommandChannel>(&mut self, channel: &mut C) -> Result<(), SweepError> {
        let sweep = self.y.step;
        self.cycle_y(channel, sweep / 2, sweep).await?;
        info!("Y primed at {}", self.y.position);

        Ok(())
    }

    /// One control step: at most one X move, then a full Y up/down cycle.
    pub async fn tick<C: CommandChannel>(
        &mut self,
        channel: &mut C,
    ) -> Result<TickReport, SweepError> {
        // At a bound with the outward direction neither branch fires.
        let x_delta = match self.x.direction {
            Direction::Forward if self.x.position != self.bounds.max => Some(self.x.step),
            Direction::Backward if self.x.position != self.bounds.min => Some(-self.x.step),
            _ => None,
        };

        let mut flipped = false;
        if let Some(delta) = x_delta {
            self.move_axis(channel, Axis::X, delta, false).await?;
            self.x.apply(delta);

            let at_bound = match self.x.direction {
                Direction::Forward => self.x.position >= self.bounds.max,
                Direction::Backward => self.x.position <= self.bounds.min,
            };
            if at_bound {
                self.x.direction = self.x.direction.flipped();
                flipped = true;
            }
        }

        let sweep = self.y.step;
        self.cycle_y(channel, sweep, sweep).await?;

        self.ticks += 1;
        info!(
            "Tick {}: x = {} ({:?}){}",
            self.ticks,
            self.x.position,
            self.x.direction,
            if flipped { ", turned around" } else { "" }
        );

        Ok(TickReport {
            x_delta,
            flipped,
            x_position: self.x.position,
            direction: self.x.direction,
        })
    }

    /// Ticks until the channel fails.
    pub async fn run<C: CommandChannel>(&mut self, channel: &mut C) -> Result<(), SweepError> {
        loop {
            self.tick(channel).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingChannel;

    async fn run_ticks(
        controller: &mut SweepController,
        channel: &mut RecordingChannel,
        count: usize,
    ) -> Vec<TickReport> {
        let mut reports = Vec::with_capacity(count);
        for _ in 0..count {
            reports.push(controller.tick(channel).await.unwrap());
        }
        reports
    }

    #[test]
    fn test_initial_state() {
        let controller = SweepController::new(80, 80, 2).unwrap();

        assert_eq!(controller.bounds(), Bounds { min: 140, max: 220 });
        assert_eq!(controller.x().position, 180);
        assert_eq!(controller.x().direction, Direction::Forward);
        assert_eq!(controller.ticks(), 0);
    }

    #[test]
    fn test_rejects_step_that_overshoots_bounds() {
        assert!(matches!(
            SweepController::new(80, 80, 3),
            Err(SweepError::InvalidParameters(_))
        ));
    }

    #[tokio::test]
    async fn test_first_tick_commands() {
        let mut controller = SweepController::new(80, 80, 2).unwrap();
        let mut channel = RecordingChannel::default();

        controller.tick(&mut channel).await.unwrap();

        assert_eq!(
            channel.wire(),
            vec!["<xmove,2>", "<ymove,80>", "<ymove,-80>"]
        );
    }

    #[tokio::test]
    async fn test_reaches_upper_bound_after_twenty_ticks() {
        let mut controller = SweepController::new(80, 80, 2).unwrap();
        let mut channel = RecordingChannel::default();

        let reports = run_ticks(&mut controller, &mut channel, 20).await;

        assert!(reports[..19].iter().all(|r| !r.flipped));
        assert_eq!(reports[19].x_position, 220);
        assert!(reports[19].flipped);
        assert_eq!(controller.x().direction, Direction::Backward);

        let next = controller.tick(&mut channel).await.unwrap();
        assert_eq!(next.x_delta, Some(-2));
        assert_eq!(next.x_position, 218);
    }

    #[tokio::test]
    async fn test_x_stays_within_bounds_and_flips_only_at_bounds() {
        let mut controller = SweepController::new(80, 80, 2).unwrap();
        let mut channel = RecordingChannel::default();
        let bounds = controller.bounds();

        let reports = run_ticks(&mut controller, &mut channel, 500).await;

        for report in &reports {
            assert!(bounds.contains(report.x_position));
            if report.flipped {
                assert!(report.x_position == bounds.min || report.x_position == bounds.max);
            }
        }

        // 20 ticks out, then 40 per traversal.
        let flips = reports.iter().filter(|r| r.flipped).count();
        assert_eq!(flips, 1 + (500 - 20) / 40);
    }

    #[tokio::test]
    async fn test_every_tick_cycles_y_once() {
        let mut controller = SweepController::new(80, 30, 2).unwrap();
        let mut channel = RecordingChannel::default();

        run_ticks(&mut controller, &mut channel, 50).await;

        let y_moves: Vec<i32> = channel
            .sent
            .iter()
            .filter(|c| c.name == crate::models::CommandName::YMove)
            .map(|c| c.value)
            .collect();

        assert_eq!(y_moves.len(), 100);
        assert!(y_moves.chunks(2).all(|pair| pair == [30, -30]));
        assert_eq!(controller.y().position, 180);
    }

    #[tokio::test]
    async fn test_x_branch_is_skipped_at_bound() {
        // Zero-width range: X starts on both bounds facing outward.
        let mut controller = SweepController::new(0, 80, 2).unwrap();
        let mut channel = RecordingChannel::default();

        let reports = run_ticks(&mut controller, &mut channel, 3).await;

        assert!(reports.iter().all(|r| r.x_delta.is_none() && !r.flipped));
        assert_eq!(controller.x().position, 180);
        assert_eq!(controller.x().direction, Direction::Forward);
        assert_eq!(channel.sent.len(), 6);
    }

    #[tokio::test]
    async fn test_prime_centres_y_cycle() {
        let mut controller = SweepController::new(80, 80, 2).unwrap();
        let mut channel = RecordingChannel::default();

        controller.prime(&mut channel).await.unwrap();
        assert_eq!(channel.wire(), vec!["<ymove,40>", "<ymove,-80>"]);
        assert_eq!(controller.y().position, 140);

        controller.tick(&mut channel).await.unwrap();
        assert_eq!(controller.y().position, 140);
    }

    #[tokio::test]
    async fn test_home_sends_absolute_moves() {
        let mut controller = SweepController::new(80, 80, 2).unwrap();
        let mut channel = RecordingChannel::default();

        controller.home(&mut channel).await.unwrap();

        assert_eq!(channel.wire(), vec!["<xgoto,180>", "<ygoto,180>"]);
    }

    #[tokio::test]
    async fn test_selected_axis_protocol() {
        let config = SweepConfig {
            protocol: SweepProtocol::SelectedAxis,
            ..Default::default()
        };
        let mut controller = SweepController::from_config(&config).unwrap();
        let mut channel = RecordingChannel::default();

        controller.prime(&mut channel).await.unwrap();
        controller.tick(&mut channel).await.unwrap();

        assert_eq!(
            channel.wire(),
            vec![
                "<ymove,40>",
                "<move,-80>",
                "<xmove,2>",
                "<ymove,80>",
                "<move,-80>"
            ]
        );
    }

    #[tokio::test]
    async fn test_servo_select_protocol() {
        let config = SweepConfig {
            protocol: SweepProtocol::ServoSelect,
            x_servo: 2,
            y_servo: 3,
            ..Default::default()
        };
        let mut controller = SweepController::from_config(&config).unwrap();
        let mut channel = RecordingChannel::default();

        controller.home(&mut channel).await.unwrap();
        controller.tick(&mut channel).await.unwrap();

        assert_eq!(
            channel.wire(),
            vec![
                "<servo,2>",
                "<goto,180>",
                "<servo,3>",
                "<goto,180>",
                "<servo,2>",
                "<move,2>",
                "<servo,3>",
                "<move,80>",
                "<move,-80>"
            ]
        );
    }

    #[tokio::test]
    async fn test_channel_failure_propagates() {
        let mut controller = SweepController::new(80, 80, 2).unwrap();
        let mut channel = RecordingChannel::failing_after(4);

        let err = controller.run(&mut channel).await.unwrap_err();

        // The second tick's X move went out; its Y cycle did not.
        assert!(matches!(err, SweepError::Channel { .. }));
        assert_eq!(controller.ticks(), 1);
        assert_eq!(controller.x().position, 184);
        assert_eq!(channel.sent.len(), 4);
    }
}

//! Simulation: one layout, its script and its motors, advanced tick by tick.
//!
//! A tick runs, in order: the scenario entries due at this tick, one driver
//! cycle, then the actuator's own tick.  Rendering is left to the caller,
//! which owns the view.

use tt_core::Layout;

use super::drive_points::{CycleReport, PointActuator, PointDriver};
use super::scenario::Scenario;

/// Outcome of one [`Simulation::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    /// Script entries applied.
    pub touches: usize,
    pub cycle: CycleReport,
}

pub struct Simulation<A> {
    layout: Layout,
    scenario: Scenario,
    driver: PointDriver,
    actuator: A,
    tick: u64,
}

impl<A: PointActuator> Simulation<A> {
    pub fn new(layout: Layout, scenario: Scenario, actuator: A) -> Self {
        Self {
            layout,
            scenario,
            driver: PointDriver::new(),
            actuator,
            tick: 0,
        }
    }

    /// Number of ticks stepped so far; also the tick the next step runs.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    pub fn driver(&self) -> &PointDriver {
        &self.driver
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Runs one tick.
    pub fn step(&mut self) -> TickReport {
        let tick = self.tick;
        let touches = self.scenario.apply_due(tick, &mut self.layout);
        let cycle = self.driver.run_cycle(&mut self.layout, &mut self.actuator);
        self.actuator.tick();
        self.tick += 1;
        TickReport {
            tick,
            touches,
            cycle,
        }
    }

    /// Runs a driver cycle outside the tick schedule, e.g. right after a
    /// wished-change notification.
    pub fn run_driver_cycle(&mut self) -> CycleReport {
        self.driver.run_cycle(&mut self.layout, &mut self.actuator)
    }

    /// `true` once the script has played out and no point is waiting for
    /// feedback.
    pub fn is_settled(&self) -> bool {
        let script_done = self
            .scenario
            .last_tick()
            .map_or(true, |last| self.tick > last);
        let layout = &self.layout;
        script_done
            && !layout
                .registered_point_ids()
                .any(|id| layout.is_point_pending(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::drive_points::{DriveError, Feedback};
    use crate::infrastructure::storage::config::{ScriptAction, ScriptEntry};
    use tt_core::{CanichePosition, PointId, PointShape, Position, Way};

    /// Motor that arrives on the tick after it is commanded.
    #[derive(Default)]
    struct InstantMotors {
        moving: Vec<Feedback>,
        arrived: Vec<Feedback>,
        ticks: u32,
    }

    impl PointActuator for InstantMotors {
        fn command(
            &mut self,
            point_id: PointId,
            position: CanichePosition,
        ) -> Result<(), DriveError> {
            self.moving.push(Feedback { point_id, position });
            Ok(())
        }

        fn poll_feedback(&mut self) -> Vec<Feedback> {
            std::mem::take(&mut self.arrived)
        }

        fn tick(&mut self) {
            self.ticks += 1;
            self.arrived.append(&mut self.moving);
        }
    }

    fn make_simulation() -> Simulation<InstantMotors> {
        let mut layout = Layout::new();
        layout.add_point(1, Way::RightHand, PointShape::default());
        let scenario = Scenario::from_config(&[ScriptEntry {
            tick: 1,
            action: ScriptAction::TogglePoint(1),
        }]);
        Simulation::new(layout, scenario, InstantMotors::default())
    }

    #[test]
    fn test_step_applies_script_then_commands() {
        // Arrange
        let mut sim = make_simulation();

        // Act
        let first = sim.step();
        let second = sim.step();

        // Assert
        assert_eq!(first.tick, 0);
        assert_eq!(first.touches, 0);
        assert_eq!(second.touches, 1);
        assert_eq!(second.cycle.commanded, 1);
        assert_eq!(sim.actuator().ticks, 2);
    }

    #[test]
    fn test_point_settles_once_feedback_arrives() {
        // Arrange
        let mut sim = make_simulation();

        // Act
        sim.step();
        sim.step();
        let settled_in_transit = sim.is_settled();
        let third = sim.step();

        // Assert
        assert!(!settled_in_transit);
        assert_eq!(third.cycle.feedback_applied, 1);
        assert_eq!(sim.layout().actual_position_of_point(1), Position::Diagonal);
        assert!(sim.is_settled());
    }

    #[test]
    fn test_run_driver_cycle_commands_outside_schedule() {
        let mut sim = make_simulation();
        sim.layout_mut().toggle_point(1);

        let report = sim.run_driver_cycle();

        assert_eq!(report.commanded, 1);
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.driver().cycles(), 1);
    }
}

//! Simulated turnout motor bank.
//!
//! Each commanded point starts a transit.  The bank reports `Middle` on the
//! first poll after the command (if configured to), then the commanded
//! position once `transit_ticks` ticks have elapsed.  A new command for a
//! point already in transit restarts it toward the new target.

use std::collections::BTreeMap;

use tracing::{debug, trace};
use tt_core::{CanichePosition, PointId};

use crate::application::drive_points::{DriveError, Feedback, PointActuator};
use crate::infrastructure::storage::config::MotorConfig;

#[derive(Debug, Clone, Copy)]
struct Transit {
    target: CanichePosition,
    remaining: u32,
    middle_due: bool,
}

#[derive(Debug)]
pub struct SimulatedMotorBank {
    transit_ticks: u32,
    report_middle: bool,
    transits: BTreeMap<PointId, Transit>,
    arrivals: u64,
}

impl SimulatedMotorBank {
    pub fn new(transit_ticks: u32, report_middle: bool) -> Self {
        Self {
            transit_ticks,
            report_middle,
            transits: BTreeMap::new(),
            arrivals: 0,
        }
    }

    pub fn from_config(config: &MotorConfig) -> Self {
        Self::new(config.transit_ticks, config.report_middle)
    }

    /// Number of motors currently moving.
    pub fn in_transit(&self) -> usize {
        self.transits.len()
    }

    /// Number of arrivals reported so far.
    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    /// Moves every motor one tick closer to its target.
    pub fn advance(&mut self) {
        for transit in self.transits.values_mut() {
            transit.remaining = transit.remaining.saturating_sub(1);
        }
    }
}

impl PointActuator for SimulatedMotorBank {
    fn command(&mut self, point_id: PointId, position: CanichePosition) -> Result<(), DriveError> {
        if matches!(position, CanichePosition::Middle | CanichePosition::Unknown) {
            return Err(DriveError::NotCommandable {
                point_id,
                code: position,
            });
        }
        let transit = Transit {
            target: position,
            remaining: self.transit_ticks,
            middle_due: self.report_middle,
        };
        if self.transits.insert(point_id, transit).is_some() {
            debug!(point_id, ?position, "transit restarted");
        }
        Ok(())
    }

    fn poll_feedback(&mut self) -> Vec<Feedback> {
        let mut reports = Vec::new();
        for (&point_id, transit) in self.transits.iter_mut() {
            if transit.middle_due {
                transit.middle_due = false;
                reports.push(Feedback {
                    point_id,
                    position: CanichePosition::Middle,
                });
            }
            if transit.remaining == 0 {
                trace!(point_id, position = ?transit.target, "motor arrived");
                reports.push(Feedback {
                    point_id,
                    position: transit.target,
                });
            }
        }
        let before = self.transits.len();
        self.transits.retain(|_, transit| transit.remaining > 0);
        self.arrivals += (before - self.transits.len()) as u64;
        reports
    }

    fn tick(&mut self) {
        self.advance();
    }
}

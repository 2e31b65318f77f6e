//! PointDriver: carries wishes from the layout to the turnout motors and
//! motor feedback back to the layout.
//!
//! Once per command cycle the driver polls every registered point for its
//! pending wish, in the Caniche vocabulary the motors understand, and
//! commands the [`PointActuator`].  It then applies every feedback report the
//! actuator produced since the last cycle.
//!
//! # Architecture
//!
//! The driver depends only on the [`PointActuator`] trait and the core
//! [`Layout`].  Real motor buses and the simulated motor bank are injected
//! per call, so the driver is unit-tested with a generated mock.
//!
//! Wished-change notifications do not carry the wish itself: they only tell
//! the host *that* something changed.  [`NotificationInbox`] turns them into
//! a channel the host can await to run a cycle early.

use std::rc::Rc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};
use tt_core::{Action, CanichePosition, Layout, PointId, Sender};

/// Error type for the point-driving use case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriveError {
    /// The actuator cannot move to `code` (`Middle` or `Unknown`).
    #[error("point {point_id}: {code:?} is not a commandable position")]
    NotCommandable {
        point_id: PointId,
        code: CanichePosition,
    },
    /// The actuator reported a failure.
    #[error("point {point_id}: actuator failure: {reason}")]
    Actuator { point_id: PointId, reason: String },
}

/// A position reported by a motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub point_id: PointId,
    pub position: CanichePosition,
}

/// Trait for the hardware that moves turnout motors.
///
/// Infrastructure implementations drive a motor bus or simulate one; tests
/// use the generated `MockPointActuator`.
#[cfg_attr(test, mockall::automock)]
pub trait PointActuator {
    /// Starts moving the motor of point `point_id` toward `position`.
    fn command(&mut self, point_id: PointId, position: CanichePosition) -> Result<(), DriveError>;

    /// Returns every position reported since the last poll, oldest first.
    fn poll_feedback(&mut self) -> Vec<Feedback>;

    /// Called once per simulation tick.  Actuators with timed behavior
    /// advance here; the default does nothing.
    fn tick(&mut self) {}
}

/// Outcome of one [`PointDriver::run_cycle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Wishes successfully handed to the actuator.
    pub commanded: usize,
    /// Wishes the actuator rejected.
    pub failed: usize,
    /// Feedback reports applied to the layout.
    pub feedback_applied: usize,
}

impl CycleReport {
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Runs command cycles and keeps running totals.
#[derive(Debug, Default)]
pub struct PointDriver {
    cycles: u64,
    totals: CycleReport,
}

impl PointDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cycles run so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Sum of every cycle report so far.
    pub fn totals(&self) -> CycleReport {
        self.totals
    }

    /// Runs one command cycle.
    ///
    /// Every registered identifier is polled and drained, since a double
    /// point may hold a wish for both halves at once.  An actuator error is
    /// logged and counted; the remaining wishes are still commanded.
    pub fn run_cycle<A>(&mut self, layout: &mut Layout, actuator: &mut A) -> CycleReport
    where
        A: PointActuator + ?Sized,
    {
        let mut report = CycleReport::default();

        let ids: Vec<PointId> = layout.registered_point_ids().collect();
        for id in ids {
            while let Some(wish) = layout.pending_caniche_wish_of_point(id) {
                match actuator.command(wish.point_id, wish.position) {
                    Ok(()) => {
                        debug!(point_id = wish.point_id, position = ?wish.position, "point commanded");
                        report.commanded += 1;
                    }
                    Err(e) => {
                        warn!("command failed: {e}");
                        report.failed += 1;
                    }
                }
            }
        }

        for feedback in actuator.poll_feedback() {
            trace!(point_id = feedback.point_id, position = ?feedback.position, "feedback");
            layout.set_caniche_actual_position_of_point(feedback.point_id, feedback.position);
            report.feedback_applied += 1;
        }

        self.cycles += 1;
        self.totals.commanded += report.commanded;
        self.totals.failed += report.failed;
        self.totals.feedback_applied += report.feedback_applied;
        report
    }
}

/// Queue of wished-change notifications.
///
/// [`action`](Self::action) builds the callback to install on every device;
/// it only enqueues the [`Sender`], so it never blocks inside a mutation.
#[derive(Debug)]
pub struct NotificationInbox {
    tx: mpsc::UnboundedSender<Sender>,
    rx: mpsc::UnboundedReceiver<Sender>,
}

impl NotificationInbox {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Returns a device action feeding this inbox.
    pub fn action(&self) -> Action {
        let tx = self.tx.clone();
        Rc::new(move |sender: Sender| {
            if tx.send(sender).is_err() {
                trace!(?sender, "notification dropped, inbox closed");
            }
        })
    }

    /// Waits for the next notification.
    ///
    /// Never resolves to `None` while the inbox is alive, since it keeps a
    /// sender of its own.
    pub async fn recv(&mut self) -> Option<Sender> {
        self.rx.recv().await
    }

    /// Takes every queued notification without waiting.
    pub fn drain(&mut self) -> Vec<Sender> {
        std::iter::from_fn(|| self.rx.try_recv().ok()).collect()
    }
}

impl Default for NotificationInbox {
    fn default() -> Self {
        Self::new()
    }
}

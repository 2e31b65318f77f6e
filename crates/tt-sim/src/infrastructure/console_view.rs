//! Console view: logs the devices that asked to be redrawn.
//!
//! Stands in for the touch screen renderer.  After each tick it takes every
//! redraw request from the layout and logs the state a renderer would draw.

use tracing::info;
use tt_core::{Layout, PointControl, Redraw};

#[derive(Debug, Default)]
pub struct ConsoleView {
    frames: u64,
    redraws: u64,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-empty frames rendered.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Total device redraws logged.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Takes and logs every pending redraw; returns how many were logged.
    pub fn render(&mut self, layout: &mut Layout) -> usize {
        let redraws = layout.take_redraws();
        if redraws.is_empty() {
            return 0;
        }
        for redraw in &redraws {
            log_device(layout, *redraw);
        }
        self.frames += 1;
        self.redraws += redraws.len() as u64;
        redraws.len()
    }

    /// Logs the final state of every point.
    pub fn log_summary(&self, layout: &Layout) {
        for (_, point) in layout.points() {
            for id in point.point_ids() {
                info!(
                    point_id = id,
                    wished = ?point.wished_position(id),
                    actual = ?point.actual_position(id),
                    pending = point.is_pending(id),
                    "final point state"
                );
            }
        }
        info!(
            frames = self.frames,
            redraws = self.redraws,
            "view summary"
        );
    }
}

fn log_device(layout: &Layout, redraw: Redraw) {
    match redraw {
        Redraw::Point(handle) => {
            let Some(point) = layout.point(handle) else {
                return;
            };
            for id in point.point_ids() {
                info!(
                    point_id = id,
                    wished = ?point.wished_position(id),
                    actual = ?point.actual_position(id),
                    pending = point.is_pending(id),
                    "point"
                );
            }
        }
        Redraw::Decoupler(handle) => {
            if let Some(decoupler) = layout.decoupler(handle) {
                info!(
                    decoupler_id = decoupler.id(),
                    engaged = decoupler.position(),
                    "decoupler"
                );
            }
        }
        Redraw::Signal(handle) => {
            if let Some(signal) = layout.signal(handle) {
                info!(
                    index = handle.index(),
                    direction = ?signal.direction(),
                    state = ?signal.state(),
                    "signal"
                );
            }
        }
    }
}

//! Builds a [`Layout`] from its TOML description.
//!
//! Devices are added in file order, points first, then double points,
//! decouplers and signals.  A later device reusing an identifier takes it
//! over, as the core's registries do.

use tracing::{info, warn};
use tt_core::{Layout, PointShape, MAX_DECOUPLERS, MAX_POINTS};

use crate::infrastructure::storage::config::SimConfig;

/// Constructs every device described by `config`.
///
/// Identifiers outside the registry tables are accepted but never resolve;
/// they are reported with `warn!` since a layout file should not contain them.
pub fn build_layout(config: &SimConfig) -> Layout {
    let mut layout = Layout::new();

    for entry in &config.points {
        warn_if_out_of_range("point", entry.id, MAX_POINTS);
        let shape = PointShape {
            in_diagonal: entry.in_diagonal,
            out_diagonal: entry.out_diagonal,
            reversed: entry.reversed,
        };
        layout.add_point(entry.id, entry.way, shape);
    }

    for entry in &config.double_points {
        warn_if_out_of_range("point", entry.top_id, MAX_POINTS);
        warn_if_out_of_range("point", entry.bottom_id, MAX_POINTS);
        layout.add_double_point(
            entry.top_id,
            entry.bottom_id,
            entry.way,
            entry.size,
            entry.reversed,
        );
    }

    for entry in &config.decouplers {
        warn_if_out_of_range("decoupler", entry.id, MAX_DECOUPLERS);
        layout.add_decoupler(entry.id);
    }

    for entry in &config.signals {
        layout.add_signal(entry.direction);
    }

    info!(
        points = layout.points().count(),
        decouplers = layout.decouplers().count(),
        signals = layout.signals().count(),
        "layout built"
    );
    layout
}

fn warn_if_out_of_range(kind: &str, id: u8, capacity: usize) {
    if usize::from(id) >= capacity {
        warn!("{kind} identifier {id} is outside 0..{capacity} and will not be addressable");
    }
}

//! tt-sim entry point.
//!
//! Loads a layout description, builds the layout, and runs it against a bank
//! of simulated turnout motors while replaying the scripted touches.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config_from()      -- TOML layout + settings
//!  └─ build_layout()          -- devices and registries
//!  └─ NotificationInbox       -- action installed on every device
//!  └─ loop
//!       ├─ tick: scenario → driver cycle → motor tick → view
//!       ├─ notification: extra driver cycle
//!       └─ Ctrl-C / tick limit: stop
//! ```
//!
//! The layout is not `Send`, so everything runs on a current-thread runtime.

use std::time::Duration;

use anyhow::Context;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use tt_sim::application::build_layout::build_layout;
use tt_sim::application::drive_points::NotificationInbox;
use tt_sim::application::scenario::Scenario;
use tt_sim::application::simulate::Simulation;
use tt_sim::infrastructure::console_view::ConsoleView;
use tt_sim::infrastructure::motor::SimulatedMotorBank;
use tt_sim::infrastructure::storage::config::{load_config_from, resolve_config_path};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let path = resolve_config_path(std::env::args_os().nth(1));
    let config = load_config_from(&path)
        .with_context(|| format!("failed to load layout from {}", path.display()))?;

    // Level is overridden by `RUST_LOG`, then taken from the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.simulation.log_level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(config = %path.display(), "tt-sim starting");

    let mut layout = build_layout(&config);
    let mut inbox = NotificationInbox::new();
    layout.set_action_of_all_points(inbox.action());
    layout.set_action_of_all_decouplers(inbox.action());

    let scenario = Scenario::from_config(&config.script);
    let motors = SimulatedMotorBank::from_config(&config.motor);
    let mut sim = Simulation::new(layout, scenario, motors);
    let mut view = ConsoleView::new();

    let max_ticks = config.simulation.max_ticks;
    let mut ticker = tokio::time::interval(Duration::from_millis(config.simulation.tick_ms.max(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(max_ticks, "simulation running.  Press Ctrl-C to exit.");

    loop {
        tokio::select! {
            result = &mut shutdown => {
                match result {
                    Ok(()) => info!("shutdown signal received"),
                    Err(e) => error!("failed to listen for Ctrl-C: {e}"),
                }
                break;
            }
            _ = ticker.tick() => {
                let report = sim.step();
                // Notifications raised by this tick's touches were served by its cycle.
                let notifications = inbox.drain().len();
                if report.touches > 0 || !report.cycle.is_idle() {
                    debug!(
                        tick = report.tick,
                        touches = report.touches,
                        notifications,
                        commanded = report.cycle.commanded,
                        feedback = report.cycle.feedback_applied,
                        "tick"
                    );
                }
                view.render(sim.layout_mut());
                if max_ticks != 0 && sim.tick() >= max_ticks {
                    info!("tick limit reached");
                    break;
                }
            }
            Some(sender) = inbox.recv() => {
                let queued = inbox.drain().len();
                debug!(?sender, queued, "wished change, running extra cycle");
                sim.run_driver_cycle();
                view.render(sim.layout_mut());
            }
        }
    }

    view.log_summary(sim.layout());
    let totals = sim.driver().totals();
    info!(
        ticks = sim.tick(),
        cycles = sim.driver().cycles(),
        commanded = totals.commanded,
        failed = totals.failed,
        feedback = totals.feedback_applied,
        arrivals = sim.actuator().arrivals(),
        settled = sim.is_settled(),
        "tt-sim stopped"
    );
    Ok(())
}

//! Draw command implementation.
//!
//! Prints the draw list for one frame as JSON so an external renderer can
//! replay it.

use anyhow::Result;
use dolbones_core::{DrawList, draw_skeleton};
use tracing::info;

use super::{Session, present_fighter};

/// Run the draw command
pub fn run(session: &Session, slot: Option<u32>) -> Result<()> {
    let slot = session.slot(slot);
    let reader = session.attach()?;
    let fighter = present_fighter(&reader, slot)?;
    let skeleton = fighter.skeleton(&reader, &session.config.walk)?;

    let mut list = DrawList::new();
    draw_skeleton(&skeleton, &mut list, &session.config.style);
    info!(
        "{} joints: {} points, {} lines",
        skeleton.len(),
        list.points().count(),
        list.lines().count()
    );

    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}

//! Validate command implementation.
//!
//! Compares the joints read from memory against the emulator's own bone
//! transform log for the same frame.

use std::path::Path;

use anyhow::{Context, Result, bail};
use dolbones_core::{PoseComparison, PoseLog, compare_poses};
use owo_colors::OwoColorize;

use super::{Session, present_fighter};

/// Run the validate command
pub fn run(session: &Session, log: &Path, slot: Option<u32>) -> Result<()> {
    let pose_log = PoseLog::from_file(log)
        .with_context(|| format!("Failed to read bone log {}", log.display()))?;
    if pose_log.poses.is_empty() {
        bail!("No bone transforms found in {}", log.display());
    }

    let slot = session.slot(slot);
    let reader = session.attach()?;
    let fighter = present_fighter(&reader, slot)?;
    let jobjs = fighter.bone_jobjs(&reader)?;

    let results = compare_poses(&pose_log, &jobjs, session.config.tolerance)?;

    match pose_log.frame {
        Some(frame) => println!("=== Frame {}, slot {} ===", frame, slot),
        None => println!("=== Slot {} ===", slot),
    }
    for result in &results {
        print_comparison(result);
    }

    let failed = results.iter().filter(|r| !r.passed()).count();
    println!();
    if failed > 0 {
        println!("{}", format!("{} of {} bones differ", failed, results.len()).red());
        bail!("{} bones outside tolerance", failed);
    }
    println!("{}", format!("All {} bones match", results.len()).green());
    Ok(())
}

fn print_comparison(result: &PoseComparison) {
    let mark = if result.passed() { "✅" } else { "❌" };
    println!("{} bone {:>3} @ {}", mark, result.index, result.logged.address);

    if !result.position_ok {
        println!(
            "    pos  log {:?}  mem {:?}  delta {:?}",
            result.logged.position,
            result.read_position,
            result.position_delta.red()
        );
    }
    if !result.rotation_ok {
        println!(
            "    rot  log {:?}  mem {:?}  delta {:?}",
            result.logged.rotation,
            result.read_rotation,
            result.rotation_delta.red()
        );
    }
}

//! Fighter command implementation.

use anyhow::Result;
use dolbones_core::{FighterPart, FighterSummary};

use super::{Session, present_fighter};

/// Run the fighter command
pub fn run(session: &Session, slot: Option<u32>, json: bool) -> Result<()> {
    let slot = session.slot(slot);
    let reader = session.attach()?;
    let fighter = present_fighter(&reader, slot)?;
    let summary = fighter.summary(&reader, slot)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &FighterSummary) {
    let name = summary
        .kind
        .map(|k| k.display_name())
        .unwrap_or("Unknown");

    println!("=== Slot {}: {} (kind {}) ===", summary.slot, name, summary.kind_id);
    println!("Fighter data: {:#010x}", summary.base);
    println!("Bone table:   {:#010x}", summary.bone_table);
    println!();
    println!("Bones ({}):", summary.bones.len());
    println!("  {:>3}  {:<12} {:<10} {:<10} {}", "idx", "part", "joint", "jobj2", "flags");

    for (i, bone) in summary.bones.iter().enumerate() {
        let part = FighterPart::from_index(i).map(|p| p.name()).unwrap_or("-");
        println!(
            "  {:>3}  {:<12} {:<10} {:<10} {:#04x}",
            i,
            part,
            bone.p_joint.to_string(),
            bone.p_jobj2.to_string(),
            bone.flags
        );
    }
}

//! Skeleton command implementation.

use anyhow::Result;
use dolbones_core::{Skeleton, WalkLimits};

use super::{Session, present_fighter};

/// Run the skeleton command
pub fn run(
    session: &Session,
    slot: Option<u32>,
    max_nodes: Option<usize>,
    max_depth: Option<usize>,
    json: bool,
) -> Result<()> {
    let slot = session.slot(slot);
    let limits = WalkLimits {
        max_nodes: max_nodes.unwrap_or(session.config.walk.max_nodes),
        max_depth: max_depth.unwrap_or(session.config.walk.max_depth),
    };

    let reader = session.attach()?;
    let fighter = present_fighter(&reader, slot)?;
    let skeleton = fighter.skeleton(&reader, &limits)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&skeleton)?);
    } else {
        println!("=== Slot {} skeleton: {} joints ===", slot, skeleton.len());
        for line in tree_lines(&skeleton) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// One line per joint, indented by depth
fn tree_lines(skeleton: &Skeleton) -> Vec<String> {
    skeleton
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let jobj = &node.jobj;
            let position = match jobj.world_position() {
                Some([x, y, z]) => format!("({:.3}, {:.3}, {:.3})", x, y, z),
                None => "(dirty)".to_string(),
            };
            format!(
                "{:>3} {}{} flags={:#010x} world={}",
                i,
                "  ".repeat(node.depth),
                jobj.address,
                jobj.flags.bits(),
                position
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dolbones_core::{GuestAddr, JObj, JObjFlags, SkeletonNode};

    fn node(address: u32, depth: usize, parent: Option<usize>, flags: JObjFlags) -> SkeletonNode {
        SkeletonNode {
            jobj: JObj {
                address: GuestAddr::new(address),
                flags,
                rotate: [0.0, 0.0, 0.0, 1.0],
                scale: [1.0; 3],
                translate: [0.0; 3],
                mtx: [[1.0, 0.0, 0.0, 1.5], [0.0, 1.0, 0.0, 2.0], [0.0, 0.0, 1.0, -3.0]],
                next: GuestAddr::NULL,
                parent: GuestAddr::NULL,
                child: GuestAddr::NULL,
            },
            depth,
            parent,
        }
    }

    #[test]
    fn test_tree_lines_indent_by_depth() {
        let skeleton = Skeleton {
            nodes: vec![
                node(0x8140_0000, 0, None, JObjFlags::SKELETON_ROOT),
                node(0x8140_0100, 1, Some(0), JObjFlags::MTX_DIRTY),
            ],
        };
        let lines = tree_lines(&skeleton);

        assert_eq!(
            lines[0],
            format!(
                "  0 81400000 flags={:#010x} world=(1.500, 2.000, -3.000)",
                JObjFlags::SKELETON_ROOT.bits()
            )
        );
        assert!(lines[1].starts_with("  1   81400100 "));
        assert!(lines[1].ends_with("world=(dirty)"));
    }
}

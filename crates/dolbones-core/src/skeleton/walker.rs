//! Guarded traversal of first-child/next-sibling joint trees
//!
//! The tree is read live from a running game, so pointers can be garbage
//! mid-frame. The walk uses an explicit stack, refuses to visit any address
//! twice, and stops at a node and depth budget.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::game::JObj;
use crate::memory::{GuestAddr, ReadMemory};
use crate::skeleton::draw::JointPose;

/// Default cap on decoded joints; real fighters have well under 100
pub const DEFAULT_MAX_NODES: usize = 256;
/// Default cap on child nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkLimits {
    pub max_nodes: usize,
    pub max_depth: usize,
}

impl Default for WalkLimits {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// One visited joint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkeletonNode {
    pub jobj: JObj,
    /// 0 for the root and its siblings
    pub depth: usize,
    /// Index of the parent node in `Skeleton::nodes`
    pub parent: Option<usize>,
}

/// Joints in pre-order: each node, then its child subtree, then its next
/// sibling
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Skeleton {
    pub nodes: Vec<SkeletonNode>,
}

impl Skeleton {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&SkeletonNode> {
        self.nodes.first()
    }

    /// Indices of the direct children of node `index`, in sibling order
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.parent == Some(index))
            .map(|(i, _)| i)
    }

    pub fn find(&self, address: GuestAddr) -> Option<usize> {
        self.nodes.iter().position(|n| n.jobj.address == address)
    }

    pub fn addresses(&self) -> impl Iterator<Item = GuestAddr> + '_ {
        self.nodes.iter().map(|n| n.jobj.address)
    }

    pub fn poses(&self) -> Vec<JointPose> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| JointPose {
                index,
                address: node.jobj.address,
                position: node.jobj.world_position(),
                rotation: node.jobj.rotate,
            })
            .collect()
    }
}

struct Pending {
    address: GuestAddr,
    depth: usize,
    parent: Option<usize>,
}

/// Decode the tree rooted at `root`
pub fn walk<R: ReadMemory + ?Sized>(
    reader: &R,
    root: GuestAddr,
    limits: &WalkLimits,
) -> Result<Skeleton> {
    let mut skeleton = Skeleton::default();
    let mut visited = HashSet::new();
    let mut stack = vec![Pending {
        address: root,
        depth: 0,
        parent: None,
    }];

    while let Some(pending) = stack.pop() {
        if !visited.insert(pending.address) {
            warn!("Joint {} reached twice while walking {}", pending.address, root);
            return Err(Error::CycleDetected {
                address: pending.address.get(),
            });
        }
        if skeleton.nodes.len() >= limits.max_nodes {
            return Err(Error::DepthExceeded {
                limit: limits.max_nodes,
            });
        }
        if pending.depth > limits.max_depth {
            return Err(Error::DepthExceeded {
                limit: limits.max_depth,
            });
        }

        let jobj = JObj::from_mem(reader, pending.address)?;
        let index = skeleton.nodes.len();

        // Sibling goes underneath so the child subtree is finished first
        if !jobj.next.is_null() {
            stack.push(Pending {
                address: jobj.next,
                depth: pending.depth,
                parent: pending.parent,
            });
        }
        if !jobj.child.is_null() {
            stack.push(Pending {
                address: jobj.child,
                depth: pending.depth + 1,
                parent: Some(index),
            });
        }

        skeleton.nodes.push(SkeletonNode {
            jobj,
            depth: pending.depth,
            parent: pending.parent,
        });
    }

    debug!("Walked {} joints from {}", skeleton.len(), root);
    Ok(skeleton)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::write_jobj;
    use crate::memory::MockMemoryBuilder;

    const ROOT: u32 = 0x8140_0000;
    const A: u32 = 0x8140_0100;
    const A_CHILD: u32 = 0x8140_0200;
    const B: u32 = 0x8140_0300;

    /// root -> A (child), A -> A_CHILD (child), A -> B (next)
    fn four_nodes() -> MockMemoryBuilder {
        let b = MockMemoryBuilder::new();
        let b = write_jobj(b, ROOT, 0x3, 0, A, 0);
        let b = write_jobj(b, A, 0x1, B, A_CHILD, ROOT);
        let b = write_jobj(b, A_CHILD, 0x1, 0, 0, A);
        write_jobj(b, B, 0x1, 0, 0, ROOT)
    }

    #[test]
    fn test_pre_order() {
        let reader = four_nodes().reader();
        let skeleton = walk(&reader, GuestAddr::new(ROOT), &WalkLimits::default()).unwrap();

        let order: Vec<u32> = skeleton.addresses().map(GuestAddr::get).collect();
        assert_eq!(order, vec![ROOT, A, A_CHILD, B]);

        let depths: Vec<usize> = skeleton.nodes.iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 1]);
        assert_eq!(skeleton.nodes[3].parent, Some(0));
        assert_eq!(skeleton.nodes[2].parent, Some(1));
        assert_eq!(skeleton.children(0).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(skeleton.children(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(skeleton.find(GuestAddr::new(B)), Some(3));
    }

    #[test]
    fn test_child_then_sibling() {
        let b = MockMemoryBuilder::new();
        let b = write_jobj(b, ROOT, 0x3, 0, A, 0);
        let b = write_jobj(b, A, 0x1, B, 0, ROOT);
        let reader = write_jobj(b, B, 0x1, 0, 0, ROOT).reader();

        let skeleton = walk(&reader, GuestAddr::new(ROOT), &WalkLimits::default()).unwrap();
        let order: Vec<u32> = skeleton.addresses().map(GuestAddr::get).collect();
        assert_eq!(order, vec![ROOT, A, B]);
    }

    #[test]
    fn test_cycle_detected() {
        let b = MockMemoryBuilder::new();
        let b = write_jobj(b, ROOT, 0x3, 0, A, 0);
        // A's child points back at the root
        let reader = write_jobj(b, A, 0x1, 0, ROOT, ROOT).reader();

        let err = walk(&reader, GuestAddr::new(ROOT), &WalkLimits::default()).unwrap_err();
        assert!(matches!(err, Error::CycleDetected { address: ROOT }));
    }

    #[test]
    fn test_self_sibling_cycle() {
        let reader = write_jobj(MockMemoryBuilder::new(), ROOT, 0x3, ROOT, 0, 0).reader();
        assert!(matches!(
            walk(&reader, GuestAddr::new(ROOT), &WalkLimits::default()),
            Err(Error::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_node_budget() {
        let reader = four_nodes().reader();
        let limits = WalkLimits {
            max_nodes: 3,
            ..WalkLimits::default()
        };
        assert!(matches!(
            walk(&reader, GuestAddr::new(ROOT), &limits),
            Err(Error::DepthExceeded { limit: 3 })
        ));
    }

    #[test]
    fn test_depth_budget() {
        let reader = four_nodes().reader();
        let limits = WalkLimits {
            max_depth: 1,
            ..WalkLimits::default()
        };
        assert!(matches!(
            walk(&reader, GuestAddr::new(ROOT), &limits),
            Err(Error::DepthExceeded { limit: 1 })
        ));
    }

    #[test]
    fn test_garbage_pointer_is_out_of_range() {
        let reader = write_jobj(MockMemoryBuilder::new(), ROOT, 0x3, 0, 0x1234, 0).reader();
        assert!(matches!(
            walk(&reader, GuestAddr::new(ROOT), &WalkLimits::default()),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_poses() {
        let reader = four_nodes().reader();
        let skeleton = walk(&reader, GuestAddr::new(ROOT), &WalkLimits::default()).unwrap();
        let poses = skeleton.poses();
        assert_eq!(poses.len(), 4);
        assert_eq!(poses[1].address, GuestAddr::new(A));
        assert_eq!(poses[1].rotation, [0.0, 0.0, 0.0, 1.0]);
        // seed 0x100: translation column is 0x100 + 3, +7, +11
        assert_eq!(poses[1].position, Some([259.0, 263.0, 267.0]));
    }
}

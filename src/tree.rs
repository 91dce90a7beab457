use crate::types::{BranchId, NodeId};
use glam::Vec3;

/// Minimum angular spacing between sibling branches, in degrees.
const MIN_SIBLING_ANGLE_DEG: f32 = 10.0;

/// Floor on the dot product between a new branch and the parent branch;
/// anything below folds back onto the incoming direction.
const REVERSAL_DOT_LIMIT: f32 = -0.8;

/// Upper bound on derived thickness, keeping the trunk from blowing up.
const THICKNESS_CAP: f32 = 3.0;

#[derive(Debug)]
pub struct TreeNode {
    pub pos: Vec3,
    /// Branch connecting this node to its parent; `None` only for the root.
    pub parent_branch: Option<BranchId>,
    pub child_branches: Vec<BranchId>,
    /// Powered thickness per child branch, parallel to `child_branches`.
    child_powered: Vec<f32>,
    powered_thickness: f32,
}

/// A directed segment from a parent node to the child node grown from it.
///
/// Immutable after creation; thickness lives on the nodes.
#[derive(Debug)]
pub struct Branch {
    pub parent_node: NodeId,
    pub start: Vec3,
    pub end: Vec3,
    /// Unit vector from `start` to `end`.
    pub direction: Vec3,
    pub length: f32,
}

/// Arena of nodes and branches forming a single tree rooted at node 0.
///
/// Nodes and branches are append-only and addressed by index, so a node
/// can point down at its child branches while each branch points back up
/// at its parent node without ownership cycles.
#[derive(Debug)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
    pub branches: Vec<Branch>,
}

impl TreeNode {
    fn new(pos: Vec3, parent_branch: Option<BranchId>) -> Self {
        Self {
            pos,
            parent_branch,
            child_branches: Vec::with_capacity(4),
            child_powered: Vec::with_capacity(4),
            powered_thickness: 0.0,
        }
    }
}

impl Branch {
    fn new(parent_node: NodeId, start: Vec3, end: Vec3) -> Self {
        Self {
            parent_node,
            start,
            end,
            direction: (end - start).normalize_or_zero(),
            length: start.distance(end),
        }
    }
}

impl Tree {
    pub fn new(root_pos: Vec3) -> Self {
        Self {
            nodes: vec![TreeNode::new(root_pos, None)],
            branches: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    /// Creates the branch from `parent` to `end` and the node at `end`
    /// atomically, registering both on the parent.
    ///
    /// ### Returns
    /// The id of the new child node.
    pub fn add_child(&mut self, parent: NodeId, end: Vec3) -> NodeId {
        let start = self.nodes[parent].pos;
        let branch_id: BranchId = self.branches.len();
        self.branches.push(Branch::new(parent, start, end));

        let node_id: NodeId = self.nodes.len();
        self.nodes.push(TreeNode::new(end, Some(branch_id)));

        self.nodes[parent].child_branches.push(branch_id);
        self.nodes[parent].child_powered.push(0.0);
        node_id
    }

    /// Whether a branch may grow from `node` in `direction`.
    ///
    /// Rejects directions that nearly reverse the incoming branch
    /// (dot below [`REVERSAL_DOT_LIMIT`]) and directions within
    /// [`MIN_SIBLING_ANGLE_DEG`] of an existing child branch.
    pub fn is_new_direction_allowed(&self, node: NodeId, direction: Vec3) -> bool {
        let n = &self.nodes[node];

        if let Some(parent_branch) = n.parent_branch
            && direction.dot(self.branches[parent_branch].direction) < REVERSAL_DOT_LIMIT
        {
            return false;
        }

        for &child in &n.child_branches {
            if self.branches[child].direction.angle_between(direction).to_degrees()
                < MIN_SIBLING_ANGLE_DEG
            {
                return false;
            }
        }
        true
    }

    /// Finds the closest of the candidate nodes to `pos`.
    ///
    /// Ties go to the first-encountered candidate. Returns `None` when
    /// the candidate list is empty.
    pub fn find_nearest_among<I>(&self, candidates: I, pos: Vec3) -> Option<(NodeId, f32)>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut best = None;
        let mut best_dist = f32::MAX;
        for id in candidates {
            let dist = self.nodes[id].pos.distance(pos);
            if dist < best_dist {
                best_dist = dist;
                best = Some(id);
            }
        }
        best.map(|id| (id, best_dist))
    }

    /// A node with no child branches is a tip.
    pub fn is_tip(&self, node: NodeId) -> bool {
        self.nodes[node].child_branches.is_empty()
    }

    pub fn tip_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.child_branches.is_empty())
            .map(|(id, _)| id)
    }

    /// Derived thickness of a node: the inverse-powered sum of its
    /// children's powered thickness (pipe model), capped at
    /// [`THICKNESS_CAP`].
    pub fn thickness(&self, node: NodeId, power: f32) -> f32 {
        f32::min(
            THICKNESS_CAP,
            self.nodes[node].powered_thickness.powf(1.0 / power),
        )
    }

    /// Bottom-up thickness pass, run once after growth has finished.
    ///
    /// Every tip is seeded with `tip_thickness`, then walked up through
    /// its parent branches to the root, each visited parent absorbing the
    /// child's accumulated thickness into the slot for that branch.
    pub fn propagate_thickness(&mut self, tip_thickness: f32, power: f32) {
        let root = self.root();
        let tips: Vec<NodeId> = self.tip_ids().collect();

        for tip in tips {
            self.add_thickness(tip, None, tip_thickness, power);

            let mut current = tip;
            while current != root {
                let Some(parent_branch) = self.nodes[current].parent_branch else {
                    break;
                };
                let parent = self.branches[parent_branch].parent_node;
                let thickness = self.thickness(current, power);
                self.add_thickness(parent, Some(parent_branch), thickness, power);
                current = parent;
            }
        }
    }

    /// Stores `thickness` on `node`. A junction (more than one child)
    /// updates the slot for `branch` and re-sums; a tip seeding or a
    /// single-child node overwrites its accumulator directly.
    fn add_thickness(&mut self, node: NodeId, branch: Option<BranchId>, thickness: f32, power: f32) {
        let n = &mut self.nodes[node];
        if n.child_branches.len() > 1 && let Some(branch) = branch {
            if let Some(slot) = n.child_branches.iter().position(|&cb| cb == branch) {
                n.child_powered[slot] = thickness.powf(power);
                n.powered_thickness = n.child_powered.iter().sum();
            }
        } else {
            n.powered_thickness = thickness.powf(power);
        }
    }
}

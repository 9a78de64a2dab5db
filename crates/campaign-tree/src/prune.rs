//! Weakest-link cost-complexity pruning.

use crate::node::{Node, NodeIndex};
use crate::tree::DecisionTree;

/// Leaf count and summed leaf risk of the subtree rooted at `idx`,
/// recording the internal node with the smallest complexity in `weakest`.
fn scan_subtree(
    nodes: &[Node],
    idx: usize,
    root_risk: f64,
    weakest: &mut Option<(f64, usize)>,
) -> (usize, usize) {
    match &nodes[idx] {
        Node::Leaf { .. } => (1, nodes[idx].risk()),
        Node::Split { left, right, .. } => {
            let (left_leaves, left_risk) = scan_subtree(nodes, left.index(), root_risk, weakest);
            let (right_leaves, right_risk) =
                scan_subtree(nodes, right.index(), root_risk, weakest);
            let leaves = left_leaves + right_leaves;
            let subtree_risk = left_risk + right_risk;

            let gain = nodes[idx].risk().saturating_sub(subtree_risk) as f64;
            let complexity = gain / ((leaves - 1) as f64 * root_risk);
            if weakest.is_none_or(|(best, _)| complexity < best) {
                *weakest = Some((complexity, idx));
            }
            (leaves, subtree_risk)
        }
    }
}

/// Copy the reachable nodes into a fresh arena in pre-order.
fn compact(nodes: &[Node], idx: usize, out: &mut Vec<Node>) -> NodeIndex {
    let new_idx = out.len();
    match &nodes[idx] {
        Node::Leaf { .. } => out.push(nodes[idx].clone()),
        Node::Split {
            feature,
            rule,
            left,
            right,
            impurity,
            class_counts,
            impurity_decrease,
        } => {
            out.push(nodes[idx].clone());
            let new_left = compact(nodes, left.index(), out);
            let new_right = compact(nodes, right.index(), out);
            out[new_idx] = Node::Split {
                feature: *feature,
                rule: rule.clone(),
                left: new_left,
                right: new_right,
                impurity: *impurity,
                class_counts: *class_counts,
                impurity_decrease: *impurity_decrease,
            };
        }
    }
    NodeIndex::new(new_idx)
}

impl DecisionTree {
    /// Return a copy of the tree pruned at the given complexity.
    ///
    /// The complexity of an internal node `t` is
    /// `(R(t) - R(T_t)) / ((leaves(T_t) - 1) * R(root))`, where `R` counts
    /// misclassified training rows. The node with the smallest complexity is
    /// collapsed into a leaf while that complexity is `<= complexity`, and
    /// the remaining complexities are recomputed after every collapse.
    ///
    /// A tree whose root is already pure is returned unchanged.
    #[must_use]
    pub fn prune(&self, complexity: f64) -> DecisionTree {
        let mut nodes = self.nodes.clone();
        let root_risk = nodes[0].risk();

        if root_risk > 0 {
            loop {
                let mut weakest = None;
                scan_subtree(&nodes, 0, root_risk as f64, &mut weakest);
                match weakest {
                    Some((value, idx)) if value <= complexity => {
                        nodes[idx] = Node::Leaf {
                            class_counts: nodes[idx].class_counts(),
                            impurity: nodes[idx].impurity(),
                        };
                    }
                    _ => break,
                }
            }
        }

        let mut compacted = Vec::with_capacity(nodes.len());
        compact(&nodes, 0, &mut compacted);
        DecisionTree {
            nodes: compacted,
            kinds: self.kinds.clone(),
        }
    }
}

//! Structural rewriting passes over a freshly built attack tree.
//!
//! Three passes run in sequence: `simplify` expands reachability chains
//! into explicit AND/OR shape, `target_out` hoists the target to the top
//! level, and `fold` collapses gates left with a single child.

use crate::tree::{AttackTree, ChildRef, GateKind, GateState};

impl AttackTree {
    /// Rewrite "item → its reachable set" chains under `gate` into explicit
    /// AND/OR shape: reaching a non-target item requires the item AND
    /// whatever leads onward from it.
    ///
    /// `history` is the stack of already-expanded leaves, guarding against
    /// cycles back into the source topology. Returns whether the gate had
    /// anything to expand; the caller uses a false return to unwrap an AND
    /// gate whose onward OR came up empty.
    pub(crate) fn simplify(
        &mut self,
        gate: usize,
        history: &mut Vec<usize>,
        target: usize,
    ) -> bool {
        let items = self.gates[gate].children.clone();
        for (pos, item) in items.iter().enumerate() {
            let leaf = match *item {
                ChildRef::Leaf(leaf) if leaf != target => leaf,
                _ => continue,
            };

            let onward: Vec<ChildRef> = self.reachable[leaf]
                .iter()
                .copied()
                .filter(|next| !history.contains(next))
                .map(ChildRef::Leaf)
                .collect();
            let or = self.new_gate(GateKind::Or, onward);
            let and = self.new_gate(GateKind::And, vec![ChildRef::Leaf(leaf), ChildRef::Gate(or)]);
            self.gates[gate].children[pos] = ChildRef::Gate(and);

            history.push(leaf);
            let productive = self.simplify(or, history, target);
            history.pop();

            if self.gates[or].children.is_empty() {
                // Nothing leads onward from this item: drop the empty OR
                // and unwrap the AND back to the bare item.
                self.gates[and].children.retain(|c| *c != ChildRef::Gate(or));
                if self.gates[and].children.len() == 1 && !productive {
                    self.gates[gate].children[pos] = ChildRef::Leaf(leaf);
                }
            }
        }
        !items.is_empty()
    }

    /// Pull the target out of the tree body: strip every occurrence, sweep
    /// the gates the strip emptied, then re-attach one copy of the target
    /// under each top-level branch gate, so reaching the target always
    /// and-closes a branch.
    pub(crate) fn target_out(&mut self, target: usize) {
        self.strip_target(self.root, target);
        self.delete_emptied(self.root);

        let branches: Vec<usize> = self.gates[self.root]
            .children
            .iter()
            .filter_map(|c| match c {
                ChildRef::Gate(gate) => Some(*gate),
                ChildRef::Leaf(_) => None,
            })
            .collect();
        for branch in branches {
            self.gates[branch].children.push(ChildRef::Leaf(target));
        }
    }

    /// Remove every occurrence of the target below `gate`. A gate whose
    /// sole child was the target is tagged `Emptied` rather than left with
    /// an empty child list.
    fn strip_target(&mut self, gate: usize, target: usize) {
        let children = self.gates[gate].children.clone();
        if children.len() == 1 && children[0] == ChildRef::Leaf(target) {
            self.gates[gate].children.clear();
            self.gates[gate].state = GateState::Emptied;
            return;
        }

        for child in children {
            if let ChildRef::Gate(sub) = child {
                self.strip_target(sub, target);
            }
        }
        self.gates[gate]
            .children
            .retain(|c| *c != ChildRef::Leaf(target));
    }

    /// Sweep children pointing at gates emptied by target extraction.
    fn delete_emptied(&mut self, gate: usize) {
        let children = self.gates[gate].children.clone();
        for child in &children {
            if let ChildRef::Gate(sub) = child {
                if self.gates[*sub].state == GateState::Active {
                    self.delete_emptied(*sub);
                }
            }
        }

        let kept: Vec<ChildRef> = children
            .into_iter()
            .filter(|c| match c {
                ChildRef::Gate(sub) => self.gates[*sub].state == GateState::Active,
                ChildRef::Leaf(_) => true,
            })
            .collect();
        self.gates[gate].children = kept;
    }

    /// Collapse child gates left with exactly one child; they add no
    /// boolean meaning. Folds bottom-up.
    pub(crate) fn fold(&mut self, gate: usize) {
        let children = self.gates[gate].children.clone();
        for (pos, child) in children.iter().enumerate() {
            if let ChildRef::Gate(sub) = child {
                self.fold(*sub);
                if self.gates[*sub].children.len() == 1 {
                    let only = self.gates[*sub].children[0];
                    self.gates[gate].children[pos] = only;
                }
            }
        }
    }
}

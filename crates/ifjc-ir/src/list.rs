//! Cursor-based doubly-linked instruction list.
//!
//! Instruction nodes live in an index-addressed vector with `prev`/`next`
//! stored as indices; no pointer surgery. A movable *active* cursor serves
//! as the insertion anchor, and a dedicated splice operation implements the
//! while-loop DEFVAR hoisting without exposing the links themselves.
//!
//! List invariant: `head.prev` and `tail.next` are none, and for every
//! linked node `n`, `n.next.prev == n` and `n.prev.next == n`. Unlinked
//! slots stay in the vector but are unreachable from the chain.

use crate::instr::{Instruction, Opcode};

/// Stable handle to an instruction node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId(usize);

struct Node {
    instr: Instruction,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// The instruction list.
#[derive(Default)]
pub struct InstructionList {
    nodes: Vec<Node>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    active: Option<NodeId>,
    len: usize,
}

impl InstructionList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            head: None,
            tail: None,
            active: None,
            len: 0,
        }
    }

    /// Number of linked instructions.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no instruction is linked.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the cursor points at a node.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The current cursor position.
    pub fn active_id(&self) -> Option<NodeId> {
        self.active
    }

    /// Moves the cursor to an arbitrary node.
    pub fn set_active(&mut self, id: NodeId) {
        self.active = Some(id);
    }

    /// Moves the cursor to the head.
    pub fn first(&mut self) {
        self.active = self.head;
    }

    /// Moves the cursor to the tail.
    pub fn last(&mut self) {
        self.active = self.tail;
    }

    /// Advances the cursor; past the tail it becomes inactive.
    pub fn next(&mut self) {
        if let Some(id) = self.active {
            self.active = self.node(id).next;
        }
    }

    /// Retreats the cursor; past the head it becomes inactive.
    pub fn previous(&mut self) {
        if let Some(id) = self.active {
            self.active = self.node(id).prev;
        }
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// The instruction stored at `id`.
    pub fn get(&self, id: NodeId) -> &Instruction {
        &self.node(id).instr
    }

    /// The node following `id`, if any.
    pub fn next_id(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next
    }

    fn alloc(&mut self, instr: Instruction) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            instr,
            prev: None,
            next: None,
        });
        id
    }

    /// Inserts at the head and moves the cursor to the new node.
    pub fn insert_first(&mut self, instr: Instruction) -> NodeId {
        let id = self.alloc(instr);
        self.link_before(id, self.head);
        self.active = Some(id);
        id
    }

    /// Inserts after the active node and moves the cursor to the new
    /// node. Without an active cursor the instruction is appended at the
    /// tail instead, so emission continues at the end of the list.
    pub fn insert_after_active(&mut self, instr: Instruction) -> NodeId {
        let id = self.alloc(instr);
        match self.active {
            Some(anchor) => self.link_after(id, anchor),
            None => self.link_before(id, None),
        }
        self.active = Some(id);
        id
    }

    /// Inserts before the active node and moves the cursor to the new node.
    pub fn insert_before_active(&mut self, instr: Instruction) -> Option<NodeId> {
        let anchor = self.active?;
        let id = self.alloc(instr);
        self.link_before(id, Some(anchor));
        self.active = Some(id);
        Some(id)
    }

    /// Unlinks the node after the active one.
    pub fn delete_after(&mut self) {
        if let Some(anchor) = self.active {
            if let Some(victim) = self.node(anchor).next {
                self.unlink(victim);
            }
        }
    }

    /// Unlinks the node before the active one.
    pub fn delete_before(&mut self) {
        if let Some(anchor) = self.active {
            if let Some(victim) = self.node(anchor).prev {
                self.unlink(victim);
            }
        }
    }

    fn link_after(&mut self, id: NodeId, anchor: NodeId) {
        let after = self.node(anchor).next;
        self.node_mut(id).prev = Some(anchor);
        self.node_mut(id).next = after;
        self.node_mut(anchor).next = Some(id);
        match after {
            Some(after_id) => self.node_mut(after_id).prev = Some(id),
            None => self.tail = Some(id),
        }
        self.len += 1;
    }

    /// Links `id` immediately before `before`; with `None` the node becomes
    /// the new head (and tail, if the list was empty).
    fn link_before(&mut self, id: NodeId, before: Option<NodeId>) {
        match before {
            Some(before_id) => {
                let prev = self.node(before_id).prev;
                self.node_mut(id).next = Some(before_id);
                self.node_mut(id).prev = prev;
                self.node_mut(before_id).prev = Some(id);
                match prev {
                    Some(prev_id) => self.node_mut(prev_id).next = Some(id),
                    None => self.head = Some(id),
                }
            },
            None => {
                self.node_mut(id).prev = self.tail;
                self.node_mut(id).next = None;
                match self.tail {
                    Some(tail_id) => self.node_mut(tail_id).next = Some(id),
                    None => self.head = Some(id),
                }
                self.tail = Some(id);
            },
        }
        self.len += 1;
    }

    fn unlink(&mut self, id: NodeId) {
        let prev = self.node(id).prev;
        let next = self.node(id).next;
        match prev {
            Some(prev_id) => self.node_mut(prev_id).next = next,
            None => self.head = next,
        }
        match next {
            Some(next_id) => self.node_mut(next_id).prev = prev,
            None => self.tail = prev,
        }
        self.node_mut(id).prev = None;
        self.node_mut(id).next = None;
        if self.active == Some(id) {
            self.active = prev;
        }
        self.len -= 1;
    }

    /// Code motion for while loops: every `DEFVAR` of a local-frame
    /// variable strictly between `anchor` and `stop` is unlinked and
    /// re-inserted just after `anchor` (preserving their relative order),
    /// so the interpreter does not re-execute variable definitions on
    /// subsequent loop iterations.
    pub fn hoist_defvars(&mut self, anchor: NodeId, stop: NodeId) {
        let mut hoist_point = anchor;
        let mut scan = self.node(anchor).next;

        while let Some(id) = scan {
            if id == stop {
                break;
            }
            let next_scan = self.node(id).next;

            let instr = &self.node(id).instr;
            let hoistable = instr.op == Opcode::DefVar
                && instr
                    .result
                    .as_ref()
                    .is_some_and(|operand| operand.is_local_frame_var());

            if hoistable {
                self.unlink(id);
                self.link_after(id, hoist_point);
                hoist_point = id;
            }

            scan = next_scan;
        }
    }

    /// Forward iteration from the head.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    /// Backward iteration from the tail.
    pub fn iter_rev(&self) -> IterRev<'_> {
        IterRev {
            list: self,
            current: self.tail,
        }
    }
}

/// Forward iterator over linked instructions.
pub struct Iter<'a> {
    list: &'a InstructionList,
    current: Option<NodeId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = &self.list.nodes[id.0];
        self.current = node.next;
        Some(&node.instr)
    }
}

/// Backward iterator over linked instructions.
pub struct IterRev<'a> {
    list: &'a InstructionList,
    current: Option<NodeId>,
}

impl<'a> Iterator for IterRev<'a> {
    type Item = &'a Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = &self.list.nodes[id.0];
        self.current = node.prev;
        Some(&node.instr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::Operand;

    fn defvar(name: &str) -> Instruction {
        Instruction {
            op: Opcode::DefVar,
            result: Some(Operand::local(name)),
            arg1: None,
            arg2: None,
        }
    }

    fn comment(text: &str) -> Instruction {
        Instruction {
            op: Opcode::Comment,
            result: Some(Operand::Comment(text.to_string())),
            arg1: None,
            arg2: None,
        }
    }

    fn mnemonics(list: &InstructionList) -> Vec<String> {
        list.iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_append_chain() {
        let mut list = InstructionList::new();
        list.insert_first(Instruction::nullary(Opcode::CreateFrame));
        list.insert_after_active(Instruction::nullary(Opcode::PushFrame));
        list.insert_after_active(Instruction::nullary(Opcode::PopFrame));
        assert_eq!(
            mnemonics(&list),
            vec!["CREATEFRAME", "PUSHFRAME", "POPFRAME"]
        );
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_insert_before_active() {
        let mut list = InstructionList::new();
        list.insert_first(Instruction::nullary(Opcode::Return));
        list.insert_before_active(Instruction::nullary(Opcode::PopFrame));
        assert_eq!(mnemonics(&list), vec!["POPFRAME", "RETURN"]);
    }

    #[test]
    fn test_cursor_motion() {
        let mut list = InstructionList::new();
        list.insert_first(Instruction::nullary(Opcode::CreateFrame));
        list.insert_after_active(Instruction::nullary(Opcode::PushFrame));
        list.first();
        assert!(list.is_active());
        list.next();
        list.next();
        assert!(!list.is_active());
        list.last();
        list.previous();
        list.previous();
        assert!(!list.is_active());
    }

    #[test]
    fn test_delete_after_and_before() {
        let mut list = InstructionList::new();
        list.insert_first(comment("a"));
        list.insert_after_active(comment("b"));
        list.insert_after_active(comment("c"));
        list.first();
        list.delete_after(); // removes b
        assert_eq!(list.len(), 2);
        assert_eq!(mnemonics(&list), vec!["# a", "# c"]);
        list.last();
        list.delete_before(); // removes a
        assert_eq!(mnemonics(&list), vec!["# c"]);
    }

    #[test]
    fn test_forward_backward_same_multiset() {
        let mut list = InstructionList::new();
        for name in ["a", "b", "c", "d"] {
            if list.is_empty() {
                list.insert_first(defvar(name));
            } else {
                list.insert_after_active(defvar(name));
            }
        }
        let mut forward: Vec<String> = list.iter().map(|i| i.to_string()).collect();
        let mut backward: Vec<String> = list.iter_rev().map(|i| i.to_string()).collect();
        backward.reverse();
        assert_eq!(forward, backward);
        forward.sort();
        assert_eq!(forward.len(), 4);
    }

    #[test]
    fn test_hoist_defvars() {
        let mut list = InstructionList::new();
        let anchor = list.insert_first(comment("While loop start"));
        list.insert_after_active(comment("label"));
        list.insert_after_active(defvar("t0"));
        list.insert_after_active(Instruction::nullary(Opcode::PopS));
        list.insert_after_active(defvar("x%1"));
        let stop = list.insert_after_active(comment("While loop end"));

        list.hoist_defvars(anchor, stop);

        assert_eq!(
            mnemonics(&list),
            vec![
                "# While loop start",
                "DEFVAR LF@t0",
                "DEFVAR LF@x%1",
                "# label",
                "POPS",
                "# While loop end",
            ]
        );
    }

    #[test]
    fn test_hoist_skips_temporary_frame_vars() {
        let mut list = InstructionList::new();
        let anchor = list.insert_first(comment("start"));
        list.insert_after_active(Instruction {
            op: Opcode::DefVar,
            result: Some(Operand::tf("%param0")),
            arg1: None,
            arg2: None,
        });
        let stop = list.insert_after_active(comment("end"));

        list.hoist_defvars(anchor, stop);

        assert_eq!(
            mnemonics(&list),
            vec!["# start", "DEFVAR TF@%param0", "# end"]
        );
    }

    #[test]
    fn test_list_links_stay_well_formed_after_hoist() {
        let mut list = InstructionList::new();
        let anchor = list.insert_first(comment("w"));
        for i in 0..10 {
            list.insert_after_active(defvar(&format!("t{i}")));
            list.insert_after_active(Instruction::nullary(Opcode::PopS));
        }
        let stop = list.insert_after_active(comment("end"));
        list.hoist_defvars(anchor, stop);

        let forward: Vec<String> = list.iter().map(|i| i.to_string()).collect();
        let mut backward: Vec<String> = list.iter_rev().map(|i| i.to_string()).collect();
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 22);
    }
}

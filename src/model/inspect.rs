use super::kind::{ElementKind, Slot};
use super::tree::Workbench;
use super::{ElementId, Result};
use compact_str::CompactString;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub id: ElementId,
    pub depth: u16,
    pub kind: ElementKind,
    pub element_id: CompactString,
    pub label: Option<String>,
    /// The element is its parent's active child.
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    ParentMismatch { child: ElementId },
    MultipleOwners { child: ElementId },
    Cycle { element: ElementId },
    IncompatibleSlot { container: ElementId, child: ElementId },
    SlotOverflow { container: ElementId, slot: Slot },
    StaleActiveChild { container: ElementId },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::ParentMismatch { child } => {
                write!(f, "{child:?} and its parent disagree about ownership")
            }
            InvariantViolation::MultipleOwners { child } => {
                write!(f, "{child:?} is owned more than once")
            }
            InvariantViolation::Cycle { element } => write!(f, "{element:?} is its own ancestor"),
            InvariantViolation::IncompatibleSlot { container, child } => {
                write!(f, "{container:?} owns {child:?} in the wrong slot")
            }
            InvariantViolation::SlotOverflow { container, slot } => {
                write!(f, "{slot:?} of {container:?} exceeds its capacity")
            }
            InvariantViolation::StaleActiveChild { container } => {
                write!(f, "active child of {container:?} is not one of its children")
            }
        }
    }
}

impl Workbench {
    /// Pre-order listing of `root` and every owned descendant.
    pub fn outline(&self, root: ElementId) -> Result<Vec<OutlineRow>> {
        self.get(root)?;
        let mut rows = Vec::new();
        let mut stack: Vec<(ElementId, u16)> = vec![(root, 0)];

        while let Some((id, depth)) = stack.pop() {
            let Some(element) = self.element(id) else {
                continue;
            };
            let active = element
                .parent()
                .and_then(|p| self.element(p))
                .is_some_and(|p| p.active_child() == Some(id));
            rows.push(OutlineRow {
                id,
                depth,
                kind: element.kind(),
                element_id: CompactString::from(element.element_id()),
                label: element.label().map(str::to_string),
                active,
            });
            for child in element.owned.iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        Ok(rows)
    }

    /// Checks every structural invariant over the whole arena.
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        let mut owner_count: rustc_hash::FxHashMap<ElementId, usize> = Default::default();

        for (id, element) in self.arena() {
            for slot in Slot::ALL {
                let owned = element.owned(slot);
                if slot.capacity().is_some_and(|cap| owned.len() > cap) {
                    violations.push(InvariantViolation::SlotOverflow {
                        container: id,
                        slot,
                    });
                }
                for &child in owned {
                    *owner_count.entry(child).or_default() += 1;
                    match self.element(child) {
                        Some(child_el) if child_el.parent() == Some(id) => {
                            if Slot::for_child(element.kind(), child_el.kind()) != Some(slot) {
                                violations.push(InvariantViolation::IncompatibleSlot {
                                    container: id,
                                    child,
                                });
                            }
                        }
                        _ => violations.push(InvariantViolation::ParentMismatch { child }),
                    }
                }
            }

            if let Some(active) = element.active_child() {
                if !element.children().contains(&active) {
                    violations.push(InvariantViolation::StaleActiveChild { container: id });
                }
            }

            if let Some(parent) = element.parent() {
                let owned_by_parent = self
                    .element(parent)
                    .is_some_and(|p| p.owned.slot_of(id).is_some());
                if !owned_by_parent {
                    violations.push(InvariantViolation::ParentMismatch { child: id });
                }
            }

            // Walking more than `len` parents means the chain loops.
            let bound = self.len();
            let steps = self.ancestors(id).skip(1).take(bound + 1).count();
            if steps > bound || self.ancestors(id).skip(1).take(bound).any(|a| a == id) {
                violations.push(InvariantViolation::Cycle { element: id });
            }
        }

        for (child, count) in owner_count {
            if count > 1 {
                violations.push(InvariantViolation::MultipleOwners { child });
            }
        }

        if !violations.is_empty() {
            tracing::warn!(count = violations.len(), "model invariants violated");
        }
        violations
    }
}

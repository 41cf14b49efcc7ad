use super::kind::{Capability, ElementKind, Slot};
use super::ElementId;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("invalid element id")]
    InvalidElement,
    #[error("element {child:?} is already owned by a container")]
    ElementAlreadyOwned { child: ElementId },
    #[error("attaching {child:?} under {container:?} would create a cycle")]
    CycleDetected {
        container: ElementId,
        child: ElementId,
    },
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("key sequence not bound: {0}")]
    NotBound(String),
    #[error("{container} cannot own {child}")]
    IncompatibleChild {
        container: ElementKind,
        child: ElementKind,
    },
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("element {child:?} is not owned by {container:?}")]
    NotAttached {
        container: ElementId,
        child: ElementId,
    },
    #[error("{kind} has no {capability} capability")]
    MissingCapability {
        kind: ElementKind,
        capability: Capability,
    },
    #[error("{slot:?} of {container:?} is already occupied")]
    SlotOccupied { container: ElementId, slot: Slot },
}

use log::debug;
use thiserror::Error;

use crate::block::Block;
use crate::host::Host;

/// Misuse of the block tree API. These are programming errors on the
/// caller's side, not conditions to recover from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("block tree is already mounted")]
    AlreadyMounted,
    #[error("block tree is not mounted")]
    NotMounted,
    #[error("block tree was already removed")]
    AlreadyRemoved,
    #[error("mount target cannot contain children")]
    InvalidContainer,
    #[error("the tree passed to patch has already been mounted")]
    NextAlreadyMounted,
    #[error("cannot patch a tree from render function #{expected} with one from #{found}")]
    ForeignTree { expected: u64, found: u64 },
    #[error("block trees have incompatible structure")]
    IncompatibleTree,
}

#[derive(Debug)]
enum State<H: Host> {
    Detached,
    Mounted(H::Node),
    Removed,
}

/// Handle returned by a render function: the root block plus the identity
/// of the render function that produced it.
#[derive(Debug)]
pub struct BDom<H: Host> {
    origin: u64,
    root: Block<H>,
    state: State<H>,
}

impl<H: Host> BDom<H> {
    pub fn new(origin: u64, root: Block<H>) -> Self {
        Self {
            origin,
            root,
            state: State::Detached,
        }
    }

    /// Id of the render function this tree came from.
    pub fn origin(&self) -> u64 {
        self.origin
    }

    pub fn root(&self) -> &Block<H> {
        &self.root
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self.state, State::Mounted(_))
    }

    /// The container this tree was mounted into.
    pub fn container(&self) -> Option<&H::Node> {
        match &self.state {
            State::Mounted(container) => Some(container),
            _ => None,
        }
    }

    /// Append the tree's nodes to `container`, in document order.
    pub fn mount(&mut self, host: &H, container: &H::Node) -> Result<(), ContractViolation> {
        match self.state {
            State::Detached => {}
            State::Mounted(_) => return Err(ContractViolation::AlreadyMounted),
            State::Removed => return Err(ContractViolation::AlreadyRemoved),
        }
        if !host.is_container(container) {
            return Err(ContractViolation::InvalidContainer);
        }
        debug!("mounting block tree #{}", self.origin);
        self.root.mount(host, container, None);
        self.state = State::Mounted(container.clone());
        Ok(())
    }

    /// Reconcile this mounted tree with a freshly rendered one. Afterwards
    /// `self` represents `next`'s state; `next` is consumed.
    pub fn patch(&mut self, host: &H, next: BDom<H>) -> Result<(), ContractViolation> {
        match self.state {
            State::Mounted(_) => {}
            State::Detached => return Err(ContractViolation::NotMounted),
            State::Removed => return Err(ContractViolation::AlreadyRemoved),
        }
        if !matches!(next.state, State::Detached) {
            return Err(ContractViolation::NextAlreadyMounted);
        }
        if next.origin != self.origin {
            return Err(ContractViolation::ForeignTree {
                expected: self.origin,
                found: next.origin,
            });
        }
        debug!("patching block tree #{}", self.origin);
        self.root.patch(host, next.root)
    }

    /// Detach and discard every node this tree owns.
    pub fn remove(&mut self, host: &H) -> Result<(), ContractViolation> {
        match self.state {
            State::Mounted(_) => {}
            State::Detached => return Err(ContractViolation::NotMounted),
            State::Removed => return Err(ContractViolation::AlreadyRemoved),
        }
        debug!("removing block tree #{}", self.origin);
        self.root.remove(host);
        self.state = State::Removed;
        Ok(())
    }
}

//! Records with identity owned by an external collaborator.

/// A record looked up by identity (customers, sales orders).
///
/// Two values with the same id describe the same record, even if a later
/// lookup returns different descriptive fields.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;

    fn same_identity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

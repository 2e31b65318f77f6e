//! Fixed-capacity identifier tables.
//!
//! Each device kind (points, decouplers) has its own namespace of small
//! integer identifiers.  A [`Registry`] maps an identifier to a non-owning
//! handle of the device that registered under it; the device itself is owned
//! by the [`Layout`](crate::domain::layout::Layout).
//!
//! Registration is last-writer-wins: registering a second device under an
//! identifier that is already taken silently replaces the first one.  The
//! first device keeps existing and stays reachable through its handle, it is
//! only no longer found by identifier.  Identifiers outside the table are
//! ignored.

/// Identifier of a point (or one half of a double point).
pub type PointId = u8;

/// Identifier of a decoupler.
pub type DecouplerId = u8;

/// Number of point identifiers (`0..64`).
pub const MAX_POINTS: usize = 64;

/// Number of decoupler identifiers (`0..64`).
pub const MAX_DECOUPLERS: usize = 64;

/// Outcome of [`Registry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration<H> {
    /// The slot was empty.
    Registered,
    /// The slot held another handle, which is returned.
    Replaced(H),
    /// The identifier is outside the table; nothing was stored.
    OutOfRange,
}

/// Identifier-indexed table of `N` optional handles.
#[derive(Debug, Clone)]
pub struct Registry<H: Copy, const N: usize> {
    slots: [Option<H>; N],
}

impl<H: Copy, const N: usize> Registry<H, N> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self { slots: [None; N] }
    }

    /// Number of identifiers the table can hold.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Stores `handle` at slot `id`, replacing any previous occupant.
    pub fn register(&mut self, id: u8, handle: H) -> Registration<H> {
        match self.slots.get_mut(usize::from(id)) {
            Some(slot) => match slot.replace(handle) {
                Some(previous) => Registration::Replaced(previous),
                None => Registration::Registered,
            },
            None => Registration::OutOfRange,
        }
    }

    /// Returns the handle registered at `id`, if any.
    pub fn lookup(&self, id: u8) -> Option<H> {
        self.slots.get(usize::from(id)).copied().flatten()
    }

    /// Iterates over occupied slots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, H)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.map(|handle| (id as u8, handle)))
    }
}

impl<H: Copy, const N: usize> Default for Registry<H, N> {
    fn default() -> Self {
        Self::new()
    }
}

use std::collections::{BTreeMap, BTreeSet};

use dk_core::{ActorId, FactionId, Structure};

/// Observable counters of one faction.
///
/// Membership is kept by the orchestrator as actors are added and retired;
/// everything else is reported by outer layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactionCounters {
    members: BTreeSet<ActorId>,
    /// Members killed by another faction.
    pub victims: u32,
    /// Total value stolen from this faction.
    pub stolen_value: u64,
    /// Gold currently held.
    pub gold: u64,
    /// Completed structures by kind.
    pub structures: BTreeMap<Structure, u32>,
}

impl FactionCounters {
    /// Live members.
    pub fn population(&self) -> u32 {
        u32::try_from(self.members.len()).unwrap_or(u32::MAX)
    }

    /// Live members in id order.
    pub fn members(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.members.iter().copied()
    }

    /// Whether `actor` is a live member.
    pub fn is_member(&self, actor: ActorId) -> bool {
        self.members.contains(&actor)
    }

    /// Completed structures of `kind`.
    pub fn structures_of(&self, kind: Structure) -> u32 {
        self.structures.get(&kind).copied().unwrap_or(0)
    }
}

/// Counters of every faction.
#[derive(Debug, Clone, Default)]
pub struct CounterBook {
    factions: BTreeMap<FactionId, FactionCounters>,
}

impl CounterBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters of `faction`, if it was ever registered.
    pub fn get(&self, faction: FactionId) -> Option<&FactionCounters> {
        self.factions.get(&faction)
    }

    /// Counters of `faction`, created on first use.
    pub fn entry(&mut self, faction: FactionId) -> &mut FactionCounters {
        self.factions.entry(faction).or_default()
    }

    /// Live members of `faction`.
    pub fn population(&self, faction: FactionId) -> u32 {
        self.get(faction).map_or(0, FactionCounters::population)
    }

    pub(crate) fn join(&mut self, faction: FactionId, actor: ActorId) {
        self.entry(faction).members.insert(actor);
    }

    /// Remove `actor` from its faction. Returns the faction's remaining
    /// population when the actor was a member.
    pub(crate) fn leave(&mut self, faction: FactionId, actor: ActorId) -> Option<u32> {
        let counters = self.factions.get_mut(&faction)?;
        counters.members.remove(&actor).then(|| counters.population())
    }

    /// Every faction and its counters.
    pub fn iter(&self) -> impl Iterator<Item = (FactionId, &FactionCounters)> {
        self.factions.iter().map(|(&id, c)| (id, c))
    }
}

/// Read-only window handed to faction controls.
#[derive(Debug, Clone, Copy)]
pub struct CounterView<'a> {
    book: &'a CounterBook,
    leaders: &'a BTreeMap<FactionId, ActorId>,
}

impl<'a> CounterView<'a> {
    /// View over `book` with the given leader table.
    pub fn new(book: &'a CounterBook, leaders: &'a BTreeMap<FactionId, ActorId>) -> Self {
        Self { book, leaders }
    }

    /// Counters of `faction`.
    pub fn faction(&self, faction: FactionId) -> Option<&'a FactionCounters> {
        self.book.get(faction)
    }

    /// Live members of `faction`.
    pub fn population(&self, faction: FactionId) -> u32 {
        self.book.population(faction)
    }

    /// Leader of `faction`, if it has one and the leader still lives.
    pub fn leader(&self, faction: FactionId) -> Option<ActorId> {
        let leader = self.leaders.get(&faction).copied()?;
        self.faction(faction)
            .filter(|c| c.is_member(leader))
            .map(|_| leader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_drives_population() {
        let mut book = CounterBook::new();
        let f = FactionId(1);
        book.join(f, ActorId(1));
        book.join(f, ActorId(2));
        assert_eq!(book.population(f), 2);

        assert_eq!(book.leave(f, ActorId(1)), Some(1));
        assert_eq!(book.leave(f, ActorId(1)), None);
        assert_eq!(book.leave(FactionId(9), ActorId(2)), None);
        assert_eq!(book.population(FactionId(9)), 0);
    }

    #[test]
    fn view_hides_dead_leaders() {
        let mut book = CounterBook::new();
        let f = FactionId(1);
        book.join(f, ActorId(1));
        let mut leaders = BTreeMap::new();
        leaders.insert(f, ActorId(1));

        assert_eq!(CounterView::new(&book, &leaders).leader(f), Some(ActorId(1)));
        book.leave(f, ActorId(1));
        assert_eq!(CounterView::new(&book, &leaders).leader(f), None);
    }

    #[test]
    fn structure_counts_default_to_zero() {
        let mut book = CounterBook::new();
        *book.entry(FactionId(0)).structures.entry(Structure::Throne).or_default() += 1;
        let c = book.get(FactionId(0)).unwrap();
        assert_eq!(c.structures_of(Structure::Throne), 1);
        assert_eq!(c.structures_of(Structure::Pigsty), 0);
    }
}

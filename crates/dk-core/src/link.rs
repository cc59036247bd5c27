use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::id::AreaId;

/// Which way a passage leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkDirection {
    /// Towards the surface.
    Up,
    /// Away from the surface.
    Down,
}

impl LinkDirection {
    /// The direction a traveller uses to come back the same way.
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

impl fmt::Display for LinkDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// Name shared by the two ends of one passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkKey(pub u32);

impl LinkKey {
    /// Reserved key of the point where the player faction is landed.
    pub const SPAWN: LinkKey = LinkKey(0);
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::SPAWN {
            write!(f, "key:spawn")
        } else {
            write!(f, "key:{}", self.0)
        }
    }
}

/// Issues fresh passage keys for one world build. Never returns
/// [`LinkKey::SPAWN`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkKeyAllocator {
    next: u32,
}

impl Default for LinkKeyAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl LinkKeyAllocator {
    /// Create an allocator whose first key is `key:1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a key that has never been issued by this allocator.
    pub fn fresh(&mut self) -> LinkKey {
        let key = LinkKey(self.next);
        self.next += 1;
        key
    }
}

/// One directed entry of the link graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    /// Direction of travel from `from`.
    pub direction: LinkDirection,
    /// Key naming the passage.
    pub key: LinkKey,
    /// Area the traveller leaves.
    pub from: AreaId,
    /// Area the traveller reaches.
    pub to: AreaId,
}

/// Directed mapping from `(direction, key, source area)` to destination area.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<LinkEntry>", from = "Vec<LinkEntry>")]
pub struct LinkGraph {
    links: BTreeMap<(LinkDirection, LinkKey, AreaId), AreaId>,
}

impl LinkGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a two-way passage: travelling `direction` from `from` reaches
    /// `to`, and travelling the opposite direction from `to` with the same key
    /// reaches `from`.
    ///
    /// Fails with [`CoreError::DuplicateLink`] if either end is already
    /// registered; in that case the graph is left unchanged.
    pub fn connect(
        &mut self,
        direction: LinkDirection,
        key: LinkKey,
        from: AreaId,
        to: AreaId,
    ) -> CoreResult<()> {
        self.ensure_free(direction, key, from)?;
        self.ensure_free(direction.opposite(), key, to)?;
        self.links.insert((direction, key, from), to);
        self.links.insert((direction.opposite(), key, to), from);
        Ok(())
    }

    /// Register a passage that can only be travelled one way.
    pub fn connect_one_way(
        &mut self,
        direction: LinkDirection,
        key: LinkKey,
        from: AreaId,
        to: AreaId,
    ) -> CoreResult<()> {
        self.ensure_free(direction, key, from)?;
        self.links.insert((direction, key, from), to);
        Ok(())
    }

    /// Destination reached by travelling `direction` through `key` from `area`.
    pub fn resolve(&self, direction: LinkDirection, key: LinkKey, area: AreaId) -> CoreResult<AreaId> {
        self.links
            .get(&(direction, key, area))
            .copied()
            .ok_or(CoreError::UnlinkedPassage {
                direction,
                key,
                area,
            })
    }

    /// Whether `(direction, key, area)` has a destination.
    pub fn contains(&self, direction: LinkDirection, key: LinkKey, area: AreaId) -> bool {
        self.links.contains_key(&(direction, key, area))
    }

    /// All entries leaving `area`, in key order.
    pub fn exits(&self, area: AreaId) -> Vec<LinkEntry> {
        self.entries().filter(|e| e.from == area).collect()
    }

    /// Every directed entry, in `(direction, key, area)` order.
    pub fn entries(&self) -> impl Iterator<Item = LinkEntry> + '_ {
        self.links
            .iter()
            .map(|(&(direction, key, from), &to)| LinkEntry {
                direction,
                key,
                from,
                to,
            })
    }

    /// Number of directed entries.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if no passage has been registered.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    fn ensure_free(&self, direction: LinkDirection, key: LinkKey, area: AreaId) -> CoreResult<()> {
        if self.links.contains_key(&(direction, key, area)) {
            return Err(CoreError::DuplicateLink {
                direction,
                key,
                area,
            });
        }
        Ok(())
    }
}

impl From<LinkGraph> for Vec<LinkEntry> {
    fn from(graph: LinkGraph) -> Self {
        graph.entries().collect()
    }
}

impl From<Vec<LinkEntry>> for LinkGraph {
    fn from(entries: Vec<LinkEntry>) -> Self {
        Self {
            links: entries
                .into_iter()
                .map(|e| ((e.direction, e.key, e.from), e.to))
                .collect(),
        }
    }
}

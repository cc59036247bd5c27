use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::id::{ActorId, AreaId, FactionId};
use crate::link::{LinkDirection, LinkKey};

/// A cell coordinate inside an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Position,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    pub fn new(origin: Position, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Whether `pos` lies inside the rectangle.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.origin.x
            && pos.y >= self.origin.y
            && i64::from(pos.x) < i64::from(self.origin.x) + i64::from(self.width)
            && i64::from(pos.y) < i64::from(self.origin.y) + i64::from(self.height)
    }

    /// Whether the two rectangles share at least one cell.
    pub fn overlaps(&self, other: &Rect) -> bool {
        let (ax0, ay0) = (i64::from(self.origin.x), i64::from(self.origin.y));
        let (bx0, by0) = (i64::from(other.origin.x), i64::from(other.origin.y));
        let (ax1, ay1) = (ax0 + i64::from(self.width), ay0 + i64::from(self.height));
        let (bx1, by1) = (bx0 + i64::from(other.width), by0 + i64::from(other.height));
        ax0 < bx1 && bx0 < ax1 && ay0 < by1 && by0 < ay1
    }

    /// Cell at the centre of the rectangle.
    pub fn center(&self) -> Position {
        Position::new(
            self.origin.x + (self.width / 2) as i32,
            self.origin.y + (self.height / 2) as i32,
        )
    }

    /// Every cell of the rectangle in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height as i32).flat_map(move |dy| {
            (0..self.width as i32).map(move |dx| Position::new(self.origin.x + dx, self.origin.y + dy))
        })
    }

    /// Number of cells.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Static terrain of a cell, written by the area builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    /// Walkable ground.
    #[default]
    Floor,
    /// Solid rock or building wall.
    Wall,
    /// Open water.
    Water,
}

impl Terrain {
    /// Whether actors may stand on this terrain.
    pub fn is_passable(self) -> bool {
        matches!(self, Self::Floor)
    }
}

/// A named stair-like point through which actors change area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Direction of travel when taking this passage.
    pub direction: LinkDirection,
    /// Key shared with the passage's other end.
    pub key: LinkKey,
    /// Cell of the passage.
    pub position: Position,
}

/// A point where newcomers are landed, e.g. the keeper's arrival spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Key naming the point.
    pub key: LinkKey,
    /// Cell of the point.
    pub position: Position,
}

/// The footprint a faction received from the area builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    /// Owning faction.
    pub faction: FactionId,
    /// Cells belonging to the territory.
    pub bounds: Rect,
}

/// One spatial partition of the world: a bounded grid, its residents, its
/// link points, and the territories laid out on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    id: AreaId,
    label: String,
    width: u32,
    height: u32,
    terrain: Vec<Terrain>,
    occupants: Vec<Option<ActorId>>,
    residents: BTreeMap<ActorId, Position>,
    passages: Vec<Passage>,
    spawn_points: Vec<SpawnPoint>,
    territories: Vec<Territory>,
}

impl Area {
    /// Create an all-floor area of the given size.
    pub fn new(id: AreaId, label: impl Into<String>, width: u32, height: u32) -> Self {
        let cells = width as usize * height as usize;
        Self {
            id,
            label: label.into(),
            width,
            height,
            terrain: vec![Terrain::Floor; cells],
            occupants: vec![None; cells],
            residents: BTreeMap::new(),
            passages: Vec::new(),
            spawn_points: Vec::new(),
            territories: Vec::new(),
        }
    }

    /// Registry id of this area.
    pub fn id(&self) -> AreaId {
        self.id
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The whole grid as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(Position::new(0, 0), self.width, self.height)
    }

    /// Whether `pos` is on the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        self.bounds().contains(pos)
    }

    fn index(&self, pos: Position) -> CoreResult<usize> {
        if !self.in_bounds(pos) {
            return Err(CoreError::OutOfBounds {
                area: self.id,
                position: pos,
            });
        }
        Ok(pos.y as usize * self.width as usize + pos.x as usize)
    }

    // -----------------------------------------------------------------------
    // Terrain
    // -----------------------------------------------------------------------

    /// Terrain at `pos`, or `None` off the grid.
    pub fn terrain(&self, pos: Position) -> Option<Terrain> {
        self.index(pos).ok().map(|i| self.terrain[i])
    }

    /// Overwrite the terrain at `pos`.
    pub fn set_terrain(&mut self, pos: Position, terrain: Terrain) -> CoreResult<()> {
        let i = self.index(pos)?;
        self.terrain[i] = terrain;
        Ok(())
    }

    /// Whether an actor could be placed at `pos` right now.
    pub fn is_free(&self, pos: Position) -> bool {
        match self.index(pos) {
            Ok(i) => self.terrain[i].is_passable() && self.occupants[i].is_none(),
            Err(_) => false,
        }
    }

    // -----------------------------------------------------------------------
    // Residents
    // -----------------------------------------------------------------------

    /// Actor standing at `pos`, if any.
    pub fn occupant(&self, pos: Position) -> Option<ActorId> {
        self.index(pos).ok().and_then(|i| self.occupants[i])
    }

    /// Where `actor` stands, if it lives here.
    pub fn position_of(&self, actor: ActorId) -> Option<Position> {
        self.residents.get(&actor).copied()
    }

    /// Whether `actor` lives here.
    pub fn contains(&self, actor: ActorId) -> bool {
        self.residents.contains_key(&actor)
    }

    /// Residents in id order.
    pub fn residents(&self) -> impl Iterator<Item = (ActorId, Position)> + '_ {
        self.residents.iter().map(|(&id, &pos)| (id, pos))
    }

    /// Number of residents.
    pub fn population(&self) -> usize {
        self.residents.len()
    }

    /// Place `actor` at `pos`. Fails without side effects if the actor
    /// already lives here or the cell cannot take it.
    pub fn insert_actor(&mut self, actor: ActorId, pos: Position) -> CoreResult<()> {
        if self.residents.contains_key(&actor) {
            return Err(CoreError::AlreadyResident {
                actor,
                area: self.id,
            });
        }
        let i = self.index(pos)?;
        if let Some(occupant) = self.occupants[i] {
            return Err(CoreError::CellOccupied {
                area: self.id,
                position: pos,
                occupant,
            });
        }
        if !self.terrain[i].is_passable() {
            return Err(CoreError::CellBlocked {
                area: self.id,
                position: pos,
            });
        }
        self.occupants[i] = Some(actor);
        self.residents.insert(actor, pos);
        Ok(())
    }

    /// Take `actor` off the grid, returning the cell it stood on.
    pub fn remove_actor(&mut self, actor: ActorId) -> CoreResult<Position> {
        let pos = self.residents.remove(&actor).ok_or(CoreError::NotResident {
            actor,
            area: self.id,
        })?;
        let i = self.index(pos)?;
        self.occupants[i] = None;
        Ok(pos)
    }

    /// Move a resident to another cell of this area.
    pub fn move_actor(&mut self, actor: ActorId, to: Position) -> CoreResult<()> {
        let from = self.position_of(actor).ok_or(CoreError::NotResident {
            actor,
            area: self.id,
        })?;
        if from == to {
            return Ok(());
        }
        if !self.is_free(to) {
            let i = self.index(to)?;
            return Err(match self.occupants[i] {
                Some(occupant) => CoreError::CellOccupied {
                    area: self.id,
                    position: to,
                    occupant,
                },
                None => CoreError::CellBlocked {
                    area: self.id,
                    position: to,
                },
            });
        }
        self.remove_actor(actor)?;
        self.insert_actor(actor, to)
    }

    /// Nearest free cell to `center`, searching outward ring by ring in a
    /// fixed order so the result is reproducible.
    pub fn landing_spot(&self, center: Position) -> CoreResult<Position> {
        let max_radius = self.width.max(self.height) as i32;
        for radius in 0..=max_radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    let pos = Position::new(center.x + dx, center.y + dy);
                    if self.is_free(pos) {
                        return Ok(pos);
                    }
                }
            }
        }
        Err(CoreError::NoLandingSpot {
            area: self.id,
            position: center,
        })
    }

    /// Free cells inside `rect`, row-major.
    pub fn free_cells_in(&self, rect: Rect) -> Vec<Position> {
        rect.cells().filter(|&p| self.is_free(p)).collect()
    }

    // -----------------------------------------------------------------------
    // Link points
    // -----------------------------------------------------------------------

    /// Add a passage end at `pos`.
    pub fn add_passage(
        &mut self,
        direction: LinkDirection,
        key: LinkKey,
        pos: Position,
    ) -> CoreResult<()> {
        self.index(pos)?;
        self.passages.push(Passage {
            direction,
            key,
            position: pos,
        });
        Ok(())
    }

    /// Cell of the passage `(direction, key)`.
    pub fn passage(&self, direction: LinkDirection, key: LinkKey) -> Option<Position> {
        self.passages
            .iter()
            .find(|p| p.direction == direction && p.key == key)
            .map(|p| p.position)
    }

    /// All passage ends in this area.
    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    /// Add a spawn point at `pos`.
    pub fn add_spawn_point(&mut self, key: LinkKey, pos: Position) -> CoreResult<()> {
        self.index(pos)?;
        self.spawn_points.push(SpawnPoint { key, position: pos });
        Ok(())
    }

    /// Cell of the spawn point named `key`.
    pub fn spawn_point(&self, key: LinkKey) -> Option<Position> {
        self.spawn_points
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.position)
    }

    // -----------------------------------------------------------------------
    // Territories
    // -----------------------------------------------------------------------

    /// Record a faction footprint.
    pub fn add_territory(&mut self, territory: Territory) {
        self.territories.push(territory);
    }

    /// Every footprint laid out on this area.
    pub fn territories(&self) -> &[Territory] {
        &self.territories
    }

    /// Footprint owned by `faction`, if any.
    pub fn territory_of(&self, faction: FactionId) -> Option<&Territory> {
        self.territories.iter().find(|t| t.faction == faction)
    }
}

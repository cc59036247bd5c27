//! Area layout: the request handed to an area builder and a reference
//! builder that packs territory rectangles onto an open grid.

use std::fmt;

use dk_core::faction::SettlementKind;
use dk_core::{
    Area, AreaId, FactionId, FactionSpec, LinkDirection, LinkKey, Position, Rect, Territory,
};
use rand::Rng;
use rand::rngs::StdRng;

use crate::error::LayoutError;

/// Footprint one faction needs inside an area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerritoryRequest {
    /// Owner of the footprint.
    pub faction: FactionId,
    /// Settlement layout asked for.
    pub kind: SettlementKind,
    /// Inhabitants that must fit.
    pub population: u32,
    /// Descending passages to place inside.
    pub down_links: Vec<LinkKey>,
    /// Ascending passages to place inside.
    pub up_links: Vec<LinkKey>,
}

impl TerritoryRequest {
    /// The footprint of a faction's settlement, if it has one.
    pub fn for_faction(spec: &FactionSpec) -> Option<Self> {
        let settlement = spec.settlement.as_ref()?;
        Some(Self {
            faction: spec.id,
            kind: settlement.kind,
            population: settlement.count,
            down_links: settlement.down_links.clone(),
            up_links: settlement.up_links.clone(),
        })
    }

    /// Side of the square footprint: the settlement's base size grown with
    /// the square root of its population.
    pub fn side(&self) -> u32 {
        self.kind.base_size() + 2 * self.population.isqrt()
    }
}

/// Everything an area builder is told about one area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaRequest {
    /// Id the built area must carry.
    pub id: AreaId,
    /// Label of the area.
    pub label: String,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Footprints to lay out, in placement order.
    pub territories: Vec<TerritoryRequest>,
    /// Spawn point to place on free wilderness.
    pub spawn_point: Option<LinkKey>,
}

impl AreaRequest {
    /// An empty area request.
    pub fn new(id: AreaId, label: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            label: label.into(),
            width,
            height,
            territories: Vec::new(),
            spawn_point: None,
        }
    }

    /// Add a footprint.
    pub fn with_territory(mut self, territory: TerritoryRequest) -> Self {
        self.territories.push(territory);
        self
    }

    /// Ask for a spawn point named `key`.
    pub fn with_spawn_point(mut self, key: LinkKey) -> Self {
        self.spawn_point = Some(key);
        self
    }
}

/// Lays out areas for the generation pipeline.
///
/// A builder must return an area with the requested id and size, one
/// [`Territory`] per requested footprint, every requested passage inside its
/// faction's footprint, and the spawn point outside all footprints.
pub trait AreaBuilder: fmt::Debug {
    /// Build the area described by `request`, drawing randomness from `rng`.
    fn build(&mut self, request: &AreaRequest, rng: &mut StdRng) -> Result<Area, LayoutError>;
}

/// Reference builder: an open grid with square footprints placed at random
/// positions that keep a margin from each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RectPackingBuilder {
    tries: u32,
    margin: u32,
}

impl Default for RectPackingBuilder {
    fn default() -> Self {
        Self {
            tries: 200,
            margin: 2,
        }
    }
}

impl RectPackingBuilder {
    /// A builder with the default try budget and margin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Random positions tried per footprint before giving up.
    pub fn with_tries(mut self, tries: u32) -> Self {
        self.tries = tries.max(1);
        self
    }

    /// Empty cells kept between footprints.
    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    fn padded(&self, rect: Rect) -> Rect {
        let m = self.margin as i32;
        Rect::new(
            Position::new(rect.origin.x - m, rect.origin.y - m),
            rect.width + 2 * self.margin,
            rect.height + 2 * self.margin,
        )
    }

    fn place(
        &self,
        request: &AreaRequest,
        territory: &TerritoryRequest,
        placed: &[Rect],
        rng: &mut StdRng,
    ) -> Result<Rect, LayoutError> {
        let exhausted = || LayoutError::Exhausted {
            label: request.label.clone(),
            faction: territory.faction,
        };
        let side = territory.side();
        if side > request.width || side > request.height {
            return Err(exhausted());
        }
        for _ in 0..self.tries {
            let x = rng.random_range(0..=request.width - side) as i32;
            let y = rng.random_range(0..=request.height - side) as i32;
            let rect = Rect::new(Position::new(x, y), side, side);
            let padded = self.padded(rect);
            if !placed.iter().any(|other| padded.overlaps(other)) {
                return Ok(rect);
            }
        }
        Err(exhausted())
    }

    fn place_spawn(
        &self,
        request: &AreaRequest,
        placed: &[Rect],
        rng: &mut StdRng,
    ) -> Result<Position, LayoutError> {
        for _ in 0..self.tries {
            let pos = Position::new(
                rng.random_range(0..request.width) as i32,
                rng.random_range(0..request.height) as i32,
            );
            if !placed.iter().any(|r| self.padded(*r).contains(pos)) {
                return Ok(pos);
            }
        }
        Err(LayoutError::NoSpawnRoom {
            label: request.label.clone(),
        })
    }
}

impl AreaBuilder for RectPackingBuilder {
    fn build(&mut self, request: &AreaRequest, rng: &mut StdRng) -> Result<Area, LayoutError> {
        let mut area = Area::new(request.id, request.label.clone(), request.width, request.height);
        let mut placed = Vec::with_capacity(request.territories.len());

        for territory in &request.territories {
            let bounds = self.place(request, territory, &placed, rng)?;
            placed.push(bounds);
            area.add_territory(Territory {
                faction: territory.faction,
                bounds,
            });

            // Passages along the centre row, one cell apart.
            let center = bounds.center();
            let links = territory
                .down_links
                .iter()
                .map(|&k| (LinkDirection::Down, k))
                .chain(territory.up_links.iter().map(|&k| (LinkDirection::Up, k)));
            for (i, (direction, key)) in links.enumerate() {
                let pos = Position::new(center.x + 2 * i as i32, center.y);
                if !bounds.contains(pos) {
                    return Err(LayoutError::Exhausted {
                        label: request.label.clone(),
                        faction: territory.faction,
                    });
                }
                area.add_passage(direction, key, pos)?;
            }
        }

        if let Some(key) = request.spawn_point {
            let pos = self.place_spawn(request, &placed, rng)?;
            area.add_spawn_point(key, pos)?;
        }
        Ok(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn territory(faction: u32, kind: SettlementKind, population: u32) -> TerritoryRequest {
        TerritoryRequest {
            faction: FactionId(faction),
            kind,
            population,
            down_links: Vec::new(),
            up_links: Vec::new(),
        }
    }

    #[test]
    fn footprint_grows_with_population() {
        assert_eq!(territory(0, SettlementKind::Cottage, 4).side(), 10);
        assert_eq!(territory(0, SettlementKind::Castle, 25).side(), 28);
        assert_eq!(territory(0, SettlementKind::IslandVault, 0).side(), 8);
    }

    #[test]
    fn territories_do_not_overlap() {
        let mut request = AreaRequest::new(AreaId(0), "Top level", 120, 120)
            .with_spawn_point(LinkKey::SPAWN);
        for i in 0..10 {
            request = request.with_territory(territory(i, SettlementKind::Cottage, 5));
        }
        let mut rng = StdRng::seed_from_u64(3);
        let area = RectPackingBuilder::new().build(&request, &mut rng).unwrap();

        let rects: Vec<Rect> = area.territories().iter().map(|t| t.bounds).collect();
        assert_eq!(rects.len(), 10);
        for (i, a) in rects.iter().enumerate() {
            assert!(area.bounds().contains(a.origin));
            for b in &rects[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
        let spawn = area.spawn_point(LinkKey::SPAWN).unwrap();
        assert!(rects.iter().all(|r| !r.contains(spawn)));
    }

    #[test]
    fn passages_land_inside_their_footprint() {
        let mut town = territory(4, SettlementKind::SmallMinetown, 5);
        town.down_links.push(LinkKey(7));
        let mut mines = territory(5, SettlementKind::Minetown, 12);
        mines.up_links.push(LinkKey(7));
        let request = AreaRequest::new(AreaId(2), "Mixed", 80, 60)
            .with_territory(town)
            .with_territory(mines);

        let mut rng = StdRng::seed_from_u64(1);
        let area = RectPackingBuilder::new().build(&request, &mut rng).unwrap();
        let down = area.passage(LinkDirection::Down, LinkKey(7)).unwrap();
        let up = area.passage(LinkDirection::Up, LinkKey(7)).unwrap();
        assert!(area.territory_of(FactionId(4)).unwrap().bounds.contains(down));
        assert!(area.territory_of(FactionId(5)).unwrap().bounds.contains(up));
    }

    #[test]
    fn crowded_area_is_exhausted() {
        let request = AreaRequest::new(AreaId(0), "Closet", 30, 30)
            .with_territory(territory(0, SettlementKind::Castle, 20))
            .with_territory(territory(1, SettlementKind::Castle, 20));
        let mut rng = StdRng::seed_from_u64(0);
        let err = RectPackingBuilder::new()
            .with_tries(20)
            .build(&request, &mut rng)
            .unwrap_err();
        assert!(matches!(err, LayoutError::Exhausted { faction, .. } if faction == FactionId(1)));
    }

    #[test]
    fn footprint_larger_than_area_fails_at_once() {
        let request = AreaRequest::new(AreaId(0), "Tiny", 5, 5)
            .with_territory(territory(0, SettlementKind::Cottage, 1));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(RectPackingBuilder::new().build(&request, &mut rng).is_err());
    }

    #[test]
    fn same_seed_same_layout() {
        let request = AreaRequest::new(AreaId(0), "Top level", 100, 100)
            .with_territory(territory(0, SettlementKind::Village, 10))
            .with_territory(territory(1, SettlementKind::Cave, 1))
            .with_spawn_point(LinkKey::SPAWN);
        let build = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let area = RectPackingBuilder::new().build(&request, &mut rng).unwrap();
            (area.territories().to_vec(), area.spawn_point(LinkKey::SPAWN))
        };
        assert_eq!(build(8), build(8));
    }
}

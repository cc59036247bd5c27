use std::collections::BTreeMap;

use dk_core::{
    Actor, ActorId, ActorStatus, Area, AreaId, CoreError, CreatureKind, FactionId, FactionSpec,
    IdAllocator, LinkDirection, LinkGraph, LinkKey, Location, Position, SimTime, Structure,
};
use tracing::{debug, info};

use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::control::{Announcement, ControlRequest, FactionControl};
use crate::counters::{CounterBook, CounterView};
use crate::decision::{ActorView, Decision, DecisionProcess, TransferRequest};
use crate::error::{SimError, SimResult};
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::queue::{QueueError, TurnQueue};
use crate::roster::{PlayerFaction, Roster, SessionEvent, SessionStatus};

/// What a single [`Orchestrator::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The actor took its turn.
    Acted {
        /// Who acted.
        actor: ActorId,
        /// Simulated time that passed before the turn.
        elapsed: u64,
    },
    /// The popped actor no longer lived in any area and was dropped.
    Skipped {
        /// Who was dropped.
        actor: ActorId,
    },
    /// Nobody is scheduled.
    QueueEmpty,
}

/// The simulation model.
///
/// Owns every area, the link graph, the turn queue and the faction roster.
/// All actor and area mutations go through it: an actor is either resident in
/// exactly one area or in the retired pool, and moving between areas is a
/// remove-then-insert that no other operation can observe half done.
pub struct Orchestrator {
    config: SimConfig,
    clock: SimClock,
    areas: Vec<Area>,
    links: LinkGraph,
    queue: TurnQueue,
    actors: BTreeMap<ActorId, Actor>,
    retired: BTreeMap<ActorId, Actor>,
    roster: Roster,
    controls: Vec<Box<dyn FactionControl>>,
    counters: CounterBook,
    events: EventLog,
    session: Vec<SessionEvent>,
    ids: IdAllocator,
    last_control_run: SimTime,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("now", &self.clock.now())
            .field("areas", &self.areas.len())
            .field("actors", &self.actors.len())
            .field("retired", &self.retired.len())
            .field("factions", &self.roster.len())
            .field("controls", &self.controls.len())
            .finish()
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Orchestrator {
    /// Create an empty model.
    pub fn new(config: SimConfig) -> Self {
        let events = EventLog::new(config.max_events);
        Self {
            config,
            clock: SimClock::new(),
            areas: Vec::new(),
            links: LinkGraph::new(),
            queue: TurnQueue::new(),
            actors: BTreeMap::new(),
            retired: BTreeMap::new(),
            roster: Roster::new(),
            controls: Vec::new(),
            counters: CounterBook::new(),
            events,
            session: Vec::new(),
            ids: IdAllocator::new(),
            last_control_run: SimTime::ZERO,
        }
    }

    // -----------------------------------------------------------------------
    // Areas and links
    // -----------------------------------------------------------------------

    /// Id the next registered area must carry.
    pub fn next_area_id(&self) -> AreaId {
        AreaId(u32::try_from(self.areas.len()).unwrap_or(u32::MAX))
    }

    /// Register an area built for [`Orchestrator::next_area_id`].
    pub fn add_area(&mut self, area: Area) -> SimResult<AreaId> {
        let expected = self.next_area_id();
        if area.id() != expected {
            return Err(SimError::AreaIdMismatch {
                expected,
                got: area.id(),
            });
        }
        debug!(area = %expected, label = area.label(), "area registered");
        self.areas.push(area);
        Ok(expected)
    }

    /// Area by id.
    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.areas.get(id.index())
    }

    /// Every area in id order.
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    fn area_mut(&mut self, id: AreaId) -> SimResult<&mut Area> {
        self.areas.get_mut(id.index()).ok_or(SimError::AreaNotFound(id))
    }

    /// Link two registered areas with a two-way passage.
    pub fn connect(
        &mut self,
        direction: LinkDirection,
        key: LinkKey,
        from: AreaId,
        to: AreaId,
    ) -> SimResult<()> {
        for id in [from, to] {
            if self.area(id).is_none() {
                return Err(SimError::AreaNotFound(id));
            }
        }
        self.links.connect(direction, key, from, to)?;
        debug!(%direction, %key, %from, %to, "areas linked");
        Ok(())
    }

    /// The link graph.
    pub fn links(&self) -> &LinkGraph {
        &self.links
    }

    // -----------------------------------------------------------------------
    // Factions
    // -----------------------------------------------------------------------

    /// A fresh actor id.
    pub fn allocate_actor_id(&mut self) -> ActorId {
        self.ids.actor()
    }

    /// A fresh faction id.
    pub fn allocate_faction_id(&mut self) -> FactionId {
        self.ids.faction()
    }

    /// Register a faction and, for non-player factions, its control.
    pub fn add_faction(
        &mut self,
        spec: FactionSpec,
        control: Option<Box<dyn FactionControl>>,
    ) -> SimResult<FactionId> {
        let id = spec.id;
        if self.roster.spec(id).is_some() {
            return Err(SimError::DuplicateFaction(id));
        }
        debug!(faction = %id, name = spec.name(), "faction registered");
        self.roster.insert(spec);
        self.counters.entry(id);
        if let Some(control) = control {
            self.controls.push(control);
        }
        Ok(id)
    }

    /// Declare the player faction and its leader.
    pub fn set_player(&mut self, faction: FactionId, leader: ActorId) -> SimResult<()> {
        self.ensure_member(faction, leader)?;
        self.roster.set_player(PlayerFaction { faction, leader });
        Ok(())
    }

    /// Declare the leader of a non-player faction.
    pub fn set_faction_leader(&mut self, faction: FactionId, leader: ActorId) -> SimResult<()> {
        self.ensure_member(faction, leader)?;
        self.roster.set_leader(faction, leader);
        Ok(())
    }

    fn ensure_member(&self, faction: FactionId, actor: ActorId) -> SimResult<()> {
        match self.actors.get(&actor) {
            Some(a) if a.faction == faction => Ok(()),
            Some(_) => Err(SimError::ForeignActor { faction, actor }),
            None if self.retired.contains_key(&actor) => Err(SimError::ActorRetired(actor)),
            None => Err(SimError::ActorNotFound(actor)),
        }
    }

    /// The faction roster.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Counters of every faction.
    pub fn counters(&self) -> &CounterBook {
        &self.counters
    }

    /// Live members of `faction`.
    pub fn population(&self, faction: FactionId) -> u32 {
        self.counters.population(faction)
    }

    /// Population cap of `faction` given the structures it has completed.
    pub fn population_cap(&self, faction: FactionId) -> Option<u32> {
        let spec = self.roster.spec(faction)?;
        let built = self
            .counters
            .get(faction)
            .map(|c| c.structures.clone())
            .unwrap_or_default();
        Some(spec.immigration.population_cap_with(&built))
    }

    /// Control of `faction`, downcast to a concrete type.
    pub fn control<T: FactionControl + 'static>(&self, faction: FactionId) -> Option<&T> {
        self.controls
            .iter()
            .filter(|c| c.faction() == faction)
            .find_map(|c| c.as_any().downcast_ref::<T>())
    }

    // -----------------------------------------------------------------------
    // Actors
    // -----------------------------------------------------------------------

    /// Place a located actor and give it a turn at its next-action time
    /// (or now, if that has passed).
    pub fn add_actor(&mut self, mut actor: Actor) -> SimResult<ActorId> {
        let id = actor.id;
        if self.actors.contains_key(&id) || self.retired.contains_key(&id) {
            return Err(SimError::DuplicateActor(id));
        }
        if !actor.is_alive() {
            return Err(SimError::ActorRetired(id));
        }
        let location = actor.location.ok_or(SimError::Unplaced(id))?;
        self.area_mut(location.area)?
            .insert_actor(id, location.position)?;

        let now = self.clock.now();
        if actor.next_action < now {
            actor.next_action = now;
        }
        self.queue.schedule(id, actor.next_action);
        self.counters.join(actor.faction, id);
        self.emit(
            SimEventKind::ActorAdded {
                actor: id,
                area: location.area,
            },
            format!("{} appears in {}", actor.name, location.area),
        );
        debug!(actor = %id, kind = %actor.kind, area = %location.area, "actor added");
        self.actors.insert(id, actor);
        Ok(id)
    }

    /// Create an actor of `kind` for `faction` at an exact location.
    pub fn spawn_actor(
        &mut self,
        kind: CreatureKind,
        faction: FactionId,
        location: Location,
    ) -> SimResult<ActorId> {
        let id = self.allocate_actor_id();
        let mut actor = Actor::new(id, kind, faction);
        actor.location = Some(location);
        self.add_actor(actor)
    }

    /// Add `actor` on the free cell nearest to the spawn point `key` of `area`.
    pub fn land_actor(&mut self, actor: Actor, area: AreaId, key: LinkKey) -> SimResult<ActorId> {
        let target = self.area(area).ok_or(SimError::AreaNotFound(area))?;
        let spawn = target
            .spawn_point(key)
            .ok_or(CoreError::MissingSpawnPoint { area, key })?;
        self.land_near(actor, area, spawn)
    }

    /// Add `actor` on the free cell nearest to `position` in `area`.
    pub fn land_near(&mut self, mut actor: Actor, area: AreaId, position: Position) -> SimResult<ActorId> {
        let target = self.area(area).ok_or(SimError::AreaNotFound(area))?;
        let position = target.landing_spot(position)?;
        actor.location = Some(Location { area, position });
        self.add_actor(actor)
    }

    /// A live or retired actor.
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id).or_else(|| self.retired.get(&id))
    }

    /// Live actors in id order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Retired actors in id order.
    pub fn retired(&self) -> impl Iterator<Item = &Actor> {
        self.retired.values()
    }

    /// Whether `id` is in the retired pool.
    pub fn is_retired(&self, id: ActorId) -> bool {
        self.retired.contains_key(&id)
    }

    fn live_actor(&self, id: ActorId) -> SimResult<&Actor> {
        match self.actors.get(&id) {
            Some(actor) => Ok(actor),
            None if self.retired.contains_key(&id) => Err(SimError::ActorRetired(id)),
            None => Err(SimError::ActorNotFound(id)),
        }
    }

    // -----------------------------------------------------------------------
    // Transfers
    // -----------------------------------------------------------------------

    /// Move an actor through the passage `(direction, key)` of its area.
    ///
    /// The actor lands on the free cell nearest to the matching passage end
    /// of the destination. Everything is checked before the actor is lifted,
    /// so a failed transfer leaves it where it was.
    pub fn transfer_via(
        &mut self,
        id: ActorId,
        direction: LinkDirection,
        key: LinkKey,
    ) -> SimResult<Position> {
        let from = self.live_actor(id)?.location.ok_or(SimError::Unplaced(id))?;
        let to = self.links.resolve(direction, key, from.area)?;
        let destination = self.area(to).ok_or(SimError::AreaNotFound(to))?;
        let entry = destination
            .passage(direction.opposite(), key)
            .ok_or(CoreError::MissingLinkPoint {
                area: to,
                direction: direction.opposite(),
                key,
            })?;
        let landing = destination.landing_spot(entry)?;
        self.relocate(id, from, Location { area: to, position: landing })?;
        Ok(landing)
    }

    /// Move an actor to an exact cell, in its own area or another one.
    ///
    /// A move inside the actor's area is logged as [`SimEventKind::Moved`],
    /// a move to another area as [`SimEventKind::Transferred`].
    pub fn transfer_to(&mut self, id: ActorId, area: AreaId, position: Position) -> SimResult<()> {
        let from = self.live_actor(id)?.location.ok_or(SimError::Unplaced(id))?;
        if from.area == area {
            if from.position == position {
                return Ok(());
            }
            self.area_mut(area)?.move_actor(id, position)?;
            let name = match self.actors.get_mut(&id) {
                Some(actor) => {
                    actor.location = Some(Location { area, position });
                    actor.name.clone()
                }
                None => return Err(SimError::ActorNotFound(id)),
            };
            self.emit(
                SimEventKind::Moved { actor: id, area },
                format!("{name} moves from {} to {position} in {area}", from.position),
            );
            return Ok(());
        }
        let destination = self.area(area).ok_or(SimError::AreaNotFound(area))?;
        ensure_free(destination, position)?;
        self.relocate(id, from, Location { area, position })
    }

    fn relocate(&mut self, id: ActorId, from: Location, to: Location) -> SimResult<()> {
        self.area_mut(from.area)?.remove_actor(id)?;
        if let Err(e) = self.area_mut(to.area)?.insert_actor(id, to.position) {
            // Put it back; the source cell was just vacated.
            self.area_mut(from.area)?.insert_actor(id, from.position)?;
            return Err(e.into());
        }
        let name = match self.actors.get_mut(&id) {
            Some(actor) => {
                actor.location = Some(to);
                actor.name.clone()
            }
            None => return Err(SimError::ActorNotFound(id)),
        };
        self.emit(
            SimEventKind::Transferred {
                actor: id,
                from: from.area,
                to: to.area,
            },
            format!("{name} travels from {} to {}", from.area, to.area),
        );
        debug!(actor = %id, from = %from.area, to = %to.area, "actor transferred");
        Ok(())
    }

    fn apply_transfer(&mut self, id: ActorId, request: TransferRequest) -> SimResult<()> {
        match request {
            TransferRequest::Passage { direction, key } => {
                self.transfer_via(id, direction, key)?;
            }
            TransferRequest::Direct { area, position } => {
                self.transfer_to(id, area, position)?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Retirement and counters
    // -----------------------------------------------------------------------

    /// Remove an actor from its area and the queue and move it to the
    /// retired pool. Retiring an already retired actor does nothing and
    /// returns `false`.
    pub fn retire_actor(&mut self, id: ActorId, cause: &str) -> SimResult<bool> {
        if self.retired.contains_key(&id) {
            return Ok(false);
        }
        let location = self.live_actor(id)?.location;
        if let Some(location) = location {
            self.area_mut(location.area)?.remove_actor(id)?;
        }
        let Some(mut actor) = self.actors.remove(&id) else {
            return Err(SimError::ActorNotFound(id));
        };
        self.queue.remove(id);
        actor.status = ActorStatus::Retired;
        actor.location = None;
        let faction = actor.faction;
        self.emit(
            SimEventKind::ActorRetired {
                actor: id,
                cause: cause.to_string(),
            },
            format!("{} is gone: {cause}", actor.name),
        );
        debug!(actor = %id, cause, "actor retired");
        self.retired.insert(id, actor);

        let remaining = self.counters.leave(faction, id);
        if self.roster.is_leader(faction, id) {
            info!(%faction, actor = %id, "faction leader died");
            self.session.push(SessionEvent::LeaderDied { faction, actor: id });
            self.emit(
                SimEventKind::LeaderDied { faction, actor: id },
                format!("the leader of {faction} has died"),
            );
        }
        if remaining == Some(0) && self.roster.mark_eliminated(faction) {
            info!(%faction, "faction eliminated");
            self.session.push(SessionEvent::FactionEliminated { faction });
            self.emit(
                SimEventKind::FactionEliminated { faction },
                format!("{faction} has been eliminated"),
            );
        }
        Ok(true)
    }

    /// Retire `victim` as killed by `killer`. Counts a victim for the
    /// victim's faction when the killer belongs to another faction.
    pub fn record_kill(&mut self, victim: ActorId, killer: Option<ActorId>) -> SimResult<bool> {
        if self.retired.contains_key(&victim) {
            return Ok(false);
        }
        let faction = self.live_actor(victim)?.faction;
        let killer_faction = killer.and_then(|k| self.actor(k)).map(|k| k.faction);
        if killer_faction != Some(faction) {
            self.counters.entry(faction).victims += 1;
        }
        let cause = match killer {
            Some(k) => format!("killed by {k}"),
            None => "killed".to_string(),
        };
        self.retire_actor(victim, &cause)
    }

    /// Add `value` to the value stolen from `faction`.
    pub fn record_theft(&mut self, faction: FactionId, value: u64) {
        let counters = self.counters.entry(faction);
        counters.stolen_value = counters.stolen_value.saturating_add(value);
    }

    /// Count one more completed `structure` for `faction`.
    pub fn record_structure(&mut self, faction: FactionId, structure: Structure) {
        *self
            .counters
            .entry(faction)
            .structures
            .entry(structure)
            .or_default() += 1;
    }

    /// Set the gold `faction` holds.
    pub fn set_gold(&mut self, faction: FactionId, gold: u64) {
        self.counters.entry(faction).gold = gold;
    }

    // -----------------------------------------------------------------------
    // Scheduling and stepping
    // -----------------------------------------------------------------------

    /// Give a live actor its next turn at `time`, replacing any earlier one.
    pub fn schedule(&mut self, id: ActorId, time: SimTime) -> SimResult<()> {
        let now = self.clock.now();
        if time < now {
            return Err(SimError::ScheduleInPast {
                actor: id,
                requested: time,
                now,
            });
        }
        self.live_actor(id)?;
        self.queue.schedule(id, time);
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.next_action = time;
        }
        Ok(())
    }

    /// Number of scheduled actors.
    pub fn scheduled(&self) -> usize {
        self.queue.len()
    }

    /// Run the next-due actor's turn.
    ///
    /// A requested transfer into a crowded destination is dropped and the
    /// actor keeps its reschedule. Broken passages and other defects fail
    /// the step.
    pub fn step(&mut self, process: &mut dyn DecisionProcess) -> SimResult<StepOutcome> {
        let (id, time) = match self.queue.pop_next() {
            Ok(entry) => entry,
            Err(QueueError::Empty) => return Ok(StepOutcome::QueueEmpty),
        };
        let elapsed = self.clock.advance_to(time);

        let decision = self.view_of(id).map(|view| process.decide(&view));
        let Some(decision) = decision else {
            debug!(actor = %id, "skipping actor without an area");
            self.run_controls_if_due()?;
            return Ok(StepOutcome::Skipped { actor: id });
        };
        self.apply_decision(id, decision)?;
        self.run_controls_if_due()?;
        Ok(StepOutcome::Acted { actor: id, elapsed })
    }

    /// Step until `max_steps` turns were taken, the queue empties or the
    /// session is decided. Returns the number of steps taken.
    pub fn run(&mut self, process: &mut dyn DecisionProcess, max_steps: u64) -> SimResult<u64> {
        let mut taken = 0;
        while taken < max_steps && self.session_status() == SessionStatus::Ongoing {
            if self.step(process)? == StepOutcome::QueueEmpty {
                break;
            }
            taken += 1;
        }
        Ok(taken)
    }

    /// Step through every turn due at or before `until`. Returns the number
    /// of steps taken.
    pub fn run_until(&mut self, process: &mut dyn DecisionProcess, until: SimTime) -> SimResult<u64> {
        let mut taken = 0;
        while let Some((_, time)) = self.queue.peek() {
            if time > until {
                break;
            }
            self.step(process)?;
            taken += 1;
        }
        Ok(taken)
    }

    fn view_of(&self, id: ActorId) -> Option<ActorView<'_>> {
        let actor = self.actors.get(&id)?;
        let area = self.area(actor.area()?)?;
        if !area.contains(id) {
            return None;
        }
        Some(ActorView {
            actor,
            area,
            exits: self.links.exits(area.id()),
            now: self.clock.now(),
        })
    }

    fn apply_decision(&mut self, id: ActorId, decision: Decision) -> SimResult<()> {
        if decision.dies {
            self.retire_actor(id, "died")?;
            return Ok(());
        }
        if let Some(transfer) = decision.transfer {
            match self.apply_transfer(id, transfer) {
                Ok(()) => {}
                // The actor stays put and still gets its next turn.
                Err(err) if is_blocked(&err) => {
                    debug!(actor = %id, error = %err, "transfer blocked");
                }
                Err(err) => return Err(err),
            }
        }
        match decision.reschedule {
            Some(time) => self.schedule(id, time),
            None if self.config.auto_reschedule => {
                let delay = self.live_actor(id)?.action_delay;
                self.schedule(id, self.clock.now() + delay)
            }
            None => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Faction controls
    // -----------------------------------------------------------------------

    fn run_controls_if_due(&mut self) -> SimResult<()> {
        let now = self.clock.now();
        if self.controls.is_empty() || now.since(self.last_control_run) < self.config.control_interval {
            return Ok(());
        }
        self.run_controls()
    }

    /// Let every faction control react to the current counters.
    pub fn run_controls(&mut self) -> SimResult<()> {
        let now = self.clock.now();
        self.last_control_run = now;
        let mut controls = std::mem::take(&mut self.controls);
        let mut result = Ok(());
        for control in &mut controls {
            let requests = {
                let view = CounterView::new(&self.counters, self.roster.leaders());
                control.update(&view, now)
            };
            if let Err(e) = self.apply_requests(control.faction(), requests) {
                result = Err(e);
                break;
            }
        }
        self.controls = controls;
        result
    }

    fn apply_requests(&mut self, faction: FactionId, requests: Vec<ControlRequest>) -> SimResult<()> {
        for request in requests {
            match request {
                ControlRequest::Schedule { actor, time } => {
                    self.ensure_member(faction, actor)?;
                    self.schedule(actor, time)?;
                }
                ControlRequest::Transfer { actor, request } => {
                    self.ensure_member(faction, actor)?;
                    self.apply_transfer(actor, request)?;
                }
                ControlRequest::Announce(Announcement::Provoked) => {
                    info!(%faction, "faction provoked");
                    self.emit(
                        SimEventKind::FactionProvoked { faction },
                        format!("{} is provoked", self.faction_name(faction)),
                    );
                }
                ControlRequest::Announce(Announcement::Attacking { behaviour, team }) => {
                    info!(%faction, team = team.len(), "faction attacking");
                    let description = format!("{} is attacking", self.faction_name(faction));
                    self.emit(
                        SimEventKind::FactionAttacking {
                            faction,
                            behaviour,
                            team,
                        },
                        description,
                    );
                }
            }
        }
        Ok(())
    }

    fn faction_name(&self, faction: FactionId) -> String {
        self.roster
            .spec(faction)
            .map_or_else(|| faction.to_string(), |s| s.name().to_string())
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Drain the session events reported since the last call.
    pub fn take_session_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.session)
    }

    /// Defeat once the player's leader is retired, victory once every main
    /// villain is eliminated.
    pub fn session_status(&self) -> SessionStatus {
        if let Some(player) = self.roster.player() {
            if self.retired.contains_key(&player.leader) {
                return SessionStatus::Defeat;
            }
        }
        let mut villains = self.roster.main_villains().peekable();
        if villains.peek().is_some() && villains.all(|v| self.roster.is_eliminated(v.id)) {
            return SessionStatus::Victory;
        }
        SessionStatus::Ongoing
    }

    // -----------------------------------------------------------------------
    // Time and events
    // -----------------------------------------------------------------------

    /// Current simulated time.
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// The simulation clock.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The configuration in use.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Record a user-defined event.
    pub fn log_custom(&mut self, label: impl Into<String>, actors: Vec<ActorId>, description: impl Into<String>) {
        self.emit(
            SimEventKind::Custom {
                label: label.into(),
                actors,
            },
            description,
        );
    }

    fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events
            .push(SimEvent::new(self.clock.now(), kind, description));
    }
}

/// Transfers that fail because the destination is crowded, not because the
/// world is broken.
fn is_blocked(err: &SimError) -> bool {
    matches!(
        err,
        SimError::Core(
            CoreError::NoLandingSpot { .. }
                | CoreError::CellOccupied { .. }
                | CoreError::CellBlocked { .. }
        )
    )
}

fn ensure_free(area: &Area, position: Position) -> Result<(), CoreError> {
    if !area.in_bounds(position) {
        return Err(CoreError::OutOfBounds {
            area: area.id(),
            position,
        });
    }
    if let Some(occupant) = area.occupant(position) {
        return Err(CoreError::CellOccupied {
            area: area.id(),
            position,
            occupant,
        });
    }
    if !area.is_free(position) {
        return Err(CoreError::CellBlocked {
            area: area.id(),
            position,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ControlState, TriggerControl};
    use dk_core::{Behaviour, HostilityProfile, Trigger, Tribe};

    const KEY7: LinkKey = LinkKey(7);
    const PLAYER: FactionId = FactionId(0);
    const VILLAGE: FactionId = FactionId(1);

    /// Area X at the top, area Y below it, joined by `(Down, key7)`.
    fn two_areas() -> Orchestrator {
        let mut sim = Orchestrator::default();
        let mut x = Area::new(sim.next_area_id(), "X", 8, 8);
        x.add_passage(LinkDirection::Down, KEY7, Position::new(2, 2)).unwrap();
        x.add_spawn_point(LinkKey::SPAWN, Position::new(0, 0)).unwrap();
        let x = sim.add_area(x).unwrap();
        let mut y = Area::new(sim.next_area_id(), "Y", 6, 6);
        y.add_passage(LinkDirection::Up, KEY7, Position::new(5, 5)).unwrap();
        let y = sim.add_area(y).unwrap();
        sim.connect(LinkDirection::Down, KEY7, x, y).unwrap();
        sim.add_faction(FactionSpec::new(PLAYER, "keeper", Tribe::Keeper), None)
            .unwrap();
        sim
    }

    fn imp(sim: &mut Orchestrator, x: i32, y: i32) -> ActorId {
        sim.spawn_actor(
            CreatureKind::Imp,
            PLAYER,
            Location {
                area: AreaId(0),
                position: Position::new(x, y),
            },
        )
        .unwrap()
    }

    fn residency_holds(sim: &Orchestrator) {
        for actor in sim.actors() {
            let homes = sim.areas().iter().filter(|a| a.contains(actor.id)).count();
            assert_eq!(homes, 1, "{} must live in exactly one area", actor.id);
            assert!(!sim.is_retired(actor.id));
        }
        for actor in sim.retired() {
            assert!(sim.areas().iter().all(|a| !a.contains(actor.id)));
        }
    }

    #[test]
    fn areas_must_arrive_in_id_order() {
        let mut sim = Orchestrator::default();
        let err = sim.add_area(Area::new(AreaId(3), "Late", 2, 2)).unwrap_err();
        assert_eq!(
            err,
            SimError::AreaIdMismatch {
                expected: AreaId(0),
                got: AreaId(3)
            }
        );
    }

    #[test]
    fn transfer_round_trip_through_paired_link() {
        let mut sim = two_areas();
        let id = imp(&mut sim, 1, 1);

        let landed = sim.transfer_via(id, LinkDirection::Down, KEY7).unwrap();
        assert_eq!(landed, Position::new(5, 5));
        assert_eq!(sim.actor(id).unwrap().area(), Some(AreaId(1)));
        residency_holds(&sim);

        sim.transfer_via(id, LinkDirection::Up, KEY7).unwrap();
        let back = sim.actor(id).unwrap().location.unwrap();
        assert_eq!(back.area, AreaId(0));
        assert_eq!(back.position, Position::new(2, 2));
        assert_eq!(sim.events().events_for_actor(id).len(), 3);
        residency_holds(&sim);
    }

    #[test]
    fn unlinked_passage_leaves_actor_in_place() {
        let mut sim = two_areas();
        let id = imp(&mut sim, 1, 1);
        let err = sim.transfer_via(id, LinkDirection::Up, KEY7).unwrap_err();
        assert!(matches!(err, SimError::Core(CoreError::UnlinkedPassage { .. })));
        assert_eq!(sim.area(AreaId(0)).unwrap().position_of(id), Some(Position::new(1, 1)));
    }

    #[test]
    fn occupied_entry_lands_next_to_it() {
        let mut sim = two_areas();
        let first = imp(&mut sim, 1, 1);
        let second = imp(&mut sim, 3, 3);
        sim.transfer_via(first, LinkDirection::Down, KEY7).unwrap();
        let landed = sim.transfer_via(second, LinkDirection::Down, KEY7).unwrap();
        assert_ne!(landed, Position::new(5, 5));
        assert_eq!(sim.area(AreaId(1)).unwrap().population(), 2);
    }

    #[test]
    fn direct_transfer_rejects_occupied_cell() {
        let mut sim = two_areas();
        let a = imp(&mut sim, 1, 1);
        let b = imp(&mut sim, 4, 4);
        sim.transfer_to(a, AreaId(1), Position::new(0, 0)).unwrap();
        let err = sim.transfer_to(b, AreaId(1), Position::new(0, 0)).unwrap_err();
        assert!(matches!(err, SimError::Core(CoreError::CellOccupied { .. })));
        assert_eq!(sim.actor(b).unwrap().area(), Some(AreaId(0)));
        residency_holds(&sim);
    }

    #[test]
    fn move_within_area_is_logged() {
        let mut sim = two_areas();
        let id = imp(&mut sim, 1, 1);
        sim.transfer_to(id, AreaId(0), Position::new(6, 6)).unwrap();

        assert_eq!(sim.area(AreaId(0)).unwrap().position_of(id), Some(Position::new(6, 6)));
        let last = sim.events().events_for_actor(id).last().map(|e| e.kind.clone());
        assert_eq!(
            last,
            Some(SimEventKind::Moved {
                actor: id,
                area: AreaId(0)
            })
        );

        // Staying on the same cell logs nothing.
        let before = sim.events().len();
        sim.transfer_to(id, AreaId(0), Position::new(6, 6)).unwrap();
        assert_eq!(sim.events().len(), before);
    }

    #[test]
    fn blocked_transfer_keeps_actor_and_its_turn() {
        let mut sim = two_areas();
        let traveller = imp(&mut sim, 1, 1);
        let free: Vec<Position> = {
            let y = sim.area(AreaId(1)).unwrap();
            y.bounds().cells().filter(|&p| y.is_free(p)).collect()
        };
        for position in free {
            sim.spawn_actor(
                CreatureKind::Imp,
                PLAYER,
                Location {
                    area: AreaId(1),
                    position,
                },
            )
            .unwrap();
        }

        let mut process = |view: &ActorView<'_>| {
            Decision::wait_until(view.now + 3).with_transfer(TransferRequest::Passage {
                direction: LinkDirection::Down,
                key: KEY7,
            })
        };
        let outcome = sim.step(&mut process).unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Acted {
                actor: traveller,
                elapsed: 0
            }
        );
        assert_eq!(sim.actor(traveller).unwrap().area(), Some(AreaId(0)));
        assert_eq!(sim.actor(traveller).unwrap().next_action, SimTime(3));
        residency_holds(&sim);
    }

    #[test]
    fn broken_passage_still_fails_the_step() {
        let mut sim = two_areas();
        imp(&mut sim, 1, 1);
        let mut process = |view: &ActorView<'_>| {
            Decision::wait_until(view.now + 1).with_transfer(TransferRequest::Passage {
                direction: LinkDirection::Up,
                key: KEY7,
            })
        };
        let err = sim.step(&mut process).unwrap_err();
        assert!(matches!(err, SimError::Core(CoreError::UnlinkedPassage { .. })));
    }

    #[test]
    fn land_actor_uses_spawn_point() {
        let mut sim = two_areas();
        let keeper = Actor::new(sim.allocate_actor_id(), CreatureKind::Keeper, PLAYER);
        let id = sim.land_actor(keeper, AreaId(0), LinkKey::SPAWN).unwrap();
        assert_eq!(sim.area(AreaId(0)).unwrap().position_of(id), Some(Position::new(0, 0)));

        let other = Actor::new(sim.allocate_actor_id(), CreatureKind::Imp, PLAYER);
        let err = sim.land_actor(other, AreaId(1), LinkKey::SPAWN).unwrap_err();
        assert!(matches!(err, SimError::Core(CoreError::MissingSpawnPoint { .. })));
    }

    #[test]
    fn duplicate_and_unplaced_actors_are_rejected() {
        let mut sim = two_areas();
        let id = imp(&mut sim, 1, 1);
        let mut again = Actor::new(id, CreatureKind::Imp, PLAYER);
        again.location = Some(Location {
            area: AreaId(0),
            position: Position::new(5, 5),
        });
        assert_eq!(sim.add_actor(again), Err(SimError::DuplicateActor(id)));

        let loose = Actor::new(sim.allocate_actor_id(), CreatureKind::Imp, PLAYER);
        let loose_id = loose.id;
        assert_eq!(sim.add_actor(loose), Err(SimError::Unplaced(loose_id)));
    }

    #[test]
    fn step_runs_actors_in_time_order() {
        let mut sim = two_areas();
        let a = imp(&mut sim, 1, 1);
        let b = imp(&mut sim, 2, 1);
        let c = imp(&mut sim, 3, 1);
        sim.schedule(a, SimTime(5)).unwrap();
        sim.schedule(b, SimTime(3)).unwrap();
        sim.schedule(c, SimTime(3)).unwrap();

        let mut order = Vec::new();
        let mut process = |view: &ActorView<'_>| {
            order.push(view.actor.id);
            Decision::idle()
        };
        let first = sim.step(&mut process).unwrap();
        assert_eq!(first, StepOutcome::Acted { actor: b, elapsed: 3 });
        sim.step(&mut process).unwrap();
        sim.step(&mut process).unwrap();
        assert_eq!(sim.step(&mut process).unwrap(), StepOutcome::QueueEmpty);
        drop(process);
        assert_eq!(order, vec![b, c, a]);
        assert_eq!(sim.now(), SimTime(5));
    }

    #[test]
    fn decision_transfer_then_reschedule() {
        let mut sim = two_areas();
        let id = imp(&mut sim, 1, 1);
        let mut process = |view: &ActorView<'_>| {
            Decision::wait_until(view.now + 4).with_transfer(TransferRequest::Passage {
                direction: LinkDirection::Down,
                key: KEY7,
            })
        };
        sim.step(&mut process).unwrap();
        assert_eq!(sim.actor(id).unwrap().area(), Some(AreaId(1)));
        assert_eq!(sim.actor(id).unwrap().next_action, SimTime(4));
        assert_eq!(sim.scheduled(), 1);
    }

    #[test]
    fn rescheduling_into_the_past_is_an_error() {
        let mut sim = two_areas();
        let a = imp(&mut sim, 1, 1);
        sim.schedule(a, SimTime(10)).unwrap();
        let mut process = |_: &ActorView<'_>| Decision::wait_until(SimTime(2));
        let err = sim.step(&mut process).unwrap_err();
        assert_eq!(
            err,
            SimError::ScheduleInPast {
                actor: a,
                requested: SimTime(2),
                now: SimTime(10)
            }
        );
    }

    #[test]
    fn dying_actor_is_retired_and_never_acts_again() {
        let mut sim = two_areas();
        let a = imp(&mut sim, 1, 1);
        let mut process = |_: &ActorView<'_>| Decision::die();
        sim.step(&mut process).unwrap();
        assert!(sim.is_retired(a));
        assert_eq!(sim.actor(a).unwrap().status, ActorStatus::Retired);
        assert_eq!(sim.scheduled(), 0);
        assert_eq!(sim.schedule(a, SimTime(3)), Err(SimError::ActorRetired(a)));
        residency_holds(&sim);
    }

    #[test]
    fn retire_is_idempotent() {
        let mut sim = two_areas();
        let a = imp(&mut sim, 1, 1);
        assert!(sim.retire_actor(a, "test").unwrap());
        assert!(!sim.retire_actor(a, "test").unwrap());
        assert_eq!(sim.retire_actor(ActorId(999), "test"), Err(SimError::ActorNotFound(ActorId(999))));
    }

    #[test]
    fn auto_reschedule_uses_action_delay() {
        let mut sim = Orchestrator::new(SimConfig::default().with_auto_reschedule(true));
        sim.add_area(Area::new(AreaId(0), "X", 4, 4)).unwrap();
        let mut actor = Actor::new(sim.allocate_actor_id(), CreatureKind::Imp, PLAYER).with_action_delay(3);
        actor.location = Some(Location {
            area: AreaId(0),
            position: Position::new(0, 0),
        });
        let id = sim.add_actor(actor).unwrap();

        let mut process = |_: &ActorView<'_>| Decision::idle();
        assert_eq!(sim.run(&mut process, 3).unwrap(), 3);
        assert_eq!(sim.actor(id).unwrap().next_action, SimTime(9));
    }

    #[test]
    fn run_until_stops_at_time_limit() {
        let mut sim = Orchestrator::new(SimConfig::default().with_auto_reschedule(true));
        sim.add_area(Area::new(AreaId(0), "X", 4, 4)).unwrap();
        let mut actor = Actor::new(sim.allocate_actor_id(), CreatureKind::Imp, PLAYER).with_action_delay(2);
        actor.location = Some(Location {
            area: AreaId(0),
            position: Position::new(0, 0),
        });
        sim.add_actor(actor).unwrap();
        let mut process = |_: &ActorView<'_>| Decision::idle();
        // Turns at 0, 2, 4, 6.
        assert_eq!(sim.run_until(&mut process, SimTime(6)).unwrap(), 4);
        assert_eq!(sim.now(), SimTime(6));
    }

    #[test]
    fn leader_death_is_defeat() {
        let mut sim = two_areas();
        let keeper = imp(&mut sim, 0, 0);
        let _helper = imp(&mut sim, 1, 0);
        sim.set_player(PLAYER, keeper).unwrap();
        assert_eq!(sim.session_status(), SessionStatus::Ongoing);

        sim.record_kill(keeper, None).unwrap();
        assert_eq!(sim.session_status(), SessionStatus::Defeat);
        assert_eq!(
            sim.take_session_events(),
            vec![SessionEvent::LeaderDied {
                faction: PLAYER,
                actor: keeper
            }]
        );
        assert!(sim.take_session_events().is_empty());
        assert_eq!(sim.counters().get(PLAYER).unwrap().victims, 1);
    }

    #[test]
    fn eliminating_main_villains_is_victory() {
        let mut sim = two_areas();
        let mut village = FactionSpec::new(VILLAGE, "human_castle", Tribe::Human);
        village.main_villain = true;
        sim.add_faction(village, None).unwrap();
        let knight = sim
            .spawn_actor(
                CreatureKind::Knight,
                VILLAGE,
                Location {
                    area: AreaId(1),
                    position: Position::new(0, 0),
                },
            )
            .unwrap();
        let imp = imp(&mut sim, 1, 1);

        sim.record_kill(knight, Some(imp)).unwrap();
        assert_eq!(sim.session_status(), SessionStatus::Victory);
        assert_eq!(sim.counters().get(VILLAGE).unwrap().victims, 1);
        assert!(sim
            .take_session_events()
            .contains(&SessionEvent::FactionEliminated { faction: VILLAGE }));
    }

    #[test]
    fn population_cap_grows_with_structures() {
        use dk_core::ImmigrationPolicy;
        use dk_core::immigration::PopulationBonus;

        let mut sim = Orchestrator::default();
        let mut keeper = FactionSpec::new(PLAYER, "keeper", Tribe::Keeper);
        keeper.immigration = ImmigrationPolicy::with_immigrants(0.1, 10, Vec::new()).with_bonuses(vec![PopulationBonus {
            structure: Structure::Throne,
            per_structure: 10.0,
            max_increase: 10.0,
        }]);
        sim.add_faction(keeper, None).unwrap();
        assert_eq!(sim.population_cap(PLAYER), Some(10));
        sim.record_structure(PLAYER, Structure::Throne);
        sim.record_structure(PLAYER, Structure::Throne);
        assert_eq!(sim.population_cap(PLAYER), Some(20));
    }

    #[test]
    fn trigger_control_wakes_its_team() {
        let mut sim = Orchestrator::new(SimConfig::default().with_control_interval(5));
        let top = sim.add_area(Area::new(AreaId(0), "Top", 10, 10)).unwrap();
        sim.add_faction(FactionSpec::new(PLAYER, "keeper", Tribe::Keeper), None)
            .unwrap();

        let mut profile = HostilityProfile::against_player(vec![Trigger::stolen_items()], Behaviour::KillLeader)
            .with_team(2, 2);
        profile.bind_player(PLAYER);
        let mut spec = FactionSpec::new(VILLAGE, "lizard_village", Tribe::Lizard);
        spec.hostility = Some(profile.clone());
        sim.add_faction(spec, Some(Box::new(TriggerControl::new(VILLAGE, profile))))
            .unwrap();

        let mut members = Vec::new();
        for x in 0..3 {
            let id = sim
                .spawn_actor(
                    CreatureKind::Lizardman,
                    VILLAGE,
                    Location {
                        area: top,
                        position: Position::new(x, 5),
                    },
                )
                .unwrap();
            members.push(id);
        }
        sim.set_faction_leader(VILLAGE, members[0]).unwrap();
        let keeper = sim
            .spawn_actor(
                CreatureKind::Keeper,
                PLAYER,
                Location {
                    area: top,
                    position: Position::new(0, 0),
                },
            )
            .unwrap();
        sim.schedule(keeper, SimTime(0)).unwrap();

        // Villagers go idle after their first turn; the keeper keeps acting.
        let mut acted = Vec::new();
        let mut process = |view: &ActorView<'_>| {
            acted.push((view.actor.id, view.now));
            if view.actor.id == keeper {
                Decision::wait_until(view.now + 1)
            } else {
                Decision::idle()
            }
        };
        sim.run(&mut process, 4).unwrap();
        assert_eq!(sim.scheduled(), 1);

        sim.record_theft(VILLAGE, 50);
        sim.run_until(&mut process, SimTime(5)).unwrap();
        drop(process);

        // The raiders were woken at the control run and acted right away.
        assert!(acted.contains(&(members[1], SimTime(5))));
        assert!(acted.contains(&(members[2], SimTime(5))));
        assert!(!acted.contains(&(members[0], SimTime(5))));

        let control = sim.control::<TriggerControl>(VILLAGE).unwrap();
        assert_eq!(
            control.state(),
            &ControlState::Attacking {
                team: vec![members[1], members[2]]
            }
        );
        assert!(sim.events().events().iter().any(|e| matches!(
            e.kind,
            SimEventKind::FactionProvoked { faction } if faction == VILLAGE
        )));
    }

    #[test]
    fn controls_cannot_command_foreign_actors() {
        #[derive(Debug)]
        struct Rogue;
        impl FactionControl for Rogue {
            fn name(&self) -> &str {
                "rogue"
            }
            fn faction(&self) -> FactionId {
                VILLAGE
            }
            fn update(&mut self, _view: &CounterView<'_>, now: SimTime) -> Vec<ControlRequest> {
                vec![ControlRequest::Schedule {
                    actor: ActorId(0),
                    time: now,
                }]
            }
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        let mut sim = two_areas();
        sim.add_faction(FactionSpec::new(VILLAGE, "bandits", Tribe::Bandit), Some(Box::new(Rogue)))
            .unwrap();
        let imp = imp(&mut sim, 1, 1);
        assert_eq!(imp, ActorId(0));
        assert_eq!(
            sim.run_controls(),
            Err(SimError::ForeignActor {
                faction: VILLAGE,
                actor: imp
            })
        );
    }
}

/// Entity registry: the single owner of every live game object.
///
/// Destruction is two-phase.  `destroy` flips `alive` off immediately so
/// nothing can match the entity again this frame; `end_frame` drops the slot.
use std::collections::BTreeMap;

use tracing::debug;

use crate::entities::{Attrs, Category, Entity, EntityId, EntityKind, Vec2};
use crate::error::{CoreError, InvariantViolation};

#[derive(Clone, Debug)]
pub struct Registry {
    /// Ordered by id so iteration follows spawn order.
    entities: BTreeMap<EntityId, Entity>,
    pending_removal: Vec<EntityId>,
    /// Id 0 belongs to the player.
    next_id: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Registry { entities: BTreeMap::new(), pending_removal: Vec::new(), next_id: 1 }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(
        &mut self,
        kind: EntityKind,
        position: Vec2,
        velocity: Vec2,
        attrs: Attrs,
        now: f64,
    ) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(
            id,
            Entity {
                id,
                kind,
                position,
                velocity,
                alive: true,
                born_at: now,
                health: attrs.health,
                swing_phase: attrs.swing_phase,
            },
        );
        debug!(id = id.0, ?kind, x = position.x, y = position.y, "spawned");
        id
    }

    /// Mark an entity dead.  Returns `false` if it was already dead or gone.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) if entity.alive => {
                entity.alive = false;
                self.pending_removal.push(id);
                true
            }
            _ => false,
        }
    }

    /// Like `destroy`, but treats a dead or unknown id as a bookkeeping bug.
    pub fn kill(&mut self, id: EntityId) -> Result<(), CoreError> {
        if self.destroy(id) {
            return Ok(());
        }
        if self.was_issued(id) {
            Err(InvariantViolation::DeadEntity { id }.into())
        } else {
            Err(InvariantViolation::UnknownEntity { id }.into())
        }
    }

    /// Drop every slot destroyed since the last frame boundary.
    pub fn end_frame(&mut self) -> Vec<EntityId> {
        let removed = std::mem::take(&mut self.pending_removal);
        for id in &removed {
            self.entities.remove(id);
        }
        removed
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.get(&id).is_some_and(|e| e.alive)
    }

    /// True for any id this registry handed out, even if long removed.
    pub fn was_issued(&self, id: EntityId) -> bool {
        id.0 >= 1 && id.0 < self.next_id
    }

    /// Snapshot of the ids alive right now, optionally of one category.
    /// The returned list can be walked as many times as needed.
    pub fn alive_ids(&self, filter: Option<Category>) -> Vec<EntityId> {
        self.iter_alive(filter).map(|e| e.id).collect()
    }

    /// Lazy view over alive entities.  Cloning the iterator restarts it.
    pub fn iter_alive(
        &self,
        filter: Option<Category>,
    ) -> impl Iterator<Item = &Entity> + Clone + '_ {
        self.entities
            .values()
            .filter(move |e| e.alive && filter.map_or(true, |c| e.kind.category() == c))
    }

    /// Visit the entities alive at call start.  `f` may destroy or spawn;
    /// ids destroyed mid-walk are skipped, spawns are not visited.
    pub fn for_each_alive<F>(&mut self, filter: Option<Category>, mut f: F)
    where
        F: FnMut(&mut Registry, EntityId),
    {
        for id in self.alive_ids(filter) {
            if self.is_alive(id) {
                f(self, id);
            }
        }
    }

    pub fn count(&self, filter: Option<Category>) -> usize {
        self.iter_alive(filter).count()
    }

    /// Destroy every alive entity of `filter` matching `predicate`.
    pub fn cull<P>(&mut self, filter: Option<Category>, mut predicate: P) -> Vec<EntityId>
    where
        P: FnMut(&Entity) -> bool,
    {
        let doomed: Vec<EntityId> = self
            .iter_alive(filter)
            .filter(|e| predicate(e))
            .map(|e| e.id)
            .collect();
        for id in &doomed {
            self.destroy(*id);
        }
        doomed
    }

    /// Move every alive entity along its velocity (px/s) for `dt_ms`.
    pub fn integrate(&mut self, dt_ms: f64) {
        let secs = dt_ms / 1000.0;
        for entity in self.entities.values_mut().filter(|e| e.alive) {
            entity.position.x += entity.velocity.x * secs;
            entity.position.y += entity.velocity.y * secs;
        }
    }
}

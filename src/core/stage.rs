//! Stage
//!
//! The arena owning every executant, plus the tree operations that need more
//! than one node at a time: parenting, behavior installation, the frame-cycle
//! walk, drawing, destruction and coordinate conversion between nodes.
//!
//! Operations that change a container first collect its operate
//! notifications and then apply them before returning. From the outside a
//! change and its effects (parent links, attach/detach, tribe-layer
//! invalidation) land together.

use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, trace};

use super::behavior::{capability, share, Behavior, Cx, Shared, Slot, Tenant};
use super::capability::Body;
use super::executant::{Debut, Executant, Name, Phase, Role};
use super::leaf::{Command, Pick};
use super::{AntAllocator, AntId};
use crate::behaviors::bodies::ImageBody;
use crate::behaviors::default_behavior;
use crate::error::{Error, Result};
use crate::geom::{Point, Rect, Spatial};
use crate::render::Canvas;

/// Hook run right after the root's own update, before its behaviors.
pub(crate) type RootHook<'h> = &'h mut dyn FnMut(&mut Stage) -> Result<()>;

pub struct Stage {
    ants: Vec<Option<Executant>>,
    allocator: AntAllocator,
    root: AntId,
    /// Milliseconds since the previous frame
    pub delta: f64,
    /// Milliseconds accumulated over all frames
    pub time: f64,
    canvas_size: Point,
    rng: SmallRng,
    /// Attach notices for tenants that were busy running a hook when their
    /// host changed, in arrival order
    unsettled: Vec<(Shared, Option<AntId>)>,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::seed_from_u64(0x2e9))
    }

    /// A stage whose random source starts from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        let mut allocator = AntAllocator::new();
        let root = allocator.allocate();
        let mut ants = Vec::new();
        ants.push(Some(Executant::new()));
        Self {
            ants,
            allocator,
            root,
            delta: 0.0,
            time: 0.0,
            canvas_size: Point::ZERO,
            rng,
            unsettled: Vec::new(),
        }
    }

    pub fn root(&self) -> AntId {
        self.root
    }

    pub fn canvas_size(&self) -> Point {
        self.canvas_size
    }

    pub fn set_canvas_size(&mut self, size: Point) {
        self.canvas_size = size;
    }

    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    /// Number of live executants, root included.
    pub fn len(&self) -> usize {
        self.allocator.alive_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves `ant` into the arena and installs its staged behaviors. The new
    /// executant has no parent yet.
    pub fn spawn(&mut self, mut ant: Executant) -> AntId {
        let staged = std::mem::take(&mut ant.staged);
        let id = self.allocator.allocate();
        let index = id.index() as usize;
        if index >= self.ants.len() {
            self.ants.resize_with(index + 1, || None);
        }
        self.ants[index] = Some(ant);
        trace!(?id, "spawn");

        for (slot, behavior) in staged {
            if let Some(node) = self.node_mut(id) {
                let mut ops = Vec::new();
                node.behaviors.set(Some(behavior), Some(slot), |_, out, into| {
                    ops.push((out.cloned(), into.cloned()));
                });
                self.attach_all(id, ops);
            }
        }
        id
    }

    /// Spawns `ant` and puts it under `parent` right away.
    pub fn add_child(&mut self, parent: AntId, ant: Executant, name: Option<Name>) -> Result<AntId> {
        let id = self.spawn(ant);
        self.set_child(parent, Some(id), name)?;
        Ok(id)
    }

    pub fn contains(&self, id: AntId) -> bool {
        self.allocator.is_alive(id)
    }

    pub fn node(&self, id: AntId) -> Option<&Executant> {
        if !self.allocator.is_alive(id) {
            return None;
        }
        self.ants.get(id.index() as usize)?.as_ref()
    }

    pub fn node_mut(&mut self, id: AntId) -> Option<&mut Executant> {
        if !self.allocator.is_alive(id) {
            return None;
        }
        self.ants.get_mut(id.index() as usize)?.as_mut()
    }

    pub fn get(&self, id: AntId) -> Result<&Executant> {
        self.node(id).ok_or(Error::StaleAnt(id))
    }

    pub fn get_mut(&mut self, id: AntId) -> Result<&mut Executant> {
        self.node_mut(id).ok_or(Error::StaleAnt(id))
    }

    // Children
    //==========================================================================

    /// Stores `child` under `name` in `parent` (or the lowest free index) and
    /// returns the name used. `None` clears the name. A child still under
    /// another parent is taken out of it first.
    pub fn set_child(&mut self, parent: AntId, child: Option<AntId>, name: Option<Name>) -> Result<Name> {
        self.get(parent)?;
        if let Some(child) = child {
            let previous = self.get(child)?.parent;
            if child == parent || self.ancestors(parent).contains(&child) {
                return Err(Error::TreeCycle { parent, child });
            }
            if let Some(previous) = previous {
                self.remove_child(previous, &Pick::Leaf(child))?;
            }
        }

        let mut ops = Vec::new();
        let name = self.get_mut(parent)?.childs.set(child, name, |_, out, into| {
            ops.push((out.copied(), into.copied()));
        });
        self.childs_operated(parent, ops);
        Ok(name)
    }

    /// Takes a child out of `parent` without destroying it. No-op when the
    /// pick matches nothing.
    pub fn remove_child(&mut self, parent: AntId, pick: &Pick<Name, AntId>) -> Result<()> {
        let node = self.get_mut(parent)?;
        let Some(name) = node.childs.resolve(pick) else {
            return Ok(());
        };
        let mut ops = Vec::new();
        node.childs.remove(&name, |_, out, into| {
            ops.push((out.copied(), into.copied()));
        });
        self.childs_operated(parent, ops);
        Ok(())
    }

    /// Queues a child change for the next stand phase of `parent`.
    pub fn bid_child(&mut self, parent: AntId, command: Command<Name, AntId>) -> Result<()> {
        self.get_mut(parent)?.childs.bid(command);
        Ok(())
    }

    fn childs_operated(&mut self, parent: AntId, ops: Vec<(Option<AntId>, Option<AntId>)>) {
        for (outof, into) in ops {
            if let Some(node) = outof.and_then(|id| self.node_mut(id)) {
                node.parent = None;
            }
            if let Some(node) = into.and_then(|id| self.node_mut(id)) {
                node.parent = Some(parent);
            }
        }
        self.tribe_changed(parent);
    }

    /// Drops the cached tribe layers of `id` and every ancestor.
    pub fn tribe_changed(&mut self, id: AntId) {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.node_mut(id)) {
            node.tribe_layers = None;
            current = node.parent;
        }
    }

    /// Changes the draw layer of `id`.
    pub fn set_layer(&mut self, id: AntId, layer: Option<i32>) -> Result<()> {
        self.get_mut(id)?.layer = layer;
        self.tribe_changed(id);
        Ok(())
    }

    // Behaviors
    //==========================================================================

    /// Stores `behavior` under `slot` (or the lowest free index) and returns
    /// the slot used. The outgoing behavior is detached before the incoming
    /// one is attached.
    pub fn set_behavior(&mut self, host: AntId, behavior: Option<Shared>, slot: Option<Slot>) -> Result<Slot> {
        let mut ops = Vec::new();
        let slot = self.get_mut(host)?.behaviors.set(behavior, slot, |_, out, into| {
            ops.push((out.cloned(), into.cloned()));
        });
        self.attach_all(host, ops);
        Ok(slot)
    }

    /// Wraps and installs `behavior` under `slot`, returning the shared handle.
    pub fn attach(&mut self, host: AntId, slot: Slot, behavior: impl Behavior) -> Result<Shared> {
        let shared = share(behavior);
        self.set_behavior(host, Some(shared.clone()), Some(slot))?;
        Ok(shared)
    }

    pub fn remove_behavior(&mut self, host: AntId, slot: &Slot) -> Result<()> {
        if self.get(host)?.behaviors.contains(slot) {
            self.set_behavior(host, None, Some(slot.clone()))?;
        }
        Ok(())
    }

    /// Queues a behavior change for the next stand phase of `host`.
    pub fn bid_behavior(&mut self, host: AntId, command: Command<Slot, Shared>) -> Result<()> {
        self.get_mut(host)?.behaviors.bid(command);
        Ok(())
    }

    pub fn behavior(&self, host: AntId, slot: &Slot) -> Option<Shared> {
        self.node(host)?.behaviors.get(slot).cloned()
    }

    /// Like `behavior`, but falls back on a queued set for `slot` and then on
    /// the default behavior for well-known slots, which gets installed.
    pub fn need_behavior(&mut self, host: AntId, slot: &Slot) -> Result<Shared> {
        let mut ops = Vec::new();
        let shared = self
            .get_mut(host)?
            .behaviors
            .need(slot, default_behavior, |_, out, into| {
                ops.push((out.cloned(), into.cloned()));
            })?
            .clone();
        self.attach_all(host, ops);
        Ok(shared)
    }

    /// Runs `f` on the behavior under `slot` if it is a `T`. `None` as well
    /// while that behavior is running one of its own hooks.
    pub fn with_behavior<T: Behavior, R>(&self, host: AntId, slot: &Slot, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let shared = self.behavior(host, slot)?;
        let mut tenant = shared.try_borrow_mut().ok()?;
        let out = tenant.get_mut::<T>().map(f);
        out
    }

    /// Body rect of `host` in its local space. Uses the installed (or queued)
    /// body, else computes what the default image body would give.
    pub fn body_rect(&self, host: AntId) -> Result<Rect> {
        let node = self.get(host)?;
        let shared = node
            .behaviors
            .get(&Slot::Body)
            .or_else(|| node.behaviors.pending_set(&Slot::Body))
            .cloned();
        let Some(shared) = shared else {
            return ImageBody.rect(self, host);
        };
        let tenant = shared.borrow();
        let body = capability(&tenant, &Slot::Body, |b| b.as_body())?;
        let rect = body.rect(self, host)?;
        Ok(rect)
    }

    // Roles
    //==========================================================================

    pub fn set_role(&mut self, id: AntId, role: Option<Box<dyn Role>>) -> Result<()> {
        self.get_mut(id)?.role = role;
        Ok(())
    }

    /// Calls `f` with the role of `id` taken out of its node. The role goes
    /// back unless the node died or got a new role meanwhile. `Ok(None)`
    /// when the node has no role.
    pub fn with_role_taken<R>(
        &mut self,
        id: AntId,
        f: impl FnOnce(&mut dyn Role, &mut Cx<'_>) -> Result<R>,
    ) -> Result<Option<R>> {
        let Some(mut role) = self.get_mut(id)?.role.take() else {
            return Ok(None);
        };
        let out = f(role.as_mut(), &mut Cx::new(self, id));
        if let Some(node) = self.node_mut(id) {
            if node.role.is_none() {
                node.role = Some(role);
            }
        }
        out.map(Some)
    }

    /// Runs `f` on the role of `id` if it is a `T`.
    pub fn with_role<T: Role, R>(
        &mut self,
        id: AntId,
        f: impl FnOnce(&mut T, &mut Cx<'_>) -> Result<R>,
    ) -> Result<Option<R>> {
        let out = self.with_role_taken(id, |role, cx| match role.as_any_mut().downcast_mut::<T>() {
            Some(role) => f(role, cx).map(Some),
            None => Ok(None),
        })?;
        Ok(out.flatten())
    }

    // Frame cycle
    //==========================================================================

    /// Walks one phase over `id` and its subtree, parents first.
    pub fn kick_cycle(&mut self, id: AntId, phase: Phase) -> Result<()> {
        self.cycle(id, phase, None)
    }

    pub(crate) fn cycle(&mut self, id: AntId, phase: Phase, hook: Option<RootHook<'_>>) -> Result<()> {
        if !self.contains(id) {
            return Ok(());
        }

        match phase {
            Phase::Stand => {
                self.stand(id)?;
                for tenant in self.behavior_snapshot(id) {
                    self.run_hook(id, &tenant, |running, cx| running.before(cx))?;
                }
            }
            Phase::Update => {
                let first = match self.node_mut(id) {
                    Some(node) if node.debut == Debut::Pending => {
                        node.debut = Debut::Done;
                        true
                    }
                    _ => false,
                };
                self.with_role_taken(id, |role, cx| {
                    if first {
                        role.first(cx)
                    } else {
                        role.update(cx)
                    }
                })?;
                if let Some(hook) = hook {
                    hook(self)?;
                }
                let delta = self.delta;
                for tenant in self.behavior_snapshot(id) {
                    self.run_hook(id, &tenant, |running, cx| running.behave(cx, delta))?;
                }
            }
            Phase::Stay => {
                self.with_role_taken(id, |role, cx| role.stay(cx))?;
                for tenant in self.behavior_snapshot(id) {
                    self.run_hook(id, &tenant, |running, cx| running.after(cx))?;
                }
            }
        }

        for child in self.child_snapshot(id) {
            self.cycle(child, phase, None)?;
        }
        Ok(())
    }

    /// Runs one hook of `tenant`, then delivers the attach notices it left
    /// behind. A tenant already running further up the stack is skipped.
    fn run_hook(
        &mut self,
        id: AntId,
        tenant: &Shared,
        hook: impl FnOnce(&mut Tenant, &mut Cx<'_>) -> Result<()>,
    ) -> Result<()> {
        let done = match tenant.try_borrow_mut() {
            Ok(mut running) => hook(&mut *running, &mut Cx::for_tenant(self, id, tenant)),
            Err(_) => Ok(()),
        };
        self.settle();
        done
    }

    fn behavior_snapshot(&self, id: AntId) -> Vec<Shared> {
        self.node(id)
            .map(|node| node.behaviors.values().cloned().collect())
            .unwrap_or_default()
    }

    fn child_snapshot(&self, id: AntId) -> Vec<AntId> {
        self.node(id)
            .map(|node| node.childs.values().copied().collect())
            .unwrap_or_default()
    }

    /// Replays the deferred behavior and child commands of `id`.
    fn stand(&mut self, id: AntId) -> Result<()> {
        let node = self.get_mut(id)?;
        let behavior_commands = node.behaviors.take_commands();
        let child_commands = node.childs.take_commands();
        if behavior_commands.is_empty() && child_commands.is_empty() {
            return Ok(());
        }
        debug!(
            host = ?id,
            behaviors = behavior_commands.len(),
            childs = child_commands.len(),
            "flush deferred commands"
        );

        for command in behavior_commands {
            match command {
                Command::Set { leaf, name } => {
                    self.set_behavior(id, Some(leaf), name)?;
                }
                Command::Remove(pick) | Command::Destroy(pick) => {
                    let slot = self.get(id)?.behaviors.resolve(&pick);
                    if let Some(slot) = slot {
                        self.set_behavior(id, None, Some(slot))?;
                    }
                }
            }
        }

        for command in child_commands {
            match command {
                Command::Set { leaf, name } => {
                    if self.contains(leaf) {
                        self.set_child(id, Some(leaf), name)?;
                    } else {
                        trace!(host = ?id, child = ?leaf, "queued child died before joining");
                    }
                }
                Command::Remove(pick) => self.remove_child(id, &pick)?,
                Command::Destroy(Pick::Leaf(child)) => self.destroy(child)?,
                Command::Destroy(pick) => {
                    let node = self.get(id)?;
                    let child = node.childs.resolve(&pick).and_then(|name| node.childs.get(&name).copied());
                    if let Some(child) = child {
                        self.destroy(child)?;
                    }
                }
            }
        }
        Ok(())
    }

    // Drawing
    //==========================================================================

    /// Computes (or returns the cached) sorted distinct layers drawn in the
    /// subtree of `id`.
    pub fn make_tribe_layers(&mut self, id: AntId) -> Vec<i32> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        if let Some(layers) = &node.tribe_layers {
            return layers.clone();
        }

        let mut layers: Vec<i32> = node.layer.into_iter().collect();
        for child in self.child_snapshot(id) {
            layers.extend(self.make_tribe_layers(child));
        }
        layers.sort_unstable();
        layers.dedup();

        if let Some(node) = self.node_mut(id) {
            node.tribe_layers = Some(layers.clone());
        }
        layers
    }

    /// Draws `layer` of the subtree of `id`. Nodes with a zero scale axis are
    /// skipped together with their subtree.
    pub fn draw(&self, id: AntId, layer: i32, canvas: &mut dyn Canvas) {
        let Some(node) = self.node(id) else {
            return;
        };
        if node.scale.x == 0.0 || node.scale.y == 0.0 {
            return;
        }

        canvas.save();
        canvas.translate(node.position);
        canvas.scale(node.scale);

        if node.layer == Some(layer) {
            self.depict(id, node, canvas);
        }

        for child in node.childs.values() {
            let wanted = self
                .node(*child)
                .and_then(|c| c.tribe_layers.as_ref())
                .is_some_and(|layers| layers.contains(&layer));
            if wanted {
                self.draw(*child, layer, canvas);
            }
        }

        canvas.restore();
    }

    fn depict(&self, id: AntId, node: &Executant, canvas: &mut dyn Canvas) {
        if node.role.as_ref().is_some_and(|role| role.depict(canvas, self, id)) {
            return;
        }
        let Some(shared) = node.behaviors.get(&Slot::Renderer) else {
            return;
        };
        let tenant = shared.borrow();
        if let Some(renderer) = tenant.behavior().as_renderer() {
            renderer.render(canvas, self, id);
        };
    }

    /// Draws every layer of the tree, lowest first.
    pub fn draw_all_layers(&mut self, canvas: &mut dyn Canvas) {
        let root = self.root;
        for layer in self.make_tribe_layers(root) {
            self.draw(root, layer, canvas);
        }
    }

    // Destruction
    //==========================================================================

    /// Detaches all behaviors of `id`, takes it out of its parent and
    /// destroys its children. The root survives with an empty tree; any
    /// other id goes stale. Stale ids are ignored.
    ///
    /// Safe to call from any hook, including one of the dying node's own
    /// behaviors: a behavior still running gets its detach once it returns.
    pub fn destroy(&mut self, id: AntId) -> Result<()> {
        let Some(node) = self.node_mut(id) else {
            return Ok(());
        };
        debug!(?id, "destroy");

        let mut ops = Vec::new();
        node.behaviors.clear(|_, out, into| {
            ops.push((out.cloned(), into.cloned()));
        });
        let parent = node.parent;
        self.attach_all(id, ops);

        if let Some(parent) = parent {
            self.remove_child(parent, &Pick::Leaf(id))?;
        }

        for child in self.child_snapshot(id) {
            self.destroy(child)?;
        }

        if id != self.root && self.allocator.free(id) {
            self.ants[id.index() as usize] = None;
        }
        Ok(())
    }

    // Navigation
    //==========================================================================

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: AntId) -> Vec<AntId> {
        let mut chain = Vec::new();
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(ancestor) = current {
            chain.push(ancestor);
            current = self.node(ancestor).and_then(|n| n.parent);
        }
        chain
    }

    /// The root if `id` is in its tree.
    pub fn get_scene(&self, id: AntId) -> Option<AntId> {
        if !self.contains(id) {
            return None;
        }
        let top = self.ancestors(id).last().copied().unwrap_or(id);
        (top == self.root).then_some(top)
    }

    /// Name under which the parent of `id` keeps it.
    pub fn get_id(&self, id: AntId) -> Option<Name> {
        let parent = self.node(id)?.parent?;
        self.node(parent)?.childs.index(&id)
    }

    /// Slash-separated names from the top of the tree down to `id`, like
    /// `/hud/3`. Empty for a node without parent.
    pub fn get_path(&self, id: AntId) -> String {
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return String::new();
        };
        let name = self.get_id(id).map(|n| n.to_string()).unwrap_or_default();
        format!("{}/{}", self.get_path(parent), name)
    }

    /// Descends from `id` along a slash-separated path of child names.
    pub fn get_child(&self, id: AntId, path: &str) -> Option<AntId> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(id, |current, segment| {
                self.node(current)?.childs.get(&Name::parse(segment)).copied()
            })
    }

    /// `id` and its ancestors, top first.
    fn lineage(&self, id: AntId) -> Vec<AntId> {
        let mut chain = self.ancestors(id);
        chain.reverse();
        if self.contains(id) {
            chain.push(id);
        }
        chain
    }

    // Coordinates
    //==========================================================================

    /// Local space of `id` to root (canvas) space.
    pub fn global_coord<T: Spatial>(&self, id: AntId, mut coord: T) -> T {
        let mut current = self.node(id);
        while let Some(node) = current {
            coord = node.parent_coord(coord);
            current = node.parent.and_then(|p| self.node(p));
        }
        coord
    }

    /// Root (canvas) space to the local space of `id`.
    pub fn local_coord<T: Spatial>(&self, id: AntId, coord: T) -> T {
        self.lineage(id)
            .into_iter()
            .filter_map(|ant| self.node(ant))
            .fold(coord, |coord, node| node.get_coord(coord))
    }

    /// Local space of `from` to the local space of `to`. `None` on either
    /// side stands for root space.
    pub fn spin_coord<T: Spatial>(&self, from: Option<AntId>, coord: T, to: Option<AntId>) -> T {
        let coord = match from {
            Some(from) => self.global_coord(from, coord),
            None => coord,
        };
        match to {
            Some(to) => self.local_coord(to, coord),
            None => coord,
        }
    }

    /// Local space of `from` to the local space of `id`.
    pub fn take_coord<T: Spatial>(&self, id: AntId, coord: T, from: AntId) -> T {
        self.spin_coord(Some(from), coord, Some(id))
    }

    /// Root scale to the local scale of `id`, ignoring positions.
    pub fn local_scale<T: Spatial>(&self, id: AntId, coord: T) -> T {
        self.lineage(id)
            .into_iter()
            .filter_map(|ant| self.node(ant))
            .fold(coord, |coord, node| node.get_scale(coord))
    }

    /// Local scale of `id` to root scale.
    pub fn global_scale<T: Spatial>(&self, id: AntId, coord: T) -> T {
        self.lineage(id)
            .into_iter()
            .filter_map(|ant| self.node(ant))
            .fold(coord, |coord, node| node.parent_scale(coord))
    }

    // Attach notices
    //==========================================================================

    /// Applies collected behavior operate notifications: detach the outgoing,
    /// then attach the incoming.
    fn attach_all(&mut self, host: AntId, ops: Vec<(Option<Shared>, Option<Shared>)>) {
        for (outof, into) in ops {
            if let Some(outof) = outof {
                self.notify(outof, None);
            }
            if let Some(into) = into {
                self.notify(into, Some(host));
            }
        }
    }

    /// Tells `tenant` about its new host, or queues the notice while the
    /// tenant is borrowed by a hook further up the call stack.
    fn notify(&mut self, tenant: Shared, host: Option<AntId>) {
        let queued = self.unsettled.iter().any(|(t, _)| Rc::ptr_eq(t, &tenant));
        let applied = !queued && try_attach(&tenant, host);
        if !applied {
            trace!(?host, "attach notice deferred until the running hook returns");
            self.unsettled.push((tenant, host));
        }
    }

    /// Delivers queued attach notices whose tenants are free again. Notices
    /// for one tenant keep their order.
    pub(crate) fn settle(&mut self) {
        if self.unsettled.is_empty() {
            return;
        }
        let mut busy: Vec<Shared> = Vec::new();
        for (tenant, host) in std::mem::take(&mut self.unsettled) {
            let blocked = busy.iter().any(|b| Rc::ptr_eq(b, &tenant));
            if blocked || !try_attach(&tenant, host) {
                busy.push(Rc::clone(&tenant));
                self.unsettled.push((tenant, host));
            }
        }
    }
}

fn try_attach(tenant: &Shared, host: Option<AntId>) -> bool {
    match tenant.try_borrow_mut() {
        Ok(mut tenant) => {
            tenant.attach(host);
            true
        }
        Err(_) => false,
    }
}

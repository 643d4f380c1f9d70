//! Discrete-event director.
//!
//! A [`Director`] owns a set of actors, the connections between their ports
//! and a [`CalendarQueue`](crate::queue::CalendarQueue) of pending firings. It
//! executes the actors in superdense time: all events with the same tag are
//! processed within a single iteration, in order of depth, before the tag
//! advances.
//!
//! # Lifecycle
//!
//! An execution goes through the following phases:
//!
//! 1. [`preinitialize()`](Director::preinitialize): validates the
//!    configuration, computes depths and preinitializes the actors,
//! 2. [`initialize()`](Director::initialize): resets the model time and lets
//!    actors schedule their first firings; if a stop time is set, an event at
//!    the stop time is scheduled so that the director reaches it,
//! 3. a sequence of [`iterate()`](Director::iterate) calls, each made of
//!    [`prefire()`](Director::prefire), [`fire()`](Director::fire) and
//!    [`postfire()`](Director::postfire), until `postfire` returns `false`,
//! 4. [`wrapup()`](Director::wrapup).
//!
//! [`run()`](Director::run) performs a whole execution.
//!
//! A director can also be embedded as the inner director of a
//! [`CompositeActor`](crate::actor::CompositeActor), in which case it draws
//! its model time from its enclosing director. See [`Executive`].
//!
//! # Depths
//!
//! Unless set explicitly, the depth of an actor is its rank in a topological
//! order of the actor graph, where connections leaving
//! [delay](crate::actor::Actor::is_delay) actors are ignored. A zero-delay
//! cycle is reported as [`SimulationError::CausalityLoop`]. The depth of an
//! input port is that of its actor unless set explicitly.
mod config;
mod context;
mod depth;
mod error;
mod kernel;

use std::fmt;

use petgraph::graph::NodeIndex;
use tracing::{debug, info, info_span, trace};

use crate::actor::{Actor, ActorId};
use crate::event::{Depth, Event, Target};
use crate::ports::{PortBuilder, PortId, PortKind, PortState, Token};
use crate::queue::CalendarQueue;
use crate::time::{Clock, Microstep, Tag, Time};

pub use config::DirectorConfig;
pub use context::{Context, Executive};
pub use error::SimulationError;

use depth::ActorGraph;
use kernel::{reborrow, Env, Kernel};

/// Lifecycle phase of a director.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The director has not been preinitialized yet.
    Created,
    /// The director was preinitialized.
    Preinitialized,
    /// The director was initialized and can be iterated.
    Initialized,
    /// The execution has been wrapped up.
    WrappedUp,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Preinitialized => "preinitialized",
            Self::Initialized => "initialized",
            Self::WrappedUp => "wrapped up",
        })
    }
}

/// Outcome of a single firing attempt within an iteration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FireOutcome {
    /// An actor was fired.
    Fired,
    /// An event targeting the container was consumed.
    Continue,
    /// No event can be processed at the current tag.
    NoMoreEvents,
}

/// A discrete-event director.
pub struct Director {
    config: DirectorConfig,
    actors: Vec<Box<dyn Actor>>,
    explicit_actor_depths: Vec<Option<Depth>>,
    kernel: Kernel,
    phase: Phase,
}

impl Director {
    /// Creates a director without actors.
    pub fn new(name: impl Into<String>, config: DirectorConfig) -> Self {
        Self {
            config,
            actors: Vec::new(),
            explicit_actor_depths: Vec::new(),
            kernel: Kernel::new(name.into()),
            phase: Phase::Created,
        }
    }

    /// Sets the clock used to synchronize a top-level execution with the wall
    /// clock.
    ///
    /// The clock is only consulted if
    /// [`DirectorConfig::synchronize_to_real_time`] is set, in which case
    /// the director blocks before processing each event until the clock
    /// reaches the event time. The default clock never blocks.
    pub fn set_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.kernel.clock = Box::new(clock);

        self
    }

    /// Returns the name of the director.
    pub fn name(&self) -> &str {
        &self.kernel.name
    }

    /// Returns the configuration of the director.
    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Adds an actor.
    ///
    /// The closure registers the ports of the actor and builds it.
    ///
    /// # Examples
    ///
    /// ```
    /// use superdense::actor::Actor;
    /// use superdense::director::{Context, Director, DirectorConfig, SimulationError};
    /// use superdense::ports::PortId;
    ///
    /// struct Forward {
    ///     input: PortId,
    ///     output: PortId,
    /// }
    ///
    /// impl Actor for Forward {
    ///     fn fire(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError> {
    ///         while let Some(token) = cx.get(self.input) {
    ///             cx.send(self.output, token)?;
    ///         }
    ///
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let mut director = Director::new("top", DirectorConfig::default());
    /// let forward = director.add_actor("forward", |ports| Forward {
    ///     input: ports.input("input"),
    ///     output: ports.output("output"),
    /// });
    ///
    /// assert!(director.port(forward, "output").is_some());
    /// ```
    pub fn add_actor<A, F>(&mut self, name: impl Into<String>, build: F) -> ActorId
    where
        A: Actor + 'static,
        F: FnOnce(&mut PortBuilder<'_>) -> A,
    {
        let id = ActorId(self.actors.len());
        let actor = build(&mut PortBuilder::new(
            &mut self.kernel.ports,
            Target::Actor(id),
        ));

        self.actors.push(Box::new(actor));
        self.explicit_actor_depths.push(None);
        self.kernel.actor_names.push(name.into());
        self.kernel.actor_depths.push(0);

        id
    }

    /// Adds a boundary input port, through which tokens enter the director
    /// from outside.
    pub fn add_boundary_input(&mut self, name: impl Into<String>) -> PortId {
        PortBuilder::new(&mut self.kernel.ports, Target::Container).input(name)
    }

    /// Adds a boundary output port, through which tokens leave the director.
    pub fn add_boundary_output(&mut self, name: impl Into<String>) -> PortId {
        PortBuilder::new(&mut self.kernel.ports, Target::Container).output(name)
    }

    /// Returns the first port of an actor with the specified name.
    pub fn port(&self, actor: ActorId, name: &str) -> Option<PortId> {
        self.find_port(Target::Actor(actor), name)
    }

    /// Returns the first boundary port with the specified name.
    pub fn boundary_port(&self, name: &str) -> Option<PortId> {
        self.find_port(Target::Container, name)
    }

    /// Returns the first actor with the specified name.
    pub fn actor(&self, name: &str) -> Option<ActorId> {
        self.kernel
            .actor_names
            .iter()
            .position(|actor_name| actor_name == name)
            .map(ActorId)
    }

    /// Returns the number of actors.
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Connects a source port to a destination port.
    ///
    /// Sources are actor output ports and boundary input ports; destinations
    /// are actor input ports and boundary output ports. A source may be
    /// connected to several destinations and a destination may be connected
    /// to several sources.
    pub fn connect(&mut self, from: PortId, to: PortId) -> Result<(), SimulationError> {
        let source = self.kernel.port(from)?;
        let destination = self.kernel.port(to)?;
        if !source.is_source() || !destination.is_destination() {
            return Err(SimulationError::InvalidConnection {
                from: self.port_path(from),
                to: self.port_path(to),
            });
        }

        self.kernel.ports[from.0].destinations.push(to);

        Ok(())
    }

    /// Sets the depth of an actor, overriding the topological sort.
    pub fn set_actor_depth(&mut self, actor: ActorId, depth: Depth) -> Result<(), SimulationError> {
        self.kernel.check_actor(actor)?;
        self.explicit_actor_depths[actor.0] = Some(depth);

        Ok(())
    }

    /// Sets the depth of an input port, overriding the depth of its actor.
    pub fn set_port_depth(&mut self, port: PortId, depth: Depth) -> Result<(), SimulationError> {
        self.kernel.port(port)?;
        self.kernel.ports[port.0].explicit_depth = Some(depth);

        Ok(())
    }

    /// Returns the depth of an actor, as established at preinitialization.
    pub fn actor_depth(&self, actor: ActorId) -> Option<Depth> {
        self.kernel.actor_depths.get(actor.0).copied()
    }

    /// Returns the depth of a port, as established at preinitialization.
    pub fn port_depth(&self, port: PortId) -> Option<Depth> {
        self.kernel.ports.get(port.0).map(|state| state.depth)
    }

    /// Prepares the director and its actors for an execution.
    pub fn preinitialize(&mut self) -> Result<(), SimulationError> {
        if !matches!(self.phase, Phase::Created | Phase::WrappedUp) {
            return Err(self.invalid_phase("preinitialize"));
        }

        self.config.validate()?;
        self.kernel.queue = CalendarQueue::new(self.config.queue_config());
        self.kernel.microstep_limit = self.config.microstep_limit;
        self.kernel.enforce_microstep_semantics = self.config.enforce_microstep_semantics;
        self.kernel.synchronize_to_real_time = self.config.synchronize_to_real_time;

        self.compute_depths()?;

        for (idx, actor) in self.actors.iter_mut().enumerate() {
            let _span = info_span!("actor", name = %self.kernel.actor_names[idx]).entered();
            actor.preinitialize()?;
        }

        self.phase = Phase::Preinitialized;
        info!(
            director = %self.kernel.name,
            actors = self.actors.len(),
            "preinitialized"
        );

        Ok(())
    }

    /// Initializes a top-level execution.
    ///
    /// Model time is set to the configured start time at microstep 0.
    pub fn initialize(&mut self) -> Result<(), SimulationError> {
        self.initialize_in(None)
    }

    /// Initializes an execution embedded in an enclosing director.
    ///
    /// Model time and stop time are taken from the enclosing director.
    pub fn initialize_embedded(&mut self, env: &mut dyn Executive) -> Result<(), SimulationError> {
        self.initialize_in(Some(env))
    }

    /// Checks whether the director is ready to fire.
    ///
    /// A top-level director is always ready.
    pub fn prefire(&mut self) -> Result<bool, SimulationError> {
        self.prefire_in(None)
    }

    /// Synchronizes an embedded director with its enclosing director and
    /// checks whether it is ready to fire.
    ///
    /// An error is returned if an event earlier than the current time of the
    /// enclosing director was missed.
    pub fn prefire_embedded(&mut self, env: &mut dyn Executive) -> Result<bool, SimulationError> {
        self.prefire_in(Some(env))
    }

    /// Fires all actors scheduled at the next tag.
    pub fn fire(&mut self) -> Result<(), SimulationError> {
        self.fire_in(None)
    }

    /// Fires all actors scheduled at tags not later than the current tag of
    /// the enclosing director.
    pub fn fire_embedded(&mut self, env: &mut dyn Executive) -> Result<(), SimulationError> {
        self.fire_in(Some(env))
    }

    /// Concludes an iteration and checks whether the execution should
    /// continue.
    pub fn postfire(&mut self) -> Result<bool, SimulationError> {
        self.postfire_in(None)
    }

    /// Concludes an iteration of an embedded director, requesting from the
    /// enclosing director the firings needed to process pending events.
    pub fn postfire_embedded(&mut self, env: &mut dyn Executive) -> Result<bool, SimulationError> {
        self.postfire_in(Some(env))
    }

    /// Performs one iteration of a top-level execution.
    ///
    /// Returns `false` when the execution has come to an end.
    pub fn iterate(&mut self) -> Result<bool, SimulationError> {
        if self.prefire()? {
            self.fire()?;
        }

        self.postfire()
    }

    /// Performs a whole top-level execution, from preinitialization to
    /// wrap-up.
    ///
    /// Actors are wrapped up even if the execution fails, in which case the
    /// first error is returned.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        self.preinitialize()?;

        let result = self.execute();
        let wrapup = self.wrapup();

        result.and(wrapup)
    }

    /// Ends an execution.
    ///
    /// All actors are wrapped up even if some of them fail, in which case the
    /// first error is returned. Pending events and tokens are discarded.
    pub fn wrapup(&mut self) -> Result<(), SimulationError> {
        match self.phase {
            Phase::Preinitialized | Phase::Initialized => {}
            Phase::WrappedUp => return Ok(()),
            Phase::Created => return Err(self.invalid_phase("wrapup")),
        }

        let mut result = Ok(());
        for (idx, actor) in self.actors.iter_mut().enumerate() {
            let _span = info_span!("actor", name = %self.kernel.actor_names[idx]).entered();
            if let Err(e) = actor.wrapup() {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }

        self.kernel.queue.clear();
        for port in &mut self.kernel.ports {
            port.receiver.clear();
        }
        self.phase = Phase::WrappedUp;
        info!(director = %self.kernel.name, tag = %self.kernel.tag(), "wrapped up");

        result
    }

    /// Requests a firing of an actor from outside the director.
    ///
    /// The same rules as for [`Context::fire_at_tag()`] apply.
    pub fn fire_at(
        &mut self,
        actor: ActorId,
        time: Time,
        microstep: Microstep,
    ) -> Result<Time, SimulationError> {
        self.check_phase(Phase::Initialized, "fire_at")?;
        self.kernel.check_actor(actor)?;

        self.kernel
            .fire_at(None, Target::Actor(actor), time, microstep)
    }

    /// Delivers a token to a boundary input port.
    ///
    /// The actors connected to the port are scheduled to fire at the current
    /// tag of the director.
    pub fn deliver(&mut self, port: PortId, token: impl Into<Token>) -> Result<(), SimulationError> {
        self.check_phase(Phase::Initialized, "deliver")?;
        let state = self.kernel.port(port)?;
        if state.owner != Target::Container || state.kind != PortKind::Input {
            return Err(SimulationError::InvalidPort {
                port: self.port_path(port),
                reason: "tokens can only be delivered to boundary input ports",
            });
        }

        self.kernel.send(port, token.into())
    }

    /// Removes and returns the oldest token that reached a boundary output
    /// port.
    pub fn take_output(&mut self, port: PortId) -> Option<Token> {
        self.kernel
            .ports
            .get_mut(port.0)
            .filter(|state| state.owner == Target::Container && state.kind == PortKind::Output)
            .and_then(|state| state.receiver.get())
    }

    /// Cancels a pending event.
    ///
    /// Returns `true` if the event was found.
    pub fn cancel(&mut self, event: &Event) -> bool {
        self.kernel.queue.remove(event)
    }

    /// Returns the current model time.
    pub fn model_time(&self) -> Time {
        self.kernel.time
    }

    /// Returns the current microstep.
    pub fn microstep(&self) -> Microstep {
        self.kernel.microstep
    }

    /// Returns the current tag.
    pub fn tag(&self) -> Tag {
        self.kernel.tag()
    }

    /// Returns the stop time of the current execution.
    pub fn stop_time(&self) -> Time {
        self.kernel.stop_time
    }

    /// Returns the tag of the earliest pending event, if any.
    pub fn next_event_tag(&mut self) -> Option<Tag> {
        self.kernel.queue.get().map(Event::tag)
    }

    /// Returns all pending events in processing order.
    pub fn pending_events(&self) -> Vec<Event> {
        self.kernel.queue.to_vec()
    }

    /// Checks whether an actor was disabled by returning `false` from
    /// [`postfire()`](Actor::postfire).
    pub fn is_disabled(&self, actor: ActorId) -> bool {
        self.kernel.disabled_actors.contains(&actor)
    }

    /// Checks whether the execution ended because the next event lay beyond
    /// the stop time.
    pub fn exceeded_stop_time(&self) -> bool {
        self.kernel.exceed_stop_time
    }

    /// Returns the lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn initialize_in(&mut self, env: Env<'_>) -> Result<(), SimulationError> {
        if !matches!(self.phase, Phase::Preinitialized | Phase::Initialized) {
            return Err(self.invalid_phase("initialize"));
        }

        let mut env = env;
        match &env {
            Some(outer) => {
                self.kernel
                    .reset(outer.model_time(), outer.microstep(), outer.model_stop_time());
            }
            None => {
                self.kernel
                    .reset(self.config.start(), 0, self.config.stop());
            }
        }

        self.kernel.is_initializing = true;
        let result = self.initialize_actors(&mut env);
        self.kernel.is_initializing = false;
        result?;

        if self.kernel.stop_time.is_finite() {
            let stop_time = self.kernel.stop_time;
            self.kernel.enqueue_event(Target::Container, stop_time, 1)?;
        }

        if let Some(outer) = &mut env {
            if let Some(next) = self.kernel.queue.get() {
                let Tag { time, microstep } = next.tag();
                request_firing(&mut **outer, time, microstep)?;
            }
        }

        self.phase = Phase::Initialized;
        info!(
            director = %self.kernel.name,
            tag = %self.kernel.tag(),
            stop_time = %self.kernel.stop_time,
            "initialized"
        );

        Ok(())
    }

    fn initialize_actors(&mut self, env: &mut Env<'_>) -> Result<(), SimulationError> {
        for (idx, actor) in self.actors.iter_mut().enumerate() {
            let _span = info_span!("actor", name = %self.kernel.actor_names[idx]).entered();
            let mut cx = Context::new(&mut self.kernel, ActorId(idx), reborrow(env));
            actor.initialize(&mut cx)?;
        }

        Ok(())
    }

    fn prefire_in(&mut self, env: Env<'_>) -> Result<bool, SimulationError> {
        self.check_phase(Phase::Initialized, "prefire")?;

        if let Some(outer) = env {
            let outer_time = outer.model_time();
            let outer_microstep = outer.microstep();
            let current = self.kernel.tag();
            if outer_time < current.time {
                return Err(SimulationError::TagRegression {
                    next: Tag::new(outer_time, outer_microstep),
                    current,
                });
            }

            self.kernel.microstep = if outer_time > current.time {
                outer_microstep
            } else {
                outer_microstep.max(current.microstep)
            };
            self.kernel.time = outer_time;

            if let Some(next) = self.kernel.queue.get() {
                if next.time() < outer_time {
                    return Err(SimulationError::TagRegression {
                        next: next.tag(),
                        current: self.kernel.tag(),
                    });
                }
            }
        }

        trace!(director = %self.kernel.name, tag = %self.kernel.tag(), "prefire");

        Ok(true)
    }

    fn fire_in(&mut self, env: Env<'_>) -> Result<(), SimulationError> {
        self.check_phase(Phase::Initialized, "fire")?;

        let mut env = env;
        self.kernel.no_more_actors_to_fire = false;
        loop {
            if self.fire_next(&mut env)? == FireOutcome::NoMoreEvents {
                return Ok(());
            }
            if !self.kernel.check_for_next_event()? {
                return Ok(());
            }
        }
    }

    /// Fires the actor targeted by the next event, if any.
    fn fire_next(&mut self, env: &mut Env<'_>) -> Result<FireOutcome, SimulationError> {
        let actor = match self.kernel.next_actor_to_fire(env)? {
            None => {
                self.kernel.no_more_actors_to_fire = self.kernel.queue.is_empty();

                return Ok(FireOutcome::NoMoreEvents);
            }
            Some(Target::Container) => {
                trace!(tag = %self.kernel.tag(), "container event consumed");

                return Ok(FireOutcome::Continue);
            }
            Some(Target::Actor(actor)) => actor,
        };

        let _span = info_span!("actor", name = %self.kernel.actor_names[actor.0]).entered();
        let tag = self.kernel.tag();
        debug!(tag = %tag, "firing");

        let mut cx = Context::new(&mut self.kernel, actor, reborrow(env));
        let fired = &mut self.actors[actor.0];
        let keep_enabled = with_firing_tag(tag, || -> Result<bool, SimulationError> {
            if !fired.prefire(&mut cx)? {
                debug!("prefire returned false");

                return Ok(true);
            }
            fired.fire(&mut cx)?;

            fired.postfire(&mut cx)
        })?;

        if !keep_enabled {
            debug!("disabled");
            self.kernel.disabled_actors.insert(actor);
        }

        Ok(FireOutcome::Fired)
    }

    fn postfire_in(&mut self, env: Env<'_>) -> Result<bool, SimulationError> {
        self.check_phase(Phase::Initialized, "postfire")?;

        let mut env = env;
        let kernel = &mut self.kernel;

        let keep_going = if env.is_some() && kernel.has_pending_outputs() {
            // Outputs are transferred one token at a time, so the container
            // must be fired again at the current time.
            if let Some(outer) = &mut env {
                request_firing(&mut **outer, kernel.time, kernel.microstep)?;
            }

            true
        } else if kernel.no_more_actors_to_fire
            && ((env.is_none() && self.config.stop_when_queue_is_empty)
                || kernel.time == kernel.stop_time)
        {
            kernel.exceed_stop_time = true;

            false
        } else if kernel.exceed_stop_time {
            false
        } else {
            if let (Some(outer), Some(next)) = (&mut env, kernel.queue.get()) {
                let Tag { time, microstep } = next.tag();
                request_firing(&mut **outer, time, microstep)?;
            }

            true
        };

        trace!(
            director = %kernel.name,
            tag = %kernel.tag(),
            keep_going,
            "postfire"
        );

        Ok(keep_going)
    }

    /// Runs the iterations of a top-level execution.
    fn execute(&mut self) -> Result<(), SimulationError> {
        self.initialize()?;

        while self.iterate()? {
            if self.kernel.queue.is_empty() && self.kernel.no_more_actors_to_fire {
                info!(director = %self.kernel.name, "event queue exhausted");
                break;
            }
        }

        Ok(())
    }

    fn compute_depths(&mut self) -> Result<(), SimulationError> {
        let actor_count = self.actors.len();

        if self.explicit_actor_depths.iter().any(Option::is_none) {
            let mut graph = ActorGraph::with_capacity(actor_count, 0);
            for _ in 0..actor_count {
                graph.add_node(());
            }
            for port in &self.kernel.ports {
                let Target::Actor(from) = port.owner else {
                    continue;
                };
                if port.kind != PortKind::Output || self.actors[from.0].is_delay() {
                    continue;
                }
                for destination in &port.destinations {
                    if let Target::Actor(to) = self.kernel.ports[destination.0].owner {
                        graph.add_edge(NodeIndex::new(from.0), NodeIndex::new(to.0), ());
                    }
                }
            }

            let depths = depth::topological_depths(&graph).map_err(|nodes| {
                SimulationError::CausalityLoop {
                    actors: nodes
                        .into_iter()
                        .map(|node| self.kernel.actor_names[node].clone())
                        .collect(),
                }
            })?;
            self.kernel.actor_depths = depths;
        } else {
            self.kernel.actor_depths = vec![0; actor_count];
        }

        for (depth, explicit) in self
            .kernel
            .actor_depths
            .iter_mut()
            .zip(&self.explicit_actor_depths)
        {
            if let Some(explicit) = explicit {
                *depth = *explicit;
            }
        }

        let actor_depths = &self.kernel.actor_depths;
        for port in &mut self.kernel.ports {
            port.depth = match (port.explicit_depth, port.owner) {
                (Some(depth), _) => depth,
                (None, Target::Actor(actor)) => actor_depths[actor.0],
                (None, Target::Container) => 0,
            };
        }

        debug!(depths = ?self.kernel.actor_depths, "actor depths computed");

        Ok(())
    }

    fn find_port(&self, owner: Target, name: &str) -> Option<PortId> {
        self.kernel
            .ports
            .iter()
            .position(|state: &PortState| state.owner == owner && state.name == name)
            .map(PortId)
    }

    /// Returns a qualified name of a port for error reporting.
    fn port_path(&self, port: PortId) -> String {
        match self.kernel.ports.get(port.0) {
            Some(state) => format!("{}.{}", self.kernel.target_name(state.owner), state.name),
            None => format!("#{}", port.0),
        }
    }

    fn check_phase(&self, expected: Phase, operation: &'static str) -> Result<(), SimulationError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(self.invalid_phase(operation))
        }
    }

    fn invalid_phase(&self, operation: &'static str) -> SimulationError {
        SimulationError::InvalidPhase {
            operation,
            phase: self.phase,
        }
    }
}

impl fmt::Debug for Director {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Director")
            .field("name", &self.kernel.name)
            .field("phase", &self.phase)
            .field("actor_count", &self.actors.len())
            .field("kernel", &self.kernel)
            .finish_non_exhaustive()
    }
}

/// Asks the enclosing director for a firing at the specified tag.
fn request_firing(
    outer: &mut dyn Executive,
    time: Time,
    microstep: Microstep,
) -> Result<(), SimulationError> {
    let granted = outer.fire_container_at(time, microstep)?;
    if granted != time {
        return Err(SimulationError::TimingIncompatibility {
            requested: time,
            granted,
        });
    }

    Ok(())
}

/// Runs a closure with the tag of the firing made available to the simulation
/// time formatter.
fn with_firing_tag<R>(tag: Tag, f: impl FnOnce() -> R) -> R {
    #[cfg(feature = "tracing")]
    {
        crate::tracing::FIRING_TAG.set(&tag, f)
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = tag;
        f()
    }
}

use crate::director::{Context, Director, SimulationError};
use crate::ports::PortId;

use super::Actor;

/// An actor encapsulating an embedded director and its actors.
///
/// The inner director follows the model time of the enclosing director and
/// requests firings of the composite actor whenever its own events require
/// so.
///
/// Tokens received on an input port of the composite actor are delivered to
/// the associated boundary input port of the inner director before it fires.
/// After the inner director has fired, at most one token per boundary output
/// port is sent through the associated output port of the composite actor;
/// remaining tokens are sent in later firings at the same model time.
///
/// # Examples
///
/// ```
/// use superdense::actor::CompositeActor;
/// use superdense::director::{Director, DirectorConfig};
///
/// let mut inner = Director::new("inner", DirectorConfig::default());
/// let inner_input = inner.add_boundary_input("input");
/// let inner_output = inner.add_boundary_output("output");
/// inner.connect(inner_input, inner_output).unwrap();
///
/// let mut outer = Director::new("outer", DirectorConfig::default());
/// let composite = outer.add_actor("composite", |ports| {
///     CompositeActor::new(inner)
///         .with_input(ports.input("input"), inner_input)
///         .with_output(inner_output, ports.output("output"))
/// });
/// # let _ = composite;
/// ```
#[derive(Debug)]
pub struct CompositeActor {
    director: Director,
    /// Pairs of an input port of the composite and a boundary input port.
    inputs: Vec<(PortId, PortId)>,
    /// Pairs of a boundary output port and an output port of the composite.
    outputs: Vec<(PortId, PortId)>,
}

impl CompositeActor {
    /// Creates a composite actor around an inner director.
    pub fn new(director: Director) -> Self {
        Self {
            director,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Forwards the tokens received on an input port of the composite actor
    /// to a boundary input port of the inner director.
    pub fn with_input(mut self, outer: PortId, inner: PortId) -> Self {
        self.inputs.push((outer, inner));

        self
    }

    /// Forwards the tokens reaching a boundary output port of the inner
    /// director through an output port of the composite actor.
    pub fn with_output(mut self, inner: PortId, outer: PortId) -> Self {
        self.outputs.push((inner, outer));

        self
    }

    /// Returns the inner director.
    pub fn director(&self) -> &Director {
        &self.director
    }
}

impl Actor for CompositeActor {
    fn preinitialize(&mut self) -> Result<(), SimulationError> {
        self.director.preinitialize()
    }

    fn initialize(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError> {
        self.director.initialize_embedded(cx)
    }

    fn prefire(&mut self, cx: &mut Context<'_>) -> Result<bool, SimulationError> {
        self.director.prefire_embedded(cx)
    }

    fn fire(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError> {
        for &(outer, inner) in &self.inputs {
            while let Some(token) = cx.get(outer) {
                self.director.deliver(inner, token)?;
            }
        }

        self.director.fire_embedded(cx)?;

        for &(inner, outer) in &self.outputs {
            if let Some(token) = self.director.take_output(inner) {
                cx.send(outer, token)?;
            }
        }

        Ok(())
    }

    fn postfire(&mut self, cx: &mut Context<'_>) -> Result<bool, SimulationError> {
        self.director.postfire_embedded(cx)
    }

    fn wrapup(&mut self) -> Result<(), SimulationError> {
        self.director.wrapup()
    }
}

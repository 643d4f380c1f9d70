//! Ports, receivers and tokens.
//!
//! Ports are registered with a [`Director`](crate::director::Director) and
//! referred to by [`PortId`]. A port belongs either to an actor or to the
//! container of the director, in which case it is a *boundary* port through
//! which tokens cross the hierarchy (see
//! [`CompositeActor`](crate::actor::CompositeActor)).
//!
//! Tokens flow from a source port to all connected destination ports:
//!
//! * sources are actor output ports and boundary input ports,
//! * destinations are actor input ports and boundary output ports.
//!
//! Each destination port owns a FIFO receiver. Putting a token into the
//! receiver of an actor input port schedules a trigger event for that actor at
//! the current tag (or at microstep 1 if the current microstep is 0), while
//! tokens reaching a boundary output port are only stored until they are
//! transferred to the outside.
use std::collections::VecDeque;
use std::fmt;

use crate::event::{Depth, Target};

/// Identifier of a port registered with a director.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortId(pub(crate) usize);

impl PortId {
    /// Returns the index of the port within its director.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Direction of a port, as seen from the outside of its owner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// The port receives tokens.
    Input,
    /// The port emits tokens.
    Output,
}

/// A dynamically typed value carried between ports.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// A pure signal without value.
    Unit,
    /// A boolean value.
    Boolean(bool),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Double(f64),
    /// A string value.
    String(String),
}

impl Token {
    /// Returns the boolean value, if this is a boolean token.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer token.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value of a numerical token as a double; integers are
    /// converted.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(x) => Some(*x),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the string value, if this is a string token.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => write!(f, "()"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Double(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<()> for Token {
    fn from(_: ()) -> Self {
        Self::Unit
    }
}

impl From<bool> for Token {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Token {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Token {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// A single-channel FIFO receiver.
#[derive(Clone, Debug, Default)]
pub(crate) struct Receiver {
    tokens: VecDeque<Token>,
}

impl Receiver {
    pub(crate) fn put(&mut self, token: Token) {
        self.tokens.push_back(token);
    }

    pub(crate) fn get(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    pub(crate) fn has_token(&self) -> bool {
        !self.tokens.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.tokens.len()
    }

    pub(crate) fn clear(&mut self) {
        self.tokens.clear();
    }
}

/// Bookkeeping data of a registered port.
#[derive(Debug)]
pub(crate) struct PortState {
    pub(crate) name: String,
    pub(crate) owner: Target,
    pub(crate) kind: PortKind,
    pub(crate) destinations: Vec<PortId>,
    pub(crate) receiver: Receiver,
    /// Depth supplied by the user, if any.
    pub(crate) explicit_depth: Option<Depth>,
    /// Depth in effect, established at preinitialization.
    pub(crate) depth: Depth,
}

impl PortState {
    pub(crate) fn new(name: String, owner: Target, kind: PortKind) -> Self {
        Self {
            name,
            owner,
            kind,
            destinations: Vec::new(),
            receiver: Receiver::default(),
            explicit_depth: None,
            depth: 0,
        }
    }

    /// Checks whether tokens can be sent from this port.
    pub(crate) fn is_source(&self) -> bool {
        matches!(
            (self.owner, self.kind),
            (Target::Actor(_), PortKind::Output) | (Target::Container, PortKind::Input)
        )
    }

    /// Checks whether this port owns a receiver.
    pub(crate) fn is_destination(&self) -> bool {
        !self.is_source()
    }
}

/// Registers the ports of an actor being added to a director.
///
/// See [`Director::add_actor()`](crate::director::Director::add_actor).
pub struct PortBuilder<'a> {
    ports: &'a mut Vec<PortState>,
    owner: Target,
}

impl<'a> PortBuilder<'a> {
    pub(crate) fn new(ports: &'a mut Vec<PortState>, owner: Target) -> Self {
        Self { ports, owner }
    }

    /// Registers an input port.
    pub fn input(&mut self, name: impl Into<String>) -> PortId {
        self.add(name.into(), PortKind::Input)
    }

    /// Registers an output port.
    pub fn output(&mut self, name: impl Into<String>) -> PortId {
        self.add(name.into(), PortKind::Output)
    }

    fn add(&mut self, name: String, kind: PortKind) -> PortId {
        let id = PortId(self.ports.len());
        self.ports.push(PortState::new(name, self.owner, kind));

        id
    }
}

impl fmt::Debug for PortBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortBuilder")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

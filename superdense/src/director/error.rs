use std::error::Error;
use std::fmt;

use crate::actor::ActorId;
use crate::ports::PortId;
use crate::time::{Tag, Time};

use super::Phase;

/// An error returned by a director or an actor.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum SimulationError {
    /// An event was requested at a tag earlier than the current tag.
    EventInPast {
        /// Name of the actor or container targeted by the event.
        actor: String,
        /// Requested tag.
        requested: Tag,
        /// Current tag of the director.
        current: Tag,
    },
    /// A firing was requested at a microstep beyond the configured limit.
    MicrostepOverflow {
        /// Name of the actor or container targeted by the firing.
        actor: String,
        /// Timestamp of the requested firing.
        time: Time,
    },
    /// The next event of the queue lies before the current tag.
    TagRegression {
        /// Tag of the offending event.
        next: Tag,
        /// Current tag of the director.
        current: Tag,
    },
    /// The enclosing director granted a firing at a time other than the one
    /// requested by an embedded director.
    TimingIncompatibility {
        /// Requested firing time.
        requested: Time,
        /// Firing time granted by the enclosing director.
        granted: Time,
    },
    /// The actor graph contains a zero-delay cycle.
    CausalityLoop {
        /// Names of the actors involved in cycles.
        actors: Vec<String>,
    },
    /// A connection cannot be made between two ports.
    InvalidConnection {
        /// Name of the source port.
        from: String,
        /// Name of the destination port.
        to: String,
    },
    /// A port was used in a way its role does not permit.
    InvalidPort {
        /// Name of the port.
        port: String,
        /// Description of the misuse.
        reason: &'static str,
    },
    /// The port identifier is not registered with the director.
    UnknownPort(PortId),
    /// The actor identifier is not registered with the director.
    UnknownActor(ActorId),
    /// A configuration parameter is invalid.
    InvalidConfig(String),
    /// A lifecycle operation was invoked in the wrong phase.
    InvalidPhase {
        /// Name of the operation.
        operation: &'static str,
        /// Phase of the director.
        phase: Phase,
    },
    /// An actor reported a failure.
    ActorFailed {
        /// Name of the actor.
        actor: String,
        /// Description of the failure.
        message: String,
    },
}

impl SimulationError {
    /// Checks whether the error denotes a breach of the scheduling
    /// invariants, as opposed to a modeling or usage error.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::EventInPast { .. }
                | Self::MicrostepOverflow { .. }
                | Self::TagRegression { .. }
                | Self::TimingIncompatibility { .. }
        )
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EventInPast {
                actor,
                requested,
                current,
            } => write!(
                f,
                "actor '{actor}' requested a firing at {requested}, which is earlier than the current tag {current}"
            ),
            Self::MicrostepOverflow { actor, time } => write!(
                f,
                "microstep overflow while scheduling a firing of actor '{actor}' at time {time}"
            ),
            Self::TagRegression { next, current } => write!(
                f,
                "the next event tag {next} lies before the current tag {current}"
            ),
            Self::TimingIncompatibility { requested, granted } => write!(
                f,
                "the enclosing director granted a firing at time {granted} instead of {requested}"
            ),
            Self::CausalityLoop { actors } => {
                write!(f, "zero-delay causality loop involving actors: ")?;
                for (i, actor) in actors.iter().enumerate() {
                    if i != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{actor}'")?;
                }

                Ok(())
            }
            Self::InvalidConnection { from, to } => {
                write!(f, "port '{from}' cannot be connected to port '{to}'")
            }
            Self::InvalidPort { port, reason } => write!(f, "port '{port}': {reason}"),
            Self::UnknownPort(port) => write!(f, "no port with index {}", port.index()),
            Self::UnknownActor(actor) => write!(f, "no actor with index {}", actor.index()),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::InvalidPhase { operation, phase } => write!(
                f,
                "operation '{operation}' cannot be performed while the director is {phase}"
            ),
            Self::ActorFailed { actor, message } => write!(f, "actor '{actor}' failed: {message}"),
        }
    }
}

impl Error for SimulationError {}

//! A discrete-event execution kernel in superdense time.
//!
//! Superdense is a scheduler for actor-oriented models: actors exchange
//! tokens through ports and request to be fired at future points in model
//! time. Time is *superdense*: each event carries a [tag](time::Tag) made of a
//! real-valued timestamp and a microstep, which orders zero-delay chains of
//! causally related events occurring at the same timestamp.
//!
//! The crate is made of two layers:
//!
//! * a [`CalendarQueue`](queue::CalendarQueue), an adaptive bucketed priority
//!   queue of [events](event::Event) with *O*(1) amortized insertion and
//!   extraction, which orders simultaneous events by depth so that upstream
//!   actors fire before downstream ones,
//! * a [`Director`](director::Director), which drives the actors through their
//!   lifecycle and fires them in tag order. Directors can be nested by means
//!   of [`CompositeActor`](actor::CompositeActor)s, in which case the inner
//!   director follows the model time of the outer one.
//!
//!
//! # A practical overview
//!
//! Simulating a model typically involves three activities:
//!
//! 1. the implementation of the [`Actor`](actor::Actor) trait for each kind of
//!    component,
//! 2. the assembly of a model by adding actors to a director and connecting
//!    their ports,
//! 3. the execution of the model, either in one go with
//!    [`Director::run()`](director::Director::run) or iteration by iteration.
//!
//! The following model is made of a ticker, which emits an incrementing
//! counter every second, and of a recorder which collects the counter values:
//!
//! ```text
//!                ┌────────┐           ┌──────────┐
//!                │        │   i64     │          │
//!                │ Ticker ├──────────▶│ Recorder │
//!                │        │           │          │
//!                └────────┘           └──────────┘
//! ```
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use superdense::actor::Actor;
//! use superdense::director::{Context, Director, DirectorConfig, SimulationError};
//! use superdense::ports::PortId;
//! use superdense::time::Time;
//!
//! struct Ticker {
//!     output: PortId,
//!     count: i64,
//! }
//!
//! impl Actor for Ticker {
//!     fn initialize(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError> {
//!         cx.fire_at(Time::ZERO)?;
//!
//!         Ok(())
//!     }
//!
//!     fn fire(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError> {
//!         cx.send(self.output, self.count)
//!     }
//!
//!     fn postfire(&mut self, cx: &mut Context<'_>) -> Result<bool, SimulationError> {
//!         self.count += 1;
//!         cx.fire_at(Time::from_secs(cx.time().as_secs() + 1.0))?;
//!
//!         Ok(true)
//!     }
//! }
//!
//! struct Recorder {
//!     input: PortId,
//!     values: Rc<RefCell<Vec<i64>>>,
//! }
//!
//! impl Actor for Recorder {
//!     fn fire(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError> {
//!         while let Some(token) = cx.get(self.input) {
//!             let value = token.as_int().ok_or_else(|| cx.failure("integer expected"))?;
//!             self.values.borrow_mut().push(value);
//!         }
//!
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), SimulationError> {
//! let values = Rc::new(RefCell::new(Vec::new()));
//!
//! // Assembly.
//! let mut director = Director::new("top", DirectorConfig::default().with_stop_time(3.0));
//! let ticker = director.add_actor("ticker", |ports| Ticker {
//!     output: ports.output("output"),
//!     count: 0,
//! });
//! let recorder = director.add_actor("recorder", |ports| Recorder {
//!     input: ports.input("input"),
//!     values: values.clone(),
//! });
//! let output = director.port(ticker, "output").unwrap();
//! let input = director.port(recorder, "input").unwrap();
//! director.connect(output, input)?;
//!
//! // Execution.
//! director.run()?;
//!
//! assert_eq!(*values.borrow(), vec![0, 1, 2, 3]);
//! assert!(director.exceeded_stop_time());
//! # Ok(())
//! # }
//! ```
//!
//!
//! # Feature flags
//!
//! * `tracing`: provides a [`tracing-subscriber`] timer which stamps log
//!   events with the tag of the actor firing during which they were emitted,
//!   see the [`tracing`](crate::tracing) module,
//! * `serde`: implements `Serialize` and `Deserialize` for
//!   [`DirectorConfig`](director::DirectorConfig).
//!
//! [`tracing-subscriber`]: https://docs.rs/tracing-subscriber
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod actor;
pub mod director;
pub mod event;
#[cfg(feature = "tracing")]
pub(crate) mod macros;
pub mod ports;
pub mod queue;
pub mod time;
#[cfg(feature = "tracing")]
pub mod tracing;

//! Event scheduling by a top-level director.

use std::cell::Cell;
use std::rc::Rc;

use superdense::actor::Actor;
use superdense::director::{Context, Director, DirectorConfig, Phase, SimulationError};
use superdense::event::Target;
use superdense::ports::{PortId, Token};
use superdense::time::{Tag, Time};

use crate::common::{Chain, Delay, Log, Pulse, Recorder, Relay, Values};

/// Requests firings at predefined tags during initialization.
struct Requests {
    tags: Vec<(f64, u32)>,
    log: Log,
}

impl Actor for Requests {
    fn initialize(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError> {
        for &(time, microstep) in &self.tags {
            cx.fire_at_tag(Time::from_secs(time), microstep)?;
        }

        Ok(())
    }

    fn fire(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError> {
        self.log.record(cx);

        Ok(())
    }
}

fn requests(tags: &[(f64, u32)], log: &Log) -> Requests {
    Requests {
        tags: tags.to_vec(),
        log: log.clone(),
    }
}

#[test]
fn duplicate_firing_requests_are_merged() {
    let log = Log::new();
    let mut director = Director::new("top", DirectorConfig::default());
    director.add_actor("a", |_| requests(&[(1.0, 0), (1.0, 0)], &log));

    director.preinitialize().unwrap();
    director.initialize().unwrap();
    assert_eq!(director.pending_events().len(), 1);

    while director.iterate().unwrap() {}
    director.wrapup().unwrap();

    assert_eq!(log.tags_of("a"), vec![(1.0, 0)]);
}

#[test]
fn run_without_stop_time_ends_when_the_queue_is_exhausted() {
    let log = Log::new();
    let config = DirectorConfig::default().with_stop_when_queue_is_empty(false);
    let mut director = Director::new("top", config);
    director.add_actor("pulse", |ports| Pulse::new(ports.output("out"), &[1.0, 2.0], &log));

    director.run().unwrap();

    assert_eq!(log.tags_of("pulse"), vec![(1.0, 1), (2.0, 1)]);
    assert_eq!(director.phase(), Phase::WrappedUp);
}

#[test]
fn iterations_continue_past_an_empty_queue_without_stop_time() {
    let log = Log::new();
    let config = DirectorConfig::default().with_stop_when_queue_is_empty(false);
    let mut director = Director::new("top", config);
    director.add_actor("pulse", |ports| Pulse::new(ports.output("out"), &[1.0, 2.0], &log));

    director.preinitialize().unwrap();
    director.initialize().unwrap();
    while !director.pending_events().is_empty() {
        assert!(director.iterate().unwrap());
    }
    assert_eq!(log.tags_of("pulse"), vec![(1.0, 1), (2.0, 1)]);

    // Without a stop time, the director may still be fed from outside.
    for _ in 0..3 {
        assert!(director.iterate().unwrap());
    }
    assert!(!director.exceeded_stop_time());
    director.wrapup().unwrap();
}

#[test]
fn simultaneous_events_fire_by_increasing_depth() {
    let log = Log::new();
    let mut director = Director::new("top", DirectorConfig::default());
    let x = director.add_actor("x", |_| requests(&[(3.0, 0)], &log));
    let y = director.add_actor("y", |_| requests(&[(3.0, 0)], &log));
    director.set_actor_depth(x, 2).unwrap();
    director.set_actor_depth(y, 1).unwrap();

    director.run().unwrap();

    assert_eq!(director.actor_depth(x), Some(2));
    assert_eq!(log.firings(), vec![
        ("y".to_owned(), 3.0, 0),
        ("x".to_owned(), 3.0, 0)
    ]);
}

#[test]
fn depths_follow_the_actor_graph() {
    let log = Log::new();
    let values = Values::default();

    // Actors are added downstream first.
    let mut director = Director::new("top", DirectorConfig::default());
    let sink = director.add_actor("sink", |ports| Recorder::new(ports.input("in"), &values, &log));
    let middle = director.add_actor("middle", |ports| {
        Relay::new(ports.input("in"), ports.output("out"), &log)
    });
    let source = director.add_actor("source", |ports| Pulse::new(ports.output("out"), &[1.0], &log));

    director
        .connect(
            director.port(source, "out").unwrap(),
            director.port(middle, "in").unwrap(),
        )
        .unwrap();
    director
        .connect(
            director.port(middle, "out").unwrap(),
            director.port(sink, "in").unwrap(),
        )
        .unwrap();

    director.run().unwrap();

    assert_eq!(director.actor_depth(source), Some(0));
    assert_eq!(director.actor_depth(middle), Some(1));
    assert_eq!(director.actor_depth(sink), Some(2));
    assert_eq!(
        director.port_depth(director.port(sink, "in").unwrap()),
        Some(2)
    );
    assert_eq!(log.names(), vec!["source", "middle", "sink"]);
    assert_eq!(log.tags_of("sink"), vec![(1.0, 1)]);
    assert_eq!(*values.borrow(), vec![Token::Int(0)]);
}

#[test]
fn explicit_port_depth_overrides_actor_depth() {
    let log = Log::new();
    let values = Values::default();

    // Both recorders are triggered at the same tag; the port depth of the
    // first one pushes it after the second one.
    let mut director = Director::new("top", DirectorConfig::default());
    let source = director.add_actor("source", |ports| Pulse::new(ports.output("out"), &[1.0], &log));
    let first = director.add_actor("first", |ports| Recorder::new(ports.input("in"), &values, &log));
    let second = director.add_actor("second", |ports| Recorder::new(ports.input("in"), &values, &log));
    let out = director.port(source, "out").unwrap();
    let first_in = director.port(first, "in").unwrap();
    director.connect(out, first_in).unwrap();
    director
        .connect(out, director.port(second, "in").unwrap())
        .unwrap();
    director.set_port_depth(first_in, 10).unwrap();

    director.run().unwrap();

    assert_eq!(log.names(), vec!["source", "second", "first"]);
}

#[test]
fn firing_tags_never_decrease() {
    let log = Log::new();
    let values = Values::default();

    let mut director = Director::new("top", DirectorConfig::default().with_stop_time(20.0));
    let a = director.add_actor("a", |ports| {
        Pulse::new(ports.output("out"), &[0.0, 0.5, 3.25, 3.25, 7.0, 12.5], &log)
    });
    let b = director.add_actor("b", |ports| {
        Pulse::new(ports.output("out"), &[0.25, 3.25, 9.0, 19.0], &log)
    });
    let relay = director.add_actor("relay", |ports| {
        Relay::new(ports.input("in"), ports.output("out"), &log)
    });
    let delay = director.add_actor("delay", |ports| {
        Delay::new(ports.input("in"), ports.output("out"), 0.75)
    });
    let sink = director.add_actor("sink", |ports| Recorder::new(ports.input("in"), &values, &log));

    let relay_in = director.port(relay, "in").unwrap();
    let delay_in = director.port(delay, "in").unwrap();
    let sink_in = director.port(sink, "in").unwrap();
    director.connect(director.port(a, "out").unwrap(), relay_in).unwrap();
    director.connect(director.port(b, "out").unwrap(), delay_in).unwrap();
    director.connect(director.port(relay, "out").unwrap(), sink_in).unwrap();
    director.connect(director.port(delay, "out").unwrap(), sink_in).unwrap();
    director.add_actor("chain", |_| Chain::new(3.25, 0, 4, &log));

    director.run().unwrap();

    let tags: Vec<_> = log
        .firings()
        .into_iter()
        .map(|(_, time, microstep)| Tag::new(Time::from_secs(time), microstep))
        .collect();
    assert!(tags.len() > 20);
    assert!(tags.windows(2).all(|w| w[0] <= w[1]), "{tags:?}");

    // The 0.75s delay shifts the tokens of `b`.
    assert_eq!(values.borrow().len(), 6 + 4);
    assert!(log.tags_of("sink").contains(&(19.75, 1)));
}

#[test]
fn run_ends_when_the_queue_is_exhausted() {
    let log = Log::new();
    let mut director = Director::new("top", DirectorConfig::default());
    director.add_actor("a", |ports| Pulse::new(ports.output("out"), &[1.0, 2.0, 4.0], &log));

    director.preinitialize().unwrap();
    director.initialize().unwrap();

    let mut iterations = 0;
    while director.iterate().unwrap() {
        iterations += 1;
        assert!(iterations < 10);
    }

    // The last iteration finds the queue exhausted.
    assert_eq!(iterations, 2);
    assert_eq!(director.tag(), Tag::new(Time::from_secs(4.0), 1));
    assert_eq!(log.tags_of("a"), vec![(1.0, 1), (2.0, 1), (4.0, 1)]);
    director.wrapup().unwrap();
}

#[test]
fn run_ends_at_the_stop_tag() {
    let log = Log::new();
    let config = DirectorConfig::default()
        .with_stop_time(2.0)
        .with_stop_when_queue_is_empty(false);
    let mut director = Director::new("top", config);
    director.add_actor("a", |ports| Pulse::new(ports.output("out"), &[0.0], &log));

    director.preinitialize().unwrap();
    director.initialize().unwrap();

    let stop_event = director.pending_events().pop().unwrap();
    assert_eq!(stop_event.target(), Target::Container);
    assert_eq!(stop_event.tag(), Tag::new(Time::from_secs(2.0), 1));

    assert!(director.iterate().unwrap());
    assert_eq!(director.tag(), Tag::new(Time::ZERO, 1));
    assert!(!director.exceeded_stop_time());

    assert!(!director.iterate().unwrap());
    assert_eq!(director.tag(), Tag::new(Time::from_secs(2.0), 1));
    assert!(director.exceeded_stop_time());

    director.wrapup().unwrap();
    assert_eq!(log.tags_of("a"), vec![(0.0, 1)]);
}

#[test]
fn events_beyond_the_stop_time_are_not_processed() {
    let log = Log::new();
    let mut director = Director::new("top", DirectorConfig::default().with_stop_time(2.0));
    director.add_actor("a", |ports| Pulse::new(ports.output("out"), &[1.0, 5.0], &log));

    director.run().unwrap();

    assert!(director.exceeded_stop_time());
    assert_eq!(director.tag(), Tag::new(Time::from_secs(2.0), 1));
    assert_eq!(log.tags_of("a"), vec![(1.0, 1)]);
}

#[test]
fn microstep_chain_overflows() {
    let log = Log::new();
    let mut director = Director::new("top", DirectorConfig::default().with_microstep_limit(100));
    director.add_actor("chain", |_| Chain::new(0.0, 0, u64::MAX, &log));

    let err = director.run().unwrap_err();

    assert_eq!(
        err,
        SimulationError::MicrostepOverflow {
            actor: "chain".into(),
            time: Time::ZERO,
        }
    );
    assert!(err.is_invariant_violation());
    assert_eq!(director.tag(), Tag::new(Time::ZERO, 100));
    assert_eq!(log.tags_of("chain").len(), 101);
    assert_eq!(director.phase(), Phase::WrappedUp);
}

#[test]
fn disabled_actors_are_not_fired() {
    let log = Log::new();
    let mut director = Director::new("top", DirectorConfig::default());
    let a = director.add_actor("a", |ports| {
        Pulse::new(ports.output("out"), &[1.0, 2.0, 3.0], &log).with_max_firings(1)
    });
    let b = director.add_actor("b", |ports| Pulse::new(ports.output("out"), &[1.5, 2.5], &log));

    director.run().unwrap();

    assert!(director.is_disabled(a));
    assert!(!director.is_disabled(b));
    assert_eq!(log.tags_of("a"), vec![(1.0, 1)]);
    assert_eq!(log.tags_of("b"), vec![(1.5, 1), (2.5, 1)]);
}

#[test]
fn causality_loops_are_rejected() {
    let log = Log::new();
    let mut director = Director::new("top", DirectorConfig::default());
    let a = director.add_actor("a", |ports| Relay::new(ports.input("in"), ports.output("out"), &log));
    let b = director.add_actor("b", |ports| Relay::new(ports.input("in"), ports.output("out"), &log));
    director
        .connect(director.port(a, "out").unwrap(), director.port(b, "in").unwrap())
        .unwrap();
    director
        .connect(director.port(b, "out").unwrap(), director.port(a, "in").unwrap())
        .unwrap();

    assert_eq!(
        director.preinitialize(),
        Err(SimulationError::CausalityLoop {
            actors: vec!["a".into(), "b".into()]
        })
    );
    assert_eq!(director.phase(), Phase::Created);
}

#[test]
fn causality_loops_exclude_downstream_actors() {
    let log = Log::new();
    let mut director = Director::new("top", DirectorConfig::default());
    let sink = director.add_actor("sink", |ports| Relay::new(ports.input("in"), ports.output("out"), &log));
    let a = director.add_actor("a", |ports| Relay::new(ports.input("in"), ports.output("out"), &log));
    let b = director.add_actor("b", |ports| Relay::new(ports.input("in"), ports.output("out"), &log));
    let b_out = director.port(b, "out").unwrap();
    director
        .connect(director.port(a, "out").unwrap(), director.port(b, "in").unwrap())
        .unwrap();
    director.connect(b_out, director.port(a, "in").unwrap()).unwrap();
    director.connect(b_out, director.port(sink, "in").unwrap()).unwrap();

    assert_eq!(
        director.preinitialize(),
        Err(SimulationError::CausalityLoop {
            actors: vec!["a".into(), "b".into()]
        })
    );
}

#[test]
fn delay_actors_break_feedback_loops() {
    let log = Log::new();
    let mut director = Director::new("top", DirectorConfig::default().with_stop_time(3.5));
    let source = director.add_actor("source", |ports| Pulse::new(ports.output("out"), &[0.0], &log));
    let a = director.add_actor("a", |ports| Relay::new(ports.input("in"), ports.output("out"), &log));
    let delay = director.add_actor("delay", |ports| {
        Delay::new(ports.input("in"), ports.output("out"), 1.0)
    });
    let a_in = director.port(a, "in").unwrap();
    director.connect(director.port(source, "out").unwrap(), a_in).unwrap();
    director
        .connect(director.port(a, "out").unwrap(), director.port(delay, "in").unwrap())
        .unwrap();
    director.connect(director.port(delay, "out").unwrap(), a_in).unwrap();

    director.run().unwrap();

    assert_eq!(
        log.tags_of("a"),
        vec![(0.0, 1), (1.0, 1), (2.0, 1), (3.0, 1)]
    );
}

#[test]
fn events_in_the_past_are_rejected() {
    struct TimeTraveler;

    impl Actor for TimeTraveler {
        fn initialize(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError> {
            cx.fire_at(Time::from_secs(2.0))?;

            Ok(())
        }

        fn fire(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError> {
            cx.fire_at(Time::from_secs(1.0))?;

            Ok(())
        }
    }

    let mut director = Director::new("top", DirectorConfig::default());
    director.add_actor("traveler", |_| TimeTraveler);

    let err = director.run().unwrap_err();

    assert_eq!(
        err,
        SimulationError::EventInPast {
            actor: "traveler".into(),
            requested: Tag::new(Time::from_secs(1.0), 1),
            current: Tag::new(Time::from_secs(2.0), 1),
        }
    );
    assert!(err.is_invariant_violation());
}

#[test]
fn actors_are_wrapped_up_after_a_failure() {
    struct Faulty {
        wrapped_up: Rc<Cell<bool>>,
    }

    impl Actor for Faulty {
        fn initialize(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError> {
            cx.fire_at(Time::from_secs(1.0))?;

            Ok(())
        }

        fn fire(&mut self, cx: &mut Context<'_>) -> Result<(), SimulationError> {
            Err(cx.failure("out of coffee"))
        }

        fn wrapup(&mut self) -> Result<(), SimulationError> {
            self.wrapped_up.set(true);

            Ok(())
        }
    }

    let wrapped_up = Rc::new(Cell::new(false));
    let mut director = Director::new("top", DirectorConfig::default());
    director.add_actor("faulty", |_| Faulty {
        wrapped_up: wrapped_up.clone(),
    });

    let err = director.run().unwrap_err();

    assert_eq!(
        err.to_string(),
        "actor 'faulty' failed: out of coffee"
    );
    assert!(!err.is_invariant_violation());
    assert!(wrapped_up.get());
}

#[test]
fn boundary_ports_at_top_level() {
    let log = Log::new();
    let mut director = Director::new("top", DirectorConfig::default());
    let input = director.add_boundary_input("input");
    let output = director.add_boundary_output("output");
    let relay = director.add_actor("relay", |ports| Relay::new(ports.input("in"), ports.output("out"), &log));
    director.connect(input, director.port(relay, "in").unwrap()).unwrap();
    director.connect(director.port(relay, "out").unwrap(), output).unwrap();
    assert_eq!(director.boundary_port("output"), Some(output));

    director.preinitialize().unwrap();
    director.initialize().unwrap();
    director.deliver(input, 1.5).unwrap();
    director.deliver(input, "two").unwrap();

    assert!(!director.iterate().unwrap());
    assert_eq!(log.tags_of("relay"), vec![(0.0, 1)]);
    assert_eq!(director.take_output(output), Some(Token::Double(1.5)));
    assert_eq!(director.take_output(output), Some(Token::from("two")));
    assert_eq!(director.take_output(output), None);

    // Tokens can only be delivered to boundary inputs.
    assert!(matches!(
        director.deliver(output, ()),
        Err(SimulationError::InvalidPort { .. })
    ));
    director.wrapup().unwrap();
}

#[test]
fn pending_events_can_be_cancelled() {
    let log = Log::new();
    let mut director = Director::new("top", DirectorConfig::default());
    let a = director.add_actor("a", |ports| Pulse::new(ports.output("out"), &[1.0, 2.0], &log));
    director.add_actor("b", |ports| Pulse::new(ports.output("out"), &[1.5], &log));

    director.preinitialize().unwrap();
    director.initialize().unwrap();
    assert_eq!(
        director.next_event_tag(),
        Some(Tag::new(Time::from_secs(1.0), 1))
    );

    let event = director.pending_events()[0];
    assert_eq!(event.actor(), Some(a));
    assert!(director.cancel(&event));
    assert!(!director.cancel(&event));

    while director.iterate().unwrap() {}
    director.wrapup().unwrap();

    assert_eq!(log.names(), vec!["b"]);
}

#[test]
fn external_firing_requests() {
    let log = Log::new();
    let mut director = Director::new("top", DirectorConfig::default());
    let a = director.add_actor("a", |_| requests(&[], &log));

    assert!(matches!(
        director.fire_at(a, Time::from_secs(1.0), 0),
        Err(SimulationError::InvalidPhase {
            phase: Phase::Created,
            ..
        })
    ));

    director.preinitialize().unwrap();
    director.initialize().unwrap();
    director.fire_at(a, Time::from_secs(1.0), 0).unwrap();
    director.fire_at(a, Time::from_secs(0.5), 3).unwrap();

    while director.iterate().unwrap() {}
    director.wrapup().unwrap();

    assert_eq!(log.tags_of("a"), vec![(0.5, 3), (1.0, 0)]);
}

#[test]
fn invalid_usage_is_reported() {
    let log = Log::new();
    let mut director = Director::new("top", DirectorConfig::default());
    let a = director.add_actor("a", |ports| Relay::new(ports.input("in"), ports.output("out"), &log));
    let a_in = director.port(a, "in").unwrap();
    let a_out = director.port(a, "out").unwrap();

    assert_eq!(
        director.connect(a_in, a_out),
        Err(SimulationError::InvalidConnection {
            from: "a.in".into(),
            to: "a.out".into()
        })
    );

    // A port of another director is unknown to this one.
    let mut other = Director::new("other", DirectorConfig::default());
    let foreign: Vec<PortId> = (0..3).map(|i| other.add_boundary_input(format!("in{i}"))).collect();
    assert_eq!(
        director.connect(a_out, foreign[2]),
        Err(SimulationError::UnknownPort(foreign[2]))
    );
    assert!(matches!(
        director.fire(),
        Err(SimulationError::InvalidPhase { .. })
    ));
    assert!(matches!(
        director.wrapup(),
        Err(SimulationError::InvalidPhase { .. })
    ));

    let mut director = Director::new("top", DirectorConfig::default().with_min_bin_count(3));
    assert!(matches!(
        director.preinitialize(),
        Err(SimulationError::InvalidConfig(_))
    ));
}

//! Directors embedded in composite actors.

use superdense::actor::CompositeActor;
use superdense::director::{Director, DirectorConfig};
use superdense::ports::Token;

use crate::common::{Log, Pulse, Recorder, Relay, Values};

#[test]
fn tokens_pass_through_a_composite() {
    let log = Log::new();
    let values = Values::default();

    let mut inner = Director::new("inner", DirectorConfig::default());
    let inner_in = inner.add_boundary_input("in");
    let inner_out = inner.add_boundary_output("out");
    let relay = inner.add_actor("relay", |ports| {
        Relay::new(ports.input("in"), ports.output("out"), &log)
    });
    inner
        .connect(inner_in, inner.port(relay, "in").unwrap())
        .unwrap();
    inner
        .connect(inner.port(relay, "out").unwrap(), inner_out)
        .unwrap();

    let mut outer = Director::new("outer", DirectorConfig::default());
    let source = outer.add_actor("source", |ports| {
        Pulse::new(ports.output("out"), &[1.0, 2.0], &log)
    });
    let composite = outer.add_actor("composite", |ports| {
        let composite = CompositeActor::new(inner)
            .with_input(ports.input("in"), inner_in)
            .with_output(inner_out, ports.output("out"));
        assert_eq!(composite.director().name(), "inner");

        composite
    });
    let sink = outer.add_actor("sink", |ports| Recorder::new(ports.input("in"), &values, &log));
    outer
        .connect(
            outer.port(source, "out").unwrap(),
            outer.port(composite, "in").unwrap(),
        )
        .unwrap();
    outer
        .connect(
            outer.port(composite, "out").unwrap(),
            outer.port(sink, "in").unwrap(),
        )
        .unwrap();

    outer.run().unwrap();

    assert_eq!(*values.borrow(), vec![Token::Int(0), Token::Int(1)]);
    assert_eq!(log.tags_of("relay"), vec![(1.0, 1), (2.0, 1)]);
    assert_eq!(log.tags_of("sink"), vec![(1.0, 1), (2.0, 1)]);
}

#[test]
fn inner_events_are_scheduled_by_the_outer_director() {
    let log = Log::new();
    let values = Values::default();

    let mut inner = Director::new("inner", DirectorConfig::default());
    let inner_out = inner.add_boundary_output("out");
    let pulse = inner.add_actor("pulse", |ports| {
        Pulse::new(ports.output("out"), &[0.5, 1.5], &log)
    });
    inner
        .connect(inner.port(pulse, "out").unwrap(), inner_out)
        .unwrap();

    let mut outer = Director::new("outer", DirectorConfig::default());
    let composite = outer.add_actor("composite", |ports| {
        CompositeActor::new(inner).with_output(inner_out, ports.output("out"))
    });
    let sink = outer.add_actor("sink", |ports| Recorder::new(ports.input("in"), &values, &log));
    outer
        .connect(
            outer.port(composite, "out").unwrap(),
            outer.port(sink, "in").unwrap(),
        )
        .unwrap();

    outer.preinitialize().unwrap();
    outer.initialize().unwrap();

    // The inner pulse requested a firing of the composite.
    assert_eq!(outer.pending_events().len(), 1);
    assert_eq!(outer.pending_events()[0].actor(), Some(composite));

    while outer.iterate().unwrap() {}
    outer.wrapup().unwrap();

    assert_eq!(log.tags_of("pulse"), vec![(0.5, 1), (1.5, 1)]);
    assert_eq!(log.tags_of("sink"), vec![(0.5, 1), (1.5, 1)]);
    assert_eq!(*values.borrow(), vec![Token::Int(0), Token::Int(1)]);
}

#[test]
fn bursts_are_drained_over_successive_microsteps() {
    let log = Log::new();
    let values = Values::default();

    let mut inner = Director::new("inner", DirectorConfig::default());
    let inner_out = inner.add_boundary_output("out");
    let pulse = inner.add_actor("pulse", |ports| {
        Pulse::new(ports.output("out"), &[1.0], &log).with_burst(3)
    });
    inner
        .connect(inner.port(pulse, "out").unwrap(), inner_out)
        .unwrap();

    let mut outer = Director::new("outer", DirectorConfig::default());
    let composite = outer.add_actor("composite", |ports| {
        CompositeActor::new(inner).with_output(inner_out, ports.output("out"))
    });
    let sink = outer.add_actor("sink", |ports| Recorder::new(ports.input("in"), &values, &log));
    outer
        .connect(
            outer.port(composite, "out").unwrap(),
            outer.port(sink, "in").unwrap(),
        )
        .unwrap();

    outer.run().unwrap();

    assert_eq!(log.tags_of("pulse"), vec![(1.0, 1)]);
    assert_eq!(log.tags_of("sink"), vec![(1.0, 1), (1.0, 2), (1.0, 3)]);
    assert_eq!(
        *values.borrow(),
        vec![Token::Int(0), Token::Int(1), Token::Int(2)]
    );
}

// End-to-end lifecycle scenarios driven against the public API

use phase_correlator::{
    LifecycleCorrelator, MemoryRecorder, MethodSignature, Phase, PhaseEvent, Scope, Subject,
};
use std::sync::Arc;
use std::thread;

fn suite(id: &str) -> Scope {
    Scope::container(id, format!("{} suite", id)).with_owning_type(id)
}

fn test_scope(parent: &Scope, method: &str) -> Scope {
    let signature = MethodSignature::new(method);
    Scope::member(
        format!("{}/[method:{}]", parent.id, signature.render()),
        parent.id.clone(),
        method.to_uppercase(),
    )
    .with_subject(Subject::from_signature(&signature))
    .with_owning_type(parent.owning_type.clone().unwrap_or_default())
}

fn run_container<R: phase_correlator::EventRecorder>(
    correlator: &LifecycleCorrelator<R>,
    container: &Scope,
    members: &[Scope],
) {
    correlator.container_enter(container);
    for member in members {
        correlator.member_enter(member);
        correlator.unit_enter(member);
        correlator.unit_leave(member);
        correlator.member_leave(member);
    }
    correlator.container_leave(container);
}

fn events_of(recorder: &MemoryRecorder, phase: Phase) -> Vec<PhaseEvent> {
    recorder
        .events()
        .into_iter()
        .filter(|event| event.phase() == phase)
        .collect()
}

#[test]
fn test_end_to_end_counts() {
    let _ = env_logger::builder().is_test(true).try_init();
    let recorder = Arc::new(MemoryRecorder::new());
    let correlator = LifecycleCorrelator::new(recorder.clone());

    let c = suite("C");
    let members = vec![test_scope(&c, "test1"), test_scope(&c, "test2")];
    run_container(&correlator, &c, &members);

    assert_eq!(recorder.count(Phase::ContainerSetup), 1);
    assert_eq!(recorder.count(Phase::MemberSetup), 2);
    assert_eq!(recorder.count(Phase::UnitExecution), 2);
    assert_eq!(recorder.count(Phase::MemberTeardown), 2);
    assert_eq!(recorder.count(Phase::ContainerTeardown), 1);

    // Every committed event was begun and stopped, nothing is left open
    assert!(recorder.events().iter().all(|e| e.is_begun() && e.is_stopped()));
    assert!(correlator.finish().is_empty());
}

#[test]
fn test_windows_are_contiguous_in_phase_order() {
    let recorder = Arc::new(MemoryRecorder::new());
    let correlator = LifecycleCorrelator::new(recorder.clone());

    let c = suite("C");
    let m = test_scope(&c, "test1");
    run_container(&correlator, &c, &[m]);

    let ordered: Vec<PhaseEvent> = Phase::ALL
        .iter()
        .map(|phase| events_of(&recorder, *phase).remove(0))
        .collect();

    for event in &ordered {
        assert!(event.start_tick() < event.stop_tick(), "{} has an empty window", event.phase());
    }

    for pair in ordered.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);
        // Closed before the next one was opened within the same signal
        assert!(
            previous.stop_tick() < next.start_tick(),
            "{} overlaps {}",
            previous.phase(),
            next.phase()
        );
    }
}

#[test]
fn test_one_container_teardown_regardless_of_member_count() {
    for member_count in [1usize, 2, 5] {
        let recorder = Arc::new(MemoryRecorder::new());
        let correlator = LifecycleCorrelator::new(recorder.clone());

        let c = suite("C");
        let members: Vec<Scope> = (0..member_count)
            .map(|i| test_scope(&c, &format!("test{}", i)))
            .collect();
        run_container(&correlator, &c, &members);

        assert_eq!(recorder.count(Phase::ContainerTeardown), 1);
        assert_eq!(recorder.discarded().len(), member_count - 1);
        assert!(correlator.open_events().is_empty());
    }
}

#[test]
fn test_superseded_teardowns_stay_within_capacity() {
    let recorder = Arc::new(MemoryRecorder::with_capacity(2));
    let correlator = LifecycleCorrelator::new(recorder.clone());

    let c = suite("C");
    let members: Vec<Scope> = (0..50).map(|i| test_scope(&c, &format!("test{}", i))).collect();
    run_container(&correlator, &c, &members);

    let discarded = recorder.discarded();
    assert_eq!(discarded.len(), 2);
    assert_eq!(discarded[1].display_name(), "TEST48");
    assert!(recorder.len() <= 2);
}

#[test]
fn test_container_teardown_starts_after_last_member() {
    let recorder = Arc::new(MemoryRecorder::new());
    let correlator = LifecycleCorrelator::new(recorder.clone());

    let c = suite("C");
    let members = vec![test_scope(&c, "test1"), test_scope(&c, "test2")];
    run_container(&correlator, &c, &members);

    let last_teardown = events_of(&recorder, Phase::MemberTeardown)
        .into_iter()
        .find(|event| event.display_name() == "TEST2")
        .expect("second member teardown");
    let container_teardown = events_of(&recorder, Phase::ContainerTeardown).remove(0);

    assert!(last_teardown.stop_tick() < container_teardown.start_tick());
    assert_eq!(container_teardown.scope_id(), &c.id);
}

#[test]
fn test_independent_containers_on_separate_threads() {
    let recorder = Arc::new(MemoryRecorder::new());
    let correlator = LifecycleCorrelator::new(recorder.clone());

    let c1 = suite("C1");
    let c2 = suite("C2");
    let c1_members: Vec<Scope> = (0..20).map(|i| test_scope(&c1, &format!("a{}", i))).collect();
    let c2_members: Vec<Scope> = (0..20).map(|i| test_scope(&c2, &format!("b{}", i))).collect();

    thread::scope(|s| {
        s.spawn(|| run_container(&correlator, &c1, &c1_members));
        s.spawn(|| run_container(&correlator, &c2, &c2_members));
    });

    for (container, prefix) in [(&c1, "A"), (&c2, "B")] {
        let own: Vec<PhaseEvent> = recorder
            .events()
            .into_iter()
            .filter(|event| event.scope_id().as_str().starts_with(container.id.as_str()))
            .collect();

        assert_eq!(own.len(), 1 + 20 * 3 + 1);
        assert!(own.iter().all(|e| e.owning_type() == container.owning_type.as_deref()));

        // Member-level and teardown events carry this container's member names only
        assert!(own
            .iter()
            .filter(|e| e.phase() != Phase::ContainerSetup)
            .all(|e| e.display_name().starts_with(prefix)));
    }

    assert_eq!(recorder.count(Phase::ContainerSetup), 2);
    assert_eq!(recorder.count(Phase::ContainerTeardown), 2);
    assert!(correlator.finish().is_empty());
}

#[test]
fn test_events_serialize_for_backends() {
    let recorder = Arc::new(MemoryRecorder::new());
    let correlator = LifecycleCorrelator::new(recorder.clone());

    let c = suite("C");
    run_container(&correlator, &c, &[test_scope(&c, "test1")]);

    let unit = events_of(&recorder, Phase::UnitExecution).remove(0);
    let json = serde_json::to_value(&unit).expect("event serializes");

    assert_eq!(json["phase"], "unit_execution");
    assert_eq!(json["display_name"], "TEST1");
    assert_eq!(json["subject"]["signature"], "test1()");
    assert_eq!(json["category"], "JUnit");
}

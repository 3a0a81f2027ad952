//! Plays a run plan back through the correlator
//!
//! The driver stands in for a test framework: it assigns unique scope ids and
//! fires the lifecycle signals in framework order. For each container:
//!
//! 1. container-enter
//! 2. per member: member-enter, unit-enter, unit-leave, member-leave
//! 3. nested containers, recursively
//! 4. container-leave
//!
//! Top-level containers can run concurrently on the rayon thread pool.

use crate::output::build_recorder;
use crate::plan::{ContainerPlan, MemberPlan, RunPlan};
use anyhow::Result;
use phase_correlator::{
    EventRecorder, LifecycleCorrelator, LifecycleSignal, PhaseEvent, Scope, Subject,
};
use rayon::prelude::*;
use std::ops::Add;

/// Root segment of every scope id assigned by the harness
pub const ENGINE_ID: &str = "[engine:harness]";

/// Result of playing back a plan
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Containers entered, nested ones included
    pub containers: usize,
    /// Members run
    pub members: usize,
    /// Events whose closing signal never arrived
    pub leaked: Vec<PhaseEvent>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    containers: usize,
    members: usize,
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, other: Tally) -> Tally {
        Tally {
            containers: self.containers + other.containers,
            members: self.members + other.members,
        }
    }
}

/// Scope for a container, nested below `parent` when given
pub fn container_scope(plan: &ContainerPlan, parent: Option<&Scope>) -> Scope {
    let scope = match parent {
        Some(parent) => Scope::member(
            format!("{}/[nested-class:{}]", parent.id, plan.name),
            parent.id.clone(),
            plan.display_name(),
        ),
        None => Scope::container(
            format!("{}/[class:{}]", ENGINE_ID, plan.name),
            plan.display_name(),
        ),
    };
    scope.with_owning_type(plan.name.clone())
}

/// Scope for a test method of `container`
pub fn member_scope(plan: &MemberPlan, container: &Scope) -> Scope {
    let signature = plan.signature();
    let mut scope = Scope::member(
        format!("{}/[method:{}]", container.id, signature.render()),
        container.id.clone(),
        plan.display_name(),
    )
    .with_subject(Subject::from_signature(&signature));
    scope.owning_type = container.owning_type.clone();
    scope
}

/// Fire every signal of one container subtree
fn drive_container<R: EventRecorder>(
    correlator: &LifecycleCorrelator<R>,
    plan: &ContainerPlan,
    parent: Option<&Scope>,
) -> Tally {
    let container = container_scope(plan, parent);
    let mut tally = Tally {
        containers: 1,
        members: 0,
    };

    correlator.on_signal(LifecycleSignal::ContainerEnter, &container);

    for member in &plan.members {
        let scope = member_scope(member, &container);
        correlator.on_signal(LifecycleSignal::MemberEnter, &scope);
        correlator.on_signal(LifecycleSignal::UnitEnter, &scope);
        correlator.on_signal(LifecycleSignal::UnitLeave, &scope);
        correlator.on_signal(LifecycleSignal::MemberLeave, &scope);
        tally.members += 1;
    }

    for nested in &plan.nested {
        tally = tally + drive_container(correlator, nested, Some(&container));
    }

    correlator.on_signal(LifecycleSignal::ContainerLeave, &container);
    tally
}

/// Play back every container of the plan against `correlator`
pub fn run<R: EventRecorder>(plan: &RunPlan, correlator: &LifecycleCorrelator<R>) -> RunSummary {
    log::info!(
        "phase-correlator {}: running {} containers with {} members ({})",
        phase_correlator::VERSION,
        plan.containers.len(),
        plan.containers.iter().map(ContainerPlan::member_count).sum::<usize>(),
        if plan.parallel { "parallel" } else { "sequential" }
    );

    let tally = if plan.parallel {
        plan.containers
            .par_iter()
            .map(|container| drive_container(correlator, container, None))
            .reduce(Tally::default, Tally::add)
    } else {
        plan.containers
            .iter()
            .map(|container| drive_container(correlator, container, None))
            .fold(Tally::default(), Tally::add)
    };

    let leaked = correlator.finish();
    log::info!(
        "Run complete: {} containers, {} members, {} events left open",
        tally.containers,
        tally.members,
        leaked.len()
    );

    RunSummary {
        containers: tally.containers,
        members: tally.members,
        leaked,
    }
}

/// Build the recorder and correlator from the plan's settings and run it
pub fn run_plan(plan: &RunPlan) -> Result<RunSummary> {
    let recorder = build_recorder(&plan.output)?;
    let correlator = LifecycleCorrelator::with_config(recorder, plan.correlator.clone())?;
    Ok(run(plan, &correlator))
}

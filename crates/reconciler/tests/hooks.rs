use memory_host::MemoryHost;
use platform::{FrameConfig, IdleLoop, StepDeadline};
use reconciler::{
    Element, Reconciler, ReconcilerConfig, RenderError, Runtime, SetState, drive,
};
use std::cell::RefCell;
use std::rc::Rc;

type Slot = Rc<RefCell<Option<SetState<i32>>>>;

/// `<h1>Count: n</h1>` that leaks its setter through `slot`.
fn counter(slot: Slot) -> Element {
    Element::component(move |hooks, _props| {
        let (count, set) = hooks.use_state(1);
        *slot.borrow_mut() = Some(set.clone());
        Element::host("h1")
            .on("click", move |_| set.update(|c| c + 1))
            .child("Count: ")
            .child(count)
    })
}

fn reconciler(config: ReconcilerConfig) -> Reconciler<MemoryHost> {
    let host = MemoryHost::new();
    let container = host.container();
    Reconciler::new(host, container, config)
}

fn run_until_idle(idle: &IdleLoop, runtime: &Runtime<MemoryHost>) {
    for _ in 0..100 {
        if runtime.is_idle() {
            return;
        }
        idle.run_frame();
    }
    panic!("runtime did not settle");
}

#[test]
fn queued_updates_compose_across_a_render() {
    let slot: Slot = Rc::default();
    let mut r = reconciler(ReconcilerConfig::default());
    r.render(counter(Rc::clone(&slot))).unwrap();
    r.flush_sync().unwrap();
    let h1 = r.host().find("h1").unwrap();
    assert_eq!(r.host().text_content(h1), "Count: 1");

    let set = slot.borrow().clone().unwrap();
    set.update(|c| c + 1);
    set.update(|c| c + 1);
    assert!(r.has_pending_work());
    assert_eq!(r.update_requests(), 2);

    let commit = r.flush_sync().unwrap().committed.unwrap();
    assert_eq!(r.host().text_content(h1), "Count: 3");
    assert_eq!(commit.placements, 0);
    assert_eq!(commit.deletions, 0);
    assert!(r.is_idle());
}

#[test]
fn state_survives_unrelated_rerenders() {
    let slot: Slot = Rc::default();
    let mut r = reconciler(ReconcilerConfig::default());
    r.render(counter(Rc::clone(&slot))).unwrap();
    r.flush_sync().unwrap();

    slot.borrow().clone().unwrap().set(41);
    r.flush_sync().unwrap();
    r.render(counter(Rc::clone(&slot))).unwrap();
    r.flush_sync().unwrap();

    let h1 = r.host().find("h1").unwrap();
    assert_eq!(r.host().text_content(h1), "Count: 41");
}

#[test]
fn click_dispatch_rerenders_through_the_idle_loop() {
    let slot: Slot = Rc::default();
    let reconciler = Rc::new(RefCell::new(reconciler(ReconcilerConfig::default())));
    reconciler.borrow_mut().render(counter(slot)).unwrap();

    let idle = Rc::new(IdleLoop::new(FrameConfig::default()));
    let runtime = drive(Rc::clone(&reconciler), Rc::clone(&idle));
    run_until_idle(&idle, &runtime);
    assert_eq!(runtime.commits(), 1);

    let h1 = reconciler.borrow().host().find("h1").unwrap();
    for _ in 0..2 {
        assert_eq!(reconciler.borrow().host().click(h1), 1);
        run_until_idle(&idle, &runtime);
    }

    let r = reconciler.borrow();
    assert_eq!(r.host().text_content(h1), "Count: 3");
    // Each render installs a fresh handler; the stale one is unsubscribed.
    assert_eq!(r.host().listener_count(h1, "click"), 1);
    assert!(r.host().violations().is_empty());
    assert_eq!(runtime.commits(), 3);
    assert!(runtime.take_error().is_none());
    // The runtime keeps itself armed.
    assert_eq!(idle.pending(), 1);
}

#[test]
fn render_absorbs_a_pending_update() {
    let slot: Slot = Rc::default();
    let mut r = reconciler(ReconcilerConfig::default());
    r.render(Element::host("div").child(counter(Rc::clone(&slot))))
        .unwrap();
    r.flush_sync().unwrap();

    slot.borrow().clone().unwrap().update(|c| c + 1);
    r.render(
        Element::host("div")
            .child(counter(Rc::clone(&slot)))
            .child(Element::host("footer")),
    )
    .unwrap();
    r.flush_sync().unwrap();

    let host = r.host();
    assert!(host.find("footer").is_some());
    assert_eq!(host.text_content(host.find("h1").unwrap()), "Count: 2");
    assert!(r.is_idle());
}

#[test]
fn update_mid_generation_restarts_from_the_committed_tree() {
    let slot: Slot = Rc::default();
    let mut r = reconciler(ReconcilerConfig::default());
    r.render(Element::host("div").child(counter(Rc::clone(&slot))))
        .unwrap();
    r.flush_sync().unwrap();
    let committed_fibers = r.fiber_count();
    let h1 = r.host().find("h1").unwrap();
    let set = slot.borrow().clone().unwrap();
    r.host_mut().take_calls();

    set.update(|c| c + 1);
    r.work_loop(&StepDeadline::new(1)).unwrap();
    assert!(r.has_pending_work());
    set.update(|c| c * 10);
    r.work_loop(&StepDeadline::new(1)).unwrap();
    assert!(r.host().calls().iter().all(|c| !c.is_mutation()));

    r.flush_sync().unwrap();
    assert_eq!(r.host().text_content(h1), "Count: 20");
    assert_eq!(r.fiber_count(), committed_fibers);
    assert_eq!(r.generation().0, 2);
    assert!(r.host().violations().is_empty());
}

#[test]
fn accepted_render_survives_a_mid_generation_update() {
    let slot: Slot = Rc::default();
    let mut r = reconciler(ReconcilerConfig::default());
    r.render(Element::host("div").child(counter(Rc::clone(&slot))))
        .unwrap();
    r.flush_sync().unwrap();
    let set = slot.borrow().clone().unwrap();

    r.render(
        Element::host("div")
            .child(counter(Rc::clone(&slot)))
            .child(Element::host("footer")),
    )
    .unwrap();
    r.work_loop(&StepDeadline::new(1)).unwrap();
    set.update(|c| c + 1);
    r.flush_sync().unwrap();

    let host = r.host();
    assert!(host.find("footer").is_some());
    assert_eq!(host.text_content(host.find("h1").unwrap()), "Count: 2");
    // Synthetic root, div, component, h1, two text nodes and the footer.
    assert_eq!(r.fiber_count(), 7);
}

#[test]
fn updates_between_slices_are_not_a_render_loop() {
    let slot: Slot = Rc::default();
    let mut r = reconciler(ReconcilerConfig {
        max_uncommitted_restarts: 3,
        ..ReconcilerConfig::default()
    });
    let rows = Element::host("ul").children((0..20).map(|i| Element::host("li").child(i)));
    r.render(Element::host("div").child(rows).child(counter(Rc::clone(&slot))))
        .unwrap();
    r.flush_sync().unwrap();
    let set = slot.borrow().clone().unwrap();

    for _ in 0..8 {
        set.update(|c| c + 1);
        let report = r.work_loop(&StepDeadline::new(2)).unwrap();
        assert!(report.committed.is_none());
    }
    r.flush_sync().unwrap();

    let h1 = r.host().find("h1").unwrap();
    assert_eq!(r.host().text_content(h1), "Count: 9");
}

#[test]
fn update_during_render_is_detected_as_a_loop() {
    let mut r = reconciler(ReconcilerConfig {
        max_uncommitted_restarts: 3,
        ..ReconcilerConfig::default()
    });
    r.render(Element::component(|hooks, _props| {
        let (n, set) = hooks.use_state(0u32);
        set.update(|n| n + 1);
        Element::host("p").child(n)
    }))
    .unwrap();

    let err = r.flush_sync().unwrap_err();
    assert!(matches!(err, RenderError::UpdateLoop { restarts: 4 }));
    assert!(r.is_idle());
    assert_eq!(r.fiber_count(), 0);
    assert!(r.host().calls().iter().all(|c| !c.is_mutation()));
}

#[test]
fn runtime_keeps_the_last_error() {
    let reconciler = Rc::new(RefCell::new(reconciler(ReconcilerConfig {
        max_uncommitted_restarts: 1,
        ..ReconcilerConfig::default()
    })));
    reconciler
        .borrow_mut()
        .render(Element::component(|hooks, _props| {
            let (_, set) = hooks.use_state(false);
            set.set(true);
            Element::host("p")
        }))
        .unwrap();

    let idle = Rc::new(IdleLoop::new(FrameConfig::default()));
    let runtime = drive(Rc::clone(&reconciler), Rc::clone(&idle));
    run_until_idle(&idle, &runtime);

    assert!(matches!(
        runtime.take_error(),
        Some(RenderError::UpdateLoop { .. })
    ));
    assert!(runtime.take_error().is_none());
    assert_eq!(runtime.commits(), 0);
}

use memory_host::{HostCall, MemoryHost};
use platform::StepDeadline;
use reconciler::{Element, EventHandler, PropValue, Reconciler, ReconcilerConfig};

fn reconciler() -> Reconciler<MemoryHost> {
    let host = MemoryHost::new();
    let container = host.container();
    Reconciler::new(host, container, ReconcilerConfig::default())
}

#[test]
fn no_host_mutation_before_the_committing_slice() {
    let mut r = reconciler();
    r.render(
        Element::host("div")
            .prop("style", "background: salmon")
            .child(Element::host("h1").child("Hello"))
            .child(Element::host("h2").child("World")),
    )
    .unwrap();

    let mut slices = 0;
    loop {
        let report = r.work_loop(&StepDeadline::new(1)).unwrap();
        slices += 1;
        assert_eq!(report.units, 1);
        if report.committed.is_some() {
            break;
        }
        assert!(
            r.host().calls().iter().all(|call| !call.is_mutation()),
            "host mutated during slice {slices}: {:?}",
            r.host().calls()
        );
        assert!(slices < 100, "work loop made no progress");
    }

    // Synthetic root plus five element fibers, one per slice.
    assert_eq!(slices, 6);
    assert!(r.host().calls().iter().any(HostCall::is_mutation));
    assert!(r.is_idle());
}

#[test]
fn property_patch_clears_removed_and_sets_changed() {
    let mut r = reconciler();
    let handler = EventHandler::new(|_| {});
    r.render(
        Element::host("button")
            .prop("title", "a")
            .prop("class", "x")
            .prop("onClick", handler.clone()),
    )
    .unwrap();
    r.flush_sync().unwrap();
    let button = r.host().find("button").unwrap();
    r.host_mut().take_calls();

    r.render(
        Element::host("button")
            .prop("title", "b")
            .prop("onClick", handler.clone()),
    )
    .unwrap();
    let commit = r.flush_sync().unwrap().committed.unwrap();

    assert_eq!(commit.property_mutations, 2);
    assert_eq!(
        r.host().calls(),
        &[
            HostCall::ClearProperty {
                node: button,
                name: "class".into(),
            },
            HostCall::SetProperty {
                node: button,
                name: "title".into(),
                value: "b".into(),
            },
        ]
    );
    assert_eq!(r.host().property(button, "title"), Some(&PropValue::from("b")));
    assert_eq!(r.host().property(button, "class"), None);
    assert_eq!(r.host().listener_count(button, "click"), 1);
}

#[test]
fn replaced_handler_is_resubscribed() {
    let mut r = reconciler();
    r.render(Element::host("button").on("click", |_| {})).unwrap();
    r.flush_sync().unwrap();
    let button = r.host().find("button").unwrap();
    r.host_mut().take_calls();

    r.render(Element::host("button").on("click", |_| {})).unwrap();
    let commit = r.flush_sync().unwrap().committed.unwrap();

    assert_eq!(commit.property_mutations, 2);
    assert_eq!(
        r.host().calls(),
        &[
            HostCall::Unsubscribe {
                node: button,
                event: "click".into(),
            },
            HostCall::Subscribe {
                node: button,
                event: "click".into(),
            },
        ]
    );
    assert_eq!(r.host().listener_count(button, "click"), 1);
    assert!(r.host().violations().is_empty());
}

#[test]
fn dropped_handler_is_unsubscribed() {
    let mut r = reconciler();
    r.render(Element::host("a").on("mouseDown", |_| {})).unwrap();
    r.flush_sync().unwrap();
    let a = r.host().find("a").unwrap();
    assert_eq!(r.host().listener_count(a, "mousedown"), 1);

    r.render(Element::host("a")).unwrap();
    r.flush_sync().unwrap();
    assert_eq!(r.host().listener_count(a, "mousedown"), 0);
    assert!(r.host().violations().is_empty());
}

#[test]
fn text_change_patches_node_value_in_place() {
    let mut r = reconciler();
    r.render(Element::host("p").child("before")).unwrap();
    r.flush_sync().unwrap();
    let p = r.host().find("p").unwrap();
    let text = r.host().children(p)[0];
    r.host_mut().take_calls();

    r.render(Element::host("p").child("after")).unwrap();
    r.flush_sync().unwrap();

    assert_eq!(r.host().children(p), &[text]);
    assert_eq!(r.host().text_content(p), "after");
    assert_eq!(r.host().calls().len(), 1);
}

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use memory_host::MemoryHost;
use platform::StepDeadline;
use reconciler::{Element, Reconciler, ReconcilerConfig};

const SMALL_ROWS: usize = 64;
const LARGE_ROWS: usize = 5_000;

/// `<ul>` of rows shaped `<li class=row><span>label</span><b>n</b></li>`.
fn make_rows(rows: usize, salt: usize) -> Element {
    Element::host("ul").children((0..rows).map(|i| {
        Element::host("li")
            .prop("class", "row")
            .child(Element::host("span").child("label"))
            .child(Element::host("b").child((i + salt) as i64))
    }))
}

fn fresh() -> Reconciler<MemoryHost> {
    let host = MemoryHost::new();
    let container = host.container();
    Reconciler::new(host, container, ReconcilerConfig::default())
}

fn mounted(tree: Element) -> Reconciler<MemoryHost> {
    let mut r = fresh();
    r.render(tree).expect("initial render");
    r.flush_sync().expect("initial commit");
    r
}

fn bench_first_render_small(c: &mut Criterion) {
    let tree = make_rows(SMALL_ROWS, 0);
    c.bench_function("bench_first_render_small", |b| {
        b.iter_batched(
            fresh,
            |mut r| {
                r.render(black_box(tree.clone())).unwrap();
                black_box(r.flush_sync().unwrap().committed);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_first_render_large(c: &mut Criterion) {
    let tree = make_rows(LARGE_ROWS, 0);
    c.bench_function("bench_first_render_large", |b| {
        b.iter_batched(
            fresh,
            |mut r| {
                r.render(black_box(tree.clone())).unwrap();
                black_box(r.flush_sync().unwrap().committed);
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_rerender_unchanged_large(c: &mut Criterion) {
    let tree = make_rows(LARGE_ROWS, 0);
    c.bench_function("bench_rerender_unchanged_large", |b| {
        b.iter_batched(
            || mounted(tree.clone()),
            |mut r| {
                r.render(black_box(tree.clone())).unwrap();
                black_box(r.flush_sync().unwrap().committed);
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_rerender_text_changes_large(c: &mut Criterion) {
    let before = make_rows(LARGE_ROWS, 0);
    let after = make_rows(LARGE_ROWS, 1);
    c.bench_function("bench_rerender_text_changes_large", |b| {
        b.iter_batched(
            || mounted(before.clone()),
            |mut r| {
                r.render(black_box(after.clone())).unwrap();
                black_box(r.flush_sync().unwrap().committed);
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_sliced_render_large(c: &mut Criterion) {
    let tree = make_rows(LARGE_ROWS, 0);
    c.bench_function("bench_sliced_render_large", |b| {
        b.iter_batched(
            fresh,
            |mut r| {
                r.render(black_box(tree.clone())).unwrap();
                let mut slices = 0usize;
                while r.has_pending_work() {
                    r.work_loop(&StepDeadline::new(64)).unwrap();
                    slices += 1;
                }
                black_box(slices);
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_first_render_small,
    bench_first_render_large,
    bench_rerender_unchanged_large,
    bench_rerender_text_changes_large,
    bench_sliced_render_large
);
criterion_main!(benches);

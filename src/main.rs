use memory_host::MemoryHost;
use mimalloc::MiMalloc;
use platform::{FrameConfig, IdleLoop};
use reconciler::{Element, Hooks, Props, Reconciler, ReconcilerConfig, RenderError, Runtime, drive};
use serde::Deserialize;
use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;
use tracing_subscriber::filter::LevelFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct AppConfig {
    log_level: String,
    clicks: u32,
    frame: FrameConfig,
    reconciler: ReconcilerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            clicks: 3,
            frame: FrameConfig::default(),
            reconciler: ReconcilerConfig::default(),
        }
    }
}

fn load_config() -> Result<AppConfig, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|err| format!("reading {path}: {err}"))?;
            Ok(toml::from_str(&text)?)
        }
        None => Ok(AppConfig::default()),
    }
}

fn counter(hooks: &mut Hooks<'_>, _props: &Props) -> Element {
    let (count, set) = hooks.use_state(1i64);
    Element::host("h1")
        .on("click", move |_| set.update(|c| c + 1))
        .child("Count: ")
        .child(count)
}

fn app() -> Element {
    Element::host("div")
        .prop("style", "background: salmon")
        .child(Element::host("h1").child("Hello World"))
        .child(
            Element::host("h2")
                .prop("style", "text-align:right")
                .child("from weft"),
        )
        .child(Element::component(counter))
}

/// Runs frames until the reconciler has nothing left to do.
fn settle(idle: &IdleLoop, runtime: &Runtime<MemoryHost>) -> Result<(), RenderError> {
    let mut frames = 0;
    while !runtime.is_idle() {
        idle.run_frame();
        frames += 1;
        if let Some(err) = runtime.take_error() {
            return Err(err);
        }
    }
    log::debug!(target: "weft", "settled after {frames} frames");
    Ok(())
}

fn print_snapshot(label: &str, runtime: &Runtime<MemoryHost>) {
    let reconciler = runtime.reconciler().borrow();
    let host = reconciler.host();
    println!("== {label} (generation {})", reconciler.generation().0);
    println!("{}", host.snapshot(host.container()));
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = load_config()?;
    let level: LevelFilter = config.log_level.parse()?;
    tracing_subscriber::fmt().with_max_level(level).init();

    let host = MemoryHost::new();
    let container = host.container();
    let reconciler = Rc::new(RefCell::new(Reconciler::new(
        host,
        container,
        config.reconciler.clone(),
    )));
    reconciler.borrow_mut().render(app())?;

    let idle = Rc::new(IdleLoop::new(config.frame.clone()));
    let runtime = drive(Rc::clone(&reconciler), Rc::clone(&idle));
    settle(&idle, &runtime)?;
    print_snapshot("initial render", &runtime);

    for click in 1..=config.clicks {
        let target = reconciler.borrow().host().find_all("h1").get(1).copied();
        let Some(target) = target else {
            log::warn!(target: "weft", "counter heading not found; stopping");
            break;
        };
        let handled = reconciler.borrow().host().click(target);
        log::info!(target: "weft", "click {click} reached {handled} handlers");
        settle(&idle, &runtime)?;
        print_snapshot(&format!("after click {click}"), &runtime);
    }

    log::info!(
        target: "weft",
        "{} commits over {} slices",
        runtime.commits(),
        idle.slices()
    );
    Ok(())
}

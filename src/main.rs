use clap::Parser;
use html::serialize::outer_html;
use runtime::{Config, Page, Signal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Loads a page, fires events at it and prints the document once every swap has settled.
#[derive(Debug, Parser)]
#[command(name = "zjax", version)]
struct Args {
    /// HTML file to load as the live document.
    page: PathBuf,

    /// TOML file with runtime settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `base_url` from the config.
    #[arg(long)]
    base_url: Option<String>,

    /// Event to dispatch, as `selector:event` (repeatable, applied in order).
    #[arg(short, long = "dispatch", value_name = "SELECTOR:EVENT")]
    dispatches: Vec<String>,

    /// How long to wait for responses after each dispatch.
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            log::error!("{e}");
            eprintln!("zjax: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` when some firing failed or never settled.
fn run(args: &Args) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => Config::from_toml(&std::fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    let markup = std::fs::read_to_string(&args.page)?;
    let mut page = Page::with_http(&markup, config)?;
    let signals = page.subscribe();

    let root = page.document().root();
    let report = page.parse(root);
    log::info!(
        "scanned {}: {} binding(s), {} error(s)",
        args.page.display(),
        report.bound,
        report.errors.len()
    );

    let timeout = Duration::from_millis(args.timeout_ms);
    let mut ok = page.run_until_idle(timeout) && report.errors.is_empty();
    for spec in &args.dispatches {
        let Some((selector, event)) = spec.rsplit_once(':') else {
            return Err(format!("expected SELECTOR:EVENT, got {spec:?}").into());
        };
        let Some(node) = page.query(selector)? else {
            log::warn!("no element matches {selector:?}, skipping '{event}'");
            ok = false;
            continue;
        };
        let fired = page.dispatch(node, event);
        log::info!("'{event}' on {selector} fired {fired} binding(s)");
        ok &= page.run_until_idle(timeout);
    }

    for signal in signals.try_iter() {
        ok &= !matches!(signal, Signal::Failed { .. });
        eprintln!("{} {signal:?}", signal.name());
    }
    println!("{}", outer_html(page.document(), page.document().root()));
    Ok(ok)
}

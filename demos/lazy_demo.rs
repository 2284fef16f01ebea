use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lazy_promise::{LazyPromise, PromiseError, PromiseRuntime};
use tracing_subscriber::EnvFilter;

/// Demo showing that nothing happens until a lazy promise is observed
async fn run_lazy_demo(runtime: &PromiseRuntime) -> Result<(), PromiseError> {
    println!("=== Lazy Promise Demo ===\n");
    println!("Config: {:?}\n", runtime.config());

    let started = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&started);
    let begin = Instant::now();

    let lazy = runtime.lazy(move |resolve, _reject| {
        counter.fetch_add(1, Ordering::SeqCst);
        println!("  executor running at {:?}", begin.elapsed());
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            resolve.resolve(42_u32);
        });
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("After 50ms without observers, executor runs: {}", started.load(Ordering::SeqCst));

    let doubled = lazy.and_then(|value| async move { Ok(value * 2) });
    let described = lazy.then(
        |value| async move { Ok(format!("fulfilled with {}", value)) },
        |error| async move { Ok(format!("rejected: {}", error)) },
    );
    let logged = lazy.finally(|| println!("  settle handler fired"));

    println!("After three observations, executor runs: {}", started.load(Ordering::SeqCst));
    println!("doubled   -> {}", doubled.await?);
    println!("described -> {}", described.await?);
    println!("logged    -> {}", logged.await?);

    let failing: LazyPromise<u32> = runtime.lazy(|_resolve, _reject| -> anyhow::Result<()> {
        anyhow::bail!("could not reach upstream")
    });
    let recovered = failing.catch(|error| async move {
        println!("  caught: {}", error);
        Ok(0_u32)
    });
    println!("recovered -> {}", recovered.await?);

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let runtime = match args.get(1) {
        Some(path) => match PromiseRuntime::load(path) {
            Ok(runtime) => runtime,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => PromiseRuntime::default(),
    };

    if let Err(e) = run_lazy_demo(&runtime).await {
        eprintln!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

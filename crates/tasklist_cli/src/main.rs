//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `tasklist_core` linkage without a UI host.
//! - Optionally load a task database and print per-status counts.

use tasklist_core::{FilterSelector, LoadOutcome, SqliteGateway, TaskStore};

fn main() {
    println!("tasklist_core ping={}", tasklist_core::ping());
    println!("tasklist_core version={}", tasklist_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return;
    };

    let gateway = match SqliteGateway::open(&db_path) {
        Ok(gateway) => gateway,
        Err(err) => {
            eprintln!("tasklist db={db_path} status=error error={err}");
            std::process::exit(1);
        }
    };

    let mut store = TaskStore::new(gateway);
    if let LoadOutcome::Recovered(err) = store.load() {
        eprintln!("tasklist db={db_path} status=recovered error={err}");
    }

    let counts = store.counts();
    println!(
        "tasklist db={db_path} total={} active={} completed={}",
        counts.total, counts.active, counts.completed
    );
    for selector in [FilterSelector::High, FilterSelector::Medium, FilterSelector::Low] {
        println!(
            "tasklist priority={} count={}",
            selector,
            store.filtered(selector).len()
        );
    }
}

//! Observer Demonstration
//!
//! Observes a "task list" query and keeps a rendered copy of it in sync
//! using only the change callbacks.
#![allow(clippy::unwrap_used, clippy::expect_used)]
//!
//! Key concepts illustrated:
//! 1. Initial items arrive as `added`
//! 2. Reruns deliver removed, changed, moved, added with apply-time indices
//! 3. Re-entrant invalidation from a callback is deferred
//! 4. Bad snapshots go to the runtime error channel

use compobs_core::diff::{diff, render_summary};
use compobs_core::logging_facility::{init, Profile};
use compobs_core::{observe, ItemPolicy, ManualRuntime, ObserveCallbacks, ObserveOptions};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

fn task(id: i64, title: &str, done: bool) -> Value {
    json!({ "id": id, "title": title, "done": done })
}

fn render(rows: &[Value]) -> String {
    rows.iter()
        .map(|row| {
            let mark = if row["done"] == true { "x" } else { " " };
            format!("[{}] {}", mark, row["title"].as_str().unwrap_or("?"))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);
    println!("=== Computation Observer Demo ===\n");

    let tasks = Rc::new(RefCell::new(vec![
        task(1, "write parser", false),
        task(2, "review diff", false),
        task(3, "ship", false),
    ]));
    let rendered: Rc<RefCell<Vec<Value>>> = Rc::new(RefCell::new(Vec::new()));
    let runtime = ManualRuntime::new();

    let (on_added, on_removed, on_changed, on_moved) = (
        rendered.clone(),
        rendered.clone(),
        rendered.clone(),
        rendered.clone(),
    );
    let callbacks = ObserveCallbacks::new()
        .on_added(move |item: &Value, index| {
            println!("  + {} at {}", item["title"], index);
            on_added.borrow_mut().insert(index, item.clone());
            Ok(())
        })
        .on_removed(move |key, index| {
            println!("  - {} at {}", key, index);
            on_removed.borrow_mut().remove(index);
            Ok(())
        })
        .on_changed(move |key, old, new| {
            println!("  ~ {}: {} -> {}", key, old, new);
            let mut rows = on_changed.borrow_mut();
            if let Some(row) = rows.iter_mut().find(|row| row["id"] == new["id"]) {
                *row = new.clone();
            }
            Ok(())
        })
        .on_moved(move |key, from, to| {
            println!("  > {} {} -> {}", key, from, to);
            let mut rows = on_moved.borrow_mut();
            let row = rows.remove(from);
            rows.insert(to, row);
            Ok(())
        });

    // ===== Part 1: Start =====
    println!("## Part 1: Start\n");
    let reader = tasks.clone();
    let observer = observe(
        runtime.clone(),
        move || reader.borrow().clone(),
        callbacks,
        ObserveOptions::new(),
    )?;
    println!("\nRendered: {}\n", render(&rendered.borrow()));

    // ===== Part 2: Rerun =====
    println!("## Part 2: Rerun\n");
    *tasks.borrow_mut() = vec![
        task(3, "ship", false),
        task(1, "write parser", true),
        task(4, "write docs", false),
    ];
    runtime.invalidate_all();
    println!("\nRendered: {}\n", render(&rendered.borrow()));
    assert_eq!(*rendered.borrow(), *tasks.borrow());

    // ===== Part 3: Rejected snapshot =====
    println!("## Part 3: Rejected snapshot\n");
    tasks.borrow_mut().push(task(4, "duplicate", false));
    runtime.invalidate_all();
    for err in runtime.take_errors() {
        println!("  runtime error: {}", err);
    }
    println!("  baseline still holds {} items\n", observer.baseline_len());
    tasks.borrow_mut().pop();

    // ===== Part 4: Offline diff =====
    println!("## Part 4: Offline diff\n");
    let before = vec![task(1, "a", false), task(2, "b", false)];
    let after = vec![task(2, "b", false), task(3, "c", false)];
    let changes = diff(&before, &after, &ItemPolicy::new())?;
    println!("{}", render_summary(&changes));
    println!("{}", serde_json::to_string_pretty(&changes)?);

    observer.stop();
    println!("Observer stopped after {} cycles", observer.cycles_run());
    Ok(())
}

//! Command-line walkthrough of the todo store.
//!
//! Fetches the mock list, then toggles, deletes and adds while a background
//! subscriber logs every applied action.

use std::sync::Arc;
use todo_store::{Todo, TodoConfig, TodoStore};
use todo_store_core::environment::SystemClock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_todos(title: &str, todos: &[Todo]) {
    println!("\n{title} ({}):", todos.len());
    for todo in todos {
        let status = if todo.is_completed { "✓" } else { " " };
        println!("  [{status}] {:<16} {} (id {})", todo.content, todo.created_at, todo.id);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_store=debug,todo_store_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = TodoConfig::from_env()?;
    tracing::info!(?config, "Starting todo demo");

    let store = TodoStore::with_config(&config, Arc::new(SystemClock))?;

    let mut actions = store.subscribe();
    let observer = tokio::spawn(async move {
        while let Ok(action) = actions.recv().await {
            tracing::info!(?action, "Observed action");
        }
    });

    println!("=== Todo Store Demo ===");

    println!("\nFetching todos ({} ms simulated latency)...", config.fetch_delay.as_millis());
    store.fetch_todos().await?;
    print_todos("Fetched", &store.todos().await);

    println!("\n>>> Toggling '1'");
    store.toggle_todo("1").await?;

    println!(">>> Deleting '2'");
    store.delete_todo("2").await?;

    println!(">>> Adding 'buy milk'");
    store.add_todo("buy milk").await?;

    println!(">>> Toggling 'nonexistent' (ignored)");
    store.toggle_todo("nonexistent").await?;

    let state = store.snapshot().await;
    print_todos("Current", &state.todos);
    println!(
        "\nCompleted: {}/{}  loading: {}",
        state.completed_count(),
        state.count(),
        state.loading
    );

    drop(store);
    observer.await?;

    println!("\n=== Demo Complete ===");
    Ok(())
}

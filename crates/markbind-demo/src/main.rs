#![forbid(unsafe_code)]

//! markbind counter page demo
//!
//! Builds the page, clicks through it, resets it, and prints the markup after
//! each step.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=markbind_runtime=debug,markbind_demo=info cargo run -p markbind-demo
//! ```

use markbind_demo::Page;
use tracing_subscriber::EnvFilter;

fn main() -> markbind::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut page = Page::new()?;
    page.run_pending()?;
    println!("built:\n{}\n", page.markup());

    let buttons = page.counter_buttons();
    for &button in &buttons {
        page.click(button)?;
    }
    if let Some(&first) = buttons.first() {
        page.click(first)?;
    }
    page.run_pending()?;
    println!("after clicks {:?}:\n{}\n", page.displays(), page.markup());

    if let Some(reset) = page.reset_button() {
        page.click(reset)?;
    }
    page.run_pending()?;
    println!("after reset {:?}:\n{}", page.displays(), page.markup());
    Ok(())
}

//! Nested chains - a composed chain used as one middleware of another.
//!
//! The inner chain runs its own stack and then resumes the outer chain
//! where it left off.
//!
//! # Running
//!
//! ```text
//! cargo run --example nested
//! ```

use std::sync::{Arc, Mutex};

use middleware_compose::{middleware_fn, Composer, Next, SharedMiddleware};

#[derive(Default)]
struct Journal {
    lines: Mutex<Vec<String>>,
}

fn step(name: &'static str) -> SharedMiddleware<Journal, ()> {
    middleware_fn(move |ctx: Arc<Journal>, next: Next<Journal, ()>| async move {
        ctx.lines.lock().unwrap().push(format!("enter {}", name));
        next.run().await?;
        ctx.lines.lock().unwrap().push(format!("leave {}", name));
        Ok(())
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let auth = Composer::<Journal, ()>::new()
        .label("auth")
        .with_middleware(step("session"))
        .with_middleware(step("permissions"))
        .build();

    let app = Composer::<Journal, ()>::new()
        .label("app")
        .with_middleware(step("logger"))
        .with_middleware(Arc::new(auth))
        .with_middleware(step("router"))
        .build();

    println!("{:?}", app);

    let journal = Arc::new(Journal::default());
    app.run(journal.clone()).await?;

    for line in journal.lines.lock().unwrap().iter() {
        println!("{}", line);
    }

    Ok(())
}

//! Request logging - the classic onion example.
//!
//! This demo shows:
//! - Building a chain with the fluent builder
//! - Doing work both before and after `next.run()`
//! - Passing a terminal per run
//!
//! # Running
//!
//! ```text
//! cargo run --example logging
//! ```

use std::sync::{Arc, Mutex};
use std::time::Instant;

use middleware_compose::{ComposeError, Composer};

/// Minimal request context.
#[derive(Debug)]
struct Request {
    path: String,
    headers: Mutex<Vec<(String, String)>>,
}

impl Request {
    fn new(path: &str) -> Arc<Self> {
        Arc::new(Self {
            path: path.to_string(),
            headers: Mutex::new(Vec::new()),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let chain = Composer::<Request, u16>::new()
        .label("http")
        .with_named("logger", |req, next| async move {
            let started = Instant::now();
            println!("--> {}", req.path);
            let status = next.run().await?;
            println!("<-- {} {} ({:?})", req.path, status, started.elapsed());
            Ok(status)
        })
        .with_named("errors", |_req, next| async move {
            match next.run().await {
                Ok(status) => Ok(status),
                Err(e) => {
                    println!("    handler failed: {}", e);
                    Ok(500)
                }
            }
        })
        .with_named("request-id", |req, next| async move {
            req.headers
                .lock()
                .unwrap()
                .push(("x-request-id".to_string(), "42".to_string()));
            next.run().await
        })
        .build();

    println!("{}", chain.schema().to_json());

    for path in ["/", "/missing", "/boom"] {
        let req = Request::new(path);
        chain
            .run_with_fn(req.clone(), |req, _next| async move {
                match req.path.as_str() {
                    "/" => Ok(200),
                    "/boom" => Err(ComposeError::msg("router exploded")),
                    _ => Ok(404),
                }
            })
            .await?;
        println!("    headers: {:?}", req.headers.lock().unwrap());
    }

    Ok(())
}

//! # Stock Sphere
//!
//! Command-line client for the Stock Sphere backend.
//!
//! - `stock-sphere` prints the feed, newest first
//! - `stock-sphere post <text>` publishes a post, then prints the feed
//! - `stock-sphere courses` prints the course catalog

use sphere_app::render::{course_line, post_line};
use sphere_app::startup::{print_banner, print_startup_info};
use sphere_app::AppBuilder;
use sphere_config::ConfigLoader;
use sphere_core::telemetry::init_telemetry;
use sphere_core::SphereResult;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!("Application error: {}", e);
        eprintln!("stock-sphere: {}", e.display_message());
        std::process::exit(1);
    }
}

async fn run() -> SphereResult<()> {
    let config_loader = ConfigLoader::from_default_location()?;
    let config = config_loader.get().await;
    init_telemetry(&config.observability)?;

    print_banner();
    print_startup_info(&config);

    let app = AppBuilder::new().with_config(config).build()?;
    if let Some(principal) = app.sign_in().await? {
        info!(principal = %principal, "Signed in");
    }

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("post") => {
            let content = args.collect::<Vec<_>>().join(" ");
            app.publish(&content).await?;
            info!("Post published");
        }
        Some("courses") => {
            for course in app.courses().await? {
                println!("{}", course_line(&course));
            }
            app.shutdown();
            return Ok(());
        }
        Some(other) => {
            info!(command = other, "Unknown command; showing the feed");
        }
        None => {}
    }

    for post in app.feed().await? {
        println!("{}", post_line(&post));
    }
    app.shutdown();
    Ok(())
}

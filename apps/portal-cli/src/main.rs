//! # Portal Sync Driver
//!
//! Runs one sync flow against the academic-records service and prints the
//! report.
//!
//! ## Usage
//! ```bash
//! # COMMON flow (default) against ./portal.db
//! PORTAL_USERNAME=2201734522 PORTAL_PASSWORD=... cargo run -p portal-cli
//!
//! # First-run bootstrap
//! cargo run -p portal-cli -- --flow INIT
//!
//! # Course resources for specific courses (course:section)
//! cargo run -p portal-cli -- --flow RESOURCES --course COMP6047:BA01
//!
//! # Custom database path
//! cargo run -p portal-cli -- --db ./data/portal.db
//! ```
//!
//! Credentials are read from `PORTAL_USERNAME`/`PORTAL_PASSWORD` on each run
//! and stored in the preference table; later runs fall back to the stored
//! values when the variables are absent.

use std::env;

use portal_core::CourseRef;
use portal_db::{Database, DbConfig};
use portal_sync::{PortalClient, SyncAgent, SyncConfig, SyncError, SyncFlow};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut flow_kind = String::from("COMMON");
    let mut db_path = String::from("./portal.db");
    let mut courses: Vec<CourseRef> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--flow" | "-f" => {
                if i + 1 < args.len() {
                    flow_kind = args[i + 1].to_uppercase();
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--course" | "-c" => {
                if i + 1 < args.len() {
                    if let Some(course) = parse_course(&args[i + 1]) {
                        courses.push(course);
                    }
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(2);
            }
        }
        i += 1;
    }

    let config = SyncConfig::load_or_default(None);
    config.validate()?;

    let db = Database::new(DbConfig::new(&db_path)).await?;

    // Seed credentials from the environment when provided; otherwise the
    // values already in the preference table are used.
    if let (Ok(username), Ok(password)) =
        (env::var("PORTAL_USERNAME"), env::var("PORTAL_PASSWORD"))
    {
        db.prefs().set_credentials(&username, &password).await?;
    }

    let flow = SyncFlow::parse(
        &flow_kind,
        if courses.is_empty() {
            None
        } else {
            Some(courses)
        },
    )?;

    info!(flow = flow.kind(), db = %db_path, "Starting sync");

    let agent = SyncAgent::new(PortalClient::new(&config)?, db);

    let mut failure: Option<SyncError> = None;
    agent
        .sync_with(
            flow,
            |report| {
                println!("Sync complete ({})", report.flow);
                if report.flow == "COMMON" {
                    println!("  terms:           {}", report.terms);
                    println!("  sessions:        {}", report.sessions);
                    println!("  exams:           {}", report.exams);
                    println!("  finances:        {}", report.finances);
                    println!("  journal entries: {}", report.entries);
                }
                if report.flow == "RESOURCES" {
                    println!("  resources:       {}", report.resources);
                }
            },
            |error| failure = Some(error),
        )
        .await;

    match failure {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Parses `COURSE_ID:SECTION` into a course reference.
fn parse_course(raw: &str) -> Option<CourseRef> {
    let (course_id, class_section) = raw.split_once(':')?;
    if course_id.is_empty() || class_section.is_empty() {
        return None;
    }
    Some(CourseRef {
        course_id: course_id.to_string(),
        class_section: class_section.to_string(),
    })
}

fn print_usage() {
    println!("Usage: portal [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -f, --flow <KIND>      Flow to run: INIT | COMMON | RESOURCES (default COMMON)");
    println!("  -d, --db <PATH>        SQLite database path (default ./portal.db)");
    println!("  -c, --course <ID:SEC>  Course for the RESOURCES flow (repeatable)");
    println!("  -h, --help             Show this help");
    println!();
    println!("Environment:");
    println!("  PORTAL_USERNAME / PORTAL_PASSWORD   Credentials (stored on first use)");
    println!("  PORTAL_BASE_URL                     Override the portal service root");
    println!("  RUST_LOG                            Log filter (default info)");
}

mod utils;
mod models;
use dotenv::dotenv;
use log::{error, info};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use crate::utils::snapshot::{diff_grades, snapshot_path};
use crate::utils::stisys::{extract_results, retrieve_results};
use crate::utils::telegram::{new_grades_message, send};

// Entry point for the async main function, powered by tokio runtime.
#[tokio::main]
async fn main() {
    // Loads environment variables from a `.env` file, if present.
    dotenv().ok();

    // Initializes logging with simplelog to the terminal with mixed output (both stdout and stderr) and automatic color support.
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto
    ).unwrap();

    // Retrieves the results page as whitespace-collapsed HTML from STiSys.
    let page = match retrieve_results().await {
        Ok(page) => {
            info!("Results page retrieved successfully");
            page
        },
        Err(e) => {
            error!("Error retrieving results: {}", e);
            return;
        },
    };

    // Extracts the course -> grade mapping from the page.
    let grades = match extract_results(&page) {
        Ok(grades) => {
            info!("Extracted {} course entries", grades.len());
            grades
        },
        Err(e) => {
            error!("Error extracting results: {}", e);
            return;
        },
    };

    // Compares against the snapshot from the previous run and persists the current state.
    let diffs = match diff_grades(&snapshot_path(), &grades) {
        Ok(diffs) => diffs,
        Err(e) => {
            error!("Error comparing against the previous snapshot: {}", e);
            return;
        },
    };

    let new_grades = match diffs {
        // First run, nothing to compare against yet.
        None => {
            info!("Baseline stored, nothing to compare against yet");
            return;
        },
        Some(diffs) if diffs.is_empty() => {
            info!("No new grades found");
            return;
        },
        Some(diffs) => diffs,
    };

    // Constructs a message from the newly posted grades and sends it via Telegram.
    let message = new_grades_message(&new_grades);
    send(&message).await;
}

use std::collections::HashMap;
use std::env;
use anyhow::{anyhow, Context};
use regex::Regex;
use reqwest::Client;
use crate::models::GradeMap;
use anyhow::Result;

const LOGIN_URL: &str = "https://stisys.haw-hamburg.de/login.do";
const RESULTS_URL: &str = "https://stisys.haw-hamburg.de/viewExaminationData.do";

// Asynchronously retrieves the results page from STiSys, handling login and the results request.
pub async fn retrieve_results() -> Result<String> {

    let client = Client::builder()
        .cookie_store(true)
        .build()
        .context("Failed to build the client")?;

    let username = env::var("STISYS_USERNAME").context("STISYS_USERNAME environment variable not found")?;
    let password = env::var("STISYS_PASSWORD").context("STISYS_PASSWORD environment variable not found")?;

    let login_data = HashMap::from([
        ("username", username.as_str()),
        ("password", password.as_str()),
    ]);

    let login_response = client.post(LOGIN_URL)
        .form(&login_data)
        .send()
        .await
        .context("Failed to send login request")?;

    if !login_response.status().is_success() {
        return Err(anyhow::Error::msg("Login failed, check your credentials and try again."));
    }

    // The session cookie set by the login POST authenticates the results request.
    let results_response = client.get(RESULTS_URL)
        .send()
        .await
        .context("Failed to send results request")?;

    let body = results_response.text().await.context("Failed to read response text")?;
    Ok(collapse_whitespace(&body))
}

// Collapses all whitespace runs (including newlines) into single spaces so the
// positional patterns can match across the whole page.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Scans the collapsed page for result cells, in encounter order. Course names sit
// between `<td></td> <td>` and `&nbsp`, grade values between `"right">` and `</td>`,
// so a well-formed page yields an alternating course, grade, course, grade sequence.
fn scan_cells(page: &str) -> Vec<String> {
    let pattern = Regex::new(r#"<td></td> <td>(.+?)&nbsp|"right">(.+?)</td>"#).unwrap();

    let mut cells = Vec::new();
    for caps in pattern.captures_iter(page) {
        if let Some(m) = caps.get(1).or_else(|| caps.get(2)) {
            let cell = m.as_str().trim();
            if !cell.is_empty() {
                cells.push(cell.to_string());
            }
        }
    }
    cells
}

// Extracts the course -> grade mapping from the results page, pairing each course
// cell with the grade cell that follows it.
pub fn extract_results(page: &str) -> Result<GradeMap> {
    let cells = scan_cells(page);

    if cells.len() % 2 != 0 {
        return Err(anyhow!(
            "Results page format changed: expected course/grade pairs, found {} cells",
            cells.len()
        ));
    }

    Ok(cells
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect())
}

//! Load test for the participant registration endpoint (`POST /api/users`).
//!
//! ```text
//! load_test -u http://localhost:5001 -a 1 -n 1000 -c 50
//! load_test -u http://localhost:5001 -a 1 -n 100 -c 10 --groups "Group 1,Group 2"
//! load_test -u http://localhost:5001 -a 1 -n 100 -c 10 --delay 0.1 0.5
//! ```

use clap::Parser;
use qna_backend::stats::LatencySummary;
use rand::Rng;
use rand::distributions::Alphanumeric;
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};

#[derive(Parser, Debug)]
#[command(about = "Stress test the registration API with concurrent join requests")]
struct Args {
    /// Base URL of the server, e.g. http://localhost:5001
    #[arg(short, long)]
    url: String,

    /// Activity to register participants into
    #[arg(short, long)]
    activity_id: i32,

    /// Total number of registration requests
    #[arg(short, long, default_value_t = 100)]
    num_requests: usize,

    /// Maximum in-flight requests
    #[arg(short, long, default_value_t = 10)]
    concurrency: usize,

    /// Comma-separated group names to assign randomly
    #[arg(long, value_delimiter = ',')]
    groups: Option<Vec<String>>,

    /// Random delay range between request submissions, in seconds
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    delay: Option<Vec<f64>>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,
}

#[derive(Default)]
struct LoadTestResult {
    completed: usize,
    successful: usize,
    failed: usize,
    latencies: Vec<f64>,
    errors: Vec<String>,
}

/// Reorders a user-supplied MIN MAX pair so sampling never sees an
/// inverted range.
fn ordered_range(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

fn random_name(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

async fn send_register_request(
    client: &reqwest::Client,
    base_url: &str,
    activity_id: i32,
    name: &str,
    group_name: Option<&str>,
) -> Result<(), String> {
    let mut payload = json!({ "activity_id": activity_id, "name": name });
    if let Some(group) = group_name {
        payload["group_name"] = json!(group);
    }

    match client
        .post(format!("{base_url}/api/users"))
        .json(&payload)
        .send()
        .await
    {
        Ok(response) if response.status() == StatusCode::CREATED => Ok(()),
        Ok(response) => {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(100).collect();
            Err(format!("HTTP {status}: {snippet}"))
        }
        Err(e) if e.is_timeout() => Err("request timed out".to_string()),
        Err(e) if e.is_connect() => Err("connection error".to_string()),
        Err(e) => Err(format!("request error: {e}")),
    }
}

fn print_statistics(result: &LoadTestResult, total_time: f64) {
    println!("\n{}", "=".repeat(60));
    println!("Load test results");
    println!("{}", "=".repeat(60));
    println!("Total requests:      {}", result.completed);
    println!("Successful requests: {}", result.successful);
    println!("Failed requests:     {}", result.failed);
    if result.completed > 0 {
        println!(
            "Success rate:        {:.2}%",
            result.successful as f64 / result.completed as f64 * 100.0
        );
    }
    println!("\nTotal time:          {total_time:.2}s");
    if total_time > 0.0 {
        println!(
            "Request rate:        {:.2} req/s",
            result.completed as f64 / total_time
        );
    }

    if let Some(summary) = LatencySummary::from_samples(&result.latencies) {
        println!();
        summary.print("Response times", "");
    }

    if !result.errors.is_empty() {
        println!("\nSample errors (first 5):");
        for (i, error) in result.errors.iter().take(5).enumerate() {
            println!("  {}. {error}", i + 1);
        }
    }
    println!("{}", "=".repeat(60));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let base_url = args.url.trim_end_matches('/').to_string();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    println!("Starting load test...");
    println!("Target URL:       {base_url}/api/users");
    println!("Activity id:      {}", args.activity_id);
    println!("Total requests:   {}", args.num_requests);
    println!("Concurrency:      {}", args.concurrency);
    println!("{}", "-".repeat(60));

    let semaphore = Arc::new(Semaphore::new(args.concurrency));
    let result = Arc::new(Mutex::new(LoadTestResult::default()));
    let progress_every = (args.num_requests / 10).max(1);

    let started = Instant::now();
    let mut handles = Vec::with_capacity(args.num_requests);

    for i in 0..args.num_requests {
        let group_name = args.groups.as_ref().map(|groups| {
            let idx = rand::thread_rng().gen_range(0..groups.len());
            groups[idx].clone()
        });

        if let Some(delay) = &args.delay {
            if i + 1 < args.num_requests {
                let (min, max) = ordered_range(delay[0], delay[1]);
                let wait = rand::thread_rng().gen_range(min..=max);
                tokio::time::sleep(Duration::from_secs_f64(wait.max(0.0))).await;
            }
        }

        let client = client.clone();
        let base_url = base_url.clone();
        let semaphore = semaphore.clone();
        let result = result.clone();
        let activity_id = args.activity_id;
        let num_requests = args.num_requests;

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");

            let name = format!("load_user_{i}_{}", random_name(6));
            let start = Instant::now();
            let outcome = send_register_request(
                &client,
                &base_url,
                activity_id,
                &name,
                group_name.as_deref(),
            )
            .await;
            let elapsed = start.elapsed().as_secs_f64();

            let mut result = result.lock().await;
            result.completed += 1;
            result.latencies.push(elapsed);
            match outcome {
                Ok(()) => result.successful += 1,
                Err(message) => {
                    result.failed += 1;
                    if result.errors.len() < 32 {
                        result.errors.push(message);
                    }
                }
            }

            if result.completed % progress_every == 0 || result.completed == num_requests {
                println!(
                    "Progress: {}/{} ({:.1}%) - ok: {}, failed: {}",
                    result.completed,
                    num_requests,
                    result.completed as f64 / num_requests as f64 * 100.0,
                    result.successful,
                    result.failed
                );
            }
        }));
    }

    for handle in handles {
        handle.await?;
    }

    let total_time = started.elapsed().as_secs_f64();
    print_statistics(&*result.lock().await, total_time);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_names_are_alphanumeric() {
        let name = random_name(8);
        assert_eq!(name.len(), 8);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn distinct_names_across_calls() {
        assert_ne!(random_name(12), random_name(12));
    }

    #[test]
    fn swapped_delay_bounds_are_reordered() {
        assert_eq!(ordered_range(0.5, 0.1), (0.1, 0.5));
        assert_eq!(ordered_range(0.1, 0.5), (0.1, 0.5));
        assert_eq!(ordered_range(0.2, 0.2), (0.2, 0.2));
    }
}

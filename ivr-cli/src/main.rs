//! ivr-cli — command-line client for the IVR call records HTTP API
//!
//! # Subcommands
//! - `list [--json]`                 — all call records
//! - `get <id>`                      — one call record
//! - `create <record>`               — create from JSON (inline or `@file`)
//! - `upsert <id> <record>`          — insert or replace
//! - `patch <id> [--call-status ..]` — update selected fields
//! - `delete <id>`                   — delete
//! - `status`                        — show server health

use clap::{Parser, Subcommand};
use ivr_core::{CallRecord, CallUpdate};
use reqwest::blocking::{Client, RequestBuilder};

const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "ivr-cli", version, about = "IVR call records API client")]
struct Cli {
    /// Server URL (overrides IVR_HTTP_URL env var)
    #[arg(long, env = "IVR_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every call record
    List {
        /// Print the raw JSON array instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one call record
    Get { id: i64 },

    /// Create a call record from JSON text, or `@path` to read a file
    Create { record: String },

    /// Insert or fully replace the record at <id>
    Upsert { id: i64, record: String },

    /// Update selected fields of a call record
    Patch {
        id: i64,

        #[arg(long)]
        customer_response: Option<String>,

        #[arg(long)]
        call_status: Option<String>,

        #[arg(long)]
        confidence_score: Option<f64>,

        #[arg(long)]
        agent_action_required: Option<String>,
    },

    /// Delete a call record
    Delete { id: i64 },

    /// Show server status
    Status,
}

// ============================================================================
// Payload helpers
// ============================================================================

/// Parse a full record from inline JSON or `@path`, checking it locally first.
pub fn parse_record(arg: &str) -> anyhow::Result<CallRecord> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path, e))?,
        None => arg.to_string(),
    };
    let record: CallRecord = serde_json::from_str(&text)
        .map_err(|e| anyhow::anyhow!("invalid call record JSON: {}", e))?;
    record.validate()?;
    Ok(record)
}

/// Build a PATCH body from the supplied flags; at least one is required.
pub fn build_update(
    customer_response: Option<String>,
    call_status: Option<String>,
    confidence_score: Option<f64>,
    agent_action_required: Option<String>,
) -> anyhow::Result<CallUpdate> {
    let update = CallUpdate {
        customer_response,
        call_status,
        confidence_score,
        agent_action_required,
    };
    if update.is_empty() {
        anyhow::bail!("patch needs at least one field flag");
    }
    update.validate()?;
    Ok(update)
}

/// Compact fixed-width table for `list`.
pub fn render_table(records: &[CallRecord]) -> String {
    let mut out = format!(
        "{:<8} {:<20} {:<14} {:<12} {:>6}  {}\n",
        "CALL_ID", "CUSTOMER", "PHONE", "STATUS", "CONF", "ACTION"
    );
    for r in records {
        out.push_str(&format!(
            "{:<8} {:<20} {:<14} {:<12} {:>6.2}  {}\n",
            r.call_id,
            truncate(&r.customer_name, 20),
            truncate(&r.phone_number, 14),
            truncate(&r.call_status, 12),
            r.confidence_score,
            r.agent_action_required
        ));
    }
    out
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(width.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

fn client() -> anyhow::Result<Client> {
    Ok(Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?)
}

/// Send a request and return the JSON body, exiting with the server's
/// detail message on a non-success status.
fn send(request: RequestBuilder, url: &str) -> anyhow::Result<serde_json::Value> {
    let resp = match request.send() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ivr-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    };

    let status = resp.status();
    let body: serde_json::Value = resp.json().unwrap_or_default();
    if !status.is_success() {
        let detail = body["detail"].as_str().unwrap_or("no detail");
        eprintln!("ivr-cli: server returned {}: {}", status, detail);
        std::process::exit(1);
    }
    Ok(body)
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn do_list(server: &str, json_output: bool) -> anyhow::Result<()> {
    let url = format!("{}/calls", server);
    let body = send(client()?.get(&url), &url)?;

    if json_output {
        return print_json(&body);
    }
    let records: Vec<CallRecord> = serde_json::from_value(body)?;
    if records.is_empty() {
        eprintln!("No call records.");
        return Ok(());
    }
    print!("{}", render_table(&records));
    Ok(())
}

fn do_get(server: &str, id: i64) -> anyhow::Result<()> {
    let url = format!("{}/calls/{}", server, id);
    print_json(&send(client()?.get(&url), &url)?)
}

fn do_create(server: &str, record: CallRecord) -> anyhow::Result<()> {
    let url = format!("{}/calls", server);
    print_json(&send(client()?.post(&url).json(&record), &url)?)
}

fn do_upsert(server: &str, id: i64, record: CallRecord) -> anyhow::Result<()> {
    let url = format!("{}/calls/{}", server, id);
    print_json(&send(client()?.put(&url).json(&record), &url)?)
}

fn do_patch(server: &str, id: i64, update: CallUpdate) -> anyhow::Result<()> {
    let url = format!("{}/calls/{}", server, id);
    print_json(&send(client()?.patch(&url).json(&update), &url)?)
}

fn do_delete(server: &str, id: i64) -> anyhow::Result<()> {
    let url = format!("{}/calls/{}", server, id);
    print_json(&send(client()?.delete(&url), &url)?)
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let url = format!("{}/health", server);
    match client.get(&url).send() {
        Ok(r) if r.status().is_success() => {
            let body: serde_json::Value = r.json().unwrap_or_default();
            println!("IVR server: {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Version:    {}", body["version"].as_str().unwrap_or("?"));
            println!("Store:      {}", body["store"].as_str().unwrap_or("?"));
            println!("Records:    {}", body["records"].as_u64().unwrap_or(0));
        }
        Ok(r) => {
            let status = r.status();
            let body: serde_json::Value = r.json().unwrap_or_default();
            eprintln!(
                "ivr-cli: server unhealthy (HTTP {}): {}",
                status,
                body["error"].as_str().unwrap_or("?")
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("ivr-cli: cannot reach {}: {}", url, e);
            std::process::exit(1);
        }
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::List { json } => do_list(&server, json),
        Commands::Get { id } => do_get(&server, id),
        Commands::Create { record } => parse_record(&record).and_then(|r| do_create(&server, r)),
        Commands::Upsert { id, record } => {
            parse_record(&record).and_then(|r| do_upsert(&server, id, r))
        }
        Commands::Patch {
            id,
            customer_response,
            call_status,
            confidence_score,
            agent_action_required,
        } => build_update(
            customer_response,
            call_status,
            confidence_score,
            agent_action_required,
        )
        .and_then(|u| do_patch(&server, id, u)),
        Commands::Delete { id } => do_delete(&server, id),
        Commands::Status => do_status(&server),
    };

    if let Err(e) = result {
        eprintln!("ivr-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================

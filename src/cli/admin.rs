use super::credentials::load_credentials;
use super::http_client::ApiClient;
use crate::types::{BulkTarget, validate_bulk_count};

fn parse_target(target: &str) -> anyhow::Result<BulkTarget> {
    BulkTarget::parse(target).ok_or_else(|| {
        let known: Vec<&str> = BulkTarget::ALL.iter().map(|t| t.path()).collect();
        anyhow::anyhow!("Unknown target '{target}'. Expected one of: {}", known.join(", "))
    })
}

fn check_count(count: i64) -> anyhow::Result<u32> {
    validate_bulk_count(count).map_err(|e| anyhow::anyhow!(e))
}

fn client() -> anyhow::Result<ApiClient> {
    ApiClient::new(&load_credentials()?)
}

pub fn run_admin_seed(target: &str, count: i64) -> anyhow::Result<()> {
    let target = parse_target(target)?;
    let count = check_count(count)?;

    let message = client()?.post_text(&format!("/users/{}/{count}", target.path()))?;
    println!("{message}");
    Ok(())
}

pub fn run_admin_purge(target: &str, count: i64) -> anyhow::Result<()> {
    let target = parse_target(target)?;
    let count = check_count(count)?;

    let message = client()?.delete_text(&format!("/users/{}/{count}", target.path()))?;
    println!("{message}");
    Ok(())
}

pub fn run_admin_page_preference(value: i64) -> anyhow::Result<()> {
    let value = check_count(value)?;

    let message = client()?.patch_text(&format!("/users/pagepreferences/{value}"))?;
    println!("{message}");
    Ok(())
}

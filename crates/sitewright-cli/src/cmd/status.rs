use uuid::Uuid;

use sitewright_core::blocks::validate_website_id;

use crate::output::{print_json, print_table};

pub fn run_status(server: &str, deployment_id: Uuid, json: bool) -> anyhow::Result<()> {
    let url = format!("{server}/api/deployments/{deployment_id}");
    let record: serde_json::Value = ureq::get(&url)
        .call()
        .map_err(super::api_error)?
        .into_json()?;

    if json {
        return print_json(&record);
    }
    println!("deployment: {}", record["deployment_id"].as_str().unwrap_or("?"));
    println!("website:    {}", record["website_id"].as_str().unwrap_or("?"));
    println!("state:      {}", record["state"].as_str().unwrap_or("?"));
    println!("updated:    {}", record["updated_at"].as_str().unwrap_or("?"));
    if let Some(live_url) = record["live_url"].as_str() {
        println!("live url:   {live_url}");
    }
    if let Some(detail) = record["error_detail"].as_str() {
        println!("error:      {detail}");
    }
    Ok(())
}

pub fn run_history(server: &str, website_id: &str, json: bool) -> anyhow::Result<()> {
    validate_website_id(website_id)?;
    let url = format!("{server}/api/websites/{website_id}/deployments");
    let records: serde_json::Value = ureq::get(&url)
        .call()
        .map_err(super::api_error)?
        .into_json()?;

    if json {
        return print_json(&records);
    }
    let empty = vec![];
    let list = records.as_array().unwrap_or(&empty);
    if list.is_empty() {
        println!("No deployments for '{website_id}'.");
        return Ok(());
    }
    let rows = list
        .iter()
        .map(|r| {
            vec![
                r["deployment_id"].as_str().unwrap_or("?").to_string(),
                r["state"].as_str().unwrap_or("?").to_string(),
                r["created_at"].as_str().unwrap_or("?").to_string(),
                r["live_url"].as_str().unwrap_or("-").to_string(),
            ]
        })
        .collect();
    print_table(&["DEPLOYMENT", "STATE", "CREATED", "LIVE URL"], rows);
    Ok(())
}

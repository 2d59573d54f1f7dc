use std::path::Path;

use sitewright_core::blocks::validate_website_id;

use crate::output::print_json;

pub fn run(server: &str, profile_path: &Path, website_id: &str, json: bool) -> anyhow::Result<()> {
    validate_website_id(website_id)?;
    let profile = super::load_profile(profile_path)?;
    profile.validate_for_deploy()?;

    let url = format!("{server}/api/websites/{website_id}/deployments");
    let response: serde_json::Value = ureq::post(&url)
        .send_json(serde_json::json!({ "profile": profile }))
        .map_err(super::api_error)?
        .into_json()?;

    if json {
        return print_json(&response);
    }
    println!(
        "Deployment {} queued for '{}'.",
        response["deployment_id"].as_str().unwrap_or("?"),
        website_id
    );
    println!("Track it with: sitewright status <deployment-id>");
    Ok(())
}

use std::path::Path;

use anyhow::Context;
use sitewright_core::assemble::{assemble, PagePlan};
use sitewright_core::blocks::{default_selection, validate_website_id};
use sitewright_core::config::ComposeConfig;

use crate::output::{print_json, print_table};

pub fn run(
    profile_path: &Path,
    website_id: &str,
    out: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    validate_website_id(website_id)?;
    let profile = super::load_profile(profile_path)?;
    profile.validate_for_deploy()?;

    let config = ComposeConfig::default();
    let selection = default_selection(&profile, website_id);
    let plan = PagePlan::for_profile(&profile, &config);
    let artifact = assemble(&profile, &selection, &plan, &config, chrono::Utc::now())?;

    if let Some(out_dir) = out {
        for (route, page) in &artifact.pages {
            let rel = route.trim_start_matches('/');
            let dir = if rel.is_empty() {
                out_dir.to_path_buf()
            } else {
                out_dir.join(rel)
            };
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            let file = dir.join("index.html");
            std::fs::write(&file, page.full_markup())
                .with_context(|| format!("writing {}", file.display()))?;
        }
        println!(
            "Wrote {} pages for '{}' to {}",
            artifact.pages.len(),
            website_id,
            out_dir.display()
        );
        return Ok(());
    }

    if json {
        return print_json(&artifact);
    }

    let rows = artifact
        .pages
        .iter()
        .map(|(route, page)| {
            vec![
                route.clone(),
                page.title.clone(),
                page.generation_method.to_string(),
                page.word_count.to_string(),
                page.schema_markup.len().to_string(),
            ]
        })
        .collect();
    print_table(&["ROUTE", "TITLE", "METHOD", "WORDS", "SCHEMAS"], rows);
    Ok(())
}

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use catalog_core::{CatalogCollection, NormalizedRecord};
use catalog_logging::catalog_info;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub json_filename: String,
    pub markdown_filename: String,
    pub simple_filename: String,
    pub readme_filename: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            json_filename: "apify_actors.json".to_string(),
            markdown_filename: "APIFY_ACTORS.md".to_string(),
            simple_filename: "apify_actors_simple.txt".to_string(),
            readme_filename: "README.md".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub record_count: usize,
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
    pub simple_path: PathBuf,
    pub readme_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Full record set as a pretty-printed JSON array. Non-ASCII text is kept as-is.
pub fn render_json(collection: &CatalogCollection) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(collection)
}

/// Categorized Markdown directory with a count and timestamp trailer.
pub fn render_markdown(collection: &CatalogCollection, generated_at: &str) -> String {
    let mut buffer = String::new();
    buffer.push_str("# Apify Actors List\n\n");
    buffer.push_str(&format!(
        "Complete list of {} Apify Actors (APIs) available on the Apify platform.\n\n",
        collection.len()
    ));
    buffer.push_str("---\n\n");

    for group in collection.by_category() {
        buffer.push_str(&format!("## {}\n\n", group.heading));
        for record in group.records {
            push_markdown_entry(&mut buffer, record);
        }
        buffer.push('\n');
    }

    buffer.push_str("---\n\n");
    buffer.push_str(&format!("*Total: {} Actors*\n", collection.len()));
    buffer.push_str(&format!("*Last updated: {generated_at}*\n"));
    buffer
}

fn push_markdown_entry(buffer: &mut String, record: &NormalizedRecord) {
    buffer.push_str(&format!("- **[{}]({})**", record.title, record.link()));
    if !record.description.is_empty() {
        buffer.push_str(" - ");
        buffer.push_str(&record.description);
    }
    buffer.push('\n');
}

/// One `title|link` line per record, sorted by title.
pub fn render_simple_list(collection: &CatalogCollection) -> String {
    collection
        .sorted_by_title()
        .into_iter()
        .map(|record| format!("{}|{}\n", record.title, record.link()))
        .collect()
}

/// Longest description shown in the README before it is cut.
const README_DESCRIPTION_CHARS: usize = 200;

/// Landing-page README: statistics, a linked table of contents with
/// per-category counts, then one anchored section per category.
///
/// A record listed twice in one category (same `name` and `username`) is
/// shown once there. Descriptions longer than 200 characters are cut and
/// end in `...`.
pub fn render_readme(
    collection: &CatalogCollection,
    options: &ExportOptions,
    generated_at: &str,
) -> String {
    let groups: Vec<(&str, Vec<&NormalizedRecord>)> = collection
        .by_category()
        .into_iter()
        .map(|group| (group.heading, distinct_records(group.records)))
        .collect();
    let category_count = if collection.iter().any(|record| record.categories.is_empty()) {
        groups.len().saturating_sub(1)
    } else {
        groups.len()
    };

    let mut buffer = String::new();
    buffer.push_str("# Apify Actors Catalog\n\n");
    buffer.push_str(&format!(
        "A collection of **{} Apify Actors** (APIs): ready-to-use web scraping and \
automation tools from the Apify platform.\n\n",
        collection.len()
    ));

    buffer.push_str("### Statistics\n");
    buffer.push_str(&format!("- **Total APIs**: {}\n", collection.len()));
    buffer.push_str(&format!("- **Categories**: {category_count}\n"));
    buffer.push_str(&format!(
        "- **All links include affiliate tracking** (`?{}`)\n\n",
        catalog_core::AFFILIATE_PARAM
    ));

    buffer.push_str("### Additional Files\n");
    buffer.push_str(&format!(
        "- **[{0}]({0})** - Markdown list of all actors organized by category\n",
        options.markdown_filename
    ));
    buffer.push_str(&format!(
        "- **[{0}]({0})** - Full JSON dataset with all actor details\n",
        options.json_filename
    ));
    buffer.push_str(&format!(
        "- **[{0}]({0})** - Plain text list of titles and links\n\n",
        options.simple_filename
    ));

    buffer.push_str("---\n\n");
    buffer.push_str("## Complete API List by Category\n\n");
    buffer.push_str("### Table of Contents\n\n");
    for (heading, records) in &groups {
        buffer.push_str(&format!(
            "- [{heading}](#{}) ({} APIs)\n",
            heading_anchor(heading),
            records.len()
        ));
    }
    buffer.push_str("\n---\n\n");

    for (heading, records) in &groups {
        buffer.push_str(&format!("## {heading} {{#{}}}\n\n", heading_anchor(heading)));
        buffer.push_str(&format!("*{} APIs*\n\n", records.len()));
        for record in records {
            push_readme_entry(&mut buffer, record);
        }
        buffer.push('\n');
    }

    buffer.push_str("---\n\n");
    buffer.push_str("## Notes\n\n");
    buffer.push_str("- APIs are sorted alphabetically within their categories\n");
    buffer.push_str(&format!(
        "- Descriptions are truncated to {README_DESCRIPTION_CHARS} characters\n"
    ));
    buffer.push_str("- This list is generated from the Apify Store API\n\n");
    buffer.push_str("---\n\n");
    buffer.push_str(&format!("*Last updated: {generated_at}*\n"));
    buffer.push_str(&format!("*Total APIs: {}*\n", collection.len()));
    buffer
}

/// Markdown anchor for a heading: lowercased, with every run of characters
/// outside `a-z0-9` collapsed to a single `-`.
pub fn heading_anchor(heading: &str) -> String {
    let mut anchor = String::with_capacity(heading.len());
    let mut in_gap = false;
    for ch in heading.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            anchor.push(ch);
            in_gap = false;
        } else if !in_gap {
            anchor.push('-');
            in_gap = true;
        }
    }
    anchor
}

/// Drops repeats of the same `name` and `username`, keeping the first.
fn distinct_records(records: Vec<&NormalizedRecord>) -> Vec<&NormalizedRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|&record| seen.insert((record.name.as_str(), record.username.as_str())))
        .collect()
}

fn push_readme_entry(buffer: &mut String, record: &NormalizedRecord) {
    let title = [record.title.as_str(), record.name.as_str()]
        .into_iter()
        .find(|text| !text.is_empty())
        .unwrap_or("Unknown");
    buffer.push_str(&format!("- **[{title}]({})**", record.link()));

    let description = &record.description;
    if description.chars().count() > README_DESCRIPTION_CHARS {
        let cut: String = description.chars().take(README_DESCRIPTION_CHARS).collect();
        buffer.push_str(&format!(" - {}...", cut.trim()));
    } else if !description.is_empty() {
        buffer.push_str(" - ");
        buffer.push_str(description);
    }
    buffer.push('\n');
}

/// Renders all four outputs and writes them atomically into `output_dir`.
pub fn write_outputs(
    collection: &CatalogCollection,
    output_dir: &Path,
    options: &ExportOptions,
    generated_at: &str,
) -> Result<ExportSummary, ExportError> {
    let writer = AtomicFileWriter::new(output_dir.to_path_buf());

    let json_path = writer.write(&options.json_filename, &render_json(collection)?)?;
    catalog_info!("Saved {} records to {:?}", collection.len(), json_path);

    let markdown_path = writer.write(
        &options.markdown_filename,
        &render_markdown(collection, generated_at),
    )?;
    catalog_info!("Generated markdown list: {:?}", markdown_path);

    let simple_path = writer.write(&options.simple_filename, &render_simple_list(collection))?;
    catalog_info!("Generated simple list: {:?}", simple_path);

    let readme_path = writer.write(
        &options.readme_filename,
        &render_readme(collection, options, generated_at),
    )?;
    catalog_info!("Generated README: {:?}", readme_path);

    Ok(ExportSummary {
        record_count: collection.len(),
        json_path,
        markdown_path,
        simple_path,
        readme_path,
    })
}

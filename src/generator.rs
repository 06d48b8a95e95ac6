use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use log::{error, info, warn};

use crate::{
    context::Context,
    error::ConvertError,
    index::{merge, write_atomic},
    metadata::{BlogMetadata, BlogRecord},
};

mod frontmatter;
mod utils;

use frontmatter::FrontmatterMap;
use utils::{make_excerpt, make_id, title_from_stem, today};

/// Result of building one post: the artifact, its index entry and the artifact's file name.
#[derive(Debug)]
pub(crate) struct BuiltPost {
    pub record: BlogRecord,
    pub metadata: BlogMetadata,
    pub file_name: String,
}

/// Outcome of a `--convert-all` run.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct BatchReport {
    pub converted: usize,
    pub skipped: usize,
    pub index_entries: usize,
}

fn non_empty<'a>(fields: &'a FrontmatterMap, key: &str) -> Option<&'a str> {
    fields.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

/// Derives the record and index entry of a post from its parsed parts.
pub(crate) fn build(
    ctx: &Context,
    fields: &FrontmatterMap,
    body: &str,
    file_stem: &str,
) -> BuiltPost {
    let title = non_empty(fields, "title")
        .map(str::to_string)
        .unwrap_or_else(|| title_from_stem(file_stem));
    let date = fields.get("date").cloned().unwrap_or_else(today);
    let id = make_id(&title, &date);
    let content = body.trim().to_string();

    let excerpt = non_empty(fields, "excerpt")
        .map(str::to_string)
        .unwrap_or_else(|| make_excerpt(&content, ctx.excerpt_length));
    let thumbnail = fields.get("thumbnail").cloned().unwrap_or_default();
    let file_name = format!("{id}.json");

    BuiltPost {
        metadata: BlogMetadata {
            content_file: ctx.content_file(&file_name),
            id,
            title: title.clone(),
            date: date.clone(),
            excerpt,
            thumbnail,
        },
        record: BlogRecord {
            title,
            date,
            content,
        },
        file_name,
    }
}

/// Converts one markdown file into `<id>.json` and returns its index entry.
pub(crate) fn convert_file(ctx: &Context, path: &Path) -> Result<BlogMetadata, ConvertError> {
    if !path.exists() {
        return Err(ConvertError::MissingInputFile(path.to_owned()));
    }
    let raw = fs::read_to_string(path).map_err(|source| ConvertError::Read {
        path: path.to_owned(),
        source,
    })?;

    let (fields, body) = frontmatter::parse(&raw);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let post = build(ctx, &fields, body, &stem);

    let out_path = ctx.artifact_dir(path).join(&post.file_name);
    let json = serde_json::to_string_pretty(&post.record).map_err(|e| ConvertError::Serialize {
        path: out_path.clone(),
        message: e.to_string(),
    })?;
    write_atomic(&out_path, json.as_bytes())?;

    info!(
        "Converted: {} → {}",
        path.file_name().unwrap_or_default().to_string_lossy(),
        post.file_name
    );
    Ok(post.metadata)
}

fn markdown_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in fs::read_dir(dir).with_context(|| format!("while listing {dir:?}"))? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Converts every `*.md` file directly inside `ctx.blogs_dir`, then merges all
/// new entries into the index and writes it once.
///
/// A file that fails to convert is logged and counted as skipped.
pub(crate) fn convert_all(ctx: &Context) -> anyhow::Result<BatchReport> {
    let dir = &ctx.blogs_dir;
    if !dir.is_dir() {
        return Err(ConvertError::MissingDirectory(dir.to_owned()).into());
    }

    let files = markdown_files(dir)?;
    let mut report = BatchReport::default();
    if files.is_empty() {
        info!("No markdown files found in {dir:?}");
        return Ok(report);
    }
    info!("Found {} markdown files to convert...", files.len());

    let mut converted = vec![];
    for file in &files {
        match convert_file(ctx, file) {
            Ok(metadata) => converted.push(metadata),
            Err(e) => {
                error!("{:#}", anyhow::Error::from(e));
                warn!("Skipped {file:?} due to conversion error");
                report.skipped += 1;
            }
        }
    }
    report.converted = converted.len();

    if converted.is_empty() {
        error!("No files were successfully converted");
        return Ok(report);
    }

    let store = ctx.index_format.store();
    let mut index = store.load(&ctx.index_path);
    for metadata in converted {
        merge(&mut index, metadata);
    }
    info!("Writing {} index {:?}", ctx.index_format, ctx.index_path);
    store
        .save(&ctx.index_path, &index)
        .context("while writing the blog index")?;
    report.index_entries = index.len();

    info!("Successfully converted {} posts", report.converted);
    info!("Created/updated blogs index with {} entries", report.index_entries);
    Ok(report)
}

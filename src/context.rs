use std::path::{Component, Path, PathBuf};

use clap::ArgMatches;

use crate::index::IndexFormat;

pub(crate) const DEFAULT_BLOGS_DIR: &str = "content/blogs";
pub(crate) const DEFAULT_EXCERPT_LENGTH: usize = 200;

/// Settings shared by every step of a conversion run.
///
/// Built once in `main` and handed down by reference, so the pipeline can be
/// driven from tests with an arbitrary directory layout.
#[derive(Debug, Clone)]
pub(crate) struct Context {
    pub blogs_dir: PathBuf,
    /// Where `<id>.json` artifacts go. `None` means next to the source file.
    pub output_dir: Option<PathBuf>,
    pub index_path: PathBuf,
    pub index_format: IndexFormat,
    pub excerpt_length: usize,
    /// Prepended to `<id>.json` in the index's `content_file` field.
    pub content_prefix: String,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_BLOGS_DIR), IndexFormat::Yaml)
    }
}

impl Context {
    pub fn new(blogs_dir: PathBuf, index_format: IndexFormat) -> Self {
        Self {
            index_path: blogs_dir.join(index_format.default_filename()),
            content_prefix: url_path(&blogs_dir),
            blogs_dir,
            output_dir: None,
            index_format,
            excerpt_length: DEFAULT_EXCERPT_LENGTH,
        }
    }

    pub fn from_matches(matches: &ArgMatches) -> Self {
        let blogs_dir: PathBuf = matches
            .get_one::<PathBuf>("blogs_dir")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BLOGS_DIR));
        let index_format = matches
            .get_one::<IndexFormat>("format")
            .copied()
            .unwrap_or_default();

        let mut ctx = Self::new(blogs_dir, index_format);
        if let Some(index) = matches.get_one::<PathBuf>("index") {
            ctx.index_path = index.to_owned();
        }
        if let Some(length) = matches.get_one::<usize>("excerpt_length") {
            ctx.excerpt_length = *length;
        }
        if let Some(out_dir) = matches.get_one::<PathBuf>("output_dir") {
            ctx.content_prefix = url_path(out_dir);
            ctx.output_dir = Some(out_dir.to_owned());
        }
        ctx
    }

    /// Directory the artifact for `source` is written into.
    pub fn artifact_dir(&self, source: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.to_owned(),
            None => source.parent().map(Path::to_path_buf).unwrap_or_default(),
        }
    }

    pub fn content_file(&self, file_name: &str) -> String {
        if self.content_prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.content_prefix.trim_end_matches('/'), file_name)
        }
    }
}

// forward slashes only; an absolute path keeps its leading `/`
fn url_path(path: &Path) -> String {
    let joined = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    if path.has_root() {
        format!("/{joined}")
    } else {
        joined
    }
}

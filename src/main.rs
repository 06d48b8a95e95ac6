use std::path::PathBuf;

use anyhow::Context as _;
use clap::{command, Arg, ArgAction, Command};
use context::{Context, DEFAULT_BLOGS_DIR};
use generator::{convert_all, convert_file};
use index::{update_index, IndexFormat};
use log::info;

mod context;
mod error;
mod generator;
mod index;
mod metadata;

fn cli() -> Command {
    command!()
        .about("Convert markdown blog posts with frontmatter into JSON records and a blog index")
        .args(&[
            Arg::new("file")
                .help("Markdown file to convert")
                .value_parser(clap::value_parser!(PathBuf)),
            Arg::new("convert_all")
                .long("convert-all")
                .help("Convert every markdown file in the blogs directory and rebuild the index")
                .action(ArgAction::SetTrue),
            Arg::new("update_index")
                .short('u')
                .long("update-index")
                .help("Merge the converted post into the blog index")
                .action(ArgAction::SetTrue),
            Arg::new("output_dir")
                .short('o')
                .long("output-dir")
                .help("Directory for the JSON files [default: next to each markdown file]")
                .value_parser(clap::value_parser!(PathBuf)),
            Arg::new("blogs_dir")
                .long("blogs-dir")
                .env("BLOGJSON_DIR")
                .help("Directory of blog posts")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value(DEFAULT_BLOGS_DIR),
            Arg::new("index")
                .long("index")
                .help("Path of the blog index [default: <blogs-dir>/blogs.<format>]")
                .value_parser(clap::value_parser!(PathBuf)),
            Arg::new("format")
                .long("format")
                .env("BLOGJSON_INDEX_FORMAT")
                .help("Index file format: yaml or json")
                .value_parser(|s: &str| s.parse::<IndexFormat>())
                .default_value("yaml"),
            Arg::new("excerpt_length")
                .long("excerpt-length")
                .help("Maximum number of characters in a derived excerpt [default: 200]")
                .value_parser(clap::value_parser!(usize)),
        ])
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut command = cli();
    let matches = command.clone().get_matches();
    let ctx = Context::from_matches(&matches);

    if matches.get_flag("convert_all") {
        let report = convert_all(&ctx)?;
        if report.skipped > 0 {
            info!("{} converted, {} skipped", report.converted, report.skipped);
        }
        return Ok(());
    }

    let Some(file) = matches.get_one::<PathBuf>("file") else {
        command.print_help()?;
        return Ok(());
    };

    let metadata =
        convert_file(&ctx, file).with_context(|| format!("while converting {file:?}"))?;

    if matches.get_flag("update_index") {
        info!("Updating {} index {:?}", ctx.index_format, ctx.index_path);
        let store = ctx.index_format.store();
        update_index(store.as_ref(), &ctx.index_path, metadata)
            .context("while updating the blog index")?;
    }

    println!();
    println!("Conversion complete! Your blog is ready to publish.");
    println!();
    println!("Next steps:");
    println!("1. git add .");
    println!("2. git commit -m 'Add new blog post'");
    println!("3. git push");

    Ok(())
}

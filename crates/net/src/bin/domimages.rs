// ABOUTME: CLI binary that lists, and optionally preloads, every image a page or file references.
// ABOUTME: Scans HTML/CSS files or stdin as text, or loads a live page with its stylesheets.

use std::fs;
use std::io::{self, Read, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use domimages_core::{preload, unique_images, DomImages, Element, Options, PreloadReport, Source};
use domimages_net::{init_logging, load_page, FetchOptions, HttpImageLoader};
use serde::Serialize;
use url::Url;

const USER_AGENT: &str = concat!("domimages/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scope {
    /// Tags, inline styles and stylesheets
    All,
    Tags,
    Inline,
    Stylesheets,
}

#[derive(Parser, Debug)]
#[command(name = "domimages")]
#[command(about = "List every image referenced by a page, an HTML file or a CSS file")]
struct Args {
    /// HTML or CSS file to scan as text; `-` reads stdin
    #[arg(conflicts_with = "url")]
    input: Option<PathBuf>,

    /// Load a live page (HTML plus linked stylesheets) instead of a file
    #[arg(long = "url")]
    url: Option<String>,

    /// CSS selector of the element whose markup is scanned (live pages only, default: body)
    #[arg(long = "selector", requires = "url")]
    selector: Option<String>,

    /// Which surfaces to report; results are always normalized and deduplicated
    #[arg(long = "scope", value_enum, default_value = "all")]
    scope: Scope,

    /// Preload every image found and report the outcome
    #[arg(long = "preload")]
    preload: bool,

    /// Base URL for preloading relative image URLs (defaults to the page URL)
    #[arg(long = "base-url")]
    base_url: Option<String>,

    /// Maximum number of images loading at once (default: unbounded)
    #[arg(long = "concurrency")]
    concurrency: Option<NonZeroUsize>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", default_value_t = 30)]
    timeout: u64,

    /// Allow fetching from private/local networks
    #[arg(long = "allow-private-networks")]
    allow_private_networks: bool,

    /// Engine options as a JSON object, e.g. '{"skip_dns_name": false}'
    #[arg(long = "options")]
    options: Option<String>,

    /// Output as JSON instead of one URL per line
    #[arg(long = "json")]
    json_output: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// More log output (-v, -vv); RUST_LOG overrides
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct Output<'a> {
    images: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    preload: Option<&'a PreloadReport>,
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("error reading stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("error reading file {:?}", path))
}

fn format_output(
    images: &[String],
    report: Option<&PreloadReport>,
    json_output: bool,
) -> anyhow::Result<String> {
    if json_output {
        let output = Output {
            images,
            preload: report,
        };
        return Ok(serde_json::to_string_pretty(&output)?);
    }
    Ok(images.join("\n"))
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let options = match &args.options {
        Some(json) => Options::from_json(json).context("invalid --options")?,
        None => Options::default(),
    };

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(args.timeout))
        .build()
        .context("error building HTTP client")?;
    let fetch_opts = FetchOptions {
        allow_private_networks: args.allow_private_networks,
        ..Default::default()
    };

    let (engine, page_url) = match (&args.url, &args.input) {
        (Some(url), _) => {
            let page = load_page(&client, url, &fetch_opts).await?;
            let mut builder = DomImages::builder().host(page.host()).options(options);
            if let Some(selector) = &args.selector {
                let element = Element::new(page.document.clone(), selector.clone());
                builder = builder.source(Source::element(element));
            }
            (builder.build(), Some(page.url))
        }
        (None, Some(path)) => {
            let text = read_input(path)?;
            let engine = DomImages::builder().source(text).options(options).build();
            (engine, None)
        }
        (None, None) => anyhow::bail!("an input file (or `-`) or --url is required"),
    };

    let images = match args.scope {
        Scope::All => engine.document_images()?,
        Scope::Tags => unique_images(engine.tag_images()?),
        Scope::Inline => unique_images(engine.inline_style_images()?),
        Scope::Stylesheets => unique_images(engine.stylesheet_images()?),
    };

    let report = if args.preload {
        let base = match &args.base_url {
            Some(base) => Some(Url::parse(base).context("invalid --base-url")?),
            None => page_url,
        };
        let mut loader = HttpImageLoader::new(client).fetch_options(fetch_opts);
        if let Some(base) = base {
            loader = loader.base_url(base);
        }
        Some(preload(&loader, &images, args.concurrency).await?)
    } else {
        None
    };

    let output_str = format_output(&images, report.as_ref(), args.json_output)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output_str)
            .with_context(|| format!("error writing to {:?}", output_path))?;
    } else if !output_str.is_empty() {
        println!("{}", output_str);
    }

    if let (Some(report), false) = (&report, args.json_output) {
        let mut stderr = io::stderr();
        let _ = writeln!(stderr, "preloaded {}/{} images", report.loaded, report.requested);
        for failed in &report.failed {
            let _ = writeln!(stderr, "failed {}: {}", failed.url, failed.reason);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let start = Instant::now();
    let outcome = run(&args).await;

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", start.elapsed().as_millis());
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

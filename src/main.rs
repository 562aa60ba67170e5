use anyhow::{bail, ensure, Context, Result};
use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};
use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};
use tracing_subscriber::EnvFilter;

use isame_json::{
    document::Document,
    isame_txt::parser::{parse_isame_txt, ParseOptions},
    mapper::{map_document_at, AuditEntry, MapOptions},
    reference::{CachedProvider, ReferenceCorpus, StartIndexTable},
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Parse,
    Map,
    Run,
}

struct Args {
    stage: Stage,
    input_path: String,
    output_path: Option<String>,
    indexes_path: Option<String>,
    reference_path: Option<String>,
    dot_check: bool,
    debug: bool,
}

fn get_args() -> Result<Args> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut opts = getopts::Options::new();
    opts.optopt("", "indexes", "starting index table (JSON)", "FILE");
    opts.optopt("", "reference", "reference tokens (CSV)", "FILE");
    opts.optflag("", "no-dot-check", "skip the checks on dots");
    opts.optflag("", "debug", "trace the alignment of every block");

    let matches = match opts.parse(&args) {
        Ok(m) => m,
        Err(f) => bail!(f),
    };

    let stage = match matches.free.first().map(String::as_str) {
        Some("parse") => Stage::Parse,
        Some("map") => Stage::Map,
        Some("run") => Stage::Run,
        Some(other) => bail!("Unknown stage: {} (expected parse, map or run)", other),
        None => bail!(opts.usage("Usage: isame-json <parse|map|run> INPUT [OUTPUT] [options]")),
    };
    let input_path = matches.free.get(1).context("path to input is required")?.clone();
    let output_path = matches.free.get(2).cloned();

    let indexes_path = matches.opt_str("indexes");
    let reference_path = matches.opt_str("reference");
    if stage != Stage::Map {
        ensure!(indexes_path.is_some(), "--indexes is required to parse");
    }
    if stage != Stage::Parse {
        ensure!(reference_path.is_some(), "--reference is required to map");
    }

    Ok(Args {
        stage,
        input_path,
        output_path,
        indexes_path,
        reference_path,
        dot_check: !matches.opt_present("no-dot-check"),
        debug: matches.opt_present("debug"),
    })
}

fn main() -> Result<()> {
    let args = get_args()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.debug { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let input_path = PathBuf::from(&args.input_path);
    ensure!(
        input_path.exists(),
        "File not found: {}",
        input_path.display()
    );
    let input = read_text(&input_path)?;

    let mut documents = match args.stage {
        Stage::Parse | Stage::Run => parse(&input, &args)?,
        Stage::Map => serde_json::from_str::<Vec<Document>>(&input)
            .with_context(|| format!("Failed to read documents: {}", input_path.display()))?,
    };

    if args.stage != Stage::Parse {
        map(&mut documents, &args)?;
    }

    let json = serde_json::to_string_pretty(&documents)?;
    match &args.output_path {
        Some(output_path) => fs::write(output_path, json)
            .with_context(|| format!("Failed to write output: {}", output_path))?,
        None => println!("{}", json),
    }

    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let (txt, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    ensure!(!had_errors, "Invalid UTF-8: {}", path.display());
    Ok(txt.into_owned())
}

fn parse(txt: &str, args: &Args) -> Result<Vec<Document>> {
    let indexes_path = args.indexes_path.as_deref().context("--indexes is required")?;
    let indexes = StartIndexTable::load(Path::new(indexes_path))?;

    let options = ParseOptions {
        dot_check: args.dot_check,
    };
    // the findings have been logged one by one, the error only counts them
    let parsed = parse_isame_txt(txt, &indexes, &options)?;

    let warnings = parsed.diagnostics.warnings().count();
    tracing::info!(pages = parsed.documents.len(), warnings, "Finished parsing.");
    Ok(parsed.documents)
}

fn map(documents: &mut [Document], args: &Args) -> Result<()> {
    let reference_path = args.reference_path.as_deref().context("--reference is required")?;
    let corpus = ReferenceCorpus::load(Path::new(reference_path))?;
    tracing::info!(tokens = corpus.len(), "Loaded reference text.");
    let provider = CachedProvider::new(corpus);

    let options = MapOptions { debug: args.debug };
    let mut audit: Vec<AuditEntry> = Vec::new();

    let pb = create_progress_bar(documents.len() as u64);
    for i in (0..documents.len()).progress_with(pb) {
        let entries = map_document_at(documents, i, &provider, &options)
            .with_context(|| format!("Failed to map page: {}", documents[i].meta.title))?;
        audit.extend(entries);
    }

    if args.debug {
        let mut by_rule: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in &audit {
            *by_rule.entry(entry.rule).or_default() += 1;
        }
        for (rule, count) in by_rule {
            tracing::debug!(rule, count, "rule usage");
        }
    }

    tracing::info!(
        pages = documents.len(),
        ranges = provider.cached_ranges(),
        "Finished mapping."
    );
    Ok(())
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{percent:>3}% [{wide_bar:.cyan/blue}] {pos}/{len} [{elapsed_precise} < {eta_precise}]",
        )
        .unwrap()
        .progress_chars("#-"),
    );
    pb
}

// Command-line front end: tokenize, score a text, or score a directory of documents.
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::{info, warn};
use walkdir::WalkDir;

use mecab_sentiment::nlp::join_terms;
use mecab_sentiment::nlp::tokenize::parse_pos_pattern;
use mecab_sentiment::{Analyzer, Config, DictType, Pipeline, ScoreResult, SentenceScore, TokenizeOptions};

const DOCUMENT_EXTS: [&str; 5] = ["txt", "md", "csv", "json", "pdf"];

#[derive(Parser)]
#[command(name = "mecab-sentiment", about = "Japanese tokenizer and lexicon-based sentiment scorer")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "MECAB_SENTIMENT_CONFIG", global = true)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, env = "MECAB_SENTIMENT_DICT_TYPE", global = true)]
    dict_type: Option<DictType>,
    /// Compiled MeCab user dictionary
    #[arg(long, env = "MECAB_SENTIMENT_USERDICT", global = true)]
    userdict: Option<PathBuf>,
    /// Stopword file, one word per line
    #[arg(long, env = "MECAB_SENTIMENT_STOPWORDS", global = true)]
    stopwords: Option<PathBuf>,
    /// `term,label` overrides for the noun lexicon (p / n / e)
    #[arg(long, env = "MECAB_SENTIMENT_NOUN_DICT", global = true)]
    noun_dict: Option<PathBuf>,
    /// `term,label` overrides for the wago lexicon (ポジ / ネガ / ニュートラル)
    #[arg(long, env = "MECAB_SENTIMENT_WAGO_DICT", global = true)]
    wago_dict: Option<PathBuf>,
    /// Extra negation marker (repeatable, or comma-separated)
    #[arg(long = "negation", env = "MECAB_SENTIMENT_NEGATION", value_delimiter = ',', global = true)]
    negation: Vec<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split text into terms
    Tokenize {
        /// Input text; read from stdin when omitted
        #[arg(short, long)]
        text: Option<String>,
        /// POS filter such as `名詞,固有名詞,一般` (repeatable)
        #[arg(long = "pos")]
        pos: Vec<String>,
        /// Emit surface forms instead of base forms
        #[arg(long)]
        surface: bool,
        #[arg(long)]
        with_pos: bool,
        #[arg(long)]
        no_normalize: bool,
        /// Print a JSON array instead of a space-joined line
        #[arg(long)]
        list: bool,
    },
    /// Score each sentence of a text
    Sentiment {
        #[arg(short, long)]
        text: Option<String>,
        /// Include matched terms and their polarities
        #[arg(short, long)]
        detailed: bool,
        #[arg(long)]
        json: bool,
    },
    /// Score every document under a directory
    Batch {
        #[arg(short, long)]
        dir: PathBuf,
        #[arg(short, long, default_value = "sentiment_report.json")]
        out: PathBuf,
    },
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(dict_type) = self.dict_type {
            config.mecab.dict_type = dict_type;
        }
        if self.userdict.is_some() {
            config.mecab.userdict = self.userdict.clone();
        }
        if self.stopwords.is_some() {
            config.lexicon.stopwords = self.stopwords.clone();
        }
        if self.noun_dict.is_some() {
            config.lexicon.noun = self.noun_dict.clone();
        }
        if self.wago_dict.is_some() {
            config.lexicon.wago = self.wago_dict.clone();
        }
        config.lexicon.negation.extend(self.negation.iter().cloned());
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct DocumentScore {
    path: String,
    sentences: Vec<SentenceScore>,
}

fn read_text_file(p: &Path) -> Result<String> {
    let mut s = String::new();
    let mut f = File::open(p)?;
    f.read_to_string(&mut s)?;
    Ok(s)
}

fn read_file_content(p: &Path) -> Result<String> {
    let ext = p.extension().and_then(|s| s.to_str()).unwrap_or("");
    if ext == "pdf" {
        pdf_extract::extract_text(p).map_err(|e| anyhow!("PDF extraction failed: {}", e))
    } else {
        read_text_file(p)
    }
}

fn read_input(text: Option<String>) -> Result<String> {
    match text {
        Some(t) => Ok(t),
        None => std::io::read_to_string(std::io::stdin()).context("reading stdin"),
    }
}

fn collect_documents(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping unreadable path");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| DOCUMENT_EXTS.contains(&ext))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

// Unreadable documents are skipped; an analyzer failure aborts the whole batch.
fn score_documents<A>(pipeline: &Pipeline<A>, files: &[PathBuf], pb: &ProgressBar) -> Result<Vec<DocumentScore>>
where
    A: Analyzer + Sync,
{
    let scored: Vec<Option<DocumentScore>> = files
        .par_iter()
        .map(|p| -> Result<Option<DocumentScore>> {
            let result = match read_file_content(p) {
                Ok(text) => {
                    let sentences = pipeline
                        .score_text_detailed(&text)
                        .with_context(|| format!("scoring {}", p.display()))?;
                    Some(DocumentScore {
                        path: p.to_string_lossy().to_string(),
                        sentences,
                    })
                }
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "skipping unreadable document");
                    None
                }
            };
            pb.inc(1);
            Ok(result)
        })
        .collect::<Result<_>>()?;
    Ok(scored.into_iter().flatten().collect())
}

fn batch<A: Analyzer + Sync>(pipeline: &Pipeline<A>, dir: &Path, out: &Path) -> Result<()> {
    let files = collect_documents(dir);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {wide_bar} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    let report = score_documents(pipeline, &files, &pb)?;
    pb.finish_with_message("scoring documents");

    let fout = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    serde_json::to_writer_pretty(fout, &report)?;
    info!(documents = report.len(), out = %out.display(), "wrote report");
    Ok(())
}

fn score_color(score: f64) -> Option<Color> {
    if score > 0.0 {
        Some(Color::Green)
    } else if score < 0.0 {
        Some(Color::Red)
    } else {
        None
    }
}

fn print_scores(scores: &[ScoreResult]) -> Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for result in scores {
        stdout.set_color(ColorSpec::new().set_fg(score_color(result.score())))?;
        write!(stdout, "{:+.3}", result.score())?;
        stdout.reset()?;
        match result {
            ScoreResult::Score(_) => writeln!(stdout)?,
            ScoreResult::Detailed(d) => {
                let terms: Vec<String> = d
                    .polarities
                    .iter()
                    .map(|p| format!("{}({:+})", p.label(), p.sign()))
                    .collect();
                writeln!(stdout, "  [{}] {}", d.count, terms.join(" "))?;
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    let pipeline = Pipeline::from_config(&config)?;

    match cli.command {
        Commands::Tokenize {
            text,
            pos,
            surface,
            with_pos,
            no_normalize,
            list,
        } => {
            let options = TokenizeOptions {
                pos_filter: pos.iter().map(|p| parse_pos_pattern(p)).collect(),
                normalize: !no_normalize,
                base_form: !surface,
                with_pos,
            };
            let terms = pipeline.tokenize(&read_input(text)?, &options)?;
            if list {
                println!("{}", serde_json::to_string(&terms)?);
            } else {
                println!("{}", join_terms(&terms));
            }
        }
        Commands::Sentiment { text, detailed, json } => {
            let scores = pipeline.score_text(&read_input(text)?, detailed)?;
            if json {
                println!("{}", serde_json::to_string(&scores)?);
            } else {
                print_scores(&scores)?;
            }
        }
        Commands::Batch { dir, out } => batch(&pipeline, &dir, &out)?,
    }
    Ok(())
}

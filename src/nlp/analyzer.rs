// Morphological analyzer adapter.
// Tokens come from an external MeCab process; the `Analyzer` trait is the seam the
// rest of the crate consumes so tests (and other backends) can plug in their own.
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Placeholder MeCab emits when a token has no dictionary form
pub const NO_BASE_FORM: &str = "*";

// IPADIC feature layout: pos1..pos4, conjugation type, conjugation form, base form, ...
const BASE_FORM_FIELD: usize = 6;
const NEOLOGD_DIR: &str = "mecab-ipadic-neologd";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub surface: String,
    pub pos: Vec<String>,
    pub base: String,
}

impl Token {
    pub fn new(surface: impl Into<String>, pos: Vec<String>, base: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            pos,
            base: base.into(),
        }
    }

    /// Dictionary form used for lexicon lookup, falling back to the surface form.
    /// Spaces are replaced with `-` so lemmas can be space-joined into phrases.
    pub fn lemma(&self) -> String {
        if self.base == NO_BASE_FORM {
            self.surface.replace(' ', "-")
        } else {
            self.base.replace(' ', "-")
        }
    }

    pub fn term(&self, base_form: bool) -> String {
        if base_form {
            self.lemma()
        } else {
            self.surface.replace(' ', "-")
        }
    }

    /// First `depth` part-of-speech levels (fewer if the tuple is shorter).
    pub fn pos_prefix(&self, depth: usize) -> &[String] {
        &self.pos[..depth.min(self.pos.len())]
    }
}

pub trait Analyzer {
    fn analyze(&self, text: &str) -> Result<Vec<Token>>;
}

impl<F> Analyzer for F
where
    F: Fn(&str) -> Result<Vec<Token>>,
{
    fn analyze(&self, text: &str) -> Result<Vec<Token>> {
        self(text)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DictType {
    #[default]
    Ipadic,
    Neologd,
}

#[derive(Debug, Clone)]
pub struct MecabOptions {
    pub binary: PathBuf,
    pub config_binary: PathBuf,
    pub dict_type: DictType,
    pub dicdir: Option<PathBuf>,
    pub userdict: Option<PathBuf>,
}

impl Default for MecabOptions {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("mecab"),
            config_binary: PathBuf::from("mecab-config"),
            dict_type: DictType::Ipadic,
            dicdir: None,
            userdict: None,
        }
    }
}

/// Runs the `mecab` binary once per call, feeding text on stdin.
#[derive(Debug, Clone)]
pub struct MecabAnalyzer {
    binary: PathBuf,
    args: Vec<OsString>,
}

impl MecabAnalyzer {
    /// Resolves dictionary arguments and runs the configured command once,
    /// so a missing binary, dicdir or userdict fails here rather than on first use.
    pub fn new(options: &MecabOptions) -> Result<Self> {
        let dicdir = match (&options.dicdir, options.dict_type) {
            (Some(dir), _) => Some(dir.clone()),
            (None, DictType::Neologd) => Some(resolve_dicdir(&options.config_binary)?.join(NEOLOGD_DIR)),
            (None, DictType::Ipadic) => None,
        };

        let mut args: Vec<OsString> = Vec::new();
        if let Some(dir) = dicdir {
            args.push("-d".into());
            args.push(dir.into_os_string());
        }
        if let Some(userdict) = &options.userdict {
            args.push("-u".into());
            args.push(userdict.clone().into_os_string());
        }

        let analyzer = Self {
            binary: options.binary.clone(),
            args,
        };
        analyzer.probe()?;
        Ok(analyzer)
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    fn probe(&self) -> Result<()> {
        let out = Command::new(&self.binary)
            .arg("-v")
            .output()
            .map_err(|e| Error::Analyzer(format!("failed to invoke {}: {}", self.binary.display(), e)))?;
        if !out.status.success() {
            return Err(Error::Analyzer(format!(
                "{} -v exited with {}",
                self.binary.display(),
                out.status
            )));
        }
        debug!(
            binary = %self.binary.display(),
            version = %String::from_utf8_lossy(&out.stdout).trim(),
            "mecab available"
        );
        // `-v` returns before any dictionary is opened; analyzing an empty line
        // loads the configured `-d`/`-u` dictionaries.
        self.analyze("")
            .map_err(|e| Error::Analyzer(format!("mecab failed to load its dictionaries: {}", e)))?;
        Ok(())
    }
}

impl Analyzer for MecabAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<Token>> {
        let mut child = Command::new(&self.binary)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Analyzer(format!("failed to invoke {}: {}", self.binary.display(), e)))?;

        // Feed stdin from a separate thread so a large output can't block the write.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Analyzer("mecab stdin unavailable".to_string()))?;
        let input = format!("{}\n", text);
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output()?;
        let written = writer
            .join()
            .map_err(|_| Error::Analyzer("mecab stdin writer panicked".to_string()))?;

        // A process that exits early breaks the pipe; its status and stderr say why.
        if !output.status.success() {
            return Err(Error::Analyzer(format!(
                "mecab exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        written?;
        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| Error::Analyzer(format!("mecab output is not UTF-8: {}", e)))?;
        let tokens = parse_mecab_output(&stdout)?;
        debug!(chars = text.chars().count(), tokens = tokens.len(), "analyzed");
        Ok(tokens)
    }
}

/// Parses MeCab's default output format (`surface\tfeature,feature,...` lines, `EOS` per input line).
pub fn parse_mecab_output(output: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    for line in output.lines() {
        if line.is_empty() || line == "EOS" {
            continue;
        }
        let (surface, features) = line
            .split_once('\t')
            .ok_or_else(|| Error::Analyzer(format!("unexpected mecab line: {:?}", line)))?;
        let pos: Vec<String> = features.split(',').map(String::from).collect();
        if pos.len() <= BASE_FORM_FIELD {
            return Err(Error::Analyzer(format!(
                "expected at least {} features for {:?}, got {}",
                BASE_FORM_FIELD + 1,
                surface,
                pos.len()
            )));
        }
        let base = pos[BASE_FORM_FIELD].clone();
        tokens.push(Token::new(surface, pos, base));
    }
    Ok(tokens)
}

fn resolve_dicdir(config_binary: &Path) -> Result<PathBuf> {
    let out = Command::new(config_binary)
        .arg("--dicdir")
        .output()
        .map_err(|e| Error::Analyzer(format!("failed to invoke {}: {}", config_binary.display(), e)))?;
    if !out.status.success() {
        return Err(Error::Analyzer(format!(
            "{} --dicdir exited with {}",
            config_binary.display(),
            out.status
        )));
    }
    let dir = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if dir.is_empty() {
        return Err(Error::Analyzer(format!("{} --dicdir printed nothing", config_binary.display())));
    }
    Ok(PathBuf::from(dir))
}

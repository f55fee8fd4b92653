mod config;

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use chatmd::lines::split_lines;
use chatmd::parser::tokens::tokenize;
use chatmd::render::NewMessage;
use chatmd::target::detect_target;
use chatmd::{ChatDocument, CodeBlockLocation, MessageBlock, extract};
use command::{CommandContext, preview, resolve};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "chatmd", version, about = "Chat-style Markdown document tool")]
struct Cli {
    /// Disable colored diagnostic output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (defaults to ./chatmd.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the message blocks of a document
    Blocks {
        file: String,

        /// Print the blocks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dump the structural token stream
    Tokens { file: String },

    /// Cut a document before (or after) one of its messages
    Extract {
        file: String,

        /// Index of the target message
        index: usize,

        /// Keep the target message itself
        #[arg(long)]
        include: bool,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve a command template against a document, message or code block
    Resolve {
        file: String,

        /// Template with ${placeholder} tokens
        template: Option<String>,

        /// Use a named template from the config instead
        #[arg(long = "command", value_name = "NAME", conflicts_with = "template")]
        command_name: Option<String>,

        /// Message index
        #[arg(long)]
        message: Option<usize>,

        /// Code block index within the message (requires --message)
        #[arg(long, requires = "message")]
        code_block: Option<usize>,

        /// Redact message content
        #[arg(long)]
        preview: bool,
    },

    /// Print the body of a code block
    Code {
        file: String,
        message: usize,
        code_block: usize,
    },

    /// Write a code block to the file its first line names
    SaveCode {
        file: String,
        message: usize,
        code_block: usize,

        /// Directory the target path is relative to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Override the detected target path
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Append a message to a document
    Append {
        file: String,

        /// Speaker name (defaults to append.speaker from the config)
        #[arg(long)]
        speaker: Option<String>,

        /// Message metadata as a JSON value
        #[arg(long)]
        metadata: Option<String>,

        /// Message text; read from stdin when omitted
        content: Option<String>,
    },
}

/// A document read from disk, parsed, with its diagnostics already reported.
struct Loaded {
    path: String,
    source: String,
    doc: ChatDocument,
}

impl Loaded {
    fn lines(&self) -> Vec<&str> {
        split_lines(&self.source)
    }

    fn code_block(&self, message: usize, code_block: usize) -> Result<(&MessageBlock, &CodeBlockLocation)> {
        match self.doc.message_and_code_block(message, code_block) {
            None => bail!(
                "message {} out of range ({} has {} messages)",
                message,
                self.path,
                self.doc.messages.len()
            ),
            Some((msg, None)) => bail!(
                "code block {} out of range (message {} has {} code blocks)",
                code_block,
                message,
                msg.code_blocks.len()
            ),
            Some((msg, Some(block))) => Ok((msg, block)),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Blocks { file, json } => {
            let loaded = load(&file, color_choice)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&loaded.doc.messages)?);
            } else {
                print_blocks(&loaded.doc);
            }
            if loaded.doc.has_errors() {
                process::exit(1);
            }
            Ok(())
        }

        Command::Tokens { file } => {
            let source = read_source(&file)?;
            for (i, token) in tokenize(&source).iter().enumerate() {
                println!("{:>4} {:?}", i, token);
            }
            Ok(())
        }

        Command::Extract {
            file,
            index,
            include,
            output,
        } => {
            let loaded = load(&file, color_choice)?;
            let lines = loaded.lines();
            let extracted = extract(&lines, &loaded.doc.messages, index, include)?;
            match output {
                Some(out) => {
                    std::fs::write(&out, extracted)
                        .with_context(|| format!("cannot write '{}'", out.display()))?;
                    info!(path = %out.display(), "extracted document written");
                }
                None => print!("{}", extracted),
            }
            Ok(())
        }

        Command::Resolve {
            file,
            template,
            command_name,
            message,
            code_block,
            preview: redact,
        } => {
            let template = match (template, command_name) {
                (Some(template), _) => template,
                (None, Some(name)) => config
                    .command(&name)
                    .map(str::to_string)
                    .ok_or_else(|| anyhow!("no command named '{}' in the config", name))?,
                (None, None) => bail!("give a template or --command NAME"),
            };

            let loaded = load(&file, color_choice)?;
            let context = match (message, code_block) {
                (Some(m), Some(c)) => CommandContext::for_code_block(&loaded.path, &loaded.doc, m, c)?,
                (Some(m), None) => {
                    CommandContext::for_message(&loaded.path, &loaded.doc, &loaded.lines(), m)?
                }
                (None, _) => CommandContext::document(&loaded.path),
            };
            debug!(?context, "resolving template");

            let resolved = if redact {
                preview(&template, &context)
            } else {
                resolve(&template, &context)
            };
            println!("{}", resolved);
            Ok(())
        }

        Command::Code {
            file,
            message,
            code_block,
        } => {
            let loaded = load(&file, color_choice)?;
            let (_, block) = loaded.code_block(message, code_block)?;
            print!("{}", block.code);
            Ok(())
        }

        Command::SaveCode {
            file,
            message,
            code_block,
            out_dir,
            path,
        } => {
            let loaded = load(&file, color_choice)?;
            let (_, block) = loaded.code_block(message, code_block)?;
            save_code(block, &out_dir, path.as_deref())
        }

        Command::Append {
            file,
            speaker,
            metadata,
            content,
        } => {
            let speaker = speaker.unwrap_or_else(|| config.append.speaker.clone());
            let metadata = match metadata {
                Some(text) => serde_json::from_str(&text).context("--metadata is not valid JSON")?,
                None => serde_json::Value::Object(Default::default()),
            };
            let content = match content {
                Some(content) => content,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("cannot read message from stdin")?;
                    buf
                }
            };

            let rendered = NewMessage::new(speaker, content.trim_end(), metadata).to_string();
            let mut out = OpenOptions::new()
                .append(true)
                .create(true)
                .open(&file)
                .with_context(|| format!("cannot open '{}'", file))?;
            out.write_all(rendered.as_bytes())
                .with_context(|| format!("cannot write '{}'", file))?;
            Ok(())
        }
    }
}

fn read_source(path: &str) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read '{}'", path))
}

/// Read and parse `path`, printing its diagnostics to stderr.
fn load(path: &str, color_choice: ColorChoice) -> Result<Loaded> {
    let source = read_source(path)?;

    let mut files = SimpleFiles::new();
    let file_id = files.add(path.to_string(), source.clone());
    let doc = chatmd::Parser::new(source.clone(), file_id).parse();

    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for error in &doc.diagnostics {
        let diagnostic = error.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
    }

    Ok(Loaded {
        path: path.to_string(),
        source,
        doc,
    })
}

fn print_blocks(doc: &ChatDocument) {
    if let Some(session) = &doc.session {
        println!(
            "session-config lines {}..{}{}",
            session.lines.start,
            session.lines.end,
            if session.setup_code.is_some() {
                " (with setup code)"
            } else {
                ""
            }
        );
    }
    for (i, message) in doc.messages.iter().enumerate() {
        let content = match &message.content_range {
            Some(range) => format!("{}..{}", range.start, range.end),
            None => "-".to_string(),
        };
        println!(
            "{:>3} {:>4}..{:<4} {} content {}",
            i, message.start_line, message.end_line, message.speaker_text, content
        );
        for (j, block) in message.code_blocks.iter().enumerate() {
            println!(
                "      [{}] line {} {}",
                j,
                block.display_line,
                block.language.as_deref().unwrap_or("")
            );
        }
    }
}

fn save_code(block: &CodeBlockLocation, out_dir: &Path, path: Option<&Path>) -> Result<()> {
    let detected = detect_target(&block.code);
    let (target, body) = match (path, &detected) {
        (Some(path), Some(target)) => (path.to_path_buf(), target.body(&block.code)),
        (Some(path), None) => (path.to_path_buf(), block.code.trim().to_string()),
        (None, Some(target)) => (PathBuf::from(&target.path), target.body(&block.code)),
        (None, None) => bail!(
            "code block at line {} names no target file; pass --path",
            block.display_line
        ),
    };
    if body.trim().is_empty() {
        bail!("'{}' would be empty", target.display());
    }

    let full_path = out_dir.join(&target);
    if let Some(dir) = full_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create '{}'", dir.display()))?;
    }
    std::fs::write(&full_path, format!("{}\n", body))
        .with_context(|| format!("cannot write '{}'", full_path.display()))?;
    eprintln!("wrote {}", full_path.display());
    Ok(())
}

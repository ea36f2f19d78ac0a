use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Runtime;

use par_revise::buffer::{MemoryBuffer, TextBuffer};
use par_revise::cli::{Cli, filetype_hint, parse_mark};
use par_revise::selection::capture;
use par_revise::session::{EditSession, Persister, SessionHooks, SessionOptions};
use par_revise::transform::{TransformClient, TransformHints, TransformRequest};
use par_revise::{diff, CancelHandle};
use par_revise_config::Config;

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("par-revise: warning: using default config ({e:#})");
            Config::default()
        }
    };

    par_revise::debug::init_log_bridge(cli.log_level.as_deref(), config.log_level.as_str());
    log::info!("Starting par-revise {}", par_revise::VERSION);

    // Create Tokio runtime for the external transform process
    let runtime = Runtime::new()?;
    let result = runtime.block_on(run(cli, config));

    if let Err(ref e) = result {
        eprintln!("par-revise: error: {e:#}");
    }
    result
}

/// Writes the buffer back to the file it was loaded from.
struct FilePersister {
    path: std::path::PathBuf,
}

impl Persister for FilePersister {
    fn persist(&mut self, buf: &mut dyn TextBuffer) -> Result<()> {
        let count = buf.line_count();
        let mut out = buf.lines(1, count).join("\n");
        out.push('\n');
        std::fs::write(&self.path, out)
            .with_context(|| format!("writing {}", self.path.display()))
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let start = parse_mark(&cli.start).map_err(anyhow::Error::msg)?;
    let end = parse_mark(&cli.end).map_err(anyhow::Error::msg)?;
    let mode = cli.mode.into();

    let command = cli.command.clone().unwrap_or_else(|| config.command.clone());
    let timeout_ms = cli.timeout_ms.unwrap_or(config.timeout_ms);
    let client = TransformClient::new(command, config.args.clone(), timeout_ms);

    let mut buf = MemoryBuffer::from_file(&cli.file)
        .with_context(|| format!("reading {}", cli.file.display()))?;

    let hints = TransformHints {
        filetype: filetype_hint(&cli.file),
        path: Some(cli.file.display().to_string()),
    };

    if cli.dry_run {
        // Preview: transform without touching the buffer, show the diff.
        let selection = capture(&buf, start, end, mode)?;
        let request = TransformRequest {
            text: selection.text.clone(),
            instruction: cli.instruction.clone(),
            hints,
        };
        let transformed = client.run(&request, &CancelHandle::new()).await?;
        let transformed = if config.reindent && !cli.no_reindent {
            par_revise::reindent(&selection.text, &transformed)
        } else {
            transformed
        };
        println!("{}", diff::render(&diff::diff_lines(&selection.text, &transformed)));
        return Ok(());
    }

    let mut options = SessionOptions::from_config(&config);
    if cli.no_reindent {
        options.reindent = false;
    }

    // When save_after is configured the persister hook writes the file;
    // otherwise the CLI writes it once the cycle has succeeded.
    let save_via_hook = options.save_after;
    let session = EditSession::new(options, client).with_hooks(SessionHooks {
        formatter: None,
        persister: save_via_hook.then(|| {
            Box::new(FilePersister {
                path: cli.file.clone(),
            }) as Box<dyn Persister>
        }),
    });

    let applied = session
        .rewrite(&mut buf, start, end, mode, &cli.instruction, hints)
        .await?;

    if !save_via_hook {
        buf.save_to(&cli.file)
            .with_context(|| format!("writing {}", cli.file.display()))?;
    }

    println!(
        "rewrote {} line(s) at {}..{} in {}",
        applied.last_line - applied.first_line + 1,
        applied.first_line,
        applied.last_line,
        cli.file.display()
    );
    Ok(())
}

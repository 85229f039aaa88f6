//! subdx - Terminal UI for subtitle search on subdivx

mod cli;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

use cli::Cli;
use subdx::config::{self, validate_proxy, Config};
use subdx::keys;
use subdx::log::init_log;
use subdx::metadata::{extract_tags, Tags};
use subdx::pipeline::{self, resolve_target, row_budget, Target, COMMENTS_OFFSET, RESULTS_OFFSET};
use subdx::query::{guess_query, SearchQuery};
use subdx::selection::{Outcome, Selection, SelectionResult};
use subdx::subdivx::{Candidate, SubdivxClient};
use subdx::SubdxError;

/// Interactive selection state
pub struct App {
    pub query: SearchQuery,
    pub selection: Selection,
    /// Shown as a busy popup while a request is in flight
    pub processing_status: Option<String>,
}

impl App {
    pub fn new(query: SearchQuery, selection: Selection) -> Self {
        Self {
            query,
            selection,
            processing_status: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    config::load_env();
    let log_path = init_log(cli.verbose);

    let mut config = Config::from_env();
    if let Some(proxy) = &cli.proxy {
        config.proxy = Some(validate_proxy(proxy)?);
    }
    if cli.lines.is_some() {
        config.lines = cli.lines;
    }

    let client = SubdivxClient::new(&config).context("Failed to create HTTP client")?;

    let result = run(&cli, &config, &client).await;
    if let Err(e) = &result {
        error!("{:#}", e);
        if let Some(path) = log_path {
            eprintln!("See log: {}", path.display());
        }
    }
    result
}

/// How one search ended
#[derive(Debug)]
enum Processed {
    Saved(PathBuf),
    /// Exit key or nothing suitable; a batch moves on
    Skipped,
    /// Ctrl+C; a batch stops
    Interrupted,
}

async fn run(cli: &Cli, config: &Config, client: &SubdivxClient) -> Result<ExitCode> {
    let jobs = match resolve_target(&cli.search, cli.path.as_deref(), cli.force)? {
        Target::Search(text) => {
            let out_dir = match &cli.path {
                Some(path) => path.clone(),
                None => std::env::current_dir().context("No working directory")?,
            };
            vec![(text, out_dir)]
        }
        Target::Files(jobs) => {
            if jobs.is_empty() {
                say(cli, "No video files left to process");
            }
            jobs.into_iter()
                .map(|job| {
                    info!("Queued {}", job.video.display());
                    (job.name, job.out_dir)
                })
                .collect()
        }
    };

    for (name, out_dir) in jobs {
        match process(cli, config, client, &name, &out_dir).await? {
            Processed::Saved(path) => info!("Saved {}", path.display()),
            Processed::Skipped => {}
            Processed::Interrupted => {
                say(cli, "Interrupted");
                info!("Interrupted by user, stopping");
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Search, choose and download a subtitle for one name
async fn process(
    cli: &Cli,
    config: &Config,
    client: &SubdivxClient,
    name: &str,
    out_dir: &Path,
) -> Result<Processed> {
    let query = guess_query(name, cli.season, cli.title.as_deref());
    let tags = extract_tags(name, cli.keywords.as_deref());
    info!("Query: {:?} Tags: {:?}", query, tags);
    say(cli, &format!("Searching subtitles for: {}", query.display_title()));

    let ranked = match pipeline::find_subtitles(client, &query, &tags).await {
        Ok(ranked) => ranked,
        Err(e) if e.is_no_results() => {
            say(cli, &e.to_string());
            return Ok(Processed::Skipped);
        }
        Err(e) => return Err(e.into()),
    };

    let id = if cli.no_choose {
        match ranked.first() {
            Some(c) => c.id,
            None => {
                say(cli, &SubdxError::NoSuitable(query.display_title()).to_string());
                return Ok(Processed::Skipped);
            }
        }
    } else {
        match choose(client, &query, ranked, tags, config.lines).await? {
            SelectionResult::Selected(id) => id,
            SelectionResult::Cancelled => {
                say(cli, "Cancelled");
                return Ok(Processed::Skipped);
            }
            SelectionResult::Interrupted => return Ok(Processed::Interrupted),
        }
    };

    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Cannot create {}", out_dir.display()))?;

    say(cli, &format!("Downloading subtitle ID:{}", id));
    let path = client.download(id, out_dir).await?;
    say(cli, &format!("Saved {}", path.display()));

    Ok(Processed::Saved(path))
}

fn say(cli: &Cli, message: &str) {
    if !cli.quiet {
        println!("{}", message);
    }
}

/// Run the selection screen on the alternate screen
async fn choose(
    client: &SubdivxClient,
    query: &SearchQuery,
    candidates: Vec<Candidate>,
    tags: Tags,
    cap: Option<usize>,
) -> Result<SelectionResult> {
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, client, query, candidates, tags, cap).await;
    ratatui::restore();
    result
}

async fn run_app(
    terminal: &mut DefaultTerminal,
    client: &SubdivxClient,
    query: &SearchQuery,
    candidates: Vec<Candidate>,
    tags: Tags,
    cap: Option<usize>,
) -> Result<SelectionResult> {
    let height = terminal.size()?.height;
    let selection = Selection::new(
        candidates,
        tags,
        row_budget(height, RESULTS_OFFSET, cap),
        row_budget(height, COMMENTS_OFFSET, cap),
    );
    let mut app = App::new(query.clone(), selection);

    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        let outcome = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match keys::action_for(app.selection.screen(), key.code, key.modifiers) {
                    Some(action) => app.selection.handle(action),
                    None => Outcome::Continue,
                }
            }
            Event::Resize(_, height) => {
                app.selection.resize(
                    row_budget(height, RESULTS_OFFSET, cap),
                    row_budget(height, COMMENTS_OFFSET, cap),
                );
                Outcome::Continue
            }
            _ => Outcome::Continue,
        };

        match outcome {
            Outcome::Continue => {}
            Outcome::FetchComments(id) => {
                app.processing_status = Some("Loading comments...".to_string());
                let comments = {
                    let fetch = client.comments(id);
                    tokio::pin!(fetch);
                    let mut tick = tokio::time::interval(Duration::from_millis(100));
                    // Keys pressed meanwhile stay queued until the fetch returns
                    loop {
                        tokio::select! {
                            comments = &mut fetch => break comments,
                            _ = tick.tick() => {
                                terminal.draw(|frame| ui::draw(frame, &app))?;
                            }
                        }
                    }
                };
                app.processing_status = None;
                app.selection.comments_loaded(comments);
            }
            Outcome::Done(result) => return Ok(result),
        }
    }
}

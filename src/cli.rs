use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "subdx")]
#[command(version, about = "Search, rank and download subtitles from subdivx")]
pub struct Cli {
    /// File name, video path or directory of videos; anything else is searched as text
    pub search: String,

    /// Directory for downloaded archives (default: next to the video, or the working directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// No progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Replace subtitles that already exist
    #[arg(short, long)]
    pub force: bool,

    /// Take the best ranked subtitle without asking
    #[arg(short = 'c', long = "no-choose")]
    pub no_choose: bool,

    /// Maximum rows per page
    #[arg(short, long)]
    pub lines: Option<usize>,

    /// Search the whole season
    #[arg(short, long)]
    pub season: bool,

    /// Title to search instead of the guessed one
    #[arg(short, long)]
    pub title: Option<String>,

    /// Extra keywords for ranking, space separated
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// Proxy as http://host:port, https://host:port or IP:PORT
    #[arg(short = 'x', long)]
    pub proxy: Option<String>,
}

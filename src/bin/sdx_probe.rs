//! Run one live search and show how every result is classified and ranked

use subdx::config::{load_env, Config};
use subdx::log::{init_log, read_recent_logs};
use subdx::matching::{Classifier, MatchTier};
use subdx::metadata::extract_tags;
use subdx::pipeline::rank;
use subdx::query::guess_query;
use subdx::subdivx::SubdivxClient;

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[tokio::main]
async fn main() {
    load_env();
    init_log(true);

    let name = std::env::args().nth(1).unwrap_or_else(|| "The.Matrix.1999.1080p.BluRay.x264".to_string());
    let query = guess_query(&name, false, None);
    let tags = extract_tags(&name, None);

    println!("\nProbing: \"{}\"", name);
    println!("  query: {} ({}, season mode: {})", query.display_title(), query.kind, query.season_mode);
    println!("  tags:  {:?}", tags.iter_all().collect::<Vec<_>>());

    let client = match SubdivxClient::new(&Config::from_env()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {}", e);
            return;
        }
    };

    let found = match client.search(&query.search_text()).await {
        Ok(found) => found,
        Err(e) => {
            println!("  ✗ Search failed: {}", e);
            print_log();
            return;
        }
    };

    println!("\n============================================================");
    println!("  {} results from the site", found.len());
    println!("============================================================");
    let classifier = Classifier::new(&query);
    for c in &found {
        let tier = classifier.classify(&c.title);
        let mark = if tier.is_match() { "✓" } else { " " };
        println!("  {} {:8} ID:{:<8} {}", mark, tier, c.id, truncate(&c.title_text(), 60));
    }

    println!("\n============================================================");
    println!("  Ranked");
    println!("============================================================");
    match rank(&query, found, &tags) {
        Ok(ranked) => {
            for (i, c) in ranked.iter().enumerate() {
                println!(
                    "  {:3}. {:5.2} {:6} dl  {:8} ID:{:<8} {}",
                    i + 1,
                    c.score,
                    c.downloads,
                    c.tier.unwrap_or(MatchTier::None),
                    c.id,
                    truncate(&c.title_text(), 50)
                );
            }
        }
        Err(e) => println!("  ⚠ {}", e),
    }

    print_log();
}

fn print_log() {
    println!("\n--- Recent log ---");
    for line in read_recent_logs(15) {
        println!("  {}", line);
    }
}

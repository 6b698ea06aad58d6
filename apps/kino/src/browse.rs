use std::io::Write as _;

use anyhow::Result;
use client_core::{KinoClient, Notice};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast,
};
use tracing::{info, warn};

use crate::{print_notices, render};

const HELP: &str = "keys: n next, p previous, /text search, / clear, f <1-3> toggle favorite, r refresh, q quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Next,
    Previous,
    Search(String),
    Favorite(usize),
    Refresh,
    Quit,
    Help,
    Nothing,
    Unknown(String),
}

pub fn parse_key(line: &str) -> Key {
    let line = line.trim();
    if let Some(query) = line.strip_prefix('/') {
        return Key::Search(query.to_string());
    }
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (None, ..) => Key::Nothing,
        (Some("n"), None, _) => Key::Next,
        (Some("p"), None, _) => Key::Previous,
        (Some("r"), None, _) => Key::Refresh,
        (Some("q"), None, _) => Key::Quit,
        (Some("h" | "?"), None, _) => Key::Help,
        (Some("f"), Some(slot), None) => match slot.parse::<usize>() {
            Ok(slot) if slot >= 1 => Key::Favorite(slot),
            _ => Key::Unknown(line.to_string()),
        },
        _ => Key::Unknown(line.to_string()),
    }
}

/// Reads keys from stdin until `q` or end of input.
pub async fn run(client: &KinoClient, notices: &mut broadcast::Receiver<Notice>) -> Result<()> {
    let mut browser = client.browser().await;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        let user = client.session().user().await?;
        println!("{}", render::carousel_view(&browser, user.as_ref()));
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_key(&line) {
            Key::Next => browser.next(),
            Key::Previous => browser.previous(),
            Key::Search(query) => browser.set_query(query),
            Key::Favorite(slot) => {
                let picked = browser.visible().get(slot - 1).map(|movie| (*movie).clone());
                match picked {
                    Some(movie) => {
                        if let Err(err) = client.toggle_favorite(&movie).await {
                            warn!("browse: toggle failed movie={} error={err}", movie.id);
                        }
                    }
                    None => println!("no movie in slot {slot}"),
                }
            }
            Key::Refresh => {
                let catalog = client.catalog().refresh().await;
                info!("browse: catalog refreshed total={}", catalog.len());
                browser.set_catalog(catalog);
            }
            Key::Quit => break,
            Key::Help => println!("{HELP}"),
            Key::Nothing => {}
            Key::Unknown(input) => println!("unknown command '{input}'; {HELP}"),
        }
        print_notices(notices);
    }

    print_notices(notices);
    Ok(())
}

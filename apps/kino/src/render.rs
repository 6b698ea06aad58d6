//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use client_core::{favorites::is_favorite, CatalogBrowser, Notice, NoticeLevel};
use shared::domain::{Actor, Director, Genre, Movie, User};

pub fn movie_line(movie: &Movie, favorite: bool) -> String {
    let marker = if favorite { '*' } else { ' ' };
    let mut line = format!("{marker} {}", movie.title);
    if movie.release_year > 0 {
        let _ = write!(line, " ({})", movie.release_year);
    }
    let director = movie.director_name();
    let genre = movie.genre_name();
    match (director.is_empty(), genre.is_empty()) {
        (false, false) => {
            let _ = write!(line, " - {director}, {genre}");
        }
        (false, true) => {
            let _ = write!(line, " - {director}");
        }
        (true, false) => {
            let _ = write!(line, " - {genre}");
        }
        (true, true) => {}
    }
    line
}

pub fn movie_detail(movie: &Movie) -> String {
    let mut out = movie_line(movie, false).trim_start().to_string();
    let _ = write!(out, "\n  id: {}", movie.id);
    if let Some(rating) = movie.rating_imdb {
        let _ = write!(out, "\n  imdb: {rating:.1}");
    }
    if movie.featured {
        out.push_str("\n  featured");
    }
    if !movie.starring.is_empty() {
        let _ = write!(out, "\n  starring: {}", movie.starring.join(", "));
    }
    if !movie.description.is_empty() {
        let _ = write!(out, "\n  {}", movie.description);
    }
    out
}

/// Numbered carousel window plus match count. Slots are 1-based.
pub fn carousel_view(browser: &CatalogBrowser, user: Option<&User>) -> String {
    let visible = browser.visible();
    let mut out = format!(
        "{} of {} movies",
        browser.filtered().len(),
        browser.catalog().len()
    );
    if !browser.query().trim().is_empty() {
        let _ = write!(out, " matching \"{}\"", browser.query().trim());
    }
    if visible.is_empty() {
        out.push_str("\n  (nothing to show)");
        return out;
    }
    for (slot, movie) in visible.iter().enumerate() {
        let _ = write!(
            out,
            "\n{}. {}",
            slot + 1,
            movie_line(movie, is_favorite(user, movie))
        );
    }
    out
}

pub fn user_summary(user: &User) -> String {
    let mut out = format!("{} <{}>", user.username, user.email);
    if let Some(day) = user.birth_date_day() {
        let _ = write!(out, "\n  born: {day}");
    }
    let _ = write!(out, "\n  favorites: {}", user.favorites.len());
    out
}

pub fn genre_detail(genre: &Genre) -> String {
    match &genre.description {
        Some(description) => format!("{}\n  {description}", genre.name),
        None => genre.name.clone(),
    }
}

pub fn director_detail(director: &Director) -> String {
    person_detail(
        &director.name,
        director.birth_date.as_deref(),
        director.death_date.as_deref(),
        director.bio.as_deref(),
    )
}

pub fn actor_detail(actor: &Actor) -> String {
    person_detail(
        &actor.name,
        actor.birth_date.as_deref(),
        actor.death_date.as_deref(),
        actor.bio.as_deref(),
    )
}

fn person_detail(name: &str, born: Option<&str>, died: Option<&str>, bio: Option<&str>) -> String {
    let mut out = name.to_string();
    match (born, died) {
        (Some(born), Some(died)) => {
            let _ = write!(out, " ({} - {})", day(born), day(died));
        }
        (Some(born), None) => {
            let _ = write!(out, " (born {})", day(born));
        }
        _ => {}
    }
    if let Some(bio) = bio {
        let _ = write!(out, "\n  {bio}");
    }
    out
}

pub fn notice_line(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.message)
}

fn day(raw: &str) -> &str {
    raw.get(..10).unwrap_or(raw)
}

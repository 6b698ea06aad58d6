use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(MovieId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Director {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
}

/// `GET /movies/actors/:name`. Only the name is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A catalog entry as served by `GET /movies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub release_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_imdb: Option<f64>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub starring: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<Director>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<Genre>,
}

impl Movie {
    pub fn director_name(&self) -> &str {
        self.director.as_ref().map_or("", |d| d.name.as_str())
    }

    pub fn genre_name(&self) -> &str {
        self.genre.as_ref().map_or("", |g| g.name.as_str())
    }
}

/// Read model of an account. Passwords only ever travel in request payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(
        rename = "tokenInvalidBefore",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub token_invalid_before: Option<DateTime<Utc>>,
    #[serde(default)]
    pub favorites: BTreeSet<MovieId>,
}

impl User {
    pub fn has_favorite(&self, movie_id: &MovieId) -> bool {
        self.favorites.contains(movie_id)
    }

    /// Calendar part of the stored birth date (`YYYY-MM-DD`), whatever the
    /// server's timestamp precision.
    pub fn birth_date_day(&self) -> Option<&str> {
        self.birth_date
            .as_deref()
            .map(|raw| raw.get(..10).unwrap_or(raw))
    }
}

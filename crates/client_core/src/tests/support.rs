//! In-process REST server and fixtures shared by the client tests.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    Router,
};
use serde::Serialize;
use shared::domain::{Director, Genre, Movie, MovieId, User};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

type RouteKey = (Method, String);

#[derive(Clone, Default)]
pub struct MockApi {
    routes: Arc<Mutex<HashMap<RouteKey, (StatusCode, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn route(&self, method: Method, path: &str, status: StatusCode, body: impl Into<String>) {
        self.routes
            .lock()
            .await
            .insert((method, path.to_string()), (status, body.into()));
    }

    pub async fn json<T: Serialize>(&self, method: Method, path: &str, value: &T) {
        let body = serde_json::to_string(value).expect("encode fixture");
        self.route(method, path, StatusCode::OK, body).await;
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn hits(&self, method: &Method, path: &str) -> usize {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|request| request.method == *method && request.path == path)
            .count()
    }

    /// Serves on an ephemeral port; returns the base URL with a trailing slash.
    pub async fn spawn(&self) -> String {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let app = Router::new().fallback(respond).with_state(self.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}/")
    }
}

async fn respond(
    State(api): State<MockApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let path = uri.path().to_string();
    api.requests.lock().await.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body,
    });

    api.routes
        .lock()
        .await
        .get(&(method, path))
        .cloned()
        .unwrap_or((StatusCode::NOT_FOUND, String::new()))
}

/// A base URL nothing listens on.
pub async fn unreachable_url() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}/")
}

pub fn movie(id: &str, title: &str) -> Movie {
    Movie {
        id: MovieId::new(id),
        title: title.to_string(),
        description: format!("{title} description"),
        release_year: 2001,
        image_url: None,
        rating_imdb: Some(7.5),
        featured: false,
        starring: vec!["Some Actor".to_string()],
        director: Some(Director {
            name: "Some Director".to_string(),
            bio: None,
            birth_date: None,
            death_date: None,
        }),
        genre: Some(Genre {
            name: "Drama".to_string(),
            description: None,
        }),
    }
}

pub fn user(username: &str, favorites: &[&str]) -> User {
    User {
        username: username.to_string(),
        email: format!("{username}@kino.app"),
        birth_date: None,
        token_invalid_before: None,
        favorites: favorites.iter().map(|id| MovieId::new(*id)).collect(),
    }
}

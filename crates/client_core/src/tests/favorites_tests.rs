use axum::http::{Method, StatusCode};
use tokio::sync::Mutex;

use super::*;
use crate::{
    error::ClientError,
    notice::NoticeLevel,
    request::ApiRequester,
    test_support::{movie, user, MockApi},
    users::UserService,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Add(String, String),
    Remove(String, String),
}

/// Answers with a fixed user, or a 500 when none is set.
#[derive(Default)]
struct FakeApi {
    calls: Mutex<Vec<Call>>,
    reply: Option<User>,
}

impl FakeApi {
    fn replying(user: User) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::default(),
            reply: Some(user),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self::default())
    }

    async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    fn answer(&self) -> Result<User> {
        self.reply.clone().ok_or_else(|| ClientError::Http {
            status: 500,
            code: shared::error::ErrorCode::Internal,
            message: "Server error. Please try again later.".into(),
        })
    }
}

#[async_trait]
impl FavoritesApi for FakeApi {
    async fn add_favorite(&self, username: &str, movie_id: &MovieId) -> Result<User> {
        self.calls
            .lock()
            .await
            .push(Call::Add(username.into(), movie_id.to_string()));
        self.answer()
    }

    async fn remove_favorite(&self, username: &str, movie_id: &MovieId) -> Result<User> {
        self.calls
            .lock()
            .await
            .push(Call::Remove(username.into(), movie_id.to_string()));
        self.answer()
    }
}

async fn reconciler_with(
    api: Arc<FakeApi>,
    session_user: Option<&User>,
) -> (FavoritesReconciler, Arc<SessionStore>, Notifier) {
    let session = Arc::new(SessionStore::in_memory());
    if let Some(session_user) = session_user {
        session.start("tok", session_user).await.expect("session");
    }
    let notifier = Notifier::default();
    let reconciler = FavoritesReconciler::new(api, Arc::clone(&session), notifier.clone());
    (reconciler, session, notifier)
}

#[tokio::test]
async fn adding_adopts_server_user_verbatim() {
    let alice = user("alice", &["m1"]);
    // The server may return more than the single change; it wins.
    let mut server_view = user("alice", &["m1", "m2", "m9"]);
    server_view.email = "server@kino.app".into();
    let api = FakeApi::replying(server_view.clone());
    let (reconciler, session, notifier) = reconciler_with(Arc::clone(&api), Some(&alice)).await;
    let mut notices = notifier.subscribe();

    let outcome = reconciler
        .toggle_for_session(&movie("m2", "Ronin"))
        .await
        .expect("toggle");

    assert_eq!(
        outcome,
        ToggleOutcome::Applied {
            action: FavoriteAction::Added,
            user: server_view.clone(),
        }
    );
    assert_eq!(api.calls().await, [Call::Add("alice".into(), "m2".into())]);
    assert_eq!(session.user().await.expect("user"), Some(server_view));

    let notice = notices.try_recv().expect("notice");
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.message, "Ronin added to favorites.");
}

#[tokio::test]
async fn toggling_existing_favorite_removes_it() {
    let alice = user("alice", &["m1", "m2"]);
    let api = FakeApi::replying(user("alice", &["m2"]));
    let (reconciler, session, notifier) = reconciler_with(Arc::clone(&api), Some(&alice)).await;
    let mut notices = notifier.subscribe();

    let outcome = reconciler
        .toggle_favorite(Some(&alice), &movie("m1", "Heat"))
        .await
        .expect("toggle");

    assert!(matches!(
        outcome,
        ToggleOutcome::Applied {
            action: FavoriteAction::Removed,
            ..
        }
    ));
    assert_eq!(api.calls().await, [Call::Remove("alice".into(), "m1".into())]);
    let stored = session.user().await.expect("user").expect("present");
    assert!(!stored.has_favorite(&MovieId::new("m1")));
    assert_eq!(
        notices.try_recv().expect("notice").message,
        "Heat removed from favorites."
    );
}

#[tokio::test]
async fn failed_toggle_keeps_previous_state() {
    let alice = user("alice", &["m1"]);
    let api = FakeApi::failing();
    let (reconciler, session, notifier) = reconciler_with(Arc::clone(&api), Some(&alice)).await;
    let mut notices = notifier.subscribe();

    let err = reconciler
        .toggle_for_session(&movie("m2", "Ronin"))
        .await
        .expect_err("server failure");
    assert_eq!(err.status(), Some(500));
    assert_eq!(session.user().await.expect("user"), Some(alice));

    let notice = notices.try_recv().expect("notice");
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Could not update favorites for Ronin.");
}

#[tokio::test]
async fn missing_user_or_movie_id_makes_no_call() {
    let api = FakeApi::replying(user("alice", &[]));
    let (reconciler, _session, notifier) = reconciler_with(Arc::clone(&api), None).await;
    let mut notices = notifier.subscribe();

    let outcome = reconciler
        .toggle_for_session(&movie("m1", "Heat"))
        .await
        .expect("toggle");
    assert_eq!(outcome, ToggleOutcome::NotAuthenticated);
    assert_eq!(
        notices.try_recv().expect("notice").message,
        "Please log in to manage favorites."
    );

    let alice = user("alice", &[]);
    let outcome = reconciler
        .toggle_favorite(Some(&alice), &movie("  ", "Untitled"))
        .await
        .expect("toggle");
    assert_eq!(outcome, ToggleOutcome::NotAuthenticated);
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn stored_user_without_token_is_not_signed_in() {
    let api = FakeApi::replying(user("alice", &["m1"]));
    let (reconciler, session, notifier) = reconciler_with(Arc::clone(&api), None).await;
    session
        .set_user(&user("alice", &[]))
        .await
        .expect("user only");
    assert!(!session.is_authenticated().await);
    let mut notices = notifier.subscribe();

    let outcome = reconciler
        .toggle_for_session(&movie("m1", "Heat"))
        .await
        .expect("toggle");

    assert_eq!(outcome, ToggleOutcome::NotAuthenticated);
    assert!(api.calls().await.is_empty());
    assert_eq!(
        notices.try_recv().expect("notice").message,
        "Please log in to manage favorites."
    );
}

#[test]
fn favorite_state_derives_from_user_snapshot() {
    let alice = user("alice", &["m1", "gone"]);
    let catalog = vec![movie("m1", "Heat"), movie("m2", "Ronin")];

    assert!(is_favorite(Some(&alice), &catalog[0]));
    assert!(!is_favorite(Some(&alice), &catalog[1]));
    assert!(!is_favorite(None, &catalog[0]));

    let favorites = favorite_movies(&alice, &catalog);
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].title, "Heat");
}

#[tokio::test]
async fn user_service_uses_favorite_routes() {
    let api = MockApi::new();
    api.json(Method::PATCH, "/users/alice/m2", &user("alice", &["m1", "m2"]))
        .await;
    api.json(Method::DELETE, "/users/alice/m1", &user("alice", &["m2"]))
        .await;
    let base_url = api.spawn().await;

    let session = Arc::new(SessionStore::in_memory());
    session
        .start("tok-7", &user("alice", &["m1"]))
        .await
        .expect("session");
    let requester = Arc::new(
        ApiRequester::new(&base_url, Arc::clone(&session), Notifier::default())
            .expect("requester"),
    );
    let reconciler = FavoritesReconciler::new(
        Arc::new(UserService::new(requester)),
        Arc::clone(&session),
        Notifier::default(),
    );

    reconciler
        .toggle_for_session(&movie("m2", "Ronin"))
        .await
        .expect("add");
    reconciler
        .toggle_for_session(&movie("m1", "Heat"))
        .await
        .expect("remove");

    let final_user = session.user().await.expect("user").expect("present");
    assert_eq!(final_user, user("alice", &["m2"]));

    let requests = api.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, Method::PATCH);
    assert_eq!(requests[0].body, "{}");
    assert_eq!(requests[1].method, Method::DELETE);
    assert!(requests[1].body.is_empty());
    assert!(requests
        .iter()
        .all(|request| request.authorization.as_deref() == Some("Bearer tok-7")));
}

#[tokio::test]
async fn server_rejection_through_user_service_is_reported() {
    let api = MockApi::new();
    api.route(Method::PATCH, "/users/alice/m2", StatusCode::FORBIDDEN, "")
        .await;
    let base_url = api.spawn().await;

    let session = Arc::new(SessionStore::in_memory());
    let alice = user("alice", &[]);
    session.start("tok", &alice).await.expect("session");
    let requester = Arc::new(
        ApiRequester::new(&base_url, Arc::clone(&session), Notifier::default())
            .expect("requester"),
    );
    let reconciler = FavoritesReconciler::new(
        Arc::new(UserService::new(requester)),
        Arc::clone(&session),
        Notifier::default(),
    );

    let err = reconciler
        .toggle_for_session(&movie("m2", "Ronin"))
        .await
        .expect_err("forbidden");
    assert_eq!(err.user_message(), "Access denied. You don't have permission.");
    assert_eq!(session.user().await.expect("user"), Some(alice));
}

//! End-to-end route tests against an in-memory SQLite datastore.
//!
//! Webhooks point at a closed local port, so every notification fails.
//! A failing notification must never change the response.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use minifi_core::{
    feedback::{FeedbackFilter, FeedbackRecord, FeedbackStats, FeedbackStatus, NewFeedback},
    lead::{Lead, LeadFilter, LeadStats, SubscribeOutcome},
    waitlist::{WaitlistSignup, WaitlistStats},
    CoreError, CoreResult, Datastore, GameConfig, PlayerProfile, SqliteStore,
};
use minifi_server::{app, notify::MessagingTarget, AppState, Notifier};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};
use tower::ServiceExt;

const DEAD_HOOK: &str = "http://127.0.0.1:9/hook";

/// SQLite store that counts writes and can be told to fail.
struct TestStore {
    inner:  SqliteStore,
    writes: AtomicUsize,
    broken: AtomicBool,
}

impl TestStore {
    fn new() -> Arc<Self> {
        let inner = SqliteStore::in_memory().unwrap();
        inner.migrate().unwrap();
        Arc::new(Self {
            inner,
            writes: AtomicUsize::new(0),
            broken: AtomicBool::new(false),
        })
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn write(&self) -> CoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check()
    }

    fn check(&self) -> CoreResult<()> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(CoreError::Other(anyhow::anyhow!("simulated outage")));
        }
        Ok(())
    }
}

impl Datastore for TestStore {
    fn submit_feedback(&self, feedback: &NewFeedback) -> CoreResult<FeedbackRecord> {
        self.write()?;
        self.inner.submit_feedback(feedback)
    }

    fn list_feedback(&self, filter: &FeedbackFilter) -> CoreResult<Vec<FeedbackRecord>> {
        self.check()?;
        self.inner.list_feedback(filter)
    }

    fn feedback_stats(&self) -> CoreResult<FeedbackStats> {
        self.check()?;
        self.inner.feedback_stats()
    }

    fn update_feedback_status(&self, id: &str, status: FeedbackStatus) -> CoreResult<bool> {
        self.write()?;
        self.inner.update_feedback_status(id, status)
    }

    fn subscribe(
        &self,
        email: &str,
        first_name: Option<&str>,
        source: &str,
    ) -> CoreResult<(Lead, SubscribeOutcome)> {
        self.write()?;
        self.inner.subscribe(email, first_name, source)
    }

    fn unsubscribe(&self, email: &str) -> CoreResult<bool> {
        self.write()?;
        self.inner.unsubscribe(email)
    }

    fn list_leads(&self, filter: &LeadFilter) -> CoreResult<Vec<Lead>> {
        self.check()?;
        self.inner.list_leads(filter)
    }

    fn lead_stats(&self) -> CoreResult<LeadStats> {
        self.check()?;
        self.inner.lead_stats()
    }

    fn join_waitlist(&self, email: &str, feature: &str) -> CoreResult<WaitlistSignup> {
        self.write()?;
        self.inner.join_waitlist(email, feature)
    }

    fn waitlist_position(&self, email: &str, feature: &str) -> CoreResult<Option<u64>> {
        self.check()?;
        self.inner.waitlist_position(email, feature)
    }

    fn waitlist_stats(&self) -> CoreResult<WaitlistStats> {
        self.check()?;
        self.inner.waitlist_stats()
    }

    fn save_profile(&self, profile: &PlayerProfile) -> CoreResult<()> {
        self.write()?;
        self.inner.save_profile(profile)
    }

    fn load_profile(&self, player_id: &str) -> CoreResult<Option<PlayerProfile>> {
        self.check()?;
        self.inner.load_profile(player_id)
    }
}

fn dead_notifier() -> Notifier {
    Notifier::new(
        Some(DEAD_HOOK.into()),
        None,
        Some(MessagingTarget {
            url:     DEAD_HOOK.into(),
            api_key: Some("test-key".into()),
        }),
    )
}

fn router(store: &Arc<TestStore>) -> Router {
    let store: Arc<dyn Datastore> = store.clone();
    app(AppState::new(Some(store), dead_notifier(), GameConfig::default()).with_league_seed(7))
}

fn router_without_store() -> Router {
    app(AppState::new(None, Notifier::disabled(), GameConfig::default()))
}

async fn onboard(app: &Router, player_id: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/onboarding/complete",
        Some(json!({ "playerId": player_id, "selectedCoach": "sage", "termsAccepted": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "onboarding {player_id}: {body}");
    body["profile"].clone()
}

fn season_end(profile: &Value) -> DateTime<Utc> {
    let raw = profile["league"]["season"]["ends_at"].as_str().unwrap();
    raw.parse().unwrap()
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = router.clone().oneshot(request).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// ── Feedback ───────────────────────────────────────────────────────

#[tokio::test]
async fn feedback_is_persisted_even_when_webhook_fails() {
    let store = TestStore::new();
    let app = router(&store);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/feedback",
        Some(json!({ "type": "idea", "message": "More missions about saving", "rating": 5 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Thank you for your feedback! 🙏");
    assert!(body["feedbackId"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(store.writes(), 1);

    let (status, body) = send(&app, Method::GET, "/api/feedback", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["total"], 1);
    assert_eq!(body["recent"][0]["type"], "idea");
    assert_eq!(body["datastoreConfigured"], true);
}

#[tokio::test]
async fn invalid_feedback_never_reaches_the_store() {
    let store = TestStore::new();
    let app = router(&store);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/feedback",
        Some(json!({ "type": "rant", "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid feedback type");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/feedback",
        Some(json!({ "type": "love", "message": "great", "rating": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Rating must be between 1 and 5");

    assert_eq!(store.writes(), 0, "no datastore call for invalid input");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let store = TestStore::new();
    let app = router(&store);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/feedback")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.clone().oneshot(request).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Invalid request body");
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn datastore_failure_is_reported_as_failure() {
    let store = TestStore::new();
    store.broken.store(true, Ordering::SeqCst);
    let app = router(&store);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/feedback",
        Some(json!({ "type": "bug", "message": "Chart froze on week 3" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Submission failed");
}

#[tokio::test]
async fn missing_datastore_fails_writes_and_empties_reads() {
    let app = router_without_store();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/feedback",
        Some(json!({ "type": "general", "message": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, Method::GET, "/api/feedback?stats=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["total"], 0);
    assert_eq!(body["datastoreConfigured"], false);
    assert!(body.get("recent").is_none(), "stats-only view omits recent");
}

#[tokio::test]
async fn feedback_status_can_be_updated() {
    let store = TestStore::new();
    let app = router(&store);

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/feedback",
        Some(json!({ "type": "issue", "message": "Balance looks off" })),
    )
    .await;
    let id = body["feedbackId"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/feedback",
        Some(json!({ "id": id, "status": "reviewed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = send(
        &app,
        Method::PATCH,
        "/api/feedback",
        Some(json!({ "id": "no-such-id", "status": "reviewed" })),
    )
    .await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Update failed");

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/feedback",
        Some(json!({ "id": id, "status": "deleted" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid status");
}

// ── Newsletter ─────────────────────────────────────────────────────

#[tokio::test]
async fn invalid_email_is_rejected_before_the_store() {
    let store = TestStore::new();
    let app = router(&store);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/newsletter/subscribe",
        Some(json!({ "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email address");
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn subscribe_check_and_unsubscribe() {
    let store = TestStore::new();
    let app = router(&store);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/newsletter/subscribe",
        Some(json!({ "email": "  Teen@Example.com ", "firstName": "Ana" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["subscriber"]["email"], "teen@example.com");

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/newsletter/subscribe?email=teen%40example.com",
        None,
    )
    .await;
    assert_eq!(body["isSubscribed"], true);

    let (_, body) = send(&app, Method::GET, "/api/newsletter/subscribe?stats=true", None).await;
    assert_eq!(body["stats"]["total"], 1);
    assert_eq!(body["stats"]["bySource"]["website"], 1);

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/newsletter/subscribe?email=teen%40example.com",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully unsubscribed");

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/newsletter/subscribe?email=teen%40example.com",
        None,
    )
    .await;
    assert_eq!(body["isSubscribed"], false);
}

#[tokio::test]
async fn unsubscribe_requires_an_email() {
    let store = TestStore::new();
    let app = router(&store);

    let (status, body) = send(&app, Method::DELETE, "/api/newsletter/subscribe", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email is required");
    assert_eq!(store.writes(), 0);
}

// ── Waitlist ───────────────────────────────────────────────────────

#[tokio::test]
async fn waitlist_signup_reports_position() {
    let store = TestStore::new();
    let app = router(&store);
    let join = |email: &str| json!({ "email": email, "feature": "ai-mentor" });

    let (status, body) = send(&app, Method::POST, "/api/waitlist", Some(join("a@example.com"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["position"], 1);
    assert_eq!(
        body["message"],
        "You're #1 on the waitlist for ai-mentor! We'll notify you when it's ready."
    );

    let (_, body) = send(&app, Method::POST, "/api/waitlist", Some(join("B@example.com"))).await;
    assert_eq!(body["position"], 2);

    let (_, body) = send(&app, Method::POST, "/api/waitlist", Some(join("a@example.com"))).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["position"], 1);
    assert_eq!(body["message"], "You're already on the waitlist for ai-mentor!");

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/waitlist?feature=ai-mentor&email=b%40example.com",
        None,
    )
    .await;
    assert_eq!(body["onWaitlist"], true);
    assert_eq!(body["position"], 2);

    let (_, body) = send(&app, Method::GET, "/api/waitlist?feature=ai-mentor", None).await;
    assert_eq!(body["count"], 2);

    let (_, body) = send(&app, Method::GET, "/api/waitlist", None).await;
    assert_eq!(body["stats"]["ai-mentor"], 2);
    assert_eq!(body["stats"]["mobile-app"], 0);
    assert_eq!(body["features"].as_array().map(Vec::len), Some(8));
}

#[tokio::test]
async fn waitlist_rejects_unknown_features() {
    let store = TestStore::new();
    let app = router(&store);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/waitlist",
        Some(json!({ "email": "a@example.com", "feature": "time-machine" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .is_some_and(|m| m.starts_with("Invalid feature. Valid options: ")));
    assert_eq!(store.writes(), 0);

    let (status, _) = send(&app, Method::GET, "/api/waitlist?feature=time-machine", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn waitlist_without_a_datastore() {
    let app = router_without_store();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/waitlist",
        Some(json!({ "email": "a@example.com", "feature": "risk-quiz" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to join waitlist");

    let (status, body) = send(&app, Method::GET, "/api/waitlist", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["datastoreConfigured"], false);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_signups_run_off_the_async_workers() {
    let store = TestStore::new();
    let app = router(&store);

    let mut tasks = Vec::new();
    for n in 0..16 {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            let body = json!({ "email": format!("fan{n}@example.com"), "feature": "mobile-app" });
            send(&app, Method::POST, "/api/waitlist", Some(body)).await
        }));
    }
    let mut positions = Vec::new();
    for task in tasks {
        let (status, body) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        positions.push(body["position"].as_u64().unwrap());
    }
    positions.sort_unstable();
    assert_eq!(positions, (1..=16).collect::<Vec<u64>>(), "every signup gets its own place");
    assert_eq!(store.writes(), 16);
}

// ── Rewards and leagues ────────────────────────────────────────────

#[tokio::test]
async fn onboarding_then_applying_events() {
    let store = TestStore::new();
    let app = router(&store);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/onboarding/complete",
        Some(json!({ "selectedCoach": "sage", "termsAccepted": false })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required fields");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/onboarding/complete",
        Some(json!({
            "playerId": "p-42",
            "selectedCoach": "sage",
            "termsAccepted": true,
            "adventureName": "Coin Hunter",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["welcomeBonus"], 100);
    let profile = body["profile"].clone();
    assert_eq!(profile["id"], "p-42");

    let event = json!({ "type": "quiz_completed", "correct": 5, "total": 5, "event_id": "quiz-1" });
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/rewards/apply",
        Some(json!({ "profile": profile, "event": event })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "applied");
    assert!(body["earned"].as_i64().unwrap_or(0) > 0);
    assert!(body["seasonEnded"].is_null());

    let replay = json!({ "profile": body["profile"].clone(), "event": event });
    let (_, body) = send(&app, Method::POST, "/api/rewards/apply", Some(replay)).await;
    assert_eq!(body["status"], "duplicate");
    assert_eq!(body["earned"], 0);
    assert_eq!(body["persisted"], false);
    assert_eq!(store.writes(), 2, "onboarding and the applied quiz are saved, the duplicate is not");

    let stored = store.inner.load_profile("p-42").unwrap().expect("stored profile");
    assert_eq!(stored.display_name.as_deref(), Some("Coin Hunter"));
    assert!(stored.has_seen_event("quiz-1"));
}

#[tokio::test]
async fn events_can_be_applied_to_the_stored_profile() {
    let store = TestStore::new();
    let app = router(&store);
    onboard(&app, "p-9").await;

    let event = json!({ "type": "coach_advice_viewed", "coach_id": "nova" });
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/rewards/apply",
        Some(json!({ "playerId": "p-9", "event": event })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "applied");
    assert_eq!(body["persisted"], true);
    let balance = body["profile"]["ledger"]["balance"].clone();

    let stored = store.inner.load_profile("p-9").unwrap().expect("stored profile");
    assert_eq!(json!(stored.balance()), balance);
    assert!(stored.stats.coaches.contains("nova"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/rewards/apply",
        Some(json!({ "playerId": "nobody", "event": event })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Profile not found");

    let (status, body) =
        send(&app, Method::POST, "/api/rewards/apply", Some(json!({ "event": event }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Profile or playerId is required");
}

#[tokio::test]
async fn an_ended_season_settles_before_the_event_applies() {
    let store = TestStore::new();
    let app = router(&store);
    let profile = onboard(&app, "p-season").await;
    let old_season = profile["league"]["season"]["id"].clone();
    let now = season_end(&profile) + Duration::days(1);

    let event = json!({ "type": "quiz_completed", "correct": 4, "total": 5 });
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/rewards/apply",
        Some(json!({ "profile": profile, "event": event, "now": now })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "applied");

    let ended = &body["seasonEnded"];
    assert!(!ended.is_null(), "season end is reported");
    assert_eq!(ended["season_id"], old_season);
    assert_eq!(ended["league_id"], "bronze");
    assert_eq!(ended["weekly_score"], profile["weekly_score"], "ranked on the pre-event score");

    let next = &body["profile"];
    assert_eq!(next["league"]["league_id"], ended["new_league_id"], "tier moved at settlement");
    assert_ne!(next["league"]["season"]["id"], old_season);
    assert_eq!(
        next["weekly_score"], body["earned"],
        "weekly score was reset before the quiz counted"
    );
}

#[tokio::test]
async fn an_unknown_league_in_an_ended_season_is_rejected() {
    let store = TestStore::new();
    let app = router(&store);
    let mut profile = onboard(&app, "p-lost").await;
    let now = season_end(&profile) + Duration::hours(1);
    profile["league"]["league_id"] = json!("mythril");
    let writes = store.writes();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/rewards/apply",
        Some(json!({
            "profile": profile,
            "event": { "type": "quiz_completed", "correct": 1, "total": 5 },
            "now": now,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown league");
    assert_eq!(store.writes(), writes, "nothing saved");
}

#[tokio::test]
async fn spending_more_than_the_balance_changes_nothing() {
    let store = TestStore::new();
    let app = router(&store);
    let profile = onboard(&app, "p-spender").await;
    assert_eq!(profile["ledger"]["balance"], 100);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/rewards/apply",
        Some(json!({
            "profile": profile,
            "event": { "type": "tokens_spent", "amount": 5000, "reason": "avatar" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], "insufficient_balance");
    assert_eq!(body["message"], "Insufficient balance");
    assert_eq!(body["profile"], profile, "profile returned unchanged");
    assert_eq!(body["persisted"], false);
}

#[tokio::test]
async fn reward_summary_reads_the_stored_profile() {
    let store = TestStore::new();
    let app = router(&store);
    onboard(&app, "p-sum").await;

    let (status, body) = send(&app, Method::GET, "/api/rewards?player_id=p-sum", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["datastoreConfigured"], true);
    let summary = &body["data"]["summary"];
    assert_eq!(summary["totalIII"], 100);
    assert_eq!(summary["weeklyIII"], 100);
    assert_eq!(summary["stakedIII"], 0);
    assert_eq!(body["data"]["recentTransactions"][0]["amount"], 100);

    let (_, body) = send(&app, Method::GET, "/api/rewards?player_id=stranger", None).await;
    assert!(body["data"]["profile"].is_null());
    assert_eq!(body["data"]["summary"]["totalIII"], 0);

    let (status, body) = send(&app, Method::GET, "/api/rewards", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "player_id is required");
}

#[tokio::test]
async fn reward_summary_without_a_datastore_is_empty() {
    let (status, body) =
        send(&router_without_store(), Method::GET, "/api/rewards?player_id=p-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["datastoreConfigured"], false);
    assert!(body["data"]["profile"].is_null());
    assert_eq!(body["data"]["summary"]["totalBadges"], 0);
}

// ── Streaks ────────────────────────────────────────────────────────

#[tokio::test]
async fn streak_claims_once_a_day_and_extends_on_the_next() {
    let store = TestStore::new();
    let app = router(&store);
    let day_one = Utc.with_ymd_and_hms(2026, 3, 4, 8, 0, 0).unwrap();
    let claim = |at: DateTime<Utc>| json!({ "playerId": "p-streak", "now": at });

    let (status, body) = send(&app, Method::POST, "/api/streak", Some(claim(day_one))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["currentStreak"], 1);
    assert_eq!(body["data"]["alreadyClaimed"], false);
    assert_eq!(body["data"]["profileCreated"], true);
    assert!(body["data"]["xpEarned"].as_i64().unwrap_or(0) > 0);

    let later = day_one + Duration::hours(6);
    let (_, body) = send(&app, Method::POST, "/api/streak", Some(claim(later))).await;
    assert_eq!(body["data"]["alreadyClaimed"], true);
    assert_eq!(body["data"]["xpEarned"], 0);

    let (_, body) =
        send(&app, Method::POST, "/api/streak", Some(claim(day_one + Duration::days(1)))).await;
    assert_eq!(body["data"]["currentStreak"], 2);
    assert_eq!(body["data"]["profileCreated"], false);

    let (_, body) =
        send(&app, Method::POST, "/api/streak", Some(claim(day_one + Duration::days(4)))).await;
    assert_eq!(body["data"]["currentStreak"], 1, "a gap restarts the streak");

    let stored = store.inner.load_profile("p-streak").unwrap().expect("stored profile");
    assert_eq!(stored.current_streak, 1);
    assert_eq!(stored.longest_streak, 2);
}

#[tokio::test]
async fn streak_status_reflects_todays_claim() {
    let store = TestStore::new();
    let app = router(&store);

    let (_, body) = send(&app, Method::GET, "/api/streak?player_id=p-today", None).await;
    assert_eq!(body["data"]["currentStreak"], 0);
    assert_eq!(body["data"]["todayClaimed"], false);

    send(&app, Method::POST, "/api/streak", Some(json!({ "playerId": "p-today" }))).await;
    let (status, body) = send(&app, Method::GET, "/api/streak?player_id=p-today", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["currentStreak"], 1);
    assert_eq!(body["data"]["todayClaimed"], true);

    let (status, body) = send(&app, Method::POST, "/api/streak", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "playerId is required to claim a streak");

    let (status, _) = send(
        &router_without_store(),
        Method::POST,
        "/api/streak",
        Some(json!({ "playerId": "p-today" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn standings_include_the_player() {
    let store = TestStore::new();
    let app = router(&store);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/league/standings?player_id=p-1&weekly_score=420&total_score=300",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["standings"]["entries"].as_array().cloned().unwrap_or_default();
    assert_eq!(entries.len(), 30);
    let me: Vec<_> = entries.iter().filter(|e| e["is_current_user"] == true).collect();
    assert_eq!(me.len(), 1);
    assert_eq!(me[0]["rank"], body["standings"]["user_rank"]);

    let (status, body) = send(&app, Method::GET, "/api/league/standings", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "player_id is required");

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/league/standings?player_id=p-1&league=mythril",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_check() {
    let (status, body) = send(&router_without_store(), Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

//! HTTP integration tests.
//!
//! Starts the full app on an ephemeral port over an in-memory store and
//! drives it with reqwest.

use forum_config::ForumConfig;
use pretty_assertions::assert_eq;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

const PASSWORD: &str = "s3cret-pass";

struct TestServer {
    base: String,
    client: Client,
}

impl TestServer {
    async fn start() -> Self {
        let mut config = ForumConfig::default();
        config.database.path = ":memory:".to_string();

        let state = forum_web::build_state(config).await.unwrap();
        let app = forum_web::app(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn post(&self, path: &str, token: Option<&str>, form: &[(&str, &str)]) -> reqwest::Response {
        let mut req = self.client.post(self.url(path)).form(form);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req.send().await.unwrap()
    }

    async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req.send().await.unwrap()
    }

    /// Register and log in; returns the session token.
    async fn user(&self, username: &str) -> String {
        let resp = self
            .post(
                "/register",
                None,
                &[("username", username), ("password1", PASSWORD), ("password2", PASSWORD)],
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = self
            .post("/login", None, &[("username", username), ("password", PASSWORD)])
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn ask(&self, token: &str, title: &str) -> i64 {
        let resp = self
            .post("/ask", Some(token), &[("title", title), ("body", "details"), ("tags", "rust, web")])
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = resp.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn health_check() {
    let server = TestServer::start().await;
    let resp = server.get("/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn registration_errors() {
    let server = TestServer::start().await;
    server.user("alice").await;

    let dup = server
        .post(
            "/register",
            None,
            &[("username", "alice"), ("password1", PASSWORD), ("password2", PASSWORD)],
        )
        .await;
    assert_eq!(dup.status(), StatusCode::CONFLICT);

    let mismatch = server
        .post(
            "/register",
            None,
            &[("username", "bob"), ("password1", PASSWORD), ("password2", "different!")],
        )
        .await;
    assert_eq!(mismatch.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = mismatch.json().await.unwrap();
    assert!(body["errors"]["password2"].is_string());
}

#[tokio::test]
async fn login_sets_cookie_and_rejects_bad_password() {
    let server = TestServer::start().await;
    server.user("alice").await;

    let bad = server
        .post("/login", None, &[("username", "alice"), ("password", "nope-nope")])
        .await;
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);

    let ok = server
        .post("/login", None, &[("username", "alice"), ("password", PASSWORD)])
        .await;
    assert_eq!(ok.status(), StatusCode::OK);
    let cookie = ok
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("forum_session="));

    // The cookie alone authenticates.
    let pair = cookie.split(';').next().unwrap();
    let resp = server
        .client
        .get(server.url("/dashboard"))
        .header("cookie", pair)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["username"], "alice");
}

#[tokio::test]
async fn writes_require_a_session() {
    let server = TestServer::start().await;
    for (path, form) in [
        ("/ask", vec![("title", "t"), ("body", "b")]),
        ("/vote", vec![("id", "1"), ("vote_to", "up"), ("vote_type", "question")]),
        ("/answer-or-comment", vec![("text", "x"), ("id", "1"), ("type", "answer")]),
    ] {
        let resp = server.post(path, None, &form).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
    assert_eq!(
        server.get("/dashboard", Some("made-up-token")).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn ask_list_search_and_detail() {
    let server = TestServer::start().await;
    let token = server.user("alice").await;
    let first = server.ask(&token, "Async traits in Rust").await;
    let second = server.ask(&token, "Lifetimes explained").await;

    let resp = server.get("/", None).await;
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["total"], 2);
    assert_eq!(page["items"][0]["id"], second);
    assert_eq!(page["items"][1]["id"], first);
    assert_eq!(page["items"][0]["answer_count"], 0);

    let resp = server.get("/?q=ASYNC", None).await;
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["title"], "Async traits in Rust");

    let resp = server.get(&format!("/question/{first}"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let detail: Value = resp.json().await.unwrap();
    assert_eq!(detail["tags"], json!(["rust", "web"]));
    assert_eq!(detail["answers"], json!([]));

    assert_eq!(server.get("/question/999", None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.get("/question/abc", None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.get("/?page=2", None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.get("/?page=last", None).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn vote_toggles_and_reports_score() {
    let server = TestServer::start().await;
    let token = server.user("alice").await;
    let qid = server.ask(&token, "Vote on me").await.to_string();

    let mut scores = Vec::new();
    for direction in ["up", "up", "down", "up"] {
        let resp = server
            .post(
                "/vote",
                Some(&token),
                &[("id", qid.as_str()), ("vote_to", direction), ("vote_type", "question")],
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        scores.push(body["bool"].as_i64().unwrap());
    }
    assert_eq!(scores, vec![1, 0, -1, 1]);

    let bad = server
        .post(
            "/vote",
            Some(&token),
            &[("id", qid.as_str()), ("vote_to", "sideways"), ("vote_type", "question")],
        )
        .await;
    assert_eq!(bad.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = bad.json().await.unwrap();
    assert!(body["errors"]["vote_to"].is_string());

    let missing = server
        .post(
            "/vote",
            Some(&token),
            &[("id", "4040"), ("vote_to", "up"), ("vote_type", "answer")],
        )
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn answer_then_comment_fragments() {
    let server = TestServer::start().await;
    let token = server.user("alice").await;
    let qid = server.ask(&token, "Threads").await.to_string();

    let resp = server
        .post(
            "/answer-or-comment",
            Some(&token),
            &[("text", "Use scoped threads"), ("id", qid.as_str()), ("type", "answer")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let answer: Value = resp.json().await.unwrap();
    assert_eq!(answer["kind"], "answer");
    assert_eq!(answer["author"], "alice");
    let aid = answer["id"].as_i64().unwrap().to_string();

    let resp = server
        .post(
            "/answer-or-comment",
            Some(&token),
            &[("text", "Since 1.63"), ("id", aid.as_str()), ("type", "comment")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let comment: Value = resp.json().await.unwrap();
    assert_eq!(comment["kind"], "comment");
    assert_eq!(comment["body"], "Since 1.63");

    let bogus = server
        .post(
            "/answer-or-comment",
            Some(&token),
            &[("text", "x"), ("id", aid.as_str()), ("type", "reply")],
        )
        .await;
    assert_eq!(bogus.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let blank = server
        .post(
            "/answer-or-comment",
            Some(&token),
            &[("text", "   "), ("id", aid.as_str()), ("type", "comment")],
        )
        .await;
    assert_eq!(blank.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let orphan = server
        .post(
            "/answer-or-comment",
            Some(&token),
            &[("text", "x"), ("id", "999"), ("type", "comment")],
        )
        .await;
    assert_eq!(orphan.status(), StatusCode::NOT_FOUND);

    let detail: Value = server
        .get(&format!("/question/{qid}"), None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["answer_count"], 1);
    assert_eq!(detail["answers"][0]["comments"][0]["body"], "Since 1.63");
}

#[tokio::test]
async fn answer_route_and_dashboard() {
    let server = TestServer::start().await;
    let alice = server.user("alice").await;
    let bob = server.user("bob").await;
    let qid = server.ask(&alice, "Mine").await;

    let resp = server
        .post(&format!("/question/{qid}/answer"), Some(&bob), &[("body", "An answer")])
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let dash: Value = server.get("/dashboard", Some(&alice)).await.json().await.unwrap();
    assert_eq!(dash["questions"][0]["id"], qid);
    assert_eq!(dash["questions"][0]["answer_count"], 1);

    let dash: Value = server.get("/dashboard", Some(&bob)).await.json().await.unwrap();
    assert_eq!(dash["questions"], json!([]));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let server = TestServer::start().await;
    let token = server.user("alice").await;

    let resp = server.post("/logouts", Some(&token), &[]).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(
        resp.headers()
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("Max-Age=0")
    );

    assert_eq!(
        server.get("/dashboard", Some(&token)).await.status(),
        StatusCode::UNAUTHORIZED
    );

    // Logging out without a session is still fine.
    assert_eq!(server.post("/logout", None, &[]).await.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = TestServer::start().await;
    let token = server.user("alice").await;
    let huge = "x".repeat(70 * 1024);

    let resp = server
        .post("/ask", Some(&token), &[("title", "big"), ("body", huge.as_str())])
        .await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

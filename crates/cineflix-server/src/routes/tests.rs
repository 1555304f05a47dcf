use super::*;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use cineflix_core::{Authenticator, JsonReviewStore, JsonUserStore, KeyRing, ReviewService, UserService};
use cineflix_sources::testing::StaticFetcher;
use cineflix_sources::{build_http_client, CategoryFetcher, PageFetcher, TmdbScraper, YoutubeClient};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const BASE: &str = "https://tmdb.test";

const SEARCH_PAGE: &str = r#"
<div class="card v4 tight">
  <a class="result" href="/movie/438631-dune"><img src="https://img.test/dune.jpg"><h2>Dune</h2></a>
  <span class="release_date">22 October 2021</span>
</div>"#;

fn listing(title: &str) -> String {
    format!(
        r#"<div class="card style_1"><a href="/movie/{0}"><img src="https://img.test/{0}.jpg"></a>
           <div class="content"><h2>{0}</h2><p>Jan 1, 2024</p></div></div>"#,
        title
    )
}

fn app(fetcher: StaticFetcher) -> Router {
    let users = Arc::new(JsonUserStore::in_memory());
    let fetcher: Arc<dyn PageFetcher> = Arc::new(fetcher);
    let keys = KeyRing::new(vec!["test-signing-key".to_string()]).unwrap();
    let client = build_http_client("cineflix-test", Duration::from_secs(1)).unwrap();

    router(AppState {
        reviews: ReviewService::new(Arc::new(JsonReviewStore::in_memory())),
        users: UserService::new(users.clone()),
        auth: Authenticator::new(keys, 30, users),
        scraper: TmdbScraper::new(fetcher.clone(), BASE),
        categories: CategoryFetcher::new(fetcher, BASE, 2, 2),
        youtube: YoutubeClient::new(client, "http://127.0.0.1:9/search", None),
    })
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/logins/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "username={}&password={}",
            email.replace('@', "%40"),
            password
        )))
        .unwrap()
}

async fn signup_and_login(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        request(
            Method::POST,
            "/users/createuser",
            None,
            Some(json!({ "name": "Tester", "email": email, "password": "pw" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, login_request(email, "pw")).await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app(StaticFetcher::new());
    let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_signup_and_duplicate() {
    let app = app(StaticFetcher::new());
    let signup = json!({ "name": "Ada", "email": "ada@example.com", "password": "pw" });

    let (status, body) = send(&app, request(Method::POST, "/users/createuser", None, Some(signup.clone()))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "Success": "Signup successfull" }));

    let (status, body) = send(&app, request(Method::POST, "/users/createuser", None, Some(signup))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "User already created");

    let (status, body) = send(&app, request(Method::GET, "/users/getallusers", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["email"], "ada@example.com");
    assert!(body[0].get("password_hash").is_none());
}

#[tokio::test]
async fn test_malformed_body_is_detail_error() {
    let app = app(StaticFetcher::new());
    let (status, body) = send(
        &app,
        request(Method::POST, "/users/createuser", None, Some(json!({ "name": "Ada" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn test_review_missing_rating_is_bad_request() {
    let app = app(StaticFetcher::new());
    let token = signup_and_login(&app, "ada@example.com").await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/review/addReview",
            Some(&token),
            Some(json!({ "movie_name": "Dune", "release_date": "2021-10-22", "review_content": "Great" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("rating"));
}

#[tokio::test]
async fn test_login_missing_password_is_bad_request() {
    let app = app(StaticFetcher::new());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/logins/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=ada%40example.com"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_details_without_movie_url_is_bad_request() {
    let app = app(StaticFetcher::new());
    let token = signup_and_login(&app, "ada@example.com").await;

    let (status, _) = send(&app, request(Method::GET, "/movies/details", Some(&token), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_and_token_checks() {
    let app = app(StaticFetcher::new());
    signup_and_login(&app, "ada@example.com").await;

    let (status, body) = send(&app, login_request("ada@example.com", "wrong")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Invalid credentials");

    let (status, _) = send(&app, request(Method::GET, "/review/mine", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, request(Method::GET, "/review/mine", Some("garbage"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_review_flow() {
    let app = app(StaticFetcher::new());
    let u1 = signup_and_login(&app, "one@example.com").await;
    let u2 = signup_and_login(&app, "two@example.com").await;
    let review = |rating: f64| {
        json!({ "movie_name": "Dune", "release_date": "2021-10-22", "review_content": "great", "rating": rating })
    };

    let (status, body) = send(&app, request(Method::POST, "/review/addReview", Some(&u1), Some(review(4.5)))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "Success": "Review added successfully", "overall_rating": 4.5 }));

    let (status, body) = send(&app, request(Method::POST, "/review/addReview", Some(&u2), Some(review(3.5)))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["overall_rating"], 4.0);

    let (status, body) = send(&app, request(Method::POST, "/review/addReview", Some(&u2), Some(review(1.0)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("already"));

    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            "/review/editReview/Dune/2021-10-22",
            Some(&u1),
            Some(json!({ "review_content": "superb", "rating": 5.0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "movie_name": "Dune", "updated_review_content": "superb", "overall_rating": 4.25 })
    );

    let (status, body) = send(&app, request(Method::GET, "/review/getReviews/Dune/2021-10-22", Some(&u1), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movie_name"], "Dune");
    assert_eq!(body["release_date"], "2021-10-22");
    assert_eq!(body["overall_rating"], 4.25);
    assert_eq!(body["reviews"].as_array().unwrap().len(), 2);
    assert_eq!(body["reviews"][0]["review_content"], "superb");

    let (status, body) = send(&app, request(Method::GET, "/review/mine", Some(&u2), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["rating"], 3.5);

    let (status, body) = send(&app, request(Method::DELETE, "/review/deleteReview/Dune/2021-10-22", Some(&u1), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_rating"], 3.5);

    let (status, body) = send(&app, request(Method::DELETE, "/review/deleteReview/Dune/2021-10-22", Some(&u2), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_rating"], 0.0);

    let (status, _) = send(&app, request(Method::GET, "/review/getReviews/Dune/2021-10-22", Some(&u1), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_rating_out_of_range() {
    let app = app(StaticFetcher::new());
    let token = signup_and_login(&app, "ada@example.com").await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/review/addReview",
            Some(&token),
            Some(json!({ "movie_name": "Dune", "release_date": "2021", "review_content": "x", "rating": 7.5 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deleted_user_token_is_not_found() {
    let app = app(StaticFetcher::new());
    let token = signup_and_login(&app, "ada@example.com").await;

    let (status, body) = send(&app, request(Method::DELETE, "/users/deleteuser", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "Success": "User deleted successfully" }));

    let (status, body) = send(&app, request(Method::GET, "/review/mine", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "User not found");
}

#[tokio::test]
async fn test_search() {
    let fetcher = StaticFetcher::new()
        .with_page(format!("{}/search/movie?query=Dune&language=en-GB", BASE), SEARCH_PAGE)
        .with_page(format!("{}/search/movie?query=Nothing&language=en-GB", BASE), "<html></html>");
    let app = app(fetcher);
    let token = signup_and_login(&app, "ada@example.com").await;

    let (status, body) = send(&app, request(Method::GET, "/movies/search/Dune", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "Dune");
    assert_eq!(body[0]["url"], "https://tmdb.test/movie/438631-dune");

    let (status, _) = send(&app, request(Method::GET, "/movies/search/Nothing", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_details_errors() {
    let fetcher = StaticFetcher::new().with_timeout(format!("{}/movie/1-slow", BASE));
    let app = app(fetcher);
    let token = signup_and_login(&app, "ada@example.com").await;

    let (status, body) = send(
        &app,
        request(Method::GET, "/movies/details?movie_url=https%3A%2F%2Fexample.com%2Fx", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid movie URL");

    let (status, _) = send(
        &app,
        request(Method::GET, "/movies/details?movie_url=https%3A%2F%2Ftmdb.test%2Fmovie%2F1-slow", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);

    let (status, _) = send(&app, request(Method::GET, "/movies/details", Some(&token), None)).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_categories() {
    let fetcher = StaticFetcher::new()
        .with_page(format!("{}/movie?page=1&language=en-GB", BASE), listing("First"))
        .with_status(format!("{}/movie?page=2&language=en-GB", BASE), 503);
    let app = app(fetcher);
    let token = signup_and_login(&app, "ada@example.com").await;

    let (status, body) = send(&app, request(Method::GET, "/movies/popular", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "First");

    let (status, _) = send(&app, request(Method::GET, "/movies/top-rated", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trailer_without_api_key() {
    let app = app(StaticFetcher::new());
    let token = signup_and_login(&app, "ada@example.com").await;

    let (status, body) = send(&app, request(Method::GET, "/movies/trailer/Dune", Some(&token), None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "YouTube API key not configured");
}

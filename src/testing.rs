//! In-process stand-in for the marketplace API, used by the unit tests.

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::cases::{auth::ProfessionalRegistration, CaseContext, TestCase};
use crate::client::ApiClient;
use crate::runner::recorder::{Echo, ResultRecorder};
use crate::runner::session::SessionState;
use crate::runner::state::TestResult;
use crate::utils::config::Config;

pub const ADMIN_TOKEN: &str = "stub-admin-token";
pub const ADMIN_EMAIL: &str = "admin@expertbridge.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const CATEGORIES: [&str; 6] = [
    "Psychologist",
    "Lawyer",
    "Doctor",
    "Accountant",
    "Architect",
    "Consultant",
];

/// Switches that make the stub misbehave in specific ways
#[derive(Debug, Clone, Copy, Default)]
pub struct StubBehavior {
    /// `GET /` answers 200 with HTML instead of JSON
    pub html_root: bool,
    /// Profile reads stop bumping the view counter
    pub freeze_views: bool,
    /// Every registration is refused with 400
    pub reject_registration: bool,
    /// Admin routes skip the token check
    pub open_admin: bool,
    /// Registration and login answer 200 with `null` token and id
    pub null_credentials: bool,
}

struct StubProfessional {
    id: String,
    email: String,
    password: String,
    full_name: String,
    category: String,
    country: String,
    phone: String,
    bio: String,
    status: &'static str,
    profile_views: i64,
    contact_clicks: i64,
}

impl StubProfessional {
    fn approved(&self) -> bool {
        self.status == "approved"
    }

    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "email": self.email,
            "fullName": self.full_name,
            "category": self.category,
            "phone": self.phone,
            "bio": self.bio,
            "location": { "country": self.country },
            "verification": { "status": self.status },
            "analytics": {
                "profileViews": self.profile_views,
                "contactClicks": self.contact_clicks
            }
        })
    }
}

#[derive(Default)]
struct StubState {
    behavior: StubBehavior,
    professionals: Vec<StubProfessional>,
    reviews: Vec<Value>,
    tokens: HashMap<String, String>,
    hits: usize,
}

impl StubState {
    fn find(&mut self, id: &str) -> Option<&mut StubProfessional> {
        self.professionals.iter_mut().find(|p| p.id == id)
    }

    fn is_admin(&self, headers: &HeaderMap) -> bool {
        self.behavior.open_admin || bearer(headers).as_deref() == Some(ADMIN_TOKEN)
    }

    /// Professional id behind the bearer token, if it is a professional token
    fn professional_for(&self, headers: &HeaderMap) -> Option<String> {
        bearer(headers).and_then(|token| self.tokens.get(&token).cloned())
    }

    fn issue_token(&mut self, professional_id: &str) -> String {
        let token = format!("stub-pro-token-{}", self.tokens.len() + 1);
        self.tokens
            .insert(token.clone(), professional_id.to_string());
        token
    }
}

type Shared = Arc<Mutex<StubState>>;

pub struct StubApi {
    pub base_url: String,
    state: Shared,
    server: tokio::task::JoinHandle<()>,
}

impl StubApi {
    pub async fn start() -> Self {
        Self::start_with(StubBehavior::default()).await
    }

    pub async fn start_with(behavior: StubBehavior) -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState {
            behavior,
            ..StubState::default()
        }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            server,
        }
    }

    /// Config pointed at this stub with short delays
    pub fn config(&self) -> Config {
        let mut config = Config::with_base_url(&self.base_url);
        config.timeout = Duration::from_secs(5);
        config.view_settle_delay = Duration::from_millis(10);
        config
    }

    /// Requests received so far
    pub fn hits(&self) -> usize {
        self.state.lock().unwrap().hits
    }
}

impl Drop for StubApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Address nothing is listening on
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Runs single cases with a silent recorder and inspectable session
pub struct Harness {
    pub client: ApiClient,
    pub config: Config,
    pub session: SessionState,
    pub recorder: ResultRecorder,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        let client = ApiClient::new(&config).unwrap();
        let session = SessionState::new(client.base_url());
        Self {
            client,
            config,
            session,
            recorder: ResultRecorder::new(Echo::Silent),
        }
    }

    pub async fn run(&mut self, case: &dyn TestCase) -> bool {
        let mut ctx = CaseContext {
            client: &self.client,
            config: &self.config,
            session: &mut self.session,
            recorder: &mut self.recorder,
        };
        case.run(&mut ctx)
            .await
            .expect("case returned an unexpected fault")
    }

    /// Register a professional so dependent cases have their state
    pub async fn register(&mut self) {
        assert!(self.run(&ProfessionalRegistration).await, "registration failed");
    }

    pub fn results(&self) -> &[TestResult] {
        self.recorder.results()
    }

    pub fn last(&self) -> &TestResult {
        self.results().last().expect("no results recorded")
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/slow", get(slow))
        .route("/categories", get(categories))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/admin/login", post(admin_login))
        .route("/auth/me", get(me))
        .route("/professionals", get(list_professionals))
        .route(
            "/professionals/:id",
            get(get_professional).put(update_professional),
        )
        .route("/professionals/:id/contact", post(contact))
        .route("/search", get(search))
        .route("/reviews", post(submit_review))
        .route("/reviews/:id", get(professional_reviews))
        .route("/admin/pending", get(admin_pending))
        .route("/admin/approve/:id", put(admin_approve))
        .route("/admin/reject/:id", put(admin_reject))
        .route("/admin/professionals", get(admin_professionals))
        .route("/admin/stats", get(admin_stats))
        .route("/admin/reviews/pending", get(admin_pending_reviews))
        .route("/admin/reviews/:id/approve", put(admin_approve_review))
        .layer(middleware::from_fn_with_state(state.clone(), count_hits))
        .with_state(state)
}

async fn count_hits(State(state): State<Shared>, req: Request, next: Next) -> Response {
    state.lock().unwrap().hits += 1;
    next.run(req).await
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn missing_fields(body: &Value, fields: &[&str]) -> bool {
    fields.iter().any(|f| match body.get(*f) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    })
}

async fn root(State(state): State<Shared>) -> Response {
    if state.lock().unwrap().behavior.html_root {
        return (StatusCode::OK, "<html><body>maintenance</body></html>").into_response();
    }
    Json(json!({
        "message": "ExpertBridge API",
        "categories": CATEGORIES,
    }))
    .into_response()
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({}))
}

async fn categories(State(state): State<Shared>) -> Json<Value> {
    let state = state.lock().unwrap();
    let categories: Vec<Value> = CATEGORIES
        .iter()
        .map(|name| {
            let count = state
                .professionals
                .iter()
                .filter(|p| p.approved() && p.category == *name)
                .count();
            json!({ "name": name, "count": count })
        })
        .collect();
    Json(json!({ "categories": categories }))
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    if state.behavior.reject_registration {
        return error(StatusCode::BAD_REQUEST, "Registration closed");
    }
    if missing_fields(&body, &["fullName", "email", "password", "category"]) {
        return error(StatusCode::BAD_REQUEST, "Missing required fields");
    }

    let email = body["email"].as_str().unwrap_or_default().to_lowercase();
    if state.professionals.iter().any(|p| p.email == email) {
        return error(StatusCode::BAD_REQUEST, "Email already registered");
    }

    let professional = StubProfessional {
        id: format!("pro-{}", state.professionals.len() + 1),
        email,
        password: body["password"].as_str().unwrap_or_default().to_string(),
        full_name: body["fullName"].as_str().unwrap_or_default().to_string(),
        category: body["category"].as_str().unwrap_or_default().to_string(),
        country: body["location"]["country"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        phone: body["phone"].as_str().unwrap_or_default().to_string(),
        bio: body["bio"].as_str().unwrap_or_default().to_string(),
        status: "pending",
        profile_views: 0,
        contact_clicks: 0,
    };
    let id = professional.id.clone();
    let payload = professional.to_json();
    state.professionals.push(professional);
    let token = state.issue_token(&id);

    if state.behavior.null_credentials {
        return Json(json!({ "token": null, "professional": { "id": null } })).into_response();
    }
    Json(json!({
        "message": "Registration successful. Your profile is pending approval.",
        "token": token,
        "professional": payload,
    }))
    .into_response()
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    if missing_fields(&body, &["email", "password"]) {
        return error(StatusCode::BAD_REQUEST, "Email and password required");
    }

    let email = body["email"].as_str().unwrap_or_default().to_lowercase();
    let password = body["password"].as_str().unwrap_or_default();
    let found = state
        .professionals
        .iter()
        .find(|p| p.email == email && p.password == password)
        .map(|p| (p.id.clone(), p.to_json()));

    match found {
        Some(_) if state.behavior.null_credentials => {
            Json(json!({ "token": null, "professional": { "id": null } })).into_response()
        }
        Some((id, professional)) => {
            let token = state.issue_token(&id);
            Json(json!({ "token": token, "professional": professional })).into_response()
        }
        None => error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn admin_login(Json(body): Json<Value>) -> Response {
    if body["email"] == ADMIN_EMAIL && body["password"] == ADMIN_PASSWORD {
        Json(json!({
            "token": ADMIN_TOKEN,
            "admin": { "id": "admin-1", "email": ADMIN_EMAIL, "fullName": "Platform Admin" }
        }))
        .into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    let Some(token) = bearer(&headers) else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    if token == ADMIN_TOKEN {
        return Json(json!({ "user": { "id": "admin-1" }, "role": "admin" })).into_response();
    }

    let Some(id) = state.tokens.get(&token).cloned() else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    match state.find(&id) {
        Some(p) => Json(json!({ "user": p.to_json(), "role": "professional" })).into_response(),
        None => error(StatusCode::NOT_FOUND, "User not found"),
    }
}

fn page_of(items: Vec<Value>, query: &HashMap<String, String>) -> (Vec<Value>, Value) {
    let limit = query
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(12)
        .max(1);
    let total = items.len();
    let page: Vec<Value> = items.into_iter().take(limit).collect();
    let pagination = json!({
        "page": 1,
        "limit": limit,
        "total": total,
        "pages": total.div_ceil(limit),
    });
    (page, pagination)
}

async fn list_professionals(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let state = state.lock().unwrap();
    let approved: Vec<Value> = state
        .professionals
        .iter()
        .filter(|p| p.approved())
        .map(StubProfessional::to_json)
        .collect();
    let (professionals, pagination) = page_of(approved, &query);
    Json(json!({ "professionals": professionals, "pagination": pagination }))
}

async fn get_professional(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    let frozen = state.behavior.freeze_views;
    match state.find(&id) {
        Some(p) => {
            let snapshot = p.to_json();
            if !frozen {
                p.profile_views += 1;
            }
            Json(json!({ "professional": snapshot, "reviews": [] })).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Professional not found"),
    }
}

async fn contact(State(state): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    if let Some(p) = state.find(&id) {
        p.contact_clicks += 1;
    }
    Json(json!({ "message": "Contact click tracked" }))
}

async fn search(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let state = state.lock().unwrap();
    let category = query.get("category");
    let country = query.get("country").map(|c| c.to_lowercase());

    let matches: Vec<Value> = state
        .professionals
        .iter()
        .filter(|p| p.approved())
        .filter(|p| category.map_or(true, |c| &p.category == c))
        .filter(|p| {
            country
                .as_ref()
                .map_or(true, |c| p.country.to_lowercase().contains(c.as_str()))
        })
        .map(StubProfessional::to_json)
        .collect();
    let (professionals, pagination) = page_of(matches, &query);

    Json(json!({
        "professionals": professionals,
        "filters": { "category": category, "country": query.get("country") },
        "pagination": pagination,
    }))
}

async fn submit_review(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    if missing_fields(
        &body,
        &["professionalId", "clientName", "clientEmail", "rating", "comment"],
    ) {
        return error(StatusCode::BAD_REQUEST, "Missing required fields");
    }
    let professional_id = body["professionalId"].as_str().unwrap_or_default().to_string();
    if state.find(&professional_id).is_none() {
        return error(StatusCode::NOT_FOUND, "Professional not found");
    }

    let review = json!({
        "id": format!("review-{}", state.reviews.len() + 1),
        "professionalId": professional_id,
        "clientName": body["clientName"],
        "rating": body["rating"],
        "comment": body["comment"],
        "status": "pending",
    });
    state.reviews.push(review.clone());
    Json(json!({ "message": "Review submitted for approval", "review": review })).into_response()
}

async fn professional_reviews(State(state): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    let state = state.lock().unwrap();
    let reviews: Vec<Value> = state
        .reviews
        .iter()
        .filter(|r| r["professionalId"] == id.as_str() && r["status"] == "approved")
        .cloned()
        .collect();
    Json(json!({ "reviews": reviews }))
}

async fn admin_pending(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if !state.is_admin(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let pending: Vec<Value> = state
        .professionals
        .iter()
        .filter(|p| p.status == "pending")
        .map(StubProfessional::to_json)
        .collect();
    Json(json!({ "pending": pending })).into_response()
}

async fn admin_approve(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    if !state.is_admin(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    match state.find(&id) {
        Some(p) => {
            p.status = "approved";
            Json(json!({ "message": "Professional approved" })).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Professional not found"),
    }
}

async fn admin_stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if !state.is_admin(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let total = state.professionals.len();
    let count = |status: &str| {
        state
            .professionals
            .iter()
            .filter(|p| p.status == status)
            .count()
    };
    let pending_reviews = state
        .reviews
        .iter()
        .filter(|r| r["status"] == "pending")
        .count();
    let breakdown: Vec<Value> = CATEGORIES
        .iter()
        .map(|name| {
            let count = state
                .professionals
                .iter()
                .filter(|p| p.category == *name)
                .count();
            json!({ "_id": name, "count": count })
        })
        .filter(|entry| entry["count"] != 0)
        .collect();

    Json(json!({
        "stats": {
            "totalProfessionals": total,
            "pendingApprovals": count("pending"),
            "approvedProfessionals": count("approved"),
            "rejectedProfessionals": count("rejected"),
            "totalReviews": state.reviews.len(),
            "pendingReviews": pending_reviews,
        },
        "categoryBreakdown": breakdown,
    }))
    .into_response()
}

async fn admin_pending_reviews(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if !state.is_admin(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let reviews: Vec<Value> = state
        .reviews
        .iter()
        .filter(|r| r["status"] == "pending")
        .cloned()
        .collect();
    Json(json!({ "reviews": reviews })).into_response()
}

async fn update_professional(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    let Some(caller) = state.professional_for(&headers) else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    if caller != id {
        return error(StatusCode::FORBIDDEN, "Forbidden");
    }

    match state.find(&id) {
        Some(p) => {
            if let Some(phone) = body["phone"].as_str().filter(|v| !v.is_empty()) {
                p.phone = phone.to_string();
            }
            if let Some(bio) = body["bio"].as_str().filter(|v| !v.is_empty()) {
                p.bio = bio.to_string();
            }
            Json(json!({ "message": "Profile updated", "professional": p.to_json() }))
                .into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Professional not found"),
    }
}

async fn admin_reject(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    if !state.is_admin(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    if let Some(p) = state.find(&id) {
        p.status = "rejected";
    }
    Json(json!({ "message": "Professional rejected" })).into_response()
}

async fn admin_professionals(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let state = state.lock().unwrap();
    if !state.is_admin(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let status = query.get("status");
    let all: Vec<Value> = state
        .professionals
        .iter()
        .filter(|p| status.map_or(true, |s| p.status == s.as_str()))
        .map(StubProfessional::to_json)
        .collect();
    let (professionals, pagination) = page_of(all, &query);
    Json(json!({ "professionals": professionals, "pagination": pagination })).into_response()
}

async fn admin_approve_review(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    if !state.is_admin(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    match state.reviews.iter_mut().find(|r| r["id"] == id.as_str()) {
        Some(review) => {
            review["status"] = json!("approved");
            Json(json!({ "message": "Review approved" })).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Review not found"),
    }
}

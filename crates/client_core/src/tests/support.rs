//! In-process story service used by the client tests.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Form, Router,
};
use async_trait::async_trait;
use shared::{
    domain::{StoryId, UserId},
    error::ErrorBody,
    protocol::{LoginResponse, LoginResult, MessageResponse, StoryListResponse, StoryRecord},
};
use tokio::{
    net::TcpListener,
    sync::{Mutex, Notify},
};

use crate::{api::StoryApi, error::ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Register,
    Login,
    ListStories,
    CreateStory,
}

#[derive(Debug, Clone, Default)]
pub struct RecordedUpload {
    pub authorization: Option<String>,
    pub photo_filename: Option<String>,
    pub photo_content_type: Option<String>,
    pub photo: Vec<u8>,
    pub description: Option<String>,
    pub extra_fields: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordedList {
    pub authorization: Option<String>,
    pub query: HashMap<String, String>,
}

#[derive(Default)]
struct MockState {
    responses: HashMap<Route, (StatusCode, String)>,
    hits: HashMap<Route, usize>,
    register_forms: Vec<HashMap<String, String>>,
    login_forms: Vec<HashMap<String, String>>,
    list_requests: Vec<RecordedList>,
    uploads: Vec<RecordedUpload>,
}

#[derive(Clone)]
pub struct MockStoryServer {
    pub base_url: String,
    state: Arc<Mutex<MockState>>,
}

type Reply = (StatusCode, [(header::HeaderName, &'static str); 1], String);

impl MockStoryServer {
    pub async fn spawn() -> Self {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let state = Arc::new(Mutex::new(MockState::default()));
        let app = Router::new()
            .route("/v1/register", post(handle_register))
            .route("/v1/login", post(handle_login))
            .route("/v1/stories", post(handle_create_story).get(handle_list_stories))
            .with_state(Arc::clone(&state));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            base_url: format!("http://{addr}/v1"),
            state,
        }
    }

    pub async fn respond(&self, route: Route, status: StatusCode, body: impl Into<String>) {
        self.state
            .lock()
            .await
            .responses
            .insert(route, (status, body.into()));
    }

    pub async fn hits(&self, route: Route) -> usize {
        self.state
            .lock()
            .await
            .hits
            .get(&route)
            .copied()
            .unwrap_or_default()
    }

    pub async fn total_hits(&self) -> usize {
        self.state.lock().await.hits.values().sum()
    }

    pub async fn register_forms(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().await.register_forms.clone()
    }

    pub async fn login_forms(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().await.login_forms.clone()
    }

    pub async fn list_requests(&self) -> Vec<RecordedList> {
        self.state.lock().await.list_requests.clone()
    }

    pub async fn uploads(&self) -> Vec<RecordedUpload> {
        self.state.lock().await.uploads.clone()
    }
}

async fn reply(state: &Mutex<MockState>, route: Route) -> Reply {
    let mut guard = state.lock().await;
    *guard.hits.entry(route).or_default() += 1;
    let (status, body) = guard
        .responses
        .get(&route)
        .cloned()
        .unwrap_or((StatusCode::OK, r#"{"error":false,"message":"success"}"#.to_string()));
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn handle_register(
    State(state): State<Arc<Mutex<MockState>>>,
    Form(form): Form<HashMap<String, String>>,
) -> Reply {
    state.lock().await.register_forms.push(form);
    reply(&state, Route::Register).await
}

async fn handle_login(
    State(state): State<Arc<Mutex<MockState>>>,
    Form(form): Form<HashMap<String, String>>,
) -> Reply {
    state.lock().await.login_forms.push(form);
    reply(&state, Route::Login).await
}

async fn handle_list_stories(
    State(state): State<Arc<Mutex<MockState>>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    state.lock().await.list_requests.push(RecordedList {
        authorization: authorization(&headers),
        query,
    });
    reply(&state, Route::ListStories).await
}

async fn handle_create_story(
    State(state): State<Arc<Mutex<MockState>>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Reply {
    let mut upload = RecordedUpload {
        authorization: authorization(&headers),
        ..RecordedUpload::default()
    };
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                upload.photo_filename = field.file_name().map(str::to_string);
                upload.photo_content_type = field.content_type().map(str::to_string);
                upload.photo = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            }
            "description" => {
                upload.description = field.text().await.ok();
            }
            _ => upload.extra_fields.push(name),
        }
    }
    state.lock().await.uploads.push(upload);
    reply(&state, Route::CreateStory).await
}

pub fn error_json(message: &str) -> String {
    serde_json::to_string(&ErrorBody::new(message)).expect("error body")
}

pub fn story_json(id: &str, name: &str) -> String {
    format!(
        r#"{{"id":"{id}","name":"{name}","description":"caption of {id}","photoUrl":"https://story.test/{id}.jpg","createdAt":"2022-01-08T06:34:18.598Z","lat":-6.2,"lon":106.8}}"#
    )
}

pub fn story_list_json(stories: &[(&str, &str)]) -> String {
    let items: Vec<String> = stories
        .iter()
        .map(|(id, name)| story_json(id, name))
        .collect();
    format!(
        r#"{{"error":false,"message":"Stories fetched successfully","listStory":[{}]}}"#,
        items.join(",")
    )
}

/// A small PNG that the JPEG compressor can decode.
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png)
        .expect("encode png");
    bytes.into_inner()
}

/// `StoryApi` that holds every call until the test releases it.
#[derive(Default)]
pub struct GatedApi {
    pub entered: Notify,
    pub release: Notify,
}

impl GatedApi {
    async fn gate(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

fn ok_message() -> MessageResponse {
    MessageResponse {
        error: false,
        message: "ok".to_string(),
    }
}

#[async_trait]
impl StoryApi for GatedApi {
    async fn register(
        &self,
        _name: &str,
        _email: &str,
        _password: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.gate().await;
        Ok(ok_message())
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse, ApiError> {
        self.gate().await;
        Ok(LoginResponse {
            error: false,
            message: "ok".to_string(),
            login_result: Some(LoginResult {
                user_id: UserId::from("user-42"),
                name: "Alice".to_string(),
                token: "jwt-token".to_string(),
            }),
        })
    }

    async fn list_stories(
        &self,
        _token: &str,
        _page_size: u32,
    ) -> Result<StoryListResponse, ApiError> {
        self.gate().await;
        Ok(StoryListResponse {
            error: false,
            message: "ok".to_string(),
            list_story: Some(vec![StoryRecord {
                id: StoryId::from("story-1"),
                name: "Alice".to_string(),
                description: "sunset".to_string(),
                photo_url: "https://story.test/story-1.jpg".to_string(),
                created_at: "2022-01-08T06:34:18.598Z".to_string(),
                lat: None,
                lon: None,
            }]),
        })
    }

    async fn create_story(
        &self,
        _token: &str,
        _image_bytes: Vec<u8>,
        _filename: &str,
        _caption: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.gate().await;
        Ok(ok_message())
    }
}

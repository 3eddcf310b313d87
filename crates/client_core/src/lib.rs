//! Client core for the story service: session persistence, the typed REST
//! client, and the controllers that expose observable request state.

pub mod api;
pub mod auth;
pub mod compress;
pub mod error;
pub mod observable;
pub mod reconcile;
pub mod session;
pub mod settings;
pub mod state;
pub mod stories;
pub mod upload;

pub use api::{HttpStoryApi, StoryApi};
pub use auth::AuthController;
pub use compress::{ImageCompressor, JpegCompressor};
pub use error::{ApiError, ValidationError};
pub use observable::{ConsumeOnce, Observable, Subscription};
pub use reconcile::{diff, ListOp, StoryFeed};
pub use session::{MemoryPreferences, SessionStore};
pub use settings::{load_settings, ClientSettings};
pub use state::RequestState;
pub use stories::{StoryListController, STORY_PAGE_SIZE};
pub use upload::{SelectedImage, StoryUploadController};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

use std::sync::Arc;

use shared::domain::{Story, StoryId};
use tracing::{debug, info, warn};

use crate::{
    api::StoryApi,
    observable::{Observable, Subscription},
    state::{RequestState, RequestTracker},
};

pub const STORY_PAGE_SIZE: u32 = 20;

/// Fetches the story feed and holds the last non-empty result.
pub struct StoryListController {
    api: Arc<dyn StoryApi>,
    state: RequestTracker,
    stories: Observable<Vec<Story>>,
}

impl StoryListController {
    pub fn new(api: Arc<dyn StoryApi>) -> Self {
        Self {
            api,
            state: RequestTracker::default(),
            stories: Observable::default(),
        }
    }

    pub fn state(&self) -> RequestState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> Subscription<RequestState> {
        self.state.subscribe()
    }

    pub fn stories(&self) -> Vec<Story> {
        self.stories.get()
    }

    pub fn subscribe_stories(&self) -> Subscription<Vec<Story>> {
        self.stories.subscribe()
    }

    pub fn find_story(&self, id: &StoryId) -> Option<Story> {
        self.stories.get().into_iter().find(|story| &story.id == id)
    }

    /// Refreshes the feed. An empty token skips the call entirely; an empty
    /// or missing list in the response keeps the stories already held.
    pub async fn get_all_stories(&self, token: &str) {
        if token.is_empty() {
            warn!("stories: no auth token, skipping fetch");
            return;
        }

        self.state.begin();
        match self.api.list_stories(token, STORY_PAGE_SIZE).await {
            Ok(response) => {
                let records = response.list_story.unwrap_or_default();
                debug!(count = records.len(), "stories: fetched");
                if records.is_empty() {
                    info!("stories: empty page, keeping previous list");
                } else {
                    self.stories
                        .set(records.into_iter().map(Story::from).collect());
                }
                self.state.succeed(response.message);
            }
            Err(err) => {
                warn!(error = %err, "stories: fetch failed");
                self.state.fail(err.user_message());
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/stories_tests.rs"]
mod tests;

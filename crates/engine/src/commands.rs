//! Command structs for engine operations.
//!
//! These types group parameters for write operations (post and offer
//! creation/editing), keeping call sites readable and avoiding long argument
//! lists.

use crate::{Consideration, NewItem, PostStatus};

/// Create a post with its items.
#[derive(Clone, Debug)]
pub struct CreatePostCmd {
    pub author_id: i32,
    pub title: String,
    pub description: String,
    pub category_id: i32,
    pub items: Vec<NewItem>,
}

impl CreatePostCmd {
    #[must_use]
    pub fn new(author_id: i32, title: impl Into<String>, category_id: i32) -> Self {
        Self {
            author_id,
            title: title.into(),
            description: String::new(),
            category_id,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn items(mut self, items: Vec<NewItem>) -> Self {
        self.items = items;
        self
    }
}

/// Update a post's owner-editable fields.
///
/// `None` fields are left unchanged. `status` accepts only `open`/`closed`;
/// settlement states belong to the engine.
#[derive(Clone, Debug)]
pub struct UpdatePostCmd {
    pub post_id: i32,
    pub acting_user_id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<PostStatus>,
}

impl UpdatePostCmd {
    #[must_use]
    pub fn new(post_id: i32, acting_user_id: i32) -> Self {
        Self {
            post_id,
            acting_user_id,
            title: None,
            description: None,
            status: None,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Create an offer against a post.
#[derive(Clone, Debug)]
pub struct CreateOfferCmd {
    pub post_id: i32,
    pub author_id: i32,
    pub message: String,
    pub consideration: Consideration,
}

impl CreateOfferCmd {
    #[must_use]
    pub fn new(post_id: i32, author_id: i32) -> Self {
        Self {
            post_id,
            author_id,
            message: String::new(),
            consideration: Consideration::Items(Vec::new()),
        }
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn items(mut self, items: Vec<NewItem>) -> Self {
        self.consideration = Consideration::Items(items);
        self
    }

    #[must_use]
    pub fn child_post(mut self, child_post_id: i32) -> Self {
        self.consideration = Consideration::ChildPost(child_post_id);
        self
    }
}

/// Update a pending offer (author only).
///
/// `consideration: Some(..)` replaces the whole traded side: items are
/// replaced wholesale, a child-post link re-validated; `Items(vec![])` clears
/// both.
#[derive(Clone, Debug)]
pub struct UpdateOfferCmd {
    pub offer_id: i32,
    pub acting_user_id: i32,
    pub message: Option<String>,
    pub consideration: Option<Consideration>,
}

impl UpdateOfferCmd {
    #[must_use]
    pub fn new(offer_id: i32, acting_user_id: i32) -> Self {
        Self {
            offer_id,
            acting_user_id,
            message: None,
            consideration: None,
        }
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn items(mut self, items: Vec<NewItem>) -> Self {
        self.consideration = Some(Consideration::Items(items));
        self
    }

    #[must_use]
    pub fn child_post(mut self, child_post_id: i32) -> Self {
        self.consideration = Some(Consideration::ChildPost(child_post_id));
        self
    }
}

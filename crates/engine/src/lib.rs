pub use commands::{CreateOfferCmd, CreatePostCmd, UpdateOfferCmd, UpdatePostCmd};
pub use error::EngineError;
pub use items::{Item, NewItem};
pub use offers::{Consideration, Offer, OfferStatus, PostRef, UserRef};
pub use ops::{
    CategorySummary, Engine, EngineBuilder, OfferListFilter, OfferPage, OfferStatusCount,
    PostDetail, PostListFilter, PostPage, PostSummary,
};
pub use posts::{Post, PostStatus};
pub use trades::{Trade, TradeStatus};

mod categories;
mod commands;
mod error;
mod items;
mod offers;
mod ops;
mod posts;
mod trades;
mod users;

type ResultEngine<T> = Result<T, EngineError>;

mod list;
mod write;

pub use list::{OfferListFilter, OfferPage};

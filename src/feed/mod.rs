mod fetcher;

pub use fetcher::{decode_body, FeedClient, FeedSource};

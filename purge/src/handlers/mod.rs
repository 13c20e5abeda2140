pub mod cache_delete_keys;

pub use cache_delete_keys::CacheDeleteKeysHandler;

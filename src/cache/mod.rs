pub mod redis;

pub use redis::RedisCache;

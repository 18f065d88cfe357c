//! Production session store backends.

pub mod session_redis;

pub use session_redis::RedisSessionStore;

use missive_core::cache::CacheError;

/// Maps a Redis error onto the cache tier's error type.
///
/// A reply of the wrong type means the key holds something other than a
/// snapshot, which is reported as a serialization failure.
pub fn map_redis_error(err: redis::RedisError) -> CacheError {
    if err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped() {
        CacheError::ConnectionFailed(err.to_string())
    } else if err.kind() == redis::ErrorKind::TypeError {
        CacheError::Serialization(err.to_string())
    } else {
        CacheError::OperationFailed(err.to_string())
    }
}

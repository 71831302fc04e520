/// Chunk size for file payload (one bounded read per chunk)
pub const CHUNK_SIZE: usize = 1024;

/// Upper bound for any control block (head frame or token)
pub const MAX_BLOCK_SIZE: usize = 1024;

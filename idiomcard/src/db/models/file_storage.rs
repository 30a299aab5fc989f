use crate::types::StorageKey;

/// Request to store an uploaded image
#[derive(Debug, Clone)]
pub struct FileStorageRequest {
    pub key: StorageKey,
    pub content: Vec<u8>,
    /// Content type as claimed by the client. Never checked against the bytes.
    pub content_type: Option<String>,
}

/// Response from storing an uploaded image
#[derive(Debug, Clone)]
pub struct FileStorageResponse {
    /// Key to hand to the scan stage
    pub storage_key: StorageKey,
    pub size_bytes: usize,
}

//! Error types for the feature store.

use crate::types::{FeatureId, GeometryKind, Version};
use thiserror::Error;

/// Main error type for event application and replay.
///
/// Every rejected event maps to exactly one variant. A rejected event never
/// leaves a partially applied state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Unknown feature: {0}")]
    UnknownFeature(FeatureId),

    #[error("Feature already deleted: {0}")]
    AlreadyDeleted(FeatureId),

    #[error("Version conflict on feature {id}: expected {expected}, got {got}")]
    VersionConflict {
        id: FeatureId,
        expected: Version,
        got: Version,
    },

    #[error("Geometry type mismatch: {expected} and {got}")]
    GeometryTypeMismatch {
        expected: GeometryKind,
        got: GeometryKind,
    },

    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),

    #[error("Malformed patch: {0}")]
    MalformedPatch(String),

    #[error("Duplicate property key: {0}")]
    DuplicatePropertyKey(String),

    #[error("Missing property key: {0}")]
    MissingPropertyKey(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Coarse classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownFeature,
    AlreadyDeleted,
    VersionConflict,
    GeometryTypeMismatch,
    MalformedGeometry,
    MalformedPatch,
    DuplicatePropertyKey,
    MissingPropertyKey,
    Codec,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::UnknownFeature(_) => ErrorKind::UnknownFeature,
            StoreError::AlreadyDeleted(_) => ErrorKind::AlreadyDeleted,
            StoreError::VersionConflict { .. } => ErrorKind::VersionConflict,
            StoreError::GeometryTypeMismatch { .. } => ErrorKind::GeometryTypeMismatch,
            StoreError::MalformedGeometry(_) => ErrorKind::MalformedGeometry,
            StoreError::MalformedPatch(_) => ErrorKind::MalformedPatch,
            StoreError::DuplicatePropertyKey(_) => ErrorKind::DuplicatePropertyKey,
            StoreError::MissingPropertyKey(_) => ErrorKind::MissingPropertyKey,
            StoreError::Serialization(_) | StoreError::Deserialization(_) => ErrorKind::Codec,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() || e.is_syntax() || e.is_eof() {
            StoreError::Deserialization(e.to_string())
        } else {
            StoreError::Serialization(e.to_string())
        }
    }
}

impl From<rmp_serde::encode::Error> for StoreError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for StoreError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        StoreError::Deserialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

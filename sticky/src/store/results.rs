use crate::collection::ObjectId;

/// Outcome of an `update_one` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// Documents matched by the filter, 0 or 1.
    pub matched_count: u64,
    /// Documents whose content changed.
    pub modified_count: u64,
    /// Identifier of the inserted document when the update created one.
    pub upserted_id: Option<ObjectId>,
}

impl UpdateResult {
    pub fn matched(modified: bool) -> Self {
        UpdateResult {
            matched_count: 1,
            modified_count: modified as u64,
            upserted_id: None,
        }
    }

    pub fn upserted(id: ObjectId) -> Self {
        UpdateResult {
            matched_count: 0,
            modified_count: 0,
            upserted_id: Some(id),
        }
    }
}

/// Outcome of a delete call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        DeleteResult { deleted_count }
    }
}

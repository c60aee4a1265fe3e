use uuid::Uuid;

/// Returns a fresh random UUID.
pub fn new_uuid() -> Uuid {
    Uuid::new_v4()
}

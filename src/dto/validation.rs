//! Validation helpers for inbound frames.

use validator::ValidationError;

/// Longest display name accepted on create/join.
const MAX_NAME_LEN: usize = 24;
/// Longest chat message relayed to a room.
const MAX_CHAT_LEN: usize = 500;
/// Length of room ids as handed out by the registry.
const ROOM_ID_LEN: usize = 4;

/// Validates a player display name: non-blank, at most 24 characters.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("display_name_blank");
        err.message = Some("Display name must not be blank".into());
        return Err(err);
    }

    if name.chars().count() > MAX_NAME_LEN {
        let mut err = ValidationError::new("display_name_length");
        err.message =
            Some(format!("Display name must be at most {MAX_NAME_LEN} characters").into());
        return Err(err);
    }

    Ok(())
}

/// Validates the shape of a room id: exactly 4 alphanumeric characters.
///
/// Case is not checked here; the join path uppercases before lookup.
pub fn validate_room_id(id: &str) -> Result<(), ValidationError> {
    if id.len() != ROOM_ID_LEN || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut err = ValidationError::new("room_id_format");
        err.message =
            Some(format!("Room id must be exactly {ROOM_ID_LEN} letters or digits").into());
        return Err(err);
    }

    Ok(())
}

/// Validates a chat message: non-blank, at most 500 characters.
pub fn validate_chat_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut err = ValidationError::new("chat_blank");
        err.message = Some("Chat message must not be blank".into());
        return Err(err);
    }

    if text.chars().count() > MAX_CHAT_LEN {
        let mut err = ValidationError::new("chat_length");
        err.message =
            Some(format!("Chat message must be at most {MAX_CHAT_LEN} characters").into());
        return Err(err);
    }

    Ok(())
}

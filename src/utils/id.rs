use uuid::Uuid;

use stations_core::AppError;

/// Parses a path id, rejecting anything that is not a UUID with a 400.
pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::bad_request("ID is not in its proper UUID format"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_uuids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn rejects_other_strings() {
        let err = parse_id("123").unwrap_err();
        assert_eq!(err.to_string(), "ID is not in its proper UUID format");
    }
}

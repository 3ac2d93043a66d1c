//! Conversion between overlay payloads and [`DisplayMessage`].
//!
//! Two payload shapes travel on the room: the node's own structured JSON
//! ([`WirePayload`]) and plain text from terminals or older nodes. Anything
//! that does not decode as the former is treated as the latter.

use chrono::{Local, Utc};

use crate::common::{ChatError, DisplayMessage, UserType, WirePayload};

/// Packages text and role as a structured payload stamped with the origin time.
pub fn to_wire(text: &str, user_type: UserType) -> Result<Vec<u8>, ChatError> {
    if text.is_empty() {
        return Err(ChatError::EmptyContent);
    }
    let payload = WirePayload {
        content: text.to_string(),
        user_type: user_type.as_str().to_string(),
        timestamp: Utc::now().timestamp(),
    };
    Ok(serde_json::to_vec(&payload)?)
}

/// Decodes an inbound payload. Structured payloads get a role-derived sender
/// label; everything else keeps `fallback_sender` and an `unknown` role.
pub fn from_wire(data: &[u8], fallback_sender: &str) -> Result<DisplayMessage, ChatError> {
    let (content, sender, user_type) = match serde_json::from_slice::<WirePayload>(data) {
        Ok(payload) => {
            let user_type = UserType::from_role(&payload.user_type);
            (payload.content, user_type.sender_label().to_string(), user_type)
        }
        Err(err) => {
            log::trace!("Not a structured payload ({err}); treating as plain text");
            (
                String::from_utf8_lossy(data).into_owned(),
                fallback_sender.to_string(),
                UserType::Unknown,
            )
        }
    };

    if content.is_empty() {
        return Err(ChatError::EmptyContent);
    }

    Ok(DisplayMessage {
        content,
        sender,
        user_type,
        timestamp: Local::now(),
    })
}

/// What the local UI sees for its own post, before the network is involved.
pub fn local_echo(text: &str, user_type: UserType) -> DisplayMessage {
    DisplayMessage {
        content: text.to_string(),
        sender: user_type.sender_label().to_string(),
        user_type,
        timestamp: Local::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_payload_gets_team_label() {
        let wire = to_wire("Evacuate block C", UserType::Team).unwrap();
        let message = from_wire(&wire, "ignored").unwrap();

        assert_eq!(message.content, "Evacuate block C");
        assert_eq!(message.sender, "NDRF Team");
        assert_eq!(message.user_type, UserType::Team);
    }

    #[test]
    fn civilian_payload_gets_civilian_label() {
        let wire = to_wire("Need water at the school", UserType::Civilian).unwrap();
        let message = from_wire(&wire, "ignored").unwrap();

        assert_eq!(message.sender, "Civilian");
        assert_eq!(message.user_type, UserType::Civilian);
    }

    #[test]
    fn plain_text_keeps_transport_nickname() {
        let message = from_wire(b"hello from the terminal\n", "Alice").unwrap();

        assert_eq!(message.content, "hello from the terminal\n");
        assert_eq!(message.sender, "Alice");
        assert_eq!(message.user_type, UserType::Unknown);
    }

    #[test]
    fn unrecognised_role_is_civilian() {
        let wire = br#"{"content":"ok","userType":"medic","timestamp":1700000000}"#;
        let message = from_wire(wire, "Bob").unwrap();

        assert_eq!(message.sender, "Civilian");
        assert_eq!(message.user_type, UserType::Civilian);
    }

    #[test]
    fn json_without_content_falls_back_to_plain_text() {
        let message = from_wire(br#"{"text":"hi"}"#, "Bob").unwrap();

        assert_eq!(message.content, r#"{"text":"hi"}"#);
        assert_eq!(message.user_type, UserType::Unknown);
    }

    #[test]
    fn wire_carries_origin_time_and_role_tag() {
        let wire = to_wire("status?", UserType::Team).unwrap();
        let payload: WirePayload = serde_json::from_slice(&wire).unwrap();

        assert_eq!(payload.user_type, "team");
        assert!(payload.timestamp > 0);
    }

    #[test]
    fn empty_content_is_rejected() {
        assert!(matches!(to_wire("", UserType::Team), Err(ChatError::EmptyContent)));
        assert!(matches!(from_wire(b"", "Alice"), Err(ChatError::EmptyContent)));
        assert!(matches!(
            from_wire(br#"{"content":"","userType":"team"}"#, "Alice"),
            Err(ChatError::EmptyContent)
        ));
    }

    #[test]
    fn invalid_utf8_is_downgraded_not_dropped() {
        let message = from_wire(&[0x66, 0x6f, 0xff, 0x6f], "Carol").unwrap();
        assert_eq!(message.sender, "Carol");
        assert!(message.content.starts_with("fo"));
    }
}

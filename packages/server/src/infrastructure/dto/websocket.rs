//! WebSocket frame DTOs.
//!
//! Every frame is a JSON text message of the form
//! `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};

use crate::domain::{ClientEvent, MalformedMessage, ServerEvent};

/// Frames sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerFrame {
    /// Distinct user keys currently connected
    #[serde(rename = "clients-updated")]
    ClientsUpdated(Vec<String>),
    #[serde(rename = "message-from-server")]
    MessageFromServer(MessageFromServerPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageFromServerPayload {
    pub display_name: String,
    pub message: String,
}

/// Frames sent by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientFrame {
    #[serde(rename = "message-from-client")]
    MessageFromClient(MessageFromClientPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFromClientPayload {
    pub message: String,
}

impl ServerFrame {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&ServerEvent> for ServerFrame {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::PresenceUpdated(snapshot) => ServerFrame::ClientsUpdated(
                snapshot
                    .user_ids()
                    .into_iter()
                    .map(|id| id.as_str().to_string())
                    .collect(),
            ),
            ServerEvent::Message(message) => {
                ServerFrame::MessageFromServer(MessageFromServerPayload {
                    display_name: message.display_name.clone(),
                    message: message.content.as_str().to_string(),
                })
            }
        }
    }
}

impl ClientFrame {
    /// Decode a text frame into a client event.
    ///
    /// Only the shape is checked here; the message body is validated by the
    /// gateway.
    pub fn decode(text: &str) -> Result<ClientEvent, MalformedMessage> {
        let frame: ClientFrame = serde_json::from_str(text)
            .map_err(|e| MalformedMessage::Undecodable(e.to_string()))?;
        Ok(frame.into())
    }
}

impl From<ClientFrame> for ClientEvent {
    fn from(frame: ClientFrame) -> Self {
        match frame {
            ClientFrame::MessageFromClient(payload) => ClientEvent::MessageFromClient {
                message: payload.message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatMessage, Identity, MessageContent, PresenceSnapshot, UserId};

    #[test]
    fn test_presence_event_encodes_as_clients_updated() {
        // given:
        let snapshot = PresenceSnapshot::new(
            7,
            vec![
                Identity::new(UserId::new("alice".to_string()).unwrap()),
                Identity::new(UserId::new("bob".to_string()).unwrap()),
            ],
        );

        // when:
        let json = ServerFrame::from(&ServerEvent::PresenceUpdated(snapshot))
            .encode()
            .unwrap();

        // then: the internal version never reaches the wire
        assert_eq!(json, r#"{"event":"clients-updated","data":["alice","bob"]}"#);
    }

    #[test]
    fn test_chat_event_encodes_as_message_from_server() {
        // given:
        let event = ServerEvent::Message(ChatMessage {
            display_name: "alice".to_string(),
            content: MessageContent::new("hi".to_string()).unwrap(),
        });

        // when:
        let json = ServerFrame::from(&event).encode().unwrap();

        // then:
        assert_eq!(
            json,
            r#"{"event":"message-from-server","data":{"displayName":"alice","message":"hi"}}"#
        );
    }

    #[test]
    fn test_decode_message_from_client() {
        // when:
        let event = ClientFrame::decode(r#"{"event":"message-from-client","data":{"message":"hi"}}"#);

        // then:
        assert_eq!(
            event,
            Ok(ClientEvent::MessageFromClient {
                message: "hi".to_string()
            })
        );
    }

    #[test]
    fn test_decode_rejects_malformed_frames() {
        let cases = [
            "hi",
            "{}",
            r#"{"event":"message-from-client"}"#,
            r#"{"event":"message-from-client","data":{}}"#,
            r#"{"event":"message-from-client","data":{"message":42}}"#,
            r#"{"event":"clients-updated","data":["alice"]}"#,
        ];

        for case in cases {
            assert!(
                matches!(ClientFrame::decode(case), Err(MalformedMessage::Undecodable(_))),
                "expected '{}' to be rejected",
                case
            );
        }
    }
}

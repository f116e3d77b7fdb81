//! Client for the room bootstrap endpoint.
//!
//! The endpoint is a stateless collaborator: given a room name it returns a
//! freshly generated 6-digit numeric password, independent of any existing
//! room state. The relay never sees this call.

use serde::{Deserialize, Serialize};

use crate::client::error::ClientError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRoomRequest<'a> {
    room_name: &'a str,
}

/// Credentials returned by the bootstrap endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCredentials {
    pub room_name: String,
    pub password: String,
}

/// Request generated credentials for a new room.
pub async fn generate_room_credentials(
    endpoint: &str,
    room_name: &str,
) -> Result<RoomCredentials, ClientError> {
    let client = reqwest::Client::new();
    let response = client
        .post(endpoint)
        .json(&GenerateRoomRequest { room_name })
        .send()
        .await?
        .error_for_status()?;

    Ok(response.json().await?)
}

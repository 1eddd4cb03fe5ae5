//! Profile API client

use base64::Engine;
use reqwest::Method;
use std::path::Path;

use super::User;
use crate::transport::{ApiClient, TransportError, TransportResult};

const USERS_PATH: &str = "/api/users";

const AVATAR_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Guess an avatar mime type from a file extension
pub fn avatar_mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Profile of the signed-in user
#[derive(Debug, Clone)]
pub struct ProfileClient {
    client: ApiClient,
}

impl ProfileClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn view(&self) -> TransportResult<User> {
        let request = self.client.request(Method::GET, USERS_PATH);
        self.client.send_json(request).await
    }

    pub async fn update(&self, user: &User) -> TransportResult<()> {
        let request = self.client.request(Method::PATCH, USERS_PATH).json(user);
        self.client.send(request).await?;
        tracing::info!("profile updated");
        Ok(())
    }

    /// Delete the account
    pub async fn remove(&self) -> TransportResult<()> {
        let request = self.client.request(Method::DELETE, USERS_PATH);
        self.client.send(request).await?;
        tracing::info!("account removed");
        Ok(())
    }

    /// Replace the avatar with inline image data
    ///
    /// The image is stored as a `data:` URL and the reference to any
    /// previously uploaded file is dropped.
    pub async fn upload_avatar(&self, bytes: &[u8], mime: &str) -> TransportResult<User> {
        if bytes.is_empty() {
            return Err(TransportError::InvalidInput("avatar image is empty".to_string()));
        }
        if !AVATAR_MIME_TYPES.contains(&mime) {
            return Err(TransportError::InvalidInput(format!(
                "unsupported avatar type: {}",
                mime
            )));
        }

        let mut user = self.view().await?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        user.avatar = Some(format!("data:{};base64,{}", mime, encoded));
        user.avatar_id = None;

        self.update(&user).await?;
        Ok(user)
    }
}

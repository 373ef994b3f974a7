use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo_types::PublicUser;
use crate::links::Link;
use crate::meetings::repo_types::Meeting;

#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    pub meeting_id: Uuid,
    pub user_id: Uuid,
}

/// Body of both a fresh registration and an already-registered conflict.
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub message: &'static str,
    pub meeting: Meeting,
    pub user: PublicUser,
    pub unregister: Link,
}

#[derive(Debug, Serialize)]
pub struct UnregisterResponse {
    pub message: &'static str,
    pub meeting: Meeting,
    pub user: PublicUser,
    pub register: Link,
}

#[derive(Debug, Serialize)]
pub struct UnregisterAllResponse {
    pub message: &'static str,
    pub meeting: Meeting,
    pub removed: u64,
    pub register: Link,
}

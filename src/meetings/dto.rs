use serde::{Deserialize, Serialize};

use super::repo_types::Meeting;
use crate::auth::repo_types::PublicUser;
use crate::links::{self, Link};

/// Body of create and update. `time` is `YYYYMMDDhhmmss`.
#[derive(Debug, Default, Deserialize)]
pub struct MeetingRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct MeetingView {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub view_meeting: Link,
}

impl From<Meeting> for MeetingView {
    fn from(meeting: Meeting) -> Self {
        let view_meeting = links::view_meeting(meeting.id);
        Self {
            meeting,
            view_meeting,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeetingDetails {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub users: Vec<PublicUser>,
    pub view_meetings: Link,
}

#[derive(Debug, Serialize)]
pub struct MeetingListResponse {
    pub message: &'static str,
    pub meetings: Vec<MeetingView>,
}

#[derive(Debug, Serialize)]
pub struct MeetingResponse {
    pub message: &'static str,
    pub meeting: MeetingView,
}

#[derive(Debug, Serialize)]
pub struct MeetingDetailsResponse {
    pub message: &'static str,
    pub meeting: MeetingDetails,
}

#[derive(Debug, Serialize)]
pub struct DeletedMeetingResponse {
    pub message: &'static str,
    pub meeting: Meeting,
    pub create_meeting: Link,
}

use serde::Serialize;
use uuid::Uuid;

/// Hypermedia hint pointing at a logically-next call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<&'static str>,
}

impl Link {
    pub fn get(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            method: "GET",
            params: None,
        }
    }

    pub fn post(href: impl Into<String>, params: &'static str) -> Self {
        Self {
            href: href.into(),
            method: "POST",
            params: Some(params),
        }
    }

    pub fn delete(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            method: "DELETE",
            params: None,
        }
    }
}

pub fn sign_in() -> Link {
    Link::post("api/v1/user/signin", "email, password")
}

pub fn view_meeting(id: Uuid) -> Link {
    Link::get(format!("api/v1/meeting/{}", id))
}

pub fn view_meetings() -> Link {
    Link::get("api/v1/meeting")
}

pub fn create_meeting() -> Link {
    Link::post("api/v1/meeting", "title, description, time")
}

pub fn register() -> Link {
    Link::post("api/v1/meeting/registration", "user_id, meeting_id")
}

pub fn unregister(meeting_id: Uuid) -> Link {
    Link::delete(format!("api/v1/meeting/registration/{}", meeting_id))
}

use tracing::info;
use uuid::Uuid;

use crate::{
    auth::{repo_types::PublicUser, services::require_caller},
    error::AppError,
    meetings::{
        repo_types::Meeting,
        services::{find_meeting, require_registration},
    },
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    AlreadyRegistered,
}

#[derive(Debug)]
pub struct Registration {
    pub meeting: Meeting,
    pub user: PublicUser,
    pub outcome: RegistrationOutcome,
}

/// Register `user_id` for `meeting_id`. A second call for the same pair is
/// reported as `AlreadyRegistered` and changes nothing.
pub async fn register(
    st: &AppState,
    meeting_id: Uuid,
    user_id: Uuid,
) -> Result<Registration, AppError> {
    let meeting = find_meeting(st, meeting_id).await?;
    let user = st
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let outcome = if st.meetings.add_registration(meeting.id, user.id).await? {
        info!(meeting_id = %meeting.id, user_id = %user.id, "user registered for meeting");
        RegistrationOutcome::Registered
    } else {
        RegistrationOutcome::AlreadyRegistered
    };

    Ok(Registration {
        meeting,
        user: PublicUser::from(&user),
        outcome,
    })
}

/// Drop the caller's own registration.
pub async fn unregister_self(
    st: &AppState,
    meeting_id: Uuid,
    caller: Uuid,
) -> Result<(Meeting, PublicUser), AppError> {
    let user = require_caller(st, caller).await?;
    let meeting = find_meeting(st, meeting_id).await?;
    require_registration(st, &meeting, &user, "Unregister").await?;

    // Losing a race with another removal is still the state the caller asked for.
    st.meetings.remove_registration(meeting.id, user.id).await?;
    info!(meeting_id = %meeting.id, user_id = %user.id, "user unregistered from meeting");
    Ok((meeting, PublicUser::from(&user)))
}

/// Clear every registration of a meeting. Guarded like any other meeting
/// mutation: the caller must be registered for it.
pub async fn unregister_all(
    st: &AppState,
    meeting_id: Uuid,
    caller: Uuid,
) -> Result<(Meeting, u64), AppError> {
    let user = require_caller(st, caller).await?;
    let meeting = find_meeting(st, meeting_id).await?;
    require_registration(st, &meeting, &user, "Unregister").await?;

    let removed = st.meetings.remove_all_registrations(meeting.id).await?;
    info!(meeting_id = %meeting.id, user_id = %user.id, removed, "meeting registrations cleared");
    Ok((meeting, removed))
}

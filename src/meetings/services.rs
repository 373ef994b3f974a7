use tracing::{info, warn};
use uuid::Uuid;

use super::dto::MeetingRequest;
use super::repo_types::{Meeting, MeetingFields};
use crate::{
    auth::{
        repo_types::{PublicUser, User},
        services::require_caller,
    },
    error::AppError,
    state::AppState,
    validation::Validator,
};

fn validate(input: &MeetingRequest) -> Result<MeetingFields, AppError> {
    let title = input.title.trim();
    let description = input.description.trim();
    let time = input.time.trim();

    let mut v = Validator::new();
    v.required("title", title)
        .required("description", description)
        .required("time", time);
    let parsed = v.meeting_time("time", time);
    let time = v.finish_with(parsed)?;
    Ok(MeetingFields {
        title: title.to_string(),
        description: description.to_string(),
        time,
    })
}

pub(crate) async fn find_meeting(st: &AppState, id: Uuid) -> Result<Meeting, AppError> {
    st.meetings
        .find(id)
        .await?
        .ok_or_else(AppError::meeting_not_found)
}

/// The single capability rule: only users registered for a meeting may change it.
pub(crate) async fn require_registration(
    st: &AppState,
    meeting: &Meeting,
    user: &User,
    action: &str,
) -> Result<(), AppError> {
    if st.meetings.is_registered(meeting.id, user.id).await? {
        return Ok(());
    }
    warn!(meeting_id = %meeting.id, user_id = %user.id, action, "caller not registered");
    Err(AppError::Authorization(format!(
        "User is not registered for the meeting. {} not successful.",
        action
    )))
}

pub async fn list_meetings(st: &AppState) -> Result<Vec<Meeting>, AppError> {
    Ok(st.meetings.list().await?)
}

pub async fn create_meeting(
    st: &AppState,
    caller: Uuid,
    input: &MeetingRequest,
) -> Result<Meeting, AppError> {
    let fields = validate(input)?;
    let user = require_caller(st, caller).await?;

    let meeting = st.meetings.create_with_registration(&fields, user.id).await?;
    info!(meeting_id = %meeting.id, user_id = %user.id, "meeting created");
    Ok(meeting)
}

pub async fn get_meeting(st: &AppState, id: Uuid) -> Result<(Meeting, Vec<PublicUser>), AppError> {
    let meeting = find_meeting(st, id).await?;
    let users = st.meetings.list_registered_users(meeting.id).await?;
    Ok((meeting, users))
}

pub async fn update_meeting(
    st: &AppState,
    id: Uuid,
    caller: Uuid,
    input: &MeetingRequest,
) -> Result<Meeting, AppError> {
    let fields = validate(input)?;
    let user = require_caller(st, caller).await?;
    let meeting = find_meeting(st, id).await?;
    require_registration(st, &meeting, &user, "Update").await?;

    let updated = st
        .meetings
        .update(meeting.id, &fields)
        .await?
        .ok_or_else(AppError::meeting_not_found)?;
    info!(meeting_id = %updated.id, user_id = %user.id, "meeting updated");
    Ok(updated)
}

pub async fn delete_meeting(st: &AppState, id: Uuid, caller: Uuid) -> Result<Meeting, AppError> {
    let user = require_caller(st, caller).await?;
    let meeting = find_meeting(st, id).await?;
    require_registration(st, &meeting, &user, "Delete").await?;

    let deleted = st
        .meetings
        .delete_with_registrations(meeting.id)
        .await?
        .ok_or_else(AppError::meeting_not_found)?;
    info!(meeting_id = %deleted.id, user_id = %user.id, "meeting deleted");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::datetime;

    use super::*;
    use crate::auth::services::register_user;
    use crate::memory::MemoryStore;

    fn standup() -> MeetingRequest {
        MeetingRequest {
            title: "Standup".into(),
            description: "daily".into(),
            time: "20240115090000".into(),
        }
    }

    async fn user(st: &AppState, name: &str) -> User {
        let email = format!("{}@x.com", name.to_lowercase());
        register_user(st, name, &email, "secret").await.expect("register user")
    }

    #[tokio::test]
    async fn creator_holds_exactly_one_registration() {
        let store = Arc::new(MemoryStore::default());
        let st = AppState::fake_with(store.clone());
        let alice = user(&st, "Alice").await;

        let meeting = create_meeting(&st, alice.id, &standup()).await.unwrap();
        assert_eq!(meeting.title, "Standup");
        assert_eq!(meeting.time, datetime!(2024-01-15 09:00:00 UTC));
        assert_eq!(store.registration_count(meeting.id, alice.id), 1);

        let (_, users) = get_meeting(&st, meeting.id).await.unwrap();
        assert_eq!(users, vec![PublicUser::from(&alice)]);
    }

    #[tokio::test]
    async fn create_rejects_unknown_caller_and_bad_time() {
        let store = Arc::new(MemoryStore::default());
        let st = AppState::fake_with(store.clone());

        let err = create_meeting(&st, Uuid::new_v4(), &standup()).await.unwrap_err();
        assert!(matches!(&err, AppError::Auth(m) if m == "User not found"));

        let alice = user(&st, "Alice").await;
        let mut bad = standup();
        bad.time = "2024-01-15 09:00".into();
        let err = create_meeting(&st, alice.id, &bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.meeting_count(), 0);
    }

    #[tokio::test]
    async fn get_unknown_meeting_is_not_found() {
        let st = AppState::fake();
        let err = get_meeting(&st, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn unregistered_user_cannot_update_or_delete() {
        let st = AppState::fake();
        let alice = user(&st, "Alice").await;
        let bob = user(&st, "Bob").await;
        let meeting = create_meeting(&st, alice.id, &standup()).await.unwrap();

        let mut change = standup();
        change.title = "Hijacked".into();
        let err = update_meeting(&st, meeting.id, bob.id, &change).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));

        let err = delete_meeting(&st, meeting.id, bob.id).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));

        let (unchanged, _) = get_meeting(&st, meeting.id).await.unwrap();
        assert_eq!(unchanged, meeting);
    }

    #[tokio::test]
    async fn update_distinguishes_missing_meeting_from_permission() {
        let st = AppState::fake();
        let alice = user(&st, "Alice").await;
        let err = update_meeting(&st, Uuid::new_v4(), alice.id, &standup())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn registered_user_updates_meeting() {
        let st = AppState::fake();
        let alice = user(&st, "Alice").await;
        let meeting = create_meeting(&st, alice.id, &standup()).await.unwrap();

        let change = MeetingRequest {
            title: "Retro".into(),
            description: "weekly".into(),
            time: "20240119160000".into(),
        };
        let updated = update_meeting(&st, meeting.id, alice.id, &change).await.unwrap();
        assert_eq!(updated.id, meeting.id);
        assert_eq!(updated.title, "Retro");
        assert_eq!(updated.time, datetime!(2024-01-19 16:00:00 UTC));
    }

    #[tokio::test]
    async fn delete_removes_every_registration() {
        let store = Arc::new(MemoryStore::default());
        let st = AppState::fake_with(store.clone());
        let alice = user(&st, "Alice").await;
        let bob = user(&st, "Bob").await;
        let meeting = create_meeting(&st, alice.id, &standup()).await.unwrap();
        st.meetings.add_registration(meeting.id, bob.id).await.unwrap();

        let deleted = delete_meeting(&st, meeting.id, bob.id).await.unwrap();
        assert_eq!(deleted.id, meeting.id);
        assert_eq!(store.registrations_for(meeting.id), 0);
        assert!(matches!(
            get_meeting(&st, meeting.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn failed_delete_leaves_meeting_and_attendees_intact() {
        let store = Arc::new(MemoryStore::default());
        let st = AppState::fake_with(store.clone());
        let alice = user(&st, "Alice").await;
        let bob = user(&st, "Bob").await;
        let meeting = create_meeting(&st, alice.id, &standup()).await.unwrap();
        st.meetings.add_registration(meeting.id, bob.id).await.unwrap();

        store.fail_writes(true);
        let err = delete_meeting(&st, meeting.id, alice.id).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
        store.fail_writes(false);

        let (still_there, users) = get_meeting(&st, meeting.id).await.unwrap();
        assert_eq!(still_there.id, meeting.id);
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn failed_create_leaves_no_meeting_behind() {
        let store = Arc::new(MemoryStore::default());
        let st = AppState::fake_with(store.clone());
        let alice = user(&st, "Alice").await;

        store.fail_writes(true);
        let err = create_meeting(&st, alice.id, &standup()).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
        store.fail_writes(false);

        assert_eq!(store.meeting_count(), 0);
        assert!(list_meetings(&st).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_orders_by_time() {
        let st = AppState::fake();
        let alice = user(&st, "Alice").await;
        let later = MeetingRequest {
            time: "20240301100000".into(),
            ..standup()
        };
        create_meeting(&st, alice.id, &later).await.unwrap();
        create_meeting(&st, alice.id, &standup()).await.unwrap();

        let meetings = list_meetings(&st).await.unwrap();
        assert_eq!(meetings.len(), 2);
        assert!(meetings[0].time < meetings[1].time);
    }
}

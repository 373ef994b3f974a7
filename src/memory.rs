//! In-process store used by tests in place of PostgreSQL.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard,
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::{
    jwt::{TokenError, TokenService},
    repo::UserStore,
    repo_types::{PublicUser, User},
};
use crate::meetings::{
    repo::MeetingStore,
    repo_types::{Meeting, MeetingFields},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    meetings: Vec<Meeting>,
    registrations: Vec<(Uuid, Uuid)>, // (meeting_id, user_id), insertion order
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }

    fn check_writable(&self) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("simulated write failure");
        }
        Ok(())
    }

    /// Make every meeting write fail until switched off again. Two-step
    /// writes fail after their first step and undo it.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn user_count(&self) -> usize {
        self.tables().users.len()
    }

    pub fn meeting_count(&self) -> usize {
        self.tables().meetings.len()
    }

    pub fn registration_count(&self, meeting_id: Uuid, user_id: Uuid) -> usize {
        self.tables()
            .registrations
            .iter()
            .filter(|r| **r == (meeting_id, user_id))
            .count()
    }

    pub fn registrations_for(&self, meeting_id: Uuid) -> usize {
        self.tables()
            .registrations
            .iter()
            .filter(|(m, _)| *m == meeting_id)
            .count()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let mut t = self.tables();
        if t.users.iter().any(|u| u.email == email) {
            return Ok(None);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        t.users.push(user.clone());
        Ok(Some(user))
    }
}

#[async_trait]
impl MeetingStore for MemoryStore {
    async fn list(&self) -> anyhow::Result<Vec<Meeting>> {
        let mut rows = self.tables().meetings.clone();
        rows.sort_by_key(|m| (m.time, m.created_at));
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Meeting>> {
        Ok(self.tables().meetings.iter().find(|m| m.id == id).cloned())
    }

    async fn create_with_registration(
        &self,
        fields: &MeetingFields,
        creator: Uuid,
    ) -> anyhow::Result<Meeting> {
        let mut t = self.tables();
        let now = OffsetDateTime::now_utc();
        let meeting = Meeting {
            id: Uuid::new_v4(),
            title: fields.title.clone(),
            description: fields.description.clone(),
            time: fields.time,
            created_at: now,
            updated_at: now,
        };
        t.meetings.push(meeting.clone());
        if let Err(e) = self.check_writable() {
            t.meetings.pop();
            return Err(e);
        }
        t.registrations.push((meeting.id, creator));
        Ok(meeting)
    }

    async fn update(&self, id: Uuid, fields: &MeetingFields) -> anyhow::Result<Option<Meeting>> {
        self.check_writable()?;
        let mut t = self.tables();
        let Some(m) = t.meetings.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        m.title = fields.title.clone();
        m.description = fields.description.clone();
        m.time = fields.time;
        m.updated_at = OffsetDateTime::now_utc();
        Ok(Some(m.clone()))
    }

    async fn delete_with_registrations(&self, id: Uuid) -> anyhow::Result<Option<Meeting>> {
        let mut t = self.tables();
        let Some(pos) = t.meetings.iter().position(|m| m.id == id) else {
            return Ok(None);
        };
        let saved = t.registrations.clone();
        t.registrations.retain(|(m, _)| *m != id);
        if let Err(e) = self.check_writable() {
            t.registrations = saved;
            return Err(e);
        }
        Ok(Some(t.meetings.remove(pos)))
    }

    async fn is_registered(&self, meeting_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        Ok(self.registration_count(meeting_id, user_id) > 0)
    }

    async fn add_registration(&self, meeting_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        self.check_writable()?;
        let mut t = self.tables();
        if t.registrations.contains(&(meeting_id, user_id)) {
            return Ok(false);
        }
        t.registrations.push((meeting_id, user_id));
        Ok(true)
    }

    async fn remove_registration(&self, meeting_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        self.check_writable()?;
        let mut t = self.tables();
        let before = t.registrations.len();
        t.registrations.retain(|r| *r != (meeting_id, user_id));
        Ok(t.registrations.len() != before)
    }

    async fn remove_all_registrations(&self, meeting_id: Uuid) -> anyhow::Result<u64> {
        self.check_writable()?;
        let mut t = self.tables();
        let before = t.registrations.len();
        t.registrations.retain(|(m, _)| *m != meeting_id);
        Ok((before - t.registrations.len()) as u64)
    }

    async fn list_registered_users(&self, meeting_id: Uuid) -> anyhow::Result<Vec<PublicUser>> {
        let t = self.tables();
        let users = t
            .registrations
            .iter()
            .filter(|(m, _)| *m == meeting_id)
            .filter_map(|(_, u)| t.users.iter().find(|user| user.id == *u))
            .map(PublicUser::from)
            .collect();
        Ok(users)
    }
}

/// Token backend that is never reachable.
pub struct OfflineTokens;

impl TokenService for OfflineTokens {
    fn issue(&self, _user_id: Uuid) -> Result<String, TokenError> {
        Err(TokenError::Unavailable("signing backend offline".into()))
    }

    fn verify(&self, _token: &str) -> Result<Uuid, TokenError> {
        Err(TokenError::Unavailable("signing backend offline".into()))
    }
}

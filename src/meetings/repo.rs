use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{Meeting, MeetingFields};
use crate::auth::repo_types::PublicUser;
use crate::db::PgStore;

const MEETING_COLUMNS: &str = "id, title, description, time, created_at, updated_at";

/// Meetings plus the user↔meeting registration join.
///
/// Methods that touch both tables are atomic: an implementation must never
/// leave a meeting without its creator, or registrations without a meeting.
#[async_trait]
pub trait MeetingStore: Send + Sync {
    /// Ordered by meeting time, then creation.
    async fn list(&self) -> anyhow::Result<Vec<Meeting>>;

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Meeting>>;

    /// Insert the meeting and register its creator in one unit.
    async fn create_with_registration(
        &self,
        fields: &MeetingFields,
        creator: Uuid,
    ) -> anyhow::Result<Meeting>;

    async fn update(&self, id: Uuid, fields: &MeetingFields) -> anyhow::Result<Option<Meeting>>;

    /// Remove every registration of the meeting and the meeting itself in one unit.
    async fn delete_with_registrations(&self, id: Uuid) -> anyhow::Result<Option<Meeting>>;

    async fn is_registered(&self, meeting_id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;

    /// `false` when the pair already existed.
    async fn add_registration(&self, meeting_id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;

    /// `false` when there was no such pair.
    async fn remove_registration(&self, meeting_id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;

    async fn remove_all_registrations(&self, meeting_id: Uuid) -> anyhow::Result<u64>;

    async fn list_registered_users(&self, meeting_id: Uuid) -> anyhow::Result<Vec<PublicUser>>;
}

#[async_trait]
impl MeetingStore for PgStore {
    async fn list(&self) -> anyhow::Result<Vec<Meeting>> {
        let rows = sqlx::query_as::<_, Meeting>(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings ORDER BY time ASC, created_at ASC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list meetings")?;
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Meeting>> {
        let row = sqlx::query_as::<_, Meeting>(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find meeting")?;
        Ok(row)
    }

    async fn create_with_registration(
        &self,
        fields: &MeetingFields,
        creator: Uuid,
    ) -> anyhow::Result<Meeting> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let meeting = sqlx::query_as::<_, Meeting>(&format!(
            r#"
            INSERT INTO meetings (title, description, time)
            VALUES ($1, $2, $3)
            RETURNING {MEETING_COLUMNS}
            "#
        ))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.time)
        .fetch_one(&mut *tx)
        .await
        .context("insert meeting")?;

        sqlx::query("INSERT INTO registrations (meeting_id, user_id) VALUES ($1, $2)")
            .bind(meeting.id)
            .bind(creator)
            .execute(&mut *tx)
            .await
            .context("register creator")?;

        tx.commit().await.context("commit tx")?;
        Ok(meeting)
    }

    async fn update(&self, id: Uuid, fields: &MeetingFields) -> anyhow::Result<Option<Meeting>> {
        let row = sqlx::query_as::<_, Meeting>(&format!(
            r#"
            UPDATE meetings
               SET title = $2, description = $3, time = $4, updated_at = now()
             WHERE id = $1
            RETURNING {MEETING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.time)
        .fetch_optional(&self.db)
        .await
        .context("update meeting")?;
        Ok(row)
    }

    async fn delete_with_registrations(&self, id: Uuid) -> anyhow::Result<Option<Meeting>> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        sqlx::query("DELETE FROM registrations WHERE meeting_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("delete registrations")?;

        let meeting = sqlx::query_as::<_, Meeting>(&format!(
            "DELETE FROM meetings WHERE id = $1 RETURNING {MEETING_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("delete meeting")?;

        match meeting {
            Some(m) => {
                tx.commit().await.context("commit tx")?;
                Ok(Some(m))
            }
            None => {
                tx.rollback().await.context("rollback tx")?;
                Ok(None)
            }
        }
    }

    async fn is_registered(&self, meeting_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let found: Option<(i32,)> = sqlx::query_as(
            "SELECT 1 FROM registrations WHERE meeting_id = $1 AND user_id = $2",
        )
        .bind(meeting_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("check registration")?;
        Ok(found.is_some())
    }

    async fn add_registration(&self, meeting_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO registrations (meeting_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (meeting_id, user_id) DO NOTHING
            "#,
        )
        .bind(meeting_id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .context("insert registration")?;
        Ok(res.rows_affected() == 1)
    }

    async fn remove_registration(&self, meeting_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM registrations WHERE meeting_id = $1 AND user_id = $2")
            .bind(meeting_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete registration")?;
        Ok(res.rows_affected() == 1)
    }

    async fn remove_all_registrations(&self, meeting_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM registrations WHERE meeting_id = $1")
            .bind(meeting_id)
            .execute(&self.db)
            .await
            .context("delete meeting registrations")?;
        Ok(res.rows_affected())
    }

    async fn list_registered_users(&self, meeting_id: Uuid) -> anyhow::Result<Vec<PublicUser>> {
        let rows = sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT u.id, u.name, u.email
              FROM registrations r
              JOIN users u ON u.id = r.user_id
             WHERE r.meeting_id = $1
             ORDER BY r.created_at ASC, u.name ASC
            "#,
        )
        .bind(meeting_id)
        .fetch_all(&self.db)
        .await
        .context("list registered users")?;
        Ok(rows)
    }
}

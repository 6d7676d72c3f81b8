//! In-app notification channel.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, EventKind, ResultEngine, notifications, users};

use super::{Engine, with_tx};

impl Engine {
    /// Persist one in-app notification. Called by the fan-out for every
    /// recipient; always synchronous.
    pub async fn notify(
        &self,
        user_id: i32,
        application_id: i32,
        kind: EventKind,
        title: &str,
        message: &str,
        link: &str,
    ) -> ResultEngine<notifications::Model> {
        with_tx!(self, |db_tx| {
            notifications::ActiveModel {
                user_id: ActiveValue::Set(user_id),
                application_id: ActiveValue::Set(application_id),
                status: ActiveValue::Set(kind.as_str().to_string()),
                title: ActiveValue::Set(title.to_string()),
                message: ActiveValue::Set(message.to_string()),
                link: ActiveValue::Set(link.to_string()),
                is_read: ActiveValue::Set(false),
                created_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .insert(&db_tx)
            .await
            .map_err(Into::into)
        })
    }

    /// Notifications addressed to the actor, newest first.
    pub async fn list_notifications(
        &self,
        actor: &users::Model,
        only_unread: bool,
    ) -> ResultEngine<Vec<notifications::Model>> {
        with_tx!(self, |db_tx| {
            let mut query = notifications::Entity::find()
                .filter(notifications::Column::UserId.eq(actor.id))
                .order_by_desc(notifications::Column::CreatedAt)
                .order_by_desc(notifications::Column::Id);
            if only_unread {
                query = query.filter(notifications::Column::IsRead.eq(false));
            }
            query.all(&db_tx).await.map_err(Into::into)
        })
    }

    /// Mark one of the actor's notifications as read.
    pub async fn mark_notification_read(
        &self,
        actor: &users::Model,
        notification_id: i32,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = notifications::Entity::find_by_id(notification_id)
                .filter(notifications::Column::UserId.eq(actor.id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("notification not exists".to_string())
                })?;

            if !model.is_read {
                let mut active: notifications::ActiveModel = model.into();
                active.is_read = ActiveValue::Set(true);
                active.update(&db_tx).await?;
            }
            Ok(())
        })
    }
}

//! Authorization helpers shared by the ops.
//!
//! Cross-owner reads answer "not found" rather than "forbidden" so the
//! record's existence is not leaked; wrong-role operations answer
//! `Forbidden`.

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};

use crate::{EngineError, Recipient, ResultEngine, Role, applications, users};

use super::Engine;

impl Engine {
    pub(super) fn require_reviewer(&self, actor: &users::Model) -> ResultEngine<Role> {
        let role = actor.role()?;
        if !role.is_reviewer() {
            return Err(EngineError::Forbidden(
                "staff or admin role required".to_string(),
            ));
        }
        Ok(role)
    }

    pub(super) fn require_admin(&self, actor: &users::Model) -> ResultEngine<()> {
        if actor.role()? != Role::Admin {
            return Err(EngineError::Forbidden("admin role required".to_string()));
        }
        Ok(())
    }

    pub(super) fn require_applicant(&self, actor: &users::Model) -> ResultEngine<()> {
        if actor.role()? != Role::Applicant {
            return Err(EngineError::Forbidden(
                "applicant role required".to_string(),
            ));
        }
        Ok(())
    }

    pub(super) async fn find_application(
        &self,
        db: &DatabaseTransaction,
        application_id: i32,
    ) -> ResultEngine<applications::Model> {
        applications::Entity::find_by_id(application_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("application not exists".to_string()))
    }

    /// Fetch an application the actor is allowed to see: its owner, or any
    /// reviewer.
    pub(super) async fn require_application_visible(
        &self,
        db: &DatabaseTransaction,
        actor: &users::Model,
        application_id: i32,
    ) -> ResultEngine<applications::Model> {
        let model = self.find_application(db, application_id).await?;
        if model.user_id == actor.id || actor.role()?.is_reviewer() {
            return Ok(model);
        }
        Err(EngineError::KeyNotFound("application not exists".to_string()))
    }

    /// Fetch an application owned by the actor.
    pub(super) async fn require_application_owned(
        &self,
        db: &DatabaseTransaction,
        actor: &users::Model,
        application_id: i32,
    ) -> ResultEngine<applications::Model> {
        let model = self.find_application(db, application_id).await?;
        if model.user_id != actor.id {
            return Err(EngineError::KeyNotFound(
                "application not exists".to_string(),
            ));
        }
        Ok(model)
    }

    pub(super) async fn applicant_recipient(
        &self,
        db: &DatabaseTransaction,
        user_id: i32,
    ) -> ResultEngine<Recipient> {
        let user = users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        Ok(Recipient {
            user_id: user.id,
            role: user.role()?,
            first_name: user.first_name.clone(),
            email: user.email.clone(),
            contact_number: user.contact_number.clone(),
        })
    }

    /// All staff and admin accounts, for resubmission fan-out.
    pub(super) async fn reviewer_recipients(
        &self,
        db: &DatabaseTransaction,
    ) -> ResultEngine<Vec<Recipient>> {
        let models = users::Entity::find()
            .filter(users::Column::Role.is_in([Role::Staff.as_str(), Role::Admin.as_str()]))
            .all(db)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for user in models {
            out.push(Recipient {
                user_id: user.id,
                role: user.role()?,
                first_name: user.first_name.clone(),
                email: user.email.clone(),
                contact_number: user.contact_number.clone(),
            });
        }
        Ok(out)
    }
}

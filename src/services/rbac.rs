use crate::{
    db::DbPool,
    entities::permission::{self, Entity as PermissionEntity},
    entities::permission_role::{self, Entity as PermissionRoleEntity},
    entities::role::{self, Entity as RoleEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    services::non_blank,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Slugs are lowercase ascii letters, digits, `.`, `_` and `-`.
fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'));
    if !valid {
        let mut err = ValidationError::new("slug");
        err.message = Some("slug may only contain lowercase letters, digits, '.', '_' and '-'".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(length(max = 100), custom = "validate_slug")]
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 100), custom = "validate_slug")]
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePermissionRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(length(max = 100), custom = "validate_slug")]
    pub slug: String,
    #[validate(length(max = 100))]
    pub group_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetRolePermissionsRequest {
    pub permission_ids: Vec<Uuid>,
}

/// Outcome of replacing a role's permission set
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RolePermissionsUpdate {
    pub role_id: Uuid,
    pub added: Vec<Uuid>,
    pub removed: Vec<Uuid>,
    pub permissions: Vec<permission::Model>,
}

#[derive(Clone)]
pub struct RbacService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl RbacService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    async fn ensure_role_slug_free(&self, slug: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
        let mut query = RoleEntity::find().filter(role::Column::Slug.eq(slug));
        if let Some(id) = except {
            query = query.filter(role::Column::Id.ne(id));
        }
        if query.count(&*self.db).await? > 0 {
            return Err(ServiceError::Conflict(format!("Role slug '{}' is already taken", slug)));
        }
        Ok(())
    }

    #[instrument(skip(self, request), fields(slug = %request.slug))]
    pub async fn create_role(&self, request: CreateRoleRequest) -> Result<role::Model, ServiceError> {
        request.validate()?;
        self.ensure_role_slug_free(&request.slug, None).await?;

        let now = Utc::now();
        let role = role::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            slug: Set(request.slug),
            description: Set(non_blank(request.description)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(role_id = %role.id, slug = %role.slug, "Role created");
        Ok(role)
    }

    pub async fn list_roles(&self) -> Result<Vec<role::Model>, ServiceError> {
        Ok(RoleEntity::find()
            .order_by_asc(role::Column::Name)
            .all(&*self.db)
            .await?)
    }

    pub async fn get_role(&self, id: Uuid) -> Result<role::Model, ServiceError> {
        RoleEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Role", id))
    }

    #[instrument(skip(self, request))]
    pub async fn update_role(&self, id: Uuid, request: UpdateRoleRequest) -> Result<role::Model, ServiceError> {
        request.validate()?;
        let existing = self.get_role(id).await?;
        if let Some(slug) = &request.slug {
            self.ensure_role_slug_free(slug, Some(id)).await?;
        }

        let mut active: role::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(slug) = request.slug {
            active.slug = Set(slug);
        }
        if request.description.is_some() {
            active.description = Set(non_blank(request.description));
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db).await?)
    }

    /// Deletes the role and its permission links.
    pub async fn delete_role(&self, id: Uuid) -> Result<(), ServiceError> {
        self.get_role(id).await?;
        let txn = self.db.begin().await?;
        PermissionRoleEntity::delete_many()
            .filter(permission_role::Column::RoleId.eq(id))
            .exec(&txn)
            .await?;
        RoleEntity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        info!(role_id = %id, "Role deleted");
        Ok(())
    }

    #[instrument(skip(self, request), fields(slug = %request.slug))]
    pub async fn create_permission(
        &self,
        request: CreatePermissionRequest,
    ) -> Result<permission::Model, ServiceError> {
        request.validate()?;
        let taken = PermissionEntity::find()
            .filter(permission::Column::Slug.eq(request.slug.as_str()))
            .count(&*self.db)
            .await?;
        if taken > 0 {
            return Err(ServiceError::Conflict(format!(
                "Permission slug '{}' is already taken",
                request.slug
            )));
        }

        let permission = permission::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            slug: Set(request.slug),
            group_name: Set(non_blank(request.group_name)),
            description: Set(non_blank(request.description)),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(permission_id = %permission.id, slug = %permission.slug, "Permission created");
        Ok(permission)
    }

    pub async fn list_permissions(&self) -> Result<Vec<permission::Model>, ServiceError> {
        Ok(PermissionEntity::find()
            .order_by_asc(permission::Column::GroupName)
            .order_by_asc(permission::Column::Slug)
            .all(&*self.db)
            .await?)
    }

    pub async fn delete_permission(&self, id: Uuid) -> Result<(), ServiceError> {
        PermissionEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Permission", id))?;

        let txn = self.db.begin().await?;
        PermissionRoleEntity::delete_many()
            .filter(permission_role::Column::PermissionId.eq(id))
            .exec(&txn)
            .await?;
        PermissionEntity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        info!(permission_id = %id, "Permission deleted");
        Ok(())
    }

    async fn permissions_of<C: ConnectionTrait>(
        conn: &C,
        role_id: Uuid,
    ) -> Result<Vec<permission::Model>, ServiceError> {
        Ok(PermissionEntity::find()
            .inner_join(PermissionRoleEntity)
            .filter(permission_role::Column::RoleId.eq(role_id))
            .order_by_asc(permission::Column::Slug)
            .all(conn)
            .await?)
    }

    pub async fn get_role_permissions(&self, role_id: Uuid) -> Result<Vec<permission::Model>, ServiceError> {
        self.get_role(role_id).await?;
        Self::permissions_of(&*self.db, role_id).await
    }

    /// Replaces the role's permission set with `permission_ids`. The diff is
    /// computed against the stored links inside one transaction, so repeating
    /// the same call changes nothing.
    #[instrument(skip(self, request), fields(requested = request.permission_ids.len()))]
    pub async fn set_role_permissions(
        &self,
        role_id: Uuid,
        request: SetRolePermissionsRequest,
    ) -> Result<RolePermissionsUpdate, ServiceError> {
        let wanted: BTreeSet<Uuid> = request.permission_ids.into_iter().collect();

        let txn = self.db.begin().await?;
        RoleEntity::find_by_id(role_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Role", role_id))?;

        if !wanted.is_empty() {
            let known: HashSet<Uuid> = PermissionEntity::find()
                .filter(permission::Column::Id.is_in(wanted.iter().copied()))
                .all(&txn)
                .await?
                .into_iter()
                .map(|p| p.id)
                .collect();
            let unknown: Vec<String> = wanted
                .iter()
                .filter(|id| !known.contains(id))
                .map(Uuid::to_string)
                .collect();
            if !unknown.is_empty() {
                warn!(role_id = %role_id, unknown = ?unknown, "Unknown permission ids");
                return Err(ServiceError::BadRequest(format!(
                    "Unknown permission ids: {}",
                    unknown.join(", ")
                )));
            }
        }

        let current: BTreeSet<Uuid> = PermissionRoleEntity::find()
            .filter(permission_role::Column::RoleId.eq(role_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|link| link.permission_id)
            .collect();

        let added: Vec<Uuid> = wanted.difference(&current).copied().collect();
        let removed: Vec<Uuid> = current.difference(&wanted).copied().collect();

        if !removed.is_empty() {
            PermissionRoleEntity::delete_many()
                .filter(permission_role::Column::RoleId.eq(role_id))
                .filter(permission_role::Column::PermissionId.is_in(removed.clone()))
                .exec(&txn)
                .await?;
        }
        if !added.is_empty() {
            let now = Utc::now();
            let links = added.iter().map(|permission_id| permission_role::ActiveModel {
                role_id: Set(role_id),
                permission_id: Set(*permission_id),
                created_at: Set(now),
            });
            PermissionRoleEntity::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }

        let permissions = Self::permissions_of(&txn, role_id).await?;
        txn.commit().await?;

        info!(role_id = %role_id, added = added.len(), removed = removed.len(), "Role permissions replaced");
        self.event_sender
            .send_or_log(Event::RolePermissionsChanged {
                role_id,
                added: added.len(),
                removed: removed.len(),
            })
            .await;

        Ok(RolePermissionsUpdate {
            role_id,
            added,
            removed,
            permissions,
        })
    }

    pub async fn role_has_permission(&self, role_id: Uuid, slug: &str) -> Result<bool, ServiceError> {
        let count = PermissionEntity::find()
            .inner_join(PermissionRoleEntity)
            .filter(permission_role::Column::RoleId.eq(role_id))
            .filter(permission::Column::Slug.eq(slug))
            .count(&*self.db)
            .await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        assert!(validate_slug("quotes.approve").is_ok());
        assert!(validate_slug("tour-guide_2").is_ok());
        assert!(validate_slug("Quotes").is_err());
        assert!(validate_slug("with space").is_err());
        assert!(validate_slug("").is_err());
    }
}

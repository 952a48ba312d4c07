use async_trait::async_trait;
use chrono::Utc;
use itsm_db::secure::{Scoped, SecureQuery};
use itsm_db::{
    CodeSeries, CodegenConfig, DbConfig, DbResultExt, Page, PageRequest, PagingConfig, RepoError,
    SecureConn, insert_with_code,
};
use itsm_security::{Namespace, ScopeDescriptor};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, IntoActiveModel, Order, Set};
use tracing::{info, instrument};
use uuid::Uuid;

use super::entity::asset;
use super::mapper::try_collect;
use super::{search_term, text_contains};
use crate::domain::asset::ASSET_CODE_PREFIX;
use crate::domain::repos::AssetsRepository;
use crate::domain::{Asset, AssetFilter, AssetPatch, NewAsset, require_text};

use asset::Column as C;

pub struct OrmAssetsRepository {
    db: SecureConn,
    paging: PagingConfig,
    codegen: CodegenConfig,
}

impl OrmAssetsRepository {
    #[must_use]
    pub fn new(db: SecureConn, cfg: &DbConfig) -> Self {
        Self {
            db,
            paging: cfg.paging,
            codegen: cfg.codegen,
        }
    }

    fn query(&self, scope: Option<&ScopeDescriptor>) -> SecureQuery<asset::Entity, Scoped> {
        self.db.find::<asset::Entity>(scope, Namespace::ASSETS)
    }

    fn filtered(
        &self,
        scope: Option<&ScopeDescriptor>,
        filter: &AssetFilter,
    ) -> SecureQuery<asset::Entity, Scoped> {
        self.query(scope)
            .filter(filter_condition(filter))
            .include_deleted(filter.include_deleted)
    }

    async fn visible(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
    ) -> Result<asset::Model, RepoError> {
        self.query(scope)
            .and_id(id)
            .one(self.db.conn())
            .await
            .op("assets.get")?
            .ok_or_else(|| RepoError::not_found("asset", id))
    }
}

fn filter_condition(filter: &AssetFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(asset_type) = search_term(filter.asset_type.as_deref()) {
        cond = cond.add(C::AssetType.eq(asset_type));
    }
    if !filter.statuses.is_empty() {
        cond = cond.add(C::Status.is_in(filter.statuses.iter().map(|s| s.as_str())));
    }
    if let Some(filiale) = filter.filiale_id {
        cond = cond.add(C::FilialeId.eq(filiale));
    }
    if let Some(department) = filter.department_id {
        cond = cond.add(C::DepartmentId.eq(department));
    }
    if let Some(owner) = filter.owner_id {
        cond = cond.add(C::OwnerId.eq(owner));
    }
    if let Some(text) = search_term(filter.search.as_deref()) {
        cond = cond.add(text_contains::<asset::Entity>(C::Name, text));
    }
    cond
}

#[async_trait]
impl AssetsRepository for OrmAssetsRepository {
    #[instrument(skip(self, new), fields(asset_type = %new.asset_type, filiale = new.filiale_id))]
    async fn create(&self, new: NewAsset) -> Result<Asset, RepoError> {
        require_text("name", &new.name)?;
        require_text("asset_type", &new.asset_type)?;

        let now = Utc::now();
        let series = CodeSeries::current(ASSET_CODE_PREFIX)?;
        let model = insert_with_code::<asset::Entity, _, _>(
            self.db.conn(),
            &series,
            self.codegen.max_attempts,
            |code| asset::ActiveModel {
                id: Set(Uuid::new_v4()),
                code: Set(code.to_string()),
                name: Set(new.name.trim().to_owned()),
                asset_type: Set(new.asset_type.trim().to_owned()),
                status: Set(new.status.as_str().to_owned()),
                serial_number: Set(new.serial_number.clone()),
                department_id: Set(new.department_id),
                filiale_id: Set(new.filiale_id),
                owner_id: Set(new.owner_id),
                purchased_at: Set(new.purchased_at),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            },
        )
        .await?;
        info!(code = %model.code, "asset created");
        model.try_into()
    }

    #[instrument(skip(self, scope))]
    async fn get(&self, scope: Option<&ScopeDescriptor>, id: Uuid) -> Result<Asset, RepoError> {
        self.visible(scope, id).await?.try_into()
    }

    #[instrument(skip(self, scope))]
    async fn get_by_code(
        &self,
        scope: Option<&ScopeDescriptor>,
        code: &str,
    ) -> Result<Asset, RepoError> {
        self.query(scope)
            .filter(C::Code.eq(code))
            .one(self.db.conn())
            .await
            .op("assets.get_by_code")?
            .ok_or_else(|| RepoError::not_found("asset", code))?
            .try_into()
    }

    #[instrument(skip(self, scope, filter, page), fields(page = page.page, page_size = page.page_size))]
    async fn list(
        &self,
        scope: Option<&ScopeDescriptor>,
        filter: &AssetFilter,
        page: PageRequest,
    ) -> Result<Page<Asset>, RepoError> {
        let window = page.window(&self.paging)?;
        let (rows, total) = self
            .filtered(scope, filter)
            .order_by(C::CreatedAt, Order::Desc)
            .page(self.db.conn(), window)
            .await
            .op("assets.list")?;
        Ok(Page::new(try_collect(rows)?, total, window))
    }

    #[instrument(skip(self, scope, filter))]
    async fn count(
        &self,
        scope: Option<&ScopeDescriptor>,
        filter: &AssetFilter,
    ) -> Result<u64, RepoError> {
        self.filtered(scope, filter)
            .count(self.db.conn())
            .await
            .op("assets.count")
    }

    #[instrument(skip(self, scope, patch))]
    async fn update(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
        patch: AssetPatch,
    ) -> Result<Asset, RepoError> {
        let current = self.visible(scope, id).await?;
        if patch == AssetPatch::default() {
            return current.try_into();
        }
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }
        if let Some(asset_type) = &patch.asset_type {
            require_text("asset_type", asset_type)?;
        }

        let mut am = current.into_active_model();
        if let Some(name) = patch.name {
            am.name = Set(name.trim().to_owned());
        }
        if let Some(asset_type) = patch.asset_type {
            am.asset_type = Set(asset_type.trim().to_owned());
        }
        if let Some(status) = patch.status {
            am.status = Set(status.as_str().to_owned());
        }
        if let Some(serial) = patch.serial_number {
            am.serial_number = Set(serial);
        }
        if let Some(department) = patch.department_id {
            am.department_id = Set(department);
        }
        if let Some(filiale) = patch.filiale_id {
            am.filiale_id = Set(filiale);
        }
        if let Some(purchased) = patch.purchased_at {
            am.purchased_at = Set(purchased);
        }
        am.updated_at = Set(Utc::now());
        am.update(self.db.conn()).await.op("assets.update")?.try_into()
    }

    #[instrument(skip(self, scope))]
    async fn assign_owner(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
        owner: Option<Uuid>,
    ) -> Result<Asset, RepoError> {
        let mut am = self.visible(scope, id).await?.into_active_model();
        am.owner_id = Set(owner);
        am.updated_at = Set(Utc::now());
        am.update(self.db.conn())
            .await
            .op("assets.assign_owner")?
            .try_into()
    }

    #[instrument(skip(self, scope))]
    async fn soft_delete(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
    ) -> Result<(), RepoError> {
        let affected = self
            .query(scope)
            .and_id(id)
            .soft_delete(self.db.conn(), Utc::now())
            .await
            .op("assets.soft_delete")?;
        if affected == 0 {
            return Err(RepoError::not_found("asset", id));
        }
        Ok(())
    }
}

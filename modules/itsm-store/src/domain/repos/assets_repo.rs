use async_trait::async_trait;
use itsm_db::{Page, PageRequest, RepoError};
use itsm_security::ScopeDescriptor;
use uuid::Uuid;

use crate::domain::{Asset, AssetFilter, AssetPatch, NewAsset};

#[async_trait]
pub trait AssetsRepository: Send + Sync {
    async fn create(&self, new: NewAsset) -> Result<Asset, RepoError>;

    async fn get(&self, scope: Option<&ScopeDescriptor>, id: Uuid) -> Result<Asset, RepoError>;

    async fn get_by_code(
        &self,
        scope: Option<&ScopeDescriptor>,
        code: &str,
    ) -> Result<Asset, RepoError>;

    async fn list(
        &self,
        scope: Option<&ScopeDescriptor>,
        filter: &AssetFilter,
        page: PageRequest,
    ) -> Result<Page<Asset>, RepoError>;

    async fn count(
        &self,
        scope: Option<&ScopeDescriptor>,
        filter: &AssetFilter,
    ) -> Result<u64, RepoError>;

    async fn update(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
        patch: AssetPatch,
    ) -> Result<Asset, RepoError>;

    async fn assign_owner(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
        owner: Option<Uuid>,
    ) -> Result<Asset, RepoError>;

    async fn soft_delete(&self, scope: Option<&ScopeDescriptor>, id: Uuid)
    -> Result<(), RepoError>;
}

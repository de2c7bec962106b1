use std::sync::Arc;

use domain::{Category, CategoryId, CategoryRepository, RepositoryError};
use tracing::info;
use uuid::Uuid;

use crate::{clock::Clock, error::ApplicationError};

pub struct CategoryServiceDependencies {
    pub category_repository: Arc<dyn CategoryRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct CategoryService {
    deps: CategoryServiceDependencies,
}

impl CategoryService {
    pub fn new(deps: CategoryServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn list(&self) -> Result<Vec<Category>, ApplicationError> {
        Ok(self.deps.category_repository.list().await?)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Category, ApplicationError> {
        let name = Category::validate_name(name.to_owned())?;
        self.deps
            .category_repository
            .find_by_name(name)
            .await?
            .ok_or(ApplicationError::NotFound("category"))
    }

    /// 接受分类 id 或分类名
    pub async fn resolve(&self, id_or_name: &str) -> Result<Category, ApplicationError> {
        if let Ok(uuid) = Uuid::parse_str(id_or_name.trim()) {
            return self
                .deps
                .category_repository
                .find_by_id(CategoryId::from(uuid))
                .await?
                .ok_or(ApplicationError::NotFound("category"));
        }
        self.find_by_name(id_or_name).await
    }

    /// 创建缺失的分类，已存在的跳过；返回新建数量
    pub async fn seed_defaults(&self, names: &[String]) -> Result<usize, ApplicationError> {
        let mut created = 0;
        for name in names {
            let name = Category::validate_name(name.clone())?;
            if self
                .deps
                .category_repository
                .find_by_name(name.clone())
                .await?
                .is_some()
            {
                continue;
            }

            let category = Category::new(CategoryId::generate(), name, self.deps.clock.now())?;
            match self.deps.category_repository.create(category).await {
                Ok(category) => {
                    info!(category_id = %category.id, name = %category.name, "category seeded");
                    created += 1;
                }
                // 另一个实例抢先创建
                Err(RepositoryError::Conflict) => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(created)
    }
}

//! 基础设施层实现。
//!
//! PostgreSQL 仓储、SQL 迁移与 bcrypt 密码哈希，实现应用/领域层定义的接口。

pub mod builder;
pub mod migrations;
pub mod password;
pub mod repository;

pub use builder::{Infrastructure, InfrastructureConfig, InfrastructureError};
pub use migrations::MIGRATOR;
pub use password::BcryptPasswordHasher;
pub use repository::{
    create_pg_pool, PgCategoryRepository, PgCommentRepository, PgPostRepository,
    PgReactionRepository, PgSessionRepository, PgStorage, PgUserRepository,
};

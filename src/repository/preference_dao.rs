// ==========================================
// 偏好设置子系统 - 偏好数据访问接口
// ==========================================
// 分两层: PreferenceDao (只读) ← PreferenceWriter (读写)
// 约束: 所有方法必须在调用方已开启的事务内调用 (强制传播)，
//       接口本身不开启/提交/回滚事务
// ==========================================

use crate::domain::preference::{AnyPreference, Preference};
use crate::repository::error::RepositoryResult;

// ==========================================
// PreferenceDao - 只读访问
// ==========================================
pub trait PreferenceDao {
    /// 按主键查询
    ///
    /// # 返回
    /// - Ok(Some(AnyPreference)): 找到偏好
    /// - Ok(None): 未找到
    fn find_by_key(&self, id: i64) -> RepositoryResult<Option<AnyPreference>>;

    /// 查询某一类型的全部偏好
    ///
    /// # 错误
    /// - `RepositoryError::TypeMismatch`: T 不是已知偏好类型
    fn find_by_type<T: Preference>(&self) -> RepositoryResult<Vec<T>>;

    /// 查询某一类型下属于 owner 的偏好，无结果时返回空列表
    fn find_by_type_and_owner<T: Preference>(&self, owner: &str) -> RepositoryResult<Vec<T>>;

    /// 查询全部偏好，无结果时返回空列表
    fn find_all(&self) -> RepositoryResult<Vec<AnyPreference>>;
}

// ==========================================
// PreferenceWriter - 写访问
// ==========================================
pub trait PreferenceWriter: PreferenceDao {
    /// 保存实体并返回存储中的最新状态
    ///
    /// 新实体先插入再合并；已持久化实体只做合并。
    /// 版本过期时返回 `RepositoryError::OptimisticLockFailure`。
    fn save<T: Preference>(&self, entity: T) -> RepositoryResult<T>;

    /// 强制插入新实体，回填 id 与 version
    ///
    /// # 错误
    /// - `RepositoryError::EntityExists`: 实体已有 id
    fn persist<T: Preference>(&self, entity: &mut T) -> RepositoryResult<()>;

    /// 删除已持久化实体；不在当前持久化上下文中的实体先合并再删除
    fn remove<T: Preference>(&self, entity: &T) -> RepositoryResult<()>;
}

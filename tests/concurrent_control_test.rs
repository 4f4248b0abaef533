// ==========================================
// 并发控制测试
// ==========================================
// 职责: 验证基于 C_VERSION 的乐观锁 (两个连接模拟两个请求)
// ==========================================

mod test_helpers;

use openwms_preferences::domain::{Preference, UserPreference};
use openwms_preferences::repository::{PreferenceDao, PreferenceWriter, RepositoryError};
use test_helpers::{create_test_db, in_tx, open_conn};

// ==========================================
// 测试1: 乐观锁冲突测试
// ==========================================

#[test]
fn test_optimistic_lock_conflict() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let mut conn_a = open_conn(&db_path);
    let mut conn_b = open_conn(&db_path);

    let saved = in_tx(&mut conn_a, |dao| {
        let mut pref = UserPreference::new("bob", "pageSize")?;
        pref.set_value(Some("20".to_string()));
        dao.save(pref)
    })
    .unwrap();

    // 两个请求各自持有 version=0 的副本
    let mut copy_a = saved.clone();
    let mut copy_b = saved;

    copy_a.set_value(Some("50".to_string()));
    let updated = in_tx(&mut conn_a, |dao| dao.save(copy_a)).unwrap();
    assert_eq!(updated.version(), 1);

    copy_b.set_value(Some("100".to_string()));
    let err = in_tx(&mut conn_b, |dao| dao.save(copy_b)).unwrap_err();
    match err {
        RepositoryError::OptimisticLockFailure {
            expected, actual, ..
        } => {
            assert_eq!(expected, 0);
            assert_eq!(actual, 1);
        }
        other => panic!("unexpected error: {other}"),
    }

    // 失败的写入不影响先提交者
    let stored = in_tx(&mut conn_b, |dao| {
        dao.find_by_type_and_owner::<UserPreference>("bob")
    })
    .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].value(), Some("50"));
    assert_eq!(stored[0].version(), 1);
}

// ==========================================
// 测试2: 版本单调递增
// ==========================================

#[test]
fn test_version_increments_per_effective_update() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let mut conn = open_conn(&db_path);

    let mut current = in_tx(&mut conn, |dao| dao.save(UserPreference::new("alice", "zoom")?))
        .unwrap();
    let id = current.id();

    for (i, zoom) in [1.0_f32, 1.25, 1.5].into_iter().enumerate() {
        current.set_float_value(Some(zoom));
        current = in_tx(&mut conn, |dao| dao.save(current)).unwrap();
        assert_eq!(current.version(), i as i64 + 1);
        assert_eq!(current.id(), id);
    }

    // 未修改的保存不增加版本
    current = in_tx(&mut conn, |dao| dao.save(current)).unwrap();
    assert_eq!(current.version(), 3);
}

// ==========================================
// 测试3: 过期的游离实体不能被删除
// ==========================================

#[test]
fn test_stale_detached_remove_is_rejected() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let mut conn_a = open_conn(&db_path);
    let mut conn_b = open_conn(&db_path);

    let saved = in_tx(&mut conn_a, |dao| dao.save(UserPreference::new("carol", "theme")?))
        .unwrap();
    let id = saved.id().unwrap();

    let mut newer = saved.clone();
    newer.set_value(Some("light".to_string()));
    in_tx(&mut conn_a, |dao| dao.save(newer)).unwrap();

    let err = in_tx(&mut conn_b, |dao| dao.remove(&saved)).unwrap_err();
    assert!(matches!(err, RepositoryError::OptimisticLockFailure { .. }));

    let still_there = in_tx(&mut conn_b, |dao| dao.find_by_key(id)).unwrap();
    assert!(still_there.is_some());
}

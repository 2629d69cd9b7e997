use crate::service::session::{Session, SessionError, SessionManager};
use std::collections::HashSet;
use std::time::{Duration, Instant};

#[test]
fn login_hands_out_a_working_key() {
    let sessions = SessionManager::new();
    let key = sessions.login(1234);
    assert!(!key.is_empty());
    assert_eq!(sessions.validate(&key), Ok(1234));
}

#[test]
fn unknown_keys_are_invalid() {
    let sessions = SessionManager::new();
    assert_eq!(
        sessions.validate("no-such-key"),
        Err(SessionError::InvalidSession)
    );
    assert_eq!(sessions.validate(""), Err(SessionError::InvalidSession));
    assert_eq!(sessions.validate("   "), Err(SessionError::InvalidSession));
}

#[test]
fn relogin_replaces_the_previous_session() {
    let sessions = SessionManager::new();
    let first = sessions.login(42);
    let second = sessions.login(42);

    assert_ne!(first, second);
    assert_eq!(sessions.validate(&first), Err(SessionError::InvalidSession));
    assert_eq!(sessions.validate(&second), Ok(42));
    assert_eq!(sessions.session_count(), 1);
    assert_eq!(sessions.user_count(), 1);
}

#[test]
fn repeated_logins_keep_a_single_session() {
    let sessions = SessionManager::new();
    let mut last = String::new();
    for _ in 0..10 {
        last = sessions.login(1234);
    }
    assert_eq!(sessions.validate(&last), Ok(1234));
    assert_eq!(sessions.session_count(), 1);
    assert_eq!(sessions.user_count(), 1);
}

#[test]
fn users_get_independent_sessions() {
    let sessions = SessionManager::new();
    let key1 = sessions.login(1001);
    let key2 = sessions.login(1002);
    let key3 = sessions.login(1003);

    assert_ne!(key1, key2);
    assert_eq!(sessions.validate(&key1), Ok(1001));
    assert_eq!(sessions.validate(&key2), Ok(1002));
    assert_eq!(sessions.validate(&key3), Ok(1003));
}

#[test]
fn expired_sessions_fail_validation() {
    let sessions = SessionManager::new();
    let stale = sessions.login(1001);
    let live = sessions.login(1002);

    sessions.force_expire(&stale, Duration::from_secs(1));

    assert_eq!(sessions.validate(&stale), Err(SessionError::InvalidSession));
    assert_eq!(sessions.validate(&live), Ok(1002));
}

#[test]
fn expiry_is_strict_at_the_boundary() {
    let now = Instant::now();
    let on_the_dot = Session {
        user: 1,
        expires_at: now,
    };
    let barely_live = Session {
        user: 1,
        expires_at: now + Duration::from_millis(1),
    };

    assert!(!on_the_dot.is_live(now));
    assert!(barely_live.is_live(now));
}

#[test]
fn sweep_clears_expired_sessions_from_both_maps() {
    let sessions = SessionManager::new();
    let stale1 = sessions.login(1001);
    let stale2 = sessions.login(1002);
    let live = sessions.login(1003);

    sessions.force_expire(&stale1, Duration::from_secs(1));
    sessions.force_expire(&stale2, Duration::from_secs(1));
    sessions.sweep_now();

    assert!(!sessions.contains_key(&stale1));
    assert!(!sessions.contains_key(&stale2));
    assert!(!sessions.contains_user(1001));
    assert!(!sessions.contains_user(1002));
    assert!(sessions.contains_key(&live));
    assert!(sessions.contains_user(1003));
    assert_eq!(sessions.session_count(), 1);
    assert_eq!(sessions.user_count(), 1);
}

#[test]
fn sweep_keeps_live_sessions() {
    let sessions = SessionManager::new();
    let key1 = sessions.login(1001);
    let key2 = sessions.login(1002);

    sessions.sweep_now();

    assert_eq!(sessions.session_count(), 2);
    assert_eq!(sessions.validate(&key1), Ok(1001));
    assert_eq!(sessions.validate(&key2), Ok(1002));
}

#[test]
fn keys_are_unique_across_logins() {
    let sessions = SessionManager::new();
    let mut keys = HashSet::new();
    for _ in 0..100 {
        assert!(keys.insert(sessions.login(1234)));
    }
}

#[test]
fn works_for_boundary_user_ids() {
    let sessions = SessionManager::new();
    let key_zero = sessions.login(0);
    let key_max = sessions.login(u64::MAX);

    assert_eq!(sessions.validate(&key_zero), Ok(0));
    assert_eq!(sessions.validate(&key_max), Ok(u64::MAX));
}

//! Browser-side persistence: cookies set by the auth flow and local storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub const LOGIN_TOKEN_COOKIE: &str = "login_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const USER_ID_COOKIE: &str = "user_id";

pub const LOCAL_SIGN_IN_KEY: &str = "sign-in";
pub const LOCAL_FLAGS_KEY: &str = "flags";

pub trait SessionStorage: Send + Sync {
    fn cookie(&self, name: &str) -> Option<String>;
    fn set_cookie(&self, name: &str, value: &str);
    fn remove_cookie(&self, name: &str);

    fn local(&self, key: &str) -> Option<String>;
    fn set_local(&self, key: &str, value: &str);
    fn remove_local(&self, key: &str);
}

#[derive(Debug, Default)]
struct Inner {
    cookies: HashMap<String, String>,
    local: HashMap<String, String>,
}

/// In-process storage. Clones share state, like two tabs of one browser.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    fn write(&self, f: impl FnOnce(&mut Inner)) {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl SessionStorage for MemoryStorage {
    fn cookie(&self, name: &str) -> Option<String> {
        self.read(|inner| inner.cookies.get(name).cloned())
    }

    fn set_cookie(&self, name: &str, value: &str) {
        self.write(|inner| {
            inner.cookies.insert(name.to_string(), value.to_string());
        })
    }

    fn remove_cookie(&self, name: &str) {
        self.write(|inner| {
            inner.cookies.remove(name);
        })
    }

    fn local(&self, key: &str) -> Option<String> {
        self.read(|inner| inner.local.get(key).cloned())
    }

    fn set_local(&self, key: &str, value: &str) {
        self.write(|inner| {
            inner.local.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_local(&self, key: &str) {
        self.write(|inner| {
            inner.local.remove(key);
        })
    }
}

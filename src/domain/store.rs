use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Deserialize;
use time::OffsetDateTime;
use tracing::info;

use crate::auth::password::hash_password;
use crate::domain::model::{Rating, Role, Store, User};
use crate::domain::{rating, validate};
use crate::error::ApiError;

/// Fields for a user about to be created. `password` is still plaintext;
/// hashing happens inside `create_user`, before any lock is taken.
#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub role: Role,
}

#[derive(Debug)]
pub struct NewStore {
    pub name: String,
    pub email: String,
    pub address: String,
}

/// Admin user-list filters. Present fields compose with logical AND; an empty
/// filter matches everything. Text fields are case-insensitive substrings.
/// `role` is an exact match against the wire name; an unknown value matches
/// no user rather than failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreFilter {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// One store row personalized for a viewer, assembled from a single snapshot.
#[derive(Debug)]
pub struct StoreListing {
    pub store: Store,
    pub average: f64,
    pub viewer_rating: Option<u8>,
}

/// The owner dashboard payload, assembled from a single snapshot so the
/// average is always the mean of the rows it ships with.
#[derive(Debug)]
pub struct StoreDashboard {
    pub store: Store,
    pub average: f64,
    pub ratings: Vec<(Rating, User)>,
}

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    stores: Vec<Store>,
    ratings: Vec<Rating>,
}

/// The in-memory domain store: the only component allowed to mutate state.
/// All three collections sit behind a single lock, so every read observes a
/// consistent snapshot and writes are serialized with each other, which also
/// makes max+1 id allocation race-free.
pub struct Database {
    inner: RwLock<Collections>,
}

/// Next id is max existing + 1, or 1 for an empty collection. Computed from
/// the rows rather than a running counter so numbering stays correct even if
/// entities arrive out of order or a collection is rebuilt.
fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().map_or(1, |max| max + 1)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl Database {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collections::default()),
        }
    }

    /// Bootstrap data matching first-run expectations: one admin, one store
    /// owner with an assigned store, one normal user, two stores, one rating.
    pub fn seeded() -> anyhow::Result<Self> {
        let users = vec![
            User {
                id: 1,
                name: "System Admin".into(),
                email: "admin@example.com".into(),
                password_hash: hash_password("Admin123!")?,
                address: "123 Admin Street".into(),
                role: Role::Admin,
                store_id: None,
            },
            User {
                id: 2,
                name: "Store Owner One".into(),
                email: "store1@example.com".into(),
                password_hash: hash_password("Store123!")?,
                address: "456 Store Avenue".into(),
                role: Role::StoreOwner,
                store_id: Some(1),
            },
            User {
                id: 3,
                name: "Normal User".into(),
                email: "user@example.com".into(),
                password_hash: hash_password("User123!")?,
                address: "789 User Road".into(),
                role: Role::Normal,
                store_id: None,
            },
        ];
        let stores = vec![
            Store {
                id: 1,
                name: "Fresh Grocery Store".into(),
                email: "store1@example.com".into(),
                address: "456 Store Avenue".into(),
                owner_id: Some(2),
            },
            Store {
                id: 2,
                name: "Electronics Hub".into(),
                email: "electronics@example.com".into(),
                address: "321 Tech Boulevard".into(),
                owner_id: None,
            },
        ];
        let ratings = vec![Rating {
            id: 1,
            user_id: 3,
            store_id: 1,
            value: 4,
            created_at: OffsetDateTime::now_utc(),
        }];
        Ok(Self {
            inner: RwLock::new(Collections {
                users,
                stores,
                ratings,
            }),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Collections> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Collections> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    // --- users ---

    /// Validates (collecting every violation), hashes, then inserts.
    /// The duplicate-email check and the insert share one lock acquisition;
    /// hashing runs before the lock since it is the slow part.
    pub fn create_user(&self, new: NewUser) -> Result<User, ApiError> {
        let errors = validate::validate_user(&new.name, &new.email, &new.password, &new.address);
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }
        let password_hash = hash_password(&new.password)?;

        let mut inner = self.write();
        // Case-sensitive, exactly as stored.
        if inner.users.iter().any(|u| u.email == new.email) {
            return Err(ApiError::DuplicateEmail);
        }
        let user = User {
            id: next_id(inner.users.iter().map(|u| u.id)),
            name: new.name,
            email: new.email,
            password_hash,
            address: new.address,
            role: new.role,
            store_id: None,
        };
        inner.users.push(user.clone());
        info!(user_id = user.id, role = ?user.role, "user created");
        Ok(user)
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.read().users.iter().find(|u| u.email == email).cloned()
    }

    pub fn find_user_by_id(&self, id: u64) -> Option<User> {
        self.read().users.iter().find(|u| u.id == id).cloned()
    }

    fn user_matches(user: &User, filter: &UserFilter) -> bool {
        filter
            .name
            .as_deref()
            .map_or(true, |n| contains_ci(&user.name, n))
            && filter
                .email
                .as_deref()
                .map_or(true, |e| contains_ci(&user.email, e))
            && filter
                .address
                .as_deref()
                .map_or(true, |a| contains_ci(&user.address, a))
            && filter
                .role
                .as_deref()
                .map_or(true, |r| user.role.as_str() == r)
    }

    pub fn list_users(&self, filter: &UserFilter) -> Vec<User> {
        self.read()
            .users
            .iter()
            .filter(|u| Self::user_matches(u, filter))
            .cloned()
            .collect()
    }

    /// Listing plus the store-average annotation for store owners, read under
    /// one guard so the averages come from the same snapshot as the rows.
    pub fn list_users_annotated(&self, filter: &UserFilter) -> Vec<(User, Option<f64>)> {
        let inner = self.read();
        inner
            .users
            .iter()
            .filter(|u| Self::user_matches(u, filter))
            .map(|u| {
                let average = (u.role == Role::StoreOwner).then(|| {
                    let values: Vec<u8> = u
                        .store_id
                        .map(|sid| {
                            inner
                                .ratings
                                .iter()
                                .filter(|r| r.store_id == sid)
                                .map(|r| r.value)
                                .collect()
                        })
                        .unwrap_or_default();
                    rating::average(&values)
                });
                (u.clone(), average)
            })
            .collect()
    }

    /// Re-runs only the password-shape rules against the new plaintext, not
    /// the full user validation.
    pub fn update_password(&self, id: u64, plaintext: &str) -> Result<(), ApiError> {
        let errors = validate::validate_password(plaintext);
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }
        let password_hash = hash_password(plaintext)?;

        let mut inner = self.write();
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(ApiError::NotFound("User"))?;
        user.password_hash = password_hash;
        info!(user_id = id, "password hash replaced");
        Ok(())
    }

    // --- stores ---

    pub fn create_store(&self, new: NewStore) -> Result<Store, ApiError> {
        if new.name.is_empty() || new.email.is_empty() || new.address.is_empty() {
            return Err(ApiError::Validation(vec![
                "All fields are required".to_string()
            ]));
        }
        let mut inner = self.write();
        let store = Store {
            id: next_id(inner.stores.iter().map(|s| s.id)),
            name: new.name,
            email: new.email,
            address: new.address,
            owner_id: None,
        };
        inner.stores.push(store.clone());
        info!(store_id = store.id, "store created");
        Ok(store)
    }

    fn store_matches(store: &Store, filter: &StoreFilter) -> bool {
        filter
            .name
            .as_deref()
            .map_or(true, |n| contains_ci(&store.name, n))
            && filter
                .address
                .as_deref()
                .map_or(true, |a| contains_ci(&store.address, a))
    }

    pub fn list_stores(&self, filter: &StoreFilter) -> Vec<Store> {
        self.read()
            .stores
            .iter()
            .filter(|s| Self::store_matches(s, filter))
            .cloned()
            .collect()
    }

    /// Personalized listing for one viewer: the shared average and the
    /// viewer's own rating per store, all read under one guard.
    pub fn list_stores_for(&self, viewer_id: u64, filter: &StoreFilter) -> Vec<StoreListing> {
        let inner = self.read();
        inner
            .stores
            .iter()
            .filter(|s| Self::store_matches(s, filter))
            .map(|s| {
                let values: Vec<u8> = inner
                    .ratings
                    .iter()
                    .filter(|r| r.store_id == s.id)
                    .map(|r| r.value)
                    .collect();
                let viewer_rating = inner
                    .ratings
                    .iter()
                    .find(|r| r.store_id == s.id && r.user_id == viewer_id)
                    .map(|r| r.value);
                StoreListing {
                    store: s.clone(),
                    average: rating::average(&values),
                    viewer_rating,
                }
            })
            .collect()
    }

    /// Resolves a store through its owner back-reference.
    pub fn store_owned_by(&self, user_id: u64) -> Option<Store> {
        self.read()
            .stores
            .iter()
            .find(|s| s.owner_id == Some(user_id))
            .cloned()
    }

    /// The owner dashboard join: store, average, and rows enriched with the
    /// rater's identity, all from a single snapshot. `None` when the owner
    /// has no store assigned.
    pub fn store_dashboard(&self, owner_id: u64) -> anyhow::Result<Option<StoreDashboard>> {
        let inner = self.read();
        let Some(store) = inner
            .stores
            .iter()
            .find(|s| s.owner_id == Some(owner_id))
            .cloned()
        else {
            return Ok(None);
        };
        let rows: Vec<&Rating> = inner
            .ratings
            .iter()
            .filter(|r| r.store_id == store.id)
            .collect();
        let values: Vec<u8> = rows.iter().map(|r| r.value).collect();
        let average = rating::average(&values);
        let mut ratings = Vec::with_capacity(rows.len());
        for r in rows {
            let rater = inner.users.iter().find(|u| u.id == r.user_id).ok_or_else(|| {
                anyhow::anyhow!("rating {} references missing user {}", r.id, r.user_id)
            })?;
            ratings.push((r.clone(), rater.clone()));
        }
        Ok(Some(StoreDashboard {
            store,
            average,
            ratings,
        }))
    }

    // --- ratings ---

    /// At most one rating per (user, store): a repeat submission overwrites
    /// the value and refreshes `created_at` instead of inserting a new row.
    pub fn upsert_rating(&self, user_id: u64, store_id: u64, value: u8) -> Result<(), ApiError> {
        if !(1..=5).contains(&value) {
            return Err(ApiError::InvalidRating);
        }
        let mut inner = self.write();
        if !inner.stores.iter().any(|s| s.id == store_id) {
            return Err(ApiError::NotFound("Store"));
        }
        let now = OffsetDateTime::now_utc();
        let existing = inner
            .ratings
            .iter()
            .position(|r| r.user_id == user_id && r.store_id == store_id);
        match existing {
            Some(pos) => {
                let rating = &mut inner.ratings[pos];
                rating.value = value;
                rating.created_at = now;
                info!(user_id, store_id, value, "rating updated");
            }
            None => {
                let id = next_id(inner.ratings.iter().map(|r| r.id));
                inner.ratings.push(Rating {
                    id,
                    user_id,
                    store_id,
                    value,
                    created_at: now,
                });
                info!(user_id, store_id, value, "rating inserted");
            }
        }
        Ok(())
    }

    pub fn find_rating(&self, user_id: u64, store_id: u64) -> Option<Rating> {
        self.read()
            .ratings
            .iter()
            .find(|r| r.user_id == user_id && r.store_id == store_id)
            .cloned()
    }

    pub fn ratings_for_store(&self, store_id: u64) -> Vec<Rating> {
        self.read()
            .ratings
            .iter()
            .filter(|r| r.store_id == store_id)
            .cloned()
            .collect()
    }

    /// Snapshot-consistent wrapper around the aggregation function.
    pub fn average_rating(&self, store_id: u64) -> f64 {
        let inner = self.read();
        let values: Vec<u8> = inner
            .ratings
            .iter()
            .filter(|r| r.store_id == store_id)
            .map(|r| r.value)
            .collect();
        rating::average(&values)
    }

    /// Live counts for the admin dashboard: (non-admin users, stores, ratings).
    pub fn stats(&self) -> (usize, usize, usize) {
        let inner = self.read();
        let users = inner.users.iter().filter(|u| u.role != Role::Admin).count();
        (users, inner.stores.len(), inner.ratings.len())
    }
}

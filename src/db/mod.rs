//! Identity store (Firestore).

pub mod firestore;

pub use self::firestore::UserStore;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
}

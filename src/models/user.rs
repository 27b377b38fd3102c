use jiff::Timestamp;

/// A stored user record.
///
/// `password` holds the Argon2 PHC string, never the plaintext. This type is
/// deliberately not `Serialize`; the API layer converts it into
/// `UserResponse`, which has no password field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Opaque identifier assigned by the store
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: Timestamp,
}

/// Data for inserting a new user. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Already hashed
    pub password: String,
    pub created_at: Timestamp,
}

impl NewUser {
    /// Materializes the record once the store has chosen an id.
    pub fn into_user(self, id: String) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password: self.password,
            created_at: self.created_at,
        }
    }
}

/// The mutable part of a user: name and email. Password changes are not
/// possible through this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub name: String,
    pub email: String,
}

use anyhow::bail;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Self-reported experience level for hikers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum HikingExperience {
    #[default]
    Beginner,
    Intermediate,
    Expert,
}

impl HikingExperience {
    pub fn as_str(&self) -> &'static str {
        match self {
            HikingExperience::Beginner => "Beginner",
            HikingExperience::Intermediate => "Intermediate",
            HikingExperience::Expert => "Expert",
        }
    }

    fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "Beginner" => Ok(HikingExperience::Beginner),
            "Intermediate" => Ok(HikingExperience::Intermediate),
            "Expert" => Ok(HikingExperience::Expert),
            other => bail!("unknown hiking experience: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResponderType {
    #[serde(rename = "Search & Rescue")]
    SearchAndRescue,
    Medical,
    Firefighter,
}

impl ResponderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponderType::SearchAndRescue => "Search & Rescue",
            ResponderType::Medical => "Medical",
            ResponderType::Firefighter => "Firefighter",
        }
    }

    fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "Search & Rescue" => Ok(ResponderType::SearchAndRescue),
            "Medical" => Ok(ResponderType::Medical),
            "Firefighter" => Ok(ResponderType::Firefighter),
            other => bail!("unknown responder type: {other}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HikerProfile {
    #[serde(default)]
    pub hiking_experience: HikingExperience,
    pub emergency_contact: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponderProfile {
    pub responder_type: ResponderType,
    pub location: Option<String>,
}

/// Role-specific half of a user, fixed at registration. Serializes with a
/// `role` tag next to the variant's own fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Hiker(HikerProfile),
    Responder(ResponderProfile),
}

impl RoleProfile {
    pub fn role_tag(&self) -> &'static str {
        match self {
            RoleProfile::Hiker(_) => "hiker",
            RoleProfile::Responder(_) => "responder",
        }
    }
}

/// A registered user. `password_hash` holds the Argon2 digest and is never
/// serialized; the plaintext never reaches this type.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(flatten)]
    pub profile: RoleProfile,
    pub created_at: OffsetDateTime,
}

/// Candidate user assembled by the registration service, password already
/// hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile: RoleProfile,
}

/// Flat storage shape: one `users` table with a role column and nullable
/// role-specific columns.
#[derive(Debug, Clone, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    hiking_experience: Option<String>,
    emergency_contact: Option<String>,
    address: Option<String>,
    gender: Option<String>,
    age: Option<String>,
    responder_type: Option<String>,
    location: Option<String>,
    created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> anyhow::Result<User> {
        let profile = match row.role.as_str() {
            "hiker" => RoleProfile::Hiker(HikerProfile {
                hiking_experience: row
                    .hiking_experience
                    .as_deref()
                    .map(HikingExperience::parse)
                    .transpose()?
                    .unwrap_or_default(),
                emergency_contact: row.emergency_contact,
                address: row.address,
                gender: row.gender,
                age: row.age,
            }),
            "responder" => RoleProfile::Responder(ResponderProfile {
                responder_type: row
                    .responder_type
                    .as_deref()
                    .map(ResponderType::parse)
                    .transpose()?
                    .ok_or_else(|| anyhow::anyhow!("responder row missing responder_type"))?,
                location: row.location,
            }),
            other => bail!("unknown role in users table: {other}"),
        };
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            profile,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, hiking_experience, \
     emergency_contact, address, gender, age, responder_type, location, created_at";

pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(db)
    .await?;
    row.map(User::try_from).transpose()
}

pub async fn create(db: &PgPool, user: &NewUser) -> anyhow::Result<User> {
    let (experience, contact, address, gender, age, responder_type, location) =
        match &user.profile {
            RoleProfile::Hiker(h) => (
                Some(h.hiking_experience.as_str()),
                h.emergency_contact.as_deref(),
                h.address.as_deref(),
                h.gender.as_deref(),
                h.age.as_deref(),
                None,
                None,
            ),
            RoleProfile::Responder(r) => (
                None,
                None,
                None,
                None,
                None,
                Some(r.responder_type.as_str()),
                r.location.as_deref(),
            ),
        };

    let row = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (username, email, password_hash, role, hiking_experience, \
         emergency_contact, address, gender, age, responder_type, location) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.profile.role_tag())
    .bind(experience)
    .bind(contact)
    .bind(address)
    .bind(gender)
    .bind(age)
    .bind(responder_type)
    .bind(location)
    .fetch_one(db)
    .await?;
    row.try_into()
}

/// True when the error is the unique index on `users.email` firing. Two
/// concurrent registrations can both pass the pre-insert check; the index
/// is the backstop and its violation is reported as the same conflict.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hiker_row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            username: "ann".into(),
            email: "ann@example.com".into(),
            password_hash: "$argon2id$fake".into(),
            role: "hiker".into(),
            hiking_experience: Some("Expert".into()),
            emergency_contact: Some("+4670000000".into()),
            address: Some("Basecamp 1".into()),
            gender: None,
            age: Some("34".into()),
            responder_type: None,
            location: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn hiker_row_becomes_hiker_profile() {
        let user = User::try_from(hiker_row()).expect("convert hiker row");
        match user.profile {
            RoleProfile::Hiker(h) => {
                assert_eq!(h.hiking_experience, HikingExperience::Expert);
                assert_eq!(h.emergency_contact.as_deref(), Some("+4670000000"));
            }
            other => panic!("expected hiker, got {other:?}"),
        }
    }

    #[test]
    fn missing_experience_defaults_to_beginner() {
        let mut row = hiker_row();
        row.hiking_experience = None;
        let user = User::try_from(row).expect("convert");
        match user.profile {
            RoleProfile::Hiker(h) => assert_eq!(h.hiking_experience, HikingExperience::Beginner),
            other => panic!("expected hiker, got {other:?}"),
        }
    }

    #[test]
    fn responder_row_requires_responder_type() {
        let mut row = hiker_row();
        row.role = "responder".into();
        row.responder_type = None;
        assert!(User::try_from(row).is_err());
    }

    #[test]
    fn unknown_role_is_rejected() {
        let mut row = hiker_row();
        row.role = "ranger".into();
        assert!(User::try_from(row).is_err());
    }

    #[test]
    fn responder_type_uses_original_labels() {
        assert_eq!(
            serde_json::to_value(ResponderType::SearchAndRescue).unwrap(),
            "Search & Rescue"
        );
        assert_eq!(
            ResponderType::parse("Search & Rescue").unwrap(),
            ResponderType::SearchAndRescue
        );
    }

    #[test]
    fn serialized_user_never_contains_password() {
        let user = User::try_from(hiker_row()).expect("convert");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "hiker");
        assert_eq!(json["hikingExperience"], "Expert");
    }
}

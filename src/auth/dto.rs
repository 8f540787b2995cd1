use serde::{Deserialize, Serialize};

use crate::auth::repo::{HikerProfile, HikingExperience, ResponderType, RoleProfile, User};

/// Request body for POST /register/hiker.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterHikerRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub hiking_experience: HikingExperience,
    pub emergency_contact: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
}

impl RegisterHikerRequest {
    pub fn profile(&self) -> RoleProfile {
        RoleProfile::Hiker(HikerProfile {
            hiking_experience: self.hiking_experience,
            emergency_contact: self.emergency_contact.clone(),
            address: self.address.clone(),
            gender: self.gender.clone(),
            age: self.age.clone(),
        })
    }
}

/// Request body for POST /register/responder.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponderRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub responder_type: ResponderType,
    pub location: Option<String>,
}

impl RegisterResponderRequest {
    pub fn profile(&self) -> RoleProfile {
        RoleProfile::Responder(crate::auth::repo::ResponderProfile {
            responder_type: self.responder_type,
            location: self.location.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload placed in `data[0]` of a successful login: the signed token next
/// to the user's public fields.
#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: String,
    #[serde(flatten)]
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn login_data_exposes_token_but_not_password() {
        let user = User {
            id: Uuid::new_v4(),
            username: "ann".into(),
            email: "ann@example.com".into(),
            password_hash: "$argon2id$fake".into(),
            profile: RoleProfile::Hiker(HikerProfile {
                hiking_experience: HikingExperience::Beginner,
                emergency_contact: None,
                address: None,
                gender: None,
                age: None,
            }),
            created_at: OffsetDateTime::now_utc(),
        };
        let data = LoginData {
            token: "signed.jwt.token".into(),
            user,
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["token"], "signed.jwt.token");
        assert_eq!(json["email"], "ann@example.com");
        assert_eq!(json["role"], "hiker");
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn hiker_request_defaults_experience_to_beginner() {
        let req: RegisterHikerRequest = serde_json::from_value(serde_json::json!({
            "username": "a",
            "email": "a@x.com",
            "password": "p",
        }))
        .unwrap();
        assert_eq!(req.hiking_experience, HikingExperience::Beginner);
    }

    #[test]
    fn responder_request_parses_original_type_labels() {
        let req: RegisterResponderRequest = serde_json::from_value(serde_json::json!({
            "username": "r",
            "email": "r@x.com",
            "password": "longenough",
            "responderType": "Search & Rescue",
            "location": "North Ridge",
        }))
        .unwrap();
        assert_eq!(req.responder_type, ResponderType::SearchAndRescue);
    }
}

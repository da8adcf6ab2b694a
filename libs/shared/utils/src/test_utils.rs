use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{
    get_status_by_name, insert_clinician, insert_location, insert_patient, Database, DatabaseError,
};
use shared_models::agenda::{BookingStatus, Clinician, Location, Patient};
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub clinic_timezone: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            clinic_timezone: "UTC".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_path: ":memory:".to_string(),
            clinic_timezone: self.clinic_timezone.clone(),
            jwt_secret: self.jwt_secret.clone(),
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "front_desk".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn clinician(email: &str) -> Self {
        Self::new(email, "clinician")
    }

    pub fn front_desk(email: &str) -> Self {
        Self::new(email, "front_desk")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }
}

/// Reference rows the scheduling core expects to exist: one clinician, one
/// location, two patients and an acting front-desk user.
pub struct AgendaFixture {
    pub db: Database,
    pub clinician: Clinician,
    pub location: Location,
    pub patient: Patient,
    pub other_patient: Patient,
    pub actor: Uuid,
}

impl AgendaFixture {
    pub fn new() -> Result<Self, DatabaseError> {
        Self::with_database(Database::in_memory()?)
    }

    pub fn with_database(db: Database) -> Result<Self, DatabaseError> {
        let clinician = Clinician {
            id: Uuid::new_v4(),
            full_name: "Dra. Camila Rivas".to_string(),
            active: true,
        };
        let location = Location {
            id: Uuid::new_v4(),
            name: format!("Box {}", &Uuid::new_v4().simple().to_string()[..6]),
        };
        let patient = Patient {
            id: Uuid::new_v4(),
            full_name: "Tomás Fuentes".to_string(),
        };
        let other_patient = Patient {
            id: Uuid::new_v4(),
            full_name: "Javiera Soto".to_string(),
        };

        db.write(|tx| {
            insert_clinician(tx, &clinician)?;
            insert_location(tx, &location)?;
            insert_patient(tx, &patient)?;
            insert_patient(tx, &other_patient)?;
            Ok::<_, DatabaseError>(())
        })?;

        Ok(Self {
            db,
            clinician,
            location,
            patient,
            other_patient,
            actor: Uuid::new_v4(),
        })
    }

    /// Look up a seeded status (`Pending`, `Confirmed`, `Attended`, `Absent`, `Cancelled`).
    pub fn status(&self, name: &str) -> Result<BookingStatus, DatabaseError> {
        self.db.read(|conn| {
            get_status_by_name(conn, name)?.ok_or_else(|| DatabaseError::not_found("booking_status", name))
        })
    }
}

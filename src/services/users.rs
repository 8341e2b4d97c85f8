use crate::{
    auth::{generate_otp, roles, AuthService},
    entities::{user, User},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Account registration, one-time-code verification and login.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    auth: Arc<AuthService>,
    event_sender: Arc<EventSender>,
}

impl UserService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        auth: Arc<AuthService>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            db,
            auth,
            event_sender,
        }
    }

    /// Registers a student account. The account starts unverified with a
    /// 30-minute one-time code; the code is logged rather than emailed, as
    /// mail delivery is not wired up here.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<user::Model, ServiceError> {
        input.validate()?;

        let existing = User::find()
            .filter(user::Column::Email.eq(input.email.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "user with email {} already registered",
                input.email
            )));
        }

        let password_hash = self.auth.hash_password(&input.password)?;
        let otp = generate_otp();
        let now = Utc::now();

        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            password_hash: Set(password_hash),
            role: Set(roles::STUDENT.to_string()),
            is_verified: Set(false),
            otp_code: Set(Some(otp.clone())),
            otp_expires_at: Set(Some(now + Duration::minutes(30))),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let user = user.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::UserRegistered(user.id))
            .await;

        info!(user_id = %user.id, "User registered, verification pending");
        debug!(user_id = %user.id, otp_code = %otp, "Verification code issued (mail delivery not configured)");

        Ok(user)
    }

    /// Marks an account verified when the submitted code matches and has
    /// not expired. The code is cleared either way it is consumed.
    #[instrument(skip(self, code))]
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<user::Model, ServiceError> {
        let user = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("no account for this email".to_string()))?;

        if user.is_verified {
            return Err(ServiceError::BadRequest(
                "account already verified".to_string(),
            ));
        }

        let valid = user.otp_code.as_deref() == Some(code)
            && user
                .otp_expires_at
                .map(|expiry| expiry > Utc::now())
                .unwrap_or(false);
        if !valid {
            return Err(ServiceError::BadRequest(
                "invalid or expired verification code".to_string(),
            ));
        }

        let mut active: user::ActiveModel = user.into();
        active.is_verified = Set(true);
        active.otp_code = Set(None);
        active.otp_expires_at = Set(None);
        active.updated_at = Set(Some(Utc::now()));

        let user = active.update(&*self.db).await?;
        info!(user_id = %user.id, "Account verified");
        Ok(user)
    }

    /// Verifies credentials and issues an access token. Unverified accounts
    /// cannot log in.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(user::Model, String), ServiceError> {
        let user = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid credentials".to_string()))?;

        if !self.auth.verify_password(password, &user.password_hash)? {
            return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
        }

        if !user.is_verified {
            return Err(ServiceError::Forbidden(
                "account is not verified".to_string(),
            ));
        }

        let token = self.auth.generate_token(&user)?;
        info!(user_id = %user.id, "User logged in");
        Ok((user, token))
    }
}

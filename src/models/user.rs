//! User model, roles, permission flags and session claims

use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{Sqlite, SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef},
    Decode, Encode, FromRow,
};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// User role (string identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Technician,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Technician => "technician",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "technician" => Ok(Role::Technician),
            "user" => Ok(Role::User),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role (stored as TEXT)
impl sqlx::Type<Sqlite> for Role {
    fn type_info() -> SqliteTypeInfo {
        <String as sqlx::Type<Sqlite>>::type_info()
    }
}

impl<'r> Decode<'r, Sqlite> for Role {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Sqlite>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl<'q> Encode<'q, Sqlite> for Role {
    fn encode_by_ref(&self, buf: &mut Vec<SqliteArgumentValue<'q>>) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Sqlite>>::encode(s, buf)
    }
}

/// Per-user capability flags; the role only decides the defaults at
/// account creation, the stored flags are authoritative afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PermissionSet {
    pub can_view_interventions: bool,
    pub can_add_interventions: bool,
    pub can_edit_interventions: bool,
    pub can_delete_interventions: bool,
    pub can_view_stock: bool,
    pub can_add_stock: bool,
    pub can_edit_stock: bool,
    pub can_delete_stock: bool,
    pub can_manage_users: bool,
}

impl PermissionSet {
    /// Default flags for a role, applied once when the account is created
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Self {
                can_view_interventions: true,
                can_add_interventions: true,
                can_edit_interventions: true,
                can_delete_interventions: true,
                can_view_stock: true,
                can_add_stock: true,
                can_edit_stock: true,
                can_delete_stock: true,
                can_manage_users: true,
            },
            Role::Technician => Self {
                can_view_interventions: true,
                can_add_interventions: true,
                can_view_stock: true,
                ..Self::none()
            },
            Role::User => Self {
                can_view_interventions: true,
                can_view_stock: true,
                ..Self::none()
            },
        }
    }

    pub fn none() -> Self {
        Self {
            can_view_interventions: false,
            can_add_interventions: false,
            can_edit_interventions: false,
            can_delete_interventions: false,
            can_view_stock: false,
            can_add_stock: false,
            can_edit_stock: false,
            can_delete_stock: false,
            can_manage_users: false,
        }
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    /// When set, login is suspended until a new password has been chosen
    pub force_password_change: bool,
}

/// User together with their resolved permission flags
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserDetails {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub force_password_change: bool,
    pub permissions: PermissionSet,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: Role,
}

/// Update user request; permission flags have their own endpoint
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: Option<String>,
    pub role: Option<Role>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i64,
    pub role: Role,
    pub permissions: PermissionSet,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    fn require(&self, flag: bool, what: &str) -> Result<(), AppError> {
        if flag {
            Ok(())
        } else {
            Err(AppError::AccessDenied(format!(
                "Insufficient rights to {}",
                what
            )))
        }
    }

    // Authorization checks, one per permission flag
    pub fn require_view_interventions(&self) -> Result<(), AppError> {
        self.require(self.permissions.can_view_interventions, "view interventions")
    }

    pub fn require_add_interventions(&self) -> Result<(), AppError> {
        self.require(self.permissions.can_add_interventions, "add interventions")
    }

    pub fn require_edit_interventions(&self) -> Result<(), AppError> {
        self.require(self.permissions.can_edit_interventions, "edit interventions")
    }

    pub fn require_delete_interventions(&self) -> Result<(), AppError> {
        self.require(
            self.permissions.can_delete_interventions,
            "delete interventions",
        )
    }

    pub fn require_view_stock(&self) -> Result<(), AppError> {
        self.require(self.permissions.can_view_stock, "view stock")
    }

    pub fn require_add_stock(&self) -> Result<(), AppError> {
        self.require(self.permissions.can_add_stock, "add stock")
    }

    pub fn require_edit_stock(&self) -> Result<(), AppError> {
        self.require(self.permissions.can_edit_stock, "edit stock")
    }

    pub fn require_delete_stock(&self) -> Result<(), AppError> {
        self.require(self.permissions.can_delete_stock, "delete stock")
    }

    pub fn require_manage_users(&self) -> Result<(), AppError> {
        self.require(self.permissions.can_manage_users, "manage users")
    }
}

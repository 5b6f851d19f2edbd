//! Login state machine and permission management tests.

use sqlx::sqlite::SqlitePoolOptions;

use atelier_server::{
    config::AuthConfig,
    error::AppError,
    models::user::{CreateUser, PermissionSet, Role, UserClaims},
    repository::Repository,
    services::users::UsersService,
};

async fn test_service() -> (Repository, UsersService) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    let repo = Repository::new(pool);
    repo.init_schema().await.expect("schema");
    let service = UsersService::new(repo.clone(), AuthConfig::default());
    (repo, service)
}

/// Seed the default admin exactly as server startup does
async fn seed_admin(repo: &Repository, service: &UsersService) {
    let hash = service.hash_password("admin123").expect("hash");
    assert!(repo.users_seed_admin(&hash).await.expect("seed"));
}

fn admin_claims() -> UserClaims {
    UserClaims {
        sub: "admin".to_string(),
        user_id: 1,
        role: Role::Admin,
        permissions: PermissionSet::for_role(Role::Admin),
        exp: 4102444800,
        iat: 0,
    }
}

#[tokio::test]
async fn seeded_admin_must_change_password_before_getting_a_token() {
    let (repo, service) = test_service().await;
    seed_admin(&repo, &service).await;

    let (token, user) = service
        .authenticate("admin", "admin123")
        .await
        .expect("authenticate");

    assert!(token.is_none());
    assert!(user.force_password_change);
}

#[tokio::test]
async fn forced_change_rejects_short_or_mismatched_passwords() {
    let (repo, service) = test_service().await;
    seed_admin(&repo, &service).await;

    let short = service
        .change_password("admin", "admin123", "abc", "abc")
        .await;
    assert!(matches!(short, Err(AppError::Validation(_))));

    let mismatch = service
        .change_password("admin", "admin123", "secret99", "secret98")
        .await;
    assert!(matches!(mismatch, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn completed_password_change_opens_the_session() {
    let (repo, service) = test_service().await;
    seed_admin(&repo, &service).await;

    let (token, user) = service
        .change_password("admin", "admin123", "secret99", "secret99")
        .await
        .expect("change password");
    assert!(!token.is_empty());
    assert!(!user.force_password_change);

    // The old password no longer authenticates, the new one does directly
    let stale = service.authenticate("admin", "admin123").await;
    assert!(matches!(stale, Err(AppError::Authentication(_))));

    let (token, user) = service
        .authenticate("admin", "secret99")
        .await
        .expect("authenticate");
    assert!(token.is_some());
    assert!(!user.force_password_change);
}

#[tokio::test]
async fn unknown_user_and_wrong_password_are_indistinguishable() {
    let (repo, service) = test_service().await;
    seed_admin(&repo, &service).await;

    let unknown = service.authenticate("nobody", "whatever").await;
    let wrong = service.authenticate("admin", "wrong").await;

    for result in [unknown, wrong] {
        match result {
            Err(AppError::Authentication(msg)) => {
                assert_eq!(msg, "Invalid username or password")
            }
            other => panic!("expected authentication error, got {:?}", other.map(|_| ())),
        }
    }
}

#[tokio::test]
async fn role_decides_default_flags_at_creation() {
    let (_repo, service) = test_service().await;
    let admin = admin_claims();

    let technician = service
        .create_user(
            &admin,
            CreateUser {
                username: "tech1".to_string(),
                password: "secret99".to_string(),
                role: Role::Technician,
            },
        )
        .await
        .expect("create technician");

    assert_eq!(technician.permissions, PermissionSet::for_role(Role::Technician));
    assert!(technician.permissions.can_add_interventions);
    assert!(!technician.permissions.can_edit_stock);
}

#[tokio::test]
async fn creating_users_requires_manage_users() {
    let (_repo, service) = test_service().await;

    let mut claims = admin_claims();
    claims.permissions.can_manage_users = false;

    let result = service
        .create_user(
            &claims,
            CreateUser {
                username: "tech1".to_string(),
                password: "secret99".to_string(),
                role: Role::Technician,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::AccessDenied(_))));
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let (_repo, service) = test_service().await;
    let admin = admin_claims();

    let request = || CreateUser {
        username: "tech1".to_string(),
        password: "secret99".to_string(),
        role: Role::Technician,
    };

    service.create_user(&admin, request()).await.expect("first");
    let second = service.create_user(&admin, request()).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn stored_flags_can_diverge_from_role_defaults() {
    let (repo, service) = test_service().await;
    let admin = admin_claims();

    let technician = service
        .create_user(
            &admin,
            CreateUser {
                username: "tech1".to_string(),
                password: "secret99".to_string(),
                role: Role::Technician,
            },
        )
        .await
        .expect("create");

    let mut flags = technician.permissions;
    flags.can_edit_stock = true;
    flags.can_delete_interventions = true;

    service
        .update_permissions(&admin, technician.id, flags)
        .await
        .expect("override");

    let stored = repo.users_get_permissions(technician.id).await.unwrap();
    assert!(stored.can_edit_stock);
    assert!(stored.can_delete_interventions);
    // Untouched flags keep their role default
    assert!(!stored.can_manage_users);
}

#[tokio::test]
async fn password_reset_reraises_the_forced_change() {
    let (_repo, service) = test_service().await;
    let admin = admin_claims();

    let technician = service
        .create_user(
            &admin,
            CreateUser {
                username: "tech1".to_string(),
                password: "secret99".to_string(),
                role: Role::Technician,
            },
        )
        .await
        .expect("create");

    // A fresh account logs in directly
    let (token, _) = service.authenticate("tech1", "secret99").await.unwrap();
    assert!(token.is_some());

    service
        .reset_password(&admin, technician.id)
        .await
        .expect("reset");

    // Back to the configured initial password, with the change forced
    let (token, user) = service.authenticate("tech1", "admin123").await.unwrap();
    assert!(token.is_none());
    assert!(user.force_password_change);
}

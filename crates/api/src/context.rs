use mostrador_auth::Role;
use mostrador_core::UserId;

/// The authenticated caller, injected into request extensions by the auth
/// middleware. Handlers never see the raw token.
#[derive(Debug, Clone)]
pub struct PrincipalContext {
    pub user_id: UserId,
    pub role: Role,
}

//! Route paths.

pub const GET_HEALTH: &str = "/health";

pub const POST_AUTH_REGISTER: &str = "/auth/register";
pub const POST_AUTH_LOGIN: &str = "/auth/login";
pub const POST_AUTH_REFRESH: &str = "/auth/refresh";
pub const POST_AUTH_LOGOUT: &str = "/auth/logout";
pub const GET_AUTH_PERMISSIONS: &str = "/auth/permissions";
pub const GET_AUTH_OAUTH_CALLBACK: &str = "/auth/oauth/{provider}/callback";

pub const POST_AUTH_REMOTE: &str = "/auth/remote";
pub const GET_AUTH_REMOTE_PENDING: &str = "/auth/remote/pending";
pub const GET_AUTH_REMOTE_TOKEN: &str = "/auth/remote/{token}";
pub const POST_AUTH_REMOTE_TOKEN_CONSUME: &str = "/auth/remote/{token}/consume";
pub const POST_AUTH_REMOTE_CHANNEL: &str = "/auth/remote/channel";
pub const POST_AUTH_REMOTE_REQUESTS_ID_DECISION: &str =
    "/auth/remote/requests/{request_id}/decision";

pub const POST_ADMIN_USERS_ID_BLOCK: &str = "/admin/users/{id}/block";
pub const POST_ADMIN_USERS_ID_UNBLOCK: &str = "/admin/users/{id}/unblock";
pub const GET_ADMIN_USERS_ID_PERMISSIONS: &str = "/admin/users/{id}/permissions";

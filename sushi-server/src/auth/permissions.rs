//! Permission Definitions
//!
//! Back-office RBAC. Permissions are `module:action` strings; a role grants
//! a fixed set, carried in the JWT.

/// Configurable permissions
pub const ALL_PERMISSIONS: &[&str] = &[
    "orders:read",
    "orders:update",
    "menu:manage",
    "promotions:manage",
    "slots:manage",
    "restaurants:manage",
    "delivery:manage",
    "stats:view",
    "notifications:read",
];

/// Admin-only permissions
pub const ADMIN_ONLY_PERMISSIONS: &[&str] = &["admin_users:manage", "all"];

pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &["all"];

/// Manager: orders, menu, promotions, slots and restaurant settings
pub const DEFAULT_MANAGER_PERMISSIONS: &[&str] = &[
    "orders:*",
    "menu:manage",
    "promotions:manage",
    "slots:manage",
    "restaurants:manage",
    "delivery:manage",
    "stats:view",
    "notifications:read",
];

/// Staff: read orders and move them along
pub const DEFAULT_STAFF_PERMISSIONS: &[&str] = &["orders:read", "orders:update"];

/// Get permissions for a role name
pub fn get_default_permissions(role_name: &str) -> Vec<String> {
    let permissions = match role_name {
        "admin" => DEFAULT_ADMIN_PERMISSIONS,
        "manager" => DEFAULT_MANAGER_PERMISSIONS,
        "staff" => DEFAULT_STAFF_PERMISSIONS,
        _ => &[],
    };
    permissions.iter().map(|s| s.to_string()).collect()
}

/// Validate if a permission string is valid
pub fn is_valid_permission(permission: &str) -> bool {
    ALL_PERMISSIONS.contains(&permission)
        || ADMIN_ONLY_PERMISSIONS.contains(&permission)
        || permission.ends_with(":*")
}

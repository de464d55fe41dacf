/// Pure functions for role based access checks (Discord-agnostic)
use poise::serenity_prelude::RoleId;

use crate::models::GuildRoles;

/// Which admin capability a command needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Admin,
    TaskAdmin,
    MovieAdmin,
}

impl AccessLevel {
    pub fn label(&self) -> &'static str {
        match self {
            AccessLevel::Admin => "admin",
            AccessLevel::TaskAdmin => "task admin",
            AccessLevel::MovieAdmin => "movie admin",
        }
    }
}

/// Roles bound in the guild config that grant the given level
pub fn bound_roles_for(level: AccessLevel, roles: &GuildRoles) -> Vec<RoleId> {
    let specific = match level {
        AccessLevel::Admin => None,
        AccessLevel::TaskAdmin => roles.task_admin,
        AccessLevel::MovieAdmin => roles.movie_admin,
    };
    roles.admin.into_iter().chain(specific).collect()
}

/// Ids of roles whose name matches the admin role name (case-insensitive)
pub fn roles_named<I>(roles: I, name: &str) -> Vec<RoleId>
where
    I: IntoIterator<Item = (RoleId, String)>,
{
    roles
        .into_iter()
        .filter(|(_, role_name)| role_name.eq_ignore_ascii_case(name.trim()))
        .map(|(id, _)| id)
        .collect()
}

/// Check if a user has any of the required role IDs
pub fn has_any_role(user_roles: &[RoleId], required_roles: &[RoleId]) -> bool {
    user_roles.iter().any(|role| required_roles.contains(role))
}

/// Decide whether a member may run an admin command
///
/// Discord administrators always pass. Otherwise the member needs one of the
/// roles bound in the config or, when the level has no bound role at all, a
/// role carrying the fallback admin name.
pub fn has_access(
    member_roles: &[RoleId],
    is_administrator: bool,
    bound_roles: &[RoleId],
    named_admin_roles: &[RoleId],
) -> bool {
    if is_administrator {
        return true;
    }
    if has_any_role(member_roles, bound_roles) {
        return true;
    }
    bound_roles.is_empty() && has_any_role(member_roles, named_admin_roles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<RoleId> {
        raw.iter().map(|id| RoleId::new(*id)).collect()
    }

    #[test]
    fn test_bound_roles_for() {
        let roles = GuildRoles {
            admin: Some(RoleId::new(1)),
            task_admin: Some(RoleId::new(2)),
            ..Default::default()
        };

        assert_eq!(bound_roles_for(AccessLevel::Admin, &roles), ids(&[1]));
        assert_eq!(bound_roles_for(AccessLevel::TaskAdmin, &roles), ids(&[1, 2]));
        assert_eq!(bound_roles_for(AccessLevel::MovieAdmin, &roles), ids(&[1]));
        assert!(bound_roles_for(AccessLevel::Admin, &GuildRoles::default()).is_empty());
    }

    #[test]
    fn test_roles_named() {
        let roles = vec![
            (RoleId::new(1), "Members".to_string()),
            (RoleId::new(2), "bustinbot admin".to_string()),
            (RoleId::new(3), "BustinBot Admin".to_string()),
        ];
        assert_eq!(roles_named(roles, "BustinBot Admin"), ids(&[2, 3]));
    }

    #[test]
    fn test_has_any_role() {
        assert!(has_any_role(&ids(&[10, 20, 30]), &ids(&[20, 40])));
        assert!(!has_any_role(&ids(&[10, 20]), &ids(&[40, 50])));
        assert!(!has_any_role(&ids(&[10, 20]), &[]));
    }

    #[test]
    fn test_has_access_administrator() {
        assert!(has_access(&[], true, &ids(&[1]), &[]));
    }

    #[test]
    fn test_has_access_bound_role() {
        assert!(has_access(&ids(&[5, 1]), false, &ids(&[1]), &[]));
        assert!(!has_access(&ids(&[5]), false, &ids(&[1]), &ids(&[5])));
    }

    #[test]
    fn test_has_access_falls_back_to_named_role() {
        assert!(has_access(&ids(&[9]), false, &[], &ids(&[9])));
        assert!(!has_access(&ids(&[8]), false, &[], &ids(&[9])));
    }
}

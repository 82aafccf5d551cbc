//! Permission levels and permission sets.
//!
//! Levels form a total order: `read < write < sign < admin`. A caller holding
//! a level may invoke every method that requires that level or a lower one.
use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use strum::AsRefStr;
use strum::Display;
use strum::EnumIter;
use strum::EnumString;

use super::error::AuthError;

/// A capability level required to invoke a method.
///
/// The declaration order is the permission order; do not reorder variants.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    Sign,
    Admin,
}

impl Permission {
    /// true iff a caller holding `self` may invoke a method requiring
    /// `required`.
    pub fn satisfies(self, required: Permission) -> bool {
        self >= required
    }

    /// parses a wire name, eg `"write"`.
    pub fn from_name(name: &str) -> Result<Self, AuthError> {
        Self::from_str(name).map_err(|_| AuthError::UnsupportedPermission(name.to_string()))
    }
}

/// Like [Permission::satisfies] but on wire names.
///
/// An unrecognized name on either side never satisfies.
pub fn satisfies(held: &str, required: &str) -> bool {
    match (Permission::from_str(held), Permission::from_str(required)) {
        (Ok(held), Ok(required)) => held.satisfies(required),
        _ => false,
    }
}

/// A set of permissions; each permission appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(BTreeSet<Permission>);

impl Permissions {
    /// decodes wire names, failing on the first unsupported name.
    pub fn try_from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, AuthError> {
        names
            .iter()
            .map(|n| Permission::from_name(n.as_ref()))
            .collect()
    }

    /// true if any held permission satisfies `required`.
    pub fn allows(&self, required: Permission) -> bool {
        self.highest().is_some_and(|p| p.satisfies(required))
    }

    pub fn highest(&self) -> Option<Permission> {
        self.0.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    /// wire names in permission order.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|p| p.to_string()).collect()
    }
}

impl FromIterator<Permission> for Permissions {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Permission; N]> for Permissions {
    fn from(permissions: [Permission; N]) -> Self {
        permissions.into_iter().collect()
    }
}

impl From<Permissions> for Vec<Permission> {
    fn from(permissions: Permissions) -> Self {
        permissions.0.into_iter().collect()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use proptest::prop_assert_eq;
    use strum::IntoEnumIterator;
    use test_strategy::proptest;

    use super::*;

    #[test]
    fn order_is_read_write_sign_admin() {
        let all: Vec<Permission> = Permission::iter().collect();
        assert_eq!(
            vec![
                Permission::Read,
                Permission::Write,
                Permission::Sign,
                Permission::Admin
            ],
            all
        );
        assert!(all.windows(2).all(|w| w[0] < w[1]));
    }

    #[proptest]
    fn satisfies_iff_held_at_least_required(
        #[strategy(0usize..4)] held: usize,
        #[strategy(0usize..4)] required: usize,
    ) {
        let all: Vec<Permission> = Permission::iter().collect();
        let (held, required) = (all[held], all[required]);

        prop_assert_eq!(held >= required, held.satisfies(required));
        prop_assert_eq!(
            held >= required,
            satisfies(held.as_ref(), required.as_ref())
        );
    }

    #[test]
    fn unrecognized_names_never_satisfy() {
        assert!(!satisfies("root", "read"));
        assert!(!satisfies("admin", "superuser"));
        assert!(!satisfies("", ""));
        assert!(satisfies("admin", "sign"));
    }

    #[test]
    fn wire_names_are_lowercase() {
        assert_eq!("\"sign\"", serde_json::to_string(&Permission::Sign).unwrap());
        assert_eq!(Permission::Admin, Permission::from_name("admin").unwrap());
        assert!(matches!(
            Permission::from_name("Admin"),
            Err(AuthError::UnsupportedPermission(name)) if name == "Admin"
        ));
    }

    #[test]
    fn permission_set_is_unique_and_ordered() {
        let perms = Permissions::try_from_names(&["write", "read", "write"]).unwrap();

        assert_eq!(2, perms.len());
        assert_eq!(vec!["read".to_string(), "write".to_string()], perms.names());
        assert_eq!(Some(Permission::Write), perms.highest());
    }

    #[test]
    fn permission_set_rejects_unknown_names() {
        let result = Permissions::try_from_names(&["read", "root"]);
        assert!(matches!(
            result,
            Err(AuthError::UnsupportedPermission(name)) if name == "root"
        ));
    }

    #[test]
    fn allows_uses_highest_held_level() {
        let perms = Permissions::from([Permission::Read, Permission::Sign]);

        assert!(perms.allows(Permission::Read));
        assert!(perms.allows(Permission::Write));
        assert!(perms.allows(Permission::Sign));
        assert!(!perms.allows(Permission::Admin));
        assert!(!Permissions::default().allows(Permission::Read));
    }
}

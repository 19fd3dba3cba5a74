use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::types::{Community, Discover, Group, MembershipQuestion, ReferralInfo, User};

/// Errors returned when a payload does not match its expected schema.
///
/// `path` fields locate the offending value inside the payload, e.g.
/// `data[2].children[0].id`.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    /// The JSON could not be decoded into the expected shape at all
    /// (missing required field, wrong type, unknown enum value, ...).
    #[error("{schema} does not match the expected shape: {message}")]
    Shape {
        schema: &'static str,
        message: String,
    },

    #[error("{path} must be a UUID, got: {value:?}")]
    InvalidUuid { path: String, value: String },

    #[error("{path} must be a valid email address, got: {value:?}")]
    InvalidEmail { path: String, value: String },

    #[error("{path} must be a valid URL, got: {value:?}")]
    InvalidUrl { path: String, value: String },

    #[error("{path} is required")]
    Missing { path: String },

    /// A group id appears twice in one tree.
    #[error("{path} repeats group id {id:?}")]
    DuplicateId { path: String, id: String },
}

impl SchemaError {
    /// Prefix the error's path with `prefix`, for errors raised inside a
    /// nested value.
    pub fn within(self, prefix: &str) -> Self {
        let join = |path: String| {
            if path.is_empty() {
                prefix.to_string()
            } else if path.starts_with('[') {
                format!("{prefix}{path}")
            } else {
                format!("{prefix}.{path}")
            }
        };
        match self {
            SchemaError::Shape { .. } => self,
            SchemaError::InvalidUuid { path, value } => SchemaError::InvalidUuid {
                path: join(path),
                value,
            },
            SchemaError::InvalidEmail { path, value } => SchemaError::InvalidEmail {
                path: join(path),
                value,
            },
            SchemaError::InvalidUrl { path, value } => SchemaError::InvalidUrl {
                path: join(path),
                value,
            },
            SchemaError::Missing { path } => SchemaError::Missing { path: join(path) },
            SchemaError::DuplicateId { path, id } => SchemaError::DuplicateId {
                path: join(path),
                id,
            },
        }
    }

    /// The location of the error inside the payload, if it has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            SchemaError::Shape { .. } => None,
            SchemaError::InvalidUuid { path, .. }
            | SchemaError::InvalidEmail { path, .. }
            | SchemaError::InvalidUrl { path, .. }
            | SchemaError::Missing { path }
            | SchemaError::DuplicateId { path, .. } => Some(path),
        }
    }
}

/// A payload shape that can be decoded from JSON and checked.
///
/// Decoding is two steps: serde enforces structure (required fields, types,
/// enum values), then [`Schema::validate`] enforces value rules serde cannot
/// express (UUID ids, email format, required-but-nullable fields).
pub trait Schema: DeserializeOwned {
    /// Name used in error messages.
    const NAME: &'static str;

    /// Check value-level rules. The default accepts everything.
    fn validate(&self) -> Result<(), SchemaError> {
        Ok(())
    }
}

/// Decode `value` as `T` and validate it.
pub fn decode<T: Schema>(value: Value) -> Result<T, SchemaError> {
    let decoded: T = serde_json::from_value(value).map_err(|e| SchemaError::Shape {
        schema: T::NAME,
        message: e.to_string(),
    })?;
    decoded.validate()?;
    Ok(decoded)
}

impl<T: Schema> Schema for Vec<T> {
    const NAME: &'static str = T::NAME;

    fn validate(&self) -> Result<(), SchemaError> {
        for (i, item) in self.iter().enumerate() {
            item.validate().map_err(|e| e.within(&format!("[{i}]")))?;
        }
        Ok(())
    }
}

/// Bare strings, such as id lists echoed back by the server. No value rules.
impl Schema for String {
    const NAME: &'static str = "string";
}

impl<T: Schema> Schema for Option<T> {
    const NAME: &'static str = T::NAME;

    fn validate(&self) -> Result<(), SchemaError> {
        match self {
            Some(inner) => inner.validate(),
            None => Ok(()),
        }
    }
}

impl Schema for Group {
    const NAME: &'static str = "Group";

    fn validate(&self) -> Result<(), SchemaError> {
        validate_group_tree(self)
    }
}

impl Schema for Discover {
    const NAME: &'static str = "Discover";

    fn validate(&self) -> Result<(), SchemaError> {
        if let Some(group_id) = &self.group_id {
            check_uuid(group_id, "group_id")?;
        }
        validate_group_tree(&self.group)
    }
}

impl Schema for Community {
    const NAME: &'static str = "Community";

    fn validate(&self) -> Result<(), SchemaError> {
        check_uuid(&self.group_id, "group_id")?;
        if self.group.slug.is_none() {
            return Err(SchemaError::Missing {
                path: "slug".into(),
            });
        }
        validate_group_tree(&self.group)
    }
}

impl Schema for User {
    const NAME: &'static str = "User";

    fn validate(&self) -> Result<(), SchemaError> {
        check_uuid(&self.id, "id")?;
        if let Some(email) = &self.email {
            if !EMAIL_RE.is_match(email) {
                return Err(SchemaError::InvalidEmail {
                    path: "email".into(),
                    value: email.clone(),
                });
            }
        }
        if let Some(avatar) = &self.avatar {
            if !URL_RE.is_match(avatar) {
                return Err(SchemaError::InvalidUrl {
                    path: "avatar".into(),
                    value: avatar.clone(),
                });
            }
        }
        if let Some(id) = &self.cognito_uuid {
            check_uuid(id, "cognitoUuid")?;
        }
        if let Some(id) = &self.stream_uuid {
            check_uuid(id, "streamUuid")?;
        }
        Ok(())
    }
}

impl Schema for MembershipQuestion {
    const NAME: &'static str = "MembershipQuestion";

    fn validate(&self) -> Result<(), SchemaError> {
        check_uuid(&self.group_id, "group_id")
    }
}

impl Schema for ReferralInfo {
    const NAME: &'static str = "ReferralInfo";
}

// --- helpers -----------------------------------------------------------------

/// Check every group of a tree. Walks with an explicit stack so that deep
/// trees cost heap, not call frames.
fn validate_group_tree(root: &Group) -> Result<(), SchemaError> {
    let mut stack: Vec<(&Group, String)> = vec![(root, String::new())];
    let mut seen: HashSet<&str> = HashSet::new();

    while let Some((group, path)) = stack.pop() {
        let at = |field: &str| {
            if path.is_empty() {
                field.to_string()
            } else {
                format!("{path}.{field}")
            }
        };

        check_uuid(&group.id, &at("id"))?;
        if !seen.insert(group.id.as_str()) {
            return Err(SchemaError::DuplicateId {
                path: at("id"),
                id: group.id.clone(),
            });
        }
        if let Some(parent_id) = &group.parent_id {
            check_uuid(parent_id, &at("parent_id"))?;
        }
        if let Some(members) = &group.members {
            for (i, m) in members.iter().enumerate() {
                check_uuid(&m.id, &at(&format!("members[{i}].id")))?;
            }
        }

        // Reverse so children are checked in document order.
        for (i, child) in group.children.iter().enumerate().rev() {
            stack.push((child, at(&format!("children[{i}]"))));
        }
    }

    Ok(())
}

fn check_uuid(value: &str, path: &str) -> Result<(), SchemaError> {
    match uuid::Uuid::parse_str(value) {
        Ok(_) => Ok(()),
        Err(_) => Err(SchemaError::InvalidUuid {
            path: path.to_string(),
            value: value.to_string(),
        }),
    }
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email regex")
});

/// `<scheme>:<rest>` with no whitespace.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://\S+$").expect("invalid url regex")
});

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ROOT: &str = "0b6f3c1e-2d4a-4e8f-9b7c-111111111111";
    const CHILD: &str = "0b6f3c1e-2d4a-4e8f-9b7c-222222222222";

    fn group_json(id: &str) -> Value {
        json!({ "id": id, "name": "g", "privacy": "OPEN" })
    }

    #[test]
    fn valid_group() {
        let g: Group = decode(group_json(ROOT)).unwrap();
        assert_eq!(g.id, ROOT);
    }

    #[test]
    fn missing_name_is_shape_error() {
        let err = decode::<Group>(json!({ "id": ROOT, "privacy": "OPEN" })).unwrap_err();
        assert!(matches!(err, SchemaError::Shape { schema: "Group", .. }));
    }

    #[test]
    fn unknown_privacy_is_shape_error() {
        let err =
            decode::<Group>(json!({ "id": ROOT, "name": "g", "privacy": "HIDDEN" })).unwrap_err();
        assert!(matches!(err, SchemaError::Shape { .. }));
    }

    #[test]
    fn bad_child_id_reports_nested_path() {
        let mut root = group_json(ROOT);
        let mut ok = group_json(CHILD);
        ok["children"] = json!([group_json("nope")]);
        root["children"] = json!([group_json(CHILD), ok]);

        let err = decode::<Group>(root).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidUuid {
                path: "children[1].children[0].id".into(),
                value: "nope".into(),
            }
        );
    }

    #[test]
    fn repeated_id_in_tree_is_rejected() {
        let mut child = group_json(CHILD);
        child["children"] = json!([group_json(ROOT)]);
        let mut root = group_json(ROOT);
        root["children"] = json!([child]);

        let err = decode::<Group>(root).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateId {
                path: "children[0].children[0].id".into(),
                id: ROOT.into(),
            }
        );
    }

    #[test]
    fn list_errors_carry_index() {
        let err = decode::<Vec<Group>>(json!([group_json(ROOT), group_json("x")])).unwrap_err();
        assert_eq!(err.path(), Some("[1].id"));
    }

    #[test]
    fn community_requires_slug() {
        let mut c = group_json(ROOT);
        c["group_id"] = json!(CHILD);
        let err = decode::<Community>(c.clone()).unwrap_err();
        assert_eq!(err, SchemaError::Missing { path: "slug".into() });

        c["slug"] = json!("acme");
        let community: Community = decode(c).unwrap();
        assert_eq!(community.group.slug.as_deref(), Some("acme"));
    }

    #[test]
    fn user_email_and_avatar_rules() {
        let mut u = json!({ "id": ROOT, "username": "ann", "email": "ann@example.com" });
        assert!(decode::<User>(u.clone()).is_ok());

        u["email"] = json!("not-an-email");
        assert!(matches!(
            decode::<User>(u.clone()),
            Err(SchemaError::InvalidEmail { .. })
        ));

        u["email"] = json!(null);
        u["avatar"] = json!("avatar.png");
        assert!(matches!(
            decode::<User>(u),
            Err(SchemaError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn within_prefixes_paths() {
        let e = SchemaError::Missing { path: "slug".into() }.within("data");
        assert_eq!(e.path(), Some("data.slug"));
        let e = SchemaError::Missing { path: "[0].id".into() }.within("data");
        assert_eq!(e.path(), Some("data[0].id"));
    }
}

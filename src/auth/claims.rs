//! Session claims carried by the `authGuardian` token
//!
//! The gateway namespaces its own bookkeeping under [`VENDOR_CLAIMS_KEY`].
//! That entry is skipped while deserializing, so it never shows up in a
//! [`Claims`] value or anything rendered from it.

use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Gateway-internal claims namespace
pub const VENDOR_CLAIMS_KEY: &str = "https://onegraph.com/jwt/claims";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserClaims {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserClaims>,
    #[serde(flatten)]
    pub other: OtherClaims,
}

impl Claims {
    /// Roles held by the user, empty when the token carries none
    pub fn roles(&self) -> &[String] {
        self.user
            .as_ref()
            .map(|u| u.roles.as_slice())
            .unwrap_or_default()
    }

    /// Pretty JSON used by the token preview on the index page
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Claims other than `user`, minus the gateway namespace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OtherClaims(pub BTreeMap<String, Value>);

impl OtherClaims {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl Serialize for OtherClaims {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OtherClaims {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OtherClaimsVisitor;

        impl<'de> Visitor<'de> for OtherClaimsVisitor {
            type Value = OtherClaims;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of claims")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<OtherClaims, A::Error> {
                let mut claims = BTreeMap::new();
                while let Some(key) = map.next_key::<String>()? {
                    if key == VENDOR_CLAIMS_KEY {
                        map.next_value::<IgnoredAny>()?;
                        continue;
                    }
                    let value = map.next_value::<Value>()?;
                    claims.insert(key, value);
                }
                Ok(OtherClaims(claims))
            }
        }

        deserializer.deserialize_map(OtherClaimsVisitor)
    }
}

// Identity fields show up as strings or numbers depending on the provider
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

use serde::{Deserialize, Serialize};

/// Permission strings the drinks API gates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "get:drinks-detail")]
    GetDrinksDetail,
    #[serde(rename = "post:drinks")]
    PostDrinks,
    #[serde(rename = "patch:drinks")]
    PatchDrinks,
    #[serde(rename = "delete:drinks")]
    DeleteDrinks,
}

impl Permission {
    pub const ALL: [Permission; 4] = [
        Permission::GetDrinksDetail,
        Permission::PostDrinks,
        Permission::PatchDrinks,
        Permission::DeleteDrinks,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::GetDrinksDetail => "get:drinks-detail",
            Permission::PostDrinks => "post:drinks",
            Permission::PatchDrinks => "patch:drinks",
            Permission::DeleteDrinks => "delete:drinks",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|permission| permission.as_str() == value)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::Permission;

    #[test]
    fn permission_strings_parse_back() {
        for permission in Permission::ALL {
            let as_str = permission.as_str();
            assert_eq!(as_str.parse::<Permission>().ok(), Some(permission));
            assert_eq!(permission.to_string(), as_str);
            assert_eq!(
                serde_json::to_value(permission).expect("serialize"),
                serde_json::json!(as_str)
            );
        }
    }

    #[test]
    fn permission_match_is_exact() {
        assert!("get:drinks".parse::<Permission>().is_err());
        assert!("POST:drinks".parse::<Permission>().is_err());
        assert!("delete:drinks ".parse::<Permission>().is_err());
    }
}

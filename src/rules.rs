use std::collections::BTreeMap;

/// RouteRule
///
/// Static authorization rule for one dashboard view: which path it lives at and which roles
/// may see it. `allowed_roles: None` means any authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRule {
    pub view: &'static str,
    pub path: &'static str,
    pub allowed_roles: Option<&'static [&'static str]>,
}

impl RouteRule {
    /// Membership check for a role already expressed in table names (see `table_role`).
    pub fn allows(&self, role: Option<&str>) -> bool {
        match self.allowed_roles {
            None => true,
            Some(allowed) => role.is_some_and(|r| allowed.contains(&r)),
        }
    }
}

/// Name the route and sidebar tables use for the branch-exempt tier. The role that actually
/// holds it is configured (`SUPERADMIN_ROLE`) and mapped onto this name by `table_role`.
pub const SUPERADMIN: &str = "SUPERADMIN";

const ADMINS: &[&str] = &["ADMIN", SUPERADMIN];
const BRANCH_STAFF: &[&str] = &["ADMIN", "EMPLEADO", SUPERADMIN];
const ALL_STAFF: &[&str] = &["ADMIN", "COCINERO", "EMPLEADO", SUPERADMIN];

/// Translates a claimed role into the name the tables use.
///
/// The configured superadmin role becomes `SUPERADMIN`. When another role is configured as
/// superadmin, a literal `SUPERADMIN` claim carries no table membership at all.
pub fn table_role<'a>(role: &'a str, superadmin_role: &str) -> Option<&'a str> {
    if role == superadmin_role {
        Some(SUPERADMIN)
    } else if role == SUPERADMIN {
        None
    } else {
        Some(role)
    }
}

/// The dashboard's guarded views.
pub const ROUTES: &[RouteRule] = &[
    RouteRule { view: "empresa", path: "/empresa", allowed_roles: Some(ADMINS) },
    RouteRule { view: "sucursal", path: "/empresa/:empresaId", allowed_roles: Some(ADMINS) },
    RouteRule { view: "inicio", path: "/dashboard/:sucursalId", allowed_roles: Some(ALL_STAFF) },
    RouteRule { view: "insumos", path: "/insumos/:sucursalId", allowed_roles: Some(ALL_STAFF) },
    RouteRule { view: "productos", path: "/productos/:sucursalId", allowed_roles: Some(ALL_STAFF) },
    RouteRule {
        view: "unidad_medida",
        path: "/unidadMedida/:sucursalId",
        allowed_roles: Some(BRANCH_STAFF),
    },
    RouteRule { view: "categorias", path: "/categorias/:sucursalId", allowed_roles: Some(BRANCH_STAFF) },
    RouteRule { view: "promociones", path: "/promociones/:sucursalId", allowed_roles: Some(BRANCH_STAFF) },
    RouteRule { view: "empleados", path: "/empleados/:sucursalId", allowed_roles: Some(ADMINS) },
];

/// RouteMatch
///
/// A resolved navigation target with its captured path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub rule: &'static RouteRule,
    pub params: BTreeMap<String, String>,
}

/// Finds the rule whose path pattern matches `path`. Query strings and trailing slashes
/// are ignored; `:name` segments capture any non-empty segment.
pub fn resolve(path: &str) -> Option<RouteMatch> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    ROUTES.iter().find_map(|rule| {
        let pattern: Vec<&str> = rule.path.split('/').filter(|s| !s.is_empty()).collect();
        if pattern.len() != segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, actual) in pattern.iter().zip(&segments) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), actual.to_string());
                }
                None if expected == actual => {}
                None => return None,
            }
        }

        Some(RouteMatch { rule, params })
    })
}

/// Role names referenced by the route table that no configured role maps onto. A
/// `SUPERADMIN` entry here means `superadmin_role` is missing from the configured set.
pub fn unknown_roles(known: &[String], superadmin_role: &str) -> Vec<String> {
    let mapped: Vec<&str> = known
        .iter()
        .filter_map(|k| table_role(k, superadmin_role))
        .collect();

    let mut unknown: Vec<String> = ROUTES
        .iter()
        .filter_map(|rule| rule.allowed_roles)
        .flat_map(|roles| roles.iter().copied())
        .filter(|role| !mapped.contains(role))
        .map(str::to_string)
        .collect();
    unknown.sort();
    unknown.dedup();
    unknown
}

/// Looks a rule up by its view identifier.
pub fn rule_for_view(view: &str) -> Option<&'static RouteRule> {
    ROUTES.iter().find(|rule| rule.view == view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_static_and_parameterised_paths() {
        let empresa = resolve("/empresa").unwrap();
        assert_eq!(empresa.rule.view, "empresa");
        assert!(empresa.params.is_empty());

        let sucursal = resolve("/empresa/3/").unwrap();
        assert_eq!(sucursal.rule.view, "sucursal");
        assert_eq!(sucursal.params.get("empresaId").map(String::as_str), Some("3"));

        let productos = resolve("/productos/7?tab=stock").unwrap();
        assert_eq!(productos.rule.view, "productos");
        assert_eq!(productos.params.get("sucursalId").map(String::as_str), Some("7"));
    }

    #[test]
    fn unknown_paths_do_not_resolve() {
        assert!(resolve("/").is_none());
        assert!(resolve("/productos").is_none());
        assert!(resolve("/productos/1/extra").is_none());
        assert!(resolve("/reportes/1").is_none());
    }

    #[test]
    fn allows_checks_membership() {
        let empleados = rule_for_view("empleados").unwrap();
        assert!(empleados.allows(Some("ADMIN")));
        assert!(!empleados.allows(Some("COCINERO")));
        assert!(!empleados.allows(None));

        let open = RouteRule { view: "x", path: "/x", allowed_roles: None };
        assert!(open.allows(None));
    }

    #[test]
    fn default_roles_cover_route_table() {
        let known: Vec<String> = ["SUPERADMIN", "ADMIN", "EMPLEADO", "COCINERO"]
            .iter()
            .map(|r| r.to_string())
            .collect();
        assert!(unknown_roles(&known, SUPERADMIN).is_empty());
        assert_eq!(unknown_roles(&known[..2], SUPERADMIN), vec!["COCINERO", "EMPLEADO"]);
    }

    #[test]
    fn renamed_superadmin_must_be_in_role_set() {
        let renamed: Vec<String> = ["ROOT", "ADMIN", "EMPLEADO", "COCINERO"]
            .iter()
            .map(|r| r.to_string())
            .collect();
        assert!(unknown_roles(&renamed, "ROOT").is_empty());

        let stale: Vec<String> = ["SUPERADMIN", "ADMIN", "EMPLEADO", "COCINERO"]
            .iter()
            .map(|r| r.to_string())
            .collect();
        assert_eq!(unknown_roles(&stale, "ROOT"), vec![SUPERADMIN]);
    }

    #[test]
    fn table_role_maps_configured_superadmin() {
        assert_eq!(table_role("ROOT", "ROOT"), Some(SUPERADMIN));
        assert_eq!(table_role("SUPERADMIN", "ROOT"), None);
        assert_eq!(table_role("SUPERADMIN", SUPERADMIN), Some(SUPERADMIN));
        assert_eq!(table_role("ADMIN", "ROOT"), Some("ADMIN"));
    }
}

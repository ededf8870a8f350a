use crate::{models::MenuEntry, rules::SUPERADMIN};

/// Sidebar entry declaration. `{sucursalId}` in `path` is replaced with the current branch.
struct MenuItem {
    label: &'static str,
    path: &'static str,
    roles: &'static [&'static str],
}

const SIDEBAR: &[MenuItem] = &[
    MenuItem { label: "Inicio", path: "/dashboard/{sucursalId}", roles: &["ADMIN", SUPERADMIN] },
    MenuItem {
        label: "Promociones",
        path: "/promociones/{sucursalId}",
        roles: &["ADMIN", "EMPLEADO", SUPERADMIN],
    },
    MenuItem {
        label: "Productos",
        path: "/productos/{sucursalId}",
        roles: &["ADMIN", "EMPLEADO", "COCINERO", SUPERADMIN],
    },
    MenuItem {
        label: "Insumos",
        path: "/insumos/{sucursalId}",
        roles: &["ADMIN", "EMPLEADO", "COCINERO", SUPERADMIN],
    },
    MenuItem {
        label: "Categorías",
        path: "/categorias/{sucursalId}",
        roles: &["ADMIN", "EMPLEADO", SUPERADMIN],
    },
    MenuItem {
        label: "Unidad de medida",
        path: "/unidadMedida/{sucursalId}",
        roles: &["ADMIN", SUPERADMIN],
    },
    MenuItem { label: "Empleados", path: "/empleados/{sucursalId}", roles: &["ADMIN", SUPERADMIN] },
    MenuItem { label: "Empresas", path: "/empresa", roles: &[SUPERADMIN] },
];

/// Screen actions narrower than the view that hosts them.
struct ActionItem {
    action: &'static str,
    roles: &'static [&'static str],
}

const ACTIONS: &[ActionItem] = &[ActionItem {
    action: "productos.agregar",
    roles: &["ADMIN", "COCINERO", SUPERADMIN],
}];

/// Screen actions `role` may trigger.
pub fn actions_for_role(role: &str) -> Vec<String> {
    ACTIONS
        .iter()
        .filter(|item| item.roles.contains(&role))
        .map(|item| item.action.to_string())
        .collect()
}

/// Sidebar entries visible to `role` while working on branch `sucursal_id`.
pub fn menu_for_role(role: &str, sucursal_id: i64) -> Vec<MenuEntry> {
    let sucursal = sucursal_id.to_string();
    SIDEBAR
        .iter()
        .filter(|item| item.roles.contains(&role))
        .map(|item| MenuEntry {
            label: item.label.to_string(),
            path: item.path.replace("{sucursalId}", &sucursal),
        })
        .collect()
}

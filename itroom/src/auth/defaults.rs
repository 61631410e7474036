use super::models::{Action, ActionSet, ModuleKey, PermissionRecord, RoleName};
use serde::Serialize;

/// A functional area of the application
#[derive(Debug, Clone, Serialize)]
pub struct ModuleInfo {
    pub key: ModuleKey,
    pub name: &'static str,
}

/// The closed set of module keys permissions are configured for
pub fn module_catalogue() -> Vec<ModuleInfo> {
    vec![
        ModuleInfo {
            key: ModuleKey::employees(),
            name: "Employees",
        },
        ModuleInfo {
            key: ModuleKey::assets(),
            name: "Assets",
        },
        ModuleInfo {
            key: ModuleKey::licenses(),
            name: "Licenses",
        },
        ModuleInfo {
            key: ModuleKey::repairs(),
            name: "Repairs",
        },
        ModuleInfo {
            key: ModuleKey::fingerprints(),
            name: "Fingerprint Enrollments",
        },
        ModuleInfo {
            key: ModuleKey::users(),
            name: "Users",
        },
        ModuleInfo {
            key: ModuleKey::audit(),
            name: "Audit Log",
        },
        ModuleInfo {
            key: ModuleKey::email_logs(),
            name: "Email Logs",
        },
        ModuleInfo {
            key: ModuleKey::modules(),
            name: "Modules",
        },
        ModuleInfo {
            key: ModuleKey::permissions(),
            name: "Permissions",
        },
    ]
}

/// Modules staff work with day to day
fn staff_modules() -> [ModuleKey; 5] {
    [
        ModuleKey::employees(),
        ModuleKey::assets(),
        ModuleKey::licenses(),
        ModuleKey::repairs(),
        ModuleKey::fingerprints(),
    ]
}

/// Records seeded on first start: staff read the asset-management modules,
/// auditors read everything.
pub fn default_permission_records() -> Vec<PermissionRecord> {
    let read_only = || -> ActionSet { [Action::read()].into_iter().collect() };

    let staff = staff_modules()
        .into_iter()
        .map(|module| PermissionRecord::new(RoleName::staff(), module, read_only()));

    let auditor = module_catalogue()
        .into_iter()
        .map(|module| PermissionRecord::new(RoleName::auditor(), module.key, read_only()));

    staff.chain(auditor).collect()
}

use crate::model::role::{PortalRole, StaffRole};

/// Badge sources a menu entry can bind to; the number shown next to the
/// entry comes from the matching workflow counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    UnreadNotifications,
    PendingTasks,
    PendingKyc,
}

#[derive(Debug, Clone, Copy)]
pub struct MenuItem {
    pub label: &'static str,
    pub route: &'static str,
    pub badge: Option<Badge>,
}

const fn item(label: &'static str, route: &'static str) -> MenuItem {
    MenuItem {
        label,
        route,
        badge: None,
    }
}

const fn badged(label: &'static str, route: &'static str, badge: Badge) -> MenuItem {
    MenuItem {
        label,
        route,
        badge: Some(badge),
    }
}

/// API namespace each portal role is scoped to.
pub fn api_namespace(role: PortalRole) -> &'static str {
    match role {
        PortalRole::Admin => "/admin/staff",
        PortalRole::Doctor => "/doctor",
        PortalRole::Patient => "/patient",
        PortalRole::Staff(StaffRole::Reception) => "/staff/reception",
        PortalRole::Staff(StaffRole::Nurse) => "/staff/nurse",
        PortalRole::Staff(StaffRole::Lab) => "/staff/lab",
        PortalRole::Staff(StaffRole::Pharmacy) => "/staff/pharmacy",
    }
}

/// Menu/route set rendered for an authenticated role.
pub fn menu_for(role: PortalRole) -> Vec<MenuItem> {
    let mut menu = vec![
        item("Dashboard", "/dashboard"),
        badged("Notifications", "/notifications", Badge::UnreadNotifications),
    ];

    match role {
        PortalRole::Admin => {
            menu.push(item("Staff", "/staff"));
            menu.push(item("Patients", "/patients"));
            menu.push(item("Billing", "/billing"));
            menu.push(badged("KYC Review", "/kyc", Badge::PendingKyc));
        }
        PortalRole::Doctor => {
            menu.push(item("Appointments", "/appointments"));
            menu.push(item("Patients", "/patients"));
            menu.push(item("Prescriptions", "/prescriptions"));
        }
        PortalRole::Patient => {
            menu.push(item("Appointments", "/appointments"));
            menu.push(item("Bills", "/bills"));
        }
        PortalRole::Staff(sub) => {
            menu.push(item("Attendance", "/attendance"));
            menu.push(badged("Tasks", "/tasks", Badge::PendingTasks));
            match sub {
                StaffRole::Reception => {
                    menu.push(badged("KYC Assistance", "/kyc-assistance", Badge::PendingKyc));
                    menu.push(item("Appointments", "/appointments"));
                }
                StaffRole::Nurse => {
                    menu.push(item("Vitals", "/vitals"));
                    menu.push(item("Beds", "/beds"));
                }
                StaffRole::Lab => {
                    menu.push(item("Lab Orders", "/lab-orders"));
                }
                StaffRole::Pharmacy => {
                    menu.push(item("Inventory", "/inventory"));
                }
            }
        }
    }

    menu
}
